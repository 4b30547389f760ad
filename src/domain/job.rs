// src/domain/job.rs

use crate::domain::metrics::{
    budget_variance, renovation_premium, unit_totals, BudgetVariance, RenovationPremium,
};
use crate::domain::status::{
    classify_dates, days_to_complete, flexible_date, TemporalStatus, WorkStatus,
};
use crate::errors::ServerError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One billable piece of work within a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTask {
    pub id: String,
    pub unit_id: String,
    pub job_number: i64,
    pub name: String,
    pub status: WorkStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub contractor_name: Option<String>,
    pub budget: f64,
    pub bid_amount: f64,
    pub invoiced_amount: f64,
}

impl JobTask {
    pub fn variance(&self) -> BudgetVariance {
        budget_variance(self.budget, self.invoiced_amount)
    }

    pub fn temporal_status(&self, now: NaiveDateTime) -> TemporalStatus {
        classify_dates(self.start_date, self.end_date, now)
    }

    pub fn days_to_complete(&self) -> Option<i64> {
        days_to_complete(self.start_date, self.end_date)
    }
}

/// A rental unit attached to a job. Totals and percent complete are rolled up
/// from the tasks by [`Unit::recalculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub job_id: String,
    pub unit_number: String,
    pub floor_plan: Option<String>,
    pub status: WorkStatus,
    pub total_bid: f64,
    pub total_budget: f64,
    pub total_invoiced: f64,
    pub percent_complete: f64,
    pub pre_rent: f64,
    pub post_rent: f64,
    pub tasks: Vec<JobTask>,
}

impl Unit {
    pub fn recalculate(&mut self) {
        let totals = unit_totals(&self.tasks);
        self.total_bid = totals.total_bid;
        self.total_budget = totals.total_budget;
        self.total_invoiced = totals.total_invoiced;
        self.percent_complete = totals.percent_complete;
    }

    pub fn premium(&self) -> RenovationPremium {
        renovation_premium(self.pre_rent, self.post_rent)
    }

    pub fn variance(&self) -> BudgetVariance {
        budget_variance(self.total_budget, self.total_invoiced)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// An accepted bid tracked for execution. Owns its units exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub bid_id: String,
    pub property_ref: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
    /// Incremented by every persisted mutation.
    pub revision: i64,
    pub units: Vec<Unit>,
}

impl Job {
    pub fn temporal_status(&self, now: NaiveDateTime) -> TemporalStatus {
        classify_dates(Some(self.start_date), Some(self.end_date), now)
    }

    pub fn days_to_complete(&self) -> Option<i64> {
        days_to_complete(Some(self.start_date), Some(self.end_date))
    }

    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&JobTask> {
        self.units
            .iter()
            .flat_map(|u| u.tasks.iter())
            .find(|t| t.id == task_id)
    }

    /// Returns the owning unit and the task's position within it.
    pub fn locate_task_mut(&mut self, task_id: &str) -> Option<(&mut Unit, usize)> {
        self.units.iter_mut().find_map(|unit| {
            let idx = unit.tasks.iter().position(|t| t.id == task_id)?;
            Some((unit, idx))
        })
    }

    pub fn task_count(&self) -> usize {
        self.units.iter().map(Unit::task_count).sum()
    }
}

/// Partial update of a task's editable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date::option")]
    pub end_date: Option<NaiveDate>,
    pub contractor_name: Option<String>,
    pub budget: Option<f64>,
    pub bid_amount: Option<f64>,
    pub invoiced_amount: Option<f64>,
    pub expected_revision: Option<i64>,
}

impl TaskUpdate {
    /// Applies the update to a copy and only commits it when the result is valid.
    pub fn apply(&self, task: &mut JobTask) -> Result<(), ServerError> {
        let mut next = task.clone();

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServerError::Validation("task name must not be empty".into()));
            }
            next.name = name.to_string();
        }
        if self.start_date.is_some() {
            next.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            next.end_date = self.end_date;
        }
        if let Some(contractor) = &self.contractor_name {
            let contractor = contractor.trim();
            next.contractor_name = (!contractor.is_empty()).then(|| contractor.to_string());
        }
        if let Some(v) = self.budget {
            next.budget = non_negative("budget", v)?;
        }
        if let Some(v) = self.bid_amount {
            next.bid_amount = non_negative("bid_amount", v)?;
        }
        if let Some(v) = self.invoiced_amount {
            next.invoiced_amount = non_negative("invoiced_amount", v)?;
        }

        if let (Some(start), Some(end)) = (next.start_date, next.end_date) {
            if start > end {
                return Err(ServerError::Validation(format!(
                    "task start date {start} is after end date {end}"
                )));
            }
        }

        *task = next;
        Ok(())
    }
}

/// Partial update of a unit's status and rents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitUpdate {
    pub status: Option<WorkStatus>,
    pub pre_rent: Option<f64>,
    pub post_rent: Option<f64>,
    pub expected_revision: Option<i64>,
}

impl UnitUpdate {
    pub fn apply(&self, unit: &mut Unit) -> Result<(), ServerError> {
        let pre_rent = self.pre_rent.map(|v| non_negative("pre_rent", v)).transpose()?;
        let post_rent = self.post_rent.map(|v| non_negative("post_rent", v)).transpose()?;

        if let Some(status) = self.status {
            unit.status = status;
        }
        if let Some(v) = pre_rent {
            unit.pre_rent = v;
        }
        if let Some(v) = post_rent {
            unit.post_rent = v;
        }
        Ok(())
    }
}

pub fn non_negative(field: &str, value: f64) -> Result<f64, ServerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ServerError::Validation(format!(
            "{field} must be a non-negative amount, got {value}"
        )))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn sample_task(id: &str, status: WorkStatus) -> JobTask {
        JobTask {
            id: id.to_string(),
            unit_id: "unit-1".to_string(),
            job_number: 1,
            name: "Kitchen Cabinets".to_string(),
            status,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 30),
            contractor_name: None,
            budget: 0.0,
            bid_amount: 0.0,
            invoiced_amount: 0.0,
        }
    }

    pub fn sample_unit(id: &str, tasks: Vec<JobTask>) -> Unit {
        let mut unit = Unit {
            id: id.to_string(),
            job_id: "job-1".to_string(),
            unit_number: id.trim_start_matches("unit-").to_string(),
            floor_plan: Some("2B/1BA".to_string()),
            status: WorkStatus::NotStarted,
            total_bid: 0.0,
            total_budget: 0.0,
            total_invoiced: 0.0,
            percent_complete: 0.0,
            pre_rent: 1200.0,
            post_rent: 1450.0,
            tasks: tasks
                .into_iter()
                .map(|mut t| {
                    t.unit_id = id.to_string();
                    t
                })
                .collect(),
        };
        unit.recalculate();
        unit
    }

    pub fn sample_job(units: Vec<Unit>) -> Job {
        Job {
            id: "job-1".to_string(),
            bid_id: "bid-1".to_string(),
            property_ref: "Maple Court".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 30).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            revision: 0,
            units,
        }
    }

    #[test]
    fn unit_metrics_follow_rents_and_totals() {
        let mut task = sample_task("t1", WorkStatus::InProgress);
        task.budget = 14500.0;
        task.invoiced_amount = 8000.0;
        let unit = sample_unit("unit-1", vec![task]);

        assert_eq!(unit.premium().dollar_amount, 250.0);
        assert_eq!(unit.variance().dollar_amount, -6500.0);
        assert_eq!(unit.total_budget, 14500.0);
    }

    #[test]
    fn task_update_rejects_inverted_dates_without_partial_write() {
        let mut task = sample_task("t1", WorkStatus::NotStarted);
        let update = TaskUpdate {
            budget: Some(500.0),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };

        let err = update.apply(&mut task).unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
        assert_eq!(task.budget, 0.0);
        assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2024, 3, 30));
    }

    #[test]
    fn task_update_rejects_negative_money() {
        let mut task = sample_task("t1", WorkStatus::NotStarted);
        let update = TaskUpdate {
            invoiced_amount: Some(-1.0),
            ..Default::default()
        };
        assert!(update.apply(&mut task).is_err());
    }

    #[test]
    fn task_update_sets_contractor_and_amounts() {
        let mut task = sample_task("t1", WorkStatus::NotStarted);
        let update = TaskUpdate {
            contractor_name: Some("  Acme Renovations ".into()),
            budget: Some(1200.0),
            bid_amount: Some(1100.0),
            ..Default::default()
        };
        update.apply(&mut task).unwrap();
        assert_eq!(task.contractor_name.as_deref(), Some("Acme Renovations"));
        assert_eq!(task.budget, 1200.0);
        assert_eq!(task.bid_amount, 1100.0);
    }

    #[test]
    fn locate_task_finds_owning_unit() {
        let mut job = sample_job(vec![
            sample_unit("unit-1", vec![sample_task("a", WorkStatus::NotStarted)]),
            sample_unit("unit-2", vec![sample_task("b", WorkStatus::NotStarted)]),
        ]);

        let (unit, idx) = job.locate_task_mut("b").unwrap();
        assert_eq!(unit.id, "unit-2");
        assert_eq!(idx, 0);
        assert!(job.locate_task_mut("missing").is_none());
        assert_eq!(job.task_count(), 2);
    }
}
