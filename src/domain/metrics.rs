// src/domain/metrics.rs

use crate::domain::job::{JobTask, Unit};
use crate::domain::status::WorkStatus;
use serde::Serialize;

/// Rent uplift attributable to a renovation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenovationPremium {
    pub dollar_amount: f64,
    /// `None` when the pre-renovation rent is zero.
    pub percentage: Option<f64>,
}

pub fn renovation_premium(pre_rent: f64, post_rent: f64) -> RenovationPremium {
    let dollar_amount = post_rent - pre_rent;
    let percentage = if pre_rent == 0.0 {
        None
    } else {
        Some(dollar_amount / pre_rent * 100.0)
    };
    RenovationPremium {
        dollar_amount,
        percentage,
    }
}

/// Invoiced minus budget. Positive is over budget, negative is under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetVariance {
    pub dollar_amount: f64,
    pub percentage: f64,
}

impl BudgetVariance {
    pub fn is_over_budget(&self) -> bool {
        self.dollar_amount > 0.0
    }
}

/// A zero budget yields exactly 0%, unlike the premium which yields no percentage.
pub fn budget_variance(budget: f64, invoiced: f64) -> BudgetVariance {
    let dollar_amount = invoiced - budget;
    let percentage = if budget > 0.0 {
        dollar_amount / budget * 100.0
    } else {
        0.0
    };
    BudgetVariance {
        dollar_amount,
        percentage,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UnitTotals {
    pub total_bid: f64,
    pub total_budget: f64,
    pub total_invoiced: f64,
    pub percent_complete: f64,
}

pub fn unit_totals(tasks: &[JobTask]) -> UnitTotals {
    let completed = tasks
        .iter()
        .filter(|t| t.status == WorkStatus::Completed)
        .count();
    let percent_complete = if tasks.is_empty() {
        0.0
    } else {
        completed as f64 / tasks.len() as f64 * 100.0
    };

    UnitTotals {
        total_bid: tasks.iter().map(|t| t.bid_amount).sum(),
        total_budget: tasks.iter().map(|t| t.budget).sum(),
        total_invoiced: tasks.iter().map(|t| t.invoiced_amount).sum(),
        percent_complete,
    }
}

/// Job-wide roll-up shown in listings and on the job page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub unit_count: usize,
    pub task_count: usize,
    pub total_bid: f64,
    pub total_budget: f64,
    pub total_invoiced: f64,
    pub variance: BudgetVariance,
    pub average_percent_complete: f64,
    /// Task counts in board column order.
    pub tasks_by_status: Vec<(WorkStatus, usize)>,
}

pub fn job_summary(units: &[Unit]) -> JobSummary {
    let total_budget: f64 = units.iter().map(|u| u.total_budget).sum();
    let total_invoiced: f64 = units.iter().map(|u| u.total_invoiced).sum();

    let mut counts = [0usize; 4];
    for task in units.iter().flat_map(|u| u.tasks.iter()) {
        counts[task.status.index()] += 1;
    }

    let average_percent_complete = if units.is_empty() {
        0.0
    } else {
        units.iter().map(|u| u.percent_complete).sum::<f64>() / units.len() as f64
    };

    JobSummary {
        unit_count: units.len(),
        task_count: counts.iter().sum(),
        total_bid: units.iter().map(|u| u.total_bid).sum(),
        total_budget,
        total_invoiced,
        variance: budget_variance(total_budget, total_invoiced),
        average_percent_complete,
        tasks_by_status: WorkStatus::ALL
            .into_iter()
            .map(|s| (s, counts[s.index()]))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::tests::{sample_task, sample_unit};

    #[test]
    fn premium_for_1200_to_1450() {
        let premium = renovation_premium(1200.0, 1450.0);
        assert_eq!(premium.dollar_amount, 250.0);
        assert_eq!(premium.percentage, Some(250.0 / 1200.0 * 100.0));
        assert!((premium.percentage.unwrap() - 20.8333).abs() < 1e-3);
    }

    #[test]
    fn premium_without_pre_rent_has_no_percentage() {
        let premium = renovation_premium(0.0, 900.0);
        assert_eq!(premium.dollar_amount, 900.0);
        assert_eq!(premium.percentage, None);
    }

    #[test]
    fn premium_is_exact_for_positive_pre_rent() {
        for (pre, post) in [(1.0, 3.0), (975.5, 1010.25), (2000.0, 1800.0), (333.0, 333.0)] {
            let premium = renovation_premium(pre, post);
            assert_eq!(premium.dollar_amount, post - pre);
            assert_eq!(premium.percentage, Some((post - pre) / pre * 100.0));
        }
    }

    #[test]
    fn variance_under_budget() {
        let variance = budget_variance(14500.0, 8000.0);
        assert_eq!(variance.dollar_amount, -6500.0);
        assert_eq!(variance.percentage, -6500.0 / 14500.0 * 100.0);
        assert!((variance.percentage + 44.8275).abs() < 1e-3);
        assert!(!variance.is_over_budget());
    }

    #[test]
    fn variance_over_budget_is_positive() {
        let variance = budget_variance(1000.0, 1250.0);
        assert_eq!(variance.dollar_amount, 250.0);
        assert_eq!(variance.percentage, 25.0);
        assert!(variance.is_over_budget());
    }

    #[test]
    fn zero_budget_variance_is_zero_percent() {
        let variance = budget_variance(0.0, 400.0);
        assert_eq!(variance.dollar_amount, 400.0);
        assert_eq!(variance.percentage, 0.0);
    }

    #[test]
    fn unit_totals_roll_up_tasks() {
        let mut done = sample_task("t1", WorkStatus::Completed);
        done.budget = 1000.0;
        done.bid_amount = 900.0;
        done.invoiced_amount = 950.0;
        let mut open = sample_task("t2", WorkStatus::InProgress);
        open.budget = 500.0;
        open.bid_amount = 450.0;

        let totals = unit_totals(&[done, open]);
        assert_eq!(totals.total_budget, 1500.0);
        assert_eq!(totals.total_bid, 1350.0);
        assert_eq!(totals.total_invoiced, 950.0);
        assert_eq!(totals.percent_complete, 50.0);
        assert_eq!(unit_totals(&[]).percent_complete, 0.0);
    }

    #[test]
    fn job_summary_counts_statuses() {
        let units = vec![
            sample_unit(
                "unit-1",
                vec![
                    sample_task("a", WorkStatus::NotStarted),
                    sample_task("b", WorkStatus::Completed),
                ],
            ),
            sample_unit("unit-2", vec![sample_task("c", WorkStatus::OnHold)]),
        ];

        let summary = job_summary(&units);
        assert_eq!(summary.unit_count, 2);
        assert_eq!(summary.task_count, 3);
        assert_eq!(summary.tasks_by_status[0], (WorkStatus::NotStarted, 1));
        assert_eq!(summary.tasks_by_status[2], (WorkStatus::Completed, 1));
        assert_eq!(summary.tasks_by_status[3], (WorkStatus::OnHold, 1));
        assert_eq!(summary.average_percent_complete, 25.0);
    }
}
