// src/domain/views.rs

use crate::domain::bid::Bid;
use crate::domain::job::{Job, JobTask, Unit};
use crate::domain::metrics::{job_summary, BudgetVariance, JobSummary, RenovationPremium};
use crate::domain::status::{TemporalStatus, WorkStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// ViewModels pair stored records with their derived metrics.
// They are rebuilt on every read because temporal status depends on "now".

#[derive(Debug, Serialize)]
pub struct BidView<'a> {
    #[serde(flatten)]
    pub bid: &'a Bid,
    pub temporal_status: TemporalStatus,
    pub days_to_complete: Option<i64>,
}

impl<'a> BidView<'a> {
    pub fn new(bid: &'a Bid, now: NaiveDateTime) -> Self {
        Self {
            bid,
            temporal_status: bid.temporal_status(now),
            days_to_complete: bid.days_to_complete(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskView<'a> {
    #[serde(flatten)]
    pub task: &'a JobTask,
    pub temporal_status: TemporalStatus,
    pub days_to_complete: Option<i64>,
    pub variance: BudgetVariance,
}

#[derive(Debug, Serialize)]
pub struct UnitView<'a> {
    pub id: &'a str,
    pub unit_number: &'a str,
    pub floor_plan: Option<&'a str>,
    pub status: WorkStatus,
    pub total_bid: f64,
    pub total_budget: f64,
    pub total_invoiced: f64,
    pub percent_complete: f64,
    pub pre_rent: f64,
    pub post_rent: f64,
    pub premium: RenovationPremium,
    pub variance: BudgetVariance,
    pub tasks: Vec<TaskView<'a>>,
}

impl<'a> UnitView<'a> {
    pub fn new(unit: &'a Unit, now: NaiveDateTime) -> Self {
        Self {
            id: &unit.id,
            unit_number: &unit.unit_number,
            floor_plan: unit.floor_plan.as_deref(),
            status: unit.status,
            total_bid: unit.total_bid,
            total_budget: unit.total_budget,
            total_invoiced: unit.total_invoiced,
            percent_complete: unit.percent_complete,
            pre_rent: unit.pre_rent,
            post_rent: unit.post_rent,
            premium: unit.premium(),
            variance: unit.variance(),
            tasks: unit
                .tasks
                .iter()
                .map(|task| TaskView {
                    task,
                    temporal_status: task.temporal_status(now),
                    days_to_complete: task.days_to_complete(),
                    variance: task.variance(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobView<'a> {
    pub id: &'a str,
    pub bid_id: &'a str,
    pub property_ref: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub revision: i64,
    pub temporal_status: TemporalStatus,
    pub days_to_complete: Option<i64>,
    pub summary: JobSummary,
    pub units: Vec<UnitView<'a>>,
}

impl<'a> JobView<'a> {
    pub fn new(job: &'a Job, now: NaiveDateTime) -> Self {
        Self {
            id: &job.id,
            bid_id: &job.bid_id,
            property_ref: &job.property_ref,
            start_date: job.start_date,
            end_date: job.end_date,
            created_at: job.created_at,
            revision: job.revision,
            temporal_status: job.temporal_status(now),
            days_to_complete: job.days_to_complete(),
            summary: job_summary(&job.units),
            units: job.units.iter().map(|u| UnitView::new(u, now)).collect(),
        }
    }
}

/// Listing row: the job head and its roll-up, without units.
#[derive(Debug, Serialize)]
pub struct JobListItem<'a> {
    pub id: &'a str,
    pub bid_id: &'a str,
    pub property_ref: &'a str,
    pub revision: i64,
    pub temporal_status: TemporalStatus,
    pub summary: JobSummary,
}

impl<'a> JobListItem<'a> {
    pub fn new(job: &'a Job, now: NaiveDateTime) -> Self {
        Self {
            id: &job.id,
            bid_id: &job.bid_id,
            property_ref: &job.property_ref,
            revision: job.revision,
            temporal_status: job.temporal_status(now),
            summary: job_summary(&job.units),
        }
    }
}
