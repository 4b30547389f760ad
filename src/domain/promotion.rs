// src/domain/promotion.rs

use crate::domain::bid::{Bid, BidStatus, ScopeType};
use crate::domain::job::{Job, JobTask, Unit};
use crate::domain::reference::{InventoryUnit, JobCategory};
use crate::domain::status::WorkStatus;
use crate::errors::ServerError;
use chrono::NaiveDateTime;

/// Turns an accepted bid into a job.
///
/// Unit-scoped bids get exactly the selected inventory units; category-scoped
/// bids cover the whole inventory. Every assigned unit receives one task per
/// selected job category, numbered from 1, dated like the bid.
pub fn promote(
    bid: &Bid,
    inventory: &[InventoryUnit],
    categories: &[JobCategory],
    created_at: NaiveDateTime,
    mut next_id: impl FnMut(&str) -> String,
) -> Result<Job, ServerError> {
    if bid.status != BidStatus::Accepted {
        return Err(ServerError::Conflict(format!(
            "bid {} is {} and cannot be promoted",
            bid.id, bid.status
        )));
    }

    let assigned: Vec<&InventoryUnit> = match bid.scope_type {
        ScopeType::JobCategory => inventory.iter().collect(),
        ScopeType::Unit => {
            if let Some(missing) = bid
                .units
                .iter()
                .find(|id| !inventory.iter().any(|u| &u.id == *id))
            {
                return Err(ServerError::Validation(format!(
                    "bid {} selects unknown unit `{missing}`",
                    bid.id
                )));
            }
            inventory
                .iter()
                .filter(|u| bid.units.contains(&u.id))
                .collect()
        }
    };

    let scope: Vec<&JobCategory> = bid
        .job_categories
        .iter()
        .map(|id| {
            categories.iter().find(|c| &c.id == id).ok_or_else(|| {
                ServerError::Validation(format!(
                    "bid {} selects unknown job category `{id}`",
                    bid.id
                ))
            })
        })
        .collect::<Result<_, _>>()?;

    let job_id = bid.id.clone();
    let units = assigned
        .into_iter()
        .map(|inv| {
            let unit_id = next_id("unit");
            let tasks = scope
                .iter()
                .zip(1..)
                .map(|(category, job_number)| JobTask {
                    id: next_id("task"),
                    unit_id: unit_id.clone(),
                    job_number,
                    name: category.name.clone(),
                    status: WorkStatus::NotStarted,
                    start_date: Some(bid.start_date),
                    end_date: Some(bid.end_date),
                    contractor_name: None,
                    budget: 0.0,
                    bid_amount: 0.0,
                    invoiced_amount: 0.0,
                })
                .collect();

            let mut unit = Unit {
                id: unit_id,
                job_id: job_id.clone(),
                unit_number: inv.unit_number.clone(),
                floor_plan: inv.floor_plan.clone(),
                status: WorkStatus::NotStarted,
                total_bid: 0.0,
                total_budget: 0.0,
                total_invoiced: 0.0,
                percent_complete: 0.0,
                pre_rent: inv.pre_rent,
                post_rent: inv.post_rent,
                tasks,
            };
            unit.recalculate();
            unit
        })
        .collect();

    Ok(Job {
        id: job_id,
        bid_id: bid.id.clone(),
        property_ref: bid.property_ref.clone(),
        start_date: bid.start_date,
        end_date: bid.end_date,
        created_at,
        revision: 0,
        units,
    })
}
