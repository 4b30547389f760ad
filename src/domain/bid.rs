// src/domain/bid.rs

use crate::domain::status::{classify_dates, days_to_complete, flexible_date, TemporalStatus};
use crate::errors::ServerError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    JobCategory,
    Unit,
}

impl ScopeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeType::JobCategory => "job_category",
            ScopeType::Unit => "unit",
        }
    }
}

impl FromStr for ScopeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_category" => Ok(ScopeType::JobCategory),
            "unit" => Ok(ScopeType::Unit),
            other => Err(format!("unknown scope type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BidStatus::Pending => "pending",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BidStatus::Pending),
            "accepted" => Ok(BidStatus::Accepted),
            "rejected" => Ok(BidStatus::Rejected),
            other => Err(format!("unknown bid status `{other}`")),
        }
    }
}

/// A renovation solicitation sent to contractors.
/// Selections reference categories, units and contractors by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub requester_name: String,
    pub requester_email: String,
    pub requester_phone: Option<String>,
    pub company_name: Option<String>,
    pub property_ref: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub scope_type: ScopeType,
    pub job_categories: Vec<String>,
    pub units: Vec<String>,
    pub contractors: Vec<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub status: BidStatus,
}

impl Bid {
    pub fn temporal_status(&self, now: NaiveDateTime) -> TemporalStatus {
        classify_dates(Some(self.start_date), Some(self.end_date), now)
    }

    pub fn days_to_complete(&self) -> Option<i64> {
        days_to_complete(Some(self.start_date), Some(self.end_date))
    }

    /// Accept and reject are only valid from `pending`.
    pub fn transition(&mut self, next: BidStatus) -> Result<(), ServerError> {
        if self.status != BidStatus::Pending || next == BidStatus::Pending {
            return Err(ServerError::Conflict(format!(
                "bid {} is {} and cannot become {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// Payload produced by the bid wizard.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    pub requester_name: String,
    pub requester_email: String,
    #[serde(default)]
    pub requester_phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub property_ref: String,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    #[serde(with = "flexible_date")]
    pub end_date: NaiveDate,
    pub scope_type: ScopeType,
    #[serde(default)]
    pub job_categories: Vec<String>,
    #[serde(default)]
    pub units: Vec<String>,
    #[serde(default)]
    pub contractors: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Ids that exist in the reference tables, used to check a bid's selections.
#[derive(Debug, Default)]
pub struct KnownReferences {
    pub job_categories: HashSet<String>,
    pub units: HashSet<String>,
    pub contractors: HashSet<String>,
}

impl NewBid {
    /// Validates the wizard payload and builds a pending bid.
    pub fn into_bid(
        self,
        id: String,
        created_at: NaiveDateTime,
        known: &KnownReferences,
    ) -> Result<Bid, ServerError> {
        let requester_name = required("requester_name", &self.requester_name)?;
        let requester_email = normalize_email(&self.requester_email)?;
        let property_ref = required("property_ref", &self.property_ref)?;

        if self.start_date > self.end_date {
            return Err(ServerError::Validation(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }

        let job_categories = dedup(self.job_categories);
        let units = dedup(self.units);
        let contractors = dedup(self.contractors);

        match self.scope_type {
            ScopeType::JobCategory if job_categories.is_empty() => {
                return Err(ServerError::Validation(
                    "a job-category bid needs at least one job category".into(),
                ));
            }
            ScopeType::Unit if units.is_empty() => {
                return Err(ServerError::Validation(
                    "a unit bid needs at least one unit".into(),
                ));
            }
            _ => {}
        }

        check_known("job category", &job_categories, &known.job_categories)?;
        check_known("unit", &units, &known.units)?;
        check_known("contractor", &contractors, &known.contractors)?;

        Ok(Bid {
            id,
            requester_name,
            requester_email,
            requester_phone: optional(self.requester_phone),
            company_name: optional(self.company_name),
            property_ref,
            start_date: self.start_date,
            end_date: self.end_date,
            scope_type: self.scope_type,
            job_categories,
            units,
            contractors,
            notes: optional(self.notes),
            created_at,
            status: BidStatus::Pending,
        })
    }
}

/// Trim + lowercase, minimal sanity check.
pub fn normalize_email(email: &str) -> Result<String, ServerError> {
    let e = email.trim().to_lowercase();
    if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
        return Err(ServerError::Validation(format!("invalid email `{email}`")));
    }
    Ok(e)
}

pub fn required(field: &str, value: &str) -> Result<String, ServerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServerError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

fn check_known(kind: &str, ids: &[String], known: &HashSet<String>) -> Result<(), ServerError> {
    match ids.iter().find(|id| !known.contains(*id)) {
        Some(missing) => Err(ServerError::Validation(format!("unknown {kind} `{missing}`"))),
        None => Ok(()),
    }
}
