// src/domain/status.rs

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow status shared by units and job tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl WorkStatus {
    /// Column order of the kanban board.
    pub const ALL: [WorkStatus; 4] = [
        WorkStatus::NotStarted,
        WorkStatus::InProgress,
        WorkStatus::Completed,
        WorkStatus::OnHold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkStatus::NotStarted => "Not Started",
            WorkStatus::InProgress => "In Progress",
            WorkStatus::Completed => "Completed",
            WorkStatus::OnHold => "On Hold",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            WorkStatus::NotStarted => "not_started",
            WorkStatus::InProgress => "in_progress",
            WorkStatus::Completed => "completed",
            WorkStatus::OnHold => "on_hold",
        }
    }

    pub fn index(self) -> usize {
        match self {
            WorkStatus::NotStarted => 0,
            WorkStatus::InProgress => 1,
            WorkStatus::Completed => 2,
            WorkStatus::OnHold => 3,
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the label ("In Progress") or the slug ("in_progress").
impl FromStr for WorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkStatus::ALL
            .into_iter()
            .find(|st| st.label() == s || st.slug() == s)
            .ok_or_else(|| format!("unknown status `{s}`"))
    }
}

/// Date-derived status of a bid, job or task.
/// `Unknown` is returned instead of failing when dates are missing or unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemporalStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    Unknown,
}

impl TemporalStatus {
    pub fn label(self) -> &'static str {
        match self {
            TemporalStatus::NotStarted => "Not Started",
            TemporalStatus::InProgress => "In Progress",
            TemporalStatus::Completed => "Completed",
            TemporalStatus::Unknown => "Unknown",
        }
    }
}

/// Parse a user- or store-supplied date into a local wall-clock instant.
/// A bare date means midnight of that day.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn date_start(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

/// Classify a start/end window against `now`.
///
/// `now < start` is Not Started, `start <= now <= end` is In Progress and
/// `now > end` is Completed. No timezone normalisation is applied.
pub fn classify(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> TemporalStatus {
    let (Some(start), Some(end)) = (start, end) else {
        return TemporalStatus::Unknown;
    };

    if now < start {
        TemporalStatus::NotStarted
    } else if now <= end {
        TemporalStatus::InProgress
    } else {
        TemporalStatus::Completed
    }
}

pub fn classify_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    now: NaiveDateTime,
) -> TemporalStatus {
    classify(start.and_then(date_start), end.and_then(date_start), now)
}

/// Calendar date of a supplied instant, in local time.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_instant(raw).map(|dt| dt.date())
}

/// Serde adapters so request payloads accept every format `parse_instant` does.
pub mod flexible_date {
    use super::parse_date;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date `{raw}`")))
    }

    pub fn option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => parse_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date `{raw}`"))),
        }
    }
}

/// Whole days between start and end; `None` when either is missing.
pub fn days_to_complete(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    Some((end? - start?).num_days())
}
