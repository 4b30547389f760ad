// src/domain/kanban.rs

use crate::domain::job::Job;
use crate::domain::status::WorkStatus;
use crate::errors::ServerError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A board cell, rendered as `"{unit_id}/{status_slug}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellId {
    pub unit_id: String,
    pub status: WorkStatus,
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.unit_id, self.status.slug())
    }
}

impl FromStr for CellId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (unit_id, status) = s
            .rsplit_once('/')
            .ok_or_else(|| format!("`{s}` is not a board cell"))?;
        if unit_id.is_empty() {
            return Err(format!("`{s}` has no unit"));
        }
        Ok(CellId {
            unit_id: unit_id.to_string(),
            status: status.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCell {
    pub cell_id: String,
    pub status: WorkStatus,
    pub task_ids: Vec<String>,
}

/// One unit's row of the board: its tasks partitioned into the four status buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitLane {
    pub unit_id: String,
    pub unit_number: String,
    pub cells: Vec<BoardCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub job_id: String,
    pub revision: i64,
    pub lanes: Vec<UnitLane>,
}

impl Board {
    pub fn from_job(job: &Job) -> Self {
        let lanes = job
            .units
            .iter()
            .map(|unit| UnitLane {
                unit_id: unit.id.clone(),
                unit_number: unit.unit_number.clone(),
                cells: WorkStatus::ALL
                    .into_iter()
                    .map(|status| BoardCell {
                        cell_id: CellId {
                            unit_id: unit.id.clone(),
                            status,
                        }
                        .to_string(),
                        status,
                        task_ids: unit
                            .tasks
                            .iter()
                            .filter(|t| t.status == status)
                            .map(|t| t.id.clone())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Board {
            job_id: job.id.clone(),
            revision: job.revision,
            lanes,
        }
    }

    pub fn bucket(&self, unit_id: &str, status: WorkStatus) -> &[String] {
        self.lanes
            .iter()
            .find(|lane| lane.unit_id == unit_id)
            .map(|lane| lane.cells[status.index()].task_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn lane_task_count(&self, unit_id: &str) -> usize {
        WorkStatus::ALL
            .into_iter()
            .map(|status| self.bucket(unit_id, status).len())
            .sum()
    }
}

/// Which status-to-status moves are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionGraph {
    /// Any status may move to any other, backward moves included.
    Unrestricted,
    Restricted(HashSet<(WorkStatus, WorkStatus)>),
}

impl TransitionGraph {
    /// Forward workflow with holds and reopening.
    pub fn strict() -> Self {
        use WorkStatus::*;
        TransitionGraph::Restricted(
            [
                (NotStarted, InProgress),
                (NotStarted, OnHold),
                (InProgress, Completed),
                (InProgress, OnHold),
                (OnHold, InProgress),
                (OnHold, NotStarted),
                (Completed, InProgress),
            ]
            .into_iter()
            .collect(),
        )
    }

    pub fn permits(&self, from: WorkStatus, to: WorkStatus) -> bool {
        match self {
            TransitionGraph::Unrestricted => true,
            TransitionGraph::Restricted(edges) => edges.contains(&(from, to)),
        }
    }
}

impl Default for TransitionGraph {
    fn default() -> Self {
        TransitionGraph::Unrestricted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved {
        task_id: String,
        unit_id: String,
        from: WorkStatus,
        to: WorkStatus,
    },
    /// The drop did not resolve to a new cell; the task stays where it was.
    Unchanged { task_id: String },
}

/// Drop `task_id` onto the board cell `target`.
///
/// Unparsable targets and cells of another unit leave the task in place. The
/// task's unit never changes. On a move the owning unit's roll-up is refreshed.
pub fn move_task(
    job: &mut Job,
    task_id: &str,
    target: &str,
    graph: &TransitionGraph,
) -> Result<MoveOutcome, ServerError> {
    let (unit, idx) = job
        .locate_task_mut(task_id)
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))?;

    let unchanged = || MoveOutcome::Unchanged {
        task_id: task_id.to_string(),
    };

    let Ok(cell) = target.parse::<CellId>() else {
        return Ok(unchanged());
    };
    if cell.unit_id != unit.id {
        return Ok(unchanged());
    }

    let from = unit.tasks[idx].status;
    if from == cell.status {
        return Ok(unchanged());
    }
    if !graph.permits(from, cell.status) {
        return Err(ServerError::Validation(format!(
            "task {task_id} cannot move from {from} to {}",
            cell.status
        )));
    }

    unit.tasks[idx].status = cell.status;
    unit.recalculate();

    Ok(MoveOutcome::Moved {
        task_id: task_id.to_string(),
        unit_id: unit.id.clone(),
        from,
        to: cell.status,
    })
}
