// src/state.rs
use crate::db::Database;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::kanban::TransitionGraph;
use std::sync::Arc;

/// Everything a request handler needs, shared by every astra worker.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub clock: Arc<dyn Clock>,
    pub transitions: TransitionGraph,
}

impl AppState {
    pub fn new(db: Database, strict_transitions: bool) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            transitions: if strict_transitions {
                TransitionGraph::strict()
            } else {
                TransitionGraph::Unrestricted
            },
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}
