pub mod bid;
pub mod clock;
pub mod ids;
pub mod job;
pub mod kanban;
pub mod metrics;
pub mod promotion;
pub mod reference;
pub mod status;
pub mod views;
