//! Domain aggregates exposed by the UbiGrowth service layer.

pub mod ad_account;
pub mod campaign;
pub mod kernel_task;
pub mod lead;
pub mod lead_event;
pub mod outbox;
pub mod proposal;
pub mod types;
pub mod workspace;
