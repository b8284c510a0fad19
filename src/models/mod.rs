//! Database models shared across the UbiGrowth repository.

pub mod ad_account;
#[cfg(feature = "server")]
pub mod auth;
pub mod campaign;
pub mod config;
pub mod kernel;
pub mod lead;
pub mod lead_event;
pub mod proposal;
pub mod workspace;
pub mod zmq;
