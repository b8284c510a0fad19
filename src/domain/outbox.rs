//! Side-effect requests queued for downstream delivery workers.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{OutboxEventId, TypeConstraintError, WorkspaceId};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

impl Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboxStatus::Pending => write!(f, "pending"),
            OutboxStatus::Sent => write!(f, "sent"),
            OutboxStatus::Failed => write!(f, "failed"),
        }
    }
}

impl TryFrom<&str> for OutboxStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(OutboxStatus::Pending),
            "sent" => Ok(OutboxStatus::Sent),
            "failed" => Ok(OutboxStatus::Failed),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown outbox status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OutboxEvent {
    pub id: OutboxEventId,
    pub workspace_id: WorkspaceId,
    /// Routing key for delivery workers, e.g. `outreach.email` or `ads.mutation`.
    pub topic: String,
    pub payload: Value,
    pub dedupe_key: String,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewOutboxEvent {
    pub workspace_id: WorkspaceId,
    pub topic: String,
    pub payload: Value,
    /// Unique per workspace; a repeated key is silently skipped.
    pub dedupe_key: String,
}
