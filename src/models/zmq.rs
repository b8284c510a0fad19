//! Wire format of outbox events published to delivery workers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::outbox::OutboxEvent;

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ZmqOutboxMessage {
    pub id: i32,
    pub workspace_id: i32,
    pub topic: String,
    pub payload: Value,
}

impl From<&OutboxEvent> for ZmqOutboxMessage {
    fn from(event: &OutboxEvent) -> Self {
        Self {
            id: event.id.get(),
            workspace_id: event.workspace_id.get(),
            topic: event.topic.clone(),
            payload: event.payload.clone(),
        }
    }
}
