use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{LeadEventId, LeadId, TypeConstraintError, UserEmail, WorkspaceId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LeadEvent {
    pub id: LeadEventId,
    pub lead_id: LeadId,
    pub workspace_id: WorkspaceId,
    pub event_type: LeadEventType,
    pub event_data: Value,
    pub author_email: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadEventType {
    Note,
    StatusChange,
    Email,
    Sms,
    Call,
    Other(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewLeadEvent {
    pub lead_id: LeadId,
    pub workspace_id: WorkspaceId,
    pub event_type: LeadEventType,
    pub event_data: Value,
    pub author_email: UserEmail,
}

impl NewLeadEvent {
    #[must_use]
    pub fn new(
        lead_id: LeadId,
        workspace_id: WorkspaceId,
        event_type: LeadEventType,
        event_data: Value,
        author_email: UserEmail,
    ) -> Self {
        Self {
            lead_id,
            workspace_id,
            event_type,
            event_data,
            author_email,
        }
    }
}

impl LeadEvent {
    pub fn try_new(
        id: i32,
        lead_id: i32,
        workspace_id: i32,
        event_type: String,
        event_data: Value,
        author_email: String,
        created_at: NaiveDateTime,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            id: LeadEventId::new(id)?,
            lead_id: LeadId::new(lead_id)?,
            workspace_id: WorkspaceId::new(workspace_id)?,
            event_type: event_type.into(),
            event_data,
            author_email,
            created_at,
        })
    }
}

impl Display for LeadEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadEventType::Note => write!(f, "note"),
            LeadEventType::StatusChange => write!(f, "status_change"),
            LeadEventType::Email => write!(f, "email"),
            LeadEventType::Sms => write!(f, "sms"),
            LeadEventType::Call => write!(f, "call"),
            LeadEventType::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for LeadEventType {
    fn from(s: &str) -> Self {
        match s {
            "note" => LeadEventType::Note,
            "status_change" => LeadEventType::StatusChange,
            "email" => LeadEventType::Email,
            "sms" => LeadEventType::Sms,
            "call" => LeadEventType::Call,
            _ => LeadEventType::Other(s.to_string()),
        }
    }
}

impl From<String> for LeadEventType {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}
