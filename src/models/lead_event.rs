//! Diesel models for storing lead activity.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    lead_event::{LeadEvent as DomainLeadEvent, NewLeadEvent as DomainNewLeadEvent},
    types::TypeConstraintError,
};
use crate::models::lead::Lead;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Lead, foreign_key = lead_id))]
#[diesel(table_name = crate::schema::lead_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LeadEvent {
    pub id: i32,
    pub lead_id: i32,
    pub workspace_id: i32,
    pub event_type: String,
    pub event_data: String, // store JSON text in the DB
    pub author_email: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::lead_events)]
pub struct NewLeadEvent {
    pub lead_id: i32,
    pub workspace_id: i32,
    pub event_type: String,
    pub event_data: String,
    pub author_email: String,
}

impl TryFrom<LeadEvent> for DomainLeadEvent {
    type Error = TypeConstraintError;

    fn try_from(event: LeadEvent) -> Result<Self, Self::Error> {
        let event_data = serde_json::from_str(&event.event_data).unwrap_or_default();

        DomainLeadEvent::try_new(
            event.id,
            event.lead_id,
            event.workspace_id,
            event.event_type,
            event_data,
            event.author_email,
            event.created_at,
        )
    }
}

impl<'a> From<&'a DomainNewLeadEvent> for NewLeadEvent {
    fn from(event: &'a DomainNewLeadEvent) -> Self {
        Self {
            lead_id: event.lead_id.get(),
            workspace_id: event.workspace_id.get(),
            event_type: event.event_type.to_string(),
            event_data: event.event_data.to_string(),
            author_email: event.author_email.as_str().to_string(),
        }
    }
}
