//! Diesel models for the kernel-owned tables: `outbox` and `kernel_tasks`.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    kernel_task::{KernelTask as DomainKernelTask, NewKernelTask as DomainNewKernelTask},
    outbox::{NewOutboxEvent as DomainNewOutboxEvent, OutboxEvent as DomainOutboxEvent, OutboxStatus},
    types::{KernelTaskId, LeadId, OutboxEventId, TypeConstraintError, WorkspaceId},
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::outbox)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OutboxEvent {
    pub id: i32,
    pub workspace_id: i32,
    pub topic: String,
    pub payload: String,
    pub dedupe_key: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::outbox)]
pub struct NewOutboxEvent<'a> {
    pub workspace_id: i32,
    pub topic: &'a str,
    pub payload: String,
    pub dedupe_key: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::kernel_tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KernelTask {
    pub id: i32,
    pub workspace_id: i32,
    pub policy: String,
    pub title: String,
    pub lead_id: Option<i32>,
    pub dedupe_key: String,
    pub done: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::kernel_tasks)]
pub struct NewKernelTask<'a> {
    pub workspace_id: i32,
    pub policy: &'a str,
    pub title: &'a str,
    pub lead_id: Option<i32>,
    pub dedupe_key: &'a str,
}

impl TryFrom<OutboxEvent> for DomainOutboxEvent {
    type Error = TypeConstraintError;

    fn try_from(event: OutboxEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OutboxEventId::new(event.id)?,
            workspace_id: WorkspaceId::new(event.workspace_id)?,
            topic: event.topic,
            payload: serde_json::from_str(&event.payload).unwrap_or_default(),
            dedupe_key: event.dedupe_key,
            status: OutboxStatus::try_from(event.status.as_str())?,
            attempts: event.attempts,
            last_error: event.last_error,
            created_at: event.created_at,
            sent_at: event.sent_at,
        })
    }
}

impl<'a> From<&'a DomainNewOutboxEvent> for NewOutboxEvent<'a> {
    fn from(event: &'a DomainNewOutboxEvent) -> Self {
        Self {
            workspace_id: event.workspace_id.get(),
            topic: event.topic.as_str(),
            payload: event.payload.to_string(),
            dedupe_key: event.dedupe_key.as_str(),
        }
    }
}

impl TryFrom<KernelTask> for DomainKernelTask {
    type Error = TypeConstraintError;

    fn try_from(task: KernelTask) -> Result<Self, Self::Error> {
        Ok(Self {
            id: KernelTaskId::new(task.id)?,
            workspace_id: WorkspaceId::new(task.workspace_id)?,
            policy: task.policy,
            title: task.title,
            lead_id: task.lead_id.map(LeadId::new).transpose()?,
            dedupe_key: task.dedupe_key,
            done: task.done,
            created_at: task.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewKernelTask> for NewKernelTask<'a> {
    fn from(task: &'a DomainNewKernelTask) -> Self {
        Self {
            workspace_id: task.workspace_id.get(),
            policy: task.policy.as_str(),
            title: task.title.as_str(),
            lead_id: task.lead_id.map(LeadId::get),
            dedupe_key: task.dedupe_key.as_str(),
        }
    }
}
