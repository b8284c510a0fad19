//! Follow-up tasks created by Revenue OS kernel policies.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{KernelTaskId, LeadId, WorkspaceId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KernelTask {
    pub id: KernelTaskId,
    pub workspace_id: WorkspaceId,
    /// Name of the policy that asked for the task.
    pub policy: String,
    pub title: String,
    pub lead_id: Option<LeadId>,
    pub dedupe_key: String,
    pub done: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewKernelTask {
    pub workspace_id: WorkspaceId,
    pub policy: String,
    pub title: String,
    pub lead_id: Option<LeadId>,
    pub dedupe_key: String,
}
