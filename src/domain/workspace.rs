//! Tenant workspace aggregate.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{WorkspaceId, WorkspaceName};

/// A customer account scope. Every tenant-owned row points at one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: WorkspaceName,
    /// When set, listings show synthetic sample data instead of live rows.
    pub demo_mode: bool,
    /// Demo leads have been generated for this workspace at least once.
    pub demo_seeded: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewWorkspace {
    pub name: WorkspaceName,
}

impl NewWorkspace {
    #[must_use]
    pub fn new(name: WorkspaceName) -> Self {
        Self { name }
    }
}
