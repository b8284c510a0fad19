use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    types::{TypeConstraintError, WorkspaceId, WorkspaceName},
    workspace::{NewWorkspace as DomainNewWorkspace, Workspace as DomainWorkspace},
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::workspaces)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::workspace::Workspace`].
pub struct Workspace {
    pub id: i32,
    pub name: String,
    pub demo_mode: bool,
    pub demo_seeded: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::workspaces)]
pub struct NewWorkspace<'a> {
    pub name: &'a str,
}

impl TryFrom<Workspace> for DomainWorkspace {
    type Error = TypeConstraintError;

    fn try_from(workspace: Workspace) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkspaceId::new(workspace.id)?,
            name: WorkspaceName::new(workspace.name)?,
            demo_mode: workspace.demo_mode,
            demo_seeded: workspace.demo_seeded,
            created_at: workspace.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewWorkspace> for NewWorkspace<'a> {
    fn from(workspace: &'a DomainNewWorkspace) -> Self {
        Self {
            name: workspace.name.as_str(),
        }
    }
}
