//! Repository implementation for workspaces and platform administrators.

use diesel::prelude::*;

use crate::{
    domain::{
        types::{UserEmail, WorkspaceId},
        workspace::{NewWorkspace, Workspace},
    },
    models::workspace::{NewWorkspace as DbNewWorkspace, Workspace as DbWorkspace},
    repository::{DieselRepository, WorkspaceReader, WorkspaceWriter, errors::RepositoryResult},
};

impl WorkspaceReader for DieselRepository {
    fn get_workspace(&self, id: WorkspaceId) -> RepositoryResult<Option<Workspace>> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        let workspace = workspaces::table
            .find(id.get())
            .first::<DbWorkspace>(&mut conn)
            .optional()?;

        Ok(workspace.map(Workspace::try_from).transpose()?)
    }

    fn list_workspaces(&self) -> RepositoryResult<Vec<Workspace>> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        let items = workspaces::table
            .order(workspaces::id.asc())
            .load::<DbWorkspace>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(Workspace::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn is_platform_admin(&self, email: &UserEmail) -> RepositoryResult<bool> {
        use crate::schema::platform_admins;

        let mut conn = self.conn()?;
        let count: i64 = platform_admins::table
            .filter(platform_admins::email.eq(email.as_str()))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }
}

impl WorkspaceWriter for DieselRepository {
    fn create_workspace(&self, new_workspace: &NewWorkspace) -> RepositoryResult<Workspace> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        let db_new: DbNewWorkspace = new_workspace.into();
        let created = diesel::insert_into(workspaces::table)
            .values(&db_new)
            .get_result::<DbWorkspace>(&mut conn)?;

        Ok(Workspace::try_from(created)?)
    }

    fn set_demo_mode(&self, id: WorkspaceId, enabled: bool) -> RepositoryResult<Workspace> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        let updated = diesel::update(workspaces::table.find(id.get()))
            .set(workspaces::demo_mode.eq(enabled))
            .get_result::<DbWorkspace>(&mut conn)?;

        Ok(Workspace::try_from(updated)?)
    }

    fn mark_demo_seeded(&self, id: WorkspaceId) -> RepositoryResult<()> {
        use crate::schema::workspaces;

        let mut conn = self.conn()?;
        diesel::update(workspaces::table.find(id.get()))
            .set(workspaces::demo_seeded.eq(true))
            .execute(&mut conn)?;

        Ok(())
    }

    fn add_platform_admin(&self, email: &UserEmail) -> RepositoryResult<()> {
        use crate::schema::platform_admins;

        let mut conn = self.conn()?;
        diesel::insert_or_ignore_into(platform_admins::table)
            .values(platform_admins::email.eq(email.as_str()))
            .execute(&mut conn)?;

        Ok(())
    }
}
