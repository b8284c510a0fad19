use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::{
        lead::{Lead, LeadStatus, NewLead},
        types::{LeadEmail, LeadId, WorkspaceId},
    },
    models::lead::{Lead as DbLead, NewLead as DbNewLead},
    repository::{
        DieselRepository, LeadListQuery, LeadReader, LeadWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

fn into_domain(items: Vec<DbLead>) -> RepositoryResult<Vec<Lead>> {
    Ok(items
        .into_iter()
        .map(Lead::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(
        &self,
        id: LeadId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Lead>> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let lead = leads::table
            .filter(leads::id.eq(id.get()))
            .filter(leads::workspace_id.eq(workspace_id.get()))
            .first::<DbLead>(&mut conn)
            .optional()?;

        Ok(lead.map(Lead::try_from).transpose()?)
    }

    fn get_lead_by_email(
        &self,
        email: &LeadEmail,
        workspace_id: WorkspaceId,
        demo: bool,
    ) -> RepositoryResult<Option<Lead>> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let lead = leads::table
            .filter(leads::email.eq(email.as_str()))
            .filter(leads::workspace_id.eq(workspace_id.get()))
            .filter(leads::is_demo.eq(demo))
            .first::<DbLead>(&mut conn)
            .optional()?;

        Ok(lead.map(Lead::try_from).transpose()?)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
        use crate::schema::leads;

        let mut conn = self.conn()?;

        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let query_builder = || {
            let mut items = leads::table
                .filter(leads::workspace_id.eq(query.workspace_id.get()))
                .filter(leads::is_demo.eq(query.demo))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(status) = &query.status {
                items = items.filter(leads::status.eq(status.to_string()));
            }

            if let Some(pattern) = &pattern {
                items = items.filter(
                    leads::name
                        .like(pattern.clone())
                        .or(leads::email.assume_not_null().like(pattern.clone()))
                        .or(leads::phone.assume_not_null().like(pattern.clone())),
                );
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order(leads::id.asc());
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let items = into_domain(items.load::<DbLead>(&mut conn)?)?;

        Ok((total, items))
    }

    fn list_leads_with_last_activity(
        &self,
        workspace_id: WorkspaceId,
        demo: bool,
    ) -> RepositoryResult<Vec<(Lead, Option<NaiveDateTime>)>> {
        use crate::schema::{lead_events, leads};

        let mut conn = self.conn()?;

        let items = leads::table
            .filter(leads::workspace_id.eq(workspace_id.get()))
            .filter(leads::is_demo.eq(demo))
            .order(leads::id.asc())
            .load::<DbLead>(&mut conn)?;

        let last_activity: HashMap<i32, Option<NaiveDateTime>> = lead_events::table
            .filter(lead_events::workspace_id.eq(workspace_id.get()))
            .group_by(lead_events::lead_id)
            .select((lead_events::lead_id, diesel::dsl::max(lead_events::created_at)))
            .load::<(i32, Option<NaiveDateTime>)>(&mut conn)?
            .into_iter()
            .collect();

        items
            .into_iter()
            .map(|db_lead| -> RepositoryResult<(Lead, Option<NaiveDateTime>)> {
                let last = last_activity.get(&db_lead.id).copied().flatten();
                Ok((Lead::try_from(db_lead)?, last))
            })
            .collect()
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let insertable: DbNewLead = new_lead.into();
        let created = diesel::insert_into(leads::table)
            .values(&insertable)
            .get_result::<DbLead>(&mut conn)?;

        Ok(Lead::try_from(created)?)
    }

    fn create_leads(&self, new_leads: &[NewLead]) -> RepositoryResult<usize> {
        use crate::schema::leads;

        if new_leads.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewLead> = new_leads.iter().map(Into::into).collect();
        let affected = diesel::insert_or_ignore_into(leads::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_lead_status(
        &self,
        id: LeadId,
        workspace_id: WorkspaceId,
        status: LeadStatus,
    ) -> RepositoryResult<Lead> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            leads::table
                .filter(leads::id.eq(id.get()))
                .filter(leads::workspace_id.eq(workspace_id.get())),
        )
        .set((
            leads::status.eq(status.to_string()),
            leads::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbLead>(&mut conn)?;

        Ok(Lead::try_from(updated)?)
    }

    fn delete_lead(&self, id: LeadId, workspace_id: WorkspaceId) -> RepositoryResult<()> {
        use crate::schema::leads;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            leads::table
                .filter(leads::id.eq(id.get()))
                .filter(leads::workspace_id.eq(workspace_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
