use diesel::prelude::*;

use crate::domain::lead_event::{LeadEvent, NewLeadEvent};
use crate::models::lead_event::{LeadEvent as DbLeadEvent, NewLeadEvent as DbNewLeadEvent};
use crate::repository::{
    DieselRepository, LeadEventListQuery, LeadEventReader, LeadEventWriter,
    errors::RepositoryResult,
};

impl LeadEventReader for DieselRepository {
    fn list_lead_events(
        &self,
        query: LeadEventListQuery,
    ) -> RepositoryResult<(usize, Vec<LeadEvent>)> {
        use crate::schema::lead_events;

        let mut conn = self.conn()?;

        // Both predicates: an event is only visible through its own workspace.
        let query_builder = || {
            lead_events::table
                .filter(lead_events::lead_id.eq(query.lead_id.get()))
                .filter(lead_events::workspace_id.eq(query.workspace_id.get()))
                .into_boxed::<diesel::sqlite::Sqlite>()
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((
            lead_events::created_at.desc(),
            lead_events::id.desc(),
        ));
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let events = items
            .load::<DbLeadEvent>(&mut conn)?
            .into_iter()
            .map(LeadEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, events))
    }
}

impl LeadEventWriter for DieselRepository {
    fn create_lead_event(&self, event: &NewLeadEvent) -> RepositoryResult<LeadEvent> {
        use crate::schema::lead_events;

        let mut conn = self.conn()?;

        let new_event: DbNewLeadEvent = event.into();

        let created = diesel::insert_into(lead_events::table)
            .values(&new_event)
            .get_result::<DbLeadEvent>(&mut conn)?;

        Ok(LeadEvent::try_from(created)?)
    }
}
