//! Storage for the kernel-owned `outbox` and `kernel_tasks` tables.

use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        kernel_task::{KernelTask, NewKernelTask},
        outbox::{NewOutboxEvent, OutboxEvent, OutboxStatus},
        types::{OutboxEventId, WorkspaceId},
    },
    models::kernel::{
        KernelTask as DbKernelTask, NewKernelTask as DbNewKernelTask,
        NewOutboxEvent as DbNewOutboxEvent, OutboxEvent as DbOutboxEvent,
    },
    repository::{
        DieselRepository, KernelReader, KernelWriter, OutboxDelivery,
        errors::{RepositoryError, RepositoryResult},
    },
};

/// Delivery attempts after which an outbox row is parked as `failed`.
pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;

impl KernelWriter for DieselRepository {
    fn enqueue_outbox_events(&self, events: &[NewOutboxEvent]) -> RepositoryResult<usize> {
        use crate::schema::outbox;

        if events.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewOutboxEvent> = events.iter().map(Into::into).collect();
        // Rows clashing on (workspace_id, dedupe_key) are skipped.
        let inserted = diesel::insert_or_ignore_into(outbox::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(inserted)
    }

    fn create_kernel_tasks(&self, tasks: &[NewKernelTask]) -> RepositoryResult<usize> {
        use crate::schema::kernel_tasks;

        if tasks.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewKernelTask> = tasks.iter().map(Into::into).collect();
        let inserted = diesel::insert_or_ignore_into(kernel_tasks::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(inserted)
    }
}

impl KernelReader for DieselRepository {
    fn list_kernel_tasks(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<KernelTask>> {
        use crate::schema::kernel_tasks;

        let mut conn = self.conn()?;
        let items = kernel_tasks::table
            .filter(kernel_tasks::workspace_id.eq(workspace_id.get()))
            .order(kernel_tasks::id.asc())
            .load::<DbKernelTask>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(KernelTask::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_outbox_events(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<OutboxEvent>> {
        use crate::schema::outbox;

        let mut conn = self.conn()?;
        let items = outbox::table
            .filter(outbox::workspace_id.eq(workspace_id.get()))
            .order(outbox::id.asc())
            .load::<DbOutboxEvent>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(OutboxEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl OutboxDelivery for DieselRepository {
    fn list_pending_outbox(&self, limit: usize) -> RepositoryResult<Vec<OutboxEvent>> {
        use crate::schema::outbox;

        let mut conn = self.conn()?;
        let items = outbox::table
            .filter(outbox::status.eq(OutboxStatus::Pending.to_string()))
            .order(outbox::id.asc())
            .limit(limit as i64)
            .load::<DbOutboxEvent>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(OutboxEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn mark_outbox_sent(&self, id: OutboxEventId) -> RepositoryResult<()> {
        use crate::schema::outbox;

        let mut conn = self.conn()?;
        let updated = diesel::update(outbox::table.filter(outbox::id.eq(id.get())))
            .set((
                outbox::status.eq(OutboxStatus::Sent.to_string()),
                outbox::attempts.eq(outbox::attempts + 1),
                outbox::sent_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn mark_outbox_failed(&self, id: OutboxEventId, error: &str) -> RepositoryResult<()> {
        use crate::schema::outbox;

        let mut conn = self.conn()?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            let updated = diesel::update(outbox::table.filter(outbox::id.eq(id.get())))
                .set((
                    outbox::attempts.eq(outbox::attempts + 1),
                    outbox::last_error.eq(error),
                ))
                .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            // Below the attempt limit the row stays pending and the relay retries it.
            diesel::update(
                outbox::table
                    .filter(outbox::id.eq(id.get()))
                    .filter(outbox::attempts.ge(MAX_DELIVERY_ATTEMPTS)),
            )
            .set(outbox::status.eq(OutboxStatus::Failed.to_string()))
            .execute(conn)?;

            Ok(())
        })
    }
}
