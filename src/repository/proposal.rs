use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::{
        ad_account::AdCampaignStatus,
        proposal::{AdProposal, NewAdProposal, ProposalAction, ProposalStatus},
        types::{AdAccountId, ProposalId, UserEmail, WorkspaceId},
    },
    models::proposal::{AdProposal as DbAdProposal, NewAdProposal as DbNewAdProposal},
    repository::{
        DieselRepository, ProposalReader, ProposalWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

/// Statuses of proposals that still await a decision or execution.
fn open_statuses() -> Vec<String> {
    [
        ProposalStatus::PendingApproval,
        ProposalStatus::AutoApproved,
        ProposalStatus::Approved,
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl ProposalReader for DieselRepository {
    fn get_proposal(
        &self,
        id: ProposalId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<AdProposal>> {
        use crate::schema::ad_proposals;

        let mut conn = self.conn()?;
        let proposal = ad_proposals::table
            .filter(ad_proposals::id.eq(id.get()))
            .filter(ad_proposals::workspace_id.eq(workspace_id.get()))
            .first::<DbAdProposal>(&mut conn)
            .optional()?;

        Ok(proposal.map(AdProposal::try_from).transpose()?)
    }

    fn list_proposals(
        &self,
        ad_account_id: AdAccountId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Vec<AdProposal>> {
        use crate::schema::ad_proposals;

        let mut conn = self.conn()?;
        let items = ad_proposals::table
            .filter(ad_proposals::ad_account_id.eq(ad_account_id.get()))
            .filter(ad_proposals::workspace_id.eq(workspace_id.get()))
            .order((ad_proposals::created_at.desc(), ad_proposals::id.desc()))
            .load::<DbAdProposal>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(AdProposal::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_open_proposals(
        &self,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Vec<AdProposal>> {
        use crate::schema::ad_proposals;

        let mut conn = self.conn()?;
        let items = ad_proposals::table
            .filter(ad_proposals::workspace_id.eq(workspace_id.get()))
            .filter(ad_proposals::status.eq_any(open_statuses()))
            .order((ad_proposals::created_at.asc(), ad_proposals::id.asc()))
            .load::<DbAdProposal>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(AdProposal::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_proposals_since(
        &self,
        workspace_id: WorkspaceId,
        since: NaiveDateTime,
    ) -> RepositoryResult<Vec<AdProposal>> {
        use crate::schema::ad_proposals;

        let mut conn = self.conn()?;
        let items = ad_proposals::table
            .filter(ad_proposals::workspace_id.eq(workspace_id.get()))
            .filter(ad_proposals::created_at.ge(since))
            .order((ad_proposals::created_at.asc(), ad_proposals::id.asc()))
            .load::<DbAdProposal>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(AdProposal::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn count_actions_since(
        &self,
        ad_account_id: AdAccountId,
        workspace_id: WorkspaceId,
        since: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::ad_proposals;

        let mut conn = self.conn()?;
        // Open proposals hold their slot whenever they were created, so a
        // backlog carried over from yesterday still counts once executed today.
        let count = ad_proposals::table
            .filter(ad_proposals::ad_account_id.eq(ad_account_id.get()))
            .filter(ad_proposals::workspace_id.eq(workspace_id.get()))
            .filter(
                ad_proposals::executed_at
                    .assume_not_null()
                    .ge(since)
                    .or(ad_proposals::status.eq_any(open_statuses())),
            )
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count as usize)
    }
}

impl ProposalWriter for DieselRepository {
    fn create_proposals(&self, proposals: &[NewAdProposal]) -> RepositoryResult<Vec<AdProposal>> {
        use crate::schema::ad_proposals;

        if proposals.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewAdProposal> = proposals.iter().map(Into::into).collect();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut created = Vec::with_capacity(insertables.len());
            for insertable in &insertables {
                let row = diesel::insert_into(ad_proposals::table)
                    .values(insertable)
                    .get_result::<DbAdProposal>(conn)?;
                created.push(AdProposal::try_from(row)?);
            }
            Ok(created)
        })
    }

    fn decide_proposal(
        &self,
        id: ProposalId,
        workspace_id: WorkspaceId,
        status: ProposalStatus,
        decided_by: &UserEmail,
    ) -> RepositoryResult<AdProposal> {
        use crate::schema::ad_proposals;

        let mut conn = self.conn()?;
        // Only pending proposals can be decided; anything else reports NotFound.
        let updated = diesel::update(
            ad_proposals::table
                .filter(ad_proposals::id.eq(id.get()))
                .filter(ad_proposals::workspace_id.eq(workspace_id.get()))
                .filter(ad_proposals::status.eq(ProposalStatus::PendingApproval.to_string())),
        )
        .set((
            ad_proposals::status.eq(status.to_string()),
            ad_proposals::decided_by.eq(decided_by.as_str()),
            ad_proposals::decided_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbAdProposal>(&mut conn)?;

        Ok(AdProposal::try_from(updated)?)
    }

    fn apply_proposal(&self, proposal: &AdProposal) -> RepositoryResult<AdProposal> {
        use crate::schema::{ad_campaigns, ad_proposals};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let target = ad_campaigns::table
                .filter(ad_campaigns::id.eq(proposal.ad_campaign_id.get()))
                .filter(ad_campaigns::ad_account_id.eq(proposal.ad_account_id.get()))
                .filter(ad_campaigns::workspace_id.eq(proposal.workspace_id.get()));

            let affected = match proposal.action {
                ProposalAction::BudgetChange { proposed, .. } => diesel::update(target)
                    .set((
                        ad_campaigns::daily_budget_cents.eq(proposed.get()),
                        ad_campaigns::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                ProposalAction::PauseCampaign => diesel::update(target)
                    .set((
                        ad_campaigns::status.eq(AdCampaignStatus::Paused.to_string()),
                        ad_campaigns::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                ProposalAction::EnableCampaign => diesel::update(target)
                    .set((
                        ad_campaigns::status.eq(AdCampaignStatus::Enabled.to_string()),
                        ad_campaigns::updated_at.eq(now),
                    ))
                    .execute(conn)?,
            };

            if affected == 0 {
                return Err(RepositoryError::NotFound);
            }

            let executed = diesel::update(
                ad_proposals::table
                    .filter(ad_proposals::id.eq(proposal.id.get()))
                    .filter(ad_proposals::workspace_id.eq(proposal.workspace_id.get())),
            )
            .set((
                ad_proposals::status.eq(ProposalStatus::Executed.to_string()),
                ad_proposals::executed_at.eq(now),
            ))
            .get_result::<DbAdProposal>(conn)?;

            Ok(AdProposal::try_from(executed)?)
        })
    }
}
