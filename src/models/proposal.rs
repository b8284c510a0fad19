use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    proposal::{
        AdProposal as DomainAdProposal, BlockReason, NewAdProposal as DomainNewAdProposal,
        ProposalAction, ProposalStatus,
    },
    types::{AdAccountId, AdCampaignId, ProposalId, TypeConstraintError, WorkspaceId},
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::ad_proposals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::proposal::AdProposal`].
pub struct AdProposal {
    pub id: i32,
    pub ad_account_id: i32,
    pub ad_campaign_id: i32,
    pub workspace_id: i32,
    pub action: String,
    pub current_budget_cents: Option<i64>,
    pub proposed_budget_cents: Option<i64>,
    pub reason: String,
    pub status: String,
    pub clamped: bool,
    pub block_reason: Option<String>,
    pub decided_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub decided_at: Option<NaiveDateTime>,
    pub executed_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ad_proposals)]
pub struct NewAdProposal<'a> {
    pub ad_account_id: i32,
    pub ad_campaign_id: i32,
    pub workspace_id: i32,
    pub action: &'static str,
    pub current_budget_cents: Option<i64>,
    pub proposed_budget_cents: Option<i64>,
    pub reason: &'a str,
    pub status: String,
    pub clamped: bool,
    pub block_reason: Option<String>,
}

impl TryFrom<AdProposal> for DomainAdProposal {
    type Error = TypeConstraintError;

    fn try_from(proposal: AdProposal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProposalId::new(proposal.id)?,
            ad_account_id: AdAccountId::new(proposal.ad_account_id)?,
            ad_campaign_id: AdCampaignId::new(proposal.ad_campaign_id)?,
            workspace_id: WorkspaceId::new(proposal.workspace_id)?,
            action: ProposalAction::from_parts(
                &proposal.action,
                proposal.current_budget_cents,
                proposal.proposed_budget_cents,
            )?,
            reason: proposal.reason,
            status: ProposalStatus::try_from(proposal.status.as_str())?,
            clamped: proposal.clamped,
            block_reason: proposal
                .block_reason
                .as_deref()
                .map(BlockReason::try_from)
                .transpose()?,
            decided_by: proposal.decided_by,
            created_at: proposal.created_at,
            decided_at: proposal.decided_at,
            executed_at: proposal.executed_at,
        })
    }
}

impl<'a> From<&'a DomainNewAdProposal> for NewAdProposal<'a> {
    fn from(proposal: &'a DomainNewAdProposal) -> Self {
        let (current, proposed) = match proposal.action {
            ProposalAction::BudgetChange { current, proposed } => {
                (Some(current.get()), Some(proposed.get()))
            }
            _ => (None, None),
        };
        Self {
            ad_account_id: proposal.ad_account_id.get(),
            ad_campaign_id: proposal.ad_campaign_id.get(),
            workspace_id: proposal.workspace_id.get(),
            action: proposal.action.kind(),
            current_budget_cents: current,
            proposed_budget_cents: proposed,
            reason: proposal.reason.as_str(),
            status: proposal.status.to_string(),
            clamped: proposal.clamped,
            block_reason: proposal.block_reason.map(|reason| reason.to_string()),
        }
    }
}
