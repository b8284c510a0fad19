//! Ad mutation proposals and their governance lifecycle.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AdAccountId, AdCampaignId, Cents, ProposalId, TypeConstraintError, WorkspaceId,
};

/// Mutation a proposal wants to apply to one ad campaign.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposalAction {
    BudgetChange { current: Cents, proposed: Cents },
    PauseCampaign,
    EnableCampaign,
}

impl ProposalAction {
    pub fn kind(&self) -> &'static str {
        match self {
            ProposalAction::BudgetChange { .. } => "budget_change",
            ProposalAction::PauseCampaign => "pause_campaign",
            ProposalAction::EnableCampaign => "enable_campaign",
        }
    }

    /// Rebuilds an action from its stored columns.
    pub fn from_parts(
        kind: &str,
        current: Option<i64>,
        proposed: Option<i64>,
    ) -> Result<Self, TypeConstraintError> {
        match (kind, current, proposed) {
            ("budget_change", Some(current), Some(proposed)) => Ok(ProposalAction::BudgetChange {
                current: Cents::new(current)?,
                proposed: Cents::new(proposed)?,
            }),
            ("pause_campaign", _, _) => Ok(ProposalAction::PauseCampaign),
            ("enable_campaign", _, _) => Ok(ProposalAction::EnableCampaign),
            _ => Err(TypeConstraintError::InvalidValue(format!(
                "malformed proposal action `{kind}`"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    PendingApproval,
    AutoApproved,
    Approved,
    Rejected,
    Executed,
    Blocked,
}

impl ProposalStatus {
    /// Statuses from which execution may proceed.
    pub fn is_executable(self) -> bool {
        matches!(self, ProposalStatus::AutoApproved | ProposalStatus::Approved)
    }

    /// Counted against the per-account daily action limit.
    pub fn consumes_allowance(self) -> bool {
        matches!(
            self,
            ProposalStatus::PendingApproval
                | ProposalStatus::AutoApproved
                | ProposalStatus::Approved
                | ProposalStatus::Executed
        )
    }
}

impl Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            ProposalStatus::PendingApproval => "pending_approval",
            ProposalStatus::AutoApproved => "auto_approved",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Executed => "executed",
            ProposalStatus::Blocked => "blocked",
        };
        write!(f, "{value}")
    }
}

impl TryFrom<&str> for ProposalStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending_approval" => Ok(ProposalStatus::PendingApproval),
            "auto_approved" => Ok(ProposalStatus::AutoApproved),
            "approved" => Ok(ProposalStatus::Approved),
            "rejected" => Ok(ProposalStatus::Rejected),
            "executed" => Ok(ProposalStatus::Executed),
            "blocked" => Ok(ProposalStatus::Blocked),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown proposal status `{other}`"
            ))),
        }
    }
}

/// Why the governor refused a proposal outright.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    RateLimited,
    NoOp,
}

impl Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::RateLimited => write!(f, "rate_limited"),
            BlockReason::NoOp => write!(f, "no_op"),
        }
    }
}

impl TryFrom<&str> for BlockReason {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "rate_limited" => Ok(BlockReason::RateLimited),
            "no_op" => Ok(BlockReason::NoOp),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown block reason `{other}`"
            ))),
        }
    }
}

/// Ungoverned suggestion produced by a generator or a kernel policy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProposalDraft {
    pub ad_campaign_id: AdCampaignId,
    pub action: ProposalAction,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdProposal {
    pub id: ProposalId,
    pub ad_account_id: AdAccountId,
    pub ad_campaign_id: AdCampaignId,
    pub workspace_id: WorkspaceId,
    pub action: ProposalAction,
    pub reason: String,
    pub status: ProposalStatus,
    pub clamped: bool,
    pub block_reason: Option<BlockReason>,
    pub decided_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub decided_at: Option<NaiveDateTime>,
    pub executed_at: Option<NaiveDateTime>,
}

/// Governed proposal ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAdProposal {
    pub ad_account_id: AdAccountId,
    pub ad_campaign_id: AdCampaignId,
    pub workspace_id: WorkspaceId,
    pub action: ProposalAction,
    pub reason: String,
    pub status: ProposalStatus,
    pub clamped: bool,
    pub block_reason: Option<BlockReason>,
}
