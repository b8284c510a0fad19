//! Ad-spend automation: proposal generation, governance and gated execution.

use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::domain::ad_account::AdAccount;
use crate::domain::proposal::{AdProposal, ProposalDraft, ProposalStatus};
use crate::repository::errors::RepositoryError;
use crate::repository::{ProposalReader, ProposalWriter};

pub mod executor;
pub mod generator;
pub mod governor;

use governor::{GuardrailConfig, govern_proposals};

#[derive(Debug, Error)]
pub enum AdsError {
    #[error("proposal not found")]
    NotFound,
    #[error("proposal is {0} and cannot be executed")]
    NotExecutable(ProposalStatus),
    #[error("execution is disabled for this ad account")]
    ExecutionDisabled,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type AdsResult<T> = Result<T, AdsError>;

/// Midnight (UTC) of the day containing `now`; the daily allowance resets here.
pub fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

/// Governs drafts for one account against today's allowance and stores them.
///
/// The allowance in use counts today's executions and every proposal still
/// waiting to be decided or executed.
pub fn submit_drafts<R>(
    repo: &R,
    account: &AdAccount,
    drafts: &[ProposalDraft],
    guardrails: &GuardrailConfig,
    now: NaiveDateTime,
) -> Result<Vec<AdProposal>, RepositoryError>
where
    R: ProposalReader + ProposalWriter + ?Sized,
{
    if drafts.is_empty() {
        return Ok(vec![]);
    }

    let actions_today =
        repo.count_actions_since(account.id, account.workspace_id, start_of_day(now))?;
    let governed = govern_proposals(account, drafts, guardrails, actions_today);
    let stored = repo.create_proposals(&governed)?;

    log::info!(
        "Stored {} proposals for ad account {} ({} already used today)",
        stored.len(),
        account.id,
        actions_today
    );

    Ok(stored)
}
