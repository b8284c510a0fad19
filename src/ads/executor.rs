//! Applies approved proposals, gated by the account's `execution_enabled` flag.

use serde_json::json;

use crate::ads::{AdsError, AdsResult};
use crate::domain::proposal::AdProposal;
use crate::domain::types::{ProposalId, WorkspaceId};
use crate::kernel::Decision;
use crate::kernel::dispatcher::Dispatcher;
use crate::repository::{
    AdAccountReader, KernelWriter, ProposalReader, ProposalWriter, WorkspaceReader,
};

/// Outbox topic consumed by the platform sync worker.
pub const ADS_MUTATION_TOPIC: &str = "ads.mutation";

/// Executes an approved proposal for `workspace_id`.
///
/// Nothing is mutated unless the proposal is executable and its ad account has
/// execution enabled.
pub fn execute_approved_proposal<R>(
    repo: &R,
    proposal_id: ProposalId,
    workspace_id: WorkspaceId,
) -> AdsResult<AdProposal>
where
    R: ProposalReader + ProposalWriter + AdAccountReader + WorkspaceReader + KernelWriter,
{
    let proposal = repo
        .get_proposal(proposal_id, workspace_id)?
        .ok_or(AdsError::NotFound)?;

    if !proposal.status.is_executable() {
        return Err(AdsError::NotExecutable(proposal.status));
    }

    let account = repo
        .get_ad_account(proposal.ad_account_id, workspace_id)?
        .ok_or(AdsError::NotFound)?;

    if !account.execution_enabled {
        log::warn!(
            "Refusing to execute proposal {} because ad account {} has execution disabled",
            proposal.id,
            account.id
        );
        return Err(AdsError::ExecutionDisabled);
    }

    let executed = repo.apply_proposal(&proposal)?;
    log::info!(
        "Executed proposal {} ({}) on ad campaign {}",
        executed.id,
        executed.action.kind(),
        executed.ad_campaign_id
    );

    let decision = Decision::EnqueueMessage {
        topic: ADS_MUTATION_TOPIC.to_string(),
        payload: json!({
            "proposal_id": executed.id,
            "ad_account_id": executed.ad_account_id,
            "ad_campaign_id": executed.ad_campaign_id,
            "platform": account.platform,
            "action": executed.action,
        }),
        dedupe_key: format!("{ADS_MUTATION_TOPIC}:{}", executed.id),
    };

    // The campaign row is already updated; a failed enqueue is reported but
    // does not turn a completed execution into an error.
    match repo.get_workspace(workspace_id) {
        Ok(Some(workspace)) => {
            if let Err(e) = Dispatcher::new(repo).dispatch(&workspace, vec![decision]) {
                log::error!("Failed to enqueue mutation for proposal {}: {e}", executed.id);
            }
        }
        Ok(None) => log::error!("Workspace {workspace_id} vanished during execution"),
        Err(e) => log::error!("Failed to load workspace {workspace_id}: {e}"),
    }

    Ok(executed)
}
