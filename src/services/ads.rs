use chrono::Utc;

use crate::ads::executor::execute_approved_proposal;
use crate::ads::generator::{GeneratorConfig, generate_proposals as draft_proposals};
use crate::ads::governor::GuardrailConfig;
use crate::ads::submit_drafts;
use crate::domain::ad_account::{AdAccount, AdCampaign};
use crate::domain::proposal::{AdProposal, ProposalStatus};
use crate::domain::types::{AdAccountId, ProposalId, WorkspaceId};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{
    AdAccountReader, AdAccountWriter, KernelWriter, ProposalReader, ProposalWriter,
    WorkspaceReader,
};
use crate::services::{ServiceError, ServiceResult, ensure_access, ensure_admin};

fn find_account<R>(repo: &R, account_id: i32, workspace_id: WorkspaceId) -> ServiceResult<AdAccount>
where
    R: AdAccountReader + ?Sized,
{
    let account_id = AdAccountId::new(account_id).map_err(|_| ServiceError::NotFound)?;
    repo.get_ad_account(account_id, workspace_id)?
        .ok_or(ServiceError::NotFound)
}

fn proposal_id(id: i32) -> ServiceResult<ProposalId> {
    ProposalId::new(id).map_err(|_| ServiceError::NotFound)
}

pub fn list_ad_accounts<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<AdAccount>>
where
    R: AdAccountReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    Ok(repo.list_ad_accounts(workspace_id)?)
}

pub fn list_ad_campaigns<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
) -> ServiceResult<Vec<AdCampaign>>
where
    R: AdAccountReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    let account = find_account(repo, account_id, workspace_id)?;
    Ok(repo.list_ad_campaigns(account.id, workspace_id)?)
}

/// All proposals of an ad account, newest first.
pub fn list_proposals<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
) -> ServiceResult<Vec<AdProposal>>
where
    R: AdAccountReader + ProposalReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    let account = find_account(repo, account_id, workspace_id)?;
    Ok(repo.list_proposals(account.id, workspace_id)?)
}

/// Runs the proposal generators over an account's campaigns and stores the
/// governed result.
pub fn generate_proposals<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
    guardrails: &GuardrailConfig,
    generator: &GeneratorConfig,
) -> ServiceResult<Vec<AdProposal>>
where
    R: WorkspaceReader + AdAccountReader + ProposalReader + ProposalWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let account = find_account(repo, account_id, workspace_id)?;
    let campaigns = repo.list_ad_campaigns(account.id, workspace_id)?;

    let drafts = draft_proposals(&account, &campaigns, generator);
    log::info!(
        "Generated {} drafts for ad account {} from {} campaigns",
        drafts.len(),
        account.id,
        campaigns.len()
    );

    Ok(submit_drafts(
        repo,
        &account,
        &drafts,
        guardrails,
        Utc::now().naive_utc(),
    )?)
}

fn decide<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
    status: ProposalStatus,
) -> ServiceResult<AdProposal>
where
    R: WorkspaceReader + ProposalReader + ProposalWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let proposal = repo
        .get_proposal(proposal_id(id)?, workspace_id)?
        .ok_or(ServiceError::NotFound)?;

    if proposal.status != ProposalStatus::PendingApproval {
        return Err(ServiceError::Conflict(format!(
            "proposal is {} and no longer awaits approval",
            proposal.status
        )));
    }

    let decided = repo.decide_proposal(proposal.id, workspace_id, status, &user.user_email()?)?;
    log::info!("{} marked proposal {} as {status}", user.email, decided.id);
    Ok(decided)
}

pub fn approve_proposal<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<AdProposal>
where
    R: WorkspaceReader + ProposalReader + ProposalWriter + ?Sized,
{
    decide(repo, user, id, ProposalStatus::Approved)
}

pub fn reject_proposal<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<AdProposal>
where
    R: WorkspaceReader + ProposalReader + ProposalWriter + ?Sized,
{
    decide(repo, user, id, ProposalStatus::Rejected)
}

/// Applies an approved proposal. Refused while the account's execution gate is off.
pub fn execute_proposal<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<AdProposal>
where
    R: WorkspaceReader + ProposalReader + ProposalWriter + AdAccountReader + KernelWriter,
{
    let workspace_id = ensure_admin(repo, user)?;
    Ok(execute_approved_proposal(repo, proposal_id(id)?, workspace_id)?)
}

/// Opens or closes the execution gate of an ad account.
pub fn set_execution_enabled<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
    enabled: bool,
) -> ServiceResult<AdAccount>
where
    R: WorkspaceReader + AdAccountReader + AdAccountWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let account = find_account(repo, account_id, workspace_id)?;

    let updated = repo.set_execution_enabled(account.id, workspace_id, enabled)?;
    log::warn!(
        "{} set execution_enabled={enabled} on ad account {} in workspace {workspace_id}",
        user.email,
        account.id
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::proposal::ProposalAction;
    use crate::domain::types::{AdCampaignId, Cents};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{admin, member};

    fn account(enabled: bool) -> AdAccount {
        AdAccount {
            id: AdAccountId::new(2).expect("valid id"),
            workspace_id: WorkspaceId::new(7).expect("valid id"),
            platform: "meta".into(),
            name: "Main".into(),
            execution_enabled: enabled,
            daily_budget: Cents::new(10_000).expect("valid cents"),
            target_roas: 2.0,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn proposal(status: ProposalStatus) -> AdProposal {
        AdProposal {
            id: ProposalId::new(11).expect("valid id"),
            ad_account_id: AdAccountId::new(2).expect("valid id"),
            ad_campaign_id: AdCampaignId::new(3).expect("valid id"),
            workspace_id: WorkspaceId::new(7).expect("valid id"),
            action: ProposalAction::PauseCampaign,
            reason: "no conversions".into(),
            status,
            clamped: false,
            block_reason: None,
            decided_by: None,
            created_at: Utc::now().naive_utc(),
            decided_at: None,
            executed_at: None,
        }
    }

    #[test]
    fn proposals_of_foreign_account_are_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_ad_account().returning(|_, _| Ok(None));
        repo.expect_list_proposals().times(0);

        assert_eq!(
            list_proposals(&repo, &member(), 2),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn approving_decided_proposal_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_proposal()
            .returning(|_, _| Ok(Some(proposal(ProposalStatus::Rejected))));
        repo.expect_decide_proposal().times(0);

        assert!(matches!(
            approve_proposal(&repo, &admin(), 11),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn approval_records_the_decider() {
        let mut repo = MockRepository::new();
        repo.expect_get_proposal()
            .returning(|_, _| Ok(Some(proposal(ProposalStatus::PendingApproval))));
        repo.expect_decide_proposal()
            .withf(|id, ws, status, by| {
                id.get() == 11
                    && ws.get() == 7
                    && *status == ProposalStatus::Approved
                    && by.as_str() == "operator@example.com"
            })
            .times(1)
            .returning(|_, _, status, by| {
                let mut decided = proposal(status);
                decided.decided_by = Some(by.to_string());
                Ok(decided)
            });

        let decided = approve_proposal(&repo, &admin(), 11).expect("approves");
        assert_eq!(decided.status, ProposalStatus::Approved);
    }

    #[test]
    fn member_cannot_execute() {
        let mut repo = MockRepository::new();
        repo.expect_is_platform_admin().returning(|_| Ok(false));
        repo.expect_apply_proposal().times(0);

        assert_eq!(
            execute_proposal(&repo, &member(), 11),
            Err(ServiceError::Unauthorized)
        );
    }

    #[test]
    fn execution_gate_maps_to_its_own_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_proposal()
            .returning(|_, _| Ok(Some(proposal(ProposalStatus::Approved))));
        repo.expect_get_ad_account()
            .returning(|_, _| Ok(Some(account(false))));
        repo.expect_apply_proposal().times(0);

        assert_eq!(
            execute_proposal(&repo, &admin(), 11),
            Err(ServiceError::ExecutionDisabled)
        );
    }

    #[test]
    fn generation_with_no_signal_stores_nothing() {
        let mut repo = MockRepository::new();
        repo.expect_get_ad_account()
            .returning(|_, _| Ok(Some(account(false))));
        repo.expect_list_ad_campaigns().returning(|_, _| Ok(vec![]));
        repo.expect_create_proposals().times(0);

        let stored = generate_proposals(
            &repo,
            &admin(),
            2,
            &GuardrailConfig::default(),
            &GeneratorConfig::default(),
        )
        .expect("generates");
        assert!(stored.is_empty());
    }

    #[test]
    fn enabling_execution_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_is_platform_admin().returning(|_| Ok(false));
        repo.expect_set_execution_enabled().times(0);

        assert_eq!(
            set_execution_enabled(&repo, &member(), 2, true),
            Err(ServiceError::Unauthorized)
        );
    }
}
