//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::ad_account::{AdAccount, AdCampaign, NewAdAccount, NewAdCampaign};
use crate::domain::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::domain::kernel_task::{KernelTask, NewKernelTask};
use crate::domain::lead::{Lead, LeadStatus, NewLead};
use crate::domain::lead_event::{LeadEvent, NewLeadEvent};
use crate::domain::outbox::{NewOutboxEvent, OutboxEvent};
use crate::domain::proposal::{AdProposal, NewAdProposal, ProposalStatus};
use crate::domain::types::{
    AdAccountId, AdCampaignId, CampaignId, LeadEmail, LeadId, OutboxEventId, ProposalId,
    UserEmail, WorkspaceId,
};
use crate::domain::workspace::{NewWorkspace, Workspace};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AdAccountReader, AdAccountWriter, CampaignReader, CampaignWriter, KernelReader, KernelWriter,
    LeadEventListQuery, LeadEventReader, LeadEventWriter, LeadListQuery, LeadReader, LeadWriter,
    OutboxDelivery, ProposalReader, ProposalWriter, WorkspaceReader, WorkspaceWriter,
};

mock! {
    pub Repository {}

    impl WorkspaceReader for Repository {
        fn get_workspace(&self, id: WorkspaceId) -> RepositoryResult<Option<Workspace>>;
        fn list_workspaces(&self) -> RepositoryResult<Vec<Workspace>>;
        fn is_platform_admin(&self, email: &UserEmail) -> RepositoryResult<bool>;
    }

    impl WorkspaceWriter for Repository {
        fn create_workspace(&self, new_workspace: &NewWorkspace) -> RepositoryResult<Workspace>;
        fn set_demo_mode(&self, id: WorkspaceId, enabled: bool) -> RepositoryResult<Workspace>;
        fn mark_demo_seeded(&self, id: WorkspaceId) -> RepositoryResult<()>;
        fn add_platform_admin(&self, email: &UserEmail) -> RepositoryResult<()>;
    }

    impl LeadReader for Repository {
        fn get_lead_by_id(&self, id: LeadId, workspace_id: WorkspaceId) -> RepositoryResult<Option<Lead>>;
        fn get_lead_by_email(
            &self,
            email: &LeadEmail,
            workspace_id: WorkspaceId,
            demo: bool,
        ) -> RepositoryResult<Option<Lead>>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
        fn list_leads_with_last_activity(
            &self,
            workspace_id: WorkspaceId,
            demo: bool,
        ) -> RepositoryResult<Vec<(Lead, Option<NaiveDateTime>)>>;
    }

    impl LeadWriter for Repository {
        fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
        fn create_leads(&self, new_leads: &[NewLead]) -> RepositoryResult<usize>;
        fn update_lead_status(
            &self,
            id: LeadId,
            workspace_id: WorkspaceId,
            status: LeadStatus,
        ) -> RepositoryResult<Lead>;
        fn delete_lead(&self, id: LeadId, workspace_id: WorkspaceId) -> RepositoryResult<()>;
    }

    impl LeadEventReader for Repository {
        fn list_lead_events(
            &self,
            query: LeadEventListQuery,
        ) -> RepositoryResult<(usize, Vec<LeadEvent>)>;
    }

    impl LeadEventWriter for Repository {
        fn create_lead_event(&self, event: &NewLeadEvent) -> RepositoryResult<LeadEvent>;
    }

    impl CampaignReader for Repository {
        fn get_campaign_by_id(
            &self,
            id: CampaignId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<Campaign>>;
        fn list_campaigns(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<Campaign>>;
    }

    impl CampaignWriter for Repository {
        fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign>;
        fn update_campaign_status(
            &self,
            id: CampaignId,
            workspace_id: WorkspaceId,
            status: CampaignStatus,
        ) -> RepositoryResult<Campaign>;
    }

    impl AdAccountReader for Repository {
        fn get_ad_account(
            &self,
            id: AdAccountId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<AdAccount>>;
        fn list_ad_accounts(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<AdAccount>>;
        fn get_ad_campaign(
            &self,
            id: AdCampaignId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<AdCampaign>>;
        fn list_ad_campaigns(
            &self,
            ad_account_id: AdAccountId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Vec<AdCampaign>>;
    }

    impl AdAccountWriter for Repository {
        fn create_ad_account(&self, new_account: &NewAdAccount) -> RepositoryResult<AdAccount>;
        fn create_ad_campaign(&self, new_campaign: &NewAdCampaign) -> RepositoryResult<AdCampaign>;
        fn set_execution_enabled(
            &self,
            id: AdAccountId,
            workspace_id: WorkspaceId,
            enabled: bool,
        ) -> RepositoryResult<AdAccount>;
    }

    impl ProposalReader for Repository {
        fn get_proposal(
            &self,
            id: ProposalId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Option<AdProposal>>;
        fn list_proposals(
            &self,
            ad_account_id: AdAccountId,
            workspace_id: WorkspaceId,
        ) -> RepositoryResult<Vec<AdProposal>>;
        fn list_open_proposals(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<AdProposal>>;
        fn list_proposals_since(
            &self,
            workspace_id: WorkspaceId,
            since: NaiveDateTime,
        ) -> RepositoryResult<Vec<AdProposal>>;
        fn count_actions_since(
            &self,
            ad_account_id: AdAccountId,
            workspace_id: WorkspaceId,
            since: NaiveDateTime,
        ) -> RepositoryResult<usize>;
    }

    impl ProposalWriter for Repository {
        fn create_proposals(&self, proposals: &[NewAdProposal]) -> RepositoryResult<Vec<AdProposal>>;
        fn decide_proposal(
            &self,
            id: ProposalId,
            workspace_id: WorkspaceId,
            status: ProposalStatus,
            decided_by: &UserEmail,
        ) -> RepositoryResult<AdProposal>;
        fn apply_proposal(&self, proposal: &AdProposal) -> RepositoryResult<AdProposal>;
    }

    impl KernelWriter for Repository {
        fn enqueue_outbox_events(&self, events: &[NewOutboxEvent]) -> RepositoryResult<usize>;
        fn create_kernel_tasks(&self, tasks: &[NewKernelTask]) -> RepositoryResult<usize>;
    }

    impl KernelReader for Repository {
        fn list_kernel_tasks(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<KernelTask>>;
        fn list_outbox_events(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<OutboxEvent>>;
    }

    impl OutboxDelivery for Repository {
        fn list_pending_outbox(&self, limit: usize) -> RepositoryResult<Vec<OutboxEvent>>;
        fn mark_outbox_sent(&self, id: OutboxEventId) -> RepositoryResult<()>;
        fn mark_outbox_failed(&self, id: OutboxEventId, error: &str) -> RepositoryResult<()>;
    }
}
