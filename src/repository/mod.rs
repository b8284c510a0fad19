//! Persistence boundary: reader/writer traits and their Diesel implementation.
//!
//! Every tenant-owned query takes the caller's [`WorkspaceId`] and filters by
//! it, so a row belonging to another workspace behaves as if it did not exist.

use std::time::Duration;

use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

use crate::domain::{
    ad_account::{AdAccount, AdCampaign, NewAdAccount, NewAdCampaign},
    campaign::{Campaign, CampaignStatus, NewCampaign},
    kernel_task::{KernelTask, NewKernelTask},
    lead::{Lead, LeadStatus, NewLead},
    lead_event::{LeadEvent, NewLeadEvent},
    outbox::{NewOutboxEvent, OutboxEvent},
    proposal::{AdProposal, NewAdProposal, ProposalStatus},
    types::{
        AdAccountId, AdCampaignId, CampaignId, LeadEmail, LeadId, OutboxEventId, ProposalId,
        UserEmail, WorkspaceId,
    },
    workspace::{NewWorkspace, Workspace},
};
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod ad_account;
pub mod campaign;
pub mod errors;
pub mod kernel;
pub mod lead;
pub mod lead_event;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod proposal;
pub mod workspace;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas applied each time a connection is handed out by the pool.
#[derive(Debug)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a Diesel connection pool for the given database URL.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout: Duration::from_secs(30),
        }))
        .build(manager)
}

/// Repository backed by a pooled SQLite database. Cheap to clone.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        self.pool.get().map_err(|e| {
            log::error!("Failed to get connection from pool: {e}");
            RepositoryError::from(e)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Row offset for the requested page (pages are 1-based).
    pub fn offset(&self) -> i64 {
        ((self.page.max(1) - 1) * self.per_page) as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadListQuery {
    pub workspace_id: WorkspaceId,
    /// Selects the demo or the live partition of the workspace.
    pub demo: bool,
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub pagination: Option<Pagination>,
}

impl LeadListQuery {
    pub fn new(workspace_id: WorkspaceId, demo: bool) -> Self {
        Self {
            workspace_id,
            demo,
            search: None,
            status: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadEventListQuery {
    pub lead_id: LeadId,
    pub workspace_id: WorkspaceId,
    pub pagination: Option<Pagination>,
}

impl LeadEventListQuery {
    pub fn new(lead_id: LeadId, workspace_id: WorkspaceId) -> Self {
        Self {
            lead_id,
            workspace_id,
            pagination: None,
        }
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait WorkspaceReader {
    fn get_workspace(&self, id: WorkspaceId) -> RepositoryResult<Option<Workspace>>;
    fn list_workspaces(&self) -> RepositoryResult<Vec<Workspace>>;
    fn is_platform_admin(&self, email: &UserEmail) -> RepositoryResult<bool>;
}

pub trait WorkspaceWriter {
    fn create_workspace(&self, new_workspace: &NewWorkspace) -> RepositoryResult<Workspace>;
    fn set_demo_mode(&self, id: WorkspaceId, enabled: bool) -> RepositoryResult<Workspace>;
    fn mark_demo_seeded(&self, id: WorkspaceId) -> RepositoryResult<()>;
    fn add_platform_admin(&self, email: &UserEmail) -> RepositoryResult<()>;
}

pub trait LeadReader {
    fn get_lead_by_id(&self, id: LeadId, workspace_id: WorkspaceId)
    -> RepositoryResult<Option<Lead>>;
    /// Looks the email up within one partition (demo or live) of the workspace.
    fn get_lead_by_email(
        &self,
        email: &LeadEmail,
        workspace_id: WorkspaceId,
        demo: bool,
    ) -> RepositoryResult<Option<Lead>>;
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
    /// Leads of one partition paired with the time of their latest event.
    fn list_leads_with_last_activity(
        &self,
        workspace_id: WorkspaceId,
        demo: bool,
    ) -> RepositoryResult<Vec<(Lead, Option<NaiveDateTime>)>>;
}

pub trait LeadWriter {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
    /// Bulk insert that skips rows clashing with an existing email.
    fn create_leads(&self, new_leads: &[NewLead]) -> RepositoryResult<usize>;
    fn update_lead_status(
        &self,
        id: LeadId,
        workspace_id: WorkspaceId,
        status: LeadStatus,
    ) -> RepositoryResult<Lead>;
    fn delete_lead(&self, id: LeadId, workspace_id: WorkspaceId) -> RepositoryResult<()>;
}

pub trait LeadEventReader {
    fn list_lead_events(
        &self,
        query: LeadEventListQuery,
    ) -> RepositoryResult<(usize, Vec<LeadEvent>)>;
}

pub trait LeadEventWriter {
    fn create_lead_event(&self, event: &NewLeadEvent) -> RepositoryResult<LeadEvent>;
}

pub trait CampaignReader {
    fn get_campaign_by_id(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Campaign>>;
    fn list_campaigns(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<Campaign>>;
}

pub trait CampaignWriter {
    fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign>;
    fn update_campaign_status(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
        status: CampaignStatus,
    ) -> RepositoryResult<Campaign>;
}

pub trait AdAccountReader {
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

pub trait AdAccountWriter {
    fn create_ad_account(&self, new_account: &NewAdAccount) -> RepositoryResult<AdAccount>;
    fn create_ad_campaign(&self, new_campaign: &NewAdCampaign) -> RepositoryResult<AdCampaign>;
    fn set_execution_enabled(
        &self,
        id: AdAccountId,
        workspace_id: WorkspaceId,
        enabled: bool,
    ) -> RepositoryResult<AdAccount>;
}

pub trait ProposalReader {
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
    /// Proposals awaiting approval or execution, oldest first.
    fn list_open_proposals(&self, workspace_id: WorkspaceId)
    -> RepositoryResult<Vec<AdProposal>>;
    /// Proposals of any status created since `since`.
    fn list_proposals_since(
        &self,
        workspace_id: WorkspaceId,
        since: NaiveDateTime,
    ) -> RepositoryResult<Vec<AdProposal>>;
    /// Slots of the daily allowance in use: proposals executed since `since`
    /// plus every proposal still awaiting approval or execution.
    fn count_actions_since(
        &self,
        ad_account_id: AdAccountId,
        workspace_id: WorkspaceId,
        since: NaiveDateTime,
    ) -> RepositoryResult<usize>;
}

pub trait ProposalWriter {
    fn create_proposals(&self, proposals: &[NewAdProposal]) -> RepositoryResult<Vec<AdProposal>>;
    fn decide_proposal(
        &self,
        id: ProposalId,
        workspace_id: WorkspaceId,
        status: ProposalStatus,
        decided_by: &UserEmail,
    ) -> RepositoryResult<AdProposal>;
    /// Applies the proposal to its ad campaign and marks it executed, atomically.
    fn apply_proposal(&self, proposal: &AdProposal) -> RepositoryResult<AdProposal>;
}

/// Write access to the kernel-owned tables. Only the kernel dispatcher calls it.
pub trait KernelWriter {
    fn enqueue_outbox_events(&self, events: &[NewOutboxEvent]) -> RepositoryResult<usize>;
    fn create_kernel_tasks(&self, tasks: &[NewKernelTask]) -> RepositoryResult<usize>;
}

pub trait KernelReader {
    fn list_kernel_tasks(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<KernelTask>>;
    fn list_outbox_events(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<OutboxEvent>>;
}

/// Delivery bookkeeping used by the outbox relay.
pub trait OutboxDelivery {
    fn list_pending_outbox(&self, limit: usize) -> RepositoryResult<Vec<OutboxEvent>>;
    fn mark_outbox_sent(&self, id: OutboxEventId) -> RepositoryResult<()>;
    fn mark_outbox_failed(&self, id: OutboxEventId, error: &str) -> RepositoryResult<()>;
}
