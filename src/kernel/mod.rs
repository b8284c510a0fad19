//! Revenue OS kernel.
//!
//! Each tick builds a read-only [`KernelSnapshot`] per workspace, lets every
//! [`Policy`] turn it into [`Decision`]s and hands those to the
//! [`dispatcher::Dispatcher`], which is the only writer of the outbox and
//! kernel task tables. Policies never touch storage, the network or the clock.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::ads::governor::GuardrailConfig;
use crate::ads::start_of_day;
use crate::domain::ad_account::{AdAccount, AdCampaign};
use crate::domain::lead::Lead;
use crate::domain::proposal::{AdProposal, ProposalDraft};
use crate::domain::types::{AdAccountId, LeadId, WorkspaceId};
use crate::domain::workspace::Workspace;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    AdAccountReader, KernelWriter, LeadReader, ProposalReader, ProposalWriter, WorkspaceReader,
};

pub mod dispatcher;
pub mod policies;

use dispatcher::{DispatchReport, Dispatcher};

/// Topic prefix of messages that reach leads (`outreach.email`, ...).
pub const OUTREACH_TOPIC_PREFIX: &str = "outreach.";

/// Thresholds used by the built-in policies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    pub follow_up_after_hours: i64,
    pub stale_proposal_hours: i64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            follow_up_after_hours: 24,
            stale_proposal_hours: 48,
        }
    }
}

/// A lead together with the time of its latest recorded activity.
#[derive(Clone, Debug, PartialEq)]
pub struct LeadActivity {
    pub lead: Lead,
    pub last_activity: Option<NaiveDateTime>,
}

impl LeadActivity {
    /// Latest activity, falling back to when the lead was created.
    pub fn last_touched(&self) -> NaiveDateTime {
        self.last_activity
            .map_or(self.lead.created_at, |at| at.max(self.lead.created_at))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdAccountSnapshot {
    pub account: AdAccount,
    pub campaigns: Vec<AdCampaign>,
}

/// Everything a policy may look at for one workspace at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelSnapshot {
    pub workspace_id: WorkspaceId,
    pub demo_mode: bool,
    pub now: NaiveDateTime,
    /// Leads of the partition matching the workspace's demo mode.
    pub leads: Vec<LeadActivity>,
    pub ad_accounts: Vec<AdAccountSnapshot>,
    /// Proposals still waiting for approval or execution.
    pub open_proposals: Vec<AdProposal>,
    /// Proposals created since UTC midnight, whatever their outcome.
    pub proposals_today: Vec<AdProposal>,
}

/// Side effect requested by a policy, carried out by the dispatcher.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    CreateTask {
        policy: &'static str,
        title: String,
        lead_id: Option<LeadId>,
        dedupe_key: String,
    },
    EnqueueMessage {
        topic: String,
        payload: Value,
        dedupe_key: String,
    },
    ProposeAdAction {
        ad_account_id: AdAccountId,
        draft: ProposalDraft,
    },
}

impl Decision {
    /// Messages addressed to leads. Demo workspaces never send these.
    pub fn is_outreach(&self) -> bool {
        matches!(
            self,
            Decision::EnqueueMessage { topic, .. } if topic.starts_with(OUTREACH_TOPIC_PREFIX)
        )
    }
}

/// Pure rule over a snapshot.
pub trait Policy {
    fn name(&self) -> &'static str;
    fn evaluate(&self, snapshot: &KernelSnapshot) -> Vec<Decision>;
}

/// The built-in policy set.
pub fn default_policies(config: &KernelConfig) -> Vec<Box<dyn Policy>> {
    vec![
        Box::new(policies::LeadFollowUpPolicy::new(config.follow_up_after_hours)),
        Box::new(policies::SpendPacingPolicy),
        Box::new(policies::StaleProposalPolicy::new(config.stale_proposal_hours)),
    ]
}

/// Loads the snapshot for `workspace` as of `now`.
pub fn build_snapshot<R>(
    repo: &R,
    workspace: &Workspace,
    now: NaiveDateTime,
) -> RepositoryResult<KernelSnapshot>
where
    R: LeadReader + AdAccountReader + ProposalReader,
{
    let leads = repo
        .list_leads_with_last_activity(workspace.id, workspace.demo_mode)?
        .into_iter()
        .map(|(lead, last_activity)| LeadActivity {
            lead,
            last_activity,
        })
        .collect();

    let ad_accounts = repo
        .list_ad_accounts(workspace.id)?
        .into_iter()
        .map(|account| {
            let campaigns = repo.list_ad_campaigns(account.id, workspace.id)?;
            Ok(AdAccountSnapshot { account, campaigns })
        })
        .collect::<RepositoryResult<Vec<_>>>()?;

    Ok(KernelSnapshot {
        workspace_id: workspace.id,
        demo_mode: workspace.demo_mode,
        now,
        leads,
        ad_accounts,
        open_proposals: repo.list_open_proposals(workspace.id)?,
        proposals_today: repo.list_proposals_since(workspace.id, start_of_day(now))?,
    })
}

/// Outcome of one workspace within a tick.
#[derive(Debug)]
pub struct WorkspaceOutcome {
    pub workspace_id: WorkspaceId,
    pub result: Result<DispatchReport, RepositoryError>,
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub outcomes: Vec<WorkspaceOutcome>,
}

impl TickReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

fn tick_workspace<R>(
    repo: &R,
    workspace: &Workspace,
    policies: &[Box<dyn Policy>],
    guardrails: &GuardrailConfig,
    now: NaiveDateTime,
) -> RepositoryResult<DispatchReport>
where
    R: LeadReader + AdAccountReader + ProposalReader + ProposalWriter + KernelWriter,
{
    let snapshot = build_snapshot(repo, workspace, now)?;

    let decisions: Vec<Decision> = policies
        .iter()
        .flat_map(|policy| {
            let decisions = policy.evaluate(&snapshot);
            log::debug!(
                "Policy {} produced {} decisions for workspace {}",
                policy.name(),
                decisions.len(),
                workspace.id
            );
            decisions
        })
        .collect();

    Dispatcher::new(repo)
        .with_guardrails(guardrails.clone())
        .at(now)
        .dispatch(workspace, decisions)
}

/// Runs every policy for every workspace, one workspace at a time.
///
/// A failing workspace is recorded in the report and does not stop the tick.
pub fn run_kernel_tick<R>(
    repo: &R,
    policies: &[Box<dyn Policy>],
    guardrails: &GuardrailConfig,
    now: NaiveDateTime,
) -> RepositoryResult<TickReport>
where
    R: WorkspaceReader
        + LeadReader
        + AdAccountReader
        + ProposalReader
        + ProposalWriter
        + KernelWriter,
{
    let mut report = TickReport::default();

    for workspace in repo.list_workspaces()? {
        let result = tick_workspace(repo, &workspace, policies, guardrails, now);
        match &result {
            Ok(dispatched) => log::info!("Kernel tick for workspace {}: {dispatched}", workspace.id),
            Err(e) => log::error!("Kernel tick failed for workspace {}: {e}", workspace.id),
        }
        report.outcomes.push(WorkspaceOutcome {
            workspace_id: workspace.id,
            result,
        });
    }

    Ok(report)
}
