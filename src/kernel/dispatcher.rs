//! The single writer of the `outbox` and `kernel_tasks` tables.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{NaiveDateTime, Utc};

use crate::ads::governor::GuardrailConfig;
use crate::ads::submit_drafts;
use crate::domain::kernel_task::NewKernelTask;
use crate::domain::outbox::NewOutboxEvent;
use crate::domain::proposal::ProposalDraft;
use crate::domain::types::AdAccountId;
use crate::domain::workspace::Workspace;
use crate::kernel::Decision;
use crate::repository::errors::RepositoryResult;
use crate::repository::{AdAccountReader, KernelWriter, ProposalReader, ProposalWriter};

/// Counters describing what a dispatch wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub tasks_created: usize,
    pub messages_enqueued: usize,
    /// Outreach dropped because the workspace is in demo mode.
    pub messages_suppressed: usize,
    pub proposals_created: usize,
}

impl Display for DispatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tasks, {} messages ({} suppressed), {} proposals",
            self.tasks_created,
            self.messages_enqueued,
            self.messages_suppressed,
            self.proposals_created
        )
    }
}

/// Turns decisions into rows. Duplicate `dedupe_key`s within a workspace are
/// silently skipped, so dispatching the same decision twice is harmless.
pub struct Dispatcher<'a, R> {
    repo: &'a R,
    guardrails: GuardrailConfig,
    now: NaiveDateTime,
}

impl<'a, R> Dispatcher<'a, R>
where
    R: KernelWriter + AdAccountReader + ProposalReader + ProposalWriter,
{
    pub fn new(repo: &'a R) -> Self {
        Self {
            repo,
            guardrails: GuardrailConfig::default(),
            now: Utc::now().naive_utc(),
        }
    }

    #[must_use]
    pub fn with_guardrails(mut self, guardrails: GuardrailConfig) -> Self {
        self.guardrails = guardrails;
        self
    }

    #[must_use]
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn dispatch(
        &self,
        workspace: &Workspace,
        decisions: Vec<Decision>,
    ) -> RepositoryResult<DispatchReport> {
        let mut report = DispatchReport::default();
        let mut tasks = Vec::new();
        let mut messages = Vec::new();
        let mut drafts: BTreeMap<AdAccountId, Vec<ProposalDraft>> = BTreeMap::new();

        for decision in decisions {
            match decision {
                Decision::CreateTask {
                    policy,
                    title,
                    lead_id,
                    dedupe_key,
                } => tasks.push(NewKernelTask {
                    workspace_id: workspace.id,
                    policy: policy.to_string(),
                    title,
                    lead_id,
                    dedupe_key,
                }),
                decision if workspace.demo_mode && decision.is_outreach() => {
                    log::debug!("Suppressing demo outreach {decision:?}");
                    report.messages_suppressed += 1;
                }
                Decision::EnqueueMessage {
                    topic,
                    payload,
                    dedupe_key,
                } => messages.push(NewOutboxEvent {
                    workspace_id: workspace.id,
                    topic,
                    payload,
                    dedupe_key,
                }),
                Decision::ProposeAdAction {
                    ad_account_id,
                    draft,
                } => drafts.entry(ad_account_id).or_default().push(draft),
            }
        }

        if report.messages_suppressed > 0 {
            log::info!(
                "Workspace {} is in demo mode, suppressed {} outreach messages",
                workspace.id,
                report.messages_suppressed
            );
        }

        if !tasks.is_empty() {
            report.tasks_created = self.repo.create_kernel_tasks(&tasks)?;
        }
        if !messages.is_empty() {
            report.messages_enqueued = self.repo.enqueue_outbox_events(&messages)?;
        }

        for (ad_account_id, drafts) in drafts {
            let Some(account) = self.repo.get_ad_account(ad_account_id, workspace.id)? else {
                log::warn!(
                    "Dropping {} proposals for unknown ad account {ad_account_id}",
                    drafts.len()
                );
                continue;
            };
            let stored = submit_drafts(self.repo, &account, &drafts, &self.guardrails, self.now)?;
            report.proposals_created += stored.len();
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{LeadId, WorkspaceId, WorkspaceName};
    use crate::repository::mock::MockRepository;
    use serde_json::json;

    fn workspace(demo_mode: bool) -> Workspace {
        Workspace {
            id: WorkspaceId::new(3).expect("valid id"),
            name: WorkspaceName::new("Acme").expect("valid name"),
            demo_mode,
            demo_seeded: demo_mode,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn decisions() -> Vec<Decision> {
        vec![
            Decision::CreateTask {
                policy: "lead_follow_up",
                title: "Follow up".into(),
                lead_id: Some(LeadId::new(9).expect("valid id")),
                dedupe_key: "lead_follow_up:9".into(),
            },
            Decision::EnqueueMessage {
                topic: "outreach.email".into(),
                payload: json!({"lead_id": 9}),
                dedupe_key: "outreach:1:9".into(),
            },
        ]
    }

    #[test]
    fn writes_tasks_and_messages_for_workspace() {
        let mut repo = MockRepository::new();
        repo.expect_create_kernel_tasks()
            .withf(|tasks| tasks.len() == 1 && tasks[0].workspace_id.get() == 3)
            .times(1)
            .returning(|tasks| Ok(tasks.len()));
        repo.expect_enqueue_outbox_events()
            .withf(|events| events.len() == 1 && events[0].dedupe_key == "outreach:1:9")
            .times(1)
            .returning(|events| Ok(events.len()));

        let report = Dispatcher::new(&repo)
            .dispatch(&workspace(false), decisions())
            .expect("dispatches");

        assert_eq!(report.tasks_created, 1);
        assert_eq!(report.messages_enqueued, 1);
        assert_eq!(report.messages_suppressed, 0);
    }

    #[test]
    fn demo_workspace_never_enqueues_messages() {
        let mut repo = MockRepository::new();
        repo.expect_create_kernel_tasks()
            .returning(|tasks| Ok(tasks.len()));
        repo.expect_enqueue_outbox_events().times(0);

        let report = Dispatcher::new(&repo)
            .dispatch(&workspace(true), decisions())
            .expect("dispatches");

        assert_eq!(report.messages_enqueued, 0);
        assert_eq!(report.messages_suppressed, 1);
    }

    #[test]
    fn demo_workspace_still_syncs_ad_mutations() {
        let mut repo = MockRepository::new();
        repo.expect_enqueue_outbox_events()
            .withf(|events| events.len() == 1 && events[0].topic == "ads.mutation")
            .times(1)
            .returning(|events| Ok(events.len()));

        let report = Dispatcher::new(&repo)
            .dispatch(
                &workspace(true),
                vec![Decision::EnqueueMessage {
                    topic: "ads.mutation".into(),
                    payload: json!({"proposal_id": 4}),
                    dedupe_key: "ads.mutation:4".into(),
                }],
            )
            .expect("dispatches");

        assert_eq!(report.messages_enqueued, 1);
        assert_eq!(report.messages_suppressed, 0);
    }

    #[test]
    fn duplicates_are_not_counted() {
        let mut repo = MockRepository::new();
        // The storage layer skips rows whose dedupe key already exists.
        repo.expect_create_kernel_tasks().returning(|_| Ok(0));
        repo.expect_enqueue_outbox_events().returning(|_| Ok(0));

        let report = Dispatcher::new(&repo)
            .dispatch(&workspace(false), decisions())
            .expect("dispatches");

        assert_eq!(report.tasks_created, 0);
        assert_eq!(report.messages_enqueued, 0);
    }
}
