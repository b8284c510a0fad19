use chrono::{Duration, Utc};
use serde_json::json;

use ubigrowth::ads::executor::{ADS_MUTATION_TOPIC, execute_approved_proposal};
use ubigrowth::ads::governor::GuardrailConfig;
use ubigrowth::ads::{AdsError, submit_drafts};
use ubigrowth::domain::ad_account::{AdCampaign, AdCampaignStatus};
use ubigrowth::domain::lead::{LeadStatus, NewLead};
use ubigrowth::domain::lead_event::{LeadEventType, NewLeadEvent};
use ubigrowth::domain::outbox::OutboxStatus;
use ubigrowth::domain::proposal::{BlockReason, ProposalAction, ProposalDraft, ProposalStatus};
use ubigrowth::domain::types::{Cents, LeadEmail, UserEmail};
use ubigrowth::kernel::Decision;
use ubigrowth::kernel::dispatcher::Dispatcher;
use ubigrowth::repository::errors::RepositoryError;
use ubigrowth::repository::kernel::MAX_DELIVERY_ATTEMPTS;
use ubigrowth::repository::{
    AdAccountReader, AdAccountWriter, KernelReader, LeadEventListQuery, LeadEventReader,
    LeadEventWriter, LeadListQuery, LeadReader, LeadWriter, OutboxDelivery, ProposalReader,
    ProposalWriter, WorkspaceReader, WorkspaceWriter,
};

mod common;

fn budget_draft(campaign: &AdCampaign, proposed: i64) -> ProposalDraft {
    ProposalDraft {
        ad_campaign_id: campaign.id,
        action: ProposalAction::BudgetChange {
            current: campaign.daily_budget,
            proposed: Cents::new(proposed).unwrap(),
        },
        reason: "scale".into(),
    }
}

#[test]
fn test_lead_crud_and_events() {
    let test_db = common::TestDb::new("test_lead_crud_and_events.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");

    let ada = common::lead(&repo, ws.id, "Ada", "ada@example.com");
    common::lead(&repo, ws.id, "Bob", "bob@example.com");

    let (total, items) = repo
        .list_leads(LeadListQuery::new(ws.id, false).search("ada"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, ada.id);

    let updated = repo
        .update_lead_status(ada.id, ws.id, LeadStatus::Contacted)
        .unwrap();
    assert_eq!(updated.status, LeadStatus::Contacted);

    let (filtered, _) = repo
        .list_leads(LeadListQuery::new(ws.id, false).status(LeadStatus::Contacted))
        .unwrap();
    assert_eq!(filtered, 1);

    repo.create_lead_event(&NewLeadEvent::new(
        ada.id,
        ws.id,
        LeadEventType::Note,
        json!({ "text": "called" }),
        UserEmail::new("ops@example.com").unwrap(),
    ))
    .unwrap();
    let (event_total, events) = repo
        .list_lead_events(LeadEventListQuery::new(ada.id, ws.id))
        .unwrap();
    assert_eq!(event_total, 1);
    assert_eq!(events[0].event_type, LeadEventType::Note);

    let activity = repo.list_leads_with_last_activity(ws.id, false).unwrap();
    assert_eq!(activity.len(), 2);
    assert!(activity.iter().any(|(lead, last)| lead.id == ada.id && last.is_some()));

    repo.delete_lead(ada.id, ws.id).unwrap();
    assert!(repo.get_lead_by_id(ada.id, ws.id).unwrap().is_none());
}

#[test]
fn test_bulk_import_skips_existing_emails() {
    let test_db = common::TestDb::new("test_bulk_import_skips_existing_emails.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    common::lead(&repo, ws.id, "Ada", "ada@example.com");

    let new_lead = |name: &str, email: &str| {
        NewLead::try_new(ws.id.get(), name.into(), Some(email.into()), None, None, None).unwrap()
    };
    let batch = vec![
        new_lead("Ada again", "ada@example.com"),
        new_lead("Grace", "grace@example.com"),
    ];
    assert_eq!(repo.create_leads(&batch).unwrap(), 1);
}

#[test]
fn test_rows_of_other_workspaces_are_invisible() {
    let test_db = common::TestDb::new("test_rows_of_other_workspaces_are_invisible.db");
    let repo = test_db.repo();
    let acme = common::workspace(&repo, "Acme");
    let globex = common::workspace(&repo, "Globex");

    let ada = common::lead(&repo, acme.id, "Ada", "ada@example.com");
    let account = common::ad_account(&repo, acme.id, 10_000);
    let campaign = common::ad_campaign(&repo, &account, "Search", 5_000);

    assert!(repo.get_lead_by_id(ada.id, globex.id).unwrap().is_none());
    assert_eq!(repo.list_leads(LeadListQuery::new(globex.id, false)).unwrap().0, 0);
    assert!(matches!(
        repo.delete_lead(ada.id, globex.id),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.update_lead_status(ada.id, globex.id, LeadStatus::Won),
        Err(RepositoryError::NotFound)
    ));

    assert!(repo.get_ad_account(account.id, globex.id).unwrap().is_none());
    assert!(repo.get_ad_campaign(campaign.id, globex.id).unwrap().is_none());
    assert!(repo.list_ad_campaigns(account.id, globex.id).unwrap().is_empty());
    assert!(matches!(
        repo.set_execution_enabled(account.id, globex.id, true),
        Err(RepositoryError::NotFound)
    ));
    assert!(!repo.get_ad_account(account.id, acme.id).unwrap().unwrap().execution_enabled);

    // The same email may exist once per workspace.
    common::lead(&repo, globex.id, "Ada", "ada@example.com");
}

#[test]
fn test_demo_rows_stay_in_their_partition() {
    let test_db = common::TestDb::new("test_demo_rows_stay_in_their_partition.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");

    common::lead(&repo, ws.id, "Live", "live@example.com");
    let samples = ubigrowth::demo::sample_leads(ws.id).unwrap();
    let seeded = repo.create_leads(&samples).unwrap();
    assert_eq!(seeded, samples.len());

    let (live_total, live) = repo.list_leads(LeadListQuery::new(ws.id, false)).unwrap();
    assert_eq!(live_total, 1);
    assert!(live.iter().all(|lead| !lead.is_demo));

    let (demo_total, demo) = repo.list_leads(LeadListQuery::new(ws.id, true)).unwrap();
    assert_eq!(demo_total, samples.len());
    assert!(demo.iter().all(|lead| lead.is_demo));

    let workspace = repo.set_demo_mode(ws.id, true).unwrap();
    assert!(workspace.demo_mode);
    repo.mark_demo_seeded(ws.id).unwrap();
    assert!(repo.get_workspace(ws.id).unwrap().unwrap().demo_seeded);
}

#[test]
fn test_demo_and_live_leads_may_share_an_email() {
    let test_db = common::TestDb::new("test_demo_and_live_leads_may_share_an_email.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let live = common::lead(&repo, ws.id, "Ada", "ada@example.com");

    let demo_ada = || {
        NewLead::try_new(
            ws.id.get(),
            "Demo Ada".into(),
            Some("ada@example.com".into()),
            None,
            None,
            None,
        )
        .unwrap()
        .demo()
    };
    let demo = repo.create_lead(&demo_ada()).unwrap();
    assert!(demo.is_demo);

    let email = LeadEmail::new("ada@example.com").unwrap();
    assert_eq!(
        repo.get_lead_by_email(&email, ws.id, false).unwrap().map(|l| l.id),
        Some(live.id)
    );
    assert_eq!(
        repo.get_lead_by_email(&email, ws.id, true).unwrap().map(|l| l.id),
        Some(demo.id)
    );

    // Still unique inside one partition.
    assert!(matches!(
        repo.create_lead(&demo_ada()),
        Err(RepositoryError::Duplicate(_))
    ));
}

#[test]
fn test_platform_admins() {
    let test_db = common::TestDb::new("test_platform_admins.db");
    let repo = test_db.repo();
    let email = UserEmail::new("root@example.com").unwrap();

    assert!(!repo.is_platform_admin(&email).unwrap());
    repo.add_platform_admin(&email).unwrap();
    assert!(repo.is_platform_admin(&email).unwrap());
}

#[test]
fn test_daily_allowance_blocks_extra_proposals() {
    let test_db = common::TestDb::new("test_daily_allowance_blocks_extra_proposals.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let account = common::ad_account(&repo, ws.id, 100_000);
    let campaigns: Vec<_> = (0..3)
        .map(|i| common::ad_campaign(&repo, &account, &format!("C{i}"), 10_000))
        .collect();

    let guardrails = GuardrailConfig::new(50.0, 15.0, 50_000, 500, 2, true);
    let now = Utc::now().naive_utc();
    let drafts: Vec<_> = campaigns.iter().map(|c| budget_draft(c, 11_000)).collect();

    let stored = submit_drafts(&repo, &account, &drafts, &guardrails, now).unwrap();
    let statuses: Vec<_> = stored.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![
            ProposalStatus::AutoApproved,
            ProposalStatus::AutoApproved,
            ProposalStatus::Blocked
        ]
    );
    assert_eq!(stored[2].block_reason, Some(BlockReason::RateLimited));

    let again = submit_drafts(&repo, &account, &drafts[..1], &guardrails, now).unwrap();
    assert_eq!(again[0].status, ProposalStatus::Blocked);
    assert_eq!(
        repo.count_actions_since(account.id, ws.id, ubigrowth::ads::start_of_day(now))
            .unwrap(),
        2
    );
}

#[test]
fn test_allowance_counts_carried_over_proposals() {
    let test_db = common::TestDb::new("test_allowance_counts_carried_over_proposals.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let account = common::ad_account(&repo, ws.id, 100_000);
    let search = common::ad_campaign(&repo, &account, "Search", 10_000);
    let display = common::ad_campaign(&repo, &account, "Display", 10_000);
    repo.set_execution_enabled(account.id, ws.id, true).unwrap();

    let guardrails = GuardrailConfig::new(50.0, 15.0, 50_000, 500, 1, true);
    let now = Utc::now().naive_utc();

    let yesterday = submit_drafts(
        &repo,
        &account,
        &[budget_draft(&search, 11_000)],
        &guardrails,
        now - Duration::days(1),
    )
    .unwrap();
    assert_eq!(yesterday[0].status, ProposalStatus::AutoApproved);
    test_db.execute(&format!(
        "UPDATE ad_proposals SET created_at = datetime('now', '-1 day') WHERE id = {}",
        yesterday[0].id
    ));

    // Still waiting for execution, so it holds today's only slot.
    let waiting = submit_drafts(&repo, &account, &[budget_draft(&display, 11_000)], &guardrails, now)
        .unwrap();
    assert_eq!(waiting[0].block_reason, Some(BlockReason::RateLimited));

    execute_approved_proposal(&repo, yesterday[0].id, ws.id).unwrap();
    assert_eq!(
        repo.count_actions_since(account.id, ws.id, ubigrowth::ads::start_of_day(now))
            .unwrap(),
        1
    );

    let after = submit_drafts(&repo, &account, &[budget_draft(&display, 11_000)], &guardrails, now)
        .unwrap();
    assert_eq!(after[0].status, ProposalStatus::Blocked);
    assert_eq!(after[0].block_reason, Some(BlockReason::RateLimited));

    // Another workspace's allowance is untouched.
    let globex = common::workspace(&repo, "Globex");
    assert_eq!(
        repo.count_actions_since(account.id, globex.id, ubigrowth::ads::start_of_day(now))
            .unwrap(),
        0
    );
}

#[test]
fn test_only_pending_proposals_can_be_decided() {
    let test_db = common::TestDb::new("test_only_pending_proposals_can_be_decided.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let account = common::ad_account(&repo, ws.id, 100_000);
    let campaign = common::ad_campaign(&repo, &account, "Search", 10_000);
    let by = UserEmail::new("ops@example.com").unwrap();

    let stored = submit_drafts(
        &repo,
        &account,
        &[budget_draft(&campaign, 14_000)],
        &GuardrailConfig::default(),
        Utc::now().naive_utc(),
    )
    .unwrap();
    let proposal = &stored[0];
    assert_eq!(proposal.status, ProposalStatus::PendingApproval);
    assert_eq!(repo.list_open_proposals(ws.id).unwrap().len(), 1);

    let approved = repo
        .decide_proposal(proposal.id, ws.id, ProposalStatus::Approved, &by)
        .unwrap();
    assert_eq!(approved.decided_by.as_deref(), Some("ops@example.com"));
    assert!(approved.decided_at.is_some());

    assert!(matches!(
        repo.decide_proposal(proposal.id, ws.id, ProposalStatus::Rejected, &by),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_execution_gate_protects_campaigns() {
    let test_db = common::TestDb::new("test_execution_gate_protects_campaigns.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let account = common::ad_account(&repo, ws.id, 100_000);
    let campaign = common::ad_campaign(&repo, &account, "Search", 10_000);

    let stored = submit_drafts(
        &repo,
        &account,
        &[budget_draft(&campaign, 11_000)],
        &GuardrailConfig::default(),
        Utc::now().naive_utc(),
    )
    .unwrap();
    let proposal = stored[0].clone();
    assert_eq!(proposal.status, ProposalStatus::AutoApproved);

    let result = execute_approved_proposal(&repo, proposal.id, ws.id);
    assert!(matches!(result, Err(AdsError::ExecutionDisabled)));
    let untouched = repo.get_ad_campaign(campaign.id, ws.id).unwrap().unwrap();
    assert_eq!(untouched.daily_budget.get(), 10_000);
    assert!(repo.list_outbox_events(ws.id).unwrap().is_empty());

    repo.set_execution_enabled(account.id, ws.id, true).unwrap();
    let executed = execute_approved_proposal(&repo, proposal.id, ws.id).unwrap();
    assert_eq!(executed.status, ProposalStatus::Executed);
    assert!(executed.executed_at.is_some());

    let changed = repo.get_ad_campaign(campaign.id, ws.id).unwrap().unwrap();
    assert_eq!(changed.daily_budget.get(), 11_000);

    let outbox = repo.list_outbox_events(ws.id).unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].topic, ADS_MUTATION_TOPIC);

    assert!(matches!(
        execute_approved_proposal(&repo, proposal.id, ws.id),
        Err(AdsError::NotExecutable(ProposalStatus::Executed))
    ));
}

#[test]
fn test_demo_workspace_still_syncs_executed_proposals() {
    let test_db = common::TestDb::new("test_demo_workspace_still_syncs_executed_proposals.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let account = common::ad_account(&repo, ws.id, 100_000);
    let campaign = common::ad_campaign(&repo, &account, "Search", 10_000);
    repo.set_execution_enabled(account.id, ws.id, true).unwrap();
    repo.set_demo_mode(ws.id, true).unwrap();

    let stored = submit_drafts(
        &repo,
        &account,
        &[budget_draft(&campaign, 11_000)],
        &GuardrailConfig::default(),
        Utc::now().naive_utc(),
    )
    .unwrap();
    execute_approved_proposal(&repo, stored[0].id, ws.id).unwrap();

    let changed = repo.get_ad_campaign(campaign.id, ws.id).unwrap().unwrap();
    assert_eq!(changed.daily_budget.get(), 11_000);
    let outbox = repo.list_outbox_events(ws.id).unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].topic, ADS_MUTATION_TOPIC);
}

#[test]
fn test_pause_proposal_changes_campaign_status() {
    let test_db = common::TestDb::new("test_pause_proposal_changes_campaign_status.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let account = common::ad_account(&repo, ws.id, 100_000);
    let campaign = common::ad_campaign(&repo, &account, "Display", 10_000);
    repo.set_execution_enabled(account.id, ws.id, true).unwrap();

    let guardrails = GuardrailConfig::new(50.0, 15.0, 50_000, 500, 10, false);
    let stored = submit_drafts(
        &repo,
        &account,
        &[ProposalDraft {
            ad_campaign_id: campaign.id,
            action: ProposalAction::PauseCampaign,
            reason: "no conversions".into(),
        }],
        &guardrails,
        Utc::now().naive_utc(),
    )
    .unwrap();
    assert_eq!(stored[0].status, ProposalStatus::AutoApproved);

    execute_approved_proposal(&repo, stored[0].id, ws.id).unwrap();
    let paused = repo.get_ad_campaign(campaign.id, ws.id).unwrap().unwrap();
    assert_eq!(paused.status, AdCampaignStatus::Paused);
}

#[test]
fn test_dispatch_is_idempotent_and_respects_demo_mode() {
    let test_db = common::TestDb::new("test_dispatch_is_idempotent_and_respects_demo_mode.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");
    let ada = common::lead(&repo, ws.id, "Ada", "ada@example.com");

    let decisions = || {
        vec![
            Decision::CreateTask {
                policy: "lead_follow_up",
                title: "Follow up with Ada".into(),
                lead_id: Some(ada.id),
                dedupe_key: format!("lead_follow_up:{}", ada.id),
            },
            Decision::EnqueueMessage {
                topic: "outreach.email".into(),
                payload: json!({ "to": "ada@example.com" }),
                dedupe_key: format!("outreach:1:{}", ada.id),
            },
        ]
    };

    let first = Dispatcher::new(&repo).dispatch(&ws, decisions()).unwrap();
    assert_eq!(first.tasks_created, 1);
    assert_eq!(first.messages_enqueued, 1);

    let second = Dispatcher::new(&repo).dispatch(&ws, decisions()).unwrap();
    assert_eq!(second.tasks_created, 0);
    assert_eq!(second.messages_enqueued, 0);

    let demo_ws = repo.set_demo_mode(ws.id, true).unwrap();
    let mut demo_decision = decisions();
    if let Decision::EnqueueMessage { dedupe_key, .. } = &mut demo_decision[1] {
        *dedupe_key = "outreach:2:demo".into();
    }
    let demo = Dispatcher::new(&repo).dispatch(&demo_ws, demo_decision).unwrap();
    assert_eq!(demo.messages_enqueued, 0);
    assert_eq!(demo.messages_suppressed, 1);

    assert_eq!(repo.list_kernel_tasks(ws.id).unwrap().len(), 1);
    assert_eq!(repo.list_outbox_events(ws.id).unwrap().len(), 1);
}

#[test]
fn test_outbox_delivery_bookkeeping() {
    let test_db = common::TestDb::new("test_outbox_delivery_bookkeeping.db");
    let repo = test_db.repo();
    let ws = common::workspace(&repo, "Acme");

    let messages = (0..2)
        .map(|i| Decision::EnqueueMessage {
            topic: "outreach.sms".into(),
            payload: json!({ "n": i }),
            dedupe_key: format!("sms:{i}"),
        })
        .collect();
    Dispatcher::new(&repo).dispatch(&ws, messages).unwrap();

    let pending = repo.list_pending_outbox(10).unwrap();
    assert_eq!(pending.len(), 2);
    let (sent, failing) = (&pending[0], &pending[1]);

    repo.mark_outbox_sent(sent.id).unwrap();
    for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
        repo.mark_outbox_failed(failing.id, "connection refused").unwrap();
        let still_pending = repo
            .list_pending_outbox(10)
            .unwrap()
            .iter()
            .any(|e| e.id == failing.id);
        assert_eq!(still_pending, attempt < MAX_DELIVERY_ATTEMPTS);
    }

    let events = repo.list_outbox_events(ws.id).unwrap();
    let sent_row = events.iter().find(|e| e.id == sent.id).unwrap();
    assert_eq!(sent_row.status, OutboxStatus::Sent);
    assert!(sent_row.sent_at.is_some());
    let failed_row = events.iter().find(|e| e.id == failing.id).unwrap();
    assert_eq!(failed_row.status, OutboxStatus::Failed);
    assert_eq!(failed_row.attempts, MAX_DELIVERY_ATTEMPTS);
    assert_eq!(failed_row.last_error.as_deref(), Some("connection refused"));
}
