use chrono::Duration;

use crate::domain::proposal::ProposalStatus;
use crate::kernel::{Decision, KernelSnapshot, Policy};

/// Reminds operators about proposals left waiting for approval.
#[derive(Clone, Debug)]
pub struct StaleProposalPolicy {
    max_age: Duration,
}

impl StaleProposalPolicy {
    pub const NAME: &'static str = "stale_proposal";

    pub fn new(stale_proposal_hours: i64) -> Self {
        Self {
            max_age: Duration::hours(stale_proposal_hours.max(1)),
        }
    }
}

impl Policy for StaleProposalPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, snapshot: &KernelSnapshot) -> Vec<Decision> {
        let cutoff = snapshot.now - self.max_age;

        snapshot
            .open_proposals
            .iter()
            .filter(|p| p.status == ProposalStatus::PendingApproval && p.created_at <= cutoff)
            .map(|p| Decision::CreateTask {
                policy: Self::NAME,
                title: format!(
                    "Review {} proposal #{} for ad campaign {}",
                    p.action.kind(),
                    p.id,
                    p.ad_campaign_id
                ),
                lead_id: None,
                dedupe_key: format!("{}:{}", Self::NAME, p.id),
            })
            .collect()
    }
}
