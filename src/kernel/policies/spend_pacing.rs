use crate::domain::ad_account::AdCampaignStatus;
use crate::domain::proposal::{ProposalAction, ProposalDraft};
use crate::domain::types::Cents;
use crate::kernel::{Decision, KernelSnapshot, Policy};

/// Proposes pausing the biggest spender of an account that overran its daily budget.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpendPacingPolicy;

impl SpendPacingPolicy {
    pub const NAME: &'static str = "spend_pacing";
}

impl Policy for SpendPacingPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, snapshot: &KernelSnapshot) -> Vec<Decision> {
        snapshot
            .ad_accounts
            .iter()
            .filter_map(|entry| {
                let enabled: Vec<_> = entry
                    .campaigns
                    .iter()
                    .filter(|c| c.status == AdCampaignStatus::Enabled)
                    .collect();
                let spend: i64 = enabled.iter().map(|c| c.spend_today.get()).sum();
                if spend <= entry.account.daily_budget.get() {
                    return None;
                }

                // Ties go to the lower id so the choice is stable.
                let top = enabled
                    .iter()
                    .max_by(|a, b| a.spend_today.cmp(&b.spend_today).then(b.id.cmp(&a.id)))?;

                // One pause per campaign per day: an open one is still in
                // flight, and a rejected or blocked one stands until tomorrow.
                let already_proposed = snapshot
                    .open_proposals
                    .iter()
                    .chain(&snapshot.proposals_today)
                    .any(|p| {
                        p.ad_campaign_id == top.id && p.action == ProposalAction::PauseCampaign
                    });
                if already_proposed {
                    return None;
                }

                Some(Decision::ProposeAdAction {
                    ad_account_id: entry.account.id,
                    draft: ProposalDraft {
                        ad_campaign_id: top.id,
                        action: ProposalAction::PauseCampaign,
                        reason: format!(
                            "account spent {} against a daily budget of {}",
                            Cents::new(spend).unwrap_or(Cents::ZERO),
                            entry.account.daily_budget
                        ),
                    },
                })
            })
            .collect()
    }
}
