//! Proposal generators over the current day's ad campaign performance.

use std::collections::BTreeMap;

use crate::domain::ad_account::{AdAccount, AdCampaign, AdCampaignStatus};
use crate::domain::proposal::{ProposalAction, ProposalDraft};
use crate::domain::types::{AdCampaignId, Cents};

/// Budget increase applied to campaigns that beat their target.
pub const SCALE_UP_PCT: i64 = 20;
/// Budget decrease applied to campaigns far below their target.
pub const TRIM_DOWN_PCT: i64 = 30;

/// Tunables for the generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Spend below which a campaign has not produced enough signal to judge.
    pub min_spend: Cents,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_spend: Cents::new(2_000).unwrap_or(Cents::ZERO),
        }
    }
}

fn enabled(campaigns: &[AdCampaign]) -> impl Iterator<Item = &AdCampaign> {
    campaigns
        .iter()
        .filter(|c| c.status == AdCampaignStatus::Enabled)
}

fn scaled(budget: Cents, pct: i64) -> Cents {
    Cents::new(budget.get() + budget.get() * pct / 100).unwrap_or(budget)
}

/// Campaigns whose ROAS is at least 1.25x the account target and that spent
/// 90% of their budget or more get a budget increase.
pub fn scale_winners(account: &AdAccount, campaigns: &[AdCampaign]) -> Vec<ProposalDraft> {
    enabled(campaigns)
        .filter(|c| {
            let budget_limited = c.spend_today.get() * 10 >= c.daily_budget.get() * 9;
            let winning = c
                .roas()
                .is_some_and(|roas| roas >= account.target_roas * 1.25);
            budget_limited && winning && c.daily_budget.get() > 0
        })
        .map(|c| ProposalDraft {
            ad_campaign_id: c.id,
            action: ProposalAction::BudgetChange {
                current: c.daily_budget,
                proposed: scaled(c.daily_budget, SCALE_UP_PCT),
            },
            reason: format!(
                "ROAS {:.2} beats target {:.2} and the budget is exhausted",
                c.roas().unwrap_or_default(),
                account.target_roas
            ),
        })
        .collect()
}

/// Campaigns with enough spend and ROAS under half the target get a budget cut.
pub fn trim_losers(
    account: &AdAccount,
    campaigns: &[AdCampaign],
    config: &GeneratorConfig,
) -> Vec<ProposalDraft> {
    enabled(campaigns)
        .filter(|c| {
            c.spend_today >= config.min_spend
                && c.roas()
                    .is_some_and(|roas| roas < account.target_roas * 0.5)
        })
        .map(|c| ProposalDraft {
            ad_campaign_id: c.id,
            action: ProposalAction::BudgetChange {
                current: c.daily_budget,
                proposed: scaled(c.daily_budget, -TRIM_DOWN_PCT),
            },
            reason: format!(
                "ROAS {:.2} is below half of target {:.2}",
                c.roas().unwrap_or_default(),
                account.target_roas
            ),
        })
        .collect()
}

/// Campaigns that spent three times the minimum without a conversion get paused.
pub fn pause_zero_converters(
    campaigns: &[AdCampaign],
    config: &GeneratorConfig,
) -> Vec<ProposalDraft> {
    let threshold = config.min_spend.get().saturating_mul(3);
    enabled(campaigns)
        .filter(|c| c.conversions == 0 && c.spend_today.get() >= threshold)
        .map(|c| ProposalDraft {
            ad_campaign_id: c.id,
            action: ProposalAction::PauseCampaign,
            reason: format!("spent {} today without a conversion", c.spend_today),
        })
        .collect()
}

/// Runs every generator and keeps at most one draft per campaign.
///
/// A pause takes precedence over a budget trim for the same campaign.
pub fn generate_proposals(
    account: &AdAccount,
    campaigns: &[AdCampaign],
    config: &GeneratorConfig,
) -> Vec<ProposalDraft> {
    let mut by_campaign: BTreeMap<AdCampaignId, ProposalDraft> = BTreeMap::new();

    for draft in scale_winners(account, campaigns)
        .into_iter()
        .chain(trim_losers(account, campaigns, config))
    {
        by_campaign.entry(draft.ad_campaign_id).or_insert(draft);
    }
    for draft in pause_zero_converters(campaigns, config) {
        by_campaign.insert(draft.ad_campaign_id, draft);
    }

    by_campaign.into_values().collect()
}
