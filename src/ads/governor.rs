//! Spend-change guardrails applied to every ad proposal before it is stored.
//!
//! The governor is a pure function of its inputs: the same drafts, config and
//! daily action count always produce the same outcomes, in input order.

use crate::domain::ad_account::AdAccount;
use crate::domain::proposal::{
    BlockReason, NewAdProposal, ProposalAction, ProposalDraft, ProposalStatus,
};
use crate::domain::types::Cents;

/// Validated guardrail thresholds for one deployment.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardrailConfig {
    max_change_pct: f64,
    auto_approve_max_pct: f64,
    approval_threshold: Cents,
    min_daily_budget: Cents,
    max_actions_per_day: u32,
    require_approval_for_status_changes: bool,
}

impl GuardrailConfig {
    /// Builds a config, clamping every input into its safe range.
    pub fn new(
        max_change_pct: f64,
        auto_approve_max_pct: f64,
        approval_threshold_cents: i64,
        min_daily_budget_cents: i64,
        max_actions_per_day: u32,
        require_approval_for_status_changes: bool,
    ) -> Self {
        let max_change_pct = finite_or(max_change_pct, 1.0).clamp(1.0, 100.0);
        let auto_approve_max_pct = finite_or(auto_approve_max_pct, 0.0).clamp(0.0, max_change_pct);
        Self {
            max_change_pct,
            auto_approve_max_pct,
            approval_threshold: Cents::new(approval_threshold_cents).unwrap_or(Cents::ZERO),
            min_daily_budget: Cents::new(min_daily_budget_cents).unwrap_or(Cents::ZERO),
            max_actions_per_day: max_actions_per_day.clamp(1, 100),
            require_approval_for_status_changes,
        }
    }

    pub fn max_change_pct(&self) -> f64 {
        self.max_change_pct
    }

    pub fn auto_approve_max_pct(&self) -> f64 {
        self.auto_approve_max_pct
    }

    pub fn approval_threshold(&self) -> Cents {
        self.approval_threshold
    }

    pub fn min_daily_budget(&self) -> Cents {
        self.min_daily_budget
    }

    pub fn max_actions_per_day(&self) -> u32 {
        self.max_actions_per_day
    }

    pub fn require_approval_for_status_changes(&self) -> bool {
        self.require_approval_for_status_changes
    }
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self::new(50.0, 15.0, 50_000, 500, 10, true)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Signed percentage change from `current` to `proposed`.
///
/// A zero current budget counts as a +100% change for any increase.
pub fn change_pct(current: Cents, proposed: Cents) -> f64 {
    if current.get() == 0 {
        return if proposed.get() > 0 { 100.0 } else { 0.0 };
    }
    (proposed.get() - current.get()) as f64 / current.get() as f64 * 100.0
}

/// Result of pushing a budget through the spend-change limits.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BudgetDecision {
    budget: Cents,
    /// The larger of the requested and the applied change, in percent.
    change_pct: f64,
    clamped: bool,
}

fn govern_budget(current: Cents, requested: Cents, config: &GuardrailConfig) -> BudgetDecision {
    let requested_pct = change_pct(current, requested);
    let mut budget = requested.get();

    if requested_pct.abs() > config.max_change_pct {
        // Integer division rounds the allowed delta toward the current value.
        let max_delta = (current.get() as f64 * config.max_change_pct / 100.0).floor() as i64;
        budget = if current.get() == 0 {
            config.min_daily_budget.get()
        } else if budget > current.get() {
            current.get() + max_delta
        } else {
            current.get() - max_delta
        };
    }

    // Decreases stop at the minimum daily budget, or at the current budget
    // when it already sits below the minimum. Increases land on the minimum
    // at least.
    let min = config.min_daily_budget.get();
    if budget < current.get() {
        budget = budget.max(min.min(current.get()));
    } else if budget > current.get() {
        budget = budget.max(min);
    }

    let budget = Cents::new(budget).unwrap_or(current);
    let applied_pct = change_pct(current, budget);
    BudgetDecision {
        budget,
        change_pct: if applied_pct.abs() > requested_pct.abs() {
            applied_pct
        } else {
            requested_pct
        },
        clamped: budget != requested,
    }
}

/// Applies the spend-change threshold, the approval requirement and the
/// daily rate limit to drafts for a single ad account.
///
/// `actions_today` is the number of proposals that already used up the
/// account's allowance today.
pub fn govern_proposals(
    account: &AdAccount,
    drafts: &[ProposalDraft],
    config: &GuardrailConfig,
    actions_today: usize,
) -> Vec<NewAdProposal> {
    let mut remaining = (config.max_actions_per_day as usize).saturating_sub(actions_today);

    drafts
        .iter()
        .map(|draft| {
            let mut outcome = NewAdProposal {
                ad_account_id: account.id,
                ad_campaign_id: draft.ad_campaign_id,
                workspace_id: account.workspace_id,
                action: draft.action,
                reason: draft.reason.clone(),
                status: ProposalStatus::PendingApproval,
                clamped: false,
                block_reason: None,
            };

            let requires_approval = match draft.action {
                ProposalAction::BudgetChange { current, proposed } => {
                    let decision = govern_budget(current, proposed, config);
                    outcome.action = ProposalAction::BudgetChange {
                        current,
                        proposed: decision.budget,
                    };
                    outcome.clamped = decision.clamped;

                    if decision.budget == current {
                        outcome.status = ProposalStatus::Blocked;
                        outcome.block_reason = Some(BlockReason::NoOp);
                        return outcome;
                    }

                    let increase = decision.budget.saturating_sub(current);
                    decision.change_pct.abs() > config.auto_approve_max_pct
                        || increase > config.approval_threshold
                }
                ProposalAction::PauseCampaign | ProposalAction::EnableCampaign => {
                    config.require_approval_for_status_changes
                }
            };

            if remaining == 0 {
                outcome.status = ProposalStatus::Blocked;
                outcome.block_reason = Some(BlockReason::RateLimited);
                return outcome;
            }
            remaining -= 1;

            outcome.status = if requires_approval {
                ProposalStatus::PendingApproval
            } else {
                ProposalStatus::AutoApproved
            };
            outcome
        })
        .collect()
}
