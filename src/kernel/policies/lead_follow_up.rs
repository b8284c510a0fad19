use chrono::Duration;

use crate::domain::lead::LeadStatus;
use crate::kernel::{Decision, KernelSnapshot, Policy};

/// Creates a follow-up task for new leads nobody has touched for a while.
#[derive(Clone, Debug)]
pub struct LeadFollowUpPolicy {
    idle_for: Duration,
}

impl LeadFollowUpPolicy {
    pub const NAME: &'static str = "lead_follow_up";

    pub fn new(follow_up_after_hours: i64) -> Self {
        Self {
            idle_for: Duration::hours(follow_up_after_hours.max(1)),
        }
    }
}

impl Policy for LeadFollowUpPolicy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, snapshot: &KernelSnapshot) -> Vec<Decision> {
        let cutoff = snapshot.now - self.idle_for;

        snapshot
            .leads
            .iter()
            .filter(|activity| activity.lead.status == LeadStatus::New)
            .filter(|activity| activity.last_touched() <= cutoff)
            .map(|activity| {
                let touched = activity.last_touched().and_utc().timestamp();
                Decision::CreateTask {
                    policy: Self::NAME,
                    title: format!("Follow up with {}", activity.lead.name),
                    lead_id: Some(activity.lead.id),
                    // One task per idle stretch: new activity yields a new key.
                    dedupe_key: format!("{}:{}:{touched}", Self::NAME, activity.lead.id),
                }
            })
            .collect()
    }
}
