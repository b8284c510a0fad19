use serde::Serialize;

use crate::domain::types::CampaignId;

/// Outcome of launching outreach for a campaign.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LaunchReport {
    pub campaign_id: CampaignId,
    /// Leads that are reachable on the campaign channel.
    pub eligible: usize,
    pub enqueued: usize,
    /// Messages withheld because the workspace is in demo mode.
    pub suppressed: usize,
}
