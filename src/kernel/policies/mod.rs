//! Built-in kernel policies. Every policy here is a pure function of the snapshot.

mod lead_follow_up;
mod spend_pacing;
mod stale_proposal;

pub use lead_follow_up::LeadFollowUpPolicy;
pub use spend_pacing::SpendPacingPolicy;
pub use stale_proposal::StaleProposalPolicy;
