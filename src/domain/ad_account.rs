//! Connected ad platform accounts and the campaigns they run.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AdAccountId, AdCampaignId, AdCampaignName, Cents, NonEmptyString, TypeConstraintError,
    WorkspaceId,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdAccount {
    pub id: AdAccountId,
    pub workspace_id: WorkspaceId,
    pub platform: String,
    pub name: String,
    /// Gate for automated mutations. Nothing is pushed to the platform while unset.
    pub execution_enabled: bool,
    pub daily_budget: Cents,
    pub target_roas: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAdAccount {
    pub workspace_id: WorkspaceId,
    pub platform: NonEmptyString,
    pub name: NonEmptyString,
    pub daily_budget: Cents,
    pub target_roas: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdCampaignStatus {
    Enabled,
    Paused,
}

impl Display for AdCampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdCampaignStatus::Enabled => write!(f, "enabled"),
            AdCampaignStatus::Paused => write!(f, "paused"),
        }
    }
}

impl TryFrom<&str> for AdCampaignStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "enabled" => Ok(AdCampaignStatus::Enabled),
            "paused" => Ok(AdCampaignStatus::Paused),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown ad campaign status `{other}`"
            ))),
        }
    }
}

/// Performance snapshot of a single ad campaign for the current day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdCampaign {
    pub id: AdCampaignId,
    pub ad_account_id: AdAccountId,
    pub workspace_id: WorkspaceId,
    pub name: AdCampaignName,
    pub status: AdCampaignStatus,
    pub daily_budget: Cents,
    pub spend_today: Cents,
    pub conversions: i32,
    pub revenue: Cents,
    pub updated_at: NaiveDateTime,
}

impl AdCampaign {
    /// Return on ad spend. `None` while nothing has been spent.
    pub fn roas(&self) -> Option<f64> {
        if self.spend_today.get() == 0 {
            return None;
        }
        Some(self.revenue.get() as f64 / self.spend_today.get() as f64)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAdCampaign {
    pub ad_account_id: AdAccountId,
    pub workspace_id: WorkspaceId,
    pub name: AdCampaignName,
    pub daily_budget: Cents,
}
