//! Outreach campaigns and their lifecycle.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CampaignId, CampaignName, Cents, TypeConstraintError, WorkspaceId};

/// Delivery channel used by a campaign.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Voice,
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Voice => "voice",
        };
        write!(f, "{value}")
    }
}

impl TryFrom<&str> for Channel {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "voice" => Ok(Channel::Voice),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown channel `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    /// Allowed moves: draft → active, active ↔ paused, active/paused → completed.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Active, Paused)
                | (Paused, Active)
                | (Active, Completed)
                | (Paused, Completed)
        )
    }
}

impl Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        };
        write!(f, "{value}")
    }
}

impl TryFrom<&str> for CampaignStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown campaign status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: CampaignId,
    pub workspace_id: WorkspaceId,
    pub name: CampaignName,
    pub channel: Channel,
    pub status: CampaignStatus,
    pub daily_budget: Option<Cents>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCampaign {
    pub workspace_id: WorkspaceId,
    pub name: CampaignName,
    pub channel: Channel,
    pub daily_budget: Option<Cents>,
}

impl NewCampaign {
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        name: CampaignName,
        channel: Channel,
        daily_budget: Option<Cents>,
    ) -> Self {
        Self {
            workspace_id,
            name,
            channel,
            daily_budget,
        }
    }
}
