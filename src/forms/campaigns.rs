use serde::Deserialize;
use validator::Validate;

use crate::domain::campaign::{CampaignStatus, Channel, NewCampaign};
use crate::domain::types::{CampaignName, Cents, TypeConstraintError, WorkspaceId};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub channel: String,
    #[validate(range(min = 0))]
    pub daily_budget_cents: Option<i64>,
}

impl CreateCampaignPayload {
    pub fn into_new_campaign(
        self,
        workspace_id: WorkspaceId,
    ) -> Result<NewCampaign, TypeConstraintError> {
        Ok(NewCampaign::new(
            workspace_id,
            CampaignName::new(self.name)?,
            Channel::try_from(self.channel.as_str())?,
            self.daily_budget_cents.map(Cents::new).transpose()?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignStatusPayload {
    pub status: String,
}

impl UpdateCampaignStatusPayload {
    pub fn status(&self) -> Result<CampaignStatus, TypeConstraintError> {
        CampaignStatus::try_from(self.status.as_str())
    }
}
