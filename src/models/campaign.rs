use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    campaign::{
        Campaign as DomainCampaign, CampaignStatus, Channel, NewCampaign as DomainNewCampaign,
    },
    types::{CampaignId, CampaignName, Cents, TypeConstraintError, WorkspaceId},
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Campaign {
    pub id: i32,
    pub workspace_id: i32,
    pub name: String,
    pub channel: String,
    pub status: String,
    pub daily_budget_cents: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct NewCampaign<'a> {
    pub workspace_id: i32,
    pub name: &'a str,
    pub channel: String,
    pub daily_budget_cents: Option<i64>,
}

impl TryFrom<Campaign> for DomainCampaign {
    type Error = TypeConstraintError;

    fn try_from(campaign: Campaign) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CampaignId::new(campaign.id)?,
            workspace_id: WorkspaceId::new(campaign.workspace_id)?,
            name: CampaignName::new(campaign.name)?,
            channel: Channel::try_from(campaign.channel.as_str())?,
            status: CampaignStatus::try_from(campaign.status.as_str())?,
            daily_budget: campaign.daily_budget_cents.map(Cents::new).transpose()?,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewCampaign> for NewCampaign<'a> {
    fn from(campaign: &'a DomainNewCampaign) -> Self {
        Self {
            workspace_id: campaign.workspace_id.get(),
            name: campaign.name.as_str(),
            channel: campaign.channel.to_string(),
            daily_budget_cents: campaign.daily_budget.map(Cents::get),
        }
    }
}
