//! Diesel models for ad accounts and their campaigns.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    ad_account::{
        AdAccount as DomainAdAccount, AdCampaign as DomainAdCampaign, AdCampaignStatus,
        NewAdAccount as DomainNewAdAccount, NewAdCampaign as DomainNewAdCampaign,
    },
    types::{AdAccountId, AdCampaignId, AdCampaignName, Cents, TypeConstraintError, WorkspaceId},
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::ad_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AdAccount {
    pub id: i32,
    pub workspace_id: i32,
    pub platform: String,
    pub name: String,
    pub execution_enabled: bool,
    pub daily_budget_cents: i64,
    pub target_roas: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ad_accounts)]
pub struct NewAdAccount<'a> {
    pub workspace_id: i32,
    pub platform: &'a str,
    pub name: &'a str,
    pub daily_budget_cents: i64,
    pub target_roas: f64,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(AdAccount, foreign_key = ad_account_id))]
#[diesel(table_name = crate::schema::ad_campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AdCampaign {
    pub id: i32,
    pub ad_account_id: i32,
    pub workspace_id: i32,
    pub name: String,
    pub status: String,
    pub daily_budget_cents: i64,
    pub spend_today_cents: i64,
    pub conversions: i32,
    pub revenue_cents: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ad_campaigns)]
pub struct NewAdCampaign<'a> {
    pub ad_account_id: i32,
    pub workspace_id: i32,
    pub name: &'a str,
    pub daily_budget_cents: i64,
}

impl TryFrom<AdAccount> for DomainAdAccount {
    type Error = TypeConstraintError;

    fn try_from(account: AdAccount) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AdAccountId::new(account.id)?,
            workspace_id: WorkspaceId::new(account.workspace_id)?,
            platform: account.platform,
            name: account.name,
            execution_enabled: account.execution_enabled,
            daily_budget: Cents::new(account.daily_budget_cents)?,
            target_roas: account.target_roas,
            created_at: account.created_at,
        })
    }
}

impl TryFrom<AdCampaign> for DomainAdCampaign {
    type Error = TypeConstraintError;

    fn try_from(campaign: AdCampaign) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AdCampaignId::new(campaign.id)?,
            ad_account_id: AdAccountId::new(campaign.ad_account_id)?,
            workspace_id: WorkspaceId::new(campaign.workspace_id)?,
            name: AdCampaignName::new(campaign.name)?,
            status: AdCampaignStatus::try_from(campaign.status.as_str())?,
            daily_budget: Cents::new(campaign.daily_budget_cents)?,
            spend_today: Cents::new(campaign.spend_today_cents)?,
            conversions: campaign.conversions,
            revenue: Cents::new(campaign.revenue_cents)?,
            updated_at: campaign.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewAdAccount> for NewAdAccount<'a> {
    fn from(account: &'a DomainNewAdAccount) -> Self {
        Self {
            workspace_id: account.workspace_id.get(),
            platform: account.platform.as_str(),
            name: account.name.as_str(),
            daily_budget_cents: account.daily_budget.get(),
            target_roas: account.target_roas,
        }
    }
}

impl<'a> From<&'a DomainNewAdCampaign> for NewAdCampaign<'a> {
    fn from(campaign: &'a DomainNewAdCampaign) -> Self {
        Self {
            ad_account_id: campaign.ad_account_id.get(),
            workspace_id: campaign.workspace_id.get(),
            name: campaign.name.as_str(),
            daily_budget_cents: campaign.daily_budget.get(),
        }
    }
}
