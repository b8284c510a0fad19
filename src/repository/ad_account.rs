//! Repository implementation for ad accounts and their campaigns.

use diesel::prelude::*;

use crate::{
    domain::{
        ad_account::{AdAccount, AdCampaign, NewAdAccount, NewAdCampaign},
        types::{AdAccountId, AdCampaignId, WorkspaceId},
    },
    models::ad_account::{
        AdAccount as DbAdAccount, AdCampaign as DbAdCampaign, NewAdAccount as DbNewAdAccount,
        NewAdCampaign as DbNewAdCampaign,
    },
    repository::{AdAccountReader, AdAccountWriter, DieselRepository, errors::RepositoryResult},
};

impl AdAccountReader for DieselRepository {
    fn get_ad_account(
        &self,
        id: AdAccountId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<AdAccount>> {
        use crate::schema::ad_accounts;

        let mut conn = self.conn()?;
        let account = ad_accounts::table
            .filter(ad_accounts::id.eq(id.get()))
            .filter(ad_accounts::workspace_id.eq(workspace_id.get()))
            .first::<DbAdAccount>(&mut conn)
            .optional()?;

        Ok(account.map(AdAccount::try_from).transpose()?)
    }

    fn list_ad_accounts(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<AdAccount>> {
        use crate::schema::ad_accounts;

        let mut conn = self.conn()?;
        let items = ad_accounts::table
            .filter(ad_accounts::workspace_id.eq(workspace_id.get()))
            .order(ad_accounts::id.asc())
            .load::<DbAdAccount>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(AdAccount::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn get_ad_campaign(
        &self,
        id: AdCampaignId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<AdCampaign>> {
        use crate::schema::ad_campaigns;

        let mut conn = self.conn()?;
        let campaign = ad_campaigns::table
            .filter(ad_campaigns::id.eq(id.get()))
            .filter(ad_campaigns::workspace_id.eq(workspace_id.get()))
            .first::<DbAdCampaign>(&mut conn)
            .optional()?;

        Ok(campaign.map(AdCampaign::try_from).transpose()?)
    }

    fn list_ad_campaigns(
        &self,
        ad_account_id: AdAccountId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Vec<AdCampaign>> {
        use crate::schema::{ad_accounts, ad_campaigns};

        let mut conn = self.conn()?;
        // Join through the account so its workspace, not only the child row's, is checked.
        let items = ad_campaigns::table
            .inner_join(ad_accounts::table)
            .filter(ad_accounts::id.eq(ad_account_id.get()))
            .filter(ad_accounts::workspace_id.eq(workspace_id.get()))
            .filter(ad_campaigns::workspace_id.eq(workspace_id.get()))
            .order(ad_campaigns::id.asc())
            .select(DbAdCampaign::as_select())
            .load::<DbAdCampaign>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(AdCampaign::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl AdAccountWriter for DieselRepository {
    fn create_ad_account(&self, new_account: &NewAdAccount) -> RepositoryResult<AdAccount> {
        use crate::schema::ad_accounts;

        let mut conn = self.conn()?;
        let insertable: DbNewAdAccount = new_account.into();
        let created = diesel::insert_into(ad_accounts::table)
            .values(&insertable)
            .get_result::<DbAdAccount>(&mut conn)?;

        Ok(AdAccount::try_from(created)?)
    }

    fn create_ad_campaign(&self, new_campaign: &NewAdCampaign) -> RepositoryResult<AdCampaign> {
        use crate::schema::ad_campaigns;

        let mut conn = self.conn()?;
        let insertable: DbNewAdCampaign = new_campaign.into();
        let created = diesel::insert_into(ad_campaigns::table)
            .values(&insertable)
            .get_result::<DbAdCampaign>(&mut conn)?;

        Ok(AdCampaign::try_from(created)?)
    }

    fn set_execution_enabled(
        &self,
        id: AdAccountId,
        workspace_id: WorkspaceId,
        enabled: bool,
    ) -> RepositoryResult<AdAccount> {
        use crate::schema::ad_accounts;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            ad_accounts::table
                .filter(ad_accounts::id.eq(id.get()))
                .filter(ad_accounts::workspace_id.eq(workspace_id.get())),
        )
        .set(ad_accounts::execution_enabled.eq(enabled))
        .get_result::<DbAdAccount>(&mut conn)?;

        Ok(AdAccount::try_from(updated)?)
    }
}
