use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        campaign::{Campaign, CampaignStatus, NewCampaign},
        types::{CampaignId, WorkspaceId},
    },
    models::campaign::{Campaign as DbCampaign, NewCampaign as DbNewCampaign},
    repository::{CampaignReader, CampaignWriter, DieselRepository, errors::RepositoryResult},
};

impl CampaignReader for DieselRepository {
    fn get_campaign_by_id(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Campaign>> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let campaign = campaigns::table
            .filter(campaigns::id.eq(id.get()))
            .filter(campaigns::workspace_id.eq(workspace_id.get()))
            .first::<DbCampaign>(&mut conn)
            .optional()?;

        Ok(campaign.map(Campaign::try_from).transpose()?)
    }

    fn list_campaigns(&self, workspace_id: WorkspaceId) -> RepositoryResult<Vec<Campaign>> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let items = campaigns::table
            .filter(campaigns::workspace_id.eq(workspace_id.get()))
            .order(campaigns::created_at.desc())
            .load::<DbCampaign>(&mut conn)?;

        Ok(items
            .into_iter()
            .map(Campaign::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl CampaignWriter for DieselRepository {
    fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let insertable: DbNewCampaign = new_campaign.into();
        let created = diesel::insert_into(campaigns::table)
            .values(&insertable)
            .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(created)?)
    }

    fn update_campaign_status(
        &self,
        id: CampaignId,
        workspace_id: WorkspaceId,
        status: CampaignStatus,
    ) -> RepositoryResult<Campaign> {
        use crate::schema::campaigns;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::workspace_id.eq(workspace_id.get())),
        )
        .set((
            campaigns::status.eq(status.to_string()),
            campaigns::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(updated)?)
    }
}
