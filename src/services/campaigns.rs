use serde_json::json;
use validator::Validate;

use crate::domain::campaign::{Campaign, CampaignStatus, Channel};
use crate::domain::lead::Lead;
use crate::domain::types::{CampaignId, WorkspaceId};
use crate::dto::campaigns::LaunchReport;
use crate::forms::campaigns::{CreateCampaignPayload, UpdateCampaignStatusPayload};
use crate::kernel::{Decision, OUTREACH_TOPIC_PREFIX};
use crate::kernel::dispatcher::Dispatcher;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{
    AdAccountReader, CampaignReader, CampaignWriter, KernelWriter, LeadListQuery, LeadReader,
    ProposalReader, ProposalWriter, WorkspaceReader,
};
use crate::services::{
    ServiceError, ServiceResult, current_workspace, ensure_access, ensure_admin,
};

fn find_campaign<R>(
    repo: &R,
    campaign_id: i32,
    workspace_id: WorkspaceId,
) -> ServiceResult<Campaign>
where
    R: CampaignReader + ?Sized,
{
    let campaign_id = CampaignId::new(campaign_id).map_err(|_| ServiceError::NotFound)?;
    repo.get_campaign_by_id(campaign_id, workspace_id)?
        .ok_or(ServiceError::NotFound)
}

/// Lead contact for the given channel, if the lead has one.
fn contact_for(lead: &Lead, channel: Channel) -> Option<String> {
    match channel {
        Channel::Email => lead.email.as_ref().map(|e| e.as_str().to_string()),
        Channel::Sms | Channel::Voice => lead.phone.as_ref().map(|p| p.as_str().to_string()),
    }
}

pub fn list_campaigns<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Campaign>>
where
    R: CampaignReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    Ok(repo.list_campaigns(workspace_id)?)
}

pub fn get_campaign<R>(
    repo: &R,
    user: &AuthenticatedUser,
    campaign_id: i32,
) -> ServiceResult<Campaign>
where
    R: CampaignReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    find_campaign(repo, campaign_id, workspace_id)
}

/// Creates a draft campaign. Workspace admins only.
pub fn create_campaign<R>(
    repo: &R,
    user: &AuthenticatedUser,
    payload: CreateCampaignPayload,
) -> ServiceResult<Campaign>
where
    R: WorkspaceReader + CampaignWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;

    if let Err(err) = payload.validate() {
        log::warn!("Invalid campaign payload: {err}");
        return Err(ServiceError::Form(err.to_string()));
    }

    let campaign = repo.create_campaign(&payload.into_new_campaign(workspace_id)?)?;
    log::info!("Created campaign {} in workspace {workspace_id}", campaign.id);
    Ok(campaign)
}

/// Moves a campaign along its lifecycle, rejecting transitions it does not allow.
pub fn update_campaign_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    campaign_id: i32,
    payload: UpdateCampaignStatusPayload,
) -> ServiceResult<Campaign>
where
    R: WorkspaceReader + CampaignReader + CampaignWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let next = payload
        .status()
        .map_err(|e| ServiceError::Form(e.to_string()))?;
    let campaign = find_campaign(repo, campaign_id, workspace_id)?;

    if campaign.status == next {
        return Ok(campaign);
    }
    if !campaign.status.can_transition_to(next) {
        return Err(ServiceError::Conflict(format!(
            "campaign cannot move from {} to {next}",
            campaign.status
        )));
    }

    Ok(repo.update_campaign_status(campaign.id, workspace_id, next)?)
}

/// Queues one outreach message per reachable lead of an active campaign.
///
/// Messages go through the kernel dispatcher, so a repeated launch does not
/// message a lead twice and demo workspaces send nothing.
pub fn launch_outreach<R>(
    repo: &R,
    user: &AuthenticatedUser,
    campaign_id: i32,
) -> ServiceResult<LaunchReport>
where
    R: WorkspaceReader
        + CampaignReader
        + LeadReader
        + KernelWriter
        + AdAccountReader
        + ProposalReader
        + ProposalWriter,
{
    let workspace_id = ensure_admin(repo, user)?;
    let workspace = current_workspace(repo, workspace_id)?;
    let campaign = find_campaign(repo, campaign_id, workspace_id)?;

    if campaign.status != CampaignStatus::Active {
        return Err(ServiceError::Conflict(format!(
            "campaign is {} and cannot be launched",
            campaign.status
        )));
    }

    let (_, leads) = repo.list_leads(LeadListQuery::new(workspace_id, workspace.demo_mode))?;
    let topic = format!("{OUTREACH_TOPIC_PREFIX}{}", campaign.channel);

    let decisions: Vec<Decision> = leads
        .iter()
        .filter(|lead| lead.status.is_reachable())
        .filter_map(|lead| {
            let to = contact_for(lead, campaign.channel)?;
            Some(Decision::EnqueueMessage {
                topic: topic.clone(),
                payload: json!({
                    "campaign_id": campaign.id,
                    "campaign_name": campaign.name.as_str(),
                    "lead_id": lead.id,
                    "lead_name": lead.name.as_str(),
                    "channel": campaign.channel,
                    "to": to,
                }),
                dedupe_key: format!("outreach:{}:{}", campaign.id, lead.id),
            })
        })
        .collect();

    let eligible = decisions.len();
    let report = Dispatcher::new(repo).dispatch(&workspace, decisions)?;

    log::info!(
        "Launched campaign {} in workspace {workspace_id}: {eligible} eligible, {report}",
        campaign.id
    );

    Ok(LaunchReport {
        campaign_id: campaign.id,
        eligible,
        enqueued: report.messages_enqueued,
        suppressed: report.messages_suppressed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::LeadStatus;
    use crate::domain::types::{CampaignName, LeadEmail, LeadId, LeadName, PhoneNumber, PublicId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{admin, member, workspace};
    use chrono::Utc;

    fn campaign(status: CampaignStatus, channel: Channel) -> Campaign {
        let now = Utc::now().naive_utc();
        Campaign {
            id: CampaignId::new(3).expect("valid id"),
            workspace_id: WorkspaceId::new(7).expect("valid id"),
            name: CampaignName::new("Spring").expect("valid name"),
            channel,
            status,
            daily_budget: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn lead(id: i32, status: LeadStatus, email: Option<&str>, phone: Option<&str>) -> Lead {
        let now = Utc::now().naive_utc();
        Lead {
            id: LeadId::new(id).expect("valid id"),
            public_id: PublicId::new(),
            workspace_id: WorkspaceId::new(7).expect("valid id"),
            name: LeadName::new("Lead").expect("valid name"),
            email: email.map(|e| LeadEmail::new(e).expect("valid email")),
            phone: phone.map(|p| PhoneNumber::new(p).expect("valid phone")),
            source: None,
            status,
            fields: None,
            is_demo: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn member_cannot_create_campaigns() {
        let mut repo = MockRepository::new();
        repo.expect_is_platform_admin().returning(|_| Ok(false));
        repo.expect_create_campaign().times(0);

        let payload = CreateCampaignPayload {
            name: "Spring".into(),
            channel: "email".into(),
            daily_budget_cents: None,
        };
        assert_eq!(
            create_campaign(&repo, &member(), payload),
            Err(ServiceError::Unauthorized)
        );
    }

    #[test]
    fn completed_campaign_cannot_be_reactivated() {
        let mut repo = MockRepository::new();
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Completed, Channel::Email))));
        repo.expect_update_campaign_status().times(0);

        let payload = UpdateCampaignStatusPayload {
            status: "active".into(),
        };
        assert!(matches!(
            update_campaign_status(&repo, &admin(), 3, payload),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn draft_campaign_cannot_launch() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Draft, Channel::Email))));
        repo.expect_list_leads().times(0);

        assert!(matches!(
            launch_outreach(&repo, &admin(), 3),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn launch_enqueues_reachable_leads_with_contact() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Active, Channel::Email))));
        repo.expect_list_leads().returning(|_| {
            Ok((
                4,
                vec![
                    lead(1, LeadStatus::New, Some("a@example.com"), None),
                    lead(2, LeadStatus::Won, Some("b@example.com"), None),
                    lead(3, LeadStatus::Contacted, None, Some("+14155550100")),
                    lead(4, LeadStatus::Contacted, Some("d@example.com"), None),
                ],
            ))
        });
        repo.expect_enqueue_outbox_events()
            .withf(|events| {
                events.len() == 2
                    && events.iter().all(|e| e.topic == "outreach.email")
                    && events[0].dedupe_key == "outreach:3:1"
                    && events[1].dedupe_key == "outreach:3:4"
            })
            .times(1)
            .returning(|events| Ok(events.len()));

        let report = launch_outreach(&repo, &admin(), 3).expect("launches");
        assert_eq!(report.eligible, 2);
        assert_eq!(report.enqueued, 2);
        assert_eq!(report.suppressed, 0);
    }

    #[test]
    fn demo_launch_sends_nothing() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(true))));
        repo.expect_get_campaign_by_id()
            .returning(|_, _| Ok(Some(campaign(CampaignStatus::Active, Channel::Sms))));
        repo.expect_list_leads()
            .withf(|query| query.demo)
            .returning(|_| Ok((1, vec![lead(1, LeadStatus::New, None, Some("+14155550100"))])));
        repo.expect_enqueue_outbox_events().times(0);

        let report = launch_outreach(&repo, &admin(), 3).expect("launches");
        assert_eq!(report.eligible, 1);
        assert_eq!(report.enqueued, 0);
        assert_eq!(report.suppressed, 1);
    }
}
