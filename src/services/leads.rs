use serde_json::json;
use validator::Validate;

use crate::domain::lead::{Lead, LeadStatus, NewLead};
use crate::domain::lead_event::{LeadEvent, LeadEventType, NewLeadEvent};
use crate::domain::types::{LeadId, NoteText, WorkspaceId};
use crate::domain::workspace::Workspace;
use crate::dto::leads::{ImportReport, ImportRowError, LeadDetail, LeadsQuery};
use crate::forms::leads::{AddNotePayload, CreateLeadPayload, ImportLeadsForm, UpdateLeadStatusPayload};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    LeadEventListQuery, LeadEventReader, LeadEventWriter, LeadListQuery, LeadReader, LeadWriter,
    WorkspaceReader,
};
use crate::services::{
    ServiceError, ServiceResult, current_workspace, ensure_access, ensure_admin,
};

/// Number of events embedded in a lead detail response.
const RECENT_EVENTS: usize = 50;

/// Loads a lead of the caller's workspace, hiding rows of the other demo partition.
fn visible_lead<R>(repo: &R, workspace: &Workspace, lead_id: i32) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    let lead_id = LeadId::new(lead_id).map_err(|_| ServiceError::NotFound)?;
    match repo.get_lead_by_id(lead_id, workspace.id)? {
        Some(lead) if lead.is_demo == workspace.demo_mode => Ok(lead),
        _ => Err(ServiceError::NotFound),
    }
}

fn visible_workspace<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Workspace>
where
    R: WorkspaceReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    current_workspace(repo, workspace_id)
}

/// Lists leads of the caller's workspace with optional search and status filters.
pub fn list_leads<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: LeadsQuery,
) -> ServiceResult<Paginated<Lead>>
where
    R: WorkspaceReader + LeadReader + ?Sized,
{
    let workspace = visible_workspace(repo, user)?;
    let page = query.page.unwrap_or(1).max(1);

    let mut list_query =
        LeadListQuery::new(workspace.id, workspace.demo_mode).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(term) = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        list_query = list_query.search(term);
    }

    if let Some(status) = query.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status = LeadStatus::try_from(status).map_err(|e| ServiceError::Form(e.to_string()))?;
        list_query = list_query.status(status);
    }

    let (total, leads) = repo.list_leads(list_query)?;
    Ok(Paginated::new(leads, page, DEFAULT_ITEMS_PER_PAGE, total))
}

/// Creates a lead. In demo mode the lead joins the demo partition.
pub fn create_lead<R>(
    repo: &R,
    user: &AuthenticatedUser,
    payload: CreateLeadPayload,
) -> ServiceResult<Lead>
where
    R: WorkspaceReader + LeadReader + LeadWriter + ?Sized,
{
    let workspace = visible_workspace(repo, user)?;

    if let Err(err) = payload.validate() {
        log::warn!("Invalid lead payload: {err}");
        return Err(ServiceError::Form(err.to_string()));
    }

    let mut new_lead = payload.into_new_lead(workspace.id)?;
    if workspace.demo_mode {
        new_lead = new_lead.demo();
    }

    if let Some(email) = &new_lead.email
        && repo
            .get_lead_by_email(email, workspace.id, workspace.demo_mode)?
            .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "a lead with email {email} already exists"
        )));
    }

    let lead = repo.create_lead(&new_lead)?;
    log::info!("Created lead {} in workspace {}", lead.id, workspace.id);
    Ok(lead)
}

/// Returns a lead with its most recent events.
pub fn get_lead<R>(repo: &R, user: &AuthenticatedUser, lead_id: i32) -> ServiceResult<LeadDetail>
where
    R: WorkspaceReader + LeadReader + LeadEventReader + ?Sized,
{
    let workspace = visible_workspace(repo, user)?;
    let lead = visible_lead(repo, &workspace, lead_id)?;

    let (total_events, events) = repo.list_lead_events(
        LeadEventListQuery::new(lead.id, workspace.id).paginate(1, RECENT_EVENTS),
    )?;

    Ok(LeadDetail {
        lead,
        events,
        total_events,
    })
}

/// Moves a lead to a new pipeline stage and records the change.
pub fn update_lead_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: i32,
    payload: UpdateLeadStatusPayload,
) -> ServiceResult<Lead>
where
    R: WorkspaceReader + LeadReader + LeadWriter + LeadEventWriter + ?Sized,
{
    let workspace = visible_workspace(repo, user)?;
    let lead = visible_lead(repo, &workspace, lead_id)?;
    let status = LeadStatus::try_from(payload.status.as_str())
        .map_err(|e| ServiceError::Form(e.to_string()))?;

    if status == lead.status {
        return Ok(lead);
    }

    let updated = repo.update_lead_status(lead.id, workspace.id, status)?;
    repo.create_lead_event(&NewLeadEvent::new(
        lead.id,
        workspace.id,
        LeadEventType::StatusChange,
        json!({ "from": lead.status, "to": status }),
        user.user_email()?,
    ))?;

    Ok(updated)
}

/// Attaches a sanitized note to a lead.
pub fn add_lead_note<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: i32,
    payload: AddNotePayload,
) -> ServiceResult<LeadEvent>
where
    R: WorkspaceReader + LeadReader + LeadEventWriter + ?Sized,
{
    let workspace = visible_workspace(repo, user)?;

    if let Err(err) = payload.validate() {
        return Err(ServiceError::Form(err.to_string()));
    }

    let lead = visible_lead(repo, &workspace, lead_id)?;
    let text = NoteText::new(payload.text)?;

    Ok(repo.create_lead_event(&NewLeadEvent::new(
        lead.id,
        workspace.id,
        LeadEventType::Note,
        json!({ "text": text.as_str() }),
        user.user_email()?,
    ))?)
}

/// Imports leads from an uploaded CSV file.
///
/// Invalid rows are reported, valid rows inserted, and rows whose email
/// already exists in the workspace are skipped.
pub fn import_leads<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &mut ImportLeadsForm,
) -> ServiceResult<ImportReport>
where
    R: WorkspaceReader + LeadWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let workspace = current_workspace(repo, workspace_id)?;

    let (mut leads, row_errors) = form.parse(workspace_id).map_err(|err| {
        log::warn!("Failed to parse lead import: {err}");
        ServiceError::Form(err.to_string())
    })?;
    if workspace.demo_mode {
        leads = leads.into_iter().map(NewLead::demo).collect();
    }

    let errors = row_errors
        .into_iter()
        .map(|e| ImportRowError {
            line: e.line,
            message: e.message,
        })
        .collect();
    import_parsed(repo, workspace_id, leads, errors)
}

fn import_parsed<R>(
    repo: &R,
    workspace_id: WorkspaceId,
    leads: Vec<NewLead>,
    errors: Vec<ImportRowError>,
) -> ServiceResult<ImportReport>
where
    R: LeadWriter + ?Sized,
{
    let inserted = repo.create_leads(&leads)?;
    let report = ImportReport {
        inserted,
        skipped: leads.len().saturating_sub(inserted),
        errors,
    };
    log::info!(
        "Imported leads into workspace {workspace_id}: {} inserted, {} skipped, {} invalid",
        report.inserted,
        report.skipped,
        report.errors.len()
    );
    Ok(report)
}

/// Deletes a lead. Workspace admins only.
pub fn delete_lead<R>(repo: &R, user: &AuthenticatedUser, lead_id: i32) -> ServiceResult<()>
where
    R: WorkspaceReader + LeadReader + LeadWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let workspace = current_workspace(repo, workspace_id)?;
    let lead = visible_lead(repo, &workspace, lead_id)?;

    repo.delete_lead(lead.id, workspace_id)?;
    log::info!("{} deleted lead {} in workspace {workspace_id}", user.email, lead.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{LeadName, PublicId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{admin, member, workspace};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn lead(id: i32, is_demo: bool) -> Lead {
        let now = Utc::now().naive_utc();
        Lead {
            id: LeadId::new(id).expect("valid id"),
            public_id: PublicId::new(),
            workspace_id: WorkspaceId::new(7).expect("valid id"),
            name: LeadName::new("Ada").expect("valid name"),
            email: None,
            phone: None,
            source: None,
            status: LeadStatus::New,
            fields: None,
            is_demo,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn listing_uses_the_demo_partition_of_the_workspace() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(true))));
        repo.expect_list_leads()
            .withf(|query| query.demo && query.workspace_id.get() == 7)
            .times(1)
            .returning(|_| Ok((1, vec![lead(1, true)])));

        let page = list_leads(&repo, &member(), LeadsQuery::default()).expect("lists");
        assert_eq!(page.total, 1);
        assert!(page.items[0].is_demo);
    }

    #[test]
    fn unknown_status_filter_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_list_leads().times(0);

        let query = LeadsQuery {
            status: Some("archived".into()),
            ..LeadsQuery::default()
        };
        assert!(matches!(
            list_leads(&repo, &member(), query),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn demo_lead_is_hidden_from_live_workspace() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(3, true))));
        repo.expect_list_lead_events().times(0);

        assert_eq!(
            get_lead(&repo, &member(), 3).map(|d| d.lead.id),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_get_lead_by_email()
            .returning(|_, _, _| Ok(Some(lead(1, false))));
        repo.expect_create_lead().times(0);

        let payload = CreateLeadPayload {
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            source: None,
            fields: BTreeMap::new(),
        };
        assert!(matches!(
            create_lead(&repo, &member(), payload),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn demo_lead_may_reuse_a_live_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(true))));
        repo.expect_get_lead_by_email()
            .withf(|_, _, demo| *demo)
            .times(1)
            .returning(|_, _, _| Ok(None));
        repo.expect_create_lead()
            .withf(|new_lead| new_lead.is_demo)
            .times(1)
            .returning(|_| Ok(lead(5, true)));

        let payload = CreateLeadPayload {
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            source: None,
            fields: BTreeMap::new(),
        };
        let created = create_lead(&repo, &member(), payload).expect("creates");
        assert!(created.is_demo);
    }

    #[test]
    fn status_change_is_recorded_as_event() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(4, false))));
        repo.expect_update_lead_status()
            .times(1)
            .returning(|_, _, status| {
                let mut updated = lead(4, false);
                updated.status = status;
                Ok(updated)
            });
        repo.expect_create_lead_event()
            .times(1)
            .withf(|event| {
                event.event_type == LeadEventType::StatusChange
                    && event.event_data["to"] == "contacted"
            })
            .returning(|event| {
                Ok(LeadEvent {
                    id: crate::domain::types::LeadEventId::new(1).expect("valid id"),
                    lead_id: event.lead_id,
                    workspace_id: event.workspace_id,
                    event_type: event.event_type.clone(),
                    event_data: event.event_data.clone(),
                    author_email: event.author_email.to_string(),
                    created_at: Utc::now().naive_utc(),
                })
            });

        let payload = UpdateLeadStatusPayload {
            status: "Contacted".into(),
        };
        let updated = update_lead_status(&repo, &member(), 4, payload).expect("updates");
        assert_eq!(updated.status, LeadStatus::Contacted);
    }

    #[test]
    fn delete_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_is_platform_admin().returning(|_| Ok(false));
        repo.expect_delete_lead().times(0);

        assert_eq!(delete_lead(&repo, &member(), 1), Err(ServiceError::Unauthorized));
    }

    #[test]
    fn admin_deletes_visible_lead() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(5, false))));
        repo.expect_delete_lead()
            .withf(|id, ws| id.get() == 5 && ws.get() == 7)
            .times(1)
            .returning(|_, _| Ok(()));

        delete_lead(&repo, &admin(), 5).expect("deletes");
    }

    #[test]
    fn import_reports_skipped_duplicates() {
        let mut repo = MockRepository::new();
        repo.expect_create_leads().returning(|_| Ok(1));

        let leads = vec![
            NewLead::try_new(7, "Ada".into(), Some("ada@example.com".into()), None, None, None)
                .expect("valid lead"),
            NewLead::try_new(7, "Bob".into(), Some("bob@example.com".into()), None, None, None)
                .expect("valid lead"),
        ];
        let errors = vec![ImportRowError {
            line: 4,
            message: "invalid email address".into(),
        }];
        let report = import_parsed(&repo, WorkspaceId::new(7).expect("valid id"), leads, errors)
            .expect("imports");
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 1);
    }
}
