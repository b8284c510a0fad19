use crate::demo::sample_leads;
use crate::domain::workspace::Workspace;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{LeadWriter, WorkspaceReader, WorkspaceWriter};
use crate::services::{ServiceResult, current_workspace, ensure_access, ensure_admin};

/// Returns the caller's workspace.
pub fn get_workspace<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Workspace>
where
    R: WorkspaceReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    current_workspace(repo, workspace_id)
}

/// Switches demo mode on or off.
///
/// The first time demo mode is enabled the workspace is seeded with sample
/// leads. Live rows are never touched.
pub fn set_demo_mode<R>(repo: &R, user: &AuthenticatedUser, enabled: bool) -> ServiceResult<Workspace>
where
    R: WorkspaceReader + WorkspaceWriter + LeadWriter + ?Sized,
{
    let workspace_id = ensure_admin(repo, user)?;
    let workspace = current_workspace(repo, workspace_id)?;

    if enabled && !workspace.demo_seeded {
        let inserted = repo.create_leads(&sample_leads(workspace_id)?)?;
        repo.mark_demo_seeded(workspace_id)?;
        log::info!("Seeded {inserted} demo leads for workspace {workspace_id}");
    }

    let workspace = repo.set_demo_mode(workspace_id, enabled)?;
    log::info!(
        "{} set demo mode of workspace {workspace_id} to {enabled}",
        user.email
    );
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::test_support::{admin, member, workspace};

    #[test]
    fn member_cannot_toggle_demo_mode() {
        let mut repo = MockRepository::new();
        repo.expect_is_platform_admin().returning(|_| Ok(false));
        repo.expect_set_demo_mode().times(0);

        let result = set_demo_mode(&repo, &member(), true);
        assert_eq!(result, Err(ServiceError::Unauthorized));
    }

    #[test]
    fn platform_admin_can_toggle_demo_mode() {
        let mut repo = MockRepository::new();
        repo.expect_is_platform_admin().returning(|_| Ok(true));
        repo.expect_get_workspace().returning(|_| {
            let mut ws = workspace(false);
            ws.demo_seeded = true;
            Ok(Some(ws))
        });
        repo.expect_create_leads().times(0);
        repo.expect_set_demo_mode()
            .times(1)
            .returning(|_, enabled| Ok(workspace(enabled)));

        let ws = set_demo_mode(&repo, &member(), true).expect("toggles");
        assert!(ws.demo_mode);
    }

    #[test]
    fn first_enable_seeds_demo_leads_once() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(false))));
        repo.expect_create_leads()
            .times(1)
            .withf(|leads| !leads.is_empty() && leads.iter().all(|l| l.is_demo))
            .returning(|leads| Ok(leads.len()));
        repo.expect_mark_demo_seeded().times(1).returning(|_| Ok(()));
        repo.expect_set_demo_mode()
            .returning(|_, enabled| Ok(workspace(enabled)));

        set_demo_mode(&repo, &admin(), true).expect("enables demo mode");
    }

    #[test]
    fn disabling_never_seeds() {
        let mut repo = MockRepository::new();
        repo.expect_get_workspace()
            .returning(|_| Ok(Some(workspace(true))));
        repo.expect_create_leads().times(0);
        repo.expect_set_demo_mode()
            .returning(|_, enabled| Ok(workspace(enabled)));

        let ws = set_demo_mode(&repo, &admin(), false).expect("disables demo mode");
        assert!(!ws.demo_mode);
    }

    #[test]
    fn get_workspace_requires_access_role() {
        let repo = MockRepository::new();
        let outsider = crate::services::test_support::user(&[]);
        assert_eq!(get_workspace(&repo, &outsider), Err(ServiceError::Unauthorized));
    }
}
