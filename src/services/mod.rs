//! Authorization and orchestration between the HTTP layer and the repository.
//!
//! Every function takes the authenticated user and a repository implementing
//! the traits it needs, checks roles, and scopes all reads and writes to the
//! user's workspace.

use thiserror::Error;

use crate::ads::AdsError;
use crate::domain::types::{TypeConstraintError, WorkspaceId};
use crate::domain::workspace::Workspace;
use crate::models::auth::{AuthenticatedUser, check_role};
use crate::repository::WorkspaceReader;
use crate::repository::errors::RepositoryError;
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

pub mod ads;
pub mod campaigns;
pub mod leads;
pub mod workspaces;

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("not allowed")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("execution is disabled for this ad account")]
    ExecutionDisabled,
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    TypeConstraint(String),
    #[error("internal server error")]
    Internal,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Duplicate(msg) => ServiceError::Conflict(msg),
            other => {
                log::error!("Repository failure: {other}");
                ServiceError::Internal
            }
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

impl From<AdsError> for ServiceError {
    fn from(err: AdsError) -> Self {
        match err {
            AdsError::NotFound => ServiceError::NotFound,
            AdsError::NotExecutable(status) => {
                ServiceError::Conflict(format!("proposal is {status} and cannot be executed"))
            }
            AdsError::ExecutionDisabled => ServiceError::ExecutionDisabled,
            AdsError::Repository(e) => e.into(),
        }
    }
}

/// Rejects users without the service access role.
pub(crate) fn ensure_access(user: &AuthenticatedUser) -> ServiceResult<WorkspaceId> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    Ok(user.workspace()?)
}

/// Workspace admins and platform admins pass; everybody else is refused.
pub(crate) fn ensure_admin<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<WorkspaceId>
where
    R: WorkspaceReader + ?Sized,
{
    let workspace_id = ensure_access(user)?;
    if check_role(SERVICE_ADMIN_ROLE, &user.roles) {
        return Ok(workspace_id);
    }
    if repo.is_platform_admin(&user.user_email()?)? {
        log::info!("Platform admin {} acting on workspace {workspace_id}", user.email);
        return Ok(workspace_id);
    }
    Err(ServiceError::Unauthorized)
}

/// Loads the caller's workspace.
pub(crate) fn current_workspace<R>(repo: &R, workspace_id: WorkspaceId) -> ServiceResult<Workspace>
where
    R: WorkspaceReader + ?Sized,
{
    repo.get_workspace(workspace_id)?
        .ok_or(ServiceError::NotFound)
}


#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use crate::domain::types::{WorkspaceId, WorkspaceName};
    use crate::domain::workspace::Workspace;
    use crate::models::auth::AuthenticatedUser;

    pub fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "operator@example.com".into(),
            name: "Operator".into(),
            workspace_id: 7,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 4_000_000_000,
        }
    }

    pub fn member() -> AuthenticatedUser {
        user(&["ubigrowth"])
    }

    pub fn admin() -> AuthenticatedUser {
        user(&["ubigrowth", "ubigrowth_admin"])
    }

    pub fn workspace(demo_mode: bool) -> Workspace {
        Workspace {
            id: WorkspaceId::new(7).expect("valid id"),
            name: WorkspaceName::new("Acme").expect("valid name"),
            demo_mode,
            demo_seeded: false,
            created_at: Utc::now().naive_utc(),
        }
    }
}
