//! Bearer-token identity of the caller.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, UserEmail, WorkspaceId};
use crate::models::config::ServerConfig;
use crate::services::ServiceError;

/// Claims carried by the HS256 token issued by the auth provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub workspace_id: i32,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Verifies the signature and expiry of `token` and returns its claims.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }

    /// The workspace every query of this user is scoped to.
    pub fn workspace(&self) -> Result<WorkspaceId, TypeConstraintError> {
        WorkspaceId::new(self.workspace_id)
    }

    pub fn user_email(&self) -> Result<UserEmail, TypeConstraintError> {
        UserEmail::new(self.email.as_str())
    }
}

/// Returns `true` when `role` is present in `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
        log::error!("Server configuration is not registered");
        return Err(ServiceError::Internal);
    };

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ServiceError::Unauthenticated)?;

    AuthenticatedUser::from_token(token, &config.secret).map_err(|e| {
        log::warn!("Rejected bearer token: {e}");
        ServiceError::Unauthenticated
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
