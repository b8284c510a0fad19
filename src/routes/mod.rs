//! HTTP handlers. Each one extracts the caller, delegates to a service and
//! serialises the result as JSON.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, ResponseError, get};
use serde_json::json;

use crate::services::ServiceError;

pub mod ads;
pub mod campaigns;
pub mod leads;
pub mod workspace;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Unauthorized => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) | ServiceError::ExecutionDisabled => StatusCode::CONFLICT,
            ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
