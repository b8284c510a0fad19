use actix_web::{HttpResponse, get, put, web};

use crate::forms::TogglePayload;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, workspaces};

#[get("/workspace")]
pub async fn show_workspace(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let workspace = workspaces::get_workspace(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(workspace))
}

#[put("/workspace/demo-mode")]
pub async fn set_demo_mode(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<TogglePayload>,
) -> Result<HttpResponse, ServiceError> {
    let workspace = workspaces::set_demo_mode(repo.get_ref(), &user, payload.enabled)?;
    Ok(HttpResponse::Ok().json(workspace))
}
