use actix_web::{HttpResponse, get, post, put, web};

use crate::ads::generator::GeneratorConfig;
use crate::ads::governor::GuardrailConfig;
use crate::forms::TogglePayload;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, ads};

#[get("/accounts")]
pub async fn list_ad_accounts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let accounts = ads::list_ad_accounts(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(accounts))
}

#[get("/{ad_account_id}/campaigns")]
pub async fn list_ad_campaigns(
    ad_account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let campaigns = ads::list_ad_campaigns(repo.get_ref(), &user, ad_account_id.into_inner())?;
    Ok(HttpResponse::Ok().json(campaigns))
}

#[get("/{ad_account_id}/proposals")]
pub async fn list_proposals(
    ad_account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let proposals = ads::list_proposals(repo.get_ref(), &user, ad_account_id.into_inner())?;
    Ok(HttpResponse::Ok().json(proposals))
}

#[post("/{ad_account_id}/proposals/generate")]
pub async fn generate_proposals(
    ad_account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServiceError> {
    let guardrails = GuardrailConfig::from(&server_config.guardrails);
    let generator = GeneratorConfig::from(&server_config.generator);
    let proposals = ads::generate_proposals(
        repo.get_ref(),
        &user,
        ad_account_id.into_inner(),
        &guardrails,
        &generator,
    )?;
    Ok(HttpResponse::Created().json(proposals))
}

#[post("/proposals/{proposal_id}/approve")]
pub async fn approve_proposal(
    proposal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let proposal = ads::approve_proposal(repo.get_ref(), &user, proposal_id.into_inner())?;
    Ok(HttpResponse::Ok().json(proposal))
}

#[post("/proposals/{proposal_id}/reject")]
pub async fn reject_proposal(
    proposal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let proposal = ads::reject_proposal(repo.get_ref(), &user, proposal_id.into_inner())?;
    Ok(HttpResponse::Ok().json(proposal))
}

#[post("/proposals/{proposal_id}/execute")]
pub async fn execute_proposal(
    proposal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let proposal = ads::execute_proposal(repo.get_ref(), &user, proposal_id.into_inner())?;
    Ok(HttpResponse::Ok().json(proposal))
}

#[put("/{ad_account_id}/execution-enabled")]
pub async fn set_execution_enabled(
    ad_account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<TogglePayload>,
) -> Result<HttpResponse, ServiceError> {
    let account = ads::set_execution_enabled(
        repo.get_ref(),
        &user,
        ad_account_id.into_inner(),
        payload.enabled,
    )?;
    Ok(HttpResponse::Ok().json(account))
}
