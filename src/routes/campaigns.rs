use actix_web::{HttpResponse, get, post, put, web};

use crate::forms::campaigns::{CreateCampaignPayload, UpdateCampaignStatusPayload};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, campaigns};

#[get("/campaigns")]
pub async fn list_campaigns(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let items = campaigns::list_campaigns(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(items))
}

#[post("/campaigns")]
pub async fn create_campaign(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<CreateCampaignPayload>,
) -> Result<HttpResponse, ServiceError> {
    let campaign = campaigns::create_campaign(repo.get_ref(), &user, payload.into_inner())?;
    Ok(HttpResponse::Created().json(campaign))
}

#[get("/campaigns/{campaign_id}")]
pub async fn show_campaign(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let campaign = campaigns::get_campaign(repo.get_ref(), &user, campaign_id.into_inner())?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[put("/campaigns/{campaign_id}/status")]
pub async fn update_campaign_status(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<UpdateCampaignStatusPayload>,
) -> Result<HttpResponse, ServiceError> {
    let campaign = campaigns::update_campaign_status(
        repo.get_ref(),
        &user,
        campaign_id.into_inner(),
        payload.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(campaign))
}

#[post("/campaigns/{campaign_id}/launch")]
pub async fn launch_campaign(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let report = campaigns::launch_outreach(repo.get_ref(), &user, campaign_id.into_inner())?;
    Ok(HttpResponse::Ok().json(report))
}
