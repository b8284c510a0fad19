use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::dto::leads::LeadsQuery;
use crate::forms::leads::{
    AddNotePayload, CreateLeadPayload, ImportLeadsForm, UpdateLeadStatusPayload,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, leads};

#[get("/leads")]
pub async fn list_leads(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<LeadsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = leads::list_leads(repo.get_ref(), &user, query.into_inner())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/leads")]
pub async fn create_lead(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<CreateLeadPayload>,
) -> Result<HttpResponse, ServiceError> {
    let lead = leads::create_lead(repo.get_ref(), &user, payload.into_inner())?;
    Ok(HttpResponse::Created().json(lead))
}

// Registered before `/leads/{lead_id}` routes so `import` is not taken for an id.
#[post("/leads/import")]
pub async fn import_leads(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<ImportLeadsForm>,
) -> Result<HttpResponse, ServiceError> {
    let report = leads::import_leads(repo.get_ref(), &user, &mut form)?;
    Ok(HttpResponse::Ok().json(report))
}

#[get("/leads/{lead_id}")]
pub async fn show_lead(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let detail = leads::get_lead(repo.get_ref(), &user, lead_id.into_inner())?;
    Ok(HttpResponse::Ok().json(detail))
}

#[put("/leads/{lead_id}/status")]
pub async fn update_lead_status(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<UpdateLeadStatusPayload>,
) -> Result<HttpResponse, ServiceError> {
    let lead = leads::update_lead_status(
        repo.get_ref(),
        &user,
        lead_id.into_inner(),
        payload.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(lead))
}

#[post("/leads/{lead_id}/notes")]
pub async fn add_lead_note(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    payload: web::Json<AddNotePayload>,
) -> Result<HttpResponse, ServiceError> {
    let event = leads::add_lead_note(
        repo.get_ref(),
        &user,
        lead_id.into_inner(),
        payload.into_inner(),
    )?;
    Ok(HttpResponse::Created().json(event))
}

#[delete("/leads/{lead_id}")]
pub async fn delete_lead(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    leads::delete_lead(repo.get_ref(), &user, lead_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
