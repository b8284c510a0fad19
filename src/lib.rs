//! UbiGrowth: multi-tenant marketing automation backend.
//!
//! The `data` feature exposes the domain, persistence, ad-spend governance and
//! kernel layers; `server` adds the JSON API and the binaries.

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::{DieselRepository, establish_connection_pool};

pub mod ads;
pub mod demo;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
pub mod kernel;
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "ubigrowth";
pub const SERVICE_ADMIN_ROLE: &str = "ubigrowth_admin";

/// Registers every API route on an actix `ServiceConfig`.
#[cfg(feature = "server")]
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    use crate::routes::{ads, campaigns, leads, workspace};

    cfg.service(crate::routes::health)
        .service(
            web::scope("/api/v1")
                .service(workspace::show_workspace)
                .service(workspace::set_demo_mode)
                .service(leads::list_leads)
                .service(leads::create_lead)
                .service(leads::import_leads)
                .service(leads::show_lead)
                .service(leads::update_lead_status)
                .service(leads::add_lead_note)
                .service(leads::delete_lead)
                .service(campaigns::list_campaigns)
                .service(campaigns::create_campaign)
                .service(campaigns::show_campaign)
                .service(campaigns::update_campaign_status)
                .service(campaigns::launch_campaign),
        )
        .service(
            web::scope("/api/ads")
                .service(ads::list_ad_accounts)
                .service(ads::approve_proposal)
                .service(ads::reject_proposal)
                .service(ads::execute_proposal)
                .service(ads::list_ad_campaigns)
                .service(ads::list_proposals)
                .service(ads::generate_proposals)
                .service(ads::set_execution_enabled),
        );
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);
    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!(
        "Starting UbiGrowth API on {}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(configure_api)
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
