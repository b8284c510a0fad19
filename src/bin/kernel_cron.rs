//! One kernel tick over every workspace. Meant to be scheduled by cron.

use chrono::Utc;
use dotenvy::dotenv;

use ubigrowth::ads::governor::GuardrailConfig;
use ubigrowth::kernel::{KernelConfig, default_policies, run_kernel_tick};
use ubigrowth::models::config::ServerConfig;
use ubigrowth::repository::{DieselRepository, establish_connection_pool};

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let policies = default_policies(&KernelConfig::from(&server_config.kernel));
    let guardrails = GuardrailConfig::from(&server_config.guardrails);

    log::info!("Starting kernel tick with {} policies", policies.len());

    match run_kernel_tick(&repo, &policies, &guardrails, Utc::now().naive_utc()) {
        Ok(report) => {
            log::info!(
                "Kernel tick finished: {} workspaces succeeded, {} failed",
                report.succeeded(),
                report.failed()
            );
            if report.failed() > 0 {
                std::process::exit(2);
            }
        }
        Err(e) => {
            log::error!("Kernel tick aborted: {e}");
            std::process::exit(1);
        }
    }
}
