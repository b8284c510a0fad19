//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::ads::generator::GeneratorConfig;
use crate::ads::governor::GuardrailConfig;
use crate::domain::types::Cents;
use crate::kernel::KernelConfig;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers and binaries.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HS256 secret used to verify bearer tokens issued by the auth provider.
    pub secret: String,
    /// ZeroMQ PUSH endpoint the outbox relay binds to; delivery workers connect PULL sockets.
    pub zmq_outbox_push: String,
    #[serde(default)]
    pub guardrails: GuardrailSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub kernel: KernelSettings,
}

#[cfg(feature = "server")]
impl ServerConfig {
    /// Loads `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
    /// profile (defaults to `local`), then `APP_`-prefixed environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}

/// Raw ad-spend guardrail values as written in the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GuardrailSettings {
    pub max_change_pct: f64,
    pub auto_approve_max_pct: f64,
    pub approval_threshold_cents: i64,
    pub min_daily_budget_cents: i64,
    pub max_actions_per_day: u32,
    pub require_approval_for_status_changes: bool,
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        Self {
            max_change_pct: 50.0,
            auto_approve_max_pct: 15.0,
            approval_threshold_cents: 50_000,
            min_daily_budget_cents: 500,
            max_actions_per_day: 10,
            require_approval_for_status_changes: true,
        }
    }
}

impl From<&GuardrailSettings> for GuardrailConfig {
    fn from(settings: &GuardrailSettings) -> Self {
        GuardrailConfig::new(
            settings.max_change_pct,
            settings.auto_approve_max_pct,
            settings.approval_threshold_cents,
            settings.min_daily_budget_cents,
            settings.max_actions_per_day,
            settings.require_approval_for_status_changes,
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    pub follow_up_after_hours: i64,
    pub stale_proposal_hours: i64,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            follow_up_after_hours: 24,
            stale_proposal_hours: 48,
        }
    }
}

impl From<&KernelSettings> for KernelConfig {
    fn from(settings: &KernelSettings) -> Self {
        KernelConfig {
            follow_up_after_hours: settings.follow_up_after_hours.max(1),
            stale_proposal_hours: settings.stale_proposal_hours.max(1),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub min_spend_cents: i64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            min_spend_cents: 2_000,
        }
    }
}

impl From<&GeneratorSettings> for GeneratorConfig {
    fn from(settings: &GeneratorSettings) -> Self {
        GeneratorConfig {
            min_spend: Cents::new(settings.min_spend_cents).unwrap_or(Cents::ZERO),
        }
    }
}
