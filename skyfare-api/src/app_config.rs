use serde::Deserialize;
use skyfare_catalog::PricingConfig;
use skyfare_core::Flight;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub flights: Vec<Flight>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Shared code administrators enter on the admin sign-in page.
    pub admin_access_code: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GuardConfig {
    /// How long a protected request waits for its session to resolve
    /// before the loading page is served instead.
    #[serde(default = "default_resolve_wait_ms")]
    pub resolve_wait_ms: u64,
    /// `Refresh` interval of the loading page.
    #[serde(default = "default_refresh_seconds")]
    pub loading_refresh_seconds: u64,
    /// Sessions not seen for this long are dropped.
    #[serde(default = "default_session_idle_seconds")]
    pub session_idle_seconds: u64,
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_resolve_wait_ms() -> u64 { 250 }
fn default_refresh_seconds() -> u64 { 1 }
fn default_session_idle_seconds() -> u64 { 3600 }
fn default_sweep_interval_seconds() -> u64 { 60 }

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            resolve_wait_ms: default_resolve_wait_ms(),
            loading_refresh_seconds: default_refresh_seconds(),
            session_idle_seconds: default_session_idle_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SKYFARE_SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("SKYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    const SAMPLE: &str = r#"
        [server]
        port = 3000

        [auth]
        jwt_secret = "test-secret"
        jwt_expiration_seconds = 3600
        admin_access_code = "letmein"

        [pricing]
        tax_rate = 0.2

        [[flights]]
        id = "6f1c2a8e-3a4b-4c5d-9e6f-7a8b9c0d1e2f"
        flight_number = "SF101"
        departure_city = "Lisbon"
        arrival_city = "Madrid"
        price = 12900
    "#;

    #[test]
    fn test_deserializes_sample_file() {
        let config: Config = config::Config::builder()
            .add_source(File::from_str(SAMPLE, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.pricing.tax_rate, 0.2);
        assert_eq!(config.pricing.currency, "USD");
        assert_eq!(config.guard.resolve_wait_ms, 250);
        assert_eq!(config.guard.session_idle_seconds, 3600);
        assert_eq!(config.guard.sweep_interval_seconds, 60);
        assert_eq!(config.flights.len(), 1);
        assert_eq!(config.flights[0].price, 12_900);
    }
}
