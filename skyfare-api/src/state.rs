use std::sync::Arc;
use std::time::Duration;

use skyfare_catalog::PricingEngine;
use skyfare_core::repository::{FlightRepository, InMemoryFlightRepository};
use skyfare_core::IdentityResolver;

use crate::app_config::Config;
use crate::middleware::auth::JwtIdentityResolver;
use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub admin_access_code: String,
}

#[derive(Clone)]
pub struct GuardSettings {
    pub resolve_wait: Duration,
    pub refresh_seconds: u64,
    /// Sessions unused for this long are dropped by the sweeper.
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthConfig,
    pub guard: GuardSettings,
    pub sessions: Arc<SessionRegistry>,
    pub flights: Arc<dyn FlightRepository>,
    pub pricing: Arc<PricingEngine>,
}

impl AppState {
    pub fn new(
        auth: AuthConfig,
        guard: GuardSettings,
        resolver: Arc<dyn IdentityResolver>,
        flights: Arc<dyn FlightRepository>,
        pricing: PricingEngine,
    ) -> Self {
        let sessions = SessionRegistry::new(resolver, guard.idle_timeout);
        Self {
            auth,
            guard,
            sessions: Arc::new(sessions),
            flights,
            pricing: Arc::new(pricing),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let auth = AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            admin_access_code: config.auth.admin_access_code.clone(),
        };
        let guard = GuardSettings {
            resolve_wait: Duration::from_millis(config.guard.resolve_wait_ms),
            refresh_seconds: config.guard.loading_refresh_seconds,
            idle_timeout: Duration::from_secs(config.guard.session_idle_seconds),
            sweep_interval: Duration::from_secs(config.guard.sweep_interval_seconds),
        };
        let resolver = Arc::new(JwtIdentityResolver::new(&auth.secret));
        let flights = Arc::new(InMemoryFlightRepository::new(config.flights.clone()));
        let pricing = PricingEngine::new(config.pricing.clone())?;

        Ok(Self::new(auth, guard, resolver, flights, pricing))
    }
}
