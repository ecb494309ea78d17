use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{SessionCookies, TokenService};
use crate::config::{AppConfig, ListingConfig};

/// Shared handles passed to every handler. Built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config.security);
        Self {
            pool,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }

    pub fn cookies(&self) -> SessionCookies {
        SessionCookies::new(self.config.security.secure_cookies, &self.tokens)
    }

    pub fn listing(&self) -> &ListingConfig {
        &self.config.listing
    }
}
