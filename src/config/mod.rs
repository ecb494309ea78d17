use serde::{Deserialize, Serialize};
use std::env;

/// Secret used when no `SECURITY_JWT_SECRET` is provided in development.
const DEVELOPMENT_JWT_SECRET: &str = "meteo-field-api-development-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub access_token_hours: i64,
    pub refresh_token_days: i64,
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

/// Default page sizes for each listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub publications_page_size: i64,
    pub user_publications_page_size: i64,
    pub news_page_size: i64,
    pub favorites_page_size: i64,
    pub campaigns_page_size: i64,
    pub equipment_page_size: i64,
    pub readings_page_size: i64,
    pub users_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Checks the values that have no safe default outside development.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("SECURITY_JWT_SECRET"));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ACCESS_TOKEN_HOURS") {
            self.security.access_token_hours = v.parse().unwrap_or(self.security.access_token_hours);
        }
        if let Ok(v) = env::var("SECURITY_REFRESH_TOKEN_DAYS") {
            self.security.refresh_token_days = v.parse().unwrap_or(self.security.refresh_token_days);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        // Listing overrides
        if let Ok(v) = env::var("LISTING_PUBLICATIONS_PAGE_SIZE") {
            self.listing.publications_page_size = v.parse().unwrap_or(self.listing.publications_page_size);
        }
        if let Ok(v) = env::var("LISTING_USER_PUBLICATIONS_PAGE_SIZE") {
            self.listing.user_publications_page_size =
                v.parse().unwrap_or(self.listing.user_publications_page_size);
        }
        if let Ok(v) = env::var("LISTING_NEWS_PAGE_SIZE") {
            self.listing.news_page_size = v.parse().unwrap_or(self.listing.news_page_size);
        }
        if let Ok(v) = env::var("LISTING_FAVORITES_PAGE_SIZE") {
            self.listing.favorites_page_size = v.parse().unwrap_or(self.listing.favorites_page_size);
        }
        if let Ok(v) = env::var("LISTING_CAMPAIGNS_PAGE_SIZE") {
            self.listing.campaigns_page_size = v.parse().unwrap_or(self.listing.campaigns_page_size);
        }
        if let Ok(v) = env::var("LISTING_EQUIPMENT_PAGE_SIZE") {
            self.listing.equipment_page_size = v.parse().unwrap_or(self.listing.equipment_page_size);
        }
        if let Ok(v) = env::var("LISTING_READINGS_PAGE_SIZE") {
            self.listing.readings_page_size = v.parse().unwrap_or(self.listing.readings_page_size);
        }
        if let Ok(v) = env::var("LISTING_USERS_PAGE_SIZE") {
            self.listing.users_page_size = v.parse().unwrap_or(self.listing.users_page_size);
        }
        if let Ok(v) = env::var("LISTING_MAX_PAGE_SIZE") {
            self.listing.max_page_size = v.parse().unwrap_or(self.listing.max_page_size);
        }

        if self.security.jwt_secret.is_empty() && self.environment == Environment::Development {
            tracing::warn!("SECURITY_JWT_SECRET not set; using the development secret");
            self.security.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        }

        self
    }

    /// Configuration used by unit tests and local runs.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_hours: 4,
                refresh_token_days: 30,
                secure_cookies: false,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                bcrypt_cost: 10,
            },
            listing: ListingConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_hours: 4,
                refresh_token_days: 30,
                secure_cookies: true,
                cors_origins: vec![],
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            listing: ListingConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_hours: 4,
                refresh_token_days: 30,
                secure_cookies: true,
                cors_origins: vec![],
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            listing: ListingConfig::default(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            publications_page_size: 12,
            user_publications_page_size: 10,
            news_page_size: 8,
            favorites_page_size: 10,
            campaigns_page_size: 10,
            equipment_page_size: 10,
            readings_page_size: 50,
            users_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.secure_cookies);
        assert_eq!(config.security.access_token_hours, 4);
        assert_eq!(config.security.refresh_token_days, 30);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.secure_cookies);
        assert!(config.is_production());
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn listing_defaults_match_endpoints() {
        let listing = ListingConfig::default();
        assert_eq!(listing.publications_page_size, 12);
        assert_eq!(listing.user_publications_page_size, 10);
        assert_eq!(listing.news_page_size, 8);
        assert_eq!(listing.favorites_page_size, 10);
    }

    #[test]
    fn validate_rejects_missing_secret() {
        let mut config = AppConfig::production();
        config.database.url = "postgres://localhost/meteo".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("SECURITY_JWT_SECRET"))));

        config.security.jwt_secret = "s3cret".to_string();
        assert!(config.validate().is_ok());
    }
}
