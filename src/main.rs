use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use meteo_field_api::config::AppConfig;
use meteo_field_api::database::DatabaseManager;
use meteo_field_api::routes;
use meteo_field_api::state::AppState;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Parser)]
#[command(name = "meteo-field-api", version, about = "Meteorological field campaign API server")]
struct Args {
    /// Port to listen on. Falls back to METEO_API_PORT, then PORT, then 3000.
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "METEO_API_BIND", default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meteo_field_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let port = resolve_port(
        args.port,
        std::env::var("METEO_API_PORT").ok(),
        std::env::var("PORT").ok(),
    );

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting meteo-field-api in {:?} mode", config.environment);

    // Lazy so the service comes up (and reports 503 on /health) while the
    // database is unreachable.
    let pool = DatabaseManager::connect_lazy(&config.database).context("failed to create database pool")?;
    if let Err(e) = DatabaseManager::health_check(&pool).await {
        tracing::warn!("Database not reachable at startup: {}", e);
    }

    let state = AppState::new(pool, config);
    let app = routes::app(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.bind, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("meteo-field-api listening on http://{}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// An explicit `--port` wins over the environment.
fn resolve_port(flag: Option<u16>, meteo_port: Option<String>, port: Option<String>) -> u16 {
    flag.or_else(|| meteo_port.and_then(|s| s.parse().ok()))
        .or_else(|| port.and_then(|s| s.parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        assert_eq!(resolve_port(Some(4000), Some("5000".into()), Some("6000".into())), 4000);
    }

    #[test]
    fn meteo_port_beats_generic_port() {
        assert_eq!(resolve_port(None, Some("5000".into()), Some("6000".into())), 5000);
        assert_eq!(resolve_port(None, Some("junk".into()), Some("6000".into())), 6000);
        assert_eq!(resolve_port(None, None, None), DEFAULT_PORT);
    }
}
