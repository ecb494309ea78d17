mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["name"], "meteo-field-api");
    assert!(body["endpoints"].is_object(), "missing endpoints: {}", body);

    Ok(())
}

#[tokio::test]
async fn health_reports_database_state() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/health")).await?;
    let status = res.status();
    let body: Value = res.json().await?;

    if common::database_url().is_some() {
        assert_eq!(status, StatusCode::OK, "body: {}", body);
        assert_eq!(body["database"], "ok");
    } else {
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "body: {}", body);
        assert_eq!(body["status"], "degraded");
    }

    Ok(())
}
