mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn login_requires_a_json_body() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(server.url("/api/auth/login")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn login_requires_username_or_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "senha": "whatever" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn wrong_password_sets_no_cookies() -> Result<()> {
    let server = common::ensure_server().await?;
    let Some(pool) = common::db_pool().await? else {
        return Ok(());
    };
    let user = common::seed_user(&pool, "leitor").await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "nomeDeUsuario": user.username, "senha": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::SET_COOKIE).is_none());

    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "nomeDeUsuario": "no-such-user-anywhere", "senha": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::SET_COOKIE).is_none());

    sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
        .bind(user.id)
        .execute(&pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn successful_login_sets_session_cookies() -> Result<()> {
    let server = common::ensure_server().await?;
    let Some(pool) = common::db_pool().await? else {
        return Ok(());
    };
    let user = common::seed_user(&pool, "leitor").await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "nomeDeUsuario": user.username, "senha": user.password, "manterConectado": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookies: Vec<String> = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(String::from))
        .collect();
    let token = cookies.iter().find(|c| c.starts_with("token=")).expect("token cookie");
    assert!(token.contains("HttpOnly"));
    let csrf = cookies.iter().find(|c| c.starts_with("csrf_token=")).expect("csrf cookie");
    assert!(!csrf.contains("HttpOnly"));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));

    let body: Value = res.json().await?;
    assert_eq!(body["usuario"]["nivelPermissao"], "leitor");
    assert!(body["csrfToken"].as_str().is_some_and(|t| !t.is_empty()));

    sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
        .bind(user.id)
        .execute(&pool)
        .await?;
    Ok(())
}
