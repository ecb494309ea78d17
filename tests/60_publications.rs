mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn reading_by_slug_counts_views() -> Result<()> {
    let server = common::ensure_server().await?;
    let Some(pool) = common::db_pool().await? else {
        return Ok(());
    };

    let author = common::seed_user(&pool, "colaborador").await?;
    let (client, csrf) = common::login(server, &author).await?;

    let res = client
        .post(server.url("/api/publicacoes"))
        .header("X-CSRF-Token", &csrf)
        .json(&json!({
            "titulo": "Perfis de Vento na Costa Ceará",
            "categoria": "Artigo",
            "autores": ["Ana Lima"],
            "palavras_chave": ["lidar", "vento"],
            "visibilidade": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let identifier = created["identifier"].as_str().expect("identifier").to_string();
    let slug = created["slug"].as_str().expect("slug").to_string();
    assert_eq!(slug, "perfis-de-vento-na-costa-ceara");
    assert_eq!(identifier.len(), 10);
    assert_eq!(created["visualizacoes"], 0);

    let anonymous = reqwest::Client::new();
    let path = server.url(&format!("/api/publicacoes/{}/{}", identifier, slug));
    let first: Value = anonymous.get(&path).send().await?.json().await?;
    let second: Value = anonymous.get(&path).send().await?.json().await?;
    assert_eq!(first["visualizacoes"], 1);
    assert_eq!(second["visualizacoes"], 2);

    let res = anonymous
        .get(server.url(&format!("/api/publicacoes/{}/outro-slug", identifier)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The public listing filters by exact author.
    let listed: Value = anonymous
        .get(server.url("/api/publicacoes"))
        .query(&[("autores", "Ana Lima"), ("titulo", "Costa Ceará")])
        .send()
        .await?
        .json()
        .await?;
    assert!(listed["total"].as_i64().unwrap_or(0) >= 1, "body: {}", listed);

    sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
        .bind(author.id)
        .execute(&pool)
        .await?;
    Ok(())
}
