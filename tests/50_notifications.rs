mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn reader_who_joined_after_a_broadcast_can_hide_it() -> Result<()> {
    let server = common::ensure_server().await?;
    let Some(pool) = common::db_pool().await? else {
        return Ok(());
    };

    // Broadcast first: the reader below gets no notificacoesusuarios row.
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO notificacoes (titulo, mensagem, tipo, enviado_para_todos) \
         VALUES ('Manutenção do LIDAR', 'Equipamento fora do ar amanhã', 'aviso', true) \
         RETURNING id_notificacao",
    )
    .fetch_one(&pool)
    .await?;

    let reader = common::seed_user(&pool, "leitor").await?;
    let (client, csrf) = common::login(server, &reader).await?;
    let item = server.url(&format!("/api/notificacoes/{}", id));

    let res = client.get(&item).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(&item).header("X-CSRF-Token", &csrf).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["id_notificacao"], id.to_string());

    let res = client.get(&item).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Hiding twice is harmless.
    let res = client.delete(&item).header("X-CSRF-Token", &csrf).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let hidden: bool = sqlx::query_scalar(
        "SELECT oculta FROM notificacoesusuarios WHERE id_notificacao = $1 AND id_usuario = $2",
    )
    .bind(id)
    .bind(reader.id)
    .fetch_one(&pool)
    .await?;
    assert!(hidden);

    sqlx::query("DELETE FROM notificacoes WHERE id_notificacao = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
        .bind(reader.id)
        .execute(&pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn reader_cannot_hide_someone_elses_notification() -> Result<()> {
    let server = common::ensure_server().await?;
    let Some(pool) = common::db_pool().await? else {
        return Ok(());
    };

    let owner = common::seed_user(&pool, "leitor").await?;
    let other = common::seed_user(&pool, "leitor").await?;
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO notificacoes (titulo, mensagem, tipo, id_usuario, enviado_para_todos) \
         VALUES ('Aprovação', 'Seu cadastro foi aprovado', 'conta', $1, false) RETURNING id_notificacao",
    )
    .bind(owner.id)
    .fetch_one(&pool)
    .await?;

    let (client, csrf) = common::login(server, &other).await?;
    let res = client
        .delete(server.url(&format!("/api/notificacoes/{}", id)))
        .header("X-CSRF-Token", &csrf)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    sqlx::query("DELETE FROM usuarios WHERE id_usuario = ANY($1)")
        .bind(vec![owner.id, other.id])
        .execute(&pool)
        .await?;
    Ok(())
}
