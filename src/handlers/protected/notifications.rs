// handlers/protected/notifications.rs - broadcast and targeted notifications
//
// Content managers (gestor_conteudo and above) see and manage every
// notification. Everyone else sees broadcasts and their own, minus the ones
// they have hidden.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::{Notificacao, NotificacaoInput, NOTIFICACAO_COLUMNS};
use crate::database::{Page, QueryBuilder};
use crate::error::ApiError;
use crate::filter::{FilteredQuery, Predicate, SqlParam};
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser, ListResponse, ListResult};
use crate::state::AppState;

const VISIBLE_TO_USER: &str = "(n.enviado_para_todos = true OR n.id_usuario = {0}) \
     AND NOT EXISTS (SELECT 1 FROM notificacoesusuarios nu \
     WHERE nu.id_notificacao = n.id_notificacao AND nu.id_usuario = {0} AND nu.oculta = true)";

/// Upserts the caller's recipient row as hidden. Users who joined after a
/// broadcast have no row yet, so one is created. Affects no rows when the
/// notification is not visible to `$2`.
const HIDE_FOR_USER: &str = "INSERT INTO notificacoesusuarios (id_notificacao, id_usuario, lida, oculta) \
     SELECT n.id_notificacao, $2, false, true FROM notificacoes n \
     WHERE n.id_notificacao = $1 AND (n.enviado_para_todos = true OR n.id_usuario = $2) \
     ON CONFLICT (id_notificacao, id_usuario) DO UPDATE SET oculta = true";

fn is_manager(user: &AuthUser) -> bool {
    user.is_at_least(Role::GestorConteudo)
}

pub(crate) fn visible_query(user: &AuthUser) -> FilteredQuery {
    let query = FilteredQuery::new(
        format!("SELECT {} FROM notificacoes n", NOTIFICACAO_COLUMNS),
        "SELECT COUNT(*) AS count FROM notificacoes n",
    );
    if is_manager(user) {
        query
    } else {
        query.filter(Predicate::raw(VISIBLE_TO_USER, vec![SqlParam::Uuid(user.id)]))
    }
}

/// GET /api/notificacoes
pub async fn list(State(state): State<AppState>, user: AuthUser) -> ListResult<Notificacao> {
    let query = visible_query(&user).newest_first("n.data_envio", "n.id_notificacao");
    let page: Page<Notificacao> = QueryBuilder::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("notificacoes", page))
}

/// GET /api/notificacoes/:id
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Notificacao>, ApiError> {
    let id = parse_uuid(&id, "notification")?;
    let query = visible_query(&user).filter(Predicate::eq("n.id_notificacao", id));
    let mut rows: Vec<Notificacao> = QueryBuilder::new(query).select_all(&state.pool).await?;
    rows.pop()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Notification not found"))
}

/// POST /api/notificacoes - insert and fan out recipient rows in one transaction
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NotificacaoInput>,
) -> ApiResult<Notificacao> {
    if !input.enviado_para_todos && input.id_usuario.is_none() {
        return Err(ApiError::bad_request(
            "id_usuario is required when enviado_para_todos is false",
        ));
    }

    let mut tx = state.pool.begin().await?;

    let sql = format!(
        "INSERT INTO notificacoes AS n (id_notificacao, titulo, mensagem, data_envio, id_noticia, tipo, id_usuario, \
         enviado_para_todos) VALUES ($1, $2, $3, NOW(), $4, $5, $6, $7) RETURNING {}",
        NOTIFICACAO_COLUMNS
    );
    let notificacao = sqlx::query_as::<_, Notificacao>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.titulo.as_str())
        .bind(input.mensagem.as_str())
        .bind(input.id_noticia)
        .bind(input.tipo.as_str())
        .bind(input.id_usuario)
        .bind(input.enviado_para_todos)
        .fetch_one(&mut *tx)
        .await?;

    let recipients = if notificacao.enviado_para_todos {
        sqlx::query(
            "INSERT INTO notificacoesusuarios (id_notificacao, id_usuario, lida, oculta) \
             SELECT $1, id_usuario, false, false FROM usuarios",
        )
        .bind(notificacao.id_notificacao)
        .execute(&mut *tx)
        .await?
        .rows_affected()
    } else {
        sqlx::query(
            "INSERT INTO notificacoesusuarios (id_notificacao, id_usuario, lida, oculta) VALUES ($1, $2, false, false)",
        )
        .bind(notificacao.id_notificacao)
        .bind(notificacao.id_usuario)
        .execute(&mut *tx)
        .await?
        .rows_affected()
    };

    tx.commit().await?;
    tracing::info!(
        "Notification {} delivered to {} recipient(s)",
        notificacao.id_notificacao,
        recipients
    );
    Ok(ApiResponse::created(notificacao))
}

/// PUT /api/notificacoes/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<NotificacaoInput>,
) -> ApiResult<Notificacao> {
    let id = parse_uuid(&id, "notification")?;
    let sql = format!(
        "UPDATE notificacoes AS n SET titulo = $1, mensagem = $2, id_noticia = $3, tipo = $4 \
         WHERE n.id_notificacao = $5 RETURNING {}",
        NOTIFICACAO_COLUMNS
    );
    let notificacao = sqlx::query_as::<_, Notificacao>(&sql)
        .bind(input.titulo.as_str())
        .bind(input.mensagem.as_str())
        .bind(input.id_noticia)
        .bind(input.tipo.as_str())
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    Ok(ApiResponse::success(notificacao))
}

/// DELETE /api/notificacoes/:id - managers delete, everyone else hides
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Response, ApiError> {
    let id = parse_uuid(&id, "notification")?;

    if is_manager(&user) {
        let mut tx = state.pool.begin().await?;
        sqlx::query("DELETE FROM notificacoesusuarios WHERE id_notificacao = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM notificacoes WHERE id_notificacao = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Notification not found"));
        }
        tx.commit().await?;
        return Ok(ApiResponse::no_content().into_response());
    }

    let result = sqlx::query(HIDE_FOR_USER)
        .bind(id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }

    let body: Value = json!({ "id_notificacao": id });
    Ok(ApiResponse::message("Notification hidden", body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::nil(),
            username: "caio".into(),
            email: "caio@example.org".into(),
            role,
            profile_image: None,
        }
    }

    #[test]
    fn managers_see_everything() {
        let built = visible_query(&user(Role::GestorConteudo)).build().unwrap();
        assert!(!built.count.query.contains("WHERE"));
        assert!(built.count.params.is_empty());
    }

    #[test]
    fn readers_see_broadcasts_and_their_own_unhidden() {
        let built = visible_query(&user(Role::Colaborador))
            .filter(Predicate::eq("n.id_notificacao", Uuid::nil()))
            .build()
            .unwrap();
        assert!(built.select.query.contains("n.id_usuario = $1"));
        assert!(built.select.query.contains("nu.id_usuario = $1 AND nu.oculta = true"));
        assert!(built.select.query.ends_with("AND n.id_notificacao = $2"));
        assert_eq!(built.select.params.len(), 2);
    }

    #[test]
    fn hiding_creates_the_recipient_row_when_missing() {
        assert!(HIDE_FOR_USER.starts_with("INSERT INTO notificacoesusuarios"));
        assert!(HIDE_FOR_USER.contains("n.enviado_para_todos = true OR n.id_usuario = $2"));
        assert!(HIDE_FOR_USER.ends_with("ON CONFLICT (id_notificacao, id_usuario) DO UPDATE SET oculta = true"));
    }
}
