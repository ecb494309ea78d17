// handlers/elevated/users.rs - account administration (superusuario)

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::{RegisterRequest, UserUpdate, Usuario, USER_COLUMNS};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{non_empty, FilteredQuery, PageParams, Pagination};
use crate::handlers::protected::auth::optional_password_hash;
use crate::handlers::public::auth::insert_user;
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser, ListResponse, ListResult};
use crate::state::AppState;

fn parse_role(raw: Option<&str>) -> Result<Option<Role>, ApiError> {
    non_empty(raw)
        .map(|r| r.parse::<Role>().map_err(|e| ApiError::bad_request(e.to_string())))
        .transpose()
}

/// GET /api/usuarios
pub async fn list(State(state): State<AppState>, ApiQuery(page): ApiQuery<PageParams>) -> ListResult<Usuario> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.users_page_size, listing.max_page_size)?;
    let query = FilteredQuery::new(
        format!("SELECT {} FROM usuarios", USER_COLUMNS),
        "SELECT COUNT(*) AS count FROM usuarios",
    )
    .newest_first("data_criacao", "id_usuario")
    .paginate(pagination);

    let page = QueryBuilder::<Usuario>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("usuarios", page))
}

/// GET /api/usuarios/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> Result<Json<Usuario>, ApiError> {
    let id = parse_uuid(&id, "user")?;
    let sql = format!("SELECT {} FROM usuarios WHERE id_usuario = $1", USER_COLUMNS);
    let usuario = sqlx::query_as::<_, Usuario>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(usuario))
}

/// POST /api/usuarios - like registration, but any role may be assigned
pub async fn create(
    State(state): State<AppState>,
    admin: AuthUser,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Usuario> {
    let role = parse_role(req.nivel_permissao.as_deref())?.unwrap_or(Role::Leitor);
    let usuario = insert_user(&state, &req, role).await?;
    tracing::info!("User {} created as {} by {}", usuario.nome_de_usuario, role, admin.username);
    Ok(ApiResponse::created(usuario))
}

/// PUT /api/usuarios/:id - absent fields keep their stored value
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Usuario> {
    let id = parse_uuid(&id, "user")?;
    let role = parse_role(update.nivel_permissao.as_deref())?;
    let hash = optional_password_hash(&state, update.senha.as_deref())?;

    let sql = format!(
        "UPDATE usuarios SET nome_completo = COALESCE($1, nome_completo), \
         perfil_imagem = COALESCE($2, perfil_imagem), email = COALESCE($3, email), \
         senha = COALESCE($4, senha), nivel_permissao = COALESCE($5, nivel_permissao), \
         status_ativacao = COALESCE($6, status_ativacao), data_atualizacao = NOW() \
         WHERE id_usuario = $7 RETURNING {}",
        USER_COLUMNS
    );
    let usuario = sqlx::query_as::<_, Usuario>(&sql)
        .bind(update.nome_completo.as_deref())
        .bind(update.perfil_imagem.as_deref())
        .bind(non_empty(update.email.as_deref()))
        .bind(hash)
        .bind(role.map(|r| r.as_str()))
        .bind(update.status_ativacao)
        .bind(id)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::conflict("Email already registered"),
            _ => ApiError::from(e),
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // Deactivation or a role change invalidates any remembered session.
    if role.is_some() || update.status_ativacao == Some(false) {
        revoke_refresh(&state, id).await?;
    }
    Ok(ApiResponse::success(usuario))
}

/// DELETE /api/usuarios/:id
pub async fn delete(
    State(state): State<AppState>,
    admin: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<()> {
    let id = parse_uuid(&id, "user")?;
    if id == admin.id {
        return Err(ApiError::bad_request("Superusers cannot delete their own account"));
    }
    let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!("User {} deleted by {}", id, admin.username);
    Ok(ApiResponse::no_content())
}

async fn revoke_refresh(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    sqlx::query("UPDATE usuarios SET refresh_token = NULL WHERE id_usuario = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_are_validated() {
        assert_eq!(parse_role(None).unwrap(), None);
        assert_eq!(parse_role(Some("")).unwrap(), None);
        assert_eq!(
            parse_role(Some("gestor_conteudo")).unwrap(),
            Some(Role::GestorConteudo)
        );
        let err = parse_role(Some("admin")).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
