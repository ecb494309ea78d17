// handlers/protected/auth.rs - session and profile endpoints for the caller

use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::auth::{hash_password, MIN_PASSWORD_LENGTH};
use crate::database::models::{ProfileUpdate, UserSummary, Usuario, USER_COLUMNS};
use crate::error::ApiError;
use crate::filter::non_empty;
use crate::middleware::{ApiJson, AuthUser};
use crate::state::AppState;

/// GET /api/auth/me
pub async fn me(user: AuthUser) -> Json<UserSummary> {
    Json(UserSummary {
        id_usuario: user.id.to_string(),
        nome_de_usuario: user.username,
        email: user.email,
        nivel_permissao: user.role,
        perfil_imagem: user.profile_image,
    })
}

/// POST /api/auth/logout - expire cookies and forget the refresh digest
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    sqlx::query("UPDATE usuarios SET refresh_token = NULL WHERE id_usuario = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    let jar = state
        .cookies()
        .removals()
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie));

    tracing::info!("User {} logged out", user.username);
    Ok((jar, Json(json!({ "message": "Logged out" }))))
}

/// GET /api/auth/profile
pub async fn profile_get(State(state): State<AppState>, user: AuthUser) -> Result<Json<Usuario>, ApiError> {
    let sql = format!("SELECT {} FROM usuarios WHERE id_usuario = $1", USER_COLUMNS);
    let usuario = sqlx::query_as::<_, Usuario>(&sql)
        .bind(user.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(usuario))
}

/// PUT /api/auth/profile - only the whitelisted fields; a new password is hashed
pub async fn profile_put(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<Usuario>, ApiError> {
    let hash = optional_password_hash(&state, update.senha.as_deref())?;

    let sql = format!(
        "UPDATE usuarios SET nome_completo = COALESCE($1, nome_completo), \
         perfil_imagem = COALESCE($2, perfil_imagem), email = COALESCE($3, email), \
         senha = COALESCE($4, senha), data_atualizacao = NOW() \
         WHERE id_usuario = $5 RETURNING {}",
        USER_COLUMNS
    );
    let usuario = sqlx::query_as::<_, Usuario>(&sql)
        .bind(update.nome_completo.as_deref())
        .bind(update.perfil_imagem.as_deref())
        .bind(non_empty(update.email.as_deref()))
        .bind(hash)
        .bind(user.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(usuario))
}

pub(crate) fn optional_password_hash(state: &AppState, password: Option<&str>) -> Result<Option<String>, ApiError> {
    match password.filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => Err(ApiError::bad_request(format!(
            "senha must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))),
        Some(p) => Ok(Some(hash_password(p, state.config.security.bcrypt_cost)?)),
    }
}
