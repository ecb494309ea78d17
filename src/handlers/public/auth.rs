// handlers/public/auth.rs - token acquisition endpoints (no authentication)

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{
    generate_csrf_token, hash_password, refresh_digest, verify_login, Role, ACCESS_COOKIE, MIN_PASSWORD_LENGTH,
    REFRESH_COOKIE,
};
use crate::database::models::{LoginRequest, RegisterRequest, UserSummary, Usuario, USER_COLUMNS};
use crate::error::ApiError;
use crate::handlers::utils::{client_ip, required_field};
use crate::middleware::ApiJson;
use crate::state::AppState;

/// POST /api/auth/login - verify credentials and set the session cookies
///
/// A missing user and a wrong password produce the same 401 and no cookies.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let username = crate::filter::non_empty(req.nome_de_usuario.as_deref());
    let email = crate::filter::non_empty(req.email.as_deref());
    if username.is_none() && email.is_none() {
        return Err(ApiError::bad_request("nomeDeUsuario or email is required"));
    }

    let sql = format!(
        "SELECT {} FROM usuarios WHERE nome_de_usuario = $1 OR email = $2 LIMIT 1",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, Usuario>(&sql)
        .bind(username)
        .bind(email)
        .fetch_optional(&state.pool)
        .await?;

    let stored = user.as_ref().map(|u| u.senha.as_str());
    let verified = verify_login(&req.senha, stored, state.config.security.bcrypt_cost);
    let user = match user {
        Some(u) if verified => u,
        _ => {
            tracing::info!("Failed login for {}", username.or(email).unwrap_or_default());
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    if !user.status_ativacao {
        return Err(ApiError::forbidden("Account is deactivated"));
    }

    let subject = user.token_subject().map_err(|e| {
        tracing::error!("User {} has an invalid stored role: {}", user.id_usuario, e);
        ApiError::internal_server_error("User record is inconsistent")
    })?;

    let access = state.tokens.issue_access(&subject)?;
    let csrf = generate_csrf_token();
    let refresh = if req.manter_conectado {
        Some(state.tokens.issue_refresh(&subject.id)?)
    } else {
        None
    };

    sqlx::query(
        "UPDATE usuarios SET ultimo_login = NOW(), ip_ultimo_login = $1, \
         refresh_token = COALESCE($2, refresh_token) WHERE id_usuario = $3",
    )
    .bind(client_ip(&headers))
    .bind(refresh.as_deref().map(refresh_digest))
    .bind(user.id_usuario)
    .execute(&state.pool)
    .await?;

    let cookies = state.cookies();
    let mut jar = jar.add(cookies.access(access.clone())).add(cookies.csrf(csrf.clone()));
    if let Some(refresh) = refresh {
        jar = jar.add(cookies.refresh(refresh));
    }

    tracing::info!("User {} logged in", user.nome_de_usuario);

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "token": access,
            "csrfToken": csrf,
            "usuario": UserSummary::from(&subject),
        })),
    ))
}

/// POST /api/auth/register - create a `leitor` account
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = insert_user(&state, &req, Role::Leitor).await?;
    tracing::info!("Registered user {}", user.nome_de_usuario);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "usuario": user })),
    ))
}

/// POST /api/auth/refresh - trade a valid refresh cookie for a new access token
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Json<Value>), ApiError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Refresh token not found"))?;

    let claims = state.tokens.verify_refresh(&token)?;
    let user_id =
        Uuid::parse_str(&claims.id_usuario).map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let sql = format!("SELECT {} FROM usuarios WHERE id_usuario = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, Usuario>(&sql)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    if user.refresh_token.as_deref() != Some(refresh_digest(&token).as_str()) {
        tracing::warn!("Refresh token for {} does not match the stored digest", user.nome_de_usuario);
        return Err(ApiError::unauthorized("Invalid refresh token"));
    }

    let subject = user.token_subject().map_err(|e| {
        tracing::error!("User {} has an invalid stored role: {}", user.id_usuario, e);
        ApiError::internal_server_error("User record is inconsistent")
    })?;
    let access = state.tokens.issue_access(&subject)?;
    let csrf = generate_csrf_token();

    let cookies = state.cookies();
    let jar = jar.add(cookies.access(access)).add(cookies.csrf(csrf.clone()));
    Ok((jar, Json(json!({ "message": "Token refreshed", "csrfToken": csrf }))))
}

/// GET /api/auth/validate-token - check a bearer token (or the `token` cookie)
pub async fn validate_token(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);
    let token = bearer
        .or_else(|| jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| ApiError::unauthorized("Token not found"))?;

    let claims = state.tokens.verify_access(&token)?;
    Ok(Json(json!({ "valid": true, "usuario": UserSummary::from(&claims) })))
}

/// Shared by self-registration and the superuser create route.
pub(crate) async fn insert_user(state: &AppState, req: &RegisterRequest, role: Role) -> Result<Usuario, ApiError> {
    let username = required_field(req.nome_de_usuario.as_deref(), "nomeDeUsuario")?;
    let email = required_field(req.email.as_deref(), "email")?;
    let password = req.senha.as_deref().unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "senha must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let hash = hash_password(password, state.config.security.bcrypt_cost)?;

    let sql = format!(
        "INSERT INTO usuarios (id_usuario, nome_de_usuario, senha, email, nivel_permissao, nome_completo, \
         termos_de_uso, status_ativacao, email_verificado, data_criacao, data_atualizacao) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, true, false, NOW(), NOW()) RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, Usuario>(&sql)
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(hash)
        .bind(email)
        .bind(role.as_str())
        .bind(req.nome_completo.as_deref())
        .bind(req.termos_de_uso)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("Username or email already registered")
            }
            other => ApiError::from(other),
        })
}
