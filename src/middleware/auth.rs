use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::{AccessClaims, Role, TokenService, ACCESS_COOKIE};
use crate::error::ApiError;

/// Authenticated user context extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_image: Option<String>,
}

impl AuthUser {
    pub fn from_claims(claims: &AccessClaims) -> Result<Self, ApiError> {
        let id = Uuid::parse_str(&claims.id_usuario).map_err(|_| ApiError::unauthorized("Invalid user id in token"))?;
        Ok(Self {
            id,
            username: claims.nome_de_usuario.clone(),
            email: claims.email.clone(),
            role: claims.nivel_permissao,
            profile_image: Some(claims.perfil_imagem.clone()).filter(|p| !p.is_empty()),
        })
    }

    pub fn is_at_least(&self, role: Role) -> bool {
        self.role.satisfies(role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Middleware state: the token verifier plus the minimum role for the route.
#[derive(Clone)]
pub struct RoleGuard {
    pub tokens: Arc<TokenService>,
    pub required: Role,
}

impl RoleGuard {
    pub fn new(tokens: Arc<TokenService>, required: Role) -> Self {
        Self { tokens, required }
    }

    /// Steps 1-4 of the guard, without touching the request.
    pub fn authorize(&self, token: Option<&str>) -> Result<AuthUser, ApiError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Token not found"))?;

        let claims = self.tokens.verify_access(token).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            ApiError::from(e)
        })?;

        let user = AuthUser::from_claims(&claims)?;
        if !user.is_at_least(self.required) {
            tracing::warn!(
                "User {} with role {} denied, requires {}",
                user.username,
                user.role,
                self.required
            );
            return Err(ApiError::forbidden(format!(
                "Insufficient permissions: requires {}",
                self.required
            )));
        }
        Ok(user)
    }
}

/// Verifies the `token` cookie against the route's minimum role and injects
/// [`AuthUser`] for handlers.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = guard.authorize(jar.get(ACCESS_COOKIE).map(|c| c.value()))?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSubject;
    use chrono::Duration;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("guard-secret", Duration::hours(4), Duration::days(30)))
    }

    fn token_for(tokens: &TokenService, role: Role) -> String {
        tokens
            .issue_access(&TokenSubject {
                id: Uuid::new_v4().to_string(),
                role,
                username: "bia".into(),
                email: "bia@example.org".into(),
                profile_image: None,
            })
            .unwrap()
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let guard = RoleGuard::new(tokens(), Role::Leitor);
        assert!(matches!(guard.authorize(None), Err(ApiError::Unauthorized(_))));
        assert!(matches!(guard.authorize(Some("")), Err(ApiError::Unauthorized(_))));
        assert!(matches!(guard.authorize(Some("garbage")), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn lower_roles_are_forbidden_for_every_pair() {
        let tokens = tokens();
        for held in Role::ALL {
            let token = token_for(&tokens, held);
            for required in Role::ALL {
                let result = RoleGuard::new(tokens.clone(), required).authorize(Some(&token));
                if held.rank() < required.rank() {
                    assert!(matches!(result, Err(ApiError::Forbidden(_))), "{} vs {}", held, required);
                } else {
                    assert_eq!(result.unwrap().role, held);
                }
            }
        }
    }

    #[test]
    fn non_uuid_subject_is_unauthorized() {
        let tokens = tokens();
        let token = tokens
            .issue_access(&TokenSubject {
                id: "not-a-uuid".into(),
                role: Role::Superusuario,
                username: "x".into(),
                email: "x@example.org".into(),
                profile_image: None,
            })
            .unwrap();
        let result = RoleGuard::new(tokens, Role::Leitor).authorize(Some(&token));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
