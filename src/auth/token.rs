use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::role::Role;
use crate::config::SecurityConfig;

const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Claims carried by the access credential (`token` cookie).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub id_usuario: String,
    pub nivel_permissao: Role,
    pub nome_de_usuario: String,
    pub email: String,
    #[serde(default)]
    pub perfil_imagem: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the long-lived `refresh_token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub id_usuario: String,
    pub typ: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// The user fields that go into an access token.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub id: String,
    pub role: Role,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Signs and verifies HS256 credentials with a secret supplied at construction.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.jwt_secret,
            Duration::hours(security.access_token_hours),
            Duration::days(security.refresh_token_days),
        )
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            id_usuario: subject.id.clone(),
            nivel_permissao: subject.role,
            nome_de_usuario: subject.username.clone(),
            email: subject.email.clone(),
            perfil_imagem: subject.profile_image.clone().unwrap_or_default(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn issue_refresh(&self, user_id: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            id_usuario: user_id.to_string(),
            typ: REFRESH_TOKEN_TYPE.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Verify signature and expiry and decode the typed claims. A missing or
    /// unknown role claim fails here.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let data = decode::<RefreshClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        if data.claims.typ != REFRESH_TOKEN_TYPE {
            return Err(TokenError::Invalid("not a refresh token".to_string()));
        }
        Ok(data.claims)
    }

    pub(crate) fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

/// Hex SHA-256 of a refresh token; only the digest is stored.
pub fn refresh_digest(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::hours(4), Duration::days(30))
    }

    fn subject(role: Role) -> TokenSubject {
        TokenSubject {
            id: "0b7c9f7e-3c4f-4a8e-9d55-2f1c1a0e9a01".to_string(),
            role,
            username: "ana".to_string(),
            email: "ana@example.org".to_string(),
            profile_image: None,
        }
    }

    #[test]
    fn access_round_trip() {
        let svc = service();
        let token = svc.issue_access(&subject(Role::Colaborador)).unwrap();
        let claims = svc.verify_access(&token).unwrap();
        assert_eq!(claims.nivel_permissao, Role::Colaborador);
        assert_eq!(claims.nome_de_usuario, "ana");
        assert_eq!(claims.exp - claims.iat, 4 * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service().issue_access(&subject(Role::Leitor)).unwrap();
        let other = TokenService::new("other-secret", Duration::hours(4), Duration::days(30));
        assert!(matches!(other.verify_access(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let token = svc
            .sign(&json!({
                "idUsuario": "u1",
                "nivelPermissao": "leitor",
                "nomeDeUsuario": "ana",
                "email": "ana@example.org",
                "iat": now - 7200,
                "exp": now - 3600,
            }))
            .unwrap();
        assert!(matches!(svc.verify_access(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn unknown_or_missing_role_is_invalid() {
        let svc = service();
        let exp = Utc::now().timestamp() + 3600;
        let unknown = svc
            .sign(&json!({"idUsuario": "u1", "nivelPermissao": "admin", "nomeDeUsuario": "a", "email": "e", "iat": 0, "exp": exp}))
            .unwrap();
        assert!(matches!(svc.verify_access(&unknown), Err(TokenError::Invalid(_))));

        let missing = svc
            .sign(&json!({"idUsuario": "u1", "nomeDeUsuario": "a", "email": "e", "iat": 0, "exp": exp}))
            .unwrap();
        assert!(matches!(svc.verify_access(&missing), Err(TokenError::Invalid(_))));

        let wrong_type = svc
            .sign(&json!({"idUsuario": "u1", "nivelPermissao": 6, "nomeDeUsuario": "a", "email": "e", "iat": 0, "exp": exp}))
            .unwrap();
        assert!(matches!(svc.verify_access(&wrong_type), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn refresh_and_access_tokens_are_not_interchangeable() {
        let svc = service();
        let refresh = svc.issue_refresh("u1").unwrap();
        assert!(svc.verify_access(&refresh).is_err());
        assert_eq!(svc.verify_refresh(&refresh).unwrap().id_usuario, "u1");

        let access = svc.issue_access(&subject(Role::Leitor)).unwrap();
        assert!(svc.verify_refresh(&access).is_err());
    }

    #[test]
    fn digest_is_stable_hex() {
        let d = refresh_digest("abc");
        assert_eq!(d, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }
}
