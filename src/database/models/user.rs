use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{AccessClaims, Role, TokenSubject, UnknownRole};

/// Projection for every user read. The password hash and refresh digest are
/// selected so login and refresh can check them, and never serialized.
pub const USER_COLUMNS: &str = "id_usuario, nome_de_usuario, senha, email, nivel_permissao, nome_completo, \
     perfil_imagem, refresh_token, ultimo_login, ip_ultimo_login, status_ativacao, termos_de_uso, \
     email_verificado, data_criacao, data_atualizacao";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Usuario {
    pub id_usuario: Uuid,
    pub nome_de_usuario: String,
    #[serde(skip_serializing)]
    pub senha: String,
    pub email: String,
    pub nivel_permissao: String,
    pub nome_completo: Option<String>,
    pub perfil_imagem: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub ultimo_login: Option<DateTime<Utc>>,
    pub ip_ultimo_login: Option<String>,
    pub status_ativacao: bool,
    pub termos_de_uso: bool,
    pub email_verificado: bool,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

impl Usuario {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        self.nivel_permissao.parse()
    }

    pub fn token_subject(&self) -> Result<TokenSubject, UnknownRole> {
        Ok(TokenSubject {
            id: self.id_usuario.to_string(),
            role: self.role()?,
            username: self.nome_de_usuario.clone(),
            email: self.email.clone(),
            profile_image: self.perfil_imagem.clone(),
        })
    }
}

/// The user view returned by login, `/me` and token validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id_usuario: String,
    pub nome_de_usuario: String,
    pub email: String,
    pub nivel_permissao: Role,
    pub perfil_imagem: Option<String>,
}

impl From<&AccessClaims> for UserSummary {
    fn from(claims: &AccessClaims) -> Self {
        Self {
            id_usuario: claims.id_usuario.clone(),
            nome_de_usuario: claims.nome_de_usuario.clone(),
            email: claims.email.clone(),
            nivel_permissao: claims.nivel_permissao,
            perfil_imagem: Some(claims.perfil_imagem.clone()).filter(|p| !p.is_empty()),
        }
    }
}

impl From<&TokenSubject> for UserSummary {
    fn from(subject: &TokenSubject) -> Self {
        Self {
            id_usuario: subject.id.clone(),
            nome_de_usuario: subject.username.clone(),
            email: subject.email.clone(),
            nivel_permissao: subject.role,
            perfil_imagem: subject.profile_image.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub nome_de_usuario: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nome_completo: Option<String>,
    #[serde(default)]
    pub termos_de_uso: bool,
    /// Only honored on the superuser create route.
    pub nivel_permissao: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub nome_de_usuario: Option<String>,
    pub email: Option<String>,
    pub senha: String,
    #[serde(default)]
    pub manter_conectado: bool,
}

/// Whitelisted self-service profile fields.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub nome_completo: Option<String>,
    pub perfil_imagem: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
}

/// Superuser edit: profile fields plus role.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub nome_completo: Option<String>,
    pub perfil_imagem: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nivel_permissao: Option<String>,
    pub status_ativacao: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Usuario {
        Usuario {
            id_usuario: Uuid::nil(),
            nome_de_usuario: "ana".into(),
            senha: "$2b$04$hash".into(),
            email: "ana@example.org".into(),
            nivel_permissao: "gestor_conteudo".into(),
            nome_completo: None,
            perfil_imagem: None,
            refresh_token: Some("digest".into()),
            ultimo_login: None,
            ip_ultimo_login: None,
            status_ativacao: true,
            termos_de_uso: true,
            email_verificado: false,
            data_criacao: Utc::now(),
            data_atualizacao: Utc::now(),
        }
    }

    #[test]
    fn secrets_are_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("senha").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["nome_de_usuario"], "ana");
    }

    #[test]
    fn stored_role_is_parsed() {
        assert_eq!(sample().role().unwrap(), Role::GestorConteudo);
        let mut bad = sample();
        bad.nivel_permissao = "admin".into();
        assert!(bad.token_subject().is_err());
    }

    #[test]
    fn login_accepts_camel_case() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"nomeDeUsuario":"ana","senha":"x","manterConectado":true}"#).unwrap();
        assert_eq!(req.nome_de_usuario.as_deref(), Some("ana"));
        assert!(req.manter_conectado);
    }
}
