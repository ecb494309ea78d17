use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const NOTIFICACAO_COLUMNS: &str =
    "n.id_notificacao, n.titulo, n.mensagem, n.data_envio, n.id_noticia, n.tipo, n.id_usuario, n.enviado_para_todos";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notificacao {
    pub id_notificacao: Uuid,
    pub titulo: String,
    pub mensagem: String,
    pub data_envio: DateTime<Utc>,
    pub id_noticia: Option<Uuid>,
    pub tipo: String,
    pub id_usuario: Option<Uuid>,
    pub enviado_para_todos: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificacaoInput {
    pub titulo: String,
    pub mensagem: String,
    pub id_noticia: Option<Uuid>,
    pub tipo: String,
    pub id_usuario: Option<Uuid>,
    #[serde(default)]
    pub enviado_para_todos: bool,
}
