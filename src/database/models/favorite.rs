use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Favorito {
    pub id_favoritos: Uuid,
    pub id_usuario: Uuid,
    pub id_publicacao: Uuid,
    pub data_favorito: DateTime<Utc>,
}

/// A favorite joined with enough of its publication to link to it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FavoritoDetalhado {
    pub id_favoritos: Uuid,
    pub id_usuario: Uuid,
    pub id_publicacao: Uuid,
    pub data_favorito: DateTime<Utc>,
    pub titulo: String,
    pub slug: String,
    pub identifier: String,
}

pub const FAVORITO_DETALHADO_SELECT: &str = "SELECT f.id_favoritos, f.id_usuario, f.id_publicacao, f.data_favorito, \
     p.titulo, p.slug, p.identifier FROM favoritos f JOIN publicacoes p ON p.id_publicacao = f.id_publicacao";

#[derive(Debug, Deserialize)]
pub struct FavoritoInput {
    pub id_publicacao: Uuid,
}
