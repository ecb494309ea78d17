use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const NOTICIA_COLUMNS: &str = "id_noticia, titulo, subtitulo, autores, nome_de_usuario, imagem_noticia, lead, \
     categoria, tags, data_publicacao, data_revisao, nome_revisor, slug, identifier, status, visualizacoes, \
     conteudo, created_at, updated_at, visibilidade, id_usuario";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Noticia {
    pub id_noticia: Uuid,
    pub titulo: String,
    pub subtitulo: Option<String>,
    pub autores: Option<Vec<String>>,
    pub nome_de_usuario: Option<String>,
    pub imagem_noticia: Option<String>,
    pub lead: Option<String>,
    pub categoria: Option<String>,
    pub tags: Option<Vec<String>>,
    pub data_publicacao: DateTime<Utc>,
    pub data_revisao: Option<DateTime<Utc>>,
    pub nome_revisor: Option<String>,
    pub slug: String,
    pub identifier: String,
    pub status: Option<String>,
    pub visualizacoes: i32,
    pub conteudo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub visibilidade: bool,
    pub id_usuario: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoticiaInput {
    pub titulo: String,
    pub subtitulo: Option<String>,
    #[serde(default)]
    pub autores: Vec<String>,
    pub imagem_noticia: Option<String>,
    pub lead: Option<String>,
    pub categoria: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub data_revisao: Option<DateTime<Utc>>,
    pub nome_revisor: Option<String>,
    pub status: Option<String>,
    pub conteudo: Option<String>,
    #[serde(default)]
    pub visibilidade: bool,
}

/// Year bounds stay strings so bad input becomes a 400 with a message.
#[derive(Debug, Default, Deserialize)]
pub struct NoticiaFilters {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
    pub categoria: Option<String>,
    pub tags: Option<String>,
    pub autores: Option<String>,
    pub ano_inicio: Option<String>,
    pub ano_fim: Option<String>,
}
