use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const PUBLICACAO_COLUMNS: &str = "id_publicacao, titulo, subtitulo, palavras_chave, banner, resumo, \
     nome_de_usuario, categoria, autores, publicacoes, data_criacao, data_modificacao, link, visualizacoes, \
     revisado_por, slug, identifier, visibilidade, notas, id_usuario";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Publicacao {
    pub id_publicacao: Uuid,
    pub titulo: String,
    pub subtitulo: Option<String>,
    pub palavras_chave: Option<Vec<String>>,
    pub banner: Option<String>,
    pub resumo: Option<String>,
    pub nome_de_usuario: Option<String>,
    pub categoria: Option<String>,
    pub autores: Option<Vec<String>>,
    pub publicacoes: Option<String>,
    pub data_criacao: DateTime<Utc>,
    pub data_modificacao: DateTime<Utc>,
    pub link: Option<String>,
    pub visualizacoes: i32,
    pub revisado_por: Option<String>,
    pub slug: String,
    pub identifier: String,
    pub visibilidade: bool,
    pub notas: Option<String>,
    pub id_usuario: Uuid,
}

/// Client-writable fields. Slug, identifier, owner and timestamps are derived
/// server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicacaoInput {
    pub titulo: String,
    pub subtitulo: Option<String>,
    #[serde(default)]
    pub palavras_chave: Vec<String>,
    pub banner: Option<String>,
    pub resumo: Option<String>,
    pub categoria: Option<String>,
    #[serde(default)]
    pub autores: Vec<String>,
    pub publicacoes: Option<String>,
    pub link: Option<String>,
    pub revisado_por: Option<String>,
    #[serde(default)]
    pub visibilidade: bool,
    pub notas: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublicacaoFilters {
    pub titulo: Option<String>,
    pub categoria: Option<String>,
    pub autores: Option<String>,
    pub palavras_chave: Option<String>,
    /// Matched against `palavras_chave` like that filter, and combined with it.
    pub tags: Option<String>,
}
