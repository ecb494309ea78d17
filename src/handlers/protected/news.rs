// handlers/protected/news.rs - news management for content managers

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::database::models::{Noticia, NoticiaFilters, NoticiaInput, NOTICIA_COLUMNS};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{PageParams, Pagination, Predicate};
use crate::handlers::protected::publications::slug_for;
use crate::handlers::public::news::{news_query, read_and_count_view};
use crate::handlers::utils::{make_identifier, parse_uuid};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser, ListResponse, ListResult};
use crate::state::AppState;

/// GET /api/noticias/usuario
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<NoticiaFilters>,
) -> ListResult<Noticia> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.news_page_size, listing.max_page_size)?;
    let query = news_query(&filters)?
        .filter(Predicate::eq("id_usuario", user.id))
        .newest_first("data_publicacao", "id_noticia")
        .paginate(pagination);

    let page = QueryBuilder::<Noticia>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("noticias", page))
}

/// GET /api/noticias/usuario/:identifier/:slug
pub async fn get_mine_by_slug(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((identifier, slug)): ApiPath<(String, String)>,
) -> Result<Json<Noticia>, ApiError> {
    let noticia = read_and_count_view(&state, &identifier, &slug, Some(user.id)).await?;
    Ok(Json(noticia))
}

/// POST /api/noticias
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NoticiaInput>,
) -> ApiResult<Noticia> {
    let slug = slug_for(&input.titulo)?;

    let sql = format!(
        "INSERT INTO noticias (id_noticia, titulo, subtitulo, autores, nome_de_usuario, imagem_noticia, lead, \
         categoria, tags, data_publicacao, data_revisao, nome_revisor, slug, identifier, status, visualizacoes, \
         conteudo, created_at, updated_at, visibilidade, id_usuario) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), $10, $11, $12, $13, $14, 0, $15, NOW(), NOW(), $16, $17) \
         RETURNING {}",
        NOTICIA_COLUMNS
    );
    let noticia = sqlx::query_as::<_, Noticia>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.titulo.trim())
        .bind(input.subtitulo.as_deref())
        .bind(input.autores.as_slice())
        .bind(user.username.as_str())
        .bind(input.imagem_noticia.as_deref())
        .bind(input.lead.as_deref())
        .bind(input.categoria.as_deref())
        .bind(input.tags.as_slice())
        .bind(input.data_revisao)
        .bind(input.nome_revisor.as_deref())
        .bind(slug)
        .bind(make_identifier())
        .bind(input.status.as_deref())
        .bind(input.conteudo.as_deref())
        .bind(input.visibilidade)
        .bind(user.id)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!("News '{}' created by {}", noticia.titulo, user.username);
    Ok(ApiResponse::created(noticia))
}

/// PUT /api/noticias/:id - owner only
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<NoticiaInput>,
) -> ApiResult<Noticia> {
    let id = parse_uuid(&id, "news")?;
    let slug = slug_for(&input.titulo)?;

    let sql = format!(
        "UPDATE noticias SET titulo = $1, subtitulo = $2, autores = $3, imagem_noticia = $4, lead = $5, \
         categoria = $6, tags = $7, data_revisao = $8, nome_revisor = $9, slug = $10, status = $11, \
         conteudo = $12, visibilidade = $13, updated_at = NOW() \
         WHERE id_noticia = $14 AND id_usuario = $15 RETURNING {}",
        NOTICIA_COLUMNS
    );
    let noticia = sqlx::query_as::<_, Noticia>(&sql)
        .bind(input.titulo.trim())
        .bind(input.subtitulo.as_deref())
        .bind(input.autores.as_slice())
        .bind(input.imagem_noticia.as_deref())
        .bind(input.lead.as_deref())
        .bind(input.categoria.as_deref())
        .bind(input.tags.as_slice())
        .bind(input.data_revisao)
        .bind(input.nome_revisor.as_deref())
        .bind(slug)
        .bind(input.status.as_deref())
        .bind(input.conteudo.as_deref())
        .bind(input.visibilidade)
        .bind(id)
        .bind(user.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("News article not found"))?;

    Ok(ApiResponse::success(noticia))
}

/// DELETE /api/noticias/:id - owner only
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<()> {
    let id = parse_uuid(&id, "news")?;
    let result = sqlx::query("DELETE FROM noticias WHERE id_noticia = $1 AND id_usuario = $2")
        .bind(id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("News article not found"));
    }
    Ok(ApiResponse::no_content())
}
