// handlers/protected/publications.rs - the caller's own publications

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::database::models::{Publicacao, PublicacaoFilters, PublicacaoInput, PUBLICACAO_COLUMNS};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{PageParams, Pagination, Predicate};
use crate::handlers::public::publications::{publication_query, read_and_count_view};
use crate::handlers::utils::{make_identifier, parse_uuid, slugify};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser, ListResponse, ListResult};
use crate::state::AppState;

/// GET /api/publicacoes/usuario
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<PublicacaoFilters>,
) -> ListResult<Publicacao> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.user_publications_page_size, listing.max_page_size)?;
    let query = publication_query(&filters)
        .filter(Predicate::eq("id_usuario", user.id))
        .newest_first("data_criacao", "id_publicacao")
        .paginate(pagination);

    let page = QueryBuilder::<Publicacao>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("publicacoes", page))
}

/// GET /api/publicacoes/usuario/:identifier/:slug
pub async fn get_mine_by_slug(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((identifier, slug)): ApiPath<(String, String)>,
) -> Result<Json<Publicacao>, ApiError> {
    let publicacao = read_and_count_view(&state, &identifier, &slug, Some(user.id)).await?;
    Ok(Json(publicacao))
}

/// POST /api/publicacoes
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<PublicacaoInput>,
) -> ApiResult<Publicacao> {
    let slug = slug_for(&input.titulo)?;

    let sql = format!(
        "INSERT INTO publicacoes (id_publicacao, titulo, subtitulo, palavras_chave, banner, resumo, nome_de_usuario, \
         categoria, autores, publicacoes, data_criacao, data_modificacao, link, visualizacoes, revisado_por, slug, \
         identifier, visibilidade, notas, id_usuario) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW(), $11, 0, $12, $13, $14, $15, $16, $17) \
         RETURNING {}",
        PUBLICACAO_COLUMNS
    );
    let publicacao = sqlx::query_as::<_, Publicacao>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.titulo.trim())
        .bind(input.subtitulo.as_deref())
        .bind(input.palavras_chave.as_slice())
        .bind(input.banner.as_deref())
        .bind(input.resumo.as_deref())
        .bind(user.username.as_str())
        .bind(input.categoria.as_deref())
        .bind(input.autores.as_slice())
        .bind(input.publicacoes.as_deref())
        .bind(input.link.as_deref())
        .bind(input.revisado_por.as_deref())
        .bind(slug)
        .bind(make_identifier())
        .bind(input.visibilidade)
        .bind(input.notas.as_deref())
        .bind(user.id)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!("Publication '{}' created by {}", publicacao.titulo, user.username);
    Ok(ApiResponse::created(publicacao))
}

/// PUT /api/publicacoes/:id - owner only; the slug follows the new title
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<PublicacaoInput>,
) -> ApiResult<Publicacao> {
    let id = parse_uuid(&id, "publication")?;
    let slug = slug_for(&input.titulo)?;

    let sql = format!(
        "UPDATE publicacoes SET titulo = $1, subtitulo = $2, palavras_chave = $3, banner = $4, resumo = $5, \
         categoria = $6, autores = $7, publicacoes = $8, link = $9, revisado_por = $10, slug = $11, \
         visibilidade = $12, notas = $13, data_modificacao = NOW() \
         WHERE id_publicacao = $14 AND id_usuario = $15 RETURNING {}",
        PUBLICACAO_COLUMNS
    );
    let publicacao = sqlx::query_as::<_, Publicacao>(&sql)
        .bind(input.titulo.trim())
        .bind(input.subtitulo.as_deref())
        .bind(input.palavras_chave.as_slice())
        .bind(input.banner.as_deref())
        .bind(input.resumo.as_deref())
        .bind(input.categoria.as_deref())
        .bind(input.autores.as_slice())
        .bind(input.publicacoes.as_deref())
        .bind(input.link.as_deref())
        .bind(input.revisado_por.as_deref())
        .bind(slug)
        .bind(input.visibilidade)
        .bind(input.notas.as_deref())
        .bind(id)
        .bind(user.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Publication not found"))?;

    Ok(ApiResponse::success(publicacao))
}

/// DELETE /api/publicacoes/:id - owner only
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<()> {
    let id = parse_uuid(&id, "publication")?;
    let result = sqlx::query("DELETE FROM publicacoes WHERE id_publicacao = $1 AND id_usuario = $2")
        .bind(id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Publication not found"));
    }
    Ok(ApiResponse::no_content())
}

/// Slug for a required title. Also used by news.
pub(crate) fn slug_for(titulo: &str) -> Result<String, ApiError> {
    if titulo.trim().is_empty() {
        return Err(ApiError::bad_request("titulo is required"));
    }
    let slug = slugify(titulo);
    if slug.is_empty() {
        return Err(ApiError::bad_request("titulo must contain letters or digits"));
    }
    Ok(slug)
}
