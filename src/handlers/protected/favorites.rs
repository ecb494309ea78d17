// handlers/protected/favorites.rs - the caller's favorite publications

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::database::models::{Favorito, FavoritoDetalhado, FavoritoInput, FAVORITO_DETALHADO_SELECT};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{FilteredQuery, PageParams, Pagination, Predicate};
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser, ListResponse, ListResult};
use crate::state::AppState;

/// GET /api/favoritos
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ListResult<FavoritoDetalhado> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.favorites_page_size, listing.max_page_size)?;
    let query = FilteredQuery::new(
        FAVORITO_DETALHADO_SELECT,
        "SELECT COUNT(*) AS count FROM favoritos f JOIN publicacoes p ON p.id_publicacao = f.id_publicacao",
    )
    .filter(Predicate::eq("f.id_usuario", user.id))
    .newest_first("f.data_favorito", "f.id_favoritos")
    .paginate(pagination);

    let page = QueryBuilder::<FavoritoDetalhado>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("favoritos", page))
}

/// GET /api/favoritos/:identifier/:slug - 404 unless the caller favorited it
pub async fn get_by_slug(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((identifier, slug)): ApiPath<(String, String)>,
) -> Result<Json<FavoritoDetalhado>, ApiError> {
    let sql = format!(
        "{} WHERE f.id_usuario = $1 AND p.identifier = $2 AND p.slug = $3",
        FAVORITO_DETALHADO_SELECT
    );
    let favorito = sqlx::query_as::<_, FavoritoDetalhado>(&sql)
        .bind(user.id)
        .bind(identifier)
        .bind(slug)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Favorite not found"))?;
    Ok(Json(favorito))
}

/// POST /api/favoritos
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<FavoritoInput>,
) -> ApiResult<Favorito> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publicacoes WHERE id_publicacao = $1)")
        .bind(input.id_publicacao)
        .fetch_one(&state.pool)
        .await?;
    if !exists {
        return Err(ApiError::not_found("Publication not found"));
    }

    let favorito = sqlx::query_as::<_, Favorito>(
        "INSERT INTO favoritos (id_favoritos, id_usuario, id_publicacao, data_favorito) \
         VALUES ($1, $2, $3, NOW()) \
         ON CONFLICT (id_usuario, id_publicacao) DO NOTHING \
         RETURNING id_favoritos, id_usuario, id_publicacao, data_favorito",
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(input.id_publicacao)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::conflict("Publication already in favorites"))?;

    Ok(ApiResponse::created(favorito))
}

/// DELETE /api/favoritos/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<()> {
    let id = parse_uuid(&id, "favorite")?;
    let result = sqlx::query("DELETE FROM favoritos WHERE id_favoritos = $1 AND id_usuario = $2")
        .bind(id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Favorite not found"));
    }
    Ok(ApiResponse::no_content())
}
