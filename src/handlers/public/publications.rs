// handlers/public/publications.rs - public publication listing and reading

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::database::models::{Publicacao, PublicacaoFilters, PUBLICACAO_COLUMNS};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{non_empty, FilteredQuery, PageParams, Pagination, Predicate};
use crate::middleware::{ApiPath, ApiQuery, ListResponse, ListResult};
use crate::state::AppState;

/// Base listing with the optional text and array filters applied.
pub(crate) fn publication_query(filters: &PublicacaoFilters) -> FilteredQuery {
    FilteredQuery::new(
        format!("SELECT {} FROM publicacoes", PUBLICACAO_COLUMNS),
        "SELECT COUNT(*) AS count FROM publicacoes",
    )
    .filter_opt(non_empty(filters.titulo.as_deref()).map(|v| Predicate::ilike("titulo", v)))
    .filter_opt(non_empty(filters.categoria.as_deref()).map(|v| Predicate::ilike("categoria", v)))
    .filter_opt(non_empty(filters.autores.as_deref()).map(|v| Predicate::array_contains("autores", v)))
    .filter_opt(non_empty(filters.palavras_chave.as_deref()).map(|v| Predicate::array_contains("palavras_chave", v)))
    .filter_opt(non_empty(filters.tags.as_deref()).map(|v| Predicate::array_contains("palavras_chave", v)))
}

/// GET /api/publicacoes - visible publications, newest first
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<PublicacaoFilters>,
) -> ListResult<Publicacao> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.publications_page_size, listing.max_page_size)?;
    let query = publication_query(&filters)
        .filter(Predicate::fixed("visibilidade = true"))
        .newest_first("data_criacao", "id_publicacao")
        .paginate(pagination);

    let page = QueryBuilder::<Publicacao>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("publicacoes", page))
}

/// GET /api/publicacoes/:identifier/:slug - read and count one view
pub async fn get_by_slug(
    State(state): State<AppState>,
    ApiPath((identifier, slug)): ApiPath<(String, String)>,
) -> Result<Json<Publicacao>, ApiError> {
    let publicacao = read_and_count_view(&state, &identifier, &slug, None).await?;
    Ok(Json(publicacao))
}

/// Locks the row, then increments `visualizacoes` and returns the updated
/// row in the same transaction. `owner` restricts the lookup to one user.
pub(crate) async fn read_and_count_view(
    state: &AppState,
    identifier: &str,
    slug: &str,
    owner: Option<Uuid>,
) -> Result<Publicacao, ApiError> {
    let mut tx = state.pool.begin().await?;

    let id: Uuid = sqlx::query_scalar(
        "SELECT id_publicacao FROM publicacoes WHERE identifier = $1 AND slug = $2 \
         AND ($3::uuid IS NULL OR id_usuario = $3) FOR UPDATE",
    )
    .bind(identifier)
    .bind(slug)
    .bind(owner)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("Publication not found"))?;

    let sql = format!(
        "UPDATE publicacoes SET visualizacoes = visualizacoes + 1 WHERE id_publicacao = $1 RETURNING {}",
        PUBLICACAO_COLUMNS
    );
    let publicacao = sqlx::query_as::<_, Publicacao>(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(publicacao)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_share_numbering_between_select_and_count() {
        let filters = PublicacaoFilters {
            titulo: Some("vento".into()),
            categoria: None,
            autores: Some("Silva".into()),
            palavras_chave: Some("  ".into()),
            tags: None,
        };
        let built = publication_query(&filters)
            .filter(Predicate::fixed("visibilidade = true"))
            .newest_first("data_criacao", "id_publicacao")
            .paginate(Pagination::new(2, 12).unwrap())
            .build()
            .unwrap();

        assert!(built.count.query.ends_with(
            "WHERE titulo ILIKE '%' || $1 || '%' AND $2 = ANY(autores) AND visibilidade = true"
        ));
        assert_eq!(built.count.params.len(), 2);
        assert!(built
            .select
            .query
            .ends_with("ORDER BY data_criacao DESC, id_publicacao DESC LIMIT $3 OFFSET $4"));
        assert_eq!(built.select.params.len(), 4);
    }

    #[test]
    fn keywords_and_tags_are_separate_filters() {
        let uri: axum::http::Uri = "/api/publicacoes?palavras_chave=lidar&tags=vento".parse().unwrap();
        let axum::extract::Query(filters) = axum::extract::Query::<PublicacaoFilters>::try_from_uri(&uri).unwrap();
        assert_eq!(filters.palavras_chave.as_deref(), Some("lidar"));
        assert_eq!(filters.tags.as_deref(), Some("vento"));

        let built = publication_query(&filters).build().unwrap();
        assert!(built
            .count
            .query
            .ends_with("WHERE $1 = ANY(palavras_chave) AND $2 = ANY(palavras_chave)"));
        assert_eq!(built.count.params.len(), 2);
    }
}
