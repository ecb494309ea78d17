// handlers/public/news.rs - public news listing and reading

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::database::models::{Noticia, NoticiaFilters, NOTICIA_COLUMNS};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{non_empty, FilterError, FilteredQuery, PageParams, Pagination, Predicate};
use crate::handlers::utils::{parse_uuid, parse_year};
use crate::middleware::{ApiPath, ApiQuery, ListResponse, ListResult};
use crate::state::AppState;

pub(crate) fn news_query(filters: &NoticiaFilters) -> Result<FilteredQuery, FilterError> {
    let from = parse_year(filters.ano_inicio.as_deref(), "ano_inicio")?;
    let to = parse_year(filters.ano_fim.as_deref(), "ano_fim")?;

    Ok(FilteredQuery::new(
        format!("SELECT {} FROM noticias", NOTICIA_COLUMNS),
        "SELECT COUNT(*) AS count FROM noticias",
    )
    .filter_opt(
        non_empty(filters.search_term.as_deref()).map(|v| Predicate::ilike_any_of(&["titulo", "categoria"], v)),
    )
    .filter_opt(non_empty(filters.categoria.as_deref()).map(|v| Predicate::ilike("categoria", v)))
    .filter_opt(non_empty(filters.tags.as_deref()).map(|v| Predicate::array_ilike("tags", v)))
    .filter_opt(non_empty(filters.autores.as_deref()).map(|v| Predicate::array_ilike("autores", v)))
    .filter_opt(Predicate::year_range("data_publicacao", from, to)))
}

/// GET /api/noticias
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<NoticiaFilters>,
) -> ListResult<Noticia> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.news_page_size, listing.max_page_size)?;
    let query = news_query(&filters)?
        .newest_first("data_publicacao", "id_noticia")
        .paginate(pagination);

    let page = QueryBuilder::<Noticia>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("noticias", page))
}

/// GET /api/noticias/:identifier/:slug
pub async fn get_by_slug(
    State(state): State<AppState>,
    ApiPath((identifier, slug)): ApiPath<(String, String)>,
) -> Result<Json<Noticia>, ApiError> {
    let noticia = read_and_count_view(&state, &identifier, &slug, None).await?;
    Ok(Json(noticia))
}

/// GET /api/noticias/:id - plain lookup, no view counting
pub async fn get_by_id(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> Result<Json<Noticia>, ApiError> {
    let id = parse_uuid(&id, "news")?;
    let sql = format!("SELECT {} FROM noticias WHERE id_noticia = $1", NOTICIA_COLUMNS);
    let noticia = sqlx::query_as::<_, Noticia>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("News article not found"))?;
    Ok(Json(noticia))
}

pub(crate) async fn read_and_count_view(
    state: &AppState,
    identifier: &str,
    slug: &str,
    owner: Option<Uuid>,
) -> Result<Noticia, ApiError> {
    let mut tx = state.pool.begin().await?;

    let id: Uuid = sqlx::query_scalar(
        "SELECT id_noticia FROM noticias WHERE identifier = $1 AND slug = $2 \
         AND ($3::uuid IS NULL OR id_usuario = $3) FOR UPDATE",
    )
    .bind(identifier)
    .bind(slug)
    .bind(owner)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("News article not found"))?;

    let sql = format!(
        "UPDATE noticias SET visualizacoes = visualizacoes + 1 WHERE id_noticia = $1 RETURNING {}",
        NOTICIA_COLUMNS
    );
    let noticia = sqlx::query_as::<_, Noticia>(&sql).bind(id).fetch_one(&mut *tx).await?;

    tx.commit().await?;
    Ok(noticia)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_year_window_number_sequentially() {
        let filters = NoticiaFilters {
            search_term: Some("chuva".into()),
            categoria: None,
            tags: Some("clima".into()),
            autores: None,
            ano_inicio: Some("2020".into()),
            ano_fim: Some("2023".into()),
        };
        let built = news_query(&filters)
            .unwrap()
            .newest_first("data_publicacao", "id_noticia")
            .paginate(Pagination::new(1, 8).unwrap())
            .build()
            .unwrap();

        assert!(built
            .count
            .query
            .contains("(titulo ILIKE '%' || $1 || '%' OR categoria ILIKE '%' || $1 || '%')"));
        assert!(built.count.query.contains("unnest(tags) AS item WHERE item ILIKE '%' || $2 || '%'"));
        assert!(built.count.query.ends_with("EXTRACT(YEAR FROM data_publicacao) BETWEEN $3 AND $4"));
        assert_eq!(built.count.params.len(), 4);
        assert!(built.select.query.ends_with("LIMIT $5 OFFSET $6"));
    }

    #[test]
    fn bad_year_is_rejected() {
        let filters = NoticiaFilters {
            ano_fim: Some("dois mil".into()),
            ..Default::default()
        };
        assert!(matches!(news_query(&filters), Err(FilterError::InvalidValue(_))));
    }
}
