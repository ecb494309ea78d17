// handlers/protected/readings.rs - CRUD shared by every instrument series
//
// One set of handlers is instantiated per table through the `Resource` trait,
// e.g. `readings::list::<SodarReading>`.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::{Repository, Resource};
use crate::error::ApiError;
use crate::filter::{non_empty, PageParams, Pagination};
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, ListResponse, ListResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReadingFilters {
    pub equipment_id: Option<String>,
}

impl ReadingFilters {
    fn equipment_id(&self) -> Result<Option<Uuid>, ApiError> {
        non_empty(self.equipment_id.as_deref())
            .map(|raw| parse_uuid(raw, "equipment"))
            .transpose()
    }
}

fn parse_id<T: Resource>(raw: &str) -> Result<T::Id, ApiError> {
    Repository::<T>::parse_id(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid {} id: '{}'", T::LABEL, raw)))
}

/// GET /api/<series>
pub async fn list<T: Resource>(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<ReadingFilters>,
) -> ListResult<T> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.readings_page_size, listing.max_page_size)?;
    let page = Repository::<T>::new(state.pool.clone())
        .list(filters.equipment_id()?, pagination)
        .await?;
    Ok(ListResponse::new(T::PLURAL, page))
}

/// GET /api/<series>/:id
pub async fn get<T: Resource>(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> Result<Json<T>, ApiError> {
    let id = parse_id::<T>(&id)?;
    let record = Repository::<T>::new(state.pool.clone()).select_404(id).await?;
    Ok(Json(record))
}

/// POST /api/<series>
pub async fn create<T: Resource>(State(state): State<AppState>, ApiJson(record): ApiJson<T>) -> ApiResult<T> {
    let created = Repository::<T>::new(state.pool.clone()).create(&record).await?;
    tracing::debug!("{} created in {}", T::LABEL, T::TABLE);
    Ok(ApiResponse::created(created))
}

/// PUT /api/<series>/:id
pub async fn update<T: Resource>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(record): ApiJson<T>,
) -> ApiResult<T> {
    let id = parse_id::<T>(&id)?;
    let updated = Repository::<T>::new(state.pool.clone()).update_404(id, &record).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/<series>/:id
pub async fn delete<T: Resource>(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<()> {
    let id = parse_id::<T>(&id)?;
    Repository::<T>::new(state.pool.clone()).delete_404(id).await?;
    Ok(ApiResponse::no_content())
}
