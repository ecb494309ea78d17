// handlers/protected/campaigns.rs - field campaigns and their equipment links

use axum::{extract::State, Json};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::models::{Campaign, CampaignDetail, CampaignFilters, CampaignInput, CAMPAIGN_COLUMNS};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{non_empty, FilteredQuery, PageParams, Pagination, Predicate};
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, ListResponse, ListResult};
use crate::state::AppState;

pub(crate) fn campaign_query(filters: &CampaignFilters) -> FilteredQuery {
    FilteredQuery::new(
        format!("SELECT {} FROM campaigns", CAMPAIGN_COLUMNS),
        "SELECT COUNT(*) AS count FROM campaigns",
    )
    .filter_opt(non_empty(filters.search_term.as_deref()).map(|v| Predicate::ilike("campaignname", v)))
    .filter_opt(non_empty(filters.status.as_deref()).map(|v| Predicate::eq("status", v)))
}

/// GET /api/campaigns
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<CampaignFilters>,
) -> ListResult<Campaign> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.campaigns_page_size, listing.max_page_size)?;
    let query = campaign_query(&filters)
        .newest_first("startdate", "campaignid")
        .paginate(pagination);

    let page = QueryBuilder::<Campaign>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("campaigns", page))
}

/// GET /api/campaigns/:id - includes the linked equipment ids
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> Result<Json<CampaignDetail>, ApiError> {
    let id = parse_uuid(&id, "campaign")?;
    let campaign = fetch_campaign(&state.pool, id).await?;
    let equipment_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT equipmentid FROM campaignequipment WHERE campaignid = $1 ORDER BY equipmentid")
            .bind(id)
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(CampaignDetail {
        campaign,
        equipment_ids,
    }))
}

/// POST /api/campaigns
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CampaignInput>) -> ApiResult<CampaignDetail> {
    validate(&input)?;

    let mut tx = state.pool.begin().await?;
    let sql = format!(
        "INSERT INTO campaigns (campaignid, campaignname, startdate, enddate, teamname, location, equipmentused, \
         objectives, contactperson, status, notes, description, campaign_image) \
         VALUES ($1, $2, $3, $4, $5, ST_GeogFromText($6), $7, $8, $9, $10, $11, $12, $13) RETURNING {}",
        CAMPAIGN_COLUMNS
    );
    let campaign = bind_input(sqlx::query_as::<_, Campaign>(&sql).bind(Uuid::new_v4()), &input)
        .fetch_one(&mut *tx)
        .await?;

    link_equipment(&mut tx, campaign.id, &input.equipment_ids).await?;
    tx.commit().await?;

    tracing::info!("Campaign '{}' created", campaign.name);
    Ok(ApiResponse::created(CampaignDetail {
        campaign,
        equipment_ids: input.equipment_ids,
    }))
}

/// PUT /api/campaigns/:id - replaces the equipment links
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<CampaignInput>,
) -> ApiResult<CampaignDetail> {
    let id = parse_uuid(&id, "campaign")?;
    validate(&input)?;

    let mut tx = state.pool.begin().await?;
    let sql = format!(
        "UPDATE campaigns SET campaignname = $2, startdate = $3, enddate = $4, teamname = $5, \
         location = ST_GeogFromText($6), equipmentused = $7, objectives = $8, contactperson = $9, status = $10, \
         notes = $11, description = $12, campaign_image = $13 WHERE campaignid = $1 RETURNING {}",
        CAMPAIGN_COLUMNS
    );
    let campaign = bind_input(sqlx::query_as::<_, Campaign>(&sql).bind(id), &input)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))?;

    sqlx::query("DELETE FROM campaignequipment WHERE campaignid = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    link_equipment(&mut tx, id, &input.equipment_ids).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(CampaignDetail {
        campaign,
        equipment_ids: input.equipment_ids,
    }))
}

/// DELETE /api/campaigns/:id - join rows first, then the campaign
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<serde_json::Value> {
    let id = parse_uuid(&id, "campaign")?;

    let mut tx = state.pool.begin().await?;
    sqlx::query("DELETE FROM campaignequipment WHERE campaignid = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM campaigns WHERE campaignid = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Campaign not found"));
    }
    tx.commit().await?;

    Ok(ApiResponse::message("Campaign deleted", json!({ "id": id })))
}

fn validate(input: &CampaignInput) -> Result<(), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if !input.has_valid_status() {
        return Err(ApiError::bad_request(format!("Invalid status value: '{}'", input.status)));
    }
    Ok(())
}

/// Binds `$2..$13` in column order.
fn bind_input<'q>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, Campaign, sqlx::postgres::PgArguments>,
    input: &'q CampaignInput,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Campaign, sqlx::postgres::PgArguments> {
    q.bind(input.name.trim())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.team_name.as_deref())
        .bind(non_empty(input.location.as_deref()))
        .bind(input.equipment_used.as_deref())
        .bind(input.objectives.as_deref())
        .bind(input.contact_person.as_deref())
        .bind(input.status.as_str())
        .bind(input.notes.as_deref())
        .bind(input.description.as_deref())
        .bind(input.campaign_image.as_deref())
}

async fn fetch_campaign(pool: &PgPool, id: Uuid) -> Result<Campaign, ApiError> {
    let sql = format!("SELECT {} FROM campaigns WHERE campaignid = $1", CAMPAIGN_COLUMNS);
    sqlx::query_as::<_, Campaign>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))
}

/// Every id must exist; an unknown one aborts the surrounding transaction.
async fn link_equipment(conn: &mut PgConnection, campaign_id: Uuid, equipment_ids: &[Uuid]) -> Result<(), ApiError> {
    for equipment_id in equipment_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipments WHERE equipmentid = $1)")
            .bind(equipment_id)
            .fetch_one(&mut *conn)
            .await?;
        if !exists {
            return Err(ApiError::bad_request(format!("Equipment ID does not exist: {}", equipment_id)));
        }
        sqlx::query("INSERT INTO campaignequipment (campaignid, equipmentid) VALUES ($1, $2)")
            .bind(campaign_id)
            .bind(equipment_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
