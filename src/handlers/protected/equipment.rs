// handlers/protected/equipment.rs - instrument inventory
//
// Equipment is never removed: DELETE marks it `Deleted` and closes its open
// campaign assignments, and listings skip deleted rows.

use axum::{extract::State, Json};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::models::{
    Equipment, EquipmentDetail, EquipmentFilters, EquipmentInput, DELETED_STATUS, EQUIPMENT_COLUMNS,
};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{non_empty, FilteredQuery, PageParams, Pagination, Predicate, SqlParam};
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, ListResponse, ListResult};
use crate::state::AppState;

pub(crate) fn equipment_query(filters: &EquipmentFilters) -> FilteredQuery {
    FilteredQuery::new(
        format!("SELECT {} FROM equipments", EQUIPMENT_COLUMNS),
        "SELECT COUNT(*) AS count FROM equipments",
    )
    .filter(Predicate::raw(
        "operatingstatus IS DISTINCT FROM {0}",
        vec![SqlParam::Text(DELETED_STATUS.to_string())],
    ))
    .filter_opt(
        non_empty(filters.search_term.as_deref())
            .map(|v| Predicate::ilike_any_of(&["equipmentname", "equipmenttype"], v)),
    )
    .filter_opt(non_empty(filters.equipmenttype.as_deref()).map(|v| Predicate::ilike("equipmenttype", v)))
}

/// GET /api/equipments
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageParams>,
    ApiQuery(filters): ApiQuery<EquipmentFilters>,
) -> ListResult<Equipment> {
    let listing = state.listing();
    let pagination = Pagination::from_params(&page, listing.equipment_page_size, listing.max_page_size)?;
    let query = equipment_query(&filters)
        .newest_first("acquisitiondate", "equipmentid")
        .paginate(pagination);

    let page = QueryBuilder::<Equipment>::new(query).fetch_page(&state.pool).await?;
    Ok(ListResponse::new("equipments", page))
}

/// GET /api/equipments/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> Result<Json<EquipmentDetail>, ApiError> {
    let id = parse_uuid(&id, "equipment")?;
    let equipment = fetch_equipment(&state.pool, id).await?;
    let campaign_ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT campaignid FROM campaignequipment WHERE equipmentid = $1 AND retrievaldate IS NULL ORDER BY campaignid",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(EquipmentDetail {
        equipment,
        campaign_ids,
    }))
}

/// POST /api/equipments
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<EquipmentInput>,
) -> ApiResult<EquipmentDetail> {
    validate(&input)?;

    let mut tx = state.pool.begin().await?;
    let sql = format!(
        "INSERT INTO equipments (equipmentid, equipmentname, description, equipmenttype, serialnumber, model, \
         manufacturer, frequency, calibrationdate, lastmaintenancedate, maintainedby, manufacturingdate, \
         acquisitiondate, datatypes, notes, warrantyexpirationdate, operatingstatus, location, equipment_image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
         ST_GeogFromText($18), $19) RETURNING {}",
        EQUIPMENT_COLUMNS
    );
    let equipment = bind_input(sqlx::query_as::<_, Equipment>(&sql).bind(Uuid::new_v4()), &input)
        .fetch_one(&mut *tx)
        .await?;

    link_campaigns(&mut tx, equipment.id, &input.campaign_ids).await?;
    tx.commit().await?;

    tracing::info!("Equipment '{}' registered", equipment.equipment_name);
    Ok(ApiResponse::created(EquipmentDetail {
        equipment,
        campaign_ids: input.campaign_ids,
    }))
}

/// PUT /api/equipments/:id - replaces the open campaign assignments
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<EquipmentInput>,
) -> ApiResult<EquipmentDetail> {
    let id = parse_uuid(&id, "equipment")?;
    validate(&input)?;

    let mut tx = state.pool.begin().await?;
    let sql = format!(
        "UPDATE equipments SET equipmentname = $2, description = $3, equipmenttype = $4, serialnumber = $5, \
         model = $6, manufacturer = $7, frequency = $8, calibrationdate = $9, lastmaintenancedate = $10, \
         maintainedby = $11, manufacturingdate = $12, acquisitiondate = $13, datatypes = $14, notes = $15, \
         warrantyexpirationdate = $16, operatingstatus = $17, location = ST_GeogFromText($18), \
         equipment_image = $19 \
         WHERE equipmentid = $1 AND operatingstatus IS DISTINCT FROM '{}' RETURNING {}",
        DELETED_STATUS, EQUIPMENT_COLUMNS
    );
    let equipment = bind_input(sqlx::query_as::<_, Equipment>(&sql).bind(id), &input)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Equipment not found"))?;

    sqlx::query("DELETE FROM campaignequipment WHERE equipmentid = $1 AND retrievaldate IS NULL")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    link_campaigns(&mut tx, id, &input.campaign_ids).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(EquipmentDetail {
        equipment,
        campaign_ids: input.campaign_ids,
    }))
}

/// DELETE /api/equipments/:id - soft delete
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<serde_json::Value> {
    let id = parse_uuid(&id, "equipment")?;

    let mut tx = state.pool.begin().await?;
    let result = sqlx::query(
        "UPDATE equipments SET operatingstatus = $2 WHERE equipmentid = $1 AND operatingstatus IS DISTINCT FROM $2",
    )
    .bind(id)
    .bind(DELETED_STATUS)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Equipment not found"));
    }
    let retrieved = sqlx::query(
        "UPDATE campaignequipment SET retrievaldate = NOW() WHERE equipmentid = $1 AND retrievaldate IS NULL",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    tx.commit().await?;

    tracing::info!("Equipment {} marked deleted, {} assignment(s) closed", id, retrieved);
    Ok(ApiResponse::message("Equipment deleted", json!({ "id": id })))
}

fn validate(input: &EquipmentInput) -> Result<(), ApiError> {
    if input.equipment_name.trim().is_empty() {
        return Err(ApiError::bad_request("equipment_name is required"));
    }
    if input.operating_status.as_deref() == Some(DELETED_STATUS) {
        return Err(ApiError::bad_request("Use DELETE to retire equipment"));
    }
    Ok(())
}

/// Binds `$2..$19` in column order.
fn bind_input<'q>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, Equipment, sqlx::postgres::PgArguments>,
    input: &'q EquipmentInput,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Equipment, sqlx::postgres::PgArguments> {
    q.bind(input.equipment_name.trim())
        .bind(input.description.as_deref())
        .bind(input.equipment_type.as_deref())
        .bind(input.serial_number.as_deref())
        .bind(input.model.as_deref())
        .bind(input.manufacturer.as_deref())
        .bind(input.frequency)
        .bind(input.calibration_date)
        .bind(input.last_maintenance_date)
        .bind(input.maintained_by.as_deref())
        .bind(input.manufacturing_date)
        .bind(input.acquisition_date)
        .bind(input.data_types.as_deref())
        .bind(input.notes.as_deref())
        .bind(input.warranty_expiration_date)
        .bind(input.operating_status.as_deref())
        .bind(non_empty(input.location.as_deref()))
        .bind(input.equipment_image.as_deref())
}

async fn fetch_equipment(pool: &PgPool, id: Uuid) -> Result<Equipment, ApiError> {
    let sql = format!(
        "SELECT {} FROM equipments WHERE equipmentid = $1 AND operatingstatus IS DISTINCT FROM $2",
        EQUIPMENT_COLUMNS
    );
    sqlx::query_as::<_, Equipment>(&sql)
        .bind(id)
        .bind(DELETED_STATUS)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Equipment not found"))
}

async fn link_campaigns(conn: &mut PgConnection, equipment_id: Uuid, campaign_ids: &[Uuid]) -> Result<(), ApiError> {
    for campaign_id in campaign_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM campaigns WHERE campaignid = $1)")
            .bind(campaign_id)
            .fetch_one(&mut *conn)
            .await?;
        if !exists {
            return Err(ApiError::bad_request(format!("Campaign ID does not exist: {}", campaign_id)));
        }
        sqlx::query("INSERT INTO campaignequipment (campaignid, equipmentid) VALUES ($1, $2)")
            .bind(campaign_id)
            .bind(equipment_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_rows_are_always_excluded() {
        let built = equipment_query(&EquipmentFilters::default()).build().unwrap();
        assert_eq!(
            built.count.query,
            "SELECT COUNT(*) AS count FROM equipments WHERE operatingstatus IS DISTINCT FROM $1"
        );
        assert_eq!(built.count.params, vec![SqlParam::Text("Deleted".into())]);
    }

    #[test]
    fn search_covers_name_and_type() {
        let filters = EquipmentFilters {
            search_term: Some("lidar".into()),
            equipmenttype: None,
        };
        let built = equipment_query(&filters).build().unwrap();
        assert!(built
            .select
            .query
            .ends_with("AND (equipmentname ILIKE '%' || $2 || '%' OR equipmenttype ILIKE '%' || $2 || '%')"));
    }
}
