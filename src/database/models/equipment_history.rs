use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgArguments, query::Query, FromRow, Postgres};
use uuid::Uuid;

use crate::database::repository::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceRecord {
    #[serde(default)]
    #[sqlx(rename = "maintenanceid")]
    pub maintenance_id: Uuid,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    #[sqlx(rename = "maintenancedate")]
    pub maintenance_date: DateTime<Utc>,
    #[sqlx(rename = "performedby")]
    pub performed_by: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl Resource for MaintenanceRecord {
    type Id = Uuid;
    const TABLE: &'static str = "maintenancehistory";
    const ID_COLUMN: &'static str = "maintenanceid";
    const COLUMNS: &'static [&'static str] =
        &["equipmentid", "maintenancedate", "performedby", "description", "notes"];
    const SELECT_LIST: &'static str = "maintenanceid, equipmentid, maintenancedate, performedby, description, notes";
    const ORDER_COLUMN: &'static str = "maintenancedate";
    const PLURAL: &'static str = "maintenancehistory";
    const LABEL: &'static str = "Maintenance record";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.maintenance_date)
            .bind(self.performed_by.as_deref())
            .bind(self.description.as_deref())
            .bind(self.notes.as_deref())
    }
}

/// Where an instrument was installed and for how long. `location` is WKT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LocationRecord {
    #[serde(default)]
    #[sqlx(rename = "locationhistoryid")]
    pub location_history_id: Uuid,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    pub location: Option<String>,
    #[sqlx(rename = "startdate")]
    pub start_date: DateTime<Utc>,
    #[sqlx(rename = "enddate")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Resource for LocationRecord {
    type Id = Uuid;
    const TABLE: &'static str = "locationhistory";
    const ID_COLUMN: &'static str = "locationhistoryid";
    const COLUMNS: &'static [&'static str] = &["equipmentid", "location", "startdate", "enddate", "notes"];
    const SELECT_LIST: &'static str =
        "locationhistoryid, equipmentid, ST_AsText(location) AS location, startdate, enddate, notes";
    const ORDER_COLUMN: &'static str = "startdate";
    const PLURAL: &'static str = "locationhistory";
    const LABEL: &'static str = "Location record";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.location.as_deref())
            .bind(self.start_date)
            .bind(self.end_date)
            .bind(self.notes.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EquipmentDocument {
    #[serde(default)]
    #[sqlx(rename = "documentid")]
    pub document_id: Uuid,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    #[sqlx(rename = "documentname")]
    pub document_name: String,
    #[sqlx(rename = "documenttype")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[sqlx(rename = "documentlink")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_link: Option<String>,
    #[sqlx(rename = "uploadedby")]
    pub uploaded_by: Option<String>,
    #[sqlx(rename = "uploaddate")]
    pub upload_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Resource for EquipmentDocument {
    type Id = Uuid;
    const TABLE: &'static str = "equipmentdocuments";
    const ID_COLUMN: &'static str = "documentid";
    const COLUMNS: &'static [&'static str] = &[
        "equipmentid",
        "documentname",
        "documenttype",
        "path",
        "documentlink",
        "uploadedby",
        "uploaddate",
        "notes",
    ];
    const SELECT_LIST: &'static str = "documentid, equipmentid, documentname, documenttype, path, documentlink, \
         uploadedby, uploaddate, notes";
    const ORDER_COLUMN: &'static str = "uploaddate";
    const PLURAL: &'static str = "equipmentdocuments";
    const LABEL: &'static str = "Equipment document";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.document_name.as_str())
            .bind(self.document_type.as_deref())
            .bind(self.path.as_deref())
            .bind(self.document_link.as_deref())
            .bind(self.uploaded_by.as_deref())
            .bind(self.upload_date)
            .bind(self.notes.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::Repository;

    #[test]
    fn location_is_written_as_geography() {
        let insert = Repository::<LocationRecord>::insert_sql();
        assert!(insert.contains("VALUES ($1, ST_GeogFromText($2), $3, $4, $5)"));
        assert!(insert.contains("RETURNING locationhistoryid, equipmentid, ST_AsText(location) AS location"));

        let update = Repository::<LocationRecord>::update_sql();
        assert!(update.contains("location = ST_GeogFromText($2)"));
        assert!(update.contains("WHERE locationhistoryid = $6"));
    }

    #[test]
    fn maintenance_id_is_optional_in_json() {
        let record: MaintenanceRecord = serde_json::from_value(serde_json::json!({
            "equipment_id": "7f1b7a1e-8b0e-4a55-9a39-111111111111",
            "maintenance_date": "2024-03-01T12:00:00Z",
            "performed_by": "Equipe técnica",
            "description": "Troca do anemômetro",
            "notes": null
        }))
        .unwrap();
        assert!(record.maintenance_id.is_nil());
    }
}
