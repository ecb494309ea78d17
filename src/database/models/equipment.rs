use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `operatingstatus` value marking a soft-deleted instrument.
pub const DELETED_STATUS: &str = "Deleted";

pub const EQUIPMENT_COLUMNS: &str = "equipmentid, equipmentname, description, equipmenttype, serialnumber, model, \
     manufacturer, frequency, calibrationdate, lastmaintenancedate, maintainedby, manufacturingdate, \
     acquisitiondate, datatypes, notes, warrantyexpirationdate, operatingstatus, ST_AsText(location) AS location, \
     equipment_image";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Equipment {
    #[sqlx(rename = "equipmentid")]
    pub id: Uuid,
    #[sqlx(rename = "equipmentname")]
    pub equipment_name: String,
    pub description: Option<String>,
    #[sqlx(rename = "equipmenttype")]
    #[serde(rename = "type")]
    pub equipment_type: Option<String>,
    #[sqlx(rename = "serialnumber")]
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub frequency: Option<f64>,
    #[sqlx(rename = "calibrationdate")]
    pub calibration_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "lastmaintenancedate")]
    pub last_maintenance_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "maintainedby")]
    pub maintained_by: Option<String>,
    #[sqlx(rename = "manufacturingdate")]
    pub manufacturing_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "acquisitiondate")]
    pub acquisition_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "datatypes")]
    pub data_types: Option<String>,
    pub notes: Option<String>,
    #[sqlx(rename = "warrantyexpirationdate")]
    pub warranty_expiration_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "operatingstatus")]
    pub operating_status: Option<String>,
    pub location: Option<String>,
    pub equipment_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EquipmentDetail {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub campaign_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EquipmentInput {
    pub equipment_name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub equipment_type: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub frequency: Option<f64>,
    pub calibration_date: Option<DateTime<Utc>>,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub maintained_by: Option<String>,
    pub manufacturing_date: Option<DateTime<Utc>>,
    pub acquisition_date: Option<DateTime<Utc>>,
    pub data_types: Option<String>,
    pub notes: Option<String>,
    pub warranty_expiration_date: Option<DateTime<Utc>>,
    pub operating_status: Option<String>,
    pub location: Option<String>,
    pub equipment_image: Option<String>,
    #[serde(default)]
    pub campaign_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EquipmentFilters {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
    pub equipmenttype: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_uses_type_key() {
        let input: EquipmentInput = serde_json::from_value(serde_json::json!({
            "equipment_name": "ZephIR 300",
            "type": "LIDAR",
            "frequency": 1.0,
            "campaign_ids": []
        }))
        .unwrap();
        assert_eq!(input.equipment_type.as_deref(), Some("LIDAR"));
        assert!(input.campaign_ids.is_empty());
    }
}
