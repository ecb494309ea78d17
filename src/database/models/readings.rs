//! Instrument time series. Each table is keyed by a serial integer and
//! references the instrument through `equipmentid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgArguments, query::Query, FromRow, Postgres};
use uuid::Uuid;

use crate::database::repository::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LidarZephirReading {
    #[serde(default)]
    pub id: i32,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[sqlx(rename = "windspeed")]
    pub wind_speed: Option<f64>,
    #[sqlx(rename = "winddirection")]
    pub wind_direction: Option<f64>,
    pub temperature: Option<f64>,
}

impl Resource for LidarZephirReading {
    type Id = i32;
    const TABLE: &'static str = "lidarzephydata";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["equipmentid", "timestamp", "windspeed", "winddirection", "temperature"];
    const SELECT_LIST: &'static str = "id, equipmentid, timestamp, windspeed, winddirection, temperature";
    const ORDER_COLUMN: &'static str = "timestamp";
    const PLURAL: &'static str = "lidarzephydata";
    const LABEL: &'static str = "LIDAR ZephIR reading";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.timestamp)
            .bind(self.wind_speed)
            .bind(self.wind_direction)
            .bind(self.temperature)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LidarWindCubeReading {
    #[serde(default)]
    pub id: i32,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[sqlx(rename = "windspeed")]
    pub wind_speed: Option<f64>,
    #[sqlx(rename = "winddirection")]
    pub wind_direction: Option<f64>,
    pub pressure: Option<f64>,
}

impl Resource for LidarWindCubeReading {
    type Id = i32;
    const TABLE: &'static str = "lidarwindcobedata";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["equipmentid", "timestamp", "windspeed", "winddirection", "pressure"];
    const SELECT_LIST: &'static str = "id, equipmentid, timestamp, windspeed, winddirection, pressure";
    const ORDER_COLUMN: &'static str = "timestamp";
    const PLURAL: &'static str = "lidarwindcobedata";
    const LABEL: &'static str = "LIDAR WindCube reading";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.timestamp)
            .bind(self.wind_speed)
            .bind(self.wind_direction)
            .bind(self.pressure)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SodarReading {
    #[serde(default)]
    pub id: i32,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[sqlx(rename = "windspeed")]
    pub wind_speed: Option<f64>,
    #[sqlx(rename = "winddirection")]
    pub wind_direction: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl Resource for SodarReading {
    type Id = i32;
    const TABLE: &'static str = "sodardata";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] =
        &["equipmentid", "timestamp", "windspeed", "winddirection", "temperature", "humidity"];
    const SELECT_LIST: &'static str = "id, equipmentid, timestamp, windspeed, winddirection, temperature, humidity";
    const ORDER_COLUMN: &'static str = "timestamp";
    const PLURAL: &'static str = "sodardata";
    const LABEL: &'static str = "SODAR reading";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.timestamp)
            .bind(self.wind_speed)
            .bind(self.wind_direction)
            .bind(self.temperature)
            .bind(self.humidity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TowerReading {
    #[serde(default)]
    pub id: i32,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[sqlx(rename = "windspeed")]
    pub wind_speed: Option<f64>,
    #[sqlx(rename = "winddirection")]
    pub wind_direction: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[sqlx(rename = "solarradiation")]
    pub solar_radiation: Option<f64>,
    #[sqlx(rename = "barometricpressure")]
    pub barometric_pressure: Option<f64>,
}

impl Resource for TowerReading {
    type Id = i32;
    const TABLE: &'static str = "towermicrometeorologicaldata";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &[
        "equipmentid",
        "timestamp",
        "windspeed",
        "winddirection",
        "temperature",
        "humidity",
        "solarradiation",
        "barometricpressure",
    ];
    const SELECT_LIST: &'static str = "id, equipmentid, timestamp, windspeed, winddirection, temperature, humidity, \
         solarradiation, barometricpressure";
    const ORDER_COLUMN: &'static str = "timestamp";
    const PLURAL: &'static str = "towermicrometeorologicaldata";
    const LABEL: &'static str = "Tower reading";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.timestamp)
            .bind(self.wind_speed)
            .bind(self.wind_direction)
            .bind(self.temperature)
            .bind(self.humidity)
            .bind(self.solar_radiation)
            .bind(self.barometric_pressure)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdcpReading {
    #[serde(default)]
    pub id: i32,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[sqlx(rename = "watercurrentspeed")]
    pub water_current_speed: Option<f64>,
    #[sqlx(rename = "watercurrentdirection")]
    pub water_current_direction: Option<f64>,
    #[sqlx(rename = "watertemperature")]
    pub water_temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub depth: Option<f64>,
}

impl Resource for AdcpReading {
    type Id = i32;
    const TABLE: &'static str = "adcpdata";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &[
        "equipmentid",
        "timestamp",
        "watercurrentspeed",
        "watercurrentdirection",
        "watertemperature",
        "salinity",
        "depth",
    ];
    const SELECT_LIST: &'static str = "id, equipmentid, timestamp, watercurrentspeed, watercurrentdirection, \
         watertemperature, salinity, depth";
    const ORDER_COLUMN: &'static str = "timestamp";
    const PLURAL: &'static str = "adcpdata";
    const LABEL: &'static str = "ADCP reading";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.timestamp)
            .bind(self.water_current_speed)
            .bind(self.water_current_direction)
            .bind(self.water_temperature)
            .bind(self.salinity)
            .bind(self.depth)
    }
}

/// Datalogger record from a solarimetric station (Campbell-style channel names).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SolarimetricReading {
    #[serde(default, rename = "estacao_solarimetrica_dados_id")]
    pub id: i32,
    #[sqlx(rename = "equipmentid")]
    pub equipment_id: Uuid,
    #[sqlx(rename = "campaignid")]
    pub campaign_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "batt_v")]
    pub battv: Option<f64>,
    pub ptemp_c: Option<f64>,
    #[serde(rename = "wind_dir")]
    pub winddir: Option<f64>,
    pub ws_ms_avg: Option<f64>,
    pub ws_ms_max: Option<f64>,
    pub ws_ms_min: Option<f64>,
    pub airtc_avg: Option<f64>,
    pub airtc_max: Option<f64>,
    pub airtc_min: Option<f64>,
    pub rh_max: Option<f64>,
    pub rh_min: Option<f64>,
    pub rh: Option<f64>,
    pub rain_mm_tot: Option<f64>,
    pub bp_mbar_avg: Option<f64>,
    pub bp_mbar_max: Option<f64>,
    pub bp_mbar_min: Option<f64>,
    pub slrw_cmp10_horizontal_avg: Option<f64>,
    pub slrw_cmp10_horizontal_max: Option<f64>,
    pub slrw_cmp10_horizontal_min: Option<f64>,
    pub slrkj_cmp10_horizontal_tot: Option<f64>,
}

impl Resource for SolarimetricReading {
    type Id = i32;
    const TABLE: &'static str = "estacaosolarimetricadados";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &[
        "equipmentid",
        "campaignid",
        "timestamp",
        "battv",
        "ptemp_c",
        "winddir",
        "ws_ms_avg",
        "ws_ms_max",
        "ws_ms_min",
        "airtc_avg",
        "airtc_max",
        "airtc_min",
        "rh_max",
        "rh_min",
        "rh",
        "rain_mm_tot",
        "bp_mbar_avg",
        "bp_mbar_max",
        "bp_mbar_min",
        "slrw_cmp10_horizontal_avg",
        "slrw_cmp10_horizontal_max",
        "slrw_cmp10_horizontal_min",
        "slrkj_cmp10_horizontal_tot",
    ];
    const SELECT_LIST: &'static str = "id, equipmentid, campaignid, timestamp, battv, ptemp_c, winddir, \
         ws_ms_avg, ws_ms_max, ws_ms_min, airtc_avg, airtc_max, airtc_min, rh_max, rh_min, rh, rain_mm_tot, \
         bp_mbar_avg, bp_mbar_max, bp_mbar_min, slrw_cmp10_horizontal_avg, slrw_cmp10_horizontal_max, \
         slrw_cmp10_horizontal_min, slrkj_cmp10_horizontal_tot";
    const ORDER_COLUMN: &'static str = "timestamp";
    const PLURAL: &'static str = "estacao_solarimetrica";
    const LABEL: &'static str = "Solarimetric reading";

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        q.bind(self.equipment_id)
            .bind(self.campaign_id)
            .bind(self.timestamp)
            .bind(self.battv)
            .bind(self.ptemp_c)
            .bind(self.winddir)
            .bind(self.ws_ms_avg)
            .bind(self.ws_ms_max)
            .bind(self.ws_ms_min)
            .bind(self.airtc_avg)
            .bind(self.airtc_max)
            .bind(self.airtc_min)
            .bind(self.rh_max)
            .bind(self.rh_min)
            .bind(self.rh)
            .bind(self.rain_mm_tot)
            .bind(self.bp_mbar_avg)
            .bind(self.bp_mbar_max)
            .bind(self.bp_mbar_min)
            .bind(self.slrw_cmp10_horizontal_avg)
            .bind(self.slrw_cmp10_horizontal_max)
            .bind(self.slrw_cmp10_horizontal_min)
            .bind(self.slrkj_cmp10_horizontal_tot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::Repository;
    use crate::filter::Pagination;

    #[test]
    fn insert_binds_every_column() {
        let sql = Repository::<SodarReading>::insert_sql();
        assert_eq!(
            sql,
            "INSERT INTO sodardata (equipmentid, timestamp, windspeed, winddirection, temperature, humidity) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, equipmentid, timestamp, windspeed, winddirection, temperature, humidity"
        );
    }

    #[test]
    fn update_puts_key_last() {
        let sql = Repository::<AdcpReading>::update_sql();
        assert!(sql.starts_with("UPDATE adcpdata SET equipmentid = $1, timestamp = $2"));
        assert!(sql.contains("WHERE id = $8 RETURNING"));
    }

    #[test]
    fn solarimetric_columns_match_select_list() {
        let select_columns = SolarimetricReading::SELECT_LIST.split(',').count();
        assert_eq!(select_columns, SolarimetricReading::COLUMNS.len() + 1);
    }

    #[test]
    fn listing_filters_by_equipment() {
        let equipment = Uuid::new_v4();
        let built = Repository::<TowerReading>::list_query(Some(equipment), Pagination::new(1, 50).unwrap())
            .build()
            .unwrap();
        assert!(built.count.query.ends_with("WHERE equipmentid = $1"));
        assert!(built.select.query.contains("ORDER BY timestamp DESC, id DESC LIMIT $2 OFFSET $3"));
    }
}
