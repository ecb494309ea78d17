use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const CAMPAIGN_STATUSES: [&str; 4] = ["Planned", "Ongoing", "Completed", "Cancelled"];

pub const CAMPAIGN_COLUMNS: &str = "campaignid, campaignname, startdate, enddate, teamname, \
     ST_AsText(location) AS location, equipmentused, objectives, contactperson, status, notes, description, \
     campaign_image";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Campaign {
    #[sqlx(rename = "campaignid")]
    pub id: Uuid,
    #[sqlx(rename = "campaignname")]
    pub name: String,
    #[sqlx(rename = "startdate")]
    pub start_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "enddate")]
    pub end_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "teamname")]
    pub team_name: Option<String>,
    /// WKT, e.g. `POINT(-38.5 -3.7)`.
    pub location: Option<String>,
    #[sqlx(rename = "equipmentused")]
    pub equipment_used: Option<String>,
    pub objectives: Option<String>,
    #[sqlx(rename = "contactperson")]
    pub contact_person: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub campaign_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub equipment_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignInput {
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub team_name: Option<String>,
    pub location: Option<String>,
    pub equipment_used: Option<String>,
    pub objectives: Option<String>,
    pub contact_person: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub campaign_image: Option<String>,
    #[serde(default)]
    pub equipment_ids: Vec<Uuid>,
}

impl CampaignInput {
    pub fn has_valid_status(&self) -> bool {
        CAMPAIGN_STATUSES.contains(&self.status.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CampaignFilters {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
    pub status: Option<String>,
}
