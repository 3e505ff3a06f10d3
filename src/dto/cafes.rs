use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    directory::CafeListing,
    models::CafeSummary,
    opening_hours::{DayOfWeek, Locale, StatusReason},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCafeRequest {
    pub name: String,
    pub slug: Option<String>,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_maps_url: Option<String>,
    pub instagram_url: Option<String>,
    pub instagram_username: Option<String>,
    pub parking: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_range: Option<String>,
    #[serde(default)]
    pub facility_ids: Vec<Uuid>,
    #[serde(default)]
    pub payment_method_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCafeRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_maps_url: Option<String>,
    pub instagram_url: Option<String>,
    pub instagram_username: Option<String>,
    pub parking: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_range: Option<String>,
    /// Replaces the facility set when present.
    pub facility_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeList {
    pub items: Vec<CafeSummary>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeSearchQuery {
    pub q: Option<String>,
    /// Comma separated facility ids; a cafe must offer all of them.
    pub facility_ids: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeListingList {
    pub items: Vec<CafeListing>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CafeStatusQuery {
    /// Viewer's local wall-clock time, e.g. `2026-10-19T21:30`.
    pub at: Option<String>,
    pub lang: Option<Locale>,
}

impl CafeStatusQuery {
    pub fn parse_at(&self) -> Option<NaiveDateTime> {
        let raw = self.at.as_deref()?.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub day_of_week: DayOfWeek,
    pub day_name: String,
    pub display: String,
    pub is_today: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeStatus {
    pub cafe_id: Uuid,
    pub is_open: bool,
    pub reason: StatusReason,
    pub label: String,
    pub today: DayOfWeek,
    pub checked_at: String,
    pub hours: Vec<DayHours>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_query_accepts_minutes_and_seconds() {
        let q = CafeStatusQuery {
            at: Some("2026-10-19T21:30".into()),
            lang: None,
        };
        assert_eq!(q.parse_at().unwrap().to_string(), "2026-10-19 21:30:00");

        let q = CafeStatusQuery {
            at: Some("2026-10-19T21:30:15".into()),
            lang: None,
        };
        assert!(q.parse_at().is_some());

        let q = CafeStatusQuery {
            at: Some("yesterday".into()),
            lang: None,
        };
        assert!(q.parse_at().is_none());
    }
}
