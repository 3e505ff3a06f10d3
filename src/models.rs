use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    geo::Coordinates,
    opening_hours::{DayOfWeek, DaySchedule},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: Uuid,
    pub code: String,
    pub label: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeImage {
    pub id: Uuid,
    pub cafe_id: Uuid,
    pub image_url: String,
    pub alt: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHour {
    pub id: Uuid,
    pub cafe_id: Uuid,
    pub day_of_week: DayOfWeek,
    #[serde(with = "crate::opening_hours::wall_clock")]
    #[schema(value_type = String, example = "08:00")]
    pub open_time: NaiveTime,
    #[serde(with = "crate::opening_hours::wall_clock")]
    #[schema(value_type = String, example = "22:00")]
    pub close_time: NaiveTime,
    pub is_closed: bool,
    pub is_open_24_hours: bool,
    pub is_everyday_open: bool,
}

impl OpeningHour {
    pub fn schedule(&self) -> DaySchedule {
        DaySchedule {
            day: self.day_of_week,
            open_time: Some(self.open_time),
            close_time: Some(self.close_time),
            is_closed: self.is_closed,
            is_open_24_hours: self.is_open_24_hours,
        }
    }
}

/// Map-view shape of a cafe: everything except opening hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub parking: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_range: Option<String>,
    pub google_maps_url: Option<String>,
    pub instagram_url: Option<String>,
    pub instagram_username: Option<String>,
    pub main_image_id: Option<Uuid>,
    pub images: Vec<CafeImage>,
    pub payment_methods: Vec<PaymentMethod>,
    pub facilities: Vec<Facility>,
}

impl CafeSummary {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_optional(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeDetail {
    #[serde(flatten)]
    pub cafe: CafeSummary,
    pub opening_hours: Vec<OpeningHour>,
}

pub fn split_parking(parking: Option<&str>) -> Vec<&str> {
    parking
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Canonical `"Motor, Mobil"` form of the parking column; `None` when no
/// category is left.
pub fn normalize_parking(parking: Option<&str>) -> Option<String> {
    let parts = split_parking(parking);
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Lowercase, ASCII-alphanumeric words joined by dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Drops repeated ids, keeping first occurrences in order.
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parking_is_split_and_trimmed() {
        assert_eq!(split_parking(Some("Motor, Mobil")), vec!["Motor", "Mobil"]);
        assert_eq!(split_parking(Some("Motor,,  ")), vec!["Motor"]);
        assert!(split_parking(None).is_empty());
        assert_eq!(normalize_parking(Some(" Motor ,Mobil,")).as_deref(), Some("Motor, Mobil"));
        assert_eq!(normalize_parking(Some(" , ")), None);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Blanco Coffee & Books"), "blanco-coffee-books");
        assert_eq!(slugify("  Kopi  Klotok!! "), "kopi-klotok");
        assert_eq!(slugify("Café 123"), "caf-123");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(&[a, b, a, b]), vec![a, b]);
    }
}
