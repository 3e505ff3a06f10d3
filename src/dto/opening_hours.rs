use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::OpeningHour, opening_hours::DayOfWeek};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpeningHourRequest {
    pub cafe_id: Uuid,
    pub day_of_week: DayOfWeek,
    /// `HH:MM`; may be omitted for closed or 24-hour days.
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub is_open_24_hours: bool,
    #[serde(default)]
    pub is_everyday_open: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpeningHourRequest {
    pub id: Uuid,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub is_open_24_hours: bool,
    #[serde(default)]
    pub is_everyday_open: bool,
}

/// Template copied onto every day of the week.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EverydayHoursRequest {
    pub cafe_id: Uuid,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub is_open_24_hours: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OpeningHourList {
    pub items: Vec<OpeningHour>,
}
