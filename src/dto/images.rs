use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CafeImage;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCafeImageRequest {
    pub cafe_id: Uuid,
    pub image_url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageIdQuery {
    pub image_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetMainImageRequest {
    pub cafe_id: Uuid,
    pub image_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeImageList {
    pub items: Vec<CafeImage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}
