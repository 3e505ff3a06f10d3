use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CafeSummary;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub cafe_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteCafeList {
    pub items: Vec<CafeSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteState {
    pub cafe_id: Uuid,
    pub is_favorite: bool,
    pub favorite_ids: Vec<Uuid>,
}
