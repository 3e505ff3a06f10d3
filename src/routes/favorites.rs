use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::favorites::{AddFavoriteRequest, FavoriteCafeList, FavoriteState},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::favorite_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites).post(add_favorite))
        .route("/{cafe_id}", delete(remove_favorite))
        .route("/{cafe_id}/toggle", post(toggle_favorite))
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    responses(
        (status = 200, description = "Favorite cafes in the order they were added", body = ApiResponse<FavoriteCafeList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FavoriteCafeList>>> {
    let resp = favorite_service::list_favorites(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/favorites",
    request_body = AddFavoriteRequest,
    responses(
        (status = 200, description = "Added to favorites", body = ApiResponse<FavoriteState>),
        (status = 400, description = "Cafe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddFavoriteRequest>,
) -> AppResult<Json<ApiResponse<FavoriteState>>> {
    let resp = favorite_service::add_favorite(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/{cafe_id}",
    params(
        ("cafe_id" = Uuid, Path, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Removed from favorites", body = ApiResponse<FavoriteState>),
        (status = 404, description = "Favorite not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cafe_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FavoriteState>>> {
    let resp = favorite_service::remove_favorite(&state, &user, cafe_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/favorites/{cafe_id}/toggle",
    params(
        ("cafe_id" = Uuid, Path, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Favorite flipped", body = ApiResponse<FavoriteState>),
        (status = 400, description = "Cafe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cafe_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FavoriteState>>> {
    let resp = favorite_service::toggle_favorite(&state, &user, cafe_id).await?;
    Ok(Json(resp))
}
