use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::cafes::{
        CafeList, CafeListingList, CafeSearchQuery, CafeStatus, CafeStatusQuery, CreateCafeRequest,
        UpdateCafeRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::CafeDetail,
    response::ApiResponse,
    services::cafe_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cafes).post(create_cafe))
        .route("/search", get(search_cafes))
        .route("/{id}", get(get_cafe).put(update_cafe).delete(delete_cafe))
        .route("/{id}/status", get(cafe_status))
}

#[utoipa::path(
    get,
    path = "/api/cafes",
    responses(
        (status = 200, description = "All cafes for the map", body = ApiResponse<CafeList>)
    ),
    tag = "Cafes"
)]
pub async fn list_cafes(State(state): State<AppState>) -> AppResult<Json<ApiResponse<CafeList>>> {
    let resp = cafe_service::list_cafes(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cafes/search",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("facilityIds" = Option<String>, Query, description = "Comma separated facility ids, all required"),
        ("lat" = Option<f64>, Query, description = "Viewer latitude"),
        ("lng" = Option<f64>, Query, description = "Viewer longitude"),
    ),
    responses(
        (status = 200, description = "Filtered cafes, nearest first when located", body = ApiResponse<CafeListingList>)
    ),
    tag = "Cafes"
)]
pub async fn search_cafes(
    State(state): State<AppState>,
    Query(query): Query<CafeSearchQuery>,
) -> AppResult<Json<ApiResponse<CafeListingList>>> {
    let resp = cafe_service::search_cafes(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cafes/{id}",
    params(
        ("id" = Uuid, Path, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Cafe with opening hours", body = ApiResponse<CafeDetail>),
        (status = 404, description = "Cafe not found"),
    ),
    tag = "Cafes"
)]
pub async fn get_cafe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CafeDetail>>> {
    let resp = cafe_service::get_cafe(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cafes/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Cafe ID"),
        ("at" = Option<String>, Query, description = "Local time YYYY-MM-DDTHH:MM, defaults to now"),
        ("lang" = Option<String>, Query, description = "Label language: en or id"),
    ),
    responses(
        (status = 200, description = "Open/closed status and weekly hours", body = ApiResponse<CafeStatus>),
        (status = 400, description = "Malformed time"),
        (status = 404, description = "Cafe not found"),
    ),
    tag = "Cafes"
)]
pub async fn cafe_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CafeStatusQuery>,
) -> AppResult<Json<ApiResponse<CafeStatus>>> {
    let resp = cafe_service::cafe_status(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cafes",
    request_body = CreateCafeRequest,
    responses(
        (status = 201, description = "Create cafe", body = ApiResponse<CafeDetail>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Slug taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cafes"
)]
pub async fn create_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCafeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CafeDetail>>)> {
    let resp = cafe_service::create_cafe(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/cafes/{id}",
    params(
        ("id" = Uuid, Path, description = "Cafe ID")
    ),
    request_body = UpdateCafeRequest,
    responses(
        (status = 200, description = "Updated cafe", body = ApiResponse<CafeDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Cafe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cafes"
)]
pub async fn update_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCafeRequest>,
) -> AppResult<Json<ApiResponse<CafeDetail>>> {
    let resp = cafe_service::update_cafe(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cafes/{id}",
    params(
        ("id" = Uuid, Path, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Deleted cafe"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Cafe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cafes"
)]
pub async fn delete_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cafe_service::delete_cafe(&state, &user, id).await?;
    Ok(Json(resp))
}
