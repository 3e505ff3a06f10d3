use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CafeIdQuery, CreateFacilityRequest, FacilityDetail, FacilityList,
        ReplaceCafeFacilitiesRequest, UpdateFacilityRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Facility,
    response::ApiResponse,
    services::facility_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_facilities).post(create_facility))
        .route(
            "/{id}",
            get(get_facility).put(update_facility).delete(delete_facility),
        )
}

/// `/api/cafe-facilities`
pub fn cafe_router() -> Router<AppState> {
    Router::new().route("/", get(list_cafe_facilities).post(replace_cafe_facilities))
}

#[utoipa::path(
    get,
    path = "/api/facilities",
    responses(
        (status = 200, description = "Facilities by label", body = ApiResponse<FacilityList>)
    ),
    tag = "Facilities"
)]
pub async fn list_facilities(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<FacilityList>>> {
    let resp = facility_service::list_facilities(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/facilities/{id}",
    params(
        ("id" = Uuid, Path, description = "Facility ID")
    ),
    responses(
        (status = 200, description = "Facility with the cafes offering it", body = ApiResponse<FacilityDetail>),
        (status = 404, description = "Facility not found"),
    ),
    tag = "Facilities"
)]
pub async fn get_facility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FacilityDetail>>> {
    let resp = facility_service::get_facility(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/facilities",
    request_body = CreateFacilityRequest,
    responses(
        (status = 201, description = "Create facility", body = ApiResponse<Facility>),
        (status = 400, description = "Missing code or label"),
        (status = 409, description = "Code already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
pub async fn create_facility(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFacilityRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Facility>>)> {
    let resp = facility_service::create_facility(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/facilities/{id}",
    params(
        ("id" = Uuid, Path, description = "Facility ID")
    ),
    request_body = UpdateFacilityRequest,
    responses(
        (status = 200, description = "Updated facility", body = ApiResponse<Facility>),
        (status = 404, description = "Facility not found"),
        (status = 409, description = "Code already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
pub async fn update_facility(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFacilityRequest>,
) -> AppResult<Json<ApiResponse<Facility>>> {
    let resp = facility_service::update_facility(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/facilities/{id}",
    params(
        ("id" = Uuid, Path, description = "Facility ID")
    ),
    responses(
        (status = 200, description = "Deleted facility"),
        (status = 404, description = "Facility not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
pub async fn delete_facility(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = facility_service::delete_facility(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cafe-facilities",
    params(
        ("cafeId" = Uuid, Query, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Facilities of a cafe", body = ApiResponse<FacilityList>)
    ),
    tag = "Facilities"
)]
pub async fn list_cafe_facilities(
    State(state): State<AppState>,
    Query(query): Query<CafeIdQuery>,
) -> AppResult<Json<ApiResponse<FacilityList>>> {
    let resp = facility_service::list_cafe_facilities(&state, query.cafe_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cafe-facilities",
    request_body = ReplaceCafeFacilitiesRequest,
    responses(
        (status = 200, description = "Facility set replaced", body = ApiResponse<FacilityList>),
        (status = 400, description = "Unknown facility id"),
        (status = 404, description = "Cafe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Facilities"
)]
pub async fn replace_cafe_facilities(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReplaceCafeFacilitiesRequest>,
) -> AppResult<Json<ApiResponse<FacilityList>>> {
    let resp = facility_service::replace_cafe_facilities(&state, &user, payload).await?;
    Ok(Json(resp))
}
