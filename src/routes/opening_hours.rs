use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        catalog::CafeIdQuery,
        opening_hours::{
            CreateOpeningHourRequest, EverydayHoursRequest, OpeningHourList,
            UpdateOpeningHourRequest,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::OpeningHour,
    response::ApiResponse,
    services::opening_hour_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_opening_hours)
                .post(create_opening_hour)
                .put(update_opening_hour),
        )
        .route("/everyday", post(apply_everyday))
}

#[utoipa::path(
    get,
    path = "/api/opening-hours",
    params(
        ("cafeId" = Uuid, Query, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Weekly hours, Monday first", body = ApiResponse<OpeningHourList>)
    ),
    tag = "Opening Hours"
)]
pub async fn list_opening_hours(
    State(state): State<AppState>,
    Query(query): Query<CafeIdQuery>,
) -> AppResult<Json<ApiResponse<OpeningHourList>>> {
    let resp = opening_hour_service::list_opening_hours(&state, query.cafe_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/opening-hours",
    request_body = CreateOpeningHourRequest,
    responses(
        (status = 201, description = "Create a day's hours", body = ApiResponse<OpeningHour>),
        (status = 400, description = "Malformed time"),
        (status = 404, description = "Cafe not found"),
        (status = 409, description = "Day already set"),
    ),
    security(("bearer_auth" = [])),
    tag = "Opening Hours"
)]
pub async fn create_opening_hour(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOpeningHourRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OpeningHour>>)> {
    let resp = opening_hour_service::create_opening_hour(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/opening-hours",
    request_body = UpdateOpeningHourRequest,
    responses(
        (status = 200, description = "Updated hours", body = ApiResponse<OpeningHour>),
        (status = 400, description = "Malformed time"),
        (status = 404, description = "Row not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Opening Hours"
)]
pub async fn update_opening_hour(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateOpeningHourRequest>,
) -> AppResult<Json<ApiResponse<OpeningHour>>> {
    let resp = opening_hour_service::update_opening_hour(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/opening-hours/everyday",
    request_body = EverydayHoursRequest,
    responses(
        (status = 200, description = "Same hours on all seven days", body = ApiResponse<OpeningHourList>),
        (status = 400, description = "Malformed time"),
        (status = 404, description = "Cafe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Opening Hours"
)]
pub async fn apply_everyday(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<EverydayHoursRequest>,
) -> AppResult<Json<ApiResponse<OpeningHourList>>> {
    let resp = opening_hour_service::apply_everyday(&state, &user, payload).await?;
    Ok(Json(resp))
}
