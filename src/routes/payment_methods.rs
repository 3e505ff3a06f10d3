use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CafeIdQuery, CafePaymentMethodRequest, CreatePaymentMethodRequest, PaymentMethodList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::PaymentMethod,
    response::ApiResponse,
    services::payment_method_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payment_methods).post(create_payment_method))
        .route("/{id}", delete(delete_payment_method))
}

/// `/api/cafe-payment-methods`
pub fn cafe_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_cafe_payment_methods)
            .post(link_cafe_payment_method)
            .delete(unlink_cafe_payment_method),
    )
}

#[utoipa::path(
    get,
    path = "/api/payment-methods",
    responses(
        (status = 200, description = "Payment methods by label", body = ApiResponse<PaymentMethodList>)
    ),
    tag = "Payment Methods"
)]
pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PaymentMethodList>>> {
    let resp = payment_method_service::list_payment_methods(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payment-methods",
    request_body = CreatePaymentMethodRequest,
    responses(
        (status = 201, description = "Create payment method", body = ApiResponse<PaymentMethod>),
        (status = 409, description = "Code already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment Methods"
)]
pub async fn create_payment_method(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentMethodRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PaymentMethod>>)> {
    let resp = payment_method_service::create_payment_method(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/payment-methods/{id}",
    params(
        ("id" = Uuid, Path, description = "Payment method ID")
    ),
    responses(
        (status = 200, description = "Deleted payment method"),
        (status = 404, description = "Payment method not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment Methods"
)]
pub async fn delete_payment_method(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = payment_method_service::delete_payment_method(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cafe-payment-methods",
    params(
        ("cafeId" = Uuid, Query, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Payment methods of a cafe", body = ApiResponse<PaymentMethodList>)
    ),
    tag = "Payment Methods"
)]
pub async fn list_cafe_payment_methods(
    State(state): State<AppState>,
    Query(query): Query<CafeIdQuery>,
) -> AppResult<Json<ApiResponse<PaymentMethodList>>> {
    let resp = payment_method_service::list_cafe_payment_methods(&state, query.cafe_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cafe-payment-methods",
    request_body = CafePaymentMethodRequest,
    responses(
        (status = 201, description = "Linked", body = ApiResponse<PaymentMethodList>),
        (status = 400, description = "Unknown payment method"),
        (status = 404, description = "Cafe not found"),
        (status = 409, description = "Already linked"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment Methods"
)]
pub async fn link_cafe_payment_method(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CafePaymentMethodRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PaymentMethodList>>)> {
    let resp = payment_method_service::link_cafe_payment_method(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/cafe-payment-methods",
    params(
        ("cafeId" = Uuid, Query, description = "Cafe ID"),
        ("paymentMethodId" = Uuid, Query, description = "Payment method ID"),
    ),
    responses(
        (status = 200, description = "Unlinked"),
        (status = 404, description = "Link not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment Methods"
)]
pub async fn unlink_cafe_payment_method(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CafePaymentMethodRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = payment_method_service::unlink_cafe_payment_method(&state, &user, query).await?;
    Ok(Json(resp))
}
