use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cafes;
pub mod doc;
pub mod facilities;
pub mod favorites;
pub mod health;
pub mod images;
pub mod opening_hours;
pub mod params;
pub mod payment_methods;
pub mod users;

const JSON_BODY_LIMIT: usize = 1024 * 1024;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cafes", cafes::router())
        .nest("/facilities", facilities::router())
        .nest("/payment-methods", payment_methods::router())
        .nest("/cafe-facilities", facilities::cafe_router())
        .nest("/cafe-payment-methods", payment_methods::cafe_router())
        .nest("/opening-hours", opening_hours::router())
        .nest("/cafe-images", images::router())
        .nest("/users", users::router())
        .nest("/favorites", favorites::router())
        .nest("/admin", admin::router())
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT))
        .nest("/upload", images::upload_router())
}
