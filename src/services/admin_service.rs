use sea_orm::{EntityTrait, PaginatorTrait};

use crate::{
    dto::catalog::AdminStats,
    entity::{Cafes, Facilities, PaymentMethods, Users},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    state::AppState,
};

/// Entity counts shown on the dashboard.
pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(user)?;
    let (cafes, facilities, payment_methods, users) = tokio::try_join!(
        Cafes::find().count(&state.orm),
        Facilities::find().count(&state.orm),
        PaymentMethods::find().count(&state.orm),
        Users::find().count(&state.orm),
    )?;

    let data = AdminStats {
        cafes,
        facilities,
        payment_methods,
        users,
    };
    Ok(ApiResponse::success("Stats", data, None))
}
