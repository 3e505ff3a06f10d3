use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    audit,
    dto::favorites::{AddFavoriteRequest, FavoriteCafeList, FavoriteState},
    entity::Cafes,
    error::{AppError, AppResult},
    favorites::FavoriteSet,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::cafe_service::load_summaries,
    state::AppState,
};

pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteCafeList>> {
    let set = FavoriteSet::load(&state.favorite_store(), user.user_id).await?;
    let items = load_summaries(&state.orm, Some(set.ids())).await?;
    let total = items.len();
    Ok(ApiResponse::list("OK", FavoriteCafeList { items }, total))
}

pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<FavoriteState>> {
    ensure_known_cafe(state, payload.cafe_id).await?;

    let store = state.favorite_store();
    let mut set = FavoriteSet::load(&store, user.user_id).await?;
    if set.add(payload.cafe_id) {
        set.save(&store).await?;
        audit::record(
            &state.pool,
            user.user_id,
            "favorite_add",
            "favorites",
            serde_json::json!({ "cafe_id": payload.cafe_id }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Added to favorites",
        favorite_state(&set, payload.cafe_id),
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    cafe_id: Uuid,
) -> AppResult<ApiResponse<FavoriteState>> {
    let store = state.favorite_store();
    let mut set = FavoriteSet::load(&store, user.user_id).await?;
    if !set.remove(cafe_id) {
        return Err(AppError::NotFound);
    }
    set.save(&store).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "favorite_remove",
        "favorites",
        serde_json::json!({ "cafe_id": cafe_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from favorites",
        favorite_state(&set, cafe_id),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_favorite(
    state: &AppState,
    user: &AuthUser,
    cafe_id: Uuid,
) -> AppResult<ApiResponse<FavoriteState>> {
    let store = state.favorite_store();
    let mut set = FavoriteSet::load(&store, user.user_id).await?;
    if !set.contains(cafe_id) {
        ensure_known_cafe(state, cafe_id).await?;
    }
    let is_favorite = set.toggle(cafe_id);
    set.save(&store).await?;

    tracing::debug!(user_id = %user.user_id, cafe_id = %cafe_id, is_favorite, "favorite toggled");
    audit::record(
        &state.pool,
        user.user_id,
        if is_favorite { "favorite_add" } else { "favorite_remove" },
        "favorites",
        serde_json::json!({ "cafe_id": cafe_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Toggled",
        favorite_state(&set, cafe_id),
        Some(Meta::empty()),
    ))
}

async fn ensure_known_cafe(state: &AppState, cafe_id: Uuid) -> AppResult<()> {
    if Cafes::find_by_id(cafe_id).one(&state.orm).await?.is_none() {
        return Err(AppError::BadRequest("Cafe not found".into()));
    }
    Ok(())
}

fn favorite_state(set: &FavoriteSet, cafe_id: Uuid) -> FavoriteState {
    FavoriteState {
        cafe_id,
        is_favorite: set.contains(cafe_id),
        favorite_ids: set.ids().to_vec(),
    }
}
