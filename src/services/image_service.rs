use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::images::{CafeImageList, CreateCafeImageRequest, SetMainImageRequest, UploadResponse},
    entity::{
        CafeImages, Cafes,
        cafe_images::{self, ActiveModel, Model as CafeImageModel},
        cafes,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::CafeImage,
    response::{ApiResponse, Meta},
    services::cafe_service::ensure_cafe_exists,
    state::AppState,
    uploads::{self, IncomingFile},
};

pub async fn list_images(state: &AppState, cafe_id: Uuid) -> AppResult<ApiResponse<CafeImageList>> {
    let items: Vec<CafeImage> = CafeImages::find()
        .filter(cafe_images::Column::CafeId.eq(cafe_id))
        .order_by_desc(cafe_images::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(image_from_entity)
        .collect();
    let total = items.len();
    Ok(ApiResponse::list("Cafe images", CafeImageList { items }, total))
}

pub async fn create_image(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCafeImageRequest,
) -> AppResult<ApiResponse<CafeImage>> {
    ensure_admin(user)?;
    let image_url = payload.image_url.trim().to_string();
    if image_url.is_empty() {
        return Err(AppError::BadRequest("imageUrl is required".into()));
    }
    ensure_cafe_exists(&state.orm, payload.cafe_id).await?;

    let image = ActiveModel {
        id: Set(Uuid::new_v4()),
        cafe_id: Set(payload.cafe_id),
        image_url: Set(image_url),
        alt: Set(payload.alt.filter(|a| !a.trim().is_empty())),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cafe_image_create",
        "cafe_images",
        serde_json::json!({ "cafe_id": image.cafe_id, "image_id": image.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Image added",
        image_from_entity(image),
        Some(Meta::empty()),
    ))
}

/// Deleting the main image also clears the cafe's main image pointer.
pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    Cafes::update_many()
        .col_expr(cafes::Column::MainImageId, Expr::value(Option::<Uuid>::None))
        .filter(cafes::Column::MainImageId.eq(image_id))
        .exec(&txn)
        .await?;
    let result = CafeImages::delete_by_id(image_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cafe_image_delete",
        "cafe_images",
        serde_json::json!({ "image_id": image_id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

pub async fn set_main_image(
    state: &AppState,
    user: &AuthUser,
    payload: SetMainImageRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let cafe = Cafes::find_by_id(payload.cafe_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let image = CafeImages::find_by_id(payload.image_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if image.cafe_id != cafe.id {
        return Err(AppError::BadRequest(
            "Image does not belong to this cafe".into(),
        ));
    }

    let mut active: cafes::ActiveModel = cafe.into();
    active.main_image_id = Set(Some(image.id));
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&state.orm).await?;

    tracing::info!(cafe_id = %payload.cafe_id, image_id = %image.id, "main image set");
    audit::record(
        &state.pool,
        user.user_id,
        "cafe_image_set_main",
        "cafes",
        serde_json::json!({ "cafe_id": payload.cafe_id, "image_id": image.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Main image updated",
        serde_json::json!({ "cafeId": payload.cafe_id, "mainImageId": image.id }),
        Some(Meta::empty()),
    ))
}

pub async fn upload(
    state: &AppState,
    user: &AuthUser,
    file: IncomingFile,
) -> AppResult<ApiResponse<UploadResponse>> {
    ensure_admin(user)?;
    let stored = uploads::store(&state.config.upload_dir, file).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "image_upload",
        "uploads",
        serde_json::json!({ "filename": stored.filename }),
    )
    .await;

    Ok(ApiResponse::success("Uploaded", stored, Some(Meta::empty())))
}

pub(crate) fn image_from_entity(model: CafeImageModel) -> CafeImage {
    CafeImage {
        id: model.id,
        cafe_id: model.cafe_id,
        image_url: model.image_url,
        alt: model.alt,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
