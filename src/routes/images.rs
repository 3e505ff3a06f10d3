use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tower_http::limit::RequestBodyLimitLayer;
use uuid::Uuid;

use crate::{
    dto::{
        catalog::CafeIdQuery,
        images::{
            CafeImageList, CreateCafeImageRequest, ImageIdQuery, SetMainImageRequest,
            UploadResponse,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CafeImage,
    response::ApiResponse,
    services::image_service,
    state::AppState,
    uploads::{IncomingFile, MAX_UPLOAD_BYTES},
};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// `/api/cafe-images`
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_images).post(create_image).delete(delete_image),
        )
        .route("/set-main", put(set_main_image))
}

/// `/api/upload`
pub fn upload_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD))
}

#[utoipa::path(
    get,
    path = "/api/cafe-images",
    params(
        ("cafeId" = Uuid, Query, description = "Cafe ID")
    ),
    responses(
        (status = 200, description = "Images of a cafe, newest first", body = ApiResponse<CafeImageList>)
    ),
    tag = "Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<CafeIdQuery>,
) -> AppResult<Json<ApiResponse<CafeImageList>>> {
    let resp = image_service::list_images(&state, query.cafe_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cafe-images",
    request_body = CreateCafeImageRequest,
    responses(
        (status = 201, description = "Image attached to a cafe", body = ApiResponse<CafeImage>),
        (status = 404, description = "Cafe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Images"
)]
pub async fn create_image(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCafeImageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CafeImage>>)> {
    let resp = image_service::create_image(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/cafe-images",
    params(
        ("imageId" = Uuid, Query, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Deleted image"),
        (status = 404, description = "Image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ImageIdQuery>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = image_service::delete_image(&state, &user, query.image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cafe-images/set-main",
    request_body = SetMainImageRequest,
    responses(
        (status = 200, description = "Main image updated"),
        (status = 400, description = "Image belongs to another cafe"),
        (status = 404, description = "Cafe or image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Images"
)]
pub async fn set_main_image(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SetMainImageRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = image_service::set_main_image(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 201, description = "Stored image", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Missing, oversized or non-image file"),
    ),
    security(("bearer_auth" = [])),
    tag = "Images"
)]
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadResponse>>)> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Read error: {e}")))?;
        file = Some(IncomingFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file provided".into()))?;
    let resp = image_service::upload(&state, &user, file).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
