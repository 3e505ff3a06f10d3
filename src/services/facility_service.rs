use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{
        CafeRef, CreateFacilityRequest, FacilityDetail, FacilityList, ReplaceCafeFacilitiesRequest,
        UpdateFacilityRequest,
    },
    entity::{
        CafeFacilities, Cafes, Facilities, cafe_facilities, cafes,
        facilities::{self, ActiveModel, Model as FacilityModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Facility, dedup_ids},
    response::{ApiResponse, Meta},
    services::cafe_service::ensure_cafe_exists,
    state::AppState,
};

pub async fn list_facilities(state: &AppState) -> AppResult<ApiResponse<FacilityList>> {
    let items: Vec<Facility> = Facilities::find()
        .order_by_asc(facilities::Column::Label)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(facility_from_entity)
        .collect();
    let total = items.len();
    Ok(ApiResponse::list("Facilities", FacilityList { items }, total))
}

pub async fn get_facility(state: &AppState, id: Uuid) -> AppResult<ApiResponse<FacilityDetail>> {
    let facility = Facilities::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let cafes = facility
        .find_related(Cafes)
        .order_by_asc(cafes::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|cafe| CafeRef {
            id: cafe.id,
            name: cafe.name,
        })
        .collect();

    let data = FacilityDetail {
        facility: facility_from_entity(facility),
        cafes,
    };
    Ok(ApiResponse::success("Facility", data, None))
}

pub async fn create_facility(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFacilityRequest,
) -> AppResult<ApiResponse<Facility>> {
    ensure_admin(user)?;
    let code = payload.code.trim().to_string();
    let label = payload.label.trim().to_string();
    if code.is_empty() || label.is_empty() {
        return Err(AppError::BadRequest("code and label are required".into()));
    }
    ensure_code_free(state, &code, None).await?;

    let facility = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        label: Set(label),
        icon: Set(clean_icon(payload.icon)),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.orm)
    .await
    .map_err(AppError::on_unique_violation("Facility code already exists"))?;

    audit::record(
        &state.pool,
        user.user_id,
        "facility_create",
        "facilities",
        serde_json::json!({ "facility_id": facility.id, "code": facility.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Facility created",
        facility_from_entity(facility),
        Some(Meta::empty()),
    ))
}

pub async fn update_facility(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFacilityRequest,
) -> AppResult<ApiResponse<Facility>> {
    ensure_admin(user)?;
    let existing = Facilities::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(code) = payload.code {
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(AppError::BadRequest("code must not be empty".into()));
        }
        ensure_code_free(state, &code, Some(id)).await?;
        active.code = Set(code);
    }
    if let Some(label) = payload.label {
        let label = label.trim().to_string();
        if label.is_empty() {
            return Err(AppError::BadRequest("label must not be empty".into()));
        }
        active.label = Set(label);
    }
    if payload.icon.is_some() {
        active.icon = Set(clean_icon(payload.icon));
    }
    let facility = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "facility_update",
        "facilities",
        serde_json::json!({ "facility_id": facility.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        facility_from_entity(facility),
        Some(Meta::empty()),
    ))
}

pub async fn delete_facility(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Facilities::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "facility_delete",
        "facilities",
        serde_json::json!({ "facility_id": id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

pub async fn list_cafe_facilities(
    state: &AppState,
    cafe_id: Uuid,
) -> AppResult<ApiResponse<FacilityList>> {
    let items = facilities_of(&state.orm, cafe_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Cafe facilities", FacilityList { items }, total))
}

/// The submitted set becomes the cafe's complete facility set.
pub async fn replace_cafe_facilities(
    state: &AppState,
    user: &AuthUser,
    payload: ReplaceCafeFacilitiesRequest,
) -> AppResult<ApiResponse<FacilityList>> {
    ensure_admin(user)?;
    ensure_cafe_exists(&state.orm, payload.cafe_id).await?;

    let txn = state.orm.begin().await?;
    replace_facilities(&txn, payload.cafe_id, &payload.facility_ids).await?;
    txn.commit().await?;

    tracing::info!(
        cafe_id = %payload.cafe_id,
        count = payload.facility_ids.len(),
        "cafe facilities replaced"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "cafe_facilities_replace",
        "cafe_facilities",
        serde_json::json!({ "cafe_id": payload.cafe_id, "facility_ids": payload.facility_ids }),
    )
    .await;

    let items = facilities_of(&state.orm, payload.cafe_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Cafe facilities updated", FacilityList { items }, total))
}

/// Deletes every link of the cafe and inserts the given ones. Unknown
/// facility ids are rejected.
pub(crate) async fn replace_facilities(
    txn: &DatabaseTransaction,
    cafe_id: Uuid,
    facility_ids: &[Uuid],
) -> AppResult<()> {
    let ids = dedup_ids(facility_ids);
    if !ids.is_empty() {
        let found = Facilities::find()
            .filter(facilities::Column::Id.is_in(ids.clone()))
            .count(txn)
            .await?;
        if found != ids.len() as u64 {
            return Err(AppError::BadRequest("Unknown facility id".into()));
        }
    }

    CafeFacilities::delete_many()
        .filter(cafe_facilities::Column::CafeId.eq(cafe_id))
        .exec(txn)
        .await?;

    if !ids.is_empty() {
        let links = ids.into_iter().map(|facility_id| cafe_facilities::ActiveModel {
            cafe_id: Set(cafe_id),
            facility_id: Set(facility_id),
        });
        CafeFacilities::insert_many(links)
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}

async fn facilities_of<C: ConnectionTrait>(db: &C, cafe_id: Uuid) -> AppResult<Vec<Facility>> {
    let mut items: Vec<Facility> = CafeFacilities::find()
        .filter(cafe_facilities::Column::CafeId.eq(cafe_id))
        .find_also_related(Facilities)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, facility)| facility.map(facility_from_entity))
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(items)
}

async fn ensure_code_free(state: &AppState, code: &str, except: Option<Uuid>) -> AppResult<()> {
    let taken = Facilities::find()
        .filter(facilities::Column::Code.eq(code))
        .one(&state.orm)
        .await?;
    match taken {
        Some(f) if Some(f.id) != except => Err(AppError::Conflict(format!(
            "Facility code {code} already exists"
        ))),
        _ => Ok(()),
    }
}

fn clean_icon(icon: Option<String>) -> Option<String> {
    icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())
}

pub(crate) fn facility_from_entity(model: FacilityModel) -> Facility {
    Facility {
        id: model.id,
        code: model.code,
        label: model.label,
        icon: model.icon,
    }
}
