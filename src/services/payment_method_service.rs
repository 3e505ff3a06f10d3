use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CafePaymentMethodRequest, CreatePaymentMethodRequest, PaymentMethodList},
    entity::{
        CafePaymentMethods, PaymentMethods, cafe_payment_methods,
        payment_methods::{self, ActiveModel, Model as PaymentMethodModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{PaymentMethod, dedup_ids},
    response::{ApiResponse, Meta},
    services::cafe_service::ensure_cafe_exists,
    state::AppState,
};

pub async fn list_payment_methods(state: &AppState) -> AppResult<ApiResponse<PaymentMethodList>> {
    let items: Vec<PaymentMethod> = PaymentMethods::find()
        .order_by_asc(payment_methods::Column::Label)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_method_from_entity)
        .collect();
    let total = items.len();
    Ok(ApiResponse::list("Payment methods", PaymentMethodList { items }, total))
}

pub async fn create_payment_method(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePaymentMethodRequest,
) -> AppResult<ApiResponse<PaymentMethod>> {
    ensure_admin(user)?;
    let code = payload.code.trim().to_string();
    let label = payload.label.trim().to_string();
    if code.is_empty() || label.is_empty() {
        return Err(AppError::BadRequest("code and label are required".into()));
    }

    let taken = PaymentMethods::find()
        .filter(payment_methods::Column::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!(
            "Payment method code {code} already exists"
        )));
    }

    let method = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        label: Set(label),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.orm)
    .await
    .map_err(AppError::on_unique_violation("Payment method code already exists"))?;

    audit::record(
        &state.pool,
        user.user_id,
        "payment_method_create",
        "payment_methods",
        serde_json::json!({ "payment_method_id": method.id, "code": method.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment method created",
        payment_method_from_entity(method),
        Some(Meta::empty()),
    ))
}

pub async fn delete_payment_method(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = PaymentMethods::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "payment_method_delete",
        "payment_methods",
        serde_json::json!({ "payment_method_id": id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

pub async fn list_cafe_payment_methods(
    state: &AppState,
    cafe_id: Uuid,
) -> AppResult<ApiResponse<PaymentMethodList>> {
    let items = payment_methods_of(&state.orm, cafe_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Cafe payment methods", PaymentMethodList { items }, total))
}

pub async fn link_cafe_payment_method(
    state: &AppState,
    user: &AuthUser,
    payload: CafePaymentMethodRequest,
) -> AppResult<ApiResponse<PaymentMethodList>> {
    ensure_admin(user)?;
    ensure_cafe_exists(&state.orm, payload.cafe_id).await?;
    if PaymentMethods::find_by_id(payload.payment_method_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("Payment method not found".into()));
    }

    let existing = CafePaymentMethods::find_by_id((payload.cafe_id, payload.payment_method_id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Payment method already linked to this cafe".into(),
        ));
    }

    CafePaymentMethods::insert(cafe_payment_methods::ActiveModel {
        cafe_id: Set(payload.cafe_id),
        payment_method_id: Set(payload.payment_method_id),
    })
    .exec_without_returning(&state.orm)
    .await
    .map_err(AppError::on_unique_violation(
        "Payment method already linked to this cafe",
    ))?;

    audit::record(
        &state.pool,
        user.user_id,
        "cafe_payment_method_link",
        "cafe_payment_methods",
        serde_json::json!({
            "cafe_id": payload.cafe_id,
            "payment_method_id": payload.payment_method_id,
        }),
    )
    .await;

    let items = payment_methods_of(&state.orm, payload.cafe_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Payment method linked", PaymentMethodList { items }, total))
}

pub async fn unlink_cafe_payment_method(
    state: &AppState,
    user: &AuthUser,
    payload: CafePaymentMethodRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = CafePaymentMethods::delete_many()
        .filter(cafe_payment_methods::Column::CafeId.eq(payload.cafe_id))
        .filter(cafe_payment_methods::Column::PaymentMethodId.eq(payload.payment_method_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "cafe_payment_method_unlink",
        "cafe_payment_methods",
        serde_json::json!({
            "cafe_id": payload.cafe_id,
            "payment_method_id": payload.payment_method_id,
        }),
    )
    .await;

    Ok(ApiResponse::ack("Removed"))
}

/// Links the given payment methods to a freshly created cafe.
pub(crate) async fn link_payment_methods(
    txn: &DatabaseTransaction,
    cafe_id: Uuid,
    payment_method_ids: &[Uuid],
) -> AppResult<()> {
    let ids = dedup_ids(payment_method_ids);
    if ids.is_empty() {
        return Ok(());
    }
    let found = PaymentMethods::find()
        .filter(payment_methods::Column::Id.is_in(ids.clone()))
        .count(txn)
        .await?;
    if found != ids.len() as u64 {
        return Err(AppError::BadRequest("Unknown payment method id".into()));
    }

    let links = ids
        .into_iter()
        .map(|payment_method_id| cafe_payment_methods::ActiveModel {
            cafe_id: Set(cafe_id),
            payment_method_id: Set(payment_method_id),
        });
    CafePaymentMethods::insert_many(links)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn payment_methods_of<C: ConnectionTrait>(
    db: &C,
    cafe_id: Uuid,
) -> AppResult<Vec<PaymentMethod>> {
    let mut items: Vec<PaymentMethod> = CafePaymentMethods::find()
        .filter(cafe_payment_methods::Column::CafeId.eq(cafe_id))
        .find_also_related(PaymentMethods)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, method)| method.map(payment_method_from_entity))
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(items)
}

pub(crate) fn payment_method_from_entity(model: PaymentMethodModel) -> PaymentMethod {
    PaymentMethod {
        id: model.id,
        code: model.code,
        label: model.label,
    }
}
