use std::collections::HashMap;

use chrono::{Datelike, Local, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    directory::{DirectoryQuery, filter_cafes, parse_facility_ids},
    dto::cafes::{
        CafeList, CafeListingList, CafeSearchQuery, CafeStatus, CafeStatusQuery, CreateCafeRequest,
        DayHours, UpdateCafeRequest,
    },
    entity::{
        CafeFacilities, CafeImages, CafePaymentMethods, Cafes, Facilities, PaymentMethods,
        cafe_facilities, cafe_images, cafe_payment_methods,
        cafes::{self, ActiveModel},
    },
    error::{AppError, AppResult},
    geo::Coordinates,
    middleware::auth::{AuthUser, ensure_admin},
    models::{CafeDetail, CafeSummary, normalize_parking, slugify},
    opening_hours::{DayOfWeek, display_hours, format_wall_clock, status_at},
    response::{ApiResponse, Meta},
    services::{
        facility_service::{facility_from_entity, replace_facilities},
        image_service::image_from_entity,
        opening_hour_service::{load_hours, schedules},
        payment_method_service::{link_payment_methods, payment_method_from_entity},
    },
    state::AppState,
};

pub async fn list_cafes(state: &AppState) -> AppResult<ApiResponse<CafeList>> {
    let items = load_summaries(&state.orm, None).await?;
    let total = items.len();
    Ok(ApiResponse::list("Cafes", CafeList { items }, total))
}

pub async fn search_cafes(
    state: &AppState,
    query: CafeSearchQuery,
) -> AppResult<ApiResponse<CafeListingList>> {
    let cafes = load_summaries(&state.orm, None).await?;
    let directory_query = DirectoryQuery {
        text: query.q.unwrap_or_default(),
        facility_ids: parse_facility_ids(query.facility_ids.as_deref()),
        user_location: Coordinates::from_optional(query.lat, query.lng),
    };
    let items = filter_cafes(&cafes, &directory_query);
    tracing::debug!(
        matched = items.len(),
        of = cafes.len(),
        located = directory_query.user_location.is_some(),
        "cafe search"
    );
    let total = items.len();
    Ok(ApiResponse::list("Cafes", CafeListingList { items }, total))
}

pub async fn get_cafe(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CafeDetail>> {
    let detail = load_detail(&state.orm, id).await?;
    Ok(ApiResponse::success("Cafe", detail, None))
}

pub async fn create_cafe(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCafeRequest,
) -> AppResult<ApiResponse<CafeDetail>> {
    ensure_admin(user)?;
    let name = required(&payload.name, "name")?;
    let address = required(&payload.address, "address")?;
    validate_location(payload.latitude, payload.longitude)?;
    validate_prices(payload.price_min, payload.price_max)?;

    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slugify(slug),
        _ => slugify(&name),
    };
    if slug.is_empty() {
        return Err(AppError::BadRequest("name must contain letters or digits".into()));
    }
    ensure_slug_free(&state.orm, &slug).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();
    let txn = state.orm.begin().await?;
    ActiveModel {
        id: Set(id),
        slug: Set(slug),
        name: Set(name),
        address: Set(address),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        google_maps_url: Set(blank_to_none(payload.google_maps_url)),
        instagram_url: Set(blank_to_none(payload.instagram_url)),
        instagram_username: Set(blank_to_none(payload.instagram_username)),
        parking: Set(normalize_parking(payload.parking.as_deref())),
        price_min: Set(payload.price_min),
        price_max: Set(payload.price_max),
        price_range: Set(blank_to_none(payload.price_range)),
        main_image_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(AppError::on_unique_violation("Slug is already taken"))?;

    replace_facilities(&txn, id, &payload.facility_ids).await?;
    link_payment_methods(&txn, id, &payload.payment_method_ids).await?;
    txn.commit().await?;

    tracing::info!(cafe_id = %id, "cafe created");
    audit::record(
        &state.pool,
        user.user_id,
        "cafe_create",
        "cafes",
        serde_json::json!({ "cafe_id": id }),
    )
    .await;

    let detail = load_detail(&state.orm, id).await?;
    Ok(ApiResponse::success("Cafe created", detail, Some(Meta::empty())))
}

pub async fn update_cafe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCafeRequest,
) -> AppResult<ApiResponse<CafeDetail>> {
    ensure_admin(user)?;
    let existing = Cafes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let latitude = payload.latitude.or(existing.latitude);
    let longitude = payload.longitude.or(existing.longitude);
    validate_location(latitude, longitude)?;
    validate_prices(
        payload.price_min.or(existing.price_min),
        payload.price_max.or(existing.price_max),
    )?;

    let txn = state.orm.begin().await?;
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required(&name, "name")?);
    }
    if let Some(address) = payload.address {
        active.address = Set(required(&address, "address")?);
    }
    if payload.latitude.is_some() {
        active.latitude = Set(latitude);
    }
    if payload.longitude.is_some() {
        active.longitude = Set(longitude);
    }
    if let Some(url) = payload.google_maps_url {
        active.google_maps_url = Set(blank_to_none(Some(url)));
    }
    if let Some(url) = payload.instagram_url {
        active.instagram_url = Set(blank_to_none(Some(url)));
    }
    if let Some(username) = payload.instagram_username {
        active.instagram_username = Set(blank_to_none(Some(username)));
    }
    if let Some(parking) = payload.parking {
        active.parking = Set(normalize_parking(Some(&parking)));
    }
    if let Some(price_min) = payload.price_min {
        active.price_min = Set(Some(price_min));
    }
    if let Some(price_max) = payload.price_max {
        active.price_max = Set(Some(price_max));
    }
    if let Some(price_range) = payload.price_range {
        active.price_range = Set(blank_to_none(Some(price_range)));
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&txn).await?;

    if let Some(facility_ids) = payload.facility_ids {
        replace_facilities(&txn, id, &facility_ids).await?;
    }
    txn.commit().await?;

    tracing::info!(cafe_id = %id, "cafe updated");
    audit::record(
        &state.pool,
        user.user_id,
        "cafe_update",
        "cafes",
        serde_json::json!({ "cafe_id": id }),
    )
    .await;

    let detail = load_detail(&state.orm, id).await?;
    Ok(ApiResponse::success("Updated", detail, Some(Meta::empty())))
}

pub async fn delete_cafe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Cafes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(cafe_id = %id, "cafe deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "cafe_delete",
        "cafes",
        serde_json::json!({ "cafe_id": id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

/// Open/closed status at the viewer's local time, defaulting to the
/// server's local clock.
pub async fn cafe_status(
    state: &AppState,
    id: Uuid,
    query: CafeStatusQuery,
) -> AppResult<ApiResponse<CafeStatus>> {
    let exists = Cafes::find_by_id(id).one(&state.orm).await?.is_some();
    if !exists {
        return Err(AppError::NotFound);
    }
    let now = match query.at.as_deref() {
        Some(_) => query
            .parse_at()
            .ok_or_else(|| AppError::BadRequest("at must be YYYY-MM-DDTHH:MM".into()))?,
        None => Local::now().naive_local(),
    };
    let locale = query.lang.unwrap_or_default();

    let rows = schedules(&load_hours(&state.orm, id).await?);
    let status = status_at(&rows, now);
    let today = DayOfWeek::from(now.weekday());

    let hours = DayOfWeek::ALL
        .into_iter()
        .map(|day| DayHours {
            day_of_week: day,
            day_name: day.name(locale).to_string(),
            display: rows
                .iter()
                .find(|row| row.day == day)
                .map(|row| display_hours(row, locale))
                .unwrap_or_else(|| "-".to_string()),
            is_today: day == today,
        })
        .collect();

    let data = CafeStatus {
        cafe_id: id,
        is_open: status.is_open,
        reason: status.reason,
        label: status.label(locale).to_string(),
        today,
        checked_at: format!("{} {}", now.date(), format_wall_clock(now.time())),
        hours,
    };
    Ok(ApiResponse::success("Cafe status", data, None))
}

/// Map-view summaries with images (newest first), payment methods and
/// facilities attached. `only` restricts the result to the given ids while
/// keeping their order.
pub(crate) async fn load_summaries<C: ConnectionTrait>(
    db: &C,
    only: Option<&[Uuid]>,
) -> AppResult<Vec<CafeSummary>> {
    let mut finder = Cafes::find();
    if let Some(ids) = only {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        finder = finder.filter(cafes::Column::Id.is_in(ids.to_vec()));
    }
    let rows = finder
        .order_by_asc(cafes::Column::CreatedAt)
        .order_by_asc(cafes::Column::Name)
        .all(db)
        .await?;
    let ids: Vec<Uuid> = rows.iter().map(|c| c.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut images: HashMap<Uuid, Vec<_>> = HashMap::new();
    for image in CafeImages::find()
        .filter(cafe_images::Column::CafeId.is_in(ids.clone()))
        .order_by_desc(cafe_images::Column::CreatedAt)
        .all(db)
        .await?
    {
        images
            .entry(image.cafe_id)
            .or_default()
            .push(image_from_entity(image));
    }

    let mut facilities: HashMap<Uuid, Vec<_>> = HashMap::new();
    for (link, facility) in CafeFacilities::find()
        .filter(cafe_facilities::Column::CafeId.is_in(ids.clone()))
        .find_also_related(Facilities)
        .all(db)
        .await?
    {
        if let Some(facility) = facility {
            facilities
                .entry(link.cafe_id)
                .or_default()
                .push(facility_from_entity(facility));
        }
    }
    for list in facilities.values_mut() {
        list.sort_by(|a, b| a.label.cmp(&b.label));
    }

    let mut payment_methods: HashMap<Uuid, Vec<_>> = HashMap::new();
    for (link, method) in CafePaymentMethods::find()
        .filter(cafe_payment_methods::Column::CafeId.is_in(ids))
        .find_also_related(PaymentMethods)
        .all(db)
        .await?
    {
        if let Some(method) = method {
            payment_methods
                .entry(link.cafe_id)
                .or_default()
                .push(payment_method_from_entity(method));
        }
    }
    for list in payment_methods.values_mut() {
        list.sort_by(|a, b| a.label.cmp(&b.label));
    }

    let mut summaries: Vec<CafeSummary> = rows
        .into_iter()
        .map(|cafe| CafeSummary {
            images: images.remove(&cafe.id).unwrap_or_default(),
            facilities: facilities.remove(&cafe.id).unwrap_or_default(),
            payment_methods: payment_methods.remove(&cafe.id).unwrap_or_default(),
            id: cafe.id,
            name: cafe.name,
            slug: cafe.slug,
            address: cafe.address,
            latitude: cafe.latitude,
            longitude: cafe.longitude,
            parking: cafe.parking,
            price_min: cafe.price_min,
            price_max: cafe.price_max,
            price_range: cafe.price_range,
            google_maps_url: cafe.google_maps_url,
            instagram_url: cafe.instagram_url,
            instagram_username: cafe.instagram_username,
            main_image_id: cafe.main_image_id,
        })
        .collect();

    if let Some(order) = only {
        summaries.sort_by_key(|s| order.iter().position(|id| *id == s.id));
    }
    Ok(summaries)
}

pub(crate) async fn load_detail(db: &DatabaseConnection, id: Uuid) -> AppResult<CafeDetail> {
    let cafe = load_summaries(db, Some(std::slice::from_ref(&id)))
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    let opening_hours = load_hours(db, id).await?;
    Ok(CafeDetail { cafe, opening_hours })
}

pub(crate) async fn ensure_cafe_exists<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    match Cafes::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound),
    }
}

async fn ensure_slug_free(db: &DatabaseConnection, slug: &str) -> AppResult<()> {
    let taken = Cafes::find()
        .filter(cafes::Column::Slug.eq(slug))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("Slug {slug} is already taken")));
    }
    Ok(())
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Coordinates are optional, but when given they must be a valid pair.
fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) if Coordinates::new(lat, lng).is_some() => Ok(()),
        _ => Err(AppError::BadRequest(
            "latitude and longitude must be given together and be in range".into(),
        )),
    }
}

fn validate_prices(min: Option<i32>, max: Option<i32>) -> AppResult<()> {
    if min.is_some_and(|v| v < 0) || max.is_some_and(|v| v < 0) {
        return Err(AppError::BadRequest("prices must not be negative".into()));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::BadRequest("priceMin must not exceed priceMax".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_must_be_a_valid_pair() {
        assert!(validate_location(None, None).is_ok());
        assert!(validate_location(Some(-7.79), Some(110.36)).is_ok());
        assert!(validate_location(Some(-7.79), None).is_err());
        assert!(validate_location(Some(95.0), Some(110.36)).is_err());
    }

    #[test]
    fn price_bounds() {
        assert!(validate_prices(Some(15_000), Some(50_000)).is_ok());
        assert!(validate_prices(None, Some(50_000)).is_ok());
        assert!(validate_prices(Some(60_000), Some(50_000)).is_err());
        assert!(validate_prices(Some(-1), None).is_err());
    }

    #[test]
    fn blanks_become_none() {
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(Some(" x ".into())), Some("x".into()));
        assert_eq!(required(" Kopi ", "name").unwrap(), "Kopi");
        assert!(required("  ", "name").is_err());
    }
}
