use chrono::NaiveTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::opening_hours::{
        CreateOpeningHourRequest, EverydayHoursRequest, OpeningHourList, UpdateOpeningHourRequest,
    },
    entity::{
        OpeningHours,
        opening_hours::{self, ActiveModel, Model as OpeningHourModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::OpeningHour,
    opening_hours::{DayOfWeek, DaySchedule, parse_wall_clock},
    response::{ApiResponse, Meta},
    services::cafe_service::ensure_cafe_exists,
    state::AppState,
};

pub async fn list_opening_hours(
    state: &AppState,
    cafe_id: Uuid,
) -> AppResult<ApiResponse<OpeningHourList>> {
    let items = load_hours(&state.orm, cafe_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Opening hours", OpeningHourList { items }, total))
}

pub async fn create_opening_hour(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOpeningHourRequest,
) -> AppResult<ApiResponse<OpeningHour>> {
    ensure_admin(user)?;
    ensure_cafe_exists(&state.orm, payload.cafe_id).await?;
    let (open_time, close_time) = resolve_times(
        payload.open_time.as_deref(),
        payload.close_time.as_deref(),
        payload.is_closed,
        payload.is_open_24_hours,
    )?;

    let duplicate = OpeningHours::find()
        .filter(opening_hours::Column::CafeId.eq(payload.cafe_id))
        .filter(opening_hours::Column::DayOfWeek.eq(payload.day_of_week.as_str()))
        .one(&state.orm)
        .await?;
    let duplicate_message = format!("Opening hours for {} already exist", payload.day_of_week);
    if duplicate.is_some() {
        return Err(AppError::Conflict(duplicate_message));
    }

    let row = ActiveModel {
        id: Set(Uuid::new_v4()),
        cafe_id: Set(payload.cafe_id),
        day_of_week: Set(payload.day_of_week.as_str().to_string()),
        open_time: Set(open_time),
        close_time: Set(close_time),
        is_closed: Set(payload.is_closed),
        is_open_24_hours: Set(payload.is_open_24_hours),
        is_everyday_open: Set(payload.is_everyday_open),
    }
    .insert(&state.orm)
    .await
    .map_err(AppError::on_unique_violation(duplicate_message))?;

    audit::record(
        &state.pool,
        user.user_id,
        "opening_hour_create",
        "opening_hours",
        serde_json::json!({ "cafe_id": row.cafe_id, "day_of_week": row.day_of_week }),
    )
    .await;

    let hour = opening_hour_from_entity(row)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("stored an unknown weekday")))?;
    Ok(ApiResponse::success("Opening hour created", hour, Some(Meta::empty())))
}

pub async fn update_opening_hour(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateOpeningHourRequest,
) -> AppResult<ApiResponse<OpeningHour>> {
    ensure_admin(user)?;
    let existing = OpeningHours::find_by_id(payload.id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let (open_time, close_time) = resolve_times(
        payload.open_time.as_deref(),
        payload.close_time.as_deref(),
        payload.is_closed,
        payload.is_open_24_hours,
    )?;

    let mut active: ActiveModel = existing.into();
    active.open_time = Set(open_time);
    active.close_time = Set(close_time);
    active.is_closed = Set(payload.is_closed);
    active.is_open_24_hours = Set(payload.is_open_24_hours);
    active.is_everyday_open = Set(payload.is_everyday_open);
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "opening_hour_update",
        "opening_hours",
        serde_json::json!({ "opening_hour_id": row.id, "cafe_id": row.cafe_id }),
    )
    .await;

    let hour = opening_hour_from_entity(row)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("stored an unknown weekday")))?;
    Ok(ApiResponse::success("Updated", hour, Some(Meta::empty())))
}

/// Writes the same hours onto all seven days, updating existing rows and
/// creating missing ones.
pub async fn apply_everyday(
    state: &AppState,
    user: &AuthUser,
    payload: EverydayHoursRequest,
) -> AppResult<ApiResponse<OpeningHourList>> {
    ensure_admin(user)?;
    ensure_cafe_exists(&state.orm, payload.cafe_id).await?;
    let (open_time, close_time) = resolve_times(
        payload.open_time.as_deref(),
        payload.close_time.as_deref(),
        false,
        payload.is_open_24_hours,
    )?;

    let existing = OpeningHours::find()
        .filter(opening_hours::Column::CafeId.eq(payload.cafe_id))
        .all(&state.orm)
        .await?;

    let txn = state.orm.begin().await?;
    for day in DayOfWeek::ALL {
        let current = existing
            .iter()
            .find(|row| row.day_of_week.parse::<DayOfWeek>().ok() == Some(day));
        match current {
            Some(row) => {
                let mut active: ActiveModel = row.clone().into();
                active.open_time = Set(open_time);
                active.close_time = Set(close_time);
                active.is_closed = Set(false);
                active.is_open_24_hours = Set(payload.is_open_24_hours);
                active.is_everyday_open = Set(true);
                active.update(&txn).await?;
            }
            None => {
                ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cafe_id: Set(payload.cafe_id),
                    day_of_week: Set(day.as_str().to_string()),
                    open_time: Set(open_time),
                    close_time: Set(close_time),
                    is_closed: Set(false),
                    is_open_24_hours: Set(payload.is_open_24_hours),
                    is_everyday_open: Set(true),
                }
                .insert(&txn)
                .await?;
            }
        }
    }
    txn.commit().await?;

    tracing::info!(cafe_id = %payload.cafe_id, "everyday hours applied");
    audit::record(
        &state.pool,
        user.user_id,
        "opening_hours_everyday",
        "opening_hours",
        serde_json::json!({ "cafe_id": payload.cafe_id }),
    )
    .await;

    let items = load_hours(&state.orm, payload.cafe_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Opening hours updated", OpeningHourList { items }, total))
}

/// A cafe's rows ordered Monday to Sunday.
pub(crate) async fn load_hours<C: ConnectionTrait>(
    db: &C,
    cafe_id: Uuid,
) -> AppResult<Vec<OpeningHour>> {
    let mut items: Vec<OpeningHour> = OpeningHours::find()
        .filter(opening_hours::Column::CafeId.eq(cafe_id))
        .all(db)
        .await?
        .into_iter()
        .filter_map(opening_hour_from_entity)
        .collect();
    items.sort_by_key(|h| h.day_of_week);
    Ok(items)
}

pub(crate) fn schedules(hours: &[OpeningHour]) -> Vec<DaySchedule> {
    hours.iter().map(OpeningHour::schedule).collect()
}

/// Times may be omitted for closed or 24-hour days; otherwise both must be
/// valid `HH:MM`.
fn resolve_times(
    open: Option<&str>,
    close: Option<&str>,
    is_closed: bool,
    is_open_24_hours: bool,
) -> AppResult<(NaiveTime, NaiveTime)> {
    if is_closed && is_open_24_hours {
        return Err(AppError::BadRequest(
            "a day cannot be both closed and open 24 hours".into(),
        ));
    }
    let optional = is_closed || is_open_24_hours;
    let parse = |raw: Option<&str>, field: &str| -> AppResult<NaiveTime> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_wall_clock(raw)
                .ok_or_else(|| AppError::BadRequest(format!("{field} must be HH:MM"))),
            None if optional => Ok(NaiveTime::MIN),
            None => Err(AppError::BadRequest(format!("{field} is required"))),
        }
    };
    Ok((parse(open, "openTime")?, parse(close, "closeTime")?))
}

fn opening_hour_from_entity(model: OpeningHourModel) -> Option<OpeningHour> {
    let day_of_week = match model.day_of_week.parse::<DayOfWeek>() {
        Ok(day) => day,
        Err(err) => {
            tracing::warn!(opening_hour_id = %model.id, error = %err, "skipping opening hour row");
            return None;
        }
    };
    Some(OpeningHour {
        id: model.id,
        cafe_id: model.cafe_id,
        day_of_week,
        open_time: model.open_time,
        close_time: model.close_time,
        is_closed: model.is_closed,
        is_open_24_hours: model.is_open_24_hours,
        is_everyday_open: model.is_everyday_open,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn regular_days_need_both_times() {
        assert_eq!(
            resolve_times(Some("08:00"), Some("22:30"), false, false).unwrap(),
            (t(8, 0), t(22, 30))
        );
        assert!(resolve_times(Some("08:00"), None, false, false).is_err());
        assert!(resolve_times(Some("8am"), Some("22:00"), false, false).is_err());
    }

    #[test]
    fn closed_and_round_the_clock_days_default_to_midnight() {
        assert_eq!(
            resolve_times(None, None, true, false).unwrap(),
            (NaiveTime::MIN, NaiveTime::MIN)
        );
        assert_eq!(
            resolve_times(None, Some(""), false, true).unwrap(),
            (NaiveTime::MIN, NaiveTime::MIN)
        );
        assert!(resolve_times(None, None, true, true).is_err());
    }

    #[test]
    fn unknown_weekday_rows_are_skipped() {
        let model = OpeningHourModel {
            id: Uuid::new_v4(),
            cafe_id: Uuid::new_v4(),
            day_of_week: "Someday".into(),
            open_time: t(8, 0),
            close_time: t(17, 0),
            is_closed: false,
            is_open_24_hours: false,
            is_everyday_open: false,
        };
        assert!(opening_hour_from_entity(model.clone()).is_none());

        let model = OpeningHourModel {
            day_of_week: "monday".into(),
            ..model
        };
        let hour = opening_hour_from_entity(model).unwrap();
        assert_eq!(hour.day_of_week, DayOfWeek::Monday);
    }
}
