use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::{
        Users,
        users::{self, ActiveModel, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service::hash_password,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(users::Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let found = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("User", user_from_entity(found), None))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let email = normalize_email(&payload.email)?;
    validate_password(&payload.password)?;
    let role = validate_role(payload.role.as_deref().unwrap_or(ROLE_ADMIN))?;
    ensure_email_free(state, &email, None).await?;

    let now = Utc::now().fixed_offset();
    let created = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(payload.name.filter(|n| !n.trim().is_empty())),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await
    .map_err(AppError::on_unique_violation("Email is already taken"))?;

    tracing::info!(user_id = %created.id, role = %created.role, "user created");
    audit::record(
        &state.pool,
        user.user_id,
        "user_create",
        "users",
        serde_json::json!({ "user_id": created.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(email) = payload.email.as_deref().filter(|e| !e.trim().is_empty()) {
        let email = normalize_email(email)?;
        ensure_email_free(state, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(name) = payload.name {
        active.name = Set(Some(name).filter(|n| !n.trim().is_empty()));
    }
    if let Some(role) = payload.role.as_deref().filter(|r| !r.trim().is_empty()) {
        active.role = Set(validate_role(role)?);
    }
    if let Some(password) = payload.password.as_deref().filter(|p| !p.is_empty()) {
        validate_password(password)?;
        active.password_hash = Set(hash_password(password)?);
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// The last remaining account cannot be deleted.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let total = Users::find().count(&state.orm).await?;
    if total <= 1 {
        return Err(AppError::Forbidden);
    }

    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(user_id = %id, "user deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let taken = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(&state.orm)
        .await?;
    match taken {
        Some(u) if Some(u.id) != except => {
            Err(AppError::Conflict("Email is already taken".into()))
        }
        _ => Ok(()),
    }
}

/// `local@domain.tld` with no whitespace, lowercased.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .rsplit_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            }
            None => false,
        };
    if !valid {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_role(role: &str) -> AppResult<String> {
    let role = role.trim().to_lowercase();
    if role != ROLE_ADMIN && role != ROLE_USER {
        return Err(AppError::BadRequest(format!("Unknown role {role}")));
    }
    Ok(role)
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert_eq!(normalize_email(" Admin@Cafe.Local ").unwrap(), "admin@cafe.local");
        assert!(normalize_email("admin@cafe").is_err());
        assert!(normalize_email("@cafe.local").is_err());
        assert!(normalize_email("ad min@cafe.local").is_err());
        assert!(normalize_email("a@b@c.d").is_err());
        assert!(normalize_email("a@.d").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn roles() {
        assert_eq!(validate_role("Admin").unwrap(), "admin");
        assert_eq!(validate_role("user").unwrap(), "user");
        assert!(validate_role("owner").is_err());
    }
}
