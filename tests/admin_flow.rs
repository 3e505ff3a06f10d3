use std::path::PathBuf;

use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, Set};
use uuid::Uuid;
use wfc_jogja_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::LoginRequest,
        cafes::{CafeSearchQuery, CafeStatusQuery, CreateCafeRequest, UpdateCafeRequest},
        catalog::{
            CafePaymentMethodRequest, CreateFacilityRequest, CreatePaymentMethodRequest,
            ReplaceCafeFacilitiesRequest,
        },
        favorites::AddFavoriteRequest,
        images::{CreateCafeImageRequest, SetMainImageRequest},
        opening_hours::{CreateOpeningHourRequest, EverydayHoursRequest},
        users::CreateUserRequest,
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    favorites::FavoriteSet,
    middleware::auth::{AuthUser, verify_token},
    opening_hours::{DayOfWeek, StatusReason},
    routes::params::Pagination,
    services::{
        admin_service, auth_service, cafe_service, facility_service, favorite_service,
        image_service, opening_hour_service, payment_method_service, user_service,
    },
    state::AppState,
};

const JWT_SECRET: &str = "test-secret";

// Admin curates a cafe end to end; a visitor finds it, checks hours and favorites it.
#[tokio::test]
async fn curate_cafe_then_search_and_favorite() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let suffix = Uuid::new_v4().simple().to_string();
    let admin_email = format!("admin-{suffix}@cafe.local");
    let admin_id = create_user(&state, &admin_email, "admin").await?;
    let visitor_id = create_user(&state, &format!("visitor-{suffix}@cafe.local"), "user").await?;
    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let visitor = AuthUser {
        user_id: visitor_id,
        role: "user".into(),
    };

    // Login issues a token for the stored role.
    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: admin_email.to_uppercase(),
            password: "password123".into(),
        },
    )
    .await?
    .data
    .expect("login data");
    let claims = verify_token(JWT_SECRET, &login.token)?;
    assert_eq!(claims.user_id, admin_id);
    assert!(claims.is_admin());

    let bad_login = auth_service::login_user(
        &state,
        LoginRequest {
            email: admin_email.clone(),
            password: "wrong-password".into(),
        },
    )
    .await;
    assert!(matches!(bad_login, Err(AppError::BadRequest(_))));

    // Catalog.
    let wifi = facility_service::create_facility(
        &state,
        &admin,
        CreateFacilityRequest {
            code: format!("wifi-{suffix}"),
            label: "WiFi".into(),
            icon: Some("wifi".into()),
        },
    )
    .await?
    .data
    .expect("facility");
    let duplicate = facility_service::create_facility(
        &state,
        &admin,
        CreateFacilityRequest {
            code: wifi.code.clone(),
            label: "WiFi again".into(),
            icon: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let qris = payment_method_service::create_payment_method(
        &state,
        &admin,
        CreatePaymentMethodRequest {
            code: format!("qris-{suffix}"),
            label: "QRIS".into(),
        },
    )
    .await?
    .data
    .expect("payment method");

    // Visitors cannot curate.
    let forbidden = cafe_service::create_cafe(&state, &visitor, cafe_request(&suffix, vec![])).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let unknown_facility =
        cafe_service::create_cafe(&state, &admin, cafe_request(&suffix, vec![Uuid::new_v4()])).await;
    assert!(matches!(unknown_facility, Err(AppError::BadRequest(_))));

    let cafe = cafe_service::create_cafe(&state, &admin, cafe_request(&suffix, vec![wifi.id]))
        .await?
        .data
        .expect("cafe");
    let cafe_id = cafe.cafe.id;
    assert_eq!(cafe.cafe.slug, format!("blanco-coffee-books-{suffix}"));
    assert_eq!(cafe.cafe.facilities.len(), 1);
    assert!(cafe.opening_hours.is_empty());

    let slug_taken = cafe_service::create_cafe(&state, &admin, cafe_request(&suffix, vec![])).await;
    assert!(matches!(slug_taken, Err(AppError::Conflict(_))));

    payment_method_service::link_cafe_payment_method(
        &state,
        &admin,
        CafePaymentMethodRequest {
            cafe_id,
            payment_method_id: qris.id,
        },
    )
    .await?;
    let relink = payment_method_service::link_cafe_payment_method(
        &state,
        &admin,
        CafePaymentMethodRequest {
            cafe_id,
            payment_method_id: qris.id,
        },
    )
    .await;
    assert!(matches!(relink, Err(AppError::Conflict(_))));

    // Overnight Monday hours, checked late Monday evening.
    opening_hour_service::create_opening_hour(
        &state,
        &admin,
        CreateOpeningHourRequest {
            cafe_id,
            day_of_week: DayOfWeek::Monday,
            open_time: Some("18:00".into()),
            close_time: Some("02:00".into()),
            is_closed: false,
            is_open_24_hours: false,
            is_everyday_open: false,
        },
    )
    .await?;
    let status = cafe_service::cafe_status(&state, cafe_id, status_query("2026-10-19T23:00"))
        .await?
        .data
        .expect("status");
    assert!(status.is_open);
    assert_eq!(status.today, DayOfWeek::Monday);
    assert_eq!(status.hours.len(), 7);
    assert_eq!(status.hours[0].display, "18:00 - 02:00");
    assert_eq!(status.hours[1].display, "-");

    let tuesday = cafe_service::cafe_status(&state, cafe_id, status_query("2026-10-20T12:00"))
        .await?
        .data
        .expect("status");
    assert_eq!(tuesday.reason, StatusReason::ClosedToday);

    let bad_time = cafe_service::cafe_status(&state, cafe_id, status_query("tonight")).await;
    assert!(matches!(bad_time, Err(AppError::BadRequest(_))));

    // Same hours every day overwrites Monday and fills the rest.
    let week = opening_hour_service::apply_everyday(
        &state,
        &admin,
        EverydayHoursRequest {
            cafe_id,
            open_time: Some("09:00".into()),
            close_time: Some("23:00".into()),
            is_open_24_hours: false,
        },
    )
    .await?
    .data
    .expect("hours");
    assert_eq!(week.items.len(), 7);
    assert!(week.items.iter().all(|h| h.is_everyday_open && !h.is_closed));

    // Images and main image.
    let image = image_service::create_image(
        &state,
        &admin,
        CreateCafeImageRequest {
            cafe_id,
            image_url: "/uploads/1700000000000-front.jpg".into(),
            alt: Some("Front".into()),
        },
    )
    .await?
    .data
    .expect("image");
    image_service::set_main_image(
        &state,
        &admin,
        SetMainImageRequest {
            cafe_id,
            image_id: image.id,
        },
    )
    .await?;

    // Partial update keeps what it does not mention.
    let updated = cafe_service::update_cafe(
        &state,
        &admin,
        cafe_id,
        UpdateCafeRequest {
            parking: Some("Motor".into()),
            ..UpdateCafeRequest::default()
        },
    )
    .await?
    .data
    .expect("cafe");
    assert_eq!(updated.cafe.parking.as_deref(), Some("Motor"));
    assert_eq!(updated.cafe.main_image_id, Some(image.id));
    assert_eq!(updated.cafe.payment_methods.len(), 1);

    // Visitor search near Tugu with the wifi filter.
    let found = cafe_service::search_cafes(
        &state,
        CafeSearchQuery {
            q: Some(suffix.clone()),
            facility_ids: Some(wifi.id.to_string()),
            lat: Some(-7.7829),
            lng: Some(110.3671),
        },
    )
    .await?
    .data
    .expect("listings");
    assert_eq!(found.items.len(), 1);
    assert!(found.items[0].distance_km.is_some());

    // Favorites.
    let fav = favorite_service::add_favorite(&state, &visitor, AddFavoriteRequest { cafe_id })
        .await?
        .data
        .expect("favorite");
    assert!(fav.is_favorite);
    let listed = favorite_service::list_favorites(&state, &visitor)
        .await?
        .data
        .expect("favorites");
    assert_eq!(listed.items.len(), 1);
    let toggled = favorite_service::toggle_favorite(&state, &visitor, cafe_id)
        .await?
        .data
        .expect("favorite");
    assert!(!toggled.is_favorite);
    let gone = favorite_service::remove_favorite(&state, &visitor, cafe_id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    // Deleting the main image clears the pointer.
    image_service::delete_image(&state, &admin, image.id).await?;
    let detail = cafe_service::get_cafe(&state, cafe_id).await?.data.expect("cafe");
    assert_eq!(detail.cafe.main_image_id, None);
    assert!(detail.cafe.images.is_empty());

    cafe_service::delete_cafe(&state, &admin, cafe_id).await?;
    let missing = cafe_service::get_cafe(&state, cafe_id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    Ok(())
}

// Account rules, dashboard counts and whole-set writes, in a private schema
// so the account count is known.
#[tokio::test]
async fn account_rules_counts_and_replacements() -> anyhow::Result<()> {
    let Some((state, schema)) = setup_isolated_state().await? else {
        return Ok(());
    };
    let outcome = account_rules_counts_and_replacements_in(&state).await;
    drop_schema(&schema).await?;
    outcome
}

async fn account_rules_counts_and_replacements_in(state: &AppState) -> anyhow::Result<()> {
    let owner_id = create_user(state, "owner@cafe.local", "admin").await?;
    let owner = AuthUser {
        user_id: owner_id,
        role: "admin".into(),
    };
    let visitor = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };

    let empty = admin_service::stats(state, &owner).await?.data.expect("stats");
    assert_eq!(
        (empty.cafes, empty.facilities, empty.payment_methods, empty.users),
        (0, 0, 0, 1)
    );
    let hidden = admin_service::stats(state, &visitor).await;
    assert!(matches!(hidden, Err(AppError::Forbidden)));

    // The only account cannot be deleted.
    let last = user_service::delete_user(state, &owner, owner_id).await;
    assert!(matches!(last, Err(AppError::Forbidden)));

    let editor = user_service::create_user(
        state,
        &owner,
        CreateUserRequest {
            email: " Editor@Cafe.Local ".into(),
            name: Some("Editor".into()),
            password: "password123".into(),
            role: None,
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(editor.email, "editor@cafe.local");
    assert_eq!(editor.role, "admin");

    let taken = user_service::create_user(
        state,
        &owner,
        CreateUserRequest {
            email: "editor@cafe.local".into(),
            name: None,
            password: "password123".into(),
            role: Some("user".into()),
        },
    )
    .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    let listed = user_service::list_users(state, &owner, Pagination::default()).await?;
    assert_eq!(listed.meta.and_then(|m| m.total), Some(2));

    user_service::delete_user(state, &owner, editor.id).await?;
    let last_again = user_service::delete_user(state, &owner, owner_id).await;
    assert!(matches!(last_again, Err(AppError::Forbidden)));

    // Replacing a cafe's facilities drops every link not in the new list.
    let mut facility_ids = Vec::new();
    for code in ["wifi", "power_outlet", "toilet"] {
        let facility = facility_service::create_facility(
            state,
            &owner,
            CreateFacilityRequest {
                code: code.into(),
                label: code.into(),
                icon: None,
            },
        )
        .await?
        .data
        .expect("facility");
        facility_ids.push(facility.id);
    }
    let cafe = cafe_service::create_cafe(state, &owner, cafe_request("iso", facility_ids[..2].to_vec()))
        .await?
        .data
        .expect("cafe");
    let cafe_id = cafe.cafe.id;
    assert_eq!(cafe.cafe.facilities.len(), 2);

    let replaced = facility_service::replace_cafe_facilities(
        state,
        &owner,
        ReplaceCafeFacilitiesRequest {
            cafe_id,
            facility_ids: vec![facility_ids[2]],
        },
    )
    .await?
    .data
    .expect("facilities");
    let ids: Vec<Uuid> = replaced.items.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![facility_ids[2]]);

    let unknown = facility_service::replace_cafe_facilities(
        state,
        &owner,
        ReplaceCafeFacilitiesRequest {
            cafe_id,
            facility_ids: vec![Uuid::new_v4()],
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let cleared = facility_service::replace_cafe_facilities(
        state,
        &owner,
        ReplaceCafeFacilitiesRequest {
            cafe_id,
            facility_ids: Vec::new(),
        },
    )
    .await?
    .data
    .expect("facilities");
    assert!(cleared.items.is_empty());
    let detail = cafe_service::get_cafe(state, cafe_id).await?.data.expect("cafe");
    assert!(detail.cafe.facilities.is_empty());

    // One row per day: a second Monday is a conflict, also when two creates race.
    let monday = || CreateOpeningHourRequest {
        cafe_id,
        day_of_week: DayOfWeek::Monday,
        open_time: Some("08:00".into()),
        close_time: Some("22:00".into()),
        is_closed: false,
        is_open_24_hours: false,
        is_everyday_open: false,
    };
    opening_hour_service::create_opening_hour(state, &owner, monday()).await?;
    let again = opening_hour_service::create_opening_hour(state, &owner, monday()).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let tuesday = || CreateOpeningHourRequest {
        day_of_week: DayOfWeek::Tuesday,
        ..monday()
    };
    let (first, second) = tokio::join!(
        opening_hour_service::create_opening_hour(state, &owner, tuesday()),
        opening_hour_service::create_opening_hour(state, &owner, tuesday()),
    );
    let created = [&first, &second].iter().filter(|r| r.is_ok()).count();
    let conflicts = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!((created, conflicts), (1, 1));

    // Concurrent favorite sets for one user keep both additions.
    let second_cafe = cafe_service::create_cafe(state, &owner, cafe_request("iso-2", Vec::new()))
        .await?
        .data
        .expect("cafe")
        .cafe
        .id;
    let store = state.favorite_store();
    let mut tab_one = FavoriteSet::load(&store, owner_id).await?;
    let mut tab_two = FavoriteSet::load(&store, owner_id).await?;
    tab_one.add(cafe_id);
    tab_two.add(second_cafe);
    tab_two.add(cafe_id);
    tab_one.save(&store).await?;
    tab_two.save(&store).await?;
    let saved = FavoriteSet::load(&store, owner_id).await?;
    assert_eq!(saved.ids().len(), 2);
    assert!(saved.contains(cafe_id) && saved.contains(second_cafe));

    let counted = admin_service::stats(state, &owner).await?.data.expect("stats");
    assert_eq!(
        (counted.cafes, counted.facilities, counted.payment_methods, counted.users),
        (2, 3, 0, 1)
    );

    Ok(())
}

fn cafe_request(suffix: &str, facility_ids: Vec<Uuid>) -> CreateCafeRequest {
    CreateCafeRequest {
        name: format!("Blanco Coffee & Books {suffix}"),
        slug: None,
        address: "Jl. Kranggan No.30, Yogyakarta".into(),
        latitude: Some(-7.7956),
        longitude: Some(110.3695),
        google_maps_url: None,
        instagram_url: None,
        instagram_username: Some("blancocoffeebooks".into()),
        parking: Some("Motor, Mobil".into()),
        price_min: Some(20_000),
        price_max: Some(50_000),
        price_range: None,
        facility_ids,
        payment_method_ids: Vec::new(),
    }
}

fn status_query(at: &str) -> CafeStatusQuery {
    CafeStatusQuery {
        at: Some(at.into()),
        lang: None,
    }
}

fn database_url() -> Option<String> {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok();
    if url.is_none() {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run DB-backed tests.");
    }
    url
}

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        upload_dir: PathBuf::from("target/test-uploads"),
        cors_origin: None,
    }
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let Some(database_url) = database_url() else {
        return Ok(None);
    };
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    Ok(Some(AppState::new(orm, test_config(database_url))))
}

/// State bound to a fresh schema, so row counts start from zero. Returns the
/// schema name for cleanup.
async fn setup_isolated_state() -> anyhow::Result<Option<(AppState, String)>> {
    let Some(database_url) = database_url() else {
        return Ok(None);
    };
    let schema = format!("it_{}", Uuid::new_v4().simple());
    let admin = create_orm_conn(&database_url).await?;
    admin
        .execute_unprepared(&format!("CREATE SCHEMA \"{schema}\""))
        .await?;

    let mut options = ConnectOptions::new(database_url.clone());
    options.set_schema_search_path(schema.clone());
    let orm = Database::connect(options).await?;
    run_migrations(&orm).await?;
    Ok(Some((AppState::new(orm, test_config(database_url)), schema)))
}

async fn drop_schema(schema: &str) -> anyhow::Result<()> {
    if let Some(database_url) = database_url() {
        let admin = create_orm_conn(&database_url).await?;
        admin
            .execute_unprepared(&format!("DROP SCHEMA IF EXISTS \"{schema}\" CASCADE"))
            .await?;
    }
    Ok(())
}

async fn create_user(state: &AppState, email: &str, role: &str) -> anyhow::Result<Uuid> {
    let now = chrono::Utc::now().fixed_offset();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(None),
        password_hash: Set(auth_service::hash_password("password123")?),
        role: Set(role.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;
    Ok(user.id)
}
