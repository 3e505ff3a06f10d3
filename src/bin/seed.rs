use chrono::NaiveTime;
use uuid::Uuid;
use wfc_jogja_api::{
    config::AppConfig,
    db::{create_orm_conn, pool_of, run_migrations},
    opening_hours::DayOfWeek,
    services::auth_service::hash_password,
};

const FACILITIES: &[(&str, &str, &str)] = &[
    ("wifi", "WiFi", "wifi"),
    ("power_outlet", "Power Outlet", "plug"),
    ("toilet", "Toilet", "toilet"),
    ("musholla", "Musholla", "mosque"),
    ("ac", "Air Conditioning", "snowflake"),
    ("smoking_area", "Smoking Area", "cigarette"),
];

const PAYMENT_METHODS: &[(&str, &str)] = &[("cash", "Cash"), ("qris", "QRIS"), ("debit", "Debit")];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let pool = pool_of(&orm);

    let admin_id = ensure_admin(&pool, "admin@cafe.local", "admin123").await?;
    let facility_ids = seed_facilities(&pool).await?;
    let payment_ids = seed_payment_methods(&pool).await?;
    let cafe_id = seed_cafe(&pool, &facility_ids, &payment_ids).await?;

    println!("Seed completed. Admin ID: {admin_id}, Cafe ID: {cafe_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, 'admin')
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind("Admin")
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(row.0)
}

async fn seed_facilities(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(FACILITIES.len());
    for &(code, label, icon) in FACILITIES {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO facilities (id, code, label, icon)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE SET label = EXCLUDED.label
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(label)
        .bind(icon)
        .fetch_one(pool)
        .await?;
        ids.push(row.0);
    }

    println!("Seeded {} facilities", ids.len());
    Ok(ids)
}

async fn seed_payment_methods(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(PAYMENT_METHODS.len());
    for &(code, label) in PAYMENT_METHODS {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO payment_methods (id, code, label)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO UPDATE SET label = EXCLUDED.label
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(label)
        .fetch_one(pool)
        .await?;
        ids.push(row.0);
    }

    println!("Seeded {} payment methods", ids.len());
    Ok(ids)
}

async fn seed_cafe(
    pool: &sqlx::PgPool,
    facility_ids: &[Uuid],
    payment_ids: &[Uuid],
) -> anyhow::Result<Uuid> {
    let (cafe_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO cafes (id, slug, name, address, latitude, longitude, parking,
                           price_min, price_max, price_range, instagram_username)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("blanco-coffee-books")
    .bind("Blanco Coffee & Books")
    .bind("Jl. Kranggan No.30, Cokrodiningratan, Jetis, Yogyakarta")
    .bind(-7.7956_f64)
    .bind(110.3695_f64)
    .bind("Motor, Mobil")
    .bind(20_000_i32)
    .bind(50_000_i32)
    .bind("Rp20k - Rp50k")
    .bind("blancocoffeebooks")
    .fetch_one(pool)
    .await?;

    for facility_id in facility_ids {
        sqlx::query(
            "INSERT INTO cafe_facilities (cafe_id, facility_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(cafe_id)
        .bind(facility_id)
        .execute(pool)
        .await?;
    }

    for payment_method_id in payment_ids {
        sqlx::query(
            "INSERT INTO cafe_payment_methods (cafe_id, payment_method_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(cafe_id)
        .bind(payment_method_id)
        .execute(pool)
        .await?;
    }

    let open = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
    let close = NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN);
    for day in DayOfWeek::ALL {
        sqlx::query(
            r#"
            INSERT INTO opening_hours (id, cafe_id, day_of_week, open_time, close_time,
                                       is_closed, is_open_24_hours, is_everyday_open)
            VALUES ($1, $2, $3, $4, $5, FALSE, FALSE, TRUE)
            ON CONFLICT (cafe_id, day_of_week) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cafe_id)
        .bind(day.as_str())
        .bind(open)
        .bind(close)
        .execute(pool)
        .await?;
    }

    println!("Seeded cafe Blanco Coffee & Books");
    Ok(cafe_id)
}
