use mango_store_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_shipping_rates(&pool).await?;
    seed_coupons(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_shipping_rates(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let rates = vec![
        ("Maharashtra", 100),
        ("Tamil Nadu", 80),
        ("Karnataka", 90),
        ("Kerala", 110),
        ("Gujarat", 120),
        ("Delhi", 140),
    ];

    for (state, charge) in rates {
        sqlx::query(
            r#"
            INSERT INTO shipping_rates (id, state, charge)
            VALUES ($1, $2, $3)
            ON CONFLICT (state) DO UPDATE SET charge = EXCLUDED.charge
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(state)
        .bind(charge as i64)
        .execute(pool)
        .await?;
    }

    println!("Seeded shipping rates");
    Ok(())
}

async fn seed_coupons(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (code, type, value, min_order, max_discount)
    let coupons: Vec<(&str, &str, i64, i64, Option<i64>)> = vec![
        ("MANGO10", "percentage", 10, 0, Some(40)),
        ("SEASON20", "percentage", 20, 500, Some(200)),
        ("FLAT50", "fixed", 50, 300, None),
    ];

    for (code, discount_type, value, min_order, max_discount) in coupons {
        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_type, discount_value, min_order_value, max_discount_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(discount_type)
        .bind(value)
        .bind(min_order)
        .bind(max_discount)
        .execute(pool)
        .await?;
    }

    println!("Seeded coupons");
    Ok(())
}
