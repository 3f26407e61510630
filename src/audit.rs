use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Record a checkout-flow event. Callers treat failures here as secondary:
/// they log a warning and carry on.
pub async fn record_event(
    pool: &DbPool,
    user_id: Option<Uuid>,
    event: &str,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, user_id, event, metadata)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(event)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}
