//! Locally-toggled status overrides.
//!
//! Overrides remember status changes made through the assistant so a
//! cached catalog shows them before the next refresh. They are layered on
//! reads only; write decisions always re-validate against the platform.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};

use ads_client::{AdObject, ObjectStatus};

use crate::catalog::{status_from_str, status_to_str};
use crate::error::Result;

/// Create or update a status override.
pub async fn upsert_override(
    pool: &SqlitePool,
    account_id: &str,
    object_id: &str,
    status: ObjectStatus,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO status_overrides (account_id, object_id, status)
        VALUES (?, ?, ?)
        ON CONFLICT(account_id, object_id) DO UPDATE SET
            status = excluded.status,
            updated_at = datetime('now')
        "#,
    )
    .bind(account_id)
    .bind(object_id)
    .bind(status_to_str(status))
    .execute(pool)
    .await?;

    Ok(())
}

/// Get all overrides for an account as an object-id -> status map.
pub async fn get_overrides(
    pool: &SqlitePool,
    account_id: &str,
) -> Result<HashMap<String, ObjectStatus>> {
    let rows = sqlx::query(
        r#"
        SELECT object_id, status
        FROM status_overrides
        WHERE account_id = ?
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let object_id: String = row.get("object_id");
        let status = status_from_str(row.get("status"))?;
        map.insert(object_id, status);
    }

    Ok(map)
}

/// Drop overrides for objects no longer present in the refreshed catalog.
pub async fn prune(pool: &SqlitePool, account_id: &str, objects: &[AdObject]) -> Result<()> {
    let existing = get_overrides(pool, account_id).await?;

    for object_id in existing.keys() {
        if !objects.iter().any(|o| &o.id == object_id) {
            sqlx::query(
                "DELETE FROM status_overrides WHERE account_id = ? AND object_id = ?",
            )
            .bind(account_id)
            .bind(object_id)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// Clear all overrides for an account.
pub async fn clear(pool: &SqlitePool, account_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM status_overrides WHERE account_id = ?")
        .bind(account_id)
        .execute(pool)
        .await?;

    Ok(())
}
