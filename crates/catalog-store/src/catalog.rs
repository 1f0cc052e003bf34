//! Cached catalog rows.

use sqlx::{Row, SqlitePool};

use ads_client::{AdObject, ObjectKind, ObjectStatus};

use crate::error::{Result, StoreError};

fn kind_to_str(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Campaign => "campaign",
        ObjectKind::AdSet => "ad_set",
        ObjectKind::Ad => "ad",
    }
}

fn kind_from_str(s: &str) -> Result<ObjectKind> {
    match s {
        "campaign" => Ok(ObjectKind::Campaign),
        "ad_set" => Ok(ObjectKind::AdSet),
        "ad" => Ok(ObjectKind::Ad),
        other => Err(StoreError::CorruptRow(format!("unknown kind: {}", other))),
    }
}

pub(crate) fn status_to_str(status: ObjectStatus) -> &'static str {
    match status {
        ObjectStatus::Active => "ACTIVE",
        ObjectStatus::Paused => "PAUSED",
    }
}

pub(crate) fn status_from_str(s: &str) -> Result<ObjectStatus> {
    match s {
        "ACTIVE" => Ok(ObjectStatus::Active),
        "PAUSED" => Ok(ObjectStatus::Paused),
        other => Err(StoreError::CorruptRow(format!("unknown status: {}", other))),
    }
}

/// Get the cached catalog rows for an account, without overrides applied.
pub async fn get_catalog(pool: &SqlitePool, account_id: &str) -> Result<Vec<AdObject>> {
    let rows = sqlx::query(
        r#"
        SELECT object_id, name, kind, status
        FROM catalog_items
        WHERE account_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(AdObject {
                id: row.get("object_id"),
                name: row.get("name"),
                kind: kind_from_str(row.get("kind"))?,
                status: status_from_str(row.get("status"))?,
            })
        })
        .collect()
}

/// Replace an account's cached catalog wholesale.
pub async fn replace_catalog(
    pool: &SqlitePool,
    account_id: &str,
    objects: &[AdObject],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM catalog_items WHERE account_id = ?")
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

    for object in objects {
        sqlx::query(
            r#"
            INSERT INTO catalog_items (account_id, object_id, name, kind, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(&object.id)
        .bind(&object.name)
        .bind(kind_to_str(object.kind))
        .bind(status_to_str(object.status))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        "Replaced catalog for {} ({} objects)",
        account_id,
        objects.len()
    );
    Ok(())
}
