//! SQLite cache for advertising-object catalogs.
//!
//! The store is best-effort: it holds the last-fetched catalog per account
//! and a map of locally-toggled statuses. It is read opportunistically
//! before any network fetch and written after every successful fetch or
//! mutation, but it is never treated as a source of truth for a write
//! decision - correctness depends on re-fetch, not on cache freshness.
//!
//! # Example
//!
//! ```no_run
//! use catalog_store::CatalogStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = CatalogStore::connect("sqlite:assistant.db?mode=rwc").await?;
//!     store.migrate().await?;
//!
//!     let cached = store.get_catalog("act_123").await?;
//!     println!("{} cached objects", cached.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod overrides;

pub use error::{Result, StoreError};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use ads_client::{AdObject, ObjectStatus};

/// Catalog store connection wrapper.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Default pool size. The store only ever sees one logical writer, but
    /// reads can overlap with an in-flight refresh.
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database.
    ///
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(Self::DEFAULT_POOL_SIZE)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to catalog store: {}", url);

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the cached catalog for an account, with local status overrides
    /// applied on top.
    pub async fn get_catalog(&self, account_id: &str) -> Result<Vec<AdObject>> {
        let mut objects = catalog::get_catalog(&self.pool, account_id).await?;
        let overrides = overrides::get_overrides(&self.pool, account_id).await?;

        for object in &mut objects {
            if let Some(status) = overrides.get(&object.id) {
                object.status = *status;
            }
        }

        Ok(objects)
    }

    /// Replace the cached catalog for an account wholesale.
    ///
    /// Called after every successful fetch; stale override entries for
    /// objects no longer present are dropped at the same time.
    pub async fn replace_catalog(&self, account_id: &str, objects: &[AdObject]) -> Result<()> {
        catalog::replace_catalog(&self.pool, account_id, objects).await?;
        overrides::prune(&self.pool, account_id, objects).await?;
        Ok(())
    }

    /// Record a locally-applied status toggle.
    pub async fn record_toggle(
        &self,
        account_id: &str,
        object_id: &str,
        status: ObjectStatus,
    ) -> Result<()> {
        overrides::upsert_override(&self.pool, account_id, object_id, status).await
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ads_client::ObjectKind;

    async fn test_store() -> CatalogStore {
        let store = CatalogStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn campaign(id: &str, name: &str, status: ObjectStatus) -> AdObject {
        AdObject {
            id: id.to_string(),
            name: name.to_string(),
            kind: ObjectKind::Campaign,
            status,
        }
    }

    #[tokio::test]
    async fn test_replace_and_get_catalog() {
        let store = test_store().await;

        let objects = vec![
            campaign("c1", "Summer sale", ObjectStatus::Active),
            campaign("c2", "Winter promo", ObjectStatus::Paused),
        ];
        store.replace_catalog("act_1", &objects).await.unwrap();

        let cached = store.get_catalog("act_1").await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].name, "Summer sale");
    }

    #[tokio::test]
    async fn test_overrides_layered_on_read() {
        let store = test_store().await;

        let objects = vec![campaign("c1", "Summer sale", ObjectStatus::Active)];
        store.replace_catalog("act_1", &objects).await.unwrap();
        store
            .record_toggle("act_1", "c1", ObjectStatus::Paused)
            .await
            .unwrap();

        let cached = store.get_catalog("act_1").await.unwrap();
        assert_eq!(cached[0].status, ObjectStatus::Paused);
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let store = test_store().await;

        store
            .replace_catalog("act_1", &[campaign("c1", "Old", ObjectStatus::Active)])
            .await
            .unwrap();
        store
            .replace_catalog("act_1", &[campaign("c2", "New", ObjectStatus::Active)])
            .await
            .unwrap();

        let cached = store.get_catalog("act_1").await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "c2");
    }

    #[tokio::test]
    async fn test_accounts_are_isolated() {
        let store = test_store().await;

        store
            .replace_catalog("act_1", &[campaign("c1", "One", ObjectStatus::Active)])
            .await
            .unwrap();
        store
            .replace_catalog("act_2", &[campaign("c2", "Two", ObjectStatus::Active)])
            .await
            .unwrap();

        assert_eq!(store.get_catalog("act_1").await.unwrap().len(), 1);
        assert_eq!(store.get_catalog("act_2").await.unwrap()[0].id, "c2");
    }

    #[tokio::test]
    async fn test_refresh_prunes_stale_overrides() {
        let store = test_store().await;

        store
            .replace_catalog("act_1", &[campaign("c1", "One", ObjectStatus::Active)])
            .await
            .unwrap();
        store
            .record_toggle("act_1", "c1", ObjectStatus::Paused)
            .await
            .unwrap();

        // c1 disappears from the account; its override must not linger
        store
            .replace_catalog("act_1", &[campaign("c2", "Two", ObjectStatus::Active)])
            .await
            .unwrap();

        let overrides = overrides::get_overrides(store.pool(), "act_1").await.unwrap();
        assert!(overrides.is_empty());
    }
}
