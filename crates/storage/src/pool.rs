// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection pool setup and forward migration, run once at daemon startup.

use crate::error::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Thin wrapper around the pool so repositories take `&Store` instead of a raw pool,
/// giving us one seam to extend (e.g. metrics) without touching every repository.
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
}

impl Store {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Open (creating if absent) the SQLite database at `path`, enable foreign keys,
/// and run pending migrations forward. Returns a ready-to-use `Store`.
pub async fn connect(path: &Path) -> Result<Store, StorageError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .map_err(StorageError::System)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .map_err(StorageError::System)?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Store { pool })
}

/// In-memory store for tests: isolated per call, migrated the same way production is.
#[cfg(any(test, feature = "test-support"))]
pub async fn connect_in_memory() -> Result<Store, StorageError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(StorageError::System)?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .map_err(StorageError::System)?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Store { pool })
}
