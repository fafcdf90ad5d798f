// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository for `Connection` rows.

use crate::error::StorageError;
use crate::pool::Store;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use syncd_core::{Connection, ConnectionId};

#[derive(FromRow)]
struct ConnectionRow {
    id: String,
    name: String,
    r#type: String,
    encrypted_config: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConnectionRow> for Connection {
    type Error = StorageError;

    fn try_from(row: ConnectionRow) -> Result<Self, Self::Error> {
        Ok(Connection {
            id: row
                .id
                .parse()
                .map_err(|_| StorageError::InvalidInput(format!("bad connection id {:?}", row.id)))?,
            name: row.name,
            r#type: row.r#type,
            encrypted_config: row.encrypted_config,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct ConnectionRepo<'a> {
    store: &'a Store,
}

impl<'a> ConnectionRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, conn: &Connection) -> Result<(), StorageError> {
        let id = conn.id.to_string();
        sqlx::query(
            "INSERT INTO connections (id, name, type, encrypted_config, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&conn.name)
        .bind(&conn.r#type)
        .bind(&conn.encrypted_config)
        .bind(conn.created_at)
        .bind(conn.updated_at)
        .execute(self.store.pool())
        .await
        .map_err(|e| StorageError::from_insert("connection", &conn.name, e))?;
        Ok(())
    }

    pub async fn get(&self, id: ConnectionId) -> Result<Connection, StorageError> {
        let row: Option<ConnectionRow> =
            sqlx::query_as("SELECT id, name, type, encrypted_config, created_at, updated_at FROM connections WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(self.store.pool())
                .await?;
        row.ok_or_else(|| StorageError::NotFound { entity: "connection", id: id.to_string() })?
            .try_into()
    }

    pub async fn list(&self) -> Result<Vec<Connection>, StorageError> {
        let rows: Vec<ConnectionRow> = sqlx::query_as(
            "SELECT id, name, type, encrypted_config, created_at, updated_at FROM connections ORDER BY created_at",
        )
        .fetch_all(self.store.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Atomic rename/retype: the UNIQUE index re-checks name uniqueness for us.
    pub async fn update(&self, conn: &Connection) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE connections SET name = ?, type = ?, encrypted_config = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&conn.name)
        .bind(&conn.r#type)
        .bind(&conn.encrypted_config)
        .bind(conn.updated_at)
        .bind(conn.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(|e| StorageError::from_insert("connection", &conn.name, e))?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "connection", id: conn.id.to_string() });
        }
        Ok(())
    }

    /// Deletes the Connection; `ON DELETE CASCADE` takes its Tasks, Jobs, and
    /// JobLogs with it in the same transaction (SQLite enforces this at the
    /// storage layer once `PRAGMA foreign_keys = ON` is set — see `pool::connect`).
    pub async fn delete(&self, id: ConnectionId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id.to_string())
            .execute(self.store.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "connection", id: id.to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::connect_in_memory;
    use syncd_core::test_support::ConnectionBuilder;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = connect_in_memory().await.unwrap();
        let repo = ConnectionRepo::new(&store);
        let conn = ConnectionBuilder::new("local1").build();
        repo.create(&conn).await.unwrap();
        let fetched = repo.get(conn.id).await.unwrap();
        assert_eq!(fetched.name, conn.name);
        assert_eq!(fetched.r#type, conn.r#type);
    }

    #[tokio::test]
    async fn duplicate_name_is_already_exists() {
        let store = connect_in_memory().await.unwrap();
        let repo = ConnectionRepo::new(&store);
        repo.create(&ConnectionBuilder::new("dup").build()).await.unwrap();
        let err = repo.create(&ConnectionBuilder::new("dup").build()).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = connect_in_memory().await.unwrap();
        let repo = ConnectionRepo::new(&store);
        let err = repo.get(syncd_core::ConnectionId::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_rechecks_name_uniqueness() {
        let store = connect_in_memory().await.unwrap();
        let repo = ConnectionRepo::new(&store);
        let a = ConnectionBuilder::new("a").build();
        let mut b = ConnectionBuilder::new("b").build();
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();
        b.name = "a".to_string();
        let err = repo.update(&b).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn delete_cascades_to_tasks_jobs_and_logs() {
        let store = connect_in_memory().await.unwrap();
        let conn_repo = ConnectionRepo::new(&store);
        let task_repo = crate::TaskRepo::new(&store);
        let job_repo = crate::JobRepo::new(&store);
        let log_repo = crate::JobLogRepo::new(&store);

        let conn = ConnectionBuilder::new("c1").build();
        conn_repo.create(&conn).await.unwrap();
        let task = syncd_core::test_support::TaskBuilder::new("t1", conn.id).build();
        task_repo.create(&task).await.unwrap();
        let job = syncd_core::test_support::pending_job(task.id);
        job_repo.create(&job).await.unwrap();
        let log = syncd_core::test_support::job_log(job.id, syncd_core::JobLogWhat::Upload, 10);
        log_repo.append_batch(&[log]).await.unwrap();

        conn_repo.delete(conn.id).await.unwrap();

        assert!(task_repo.get(task.id).await.is_err());
        assert!(job_repo.get(job.id).await.is_err());
        assert_eq!(log_repo.list_for_job(job.id).await.unwrap().len(), 0);
    }
}
