// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository for `Task` rows.

use crate::codec::{direction_from_str, direction_to_str};
use crate::error::StorageError;
use crate::pool::Store;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use syncd_core::{ConnectionId, Task, TaskId, TaskOptions};

#[derive(FromRow)]
struct TaskRow {
    id: String,
    name: String,
    source_path: String,
    connection_id: String,
    remote_path: String,
    direction: String,
    schedule: String,
    realtime: bool,
    options_json: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StorageError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let options: TaskOptions = serde_json::from_str(&row.options_json)
            .map_err(|e| StorageError::InvalidInput(format!("bad options_json: {e}")))?;
        Ok(Task {
            id: row.id.parse().map_err(|_| StorageError::InvalidInput(format!("bad task id {:?}", row.id)))?,
            name: row.name,
            source_path: row.source_path.into(),
            connection_id: row
                .connection_id
                .parse()
                .map_err(|_| StorageError::InvalidInput(format!("bad connection id {:?}", row.connection_id)))?,
            remote_path: row.remote_path,
            direction: direction_from_str(&row.direction)?,
            schedule: row.schedule,
            realtime: row.realtime,
            options,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct TaskRepo<'a> {
    store: &'a Store,
}

impl<'a> TaskRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, task: &Task) -> Result<(), StorageError> {
        let options_json = serde_json::to_string(&task.options)
            .map_err(|e| StorageError::InvalidInput(format!("bad options: {e}")))?;
        sqlx::query(
            "INSERT INTO tasks (id, name, source_path, connection_id, remote_path, direction, schedule, realtime, options_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(&task.name)
        .bind(task.source_path.to_string_lossy().to_string())
        .bind(task.connection_id.to_string())
        .bind(&task.remote_path)
        .bind(direction_to_str(task.direction))
        .bind(&task.schedule)
        .bind(task.realtime)
        .bind(options_json)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(self.store.pool())
        .await
        .map_err(|e| StorageError::from_insert("task", &task.name, e))?;
        Ok(())
    }

    pub async fn get(&self, id: TaskId) -> Result<Task, StorageError> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, name, source_path, connection_id, remote_path, direction, schedule, realtime, options_json, created_at, updated_at
             FROM tasks WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.store.pool())
        .await?;
        row.ok_or_else(|| StorageError::NotFound { entity: "task", id: id.to_string() })?
            .try_into()
    }

    pub async fn list(&self) -> Result<Vec<Task>, StorageError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, name, source_path, connection_id, remote_path, direction, schedule, realtime, options_json, created_at, updated_at
             FROM tasks ORDER BY created_at",
        )
        .fetch_all(self.store.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Every Task that belongs to `connection_id`, used by the Runner's exclusion
    /// check and by the Watcher when a Connection is deleted out from under it.
    pub async fn list_by_connection(&self, connection_id: ConnectionId) -> Result<Vec<Task>, StorageError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, name, source_path, connection_id, remote_path, direction, schedule, realtime, options_json, created_at, updated_at
             FROM tasks WHERE connection_id = ? ORDER BY created_at",
        )
        .bind(connection_id.to_string())
        .fetch_all(self.store.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn update(&self, task: &Task) -> Result<(), StorageError> {
        let options_json = serde_json::to_string(&task.options)
            .map_err(|e| StorageError::InvalidInput(format!("bad options: {e}")))?;
        let result = sqlx::query(
            "UPDATE tasks SET name = ?, source_path = ?, remote_path = ?, direction = ?, schedule = ?, realtime = ?, options_json = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&task.name)
        .bind(task.source_path.to_string_lossy().to_string())
        .bind(&task.remote_path)
        .bind(direction_to_str(task.direction))
        .bind(&task.schedule)
        .bind(task.realtime)
        .bind(options_json)
        .bind(task.updated_at)
        .bind(task.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(|e| StorageError::from_insert("task", &task.name, e))?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "task", id: task.id.to_string() });
        }
        Ok(())
    }

    pub async fn delete(&self, id: TaskId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(self.store.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "task", id: id.to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection_repo::ConnectionRepo;
    use crate::pool::connect_in_memory;
    use syncd_core::test_support::{ConnectionBuilder, TaskBuilder};

    async fn seeded_connection(store: &Store) -> syncd_core::Connection {
        let conn = ConnectionBuilder::new("c1").build();
        ConnectionRepo::new(store).create(&conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn create_then_get_round_trips_options() {
        let store = connect_in_memory().await.unwrap();
        let conn = seeded_connection(&store).await;
        let repo = TaskRepo::new(&store);
        let task = TaskBuilder::new("t1", conn.id).schedule("@hourly").build();
        repo.create(&task).await.unwrap();
        let fetched = repo.get(task.id).await.unwrap();
        assert_eq!(fetched.schedule, "@hourly");
        assert_eq!(fetched.options.transfers, task.options.transfers);
    }

    #[tokio::test]
    async fn list_by_connection_filters() {
        let store = connect_in_memory().await.unwrap();
        let conn_a = seeded_connection(&store).await;
        let conn_b = ConnectionBuilder::new("c2").build();
        ConnectionRepo::new(&store).create(&conn_b).await.unwrap();
        let repo = TaskRepo::new(&store);
        repo.create(&TaskBuilder::new("t1", conn_a.id).build()).await.unwrap();
        repo.create(&TaskBuilder::new("t2", conn_b.id).build()).await.unwrap();

        let tasks = repo.list_by_connection(conn_a.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "t1");
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = connect_in_memory().await.unwrap();
        let repo = TaskRepo::new(&store);
        let err = repo.delete(TaskId::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
