// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository for `JobLog` rows: batched writes during a run, retention-bounded
//! deletes from the log-cleanup service.

use crate::codec::{level_from_str, level_to_str, what_from_str, what_to_str};
use crate::error::StorageError;
use crate::pool::Store;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use syncd_core::{ConnectionId, JobId, JobLog};

#[derive(FromRow)]
struct JobLogRow {
    id: String,
    job_id: String,
    time: DateTime<Utc>,
    level: String,
    what: String,
    path: String,
    size: i64,
}

impl TryFrom<JobLogRow> for JobLog {
    type Error = StorageError;

    fn try_from(row: JobLogRow) -> Result<Self, Self::Error> {
        Ok(JobLog {
            id: row.id.parse().map_err(|_| StorageError::InvalidInput(format!("bad job log id {:?}", row.id)))?,
            job_id: row
                .job_id
                .parse()
                .map_err(|_| StorageError::InvalidInput(format!("bad job id {:?}", row.job_id)))?,
            time: row.time,
            level: level_from_str(&row.level)?,
            what: what_from_str(&row.what)?,
            path: row.path,
            size: row.size,
        })
    }
}

pub struct JobLogRepo<'a> {
    store: &'a Store,
}

impl<'a> JobLogRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a batch of log entries in a single transaction. The SyncEngine
    /// buffers per-object events and flushes them in batches rather than one
    /// INSERT per object, to keep progress output from dominating the write path.
    pub async fn append_batch(&self, logs: &[JobLog]) -> Result<(), StorageError> {
        if logs.is_empty() {
            return Ok(());
        }
        let mut tx = self.store.pool().begin().await.map_err(StorageError::System)?;
        for log in logs {
            sqlx::query(
                "INSERT INTO job_logs (id, job_id, time, level, what, path, size) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(log.id.to_string())
            .bind(log.job_id.to_string())
            .bind(log.time)
            .bind(level_to_str(log.level))
            .bind(what_to_str(log.what))
            .bind(&log.path)
            .bind(log.size)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::System)?;
        }
        tx.commit().await.map_err(StorageError::System)?;
        Ok(())
    }

    pub async fn list_for_job(&self, job_id: JobId) -> Result<Vec<JobLog>, StorageError> {
        let rows: Vec<JobLogRow> = sqlx::query_as(
            "SELECT id, job_id, time, level, what, path, size FROM job_logs WHERE job_id = ? ORDER BY time",
        )
        .bind(job_id.to_string())
        .fetch_all(self.store.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Deletes the `job_logs` rows for a connection beyond the newest `keep_latest`,
    /// ordered by each log's own `time` column (not its job's `start_time`). Run
    /// periodically by the log-cleanup service; `jobs` rows are left alone, only
    /// their per-object detail is pruned.
    pub async fn delete_for_connection_beyond_retention(
        &self,
        connection_id: ConnectionId,
        keep_latest: i64,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "DELETE FROM job_logs WHERE id IN (
                SELECT ranked.id FROM (
                    SELECT jl.id AS id, ROW_NUMBER() OVER (ORDER BY jl.time DESC) AS rn
                    FROM job_logs jl
                    JOIN jobs j ON j.id = jl.job_id
                    JOIN tasks t ON t.id = j.task_id
                    WHERE t.connection_id = ?
                ) ranked
                WHERE ranked.rn > ?
            )",
        )
        .bind(connection_id.to_string())
        .bind(keep_latest)
        .execute(self.store.pool())
        .await
        .map_err(StorageError::System)?;
        Ok(result.rows_affected())
    }
}
