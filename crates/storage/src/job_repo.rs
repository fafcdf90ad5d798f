// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository for `Job` rows, plus the joined `JobWithLogs` read used by the
//! `GET /jobs/{id}` endpoint.

use crate::codec::{status_from_str, status_to_str, trigger_from_str, trigger_to_str};
use crate::error::StorageError;
use crate::job_log_repo::JobLogRepo;
use crate::pool::Store;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use syncd_core::{ConnectionId, Job, JobId, JobLog, JobStatus, TaskId};

#[derive(FromRow)]
struct JobRow {
    id: String,
    task_id: String,
    trigger: String,
    status: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    files_transferred: i64,
    bytes_transferred: i64,
    files_deleted: i64,
    error_count: i64,
    errors: String,
}

impl TryFrom<JobRow> for Job {
    type Error = StorageError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id.parse().map_err(|_| StorageError::InvalidInput(format!("bad job id {:?}", row.id)))?,
            task_id: row
                .task_id
                .parse()
                .map_err(|_| StorageError::InvalidInput(format!("bad task id {:?}", row.task_id)))?,
            trigger: trigger_from_str(&row.trigger)?,
            status: status_from_str(&row.status)?,
            start_time: row.start_time,
            end_time: row.end_time,
            files_transferred: row.files_transferred,
            bytes_transferred: row.bytes_transferred,
            files_deleted: row.files_deleted,
            error_count: row.error_count,
            errors: row.errors,
        })
    }
}

/// A Job together with its per-object log entries, returned by `get`.
#[derive(Debug, Clone)]
pub struct JobWithLogs {
    pub job: Job,
    pub logs: Vec<JobLog>,
}

#[derive(Default, Clone, Copy)]
pub struct JobListFilter {
    pub task_id: Option<TaskId>,
    pub connection_id: Option<ConnectionId>,
    pub limit: i64,
    pub offset: i64,
}

pub struct JobRepo<'a> {
    store: &'a Store,
}

impl<'a> JobRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, job: &Job) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO jobs (id, task_id, trigger, status, start_time, end_time, files_transferred, bytes_transferred, files_deleted, error_count, errors)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.id.to_string())
        .bind(job.task_id.to_string())
        .bind(trigger_to_str(job.trigger))
        .bind(status_to_str(job.status))
        .bind(job.start_time)
        .bind(job.end_time)
        .bind(job.files_transferred)
        .bind(job.bytes_transferred)
        .bind(job.files_deleted)
        .bind(job.error_count)
        .bind(&job.errors)
        .execute(self.store.pool())
        .await
        .map_err(StorageError::System)?;
        Ok(())
    }

    /// Persist progress and/or terminal state. The Runner calls this both mid-run
    /// (periodic flush of counters) and once at completion (with a terminal status).
    pub async fn update(&self, job: &Job) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE jobs SET status = ?, end_time = ?, files_transferred = ?, bytes_transferred = ?, files_deleted = ?, error_count = ?, errors = ?
             WHERE id = ?",
        )
        .bind(status_to_str(job.status))
        .bind(job.end_time)
        .bind(job.files_transferred)
        .bind(job.bytes_transferred)
        .bind(job.files_deleted)
        .bind(job.error_count)
        .bind(&job.errors)
        .bind(job.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(StorageError::System)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "job", id: job.id.to_string() });
        }
        Ok(())
    }

    pub async fn get(&self, id: JobId) -> Result<JobWithLogs, StorageError> {
        let row: Option<JobRow> = sqlx::query_as(
            "SELECT id, task_id, trigger, status, start_time, end_time, files_transferred, bytes_transferred, files_deleted, error_count, errors
             FROM jobs WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.store.pool())
        .await?;
        let job: Job = row
            .ok_or_else(|| StorageError::NotFound { entity: "job", id: id.to_string() })?
            .try_into()?;
        let logs = JobLogRepo::new(self.store).list_for_job(id).await?;
        Ok(JobWithLogs { job, logs })
    }

    pub async fn list(&self, filter: JobListFilter) -> Result<Vec<Job>, StorageError> {
        let limit = if filter.limit > 0 { filter.limit } else { 100 };
        let rows: Vec<JobRow> = match (filter.task_id, filter.connection_id) {
            (Some(task_id), _) => {
                sqlx::query_as(
                    "SELECT id, task_id, trigger, status, start_time, end_time, files_transferred, bytes_transferred, files_deleted, error_count, errors
                     FROM jobs WHERE task_id = ? ORDER BY start_time DESC LIMIT ? OFFSET ?",
                )
                .bind(task_id.to_string())
                .bind(limit)
                .bind(filter.offset)
                .fetch_all(self.store.pool())
                .await?
            }
            (None, Some(connection_id)) => {
                sqlx::query_as(
                    "SELECT j.id, j.task_id, j.trigger, j.status, j.start_time, j.end_time, j.files_transferred, j.bytes_transferred, j.files_deleted, j.error_count, j.errors
                     FROM jobs j JOIN tasks t ON t.id = j.task_id
                     WHERE t.connection_id = ? ORDER BY j.start_time DESC LIMIT ? OFFSET ?",
                )
                .bind(connection_id.to_string())
                .bind(limit)
                .bind(filter.offset)
                .fetch_all(self.store.pool())
                .await?
            }
            (None, None) => {
                sqlx::query_as(
                    "SELECT id, task_id, trigger, status, start_time, end_time, files_transferred, bytes_transferred, files_deleted, error_count, errors
                     FROM jobs ORDER BY start_time DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(filter.offset)
                .fetch_all(self.store.pool())
                .await?
            }
        };
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// The most recent Job for each Task, keyed by `task_id`. Backs crash recovery's
    /// "find jobs left `running` by a process that died" sweep as well as any
    /// "current status" dashboard view — both only ever care about the latest one.
    pub async fn list_latest_per_task(&self) -> Result<Vec<Job>, StorageError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT j.id, j.task_id, j.trigger, j.status, j.start_time, j.end_time, j.files_transferred, j.bytes_transferred, j.files_deleted, j.error_count, j.errors
             FROM jobs j
             WHERE j.start_time = (
                 SELECT MAX(j2.start_time) FROM jobs j2 WHERE j2.task_id = j.task_id
             )",
        )
        .fetch_all(self.store.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Jobs still `running` (or `pending`) in storage — the set crash recovery
    /// must reconcile on startup because no live process can finish them.
    pub async fn list_live(&self) -> Result<Vec<Job>, StorageError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT id, task_id, trigger, status, start_time, end_time, files_transferred, bytes_transferred, files_deleted, error_count, errors
             FROM jobs WHERE status IN (?, ?)",
        )
        .bind(status_to_str(JobStatus::Pending))
        .bind(status_to_str(JobStatus::Running))
        .fetch_all(self.store.pool())
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}
