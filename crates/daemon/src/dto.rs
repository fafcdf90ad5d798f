// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response shapes for the REST surface. Kept separate from the core
//! domain types so wire format (field naming, optional-subset PUT semantics)
//! can evolve without touching `syncd-core`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use syncd_core::{
    Connection, ConnectionId, Direction, Filter, Job, JobId, JobLog, JobLogLevel, JobLogWhat,
    JobStatus, JobTrigger, Task, TaskId, TaskOptions,
};

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub r#type: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConnectionRequest {
    pub name: Option<String>,
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub id: ConnectionId,
    pub name: String,
    pub r#type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Connection> for ConnectionResponse {
    fn from(c: &Connection) -> Self {
        Self { id: c.id, name: c.name.clone(), r#type: c.r#type.clone(), created_at: c.created_at, updated_at: c.updated_at }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub source_path: PathBuf,
    pub connection_id: ConnectionId,
    pub remote_path: String,
    pub direction: Direction,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub realtime: bool,
    #[serde(default)]
    pub options: Option<TaskOptionsRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskOptionsRequest {
    pub conflict_resolution: Option<syncd_core::ConflictResolution>,
    pub filters: Option<Vec<Filter>>,
    pub no_delete: Option<bool>,
    pub transfers: Option<u32>,
}

impl TaskOptionsRequest {
    pub fn into_options(self) -> TaskOptions {
        let defaults = TaskOptions::default();
        TaskOptions {
            conflict_resolution: self.conflict_resolution.unwrap_or(defaults.conflict_resolution),
            filters: self.filters.unwrap_or(defaults.filters),
            no_delete: self.no_delete.unwrap_or(defaults.no_delete),
            transfers: self.transfers.unwrap_or(defaults.transfers),
        }
    }
}

/// Every field optional: `PUT /tasks/{id}` only overwrites what is present.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub source_path: Option<PathBuf>,
    pub remote_path: Option<String>,
    pub direction: Option<Direction>,
    pub schedule: Option<String>,
    pub realtime: Option<bool>,
    pub options: Option<TaskOptionsRequest>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub name: String,
    pub source_path: PathBuf,
    pub connection_id: ConnectionId,
    pub remote_path: String,
    pub direction: Direction,
    pub schedule: String,
    pub realtime: bool,
    pub options: TaskOptions,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// The most recent Job for this Task, if one exists (§6: "Task with latest Job embedded").
    pub latest_job: Option<JobResponse>,
}

impl TaskResponse {
    pub fn new(task: &Task, latest_job: Option<&Job>) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            source_path: task.source_path.clone(),
            connection_id: task.connection_id,
            remote_path: task.remote_path.clone(),
            direction: task.direction,
            schedule: task.schedule.clone(),
            realtime: task.realtime,
            options: task.options.clone(),
            created_at: task.created_at,
            updated_at: task.updated_at,
            latest_job: latest_job.map(JobResponse::without_logs),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: JobId,
    pub task_id: TaskId,
    pub trigger: JobTrigger,
    pub status: JobStatus,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub files_transferred: i64,
    pub bytes_transferred: i64,
    pub files_deleted: i64,
    pub error_count: i64,
    pub errors: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<JobLogResponse>>,
}

impl JobResponse {
    pub fn without_logs(job: &Job) -> Self {
        Self::from_job(job, None)
    }

    pub fn with_logs(job: &Job, logs: &[JobLog]) -> Self {
        Self::from_job(job, Some(logs.iter().map(JobLogResponse::from).collect()))
    }

    fn from_job(job: &Job, logs: Option<Vec<JobLogResponse>>) -> Self {
        Self {
            id: job.id,
            task_id: job.task_id,
            trigger: job.trigger,
            status: job.status,
            start_time: job.start_time,
            end_time: job.end_time,
            files_transferred: job.files_transferred,
            bytes_transferred: job.bytes_transferred,
            files_deleted: job.files_deleted,
            error_count: job.error_count,
            errors: job.errors.clone(),
            logs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobLogResponse {
    pub time: chrono::DateTime<chrono::Utc>,
    pub level: JobLogLevel,
    pub what: JobLogWhat,
    pub path: String,
    pub size: i64,
}

impl From<&JobLog> for JobLogResponse {
    fn from(log: &JobLog) -> Self {
        Self { time: log.time, level: log.level, what: log.what, path: log.path.clone(), size: log.size }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub data: Vec<JobResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub job_id: JobId,
}
