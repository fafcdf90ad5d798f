// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes returned by the daemon's REST API. Kept independent of
//! `syncd-daemon::dto` (the CLI only ever talks HTTP to the daemon, never
//! links against it) but reuses `syncd-core`'s domain enums, since both
//! sides already agree on those via serde.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use syncd_core::{
    ConnectionId, Direction, JobId, JobLogLevel, JobLogWhat, JobStatus, JobTrigger, TaskId,
    TaskOptions, TransferStats,
};

#[derive(Debug, Serialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub r#type: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateConnectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
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
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionView {
    pub id: ConnectionId,
    pub name: String,
    pub r#type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for ConnectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {:<20} {:<10} updated {}", self.id, self.name, self.r#type, self.updated_at)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub source_path: PathBuf,
    pub connection_id: ConnectionId,
    pub remote_path: String,
    pub direction: Direction,
    pub schedule: String,
    pub realtime: bool,
    pub options: TaskOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_job: Option<JobView>,
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trigger = match (self.schedule.is_empty(), self.realtime) {
            (false, true) => format!("schedule={} +realtime", self.schedule),
            (false, false) => format!("schedule={}", self.schedule),
            (true, true) => "realtime".to_string(),
            (true, false) => "manual-only".to_string(),
        };
        let status = self.latest_job.as_ref().map(|j| format!("{:?}", j.status).to_lowercase());
        write!(
            f,
            "{}  {:<20} {} -> {}:{}  [{}]{}",
            self.id,
            self.name,
            self.source_path.display(),
            self.connection_id,
            self.remote_path,
            trigger,
            status.map(|s| format!("  last={s}")).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobView {
    pub id: JobId,
    pub task_id: TaskId,
    pub trigger: JobTrigger,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub files_transferred: i64,
    pub bytes_transferred: i64,
    pub files_deleted: i64,
    pub error_count: i64,
    pub errors: String,
    #[serde(default)]
    pub logs: Option<Vec<JobLogView>>,
}

impl fmt::Display for JobView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  task={} {:?} started={} files={} bytes={} deleted={} errors={}",
            self.id,
            self.task_id,
            self.status,
            self.start_time,
            self.files_transferred,
            self.bytes_transferred,
            self.files_deleted,
            self.error_count,
        )?;
        if !self.errors.is_empty() {
            write!(f, " ({})", self.errors)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobLogView {
    pub time: DateTime<Utc>,
    pub level: JobLogLevel,
    pub what: JobLogWhat,
    pub path: String,
    pub size: i64,
}

impl fmt::Display for JobLogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}] {:?} {} ({} bytes)", self.time, self.level, self.what, self.path, self.size)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListView {
    pub data: Vec<JobView>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressView {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub status: JobStatus,
    pub stats: TransferStats,
}

impl fmt::Display for ProgressView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:?}  files={} bytes={} deletions={} errors={} active={}",
            self.job_id,
            self.status,
            self.stats.files,
            self.stats.bytes,
            self.stats.deletions,
            self.stats.errors,
            self.stats.active_transfers.len(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunView {
    pub job_id: JobId,
}

impl fmt::Display for RunView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "started job {}", self.job_id)
    }
}
