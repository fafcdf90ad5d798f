// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single per-object record emitted during a Job.

use crate::define_id;
use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

define_id! {
    pub struct JobLogId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobLogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobLogWhat {
    Upload,
    Download,
    Move,
    Delete,
    Error,
    Misc,
}

impl JobLogWhat {
    /// Whether this action counts toward `files_transferred`/`bytes_transferred`
    /// in crash recovery's reconstruction from logs (see `syncd-engine::recovery`).
    pub fn counts_as_transfer(self) -> bool {
        matches!(self, JobLogWhat::Upload | JobLogWhat::Download | JobLogWhat::Move)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLog {
    pub id: JobLogId,
    pub job_id: JobId,
    pub time: DateTime<Utc>,
    pub level: JobLogLevel,
    pub what: JobLogWhat,
    pub path: String,
    /// Bytes moved. Always 0 for non-transfer actions (deletes, errors, misc).
    pub size: i64,
}

impl JobLog {
    pub fn new(
        job_id: JobId,
        time: DateTime<Utc>,
        level: JobLogLevel,
        what: JobLogWhat,
        path: impl Into<String>,
        size: i64,
    ) -> Self {
        let size = if what.counts_as_transfer() { size } else { 0 };
        Self {
            id: JobLogId::new(),
            job_id,
            time,
            level,
            what,
            path: path.into(),
            size,
        }
    }
}
