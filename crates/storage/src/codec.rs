// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TEXT <-> enum conversions for columns that store a core enum as a string.
//! Centralized here so a renamed variant only needs to change in one place.

use crate::error::StorageError;
use syncd_core::{Direction, JobLogLevel, JobLogWhat, JobStatus, JobTrigger};

pub fn direction_to_str(d: Direction) -> &'static str {
    match d {
        Direction::Upload => "upload",
        Direction::Download => "download",
        Direction::Bidirectional => "bidirectional",
    }
}

pub fn direction_from_str(s: &str) -> Result<Direction, StorageError> {
    match s {
        "upload" => Ok(Direction::Upload),
        "download" => Ok(Direction::Download),
        "bidirectional" => Ok(Direction::Bidirectional),
        other => Err(StorageError::InvalidInput(format!("bad direction {other:?}"))),
    }
}

pub fn trigger_to_str(t: JobTrigger) -> &'static str {
    match t {
        JobTrigger::Manual => "manual",
        JobTrigger::Schedule => "schedule",
        JobTrigger::Realtime => "realtime",
        JobTrigger::Startup => "startup",
    }
}

pub fn trigger_from_str(s: &str) -> Result<JobTrigger, StorageError> {
    match s {
        "manual" => Ok(JobTrigger::Manual),
        "schedule" => Ok(JobTrigger::Schedule),
        "realtime" => Ok(JobTrigger::Realtime),
        "startup" => Ok(JobTrigger::Startup),
        other => Err(StorageError::InvalidInput(format!("bad job trigger {other:?}"))),
    }
}

pub fn status_to_str(s: JobStatus) -> &'static str {
    match s {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Success => "success",
        JobStatus::Failed => "failed",
        JobStatus::Cancelled => "cancelled",
    }
}

pub fn status_from_str(s: &str) -> Result<JobStatus, StorageError> {
    match s {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "success" => Ok(JobStatus::Success),
        "failed" => Ok(JobStatus::Failed),
        "cancelled" => Ok(JobStatus::Cancelled),
        other => Err(StorageError::InvalidInput(format!("bad job status {other:?}"))),
    }
}

pub fn level_to_str(l: JobLogLevel) -> &'static str {
    match l {
        JobLogLevel::Info => "info",
        JobLogLevel::Warning => "warning",
        JobLogLevel::Error => "error",
    }
}

pub fn level_from_str(s: &str) -> Result<JobLogLevel, StorageError> {
    match s {
        "info" => Ok(JobLogLevel::Info),
        "warning" => Ok(JobLogLevel::Warning),
        "error" => Ok(JobLogLevel::Error),
        other => Err(StorageError::InvalidInput(format!("bad job log level {other:?}"))),
    }
}

pub fn what_to_str(w: JobLogWhat) -> &'static str {
    match w {
        JobLogWhat::Upload => "upload",
        JobLogWhat::Download => "download",
        JobLogWhat::Move => "move",
        JobLogWhat::Delete => "delete",
        JobLogWhat::Error => "error",
        JobLogWhat::Misc => "misc",
    }
}

pub fn what_from_str(s: &str) -> Result<JobLogWhat, StorageError> {
    match s {
        "upload" => Ok(JobLogWhat::Upload),
        "download" => Ok(JobLogWhat::Download),
        "move" => Ok(JobLogWhat::Move),
        "delete" => Ok(JobLogWhat::Delete),
        "error" => Ok(JobLogWhat::Error),
        "misc" => Ok(JobLogWhat::Misc),
        other => Err(StorageError::InvalidInput(format!("bad job log what {other:?}"))),
    }
}
