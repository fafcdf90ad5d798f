// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event shapes published on the broker (see `syncd-engine::broker`).
//!
//! Every payload carries `connection_id` and, where applicable, `task_id`/`job_id`,
//! so subscribers can filter without the broker needing to understand the payload.

use crate::connection::ConnectionId;
use crate::job::JobId;
use crate::job_log::{JobLogLevel, JobLogWhat};
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// A single active transfer reported by the backend's stats stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTransfer {
    pub name: String,
    pub size: i64,
    pub bytes: i64,
    /// Bytes/sec, instantaneous.
    pub speed: f64,
}

impl ActiveTransfer {
    /// Consumers interpret a transfer with `bytes >= size` as completed and drop
    /// it locally (see §4.5's progress-loop contract).
    pub fn is_completed(&self) -> bool {
        self.bytes >= self.size
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferStats {
    pub bytes: i64,
    pub files: i64,
    pub deletions: i64,
    pub errors: i64,
    pub active_transfers: Vec<ActiveTransfer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    JobStarted {
        connection_id: ConnectionId,
        task_id: TaskId,
        job_id: JobId,
    },
    JobProgress {
        connection_id: ConnectionId,
        task_id: TaskId,
        job_id: JobId,
        stats: TransferStats,
    },
    TransferProgress {
        connection_id: ConnectionId,
        task_id: TaskId,
        job_id: JobId,
        active_transfers: Vec<ActiveTransfer>,
    },
    JobCompleted {
        connection_id: ConnectionId,
        task_id: TaskId,
        job_id: JobId,
    },
    JobFailed {
        connection_id: ConnectionId,
        task_id: TaskId,
        job_id: JobId,
        error: String,
    },
    LogLine {
        connection_id: ConnectionId,
        task_id: TaskId,
        job_id: JobId,
        time: chrono::DateTime<chrono::Utc>,
        level: JobLogLevel,
        what: JobLogWhat,
        path: String,
        size: i64,
    },
    TaskUpdated {
        connection_id: ConnectionId,
        task_id: TaskId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    JobStarted,
    JobProgress,
    TransferProgress,
    JobCompleted,
    JobFailed,
    LogLine,
    TaskUpdated,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::JobStarted { .. } => EventKind::JobStarted,
            Event::JobProgress { .. } => EventKind::JobProgress,
            Event::TransferProgress { .. } => EventKind::TransferProgress,
            Event::JobCompleted { .. } => EventKind::JobCompleted,
            Event::JobFailed { .. } => EventKind::JobFailed,
            Event::LogLine { .. } => EventKind::LogLine,
            Event::TaskUpdated { .. } => EventKind::TaskUpdated,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        match self {
            Event::JobStarted { connection_id, .. }
            | Event::JobProgress { connection_id, .. }
            | Event::TransferProgress { connection_id, .. }
            | Event::JobCompleted { connection_id, .. }
            | Event::JobFailed { connection_id, .. }
            | Event::LogLine { connection_id, .. }
            | Event::TaskUpdated { connection_id, .. } => *connection_id,
        }
    }

    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Event::JobStarted { job_id, .. }
            | Event::JobProgress { job_id, .. }
            | Event::TransferProgress { job_id, .. }
            | Event::JobCompleted { job_id, .. }
            | Event::JobFailed { job_id, .. }
            | Event::LogLine { job_id, .. } => Some(*job_id),
            Event::TaskUpdated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_transfer_is_detected_by_bytes_reaching_size() {
        let t = ActiveTransfer { name: "a".into(), size: 100, bytes: 100, speed: 0.0 };
        assert!(t.is_completed());
        let t = ActiveTransfer { name: "a".into(), size: 100, bytes: 50, speed: 0.0 };
        assert!(!t.is_completed());
    }

    #[test]
    fn event_kind_matches_variant() {
        let e = Event::JobStarted {
            connection_id: ConnectionId::new(),
            task_id: TaskId::new(),
            job_id: JobId::new(),
        };
        assert_eq!(e.kind(), EventKind::JobStarted);
    }

    #[test]
    fn every_event_carries_connection_id() {
        let cid = ConnectionId::new();
        let e = Event::TaskUpdated { connection_id: cid, task_id: TaskId::new() };
        assert_eq!(e.connection_id(), cid);
    }

    #[test]
    fn serializes_with_tagged_type_and_payload() {
        let e = Event::JobCompleted {
            connection_id: ConnectionId::new(),
            task_id: TaskId::new(),
            job_id: JobId::new(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "job_completed");
        assert!(json["payload"].is_object());
    }
}
