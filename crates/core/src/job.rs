// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One execution attempt of a Task.

use crate::define_id;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

define_id! {
    pub struct JobId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTrigger {
    Manual,
    Schedule,
    Realtime,
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed | JobStatus::Cancelled)
    }

    pub fn is_live(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    /// Whether `self -> next` is a legal monotonic transition per the Job invariant:
    /// `pending -> running -> (success|failed|cancelled)`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Cancelled)
                | (Running, Success)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
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
}

impl Job {
    pub fn new_pending(id: JobId, task_id: TaskId, trigger: JobTrigger, now: DateTime<Utc>) -> Self {
        Self {
            id,
            task_id,
            trigger,
            status: JobStatus::Pending,
            start_time: now,
            end_time: None,
            files_transferred: 0,
            bytes_transferred: 0,
            files_deleted: 0,
            error_count: 0,
            errors: String::new(),
        }
    }

    /// Transition to a terminal status, stamping `end_time`. Panics in debug builds
    /// if the transition violates the monotonic status invariant — this would be a
    /// programming error in the engine, not user input, so it is not a `Result`.
    pub fn finish(&mut self, status: JobStatus, end_time: DateTime<Utc>) {
        debug_assert!(status.is_terminal());
        debug_assert!(self.status.can_transition_to(status));
        self.status = status;
        self.end_time = Some(end_time);
    }

    pub fn start_running(&mut self) {
        debug_assert!(self.status.can_transition_to(JobStatus::Running));
        self.status = JobStatus::Running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn new_job_is_pending_with_no_end_time() {
        let job = Job::new_pending(JobId::new(), TaskId::new(), JobTrigger::Manual, now());
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.end_time.is_none());
    }

    #[test]
    fn finish_sets_end_time_and_status() {
        let mut job = Job::new_pending(JobId::new(), TaskId::new(), JobTrigger::Manual, now());
        job.start_running();
        let end = now() + chrono::Duration::seconds(5);
        job.finish(JobStatus::Success, end);
        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.end_time, Some(end));
        assert!(job.end_time.unwrap() >= job.start_time);
    }

    #[test]
    fn status_transitions_are_monotonic() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Success));
        assert!(!JobStatus::Success.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Success));
    }

    #[test]
    fn pending_can_go_straight_to_cancelled() {
        // Crash recovery never owned a running instance; a `pending` job left
        // behind by a dead process is deliberately NOT touched (see crash recovery),
        // but the transition itself is legal for symmetry with manual cancellation.
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Cancelled));
    }

    #[test]
    fn terminal_statuses_are_terminal() {
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }
}
