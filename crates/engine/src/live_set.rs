// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task mutual exclusion: the single shared map backing the Runner's
//! "at most one live Job per Task" invariant (§4.4 of the design). Shared
//! between the Runner (reserve/cancel/query) and the SyncEngine (release on
//! terminal completion) so the slot is freed exactly where the job actually ends.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use syncd_core::{JobId, TaskId};
use tokio::sync::oneshot;

struct LiveEntry {
    job_id: JobId,
    cancel: Option<oneshot::Sender<()>>,
}

#[derive(Clone)]
pub struct LiveSet {
    inner: Arc<Mutex<HashMap<TaskId, LiveEntry>>>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Atomically claims `task_id` for `job_id`, or returns `false` if a job is
    /// already live for it. Never awaits while holding the lock.
    pub fn reserve(&self, task_id: TaskId, job_id: JobId, cancel: oneshot::Sender<()>) -> bool {
        let mut guard = self.inner.lock();
        if guard.contains_key(&task_id) {
            return false;
        }
        guard.insert(task_id, LiveEntry { job_id, cancel: Some(cancel) });
        true
    }

    /// Releases the slot. Called by the SyncEngine once a job reaches a
    /// terminal status, never by the Runner directly.
    pub fn remove(&self, task_id: TaskId) {
        self.inner.lock().remove(&task_id);
    }

    pub fn is_running(&self, task_id: TaskId) -> bool {
        self.inner.lock().contains_key(&task_id)
    }

    pub fn running_job_id(&self, task_id: TaskId) -> Option<JobId> {
        self.inner.lock().get(&task_id).map(|e| e.job_id)
    }

    /// Requests cooperative cancellation of the live job for `task_id`, if any.
    /// Returns `false` if nothing is running (or cancellation was already requested).
    pub fn request_cancel(&self, task_id: TaskId) -> bool {
        let mut guard = self.inner.lock();
        match guard.get_mut(&task_id) {
            Some(entry) => match entry.cancel.take() {
                Some(tx) => tx.send(()).is_ok(),
                None => false,
            },
            None => false,
        }
    }
}

impl Default for LiveSet {
    fn default() -> Self {
        Self::new()
    }
}
