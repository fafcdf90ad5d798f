// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starts and tracks Jobs. Enforces "at most one live Job per Task" via
//! `LiveSet`, then hands the actual transfer off to the SyncEngine on its own
//! task so `start_task` never blocks on I/O (§4.4 of the design).

use crate::error::EngineError;
use crate::live_set::LiveSet;
use crate::sync_engine::{ProgressSnapshot, SyncEngine};
use std::sync::Arc;
use syncd_core::{Clock, Job, JobId, JobTrigger, Task, TaskId};
use syncd_storage::{JobRepo, Store};

pub struct Runner<C: Clock> {
    store: Store,
    sync_engine: Arc<SyncEngine<C>>,
    live: LiveSet,
    clock: C,
}

impl<C: Clock> Runner<C> {
    pub fn new(store: Store, sync_engine: Arc<SyncEngine<C>>, clock: C) -> Self {
        Self { store, sync_engine, live: LiveSet::new(), clock }
    }

    /// Creates a pending Job for `task` and hands it to the SyncEngine. Returns
    /// `AlreadyRunning` without touching storage if `task.id` already has a live Job.
    pub async fn start_task(&self, task: &Task, trigger: JobTrigger) -> Result<JobId, EngineError> {
        let job_id = JobId::new();
        let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();
        if !self.live.reserve(task.id, job_id, cancel_tx) {
            return Err(EngineError::AlreadyRunning(task.id.to_string()));
        }

        let job = Job::new_pending(job_id, task.id, trigger, self.clock.now());
        if let Err(e) = JobRepo::new(&self.store).create(&job).await {
            self.live.remove(task.id);
            return Err(e.into());
        }

        let engine = Arc::clone(&self.sync_engine);
        let live = self.live.clone();
        let task = task.clone();
        tokio::spawn(async move {
            engine.execute(job, task, cancel_rx, live).await;
        });

        Ok(job_id)
    }

    /// Requests cooperative cancellation of the live Job for `task_id`. The Job
    /// keeps reporting `running` until the SyncEngine actually finalizes it.
    pub fn stop_task(&self, task_id: TaskId) -> Result<(), EngineError> {
        if self.live.request_cancel(task_id) {
            Ok(())
        } else {
            Err(EngineError::NotRunning(task_id.to_string()))
        }
    }

    pub fn is_running(&self, task_id: TaskId) -> bool {
        self.live.is_running(task_id)
    }

    pub fn running_job_id(&self, task_id: TaskId) -> Option<JobId> {
        self.live.running_job_id(task_id)
    }

    pub fn get_job_progress(&self, job_id: JobId) -> Option<ProgressSnapshot> {
        self.sync_engine.get_job_progress(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::Broker;
    use async_trait::async_trait;
    use std::path::Path;
    use syncd_adapters::{BackendError, DirEntry, Quota, RemoteSpec, RunHandle, TransferBackend};
    use syncd_core::test_support::{ConnectionBuilder, TaskBuilder};
    use syncd_core::{Direction, FakeClock, TaskOptions};
    use syncd_adapters::PlaintextCipher;
    use syncd_storage::ConnectionRepo;
    use syncd_storage::TaskRepo;
    use tokio::sync::{mpsc, oneshot};

    /// A backend whose `run` never completes, for exercising exclusion and
    /// cancellation without racing the progress loop's real completion path.
    struct HangingBackend;

    #[async_trait]
    impl TransferBackend for HangingBackend {
        async fn run(&self, _direction: Direction, _source_path: &Path, _remote: RemoteSpec, _options: TaskOptions) -> Result<RunHandle, BackendError> {
            let (stats_tx, stats_rx) = mpsc::channel(1);
            let (log_tx, log_rx) = mpsc::channel(1);
            let (completion_tx, completion) = oneshot::channel();
            let (cancel_tx, _cancel_rx) = oneshot::channel();
            tokio::spawn(async move {
                let _keep_alive = (stats_tx, log_tx, completion_tx);
                std::future::pending::<()>().await;
            });
            Ok(RunHandle { stats_rx, log_rx, completion, cancel: cancel_tx })
        }

        async fn test(&self, _connection_type: &str, _decrypted_config: &[u8]) -> Result<(), BackendError> {
            Ok(())
        }

        async fn quota(&self, _remote: &RemoteSpec) -> Result<Quota, BackendError> {
            Ok(Quota::default())
        }

        async fn list_directory(&self, _remote: &RemoteSpec, _path: &str) -> Result<Vec<DirEntry>, BackendError> {
            Ok(Vec::new())
        }
    }

    async fn runner_with_hanging_backend() -> (Runner<FakeClock>, Task) {
        let store = syncd_storage::connect_in_memory().await.unwrap();
        let conn = ConnectionBuilder::new("c1").build();
        ConnectionRepo::new(&store).create(&conn).await.unwrap();
        let task = TaskBuilder::new("t1", conn.id).build();
        TaskRepo::new(&store).create(&task).await.unwrap();

        let sync_engine = Arc::new(SyncEngine::new(store.clone(), Broker::new(), Arc::new(HangingBackend), Arc::new(PlaintextCipher), FakeClock::new()));
        (Runner::new(store, sync_engine, FakeClock::new()), task)
    }

    #[tokio::test]
    async fn start_task_returns_a_job_id_and_marks_it_running() {
        let (runner, task) = runner_with_hanging_backend().await;
        let job_id = runner.start_task(&task, JobTrigger::Manual).await.unwrap();
        assert!(runner.is_running(task.id));
        assert_eq!(runner.running_job_id(task.id), Some(job_id));
    }

    #[tokio::test]
    async fn second_start_task_for_same_task_is_already_running() {
        let (runner, task) = runner_with_hanging_backend().await;
        runner.start_task(&task, JobTrigger::Manual).await.unwrap();
        let err = runner.start_task(&task, JobTrigger::Manual).await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyRunning(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::AlreadyRunning);
    }

    #[tokio::test]
    async fn stop_task_on_idle_task_is_not_running_error() {
        let (runner, task) = runner_with_hanging_backend().await;
        let err = runner.stop_task(task.id).unwrap_err();
        assert!(matches!(err, EngineError::NotRunning(_)));
    }

    #[tokio::test]
    async fn stop_task_signals_cancellation_without_immediately_clearing_live_status() {
        let (runner, task) = runner_with_hanging_backend().await;
        runner.start_task(&task, JobTrigger::Manual).await.unwrap();
        runner.stop_task(task.id).unwrap();
        assert!(runner.is_running(task.id));
    }
}
