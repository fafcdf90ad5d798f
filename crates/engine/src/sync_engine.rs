// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives a single Job against a `TransferBackend`: ingests its stats/log
//! streams, publishes progress to the broker, and persists the outcome.
//! See §4.5 of the design for the full progress-loop contract this implements.

use crate::broker::Broker;
use crate::live_set::LiveSet;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use syncd_adapters::{ConfigCipher, RemoteSpec, TransferBackend};
use syncd_core::{Clock, Connection, Event, Job, JobLog, JobStatus, JobTrigger, Task, TaskId, TransferStats};
use syncd_storage::{ConnectionRepo, JobLogRepo, JobRepo, Store};

const LOG_FLUSH_MAX_ENTRIES: usize = 100;
const LOG_FLUSH_INTERVAL: Duration = Duration::from_secs(2);
const PERSIST_INTERVAL: Duration = Duration::from_secs(5);
const CANCEL_GRACE_PERIOD: Duration = Duration::from_secs(5);
/// Maximum bytes of a terminal error chain kept on `Job.errors`.
const ERROR_SUMMARY_MAX_BYTES: usize = 2048;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProgressSnapshot {
    pub job_id: syncd_core::JobId,
    pub task_id: TaskId,
    pub status: JobStatus,
    pub stats: TransferStats,
}

enum Outcome {
    Success,
    Failed(String),
    Cancelled,
}

pub struct SyncEngine<C: Clock> {
    store: Store,
    broker: Broker,
    backend: Arc<dyn TransferBackend>,
    cipher: Arc<dyn ConfigCipher>,
    clock: C,
    snapshots: Arc<RwLock<HashMap<syncd_core::JobId, ProgressSnapshot>>>,
}

impl<C: Clock> SyncEngine<C> {
    pub fn new(store: Store, broker: Broker, backend: Arc<dyn TransferBackend>, cipher: Arc<dyn ConfigCipher>, clock: C) -> Self {
        Self { store, broker, backend, cipher, clock, snapshots: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// The in-memory live snapshot, or `None` if this job is not currently
    /// owned by this engine instance (callers fall back to the persisted row).
    pub fn get_job_progress(&self, job_id: syncd_core::JobId) -> Option<ProgressSnapshot> {
        self.snapshots.read().get(&job_id).cloned()
    }

    /// Run `job` against `task` to completion. Removes `task.id` from `live`
    /// when done, which is how the Runner learns the slot is free again.
    pub async fn execute(
        self: Arc<Self>,
        mut job: Job,
        task: Task,
        mut cancel_rx: tokio::sync::oneshot::Receiver<()>,
        live: LiveSet,
    ) {
        let connection = match ConnectionRepo::new(&self.store).get(task.connection_id).await {
            Ok(c) => c,
            Err(e) => {
                self.finalize_without_backend(&mut job, &format!("connection lookup failed: {e}")).await;
                live.remove(task.id);
                return;
            }
        };

        job.start_running();
        self.broker.publish(Event::JobStarted { connection_id: task.connection_id, task_id: task.id, job_id: job.id });
        self.snapshots.write().insert(
            job.id,
            ProgressSnapshot { job_id: job.id, task_id: task.id, status: JobStatus::Running, stats: empty_stats() },
        );

        let handle = match self.start_backend_run(&task, &connection).await {
            Ok(h) => h,
            Err(e) => {
                self.finalize_without_backend(&mut job, &format!("backend start failed: {e}")).await;
                self.broker.publish(Event::JobFailed {
                    connection_id: task.connection_id,
                    task_id: task.id,
                    job_id: job.id,
                    error: job.errors.clone(),
                });
                self.snapshots.write().remove(&job.id);
                live.remove(task.id);
                return;
            }
        };

        let syncd_adapters::RunHandle { mut stats_rx, mut log_rx, mut completion, cancel } = handle;
        let mut cancel_tx = Some(cancel);
        let mut cancel_requested = false;
        let mut grace_deadline: Option<tokio::time::Instant> = None;

        let mut log_buffer: Vec<JobLog> = Vec::new();
        let mut last_flush = Instant::now();
        let mut persist_interval = tokio::time::interval(PERSIST_INTERVAL);

        let outcome = loop {
            tokio::select! {
                maybe_stats = stats_rx.recv() => {
                    if let Some(stats) = maybe_stats {
                        job.files_transferred = stats.files;
                        job.bytes_transferred = stats.bytes;
                        job.files_deleted = stats.deletions;
                        job.error_count = stats.errors;
                        self.snapshots.write().insert(
                            job.id,
                            ProgressSnapshot { job_id: job.id, task_id: task.id, status: JobStatus::Running, stats: stats.clone() },
                        );
                        if !stats.active_transfers.is_empty() {
                            self.broker.publish(Event::TransferProgress {
                                connection_id: task.connection_id,
                                task_id: task.id,
                                job_id: job.id,
                                active_transfers: stats.active_transfers.clone(),
                            });
                        }
                        self.broker.publish(Event::JobProgress {
                            connection_id: task.connection_id,
                            task_id: task.id,
                            job_id: job.id,
                            stats,
                        });
                    }
                }
                maybe_log = log_rx.recv() => {
                    if let Some(entry) = maybe_log {
                        log_buffer.push(JobLog::new(job.id, entry.time, entry.level, entry.what, entry.path, entry.size));
                        if log_buffer.len() >= LOG_FLUSH_MAX_ENTRIES || last_flush.elapsed() >= LOG_FLUSH_INTERVAL {
                            self.flush_logs(&task, &job, &mut log_buffer).await;
                            last_flush = Instant::now();
                        }
                    }
                }
                _ = persist_interval.tick() => {
                    let _ = JobRepo::new(&self.store).update(&job).await;
                }
                res = &mut completion => {
                    if cancel_requested {
                        break Outcome::Cancelled;
                    }
                    break match res {
                        Ok(Ok(())) => Outcome::Success,
                        Ok(Err(e)) => Outcome::Failed(truncate_error(&e.to_string())),
                        Err(_) => Outcome::Failed("transfer backend closed without a result".into()),
                    };
                }
                _ = &mut cancel_rx, if !cancel_requested => {
                    cancel_requested = true;
                    if let Some(tx) = cancel_tx.take() {
                        let _ = tx.send(());
                    }
                    grace_deadline = Some(tokio::time::Instant::now() + CANCEL_GRACE_PERIOD);
                }
                () = sleep_until_opt(grace_deadline), if grace_deadline.is_some() => {
                    break Outcome::Cancelled;
                }
            }
        };

        self.flush_logs(&task, &job, &mut log_buffer).await;

        let end_time = self.clock.now();
        match outcome {
            Outcome::Success => {
                job.finish(JobStatus::Success, end_time);
                let _ = JobRepo::new(&self.store).update(&job).await;
                self.broker.publish(Event::JobCompleted { connection_id: task.connection_id, task_id: task.id, job_id: job.id });
            }
            Outcome::Failed(err) => {
                job.errors = err.clone();
                job.finish(JobStatus::Failed, end_time);
                let _ = JobRepo::new(&self.store).update(&job).await;
                self.broker.publish(Event::JobFailed { connection_id: task.connection_id, task_id: task.id, job_id: job.id, error: err });
            }
            Outcome::Cancelled => {
                job.finish(JobStatus::Cancelled, end_time);
                let _ = JobRepo::new(&self.store).update(&job).await;
                self.broker.publish(Event::JobFailed {
                    connection_id: task.connection_id,
                    task_id: task.id,
                    job_id: job.id,
                    error: "cancelled".into(),
                });
            }
        }

        self.snapshots.write().remove(&job.id);
        live.remove(task.id);
    }

    async fn start_backend_run(&self, task: &Task, connection: &Connection) -> Result<syncd_adapters::RunHandle, syncd_adapters::BackendError> {
        let decrypted = self.cipher.decrypt(&connection.encrypted_config)?;
        let remote = RemoteSpec {
            connection_type: connection.r#type.clone(),
            decrypted_config: decrypted,
            remote_path: task.remote_path.clone(),
        };
        self.backend.run(task.direction, &task.source_path, remote, task.options.clone()).await
    }

    async fn flush_logs(&self, task: &Task, job: &Job, buffer: &mut Vec<JobLog>) {
        if buffer.is_empty() {
            return;
        }
        if JobLogRepo::new(&self.store).append_batch(buffer).await.is_ok() {
            for log in buffer.iter() {
                self.broker.publish(Event::LogLine {
                    connection_id: task.connection_id,
                    task_id: task.id,
                    job_id: job.id,
                    time: log.time,
                    level: log.level,
                    what: log.what,
                    path: log.path.clone(),
                    size: log.size,
                });
            }
        }
        buffer.clear();
    }

    /// Finalize a job that never reached the backend (connection lookup or
    /// backend startup failed) as `failed`, without a log/stats stream to drain.
    async fn finalize_without_backend(&self, job: &mut Job, error: &str) {
        // `finish` only allows `running -> failed`; a connection-lookup failure
        // hits this while the job is still `pending`, so promote it first.
        if job.status == JobStatus::Pending {
            job.start_running();
        }
        job.errors = truncate_error(error);
        job.finish(JobStatus::Failed, self.clock.now());
        let _ = JobRepo::new(&self.store).update(job).await;
    }
}

fn truncate_error(s: &str) -> String {
    if s.len() <= ERROR_SUMMARY_MAX_BYTES {
        s.to_string()
    } else {
        s[..ERROR_SUMMARY_MAX_BYTES].to_string()
    }
}

fn empty_stats() -> TransferStats {
    TransferStats { bytes: 0, files: 0, deletions: 0, errors: 0, active_transfers: Vec::new() }
}

async fn sleep_until_opt(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
