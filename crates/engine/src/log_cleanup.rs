// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic per-connection retention sweep (§4.7 of the design). Runs on its
//! own schedule, independent of any Task's schedule; a failure for one
//! connection is logged and does not stop the sweep for the rest.

use crate::error::EngineError;
use cron::Schedule;
use std::time::Duration;
use syncd_core::{parse_schedule, Clock, ParsedSchedule};
use syncd_storage::{ConnectionRepo, JobLogRepo, Store};

#[derive(Debug, Clone)]
pub struct LogCleanupConfig {
    pub schedule: String,
    pub keep_latest: i64,
}

impl Default for LogCleanupConfig {
    fn default() -> Self {
        Self { schedule: "@daily".into(), keep_latest: 50 }
    }
}

/// Spawns the cleanup loop. Returns immediately; the returned handle can be
/// aborted at shutdown.
pub fn spawn_log_cleanup<C: Clock>(store: Store, clock: C, config: LogCleanupConfig) -> Result<tokio::task::JoinHandle<()>, EngineError> {
    let parsed = parse_schedule(&config.schedule).map_err(|e| EngineError::InvalidInput(e.0))?;
    Ok(tokio::spawn(run_log_cleanup(store, clock, parsed, config.keep_latest)))
}

async fn run_log_cleanup<C: Clock>(store: Store, clock: C, parsed: ParsedSchedule, keep_latest: i64) {
    match parsed {
        ParsedSchedule::Every(period) => {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                sweep_once(&store, keep_latest).await;
            }
        }
        ParsedSchedule::Cron(schedule) => loop {
            let Some(sleep_for) = next_sleep_duration(&schedule, &clock) else { break };
            tokio::time::sleep(sleep_for).await;
            sweep_once(&store, keep_latest).await;
        },
    }
}

fn next_sleep_duration<C: Clock>(schedule: &Schedule, clock: &C) -> Option<Duration> {
    let now = clock.now();
    let next = schedule.after(&now).next()?;
    Some((next - now).to_std().unwrap_or(Duration::ZERO))
}

async fn sweep_once(store: &Store, keep_latest: i64) {
    let connections = match ConnectionRepo::new(store).list().await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "log cleanup: failed to list connections");
            return;
        }
    };

    for conn in connections {
        match JobLogRepo::new(store).delete_for_connection_beyond_retention(conn.id, keep_latest).await {
            Ok(deleted) if deleted > 0 => {
                tracing::info!(connection_id = %conn.id, deleted, "log cleanup pruned old job logs");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(connection_id = %conn.id, error = %e, "log cleanup failed for connection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncd_core::test_support::{job_log, pending_job, ConnectionBuilder, TaskBuilder};
    use syncd_core::{FakeClock, JobLogWhat};
    use syncd_storage::{JobRepo, TaskRepo};

    #[tokio::test]
    async fn sweep_once_prunes_logs_beyond_retention_per_connection() {
        let store = syncd_storage::connect_in_memory().await.unwrap();
        let conn = ConnectionBuilder::new("c1").build();
        ConnectionRepo::new(&store).create(&conn).await.unwrap();
        let task = TaskBuilder::new("t1", conn.id).build();
        TaskRepo::new(&store).create(&task).await.unwrap();

        let mut old_job = pending_job(task.id);
        old_job.start_time = syncd_core::test_support::epoch(1_700_000_000);
        let mut new_job = pending_job(task.id);
        new_job.start_time = syncd_core::test_support::epoch(1_700_000_100);
        JobRepo::new(&store).create(&old_job).await.unwrap();
        JobRepo::new(&store).create(&new_job).await.unwrap();
        JobLogRepo::new(&store).append_batch(&[job_log(old_job.id, JobLogWhat::Upload, 1)]).await.unwrap();
        JobLogRepo::new(&store).append_batch(&[job_log(new_job.id, JobLogWhat::Upload, 1)]).await.unwrap();

        sweep_once(&store, 1).await;

        assert_eq!(JobLogRepo::new(&store).list_for_job(old_job.id).await.unwrap().len(), 0);
        assert_eq!(JobLogRepo::new(&store).list_for_job(new_job.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn spawn_log_cleanup_rejects_an_invalid_schedule() {
        let store = syncd_storage::connect_in_memory().await.unwrap();
        let config = LogCleanupConfig { schedule: "not a cron".into(), keep_latest: 10 };
        let err = spawn_log_cleanup(store, FakeClock::new(), config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn sweep_with_no_connections_is_a_no_op() {
        let store = syncd_storage::connect_in_memory().await.unwrap();
        sweep_once(&store, 10).await;
    }
}
