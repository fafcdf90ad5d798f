// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash recovery: on daemon startup, before the Scheduler/Watcher/Runner
//! accept any new work, reconcile Jobs a dead process left `running` (§4.6
//! of the design). `pending` jobs are left untouched — no process ever
//! started transferring for them, so there is nothing to reconstruct.

use crate::error::EngineError;
use syncd_core::{Clock, JobLogLevel, JobStatus};
use syncd_storage::{JobLogRepo, JobRepo, Store};

const CRASH_MESSAGE: &str = "System crash or unexpected shutdown";

/// Returns the number of Jobs recovered (set to `cancelled`).
pub async fn recover_crashed_jobs<C: Clock>(store: &Store, clock: &C) -> Result<usize, EngineError> {
    let live = JobRepo::new(store).list_live().await?;
    let mut recovered = 0;

    for mut job in live {
        if job.status != JobStatus::Running {
            continue;
        }

        let logs = JobLogRepo::new(store).list_for_job(job.id).await?;
        let (mut files, mut bytes) = (0i64, 0i64);
        for log in &logs {
            if log.level == JobLogLevel::Info && log.what.counts_as_transfer() {
                files += 1;
                bytes += log.size;
            }
        }

        job.files_transferred = files;
        job.bytes_transferred = bytes;
        job.errors = CRASH_MESSAGE.to_string();
        job.finish(JobStatus::Cancelled, clock.now());
        JobRepo::new(store).update(&job).await?;
        recovered += 1;
    }

    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncd_core::test_support::{job_log, pending_job, ConnectionBuilder, TaskBuilder};
    use syncd_core::{FakeClock, JobLogWhat};
    use syncd_storage::{ConnectionRepo, TaskRepo};

    async fn seeded() -> (Store, syncd_core::Task) {
        let store = syncd_storage::connect_in_memory().await.unwrap();
        let conn = ConnectionBuilder::new("c1").build();
        ConnectionRepo::new(&store).create(&conn).await.unwrap();
        let task = TaskBuilder::new("t1", conn.id).build();
        TaskRepo::new(&store).create(&task).await.unwrap();
        (store, task)
    }

    #[tokio::test]
    async fn running_job_is_reconstructed_from_transfer_logs_and_cancelled() {
        let (store, task) = seeded().await;
        let mut job = pending_job(task.id);
        job.start_running();
        JobRepo::new(&store).create(&job).await.unwrap();
        let logs = vec![
            job_log(job.id, JobLogWhat::Upload, 100),
            job_log(job.id, JobLogWhat::Upload, 50),
            job_log(job.id, JobLogWhat::Delete, 0),
        ];
        JobLogRepo::new(&store).append_batch(&logs).await.unwrap();

        let recovered = recover_crashed_jobs(&store, &FakeClock::new()).await.unwrap();
        assert_eq!(recovered, 1);

        let fetched = JobRepo::new(&store).get(job.id).await.unwrap().job;
        assert_eq!(fetched.status, JobStatus::Cancelled);
        assert_eq!(fetched.files_transferred, 2);
        assert_eq!(fetched.bytes_transferred, 150);
        assert_eq!(fetched.errors, CRASH_MESSAGE);
        assert!(fetched.end_time.is_some());
    }

    #[tokio::test]
    async fn error_level_logs_do_not_count_toward_recovered_totals() {
        let (store, task) = seeded().await;
        let mut job = pending_job(task.id);
        job.start_running();
        JobRepo::new(&store).create(&job).await.unwrap();
        let mut errored = job_log(job.id, JobLogWhat::Upload, 999);
        errored.level = JobLogLevel::Error;
        JobLogRepo::new(&store).append_batch(&[errored]).await.unwrap();

        recover_crashed_jobs(&store, &FakeClock::new()).await.unwrap();
        let fetched = JobRepo::new(&store).get(job.id).await.unwrap().job;
        assert_eq!(fetched.files_transferred, 0);
        assert_eq!(fetched.bytes_transferred, 0);
    }

    #[tokio::test]
    async fn warning_level_logs_do_not_count_toward_recovered_totals() {
        let (store, task) = seeded().await;
        let mut job = pending_job(task.id);
        job.start_running();
        JobRepo::new(&store).create(&job).await.unwrap();
        let mut warned = job_log(job.id, JobLogWhat::Upload, 999);
        warned.level = JobLogLevel::Warning;
        JobLogRepo::new(&store).append_batch(&[warned]).await.unwrap();

        recover_crashed_jobs(&store, &FakeClock::new()).await.unwrap();
        let fetched = JobRepo::new(&store).get(job.id).await.unwrap().job;
        assert_eq!(fetched.files_transferred, 0);
        assert_eq!(fetched.bytes_transferred, 0);
    }

    #[tokio::test]
    async fn pending_jobs_are_left_untouched() {
        let (store, task) = seeded().await;
        let job = pending_job(task.id);
        JobRepo::new(&store).create(&job).await.unwrap();

        let recovered = recover_crashed_jobs(&store, &FakeClock::new()).await.unwrap();
        assert_eq!(recovered, 0);

        let fetched = JobRepo::new(&store).get(job.id).await.unwrap().job;
        assert_eq!(fetched.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn terminal_jobs_are_not_revisited() {
        let (store, task) = seeded().await;
        let mut job = pending_job(task.id);
        job.start_running();
        job.finish(JobStatus::Success, syncd_core::test_support::epoch(1_700_000_050));
        JobRepo::new(&store).create(&job).await.unwrap();

        let recovered = recover_crashed_jobs(&store, &FakeClock::new()).await.unwrap();
        assert_eq!(recovered, 0);
    }
}
