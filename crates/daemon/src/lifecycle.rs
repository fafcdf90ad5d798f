// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root. Builds every long-lived component once at startup and
//! wires them together, the way the teacher's own daemon builds its
//! `DaemonState` — a single struct owning every handle the process needs,
//! constructed in a fixed order and torn down in reverse (§5, §9 of the design).

use crate::config::Config;
use crate::routes;
use crate::state::AppState;
use std::sync::Arc;
use syncd_adapters::{AesGcmCipher, ConfigCipher, LocalBackend, PlaintextCipher, TransferBackend};
use syncd_core::SystemClock;
use syncd_engine::{Broker, LogCleanupConfig, Runner, Scheduler, SyncEngine, Watcher};
use syncd_storage::{Store, TaskRepo};

pub struct Daemon {
    pub state: AppState,
    log_cleanup: tokio::task::JoinHandle<()>,
}

impl Daemon {
    /// Opens storage, runs crash recovery, then brings up the Scheduler and
    /// Watcher for every Task currently in the store. Order matters: recovery
    /// must finish before any new Job can start, or a just-recovered `cancelled`
    /// Job could race a freshly scheduled one for the same Task.
    pub async fn start(config: &Config) -> Result<Self, DaemonStartError> {
        std::fs::create_dir_all(&config.data_dir).map_err(DaemonStartError::DataDir)?;
        let store = syncd_storage::connect(&config.database_path()).await?;

        let clock = SystemClock;
        syncd_engine::recover_crashed_jobs(&store, &clock).await?;

        let broker = Broker::new();
        let cipher: Arc<dyn ConfigCipher> = build_cipher(config);
        let backend: Arc<dyn TransferBackend> = Arc::new(LocalBackend::new());
        let sync_engine = Arc::new(SyncEngine::new(store.clone(), broker.clone(), backend, Arc::clone(&cipher), clock));
        let runner = Arc::new(Runner::new(store.clone(), sync_engine, clock));
        let scheduler = Arc::new(Scheduler::new(store.clone(), Arc::clone(&runner), clock));
        let watcher = Arc::new(Watcher::new(Arc::clone(&runner), broker.clone()));

        for task in TaskRepo::new(&store).list().await? {
            scheduler.add_task(&task)?;
            watcher.add_task(task)?;
        }

        let log_cleanup = syncd_engine::spawn_log_cleanup(
            store.clone(),
            clock,
            LogCleanupConfig { schedule: config.log_cleanup_schedule.clone(), keep_latest: config.log_max_per_connection },
        )?;

        Ok(Self { state: AppState { store, broker, runner, scheduler, watcher, cipher }, log_cleanup })
    }

    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    /// Returns the number of Tasks still `running` or `pending` at the moment
    /// of the call — used by the shutdown path to decide exit code 0 vs 2.
    pub async fn live_job_count(&self) -> usize {
        syncd_storage::JobRepo::new(&self.state.store)
            .list(syncd_storage::JobListFilter::default())
            .await
            .map(|jobs| jobs.iter().filter(|j| j.status.is_live()).count())
            .unwrap_or(0)
    }

    pub fn shutdown(&self) {
        self.log_cleanup.abort();
    }
}

fn build_cipher(config: &Config) -> Arc<dyn ConfigCipher> {
    match &config.encryption_key {
        Some(key) => Arc::new(AesGcmCipher::new(key)),
        None => Arc::new(PlaintextCipher),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonStartError {
    #[error("could not create data directory: {0}")]
    DataDir(std::io::Error),

    #[error(transparent)]
    Storage(#[from] syncd_storage::StorageError),

    #[error(transparent)]
    Engine(#[from] syncd_engine::EngineError),
}
