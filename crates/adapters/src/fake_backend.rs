// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted `TransferBackend` for exercising the SyncEngine's progress loop
//! without touching real I/O. Gated behind `test-support`, mirroring the
//! teacher's `FakeNotifyAdapter` convention.

use crate::backend::{BackendLogEvent, DirEntry, Quota, RemoteSpec, RunHandle, TransferBackend};
use crate::error::BackendError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use syncd_core::{Direction, TaskOptions, TransferStats};
use tokio::sync::{mpsc, oneshot};

pub struct FakeTransferBackend {
    stats: Vec<TransferStats>,
    logs: Vec<BackendLogEvent>,
    result: Mutex<Option<Result<(), BackendError>>>,
}

impl FakeTransferBackend {
    pub fn new() -> Self {
        Self { stats: Vec::new(), logs: Vec::new(), result: Mutex::new(Some(Ok(()))) }
    }

    pub fn with_stats(mut self, stats: Vec<TransferStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_logs(mut self, logs: Vec<BackendLogEvent>) -> Self {
        self.logs = logs;
        self
    }

    pub fn with_result(mut self, result: Result<(), BackendError>) -> Self {
        self.result = Mutex::new(Some(result));
        self
    }
}

impl Default for FakeTransferBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferBackend for FakeTransferBackend {
    async fn run(
        &self,
        _direction: Direction,
        _source_path: &Path,
        _remote: RemoteSpec,
        _options: TaskOptions,
    ) -> Result<RunHandle, BackendError> {
        let (stats_tx, stats_rx) = mpsc::channel(64);
        let (log_tx, log_rx) = mpsc::channel(64);
        let (completion_tx, completion) = oneshot::channel();
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        let stats = self.stats.clone();
        let logs = self.logs.clone();
        let result = self
            .result
            .lock()
            .take()
            .unwrap_or_else(|| Ok(()));

        tokio::spawn(async move {
            for s in stats {
                if cancel_rx.try_recv().is_ok() {
                    let _ = completion_tx.send(Err(BackendError::Other("cancelled".into())));
                    return;
                }
                let _ = stats_tx.send(s).await;
            }
            for l in logs {
                let _ = log_tx.send(l).await;
            }
            let _ = completion_tx.send(result);
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
