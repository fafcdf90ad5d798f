// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transfer backend contract: the capability set `{run, test, quota,
//! list_directory}` that the SyncEngine drives. Concrete providers (local, s3,
//! onedrive, ...) plug in behind this trait; the core never sees their config shape.

use crate::error::BackendError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use syncd_core::{Direction, JobLogLevel, JobLogWhat, TaskOptions, TransferStats};
use tokio::sync::{mpsc, oneshot};

/// Everything the backend needs to address a remote: which connection, and
/// which path within it. `encrypted_config` stays opaque to everyone but the
/// concrete backend (decrypted first via a `ConfigCipher`, see `crate::cipher`).
#[derive(Debug, Clone)]
pub struct RemoteSpec {
    pub connection_type: String,
    pub decrypted_config: Vec<u8>,
    pub remote_path: String,
}

/// A single per-object event from the backend's log stream.
#[derive(Debug, Clone)]
pub struct BackendLogEvent {
    pub time: DateTime<Utc>,
    pub level: JobLogLevel,
    pub what: JobLogWhat,
    pub path: String,
    pub size: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Quota {
    pub total: Option<i64>,
    pub used: Option<i64>,
    pub free: Option<i64>,
    pub trashed: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

/// Handle to a live `run` invocation: the two streams the SyncEngine's progress
/// loop consumes, the completion signal, and a cooperative cancellation switch.
pub struct RunHandle {
    pub stats_rx: mpsc::Receiver<TransferStats>,
    pub log_rx: mpsc::Receiver<BackendLogEvent>,
    pub completion: oneshot::Receiver<Result<(), BackendError>>,
    pub cancel: oneshot::Sender<()>,
}

#[async_trait]
pub trait TransferBackend: Send + Sync {
    async fn run(
        &self,
        direction: Direction,
        source_path: &std::path::Path,
        remote: RemoteSpec,
        options: TaskOptions,
    ) -> Result<RunHandle, BackendError>;

    async fn test(&self, connection_type: &str, decrypted_config: &[u8]) -> Result<(), BackendError>;

    async fn quota(&self, remote: &RemoteSpec) -> Result<Quota, BackendError>;

    async fn list_directory(&self, remote: &RemoteSpec, path: &str) -> Result<Vec<DirEntry>, BackendError>;
}
