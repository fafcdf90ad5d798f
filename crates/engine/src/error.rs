// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error classification. Mirrors the storage/adapters `kind()`
//! convention but carries the two kinds only the engine can produce:
//! `already_running` (Runner exclusion) and `unauthorized` (reserved, unused
//! by the single-process core, per §7 of the design).

use syncd_adapters::BackendError;
use syncd_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    AlreadyRunning,
    System,
    Unauthorized,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("task {0} is already running")]
    AlreadyRunning(String),

    #[error("task {0} is not running")]
    NotRunning(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::AlreadyRunning(_) => ErrorKind::AlreadyRunning,
            EngineError::NotRunning(_) => ErrorKind::InvalidInput,
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
            EngineError::Storage(e) => match e.kind() {
                syncd_storage::ErrorKind::NotFound => ErrorKind::NotFound,
                syncd_storage::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
                syncd_storage::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
                syncd_storage::ErrorKind::System => ErrorKind::System,
            },
            EngineError::Backend(e) => match e.kind() {
                syncd_adapters::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
                syncd_adapters::ErrorKind::System => ErrorKind::System,
            },
        }
    }
}
