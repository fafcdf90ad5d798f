// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository error classification. Services above this layer re-emit these
//! without changing their kind and add operation context (see §7 of the design).

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    System,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} with name {name:?} already exists")]
    AlreadyExists { entity: &'static str, name: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    System(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound { .. } => ErrorKind::NotFound,
            StorageError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            StorageError::InvalidInput(_) => ErrorKind::InvalidInput,
            StorageError::System(_) | StorageError::Migration(_) => ErrorKind::System,
        }
    }

    /// Classify a raw sqlx error, recognizing the UNIQUE constraint violation that
    /// signals a name collision rather than a generic system failure.
    pub fn from_insert(entity: &'static str, name: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return StorageError::AlreadyExists {
                    entity,
                    name: name.to_string(),
                };
            }
        }
        StorageError::System(err)
    }
}
