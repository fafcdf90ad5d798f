// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors shared by the data model types. Storage and API layers
//! classify these as `invalid_input` (see `ErrorKind` in `syncd-engine`/`syncd-daemon`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must not have leading or trailing whitespace")]
    WhitespaceInName,
    #[error("name contains a reserved character: {0:?}")]
    ReservedCharacter(char),
    #[error("connection type must not be empty")]
    EmptyConnectionType,
    #[error("source_path must not be empty")]
    EmptySourcePath,
    #[error("remote_path must not be empty")]
    EmptyRemotePath,
    #[error("invalid cron expression {0:?}: {1}")]
    InvalidCron(String, String),
    #[error("transfers must be at least 1")]
    InvalidTransfers,
}

/// Characters disallowed in `Connection`/`Task` names: they collide with scoping or
/// path separators used elsewhere in the system (log paths, SSE filter query strings).
const RESERVED_NAME_CHARS: &[char] = &['/', '\\', ':', '\0'];

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.trim() != name {
        return Err(ValidationError::WhitespaceInName);
    }
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(ValidationError::ReservedCharacter(c));
    }
    Ok(())
}
