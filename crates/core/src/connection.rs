// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A named remote endpoint a Task can sync against.

use crate::validate::{validate_name, ValidationError};
use crate::{define_id, IdGen};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

define_id! {
    pub struct ConnectionId;
}

/// Provider tag, e.g. `local`, `s3`, `onedrive`. Kept as a free-form string so the
/// core never has to know the full set of backends a deployment ships with; only
/// the transfer backend adapter interprets it (see `syncd-adapters::backend`).
pub type ConnectionType = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub name: String,
    pub r#type: ConnectionType,
    /// Opaque credential/config bytes. Only the concrete backend adapter and the
    /// configured `ConfigCipher` ever look inside; the core treats it as a blob.
    pub encrypted_config: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Construct a new Connection after validating `name` and `type`.
    pub fn new(
        id_gen: &impl IdGen,
        name: impl Into<String>,
        r#type: impl Into<String>,
        encrypted_config: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let r#type = r#type.into();
        validate_name(&name)?;
        if r#type.is_empty() {
            return Err(ValidationError::EmptyConnectionType);
        }
        Ok(Self {
            id: ConnectionId::from(id_gen.next()),
            name,
            r#type,
            encrypted_config,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-validate after an in-place rename/retype, bumping `updated_at`.
    pub fn rename(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.updated_at = now;
        Ok(())
    }
}
