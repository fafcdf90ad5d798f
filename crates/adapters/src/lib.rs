// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Transfer backends, the config cipher seam, and the directory-watch primitive.

mod backend;
mod cipher;
mod error;
mod local_backend;
mod watcher;

#[cfg(any(test, feature = "test-support"))]
mod fake_backend;

pub use backend::{BackendLogEvent, DirEntry, Quota, RemoteSpec, RunHandle, TransferBackend};
pub use cipher::{AesGcmCipher, ConfigCipher, PlaintextCipher};
pub use error::{BackendError, ErrorKind};
pub use local_backend::LocalBackend;
pub use watcher::{watch_directory, WatchHandle};

#[cfg(any(test, feature = "test-support"))]
pub use fake_backend::FakeTransferBackend;
