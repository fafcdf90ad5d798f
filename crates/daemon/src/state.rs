// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state handed to every axum handler. Constructed once at
//! startup by `lifecycle::Daemon` and cloned per request (every field is
//! itself cheaply `Clone`: an `Arc` or a pool handle).

use std::sync::Arc;
use syncd_adapters::ConfigCipher;
use syncd_core::SystemClock;
use syncd_engine::{Broker, Runner, Scheduler, Watcher};
use syncd_storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub broker: Broker,
    pub runner: Arc<Runner<SystemClock>>,
    pub scheduler: Arc<Scheduler<SystemClock>>,
    pub watcher: Arc<Watcher<SystemClock>>,
    pub cipher: Arc<dyn ConfigCipher>,
}
