// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive directory watcher primitive, built on `notify`. Mirrors the
//! teacher's `create_file_watcher` + event-pump split in `agent/watcher.rs`,
//! generalized from one log file to an arbitrary recursive directory tree.
//!
//! This crate only owns the raw notify plumbing and debounce timer; deciding
//! what a debounced fire *means* (calling `Runner.start_task`, coalescing a
//! pending run while one is in flight) is `syncd-engine::watcher`'s job, which
//! cannot live here because it needs to depend on the Runner and the broker.

use crate::error::BackendError;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Handle to a live recursive watch. Dropping it (or calling `stop`) tears
/// down the OS watch and its debounce pump task.
pub struct WatchHandle {
    shutdown: Option<oneshot::Sender<()>>,
}

impl WatchHandle {
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start watching `path` recursively. `debounce` is reset on every filesystem
/// event; `fired_tx` receives one `()` each time the debounce window elapses
/// with no further events. Returns immediately; failing to open the watch is
/// a `BackendError` the caller logs as a `log_line` rather than propagates fatally.
pub fn watch_directory(path: &Path, debounce: Duration, fired_tx: mpsc::Sender<()>) -> Result<WatchHandle, BackendError> {
    let (raw_tx, mut raw_rx) = mpsc::channel(64);
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if res.is_ok() {
            let _ = raw_tx.blocking_send(());
        }
    })?;
    watcher.watch(path, RecursiveMode::Recursive)?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        // Keep the watcher alive for the lifetime of the pump task.
        let _watcher = watcher;
        let mut deadline: Option<Instant> = None;

        loop {
            let sleep = async {
                match deadline {
                    Some(d) => tokio::time::sleep_until(d).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                Some(()) = raw_rx.recv() => {
                    deadline = Some(Instant::now() + debounce);
                }
                () = sleep => {
                    deadline = None;
                    if fired_tx.send(()).await.is_err() {
                        break;
                    }
                }
                _ = &mut shutdown_rx => break,
            }
        }
    });

    Ok(WatchHandle { shutdown: Some(shutdown_tx) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn fires_once_after_debounce_window_following_a_burst() {
        let dir = tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let handle = watch_directory(dir.path(), Duration::from_millis(100), tx).unwrap();

        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{i}.txt")), b"x").unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let fired = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(fired.is_ok());
        assert!(rx.try_recv().is_err(), "burst should coalesce into a single fire");

        handle.stop();
    }

    #[tokio::test]
    async fn stop_tears_down_the_watch() {
        let dir = tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let handle = watch_directory(dir.path(), Duration::from_millis(50), tx).unwrap();
        handle.stop();
        std::fs::write(dir.path().join("after_stop.txt"), b"x").unwrap();
        let fired = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(fired.is_err() || fired.unwrap().is_none());
    }
}
