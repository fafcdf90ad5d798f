// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local-filesystem-to-local-filesystem implementation of `TransferBackend`.
//!
//! This is the one provider implemented in full; remote providers (s3, onedrive,
//! ...) plug into the same trait but are out of scope here (see `RemoteSpec`).

use crate::backend::{BackendLogEvent, DirEntry, Quota, RemoteSpec, RunHandle, TransferBackend};
use crate::error::BackendError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use syncd_core::{ConflictResolution, Direction, JobLogLevel, JobLogWhat, TaskOptions, TransferStats};
use tokio::sync::{mpsc, oneshot};

#[derive(Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

/// One planned action against a relative path, decided during the tree walk.
enum Action {
    Copy { from: PathBuf, to: PathBuf, rel: String, size: i64, what: JobLogWhat },
    Delete { path: PathBuf, rel: String },
}

#[async_trait]
impl TransferBackend for LocalBackend {
    async fn run(
        &self,
        direction: Direction,
        source_path: &Path,
        remote: RemoteSpec,
        options: TaskOptions,
    ) -> Result<RunHandle, BackendError> {
        let (stats_tx, stats_rx) = mpsc::channel(16);
        let (log_tx, log_rx) = mpsc::channel(256);
        let (completion_tx, completion) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let source_path = source_path.to_path_buf();
        let remote_path = PathBuf::from(&remote.remote_path);

        tokio::task::spawn_blocking(move || {
            let result = run_sync(direction, &source_path, &remote_path, &options, &stats_tx, &log_tx, cancel_rx);
            let _ = completion_tx.send(result);
        });

        Ok(RunHandle { stats_rx, log_rx, completion, cancel: cancel_tx })
    }

    async fn test(&self, connection_type: &str, _decrypted_config: &[u8]) -> Result<(), BackendError> {
        if connection_type != "local" {
            return Err(BackendError::InvalidInput(format!(
                "LocalBackend cannot test connection type {connection_type:?}"
            )));
        }
        Ok(())
    }

    async fn quota(&self, remote: &RemoteSpec) -> Result<Quota, BackendError> {
        let path = PathBuf::from(&remote.remote_path);
        match fs::metadata(&path) {
            Ok(_) => Ok(Quota::default()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Quota::default()),
            Err(e) => Err(BackendError::Io(e)),
        }
    }

    async fn list_directory(&self, remote: &RemoteSpec, path: &str) -> Result<Vec<DirEntry>, BackendError> {
        let base = PathBuf::from(&remote.remote_path).join(path);
        let mut out = Vec::new();
        for entry in fs::read_dir(&base)? {
            let entry = entry?;
            let is_dir = entry.file_type()?.is_dir();
            out.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path().to_string_lossy().to_string(),
                is_dir,
            });
        }
        Ok(out)
    }
}

/// Blocking implementation of the sync itself; runs off the tokio runtime via
/// `spawn_blocking` since it is plain synchronous filesystem I/O.
fn run_sync(
    direction: Direction,
    source_path: &Path,
    remote_path: &Path,
    options: &TaskOptions,
    stats_tx: &mpsc::Sender<TransferStats>,
    log_tx: &mpsc::Sender<BackendLogEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<(), BackendError> {
    let actions = match direction {
        Direction::Upload => plan_one_way(source_path, remote_path, options, JobLogWhat::Upload)?,
        Direction::Download => plan_one_way(remote_path, source_path, options, JobLogWhat::Download)?,
        Direction::Bidirectional => plan_bidirectional(source_path, remote_path, options)?,
    };

    let mut bytes = 0i64;
    let mut files = 0i64;
    let mut deletions = 0i64;
    let mut errors = 0i64;

    for action in actions {
        if cancel_rx.try_recv().is_ok() {
            return Err(BackendError::Other("cancelled".into()));
        }

        match action {
            Action::Copy { from, to, rel, size, what } => match copy_one(&from, &to) {
                Ok(()) => {
                    bytes += size;
                    files += 1;
                    let _ = log_tx.try_send(BackendLogEvent {
                        time: Utc::now(),
                        level: JobLogLevel::Info,
                        what,
                        path: rel,
                        size,
                    });
                }
                Err(e) => {
                    errors += 1;
                    let _ = log_tx.try_send(BackendLogEvent {
                        time: Utc::now(),
                        level: JobLogLevel::Error,
                        what: JobLogWhat::Error,
                        path: rel,
                        size: 0,
                    });
                    tracing::warn!(error = %e, "copy failed");
                }
            },
            Action::Delete { path, rel } => match fs::remove_file(&path) {
                Ok(()) => {
                    deletions += 1;
                    let _ = log_tx.try_send(BackendLogEvent {
                        time: Utc::now(),
                        level: JobLogLevel::Info,
                        what: JobLogWhat::Delete,
                        path: rel,
                        size: 0,
                    });
                }
                Err(e) => {
                    errors += 1;
                    tracing::warn!(error = %e, "delete failed");
                }
            },
        }

        let _ = stats_tx.try_send(TransferStats {
            bytes,
            files,
            deletions,
            errors,
            active_transfers: Vec::new(),
        });
    }

    Ok(())
}

fn copy_one(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Walk `src` recursively, returning every regular file's path relative to `src`.
fn walk_files(root: &Path, options: &TaskOptions) -> std::io::Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    if !root.exists() {
        return Ok(out);
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                stack.push(path);
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            if options.path_included(&rel) {
                out.insert(rel);
            }
        }
    }
    Ok(out)
}

fn plan_one_way(src: &Path, dst: &Path, options: &TaskOptions, what: JobLogWhat) -> Result<Vec<Action>, BackendError> {
    let src_files = walk_files(src, options)?;
    let mut actions = Vec::new();
    for rel in &src_files {
        let from = src.join(rel);
        let size = fs::metadata(&from).map(|m| m.len() as i64).unwrap_or(0);
        actions.push(Action::Copy { from, to: dst.join(rel), rel: rel.clone(), size, what });
    }
    if !options.no_delete {
        let dst_files = walk_files(dst, options)?;
        for rel in dst_files.difference(&src_files) {
            actions.push(Action::Delete { path: dst.join(rel), rel: rel.clone() });
        }
    }
    Ok(actions)
}

/// `a` is always the local `source_path`, `b` the remote path: a copy from
/// `a` to `b` is an upload, a copy from `b` to `a` is a download.
fn plan_bidirectional(a: &Path, b: &Path, options: &TaskOptions) -> Result<Vec<Action>, BackendError> {
    let a_files = walk_files(a, options)?;
    let b_files = walk_files(b, options)?;
    let mut actions = Vec::new();

    for rel in a_files.difference(&b_files) {
        let from = a.join(rel);
        let size = fs::metadata(&from).map(|m| m.len() as i64).unwrap_or(0);
        actions.push(Action::Copy { from, to: b.join(rel), rel: rel.clone(), size, what: JobLogWhat::Upload });
    }
    for rel in b_files.difference(&a_files) {
        let from = b.join(rel);
        let size = fs::metadata(&from).map(|m| m.len() as i64).unwrap_or(0);
        actions.push(Action::Copy { from, to: a.join(rel), rel: rel.clone(), size, what: JobLogWhat::Download });
    }
    for rel in a_files.intersection(&b_files) {
        let a_path = a.join(rel);
        let b_path = b.join(rel);
        let a_mtime = fs::metadata(&a_path).and_then(|m| m.modified()).ok();
        let b_mtime = fs::metadata(&b_path).and_then(|m| m.modified()).ok();
        if a_mtime == b_mtime {
            continue;
        }
        let a_wins = match options.conflict_resolution {
            ConflictResolution::Local => true,
            ConflictResolution::Remote => false,
            ConflictResolution::Newer => a_mtime > b_mtime,
        };
        let size = fs::metadata(if a_wins { &a_path } else { &b_path })
            .map(|m| m.len() as i64)
            .unwrap_or(0);
        if a_wins {
            actions.push(Action::Copy { from: a_path, to: b_path, rel: rel.clone(), size, what: JobLogWhat::Upload });
        } else {
            actions.push(Action::Copy { from: b_path, to: a_path, rel: rel.clone(), size, what: JobLogWhat::Download });
        }
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn remote(path: &Path) -> RemoteSpec {
        RemoteSpec {
            connection_type: "local".into(),
            decrypted_config: Vec::new(),
            remote_path: path.to_string_lossy().to_string(),
        }
    }

    #[tokio::test]
    async fn upload_copies_all_regular_files() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), b"hello").unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub/b.txt"), b"world!").unwrap();

        let backend = LocalBackend::new();
        let mut handle = backend
            .run(Direction::Upload, src.path(), remote(dst.path()), TaskOptions::default())
            .await
            .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap();
        assert!(result.is_ok());

        let mut total_files = 0;
        let mut total_bytes = 0;
        while let Ok(stats) = handle.stats_rx.try_recv() {
            total_files = stats.files;
            total_bytes = stats.bytes;
        }
        assert_eq!(total_files, 2);
        assert_eq!(total_bytes, 11);
        assert_eq!(std::fs::read(dst.path().join("a.txt")).unwrap(), b"hello");
        assert_eq!(std::fs::read(dst.path().join("sub/b.txt")).unwrap(), b"world!");
    }

    #[tokio::test]
    async fn upload_deletes_extraneous_destination_files_unless_no_delete() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(dst.path().join("stale.txt"), b"old").unwrap();

        let backend = LocalBackend::new();
        let handle = backend
            .run(Direction::Upload, src.path(), remote(dst.path()), TaskOptions::default())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap().unwrap();
        assert!(!dst.path().join("stale.txt").exists());
    }

    #[tokio::test]
    async fn no_delete_keeps_extraneous_destination_files() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(dst.path().join("stale.txt"), b"old").unwrap();
        let options = TaskOptions { no_delete: true, ..TaskOptions::default() };

        let backend = LocalBackend::new();
        let handle = backend.run(Direction::Upload, src.path(), remote(dst.path()), options).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap().unwrap();
        assert!(dst.path().join("stale.txt").exists());
    }

    #[tokio::test]
    async fn upload_logs_are_tagged_upload_not_download() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), b"hello").unwrap();

        let backend = LocalBackend::new();
        let mut handle = backend
            .run(Direction::Upload, src.path(), remote(dst.path()), TaskOptions::default())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap().unwrap();

        let log = handle.log_rx.try_recv().unwrap();
        assert_eq!(log.what, JobLogWhat::Upload);
    }

    #[tokio::test]
    async fn download_logs_are_tagged_download_not_upload() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(dst.path().join("a.txt"), b"hello").unwrap();

        let backend = LocalBackend::new();
        let mut handle = backend
            .run(Direction::Download, src.path(), remote(dst.path()), TaskOptions::default())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap().unwrap();

        let log = handle.log_rx.try_recv().unwrap();
        assert_eq!(log.what, JobLogWhat::Download);
        assert_eq!(std::fs::read(src.path().join("a.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn bidirectional_tags_each_copy_by_its_actual_direction() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        std::fs::write(a.path().join("only_local.txt"), b"from-a").unwrap();
        std::fs::write(b.path().join("only_remote.txt"), b"from-b").unwrap();

        let backend = LocalBackend::new();
        let mut handle = backend
            .run(Direction::Bidirectional, a.path(), remote(b.path()), TaskOptions::default())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap().unwrap();

        let mut whats = Vec::new();
        while let Ok(log) = handle.log_rx.try_recv() {
            whats.push((log.path, log.what));
        }
        assert_eq!(
            whats.iter().find(|(p, _)| p == "only_local.txt").map(|(_, w)| *w),
            Some(JobLogWhat::Upload)
        );
        assert_eq!(
            whats.iter().find(|(p, _)| p == "only_remote.txt").map(|(_, w)| *w),
            Some(JobLogWhat::Download)
        );
    }

    #[tokio::test]
    async fn zero_byte_files_are_still_counted() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(src.path().join("empty.txt"), b"").unwrap();

        let backend = LocalBackend::new();
        let mut handle = backend
            .run(Direction::Upload, src.path(), remote(dst.path()), TaskOptions::default())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.completion).await.unwrap().unwrap().unwrap();
        let mut files = 0;
        while let Ok(stats) = handle.stats_rx.try_recv() {
            files = stats.files;
        }
        assert_eq!(files, 1);
        assert!(dst.path().join("empty.txt").exists());
    }
}
