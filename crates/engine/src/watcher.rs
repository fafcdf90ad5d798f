// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime-trigger business logic: owns one debounced directory watch per
//! realtime Task (via `syncd_adapters::watch_directory`) and coalesces fires
//! that land while a run is already in flight into a single queued re-run,
//! woken by the Broker's `job_completed`/`job_failed` events (§4.3 of the design).

use crate::broker::Broker;
use crate::error::EngineError;
use crate::runner::Runner;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use syncd_core::{Clock, Event, JobTrigger, Task, TaskId};
use tokio::sync::mpsc;

/// Debounce window between the last filesystem event in a burst and the
/// coalesced trigger firing.
const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

struct TaskWatch {
    watch: syncd_adapters::WatchHandle,
    coalescer: tokio::task::JoinHandle<()>,
}

pub struct Watcher<C: Clock> {
    runner: Arc<Runner<C>>,
    broker: Broker,
    watches: Mutex<HashMap<TaskId, TaskWatch>>,
}

impl<C: Clock> Watcher<C> {
    pub fn new(runner: Arc<Runner<C>>, broker: Broker) -> Self {
        Self { runner, broker, watches: Mutex::new(HashMap::new()) }
    }

    /// Registers a directory watch for `task` and starts its coalescer. A
    /// non-realtime task is a no-op. Replaces any existing watch for the same id.
    pub fn add_task(&self, task: Task) -> Result<(), EngineError> {
        if !task.realtime {
            return Ok(());
        }
        self.remove_task(task.id);

        let (fired_tx, fired_rx) = mpsc::channel(1);
        let watch = syncd_adapters::watch_directory(&task.source_path, DEFAULT_DEBOUNCE, fired_tx)
            .map_err(EngineError::Backend)?;

        let runner = Arc::clone(&self.runner);
        let sub = self.broker.subscribe();
        let coalescer = tokio::spawn(run_coalescer(runner, sub, fired_rx, task.clone()));

        self.watches.lock().insert(task.id, TaskWatch { watch, coalescer });
        Ok(())
    }

    /// Tears down the watch and its coalescer for `task_id`. A no-op if it
    /// wasn't being watched (handles repeated task-deletion notifications cleanly).
    pub fn remove_task(&self, task_id: TaskId) {
        if let Some(entry) = self.watches.lock().remove(&task_id) {
            entry.watch.stop();
            entry.coalescer.abort();
        }
    }

    pub fn is_watching(&self, task_id: TaskId) -> bool {
        self.watches.lock().contains_key(&task_id)
    }

    pub fn watched_count(&self) -> usize {
        self.watches.lock().len()
    }
}

fn event_task_id(event: &Event) -> TaskId {
    match event {
        Event::JobStarted { task_id, .. }
        | Event::JobProgress { task_id, .. }
        | Event::TransferProgress { task_id, .. }
        | Event::JobCompleted { task_id, .. }
        | Event::JobFailed { task_id, .. }
        | Event::LogLine { task_id, .. }
        | Event::TaskUpdated { task_id, .. } => *task_id,
    }
}

async fn run_coalescer<C: Clock>(
    runner: Arc<Runner<C>>,
    mut sub: crate::broker::Subscription,
    mut fired_rx: mpsc::Receiver<()>,
    task: Task,
) {
    let mut pending = false;
    loop {
        tokio::select! {
            fired = fired_rx.recv() => {
                match fired {
                    Some(()) => {
                        match runner.start_task(&task, JobTrigger::Realtime).await {
                            Ok(_) => pending = false,
                            Err(EngineError::AlreadyRunning(_)) => pending = true,
                            Err(e) => tracing::warn!(task_id = %task.id, error = %e, "realtime trigger failed to start"),
                        }
                    }
                    None => break,
                }
            }
            event = sub.recv() => {
                match event {
                    Some(event) if pending && event_task_id(&event) == task.id => {
                        if matches!(event, Event::JobCompleted { .. } | Event::JobFailed { .. }) {
                            pending = false;
                            match runner.start_task(&task, JobTrigger::Realtime).await {
                                Ok(_) => {}
                                Err(EngineError::AlreadyRunning(_)) => pending = true,
                                Err(e) => tracing::warn!(task_id = %task.id, error = %e, "queued realtime re-run failed to start"),
                            }
                        }
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }
}
