// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron/interval-driven triggers. One background task per scheduled Task;
//! each tick re-reads the Task row before calling `Runner.start_task`, so
//! edits and deletions take effect without restarting the loop (§4.2 of the design).

use crate::error::EngineError;
use crate::runner::Runner;
use cron::Schedule;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use syncd_core::{parse_schedule, Clock, JobTrigger, ParsedSchedule, Task, TaskId};
use syncd_storage::{Store, TaskRepo};

pub struct Scheduler<C: Clock> {
    store: Store,
    runner: Arc<Runner<C>>,
    clock: C,
    handles: Mutex<HashMap<TaskId, tokio::task::JoinHandle<()>>>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(store: Store, runner: Arc<Runner<C>>, clock: C) -> Self {
        Self { store, runner, clock, handles: Mutex::new(HashMap::new()) }
    }

    /// Registers `task`'s schedule. An empty schedule is a no-op. Replaces
    /// any existing registration for the same task id.
    pub fn add_task(&self, task: &Task) -> Result<(), EngineError> {
        if task.schedule.is_empty() {
            return Ok(());
        }
        self.remove_task(task.id);

        let parsed = parse_schedule(&task.schedule).map_err(|e| EngineError::InvalidInput(e.0))?;
        let store = self.store.clone();
        let runner = Arc::clone(&self.runner);
        let clock = self.clock.clone();
        let task_id = task.id;
        let handle = tokio::spawn(run_schedule(store, runner, clock, task_id, parsed));
        self.handles.lock().insert(task_id, handle);
        Ok(())
    }

    pub fn remove_task(&self, task_id: TaskId) {
        if let Some(handle) = self.handles.lock().remove(&task_id) {
            handle.abort();
        }
    }

    pub fn is_scheduled(&self, task_id: TaskId) -> bool {
        self.handles.lock().contains_key(&task_id)
    }

    pub fn scheduled_count(&self) -> usize {
        self.handles.lock().len()
    }
}

async fn run_schedule<C: Clock>(store: Store, runner: Arc<Runner<C>>, clock: C, task_id: TaskId, parsed: ParsedSchedule) {
    match parsed {
        ParsedSchedule::Every(period) => {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // first tick fires immediately; skip it, schedules fire on the period
            loop {
                interval.tick().await;
                if !fire(&store, &runner, task_id).await {
                    break;
                }
            }
        }
        ParsedSchedule::Cron(schedule) => loop {
            let Some(sleep_for) = next_sleep_duration(&schedule, &clock) else { break };
            tokio::time::sleep(sleep_for).await;
            if !fire(&store, &runner, task_id).await {
                break;
            }
        },
    }
}

fn next_sleep_duration<C: Clock>(schedule: &Schedule, clock: &C) -> Option<Duration> {
    let now = clock.now();
    let next = schedule.after(&now).next()?;
    Some((next - now).to_std().unwrap_or(Duration::ZERO))
}

/// Re-reads the Task and starts it. Returns `false` if the Task has been
/// deleted (the loop's signal to stop).
async fn fire<C: Clock>(store: &Store, runner: &Arc<Runner<C>>, task_id: TaskId) -> bool {
    let task = match TaskRepo::new(store).get(task_id).await {
        Ok(task) => task,
        Err(_) => return false,
    };
    match runner.start_task(&task, JobTrigger::Schedule).await {
        Ok(_) => {}
        Err(EngineError::AlreadyRunning(_)) => {
            tracing::debug!(task_id = %task_id, "scheduled trigger skipped: already running");
        }
        Err(e) => tracing::warn!(task_id = %task_id, error = %e, "scheduled trigger failed to start"),
    }
    true
}
