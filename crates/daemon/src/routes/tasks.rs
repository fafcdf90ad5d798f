// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tasks CRUD plus `POST /tasks/{id}/run`. Every mutation that changes a
//! Task's trigger configuration (schedule/realtime/source_path) re-registers
//! it with the Scheduler/Watcher so the in-memory loops stay in sync with
//! storage (§4.2/§4.3 of the design).

use crate::dto::{CreateTaskRequest, RunResponse, TaskResponse, UpdateTaskRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use syncd_core::{Clock, ConnectionId, Event, JobTrigger, NewTask, SystemClock, Task, TaskId, UuidIdGen};
use syncd_storage::{ConnectionRepo, JobListFilter, JobRepo, TaskRepo};

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub connection_id: Option<ConnectionId>,
}

async fn to_response(state: &AppState, task: &Task) -> Result<TaskResponse, ApiError> {
    let latest = JobRepo::new(&state.store)
        .list(JobListFilter { task_id: Some(task.id), limit: 1, ..Default::default() })
        .await?;
    Ok(TaskResponse::new(task, latest.first()))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    // Confirm the connection exists before creating a dangling foreign key.
    ConnectionRepo::new(&state.store).get(req.connection_id).await?;

    let task = Task::new(
        &UuidIdGen,
        NewTask {
            name: req.name,
            source_path: req.source_path,
            connection_id: req.connection_id,
            remote_path: req.remote_path,
            direction: req.direction,
            schedule: req.schedule,
            realtime: req.realtime,
            options: req.options.map(|o| o.into_options()).unwrap_or_default(),
        },
        SystemClock.now(),
    )?;
    TaskRepo::new(&state.store).create(&task).await?;
    register_task(&state, &task)?;

    let response = to_response(&state, &task).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = match query.connection_id {
        Some(connection_id) => TaskRepo::new(&state.store).list_by_connection(connection_id).await?,
        None => TaskRepo::new(&state.store).list().await?,
    };
    let mut responses = Vec::with_capacity(tasks.len());
    for task in &tasks {
        responses.push(to_response(&state, task).await?);
    }
    Ok(Json(responses))
}

pub async fn get_task(State(state): State<AppState>, Path(id): Path<TaskId>) -> Result<Json<TaskResponse>, ApiError> {
    let task = TaskRepo::new(&state.store).get(id).await?;
    Ok(Json(to_response(&state, &task).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let mut task = TaskRepo::new(&state.store).get(id).await?;
    let before = task.clone();

    if let Some(name) = req.name {
        task.name = name;
    }
    if let Some(source_path) = req.source_path {
        task.source_path = source_path;
    }
    if let Some(remote_path) = req.remote_path {
        task.remote_path = remote_path;
    }
    if let Some(direction) = req.direction {
        task.direction = direction;
    }
    if let Some(schedule) = req.schedule {
        task.schedule = schedule;
    }
    if let Some(realtime) = req.realtime {
        task.realtime = realtime;
    }
    if let Some(options) = req.options {
        task.options = options.into_options();
    }
    task.updated_at = SystemClock.now();

    TaskRepo::new(&state.store).update(&task).await?;

    if before.trigger_config_changed(&task) {
        deregister_task(&state, task.id);
        register_task(&state, &task)?;
    }
    state.broker.publish(Event::TaskUpdated { connection_id: task.connection_id, task_id: task.id });

    Ok(Json(to_response(&state, &task).await?))
}

pub async fn delete_task(State(state): State<AppState>, Path(id): Path<TaskId>) -> Result<StatusCode, ApiError> {
    deregister_task(&state, id);
    TaskRepo::new(&state.store).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn run_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<(StatusCode, Json<RunResponse>), ApiError> {
    let task = TaskRepo::new(&state.store).get(id).await?;
    let job_id = state.runner.start_task(&task, JobTrigger::Manual).await?;
    Ok((StatusCode::OK, Json(RunResponse { job_id })))
}

fn register_task(state: &AppState, task: &Task) -> Result<(), ApiError> {
    state.scheduler.add_task(task)?;
    state.watcher.add_task(task.clone())?;
    Ok(())
}

fn deregister_task(state: &AppState, task_id: TaskId) {
    state.scheduler.remove_task(task_id);
    state.watcher.remove_task(task_id);
}
