// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connections CRUD. Not listed in the endpoint table verbatim, but required
//! by the cascade-delete scenario (`DELETE /connections/{id}`) and by every
//! other scenario's setup step, so this resource mirrors Tasks' shape.

use crate::dto::{ConnectionResponse, CreateConnectionRequest, UpdateConnectionRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use syncd_core::{Clock, Connection, ConnectionId, SystemClock, Task, TaskId, UuidIdGen};
use syncd_storage::{ConnectionRepo, TaskRepo};

pub async fn create_connection(
    State(state): State<AppState>,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ConnectionResponse>), ApiError> {
    let config_bytes = serde_json::to_vec(&req.config).unwrap_or_default();
    let encrypted = state.cipher.encrypt(&config_bytes).map_err(syncd_engine::EngineError::Backend)?;
    let conn = Connection::new(&UuidIdGen, req.name, req.r#type, encrypted, SystemClock.now())?;
    ConnectionRepo::new(&state.store).create(&conn).await?;
    Ok((StatusCode::CREATED, Json(ConnectionResponse::from(&conn))))
}

pub async fn list_connections(State(state): State<AppState>) -> Result<Json<Vec<ConnectionResponse>>, ApiError> {
    let connections = ConnectionRepo::new(&state.store).list().await?;
    Ok(Json(connections.iter().map(ConnectionResponse::from).collect()))
}

pub async fn get_connection(
    State(state): State<AppState>,
    Path(id): Path<ConnectionId>,
) -> Result<Json<ConnectionResponse>, ApiError> {
    let conn = ConnectionRepo::new(&state.store).get(id).await?;
    Ok(Json(ConnectionResponse::from(&conn)))
}

pub async fn update_connection(
    State(state): State<AppState>,
    Path(id): Path<ConnectionId>,
    Json(req): Json<UpdateConnectionRequest>,
) -> Result<Json<ConnectionResponse>, ApiError> {
    let mut conn = ConnectionRepo::new(&state.store).get(id).await?;
    let now = SystemClock.now();
    if let Some(name) = req.name {
        conn.rename(name, now)?;
    }
    if let Some(config) = req.config {
        let config_bytes = serde_json::to_vec(&config).unwrap_or_default();
        conn.encrypted_config = state.cipher.encrypt(&config_bytes).map_err(syncd_engine::EngineError::Backend)?;
        conn.updated_at = now;
    }
    ConnectionRepo::new(&state.store).update(&conn).await?;
    Ok(Json(ConnectionResponse::from(&conn)))
}

/// Deletes the Connection and, via `ON DELETE CASCADE`, every Task/Job/JobLog
/// under it. Tears down live Scheduler/Watcher registrations for those Tasks first
/// so no in-memory handle outlives the rows it refers to.
pub async fn delete_connection(
    State(state): State<AppState>,
    Path(id): Path<ConnectionId>,
) -> Result<StatusCode, ApiError> {
    let tasks: Vec<Task> = TaskRepo::new(&state.store).list_by_connection(id).await?;
    for task in &tasks {
        deregister_task(&state, task.id);
    }
    ConnectionRepo::new(&state.store).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn deregister_task(state: &AppState, task_id: TaskId) {
    state.scheduler.remove_task(task_id);
    state.watcher.remove_task(task_id);
}
