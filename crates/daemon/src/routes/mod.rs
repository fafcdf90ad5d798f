// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST + SSE route table.

mod connections;
mod events;
mod jobs;
mod tasks;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/connections", post(connections::create_connection).get(connections::list_connections))
        .route(
            "/connections/:id",
            get(connections::get_connection).put(connections::update_connection).delete(connections::delete_connection),
        )
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/tasks/:id", get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task))
        .route("/tasks/:id/run", post(tasks::run_task))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/:id", get(jobs::get_job))
        .route("/jobs/:id/progress", get(jobs::get_job_progress))
        .route("/events", get(events::stream_events))
        .with_state(state)
}
