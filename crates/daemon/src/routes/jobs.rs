// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only Jobs surface: list (by task/connection), fetch with logs, and
//! the live `ProgressSnapshot` for a running Job.

use crate::dto::{JobListResponse, JobResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use syncd_core::{ConnectionId, JobId, TaskId};
use syncd_storage::JobRepo;

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub task_id: Option<TaskId>,
    pub connection_id: Option<ConnectionId>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<JobListResponse>, ApiError> {
    let filter = syncd_storage::JobListFilter {
        task_id: query.task_id,
        connection_id: query.connection_id,
        limit: query.limit,
        offset: query.offset,
    };
    let jobs = JobRepo::new(&state.store).list(filter).await?;
    let data: Vec<JobResponse> = jobs.iter().map(JobResponse::without_logs).collect();
    Ok(Json(JobListResponse { total: data.len(), data }))
}

pub async fn get_job(State(state): State<AppState>, Path(id): Path<JobId>) -> Result<Json<JobResponse>, ApiError> {
    let with_logs = JobRepo::new(&state.store).get(id).await?;
    Ok(Json(JobResponse::with_logs(&with_logs.job, &with_logs.logs)))
}

pub async fn get_job_progress(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<syncd_engine::ProgressSnapshot>, ApiError> {
    state
        .runner
        .get_job_progress(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job {id} is not live")))
}
