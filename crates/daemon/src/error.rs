// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps `EngineError`/`StorageError` kinds to HTTP status codes in exactly one
//! place (§7 of the design: "the REST layer maps kind → status code once").

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use syncd_core::ValidationError;
use syncd_engine::{EngineError, ErrorKind};
use syncd_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) => status_for(e.kind()),
            ApiError::Storage(e) => status_for_storage(e.kind()),
            ApiError::Validation(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn kind_label(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => kind_label(e.kind()),
            ApiError::Storage(e) => kind_label_storage(e.kind()),
            ApiError::Validation(_) | ApiError::InvalidInput(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::AlreadyRunning => StatusCode::CONFLICT,
        ErrorKind::System => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
    }
}

fn status_for_storage(kind: syncd_storage::ErrorKind) -> StatusCode {
    match kind {
        syncd_storage::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        syncd_storage::ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        syncd_storage::ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        syncd_storage::ErrorKind::System => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::AlreadyExists => "already_exists",
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::AlreadyRunning => "already_running",
        ErrorKind::System => "system",
        ErrorKind::Unauthorized => "unauthorized",
    }
}

fn kind_label_storage(kind: syncd_storage::ErrorKind) -> &'static str {
    match kind {
        syncd_storage::ErrorKind::NotFound => "not_found",
        syncd_storage::ErrorKind::AlreadyExists => "already_exists",
        syncd_storage::ErrorKind::InvalidInput => "invalid_input",
        syncd_storage::ErrorKind::System => "system",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody { error: self.kind_label().to_string(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}
