// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /events`: broker fan-out as Server-Sent Events, filtered by event kind
//! and/or connection name (§6 of the design).

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures_util::stream;
use futures_util::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use syncd_core::{ConnectionId, EventKind};
use syncd_storage::ConnectionRepo;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub event: Option<String>,
    pub connection_name: Option<String>,
}

pub async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let event_filter = query
        .event
        .map(|raw| event_kind_from_str(&raw))
        .transpose()
        .map_err(ApiError::InvalidInput)?;

    let connection_filter = match query.connection_name {
        Some(name) => {
            let connections = ConnectionRepo::new(&state.store).list().await?;
            Some(
                connections
                    .into_iter()
                    .find(|c| c.name == name)
                    .ok_or_else(|| ApiError::InvalidInput(format!("no connection named {name:?}")))?
                    .id,
            )
        }
        None => None,
    };

    let subscription = state.broker.subscribe();
    let events = stream::unfold(subscription, |mut sub| async move { sub.recv().await.map(|e| (e, sub)) })
        .filter_map(move |event| {
            let keep = event_filter.map(|k| k == event.kind()).unwrap_or(true)
                && matches_connection(&event, connection_filter);
            async move { keep.then(|| to_sse_event(&event)) }
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keep-alive")))
}

fn matches_connection(event: &syncd_core::Event, filter: Option<ConnectionId>) -> bool {
    match filter {
        Some(id) => event.connection_id() == id,
        None => true,
    }
}

fn to_sse_event(event: &syncd_core::Event) -> Result<SseEvent, Infallible> {
    let kind = event.kind();
    let label = serde_json::to_value(kind).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
    let payload = serde_json::to_value(event).ok().and_then(|v| v.get("payload").cloned()).unwrap_or_default();
    Ok(SseEvent::default().event(label).json_data(payload).unwrap_or_else(|_| SseEvent::default()))
}

fn event_kind_from_str(raw: &str) -> Result<EventKind, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown event kind {raw:?}"))
}
