// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rsyncctl events` - tail the daemon's SSE stream

use anyhow::Result;
use clap::Args;

use crate::client::DaemonClient;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct EventsArgs {
    /// Only show events of this kind, e.g. "job_progress" or "log_line"
    #[arg(long)]
    pub event: Option<String>,
    /// Only show events for the connection with this name
    #[arg(long)]
    pub connection_name: Option<String>,
}

pub async fn handle(args: EventsArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let mut path = "/events".to_string();
    let mut params = Vec::new();
    if let Some(event) = &args.event {
        params.push(format!("event={event}"));
    }
    if let Some(name) = &args.connection_name {
        params.push(format!("connection_name={name}"));
    }
    if !params.is_empty() {
        path.push('?');
        path.push_str(&params.join("&"));
    }

    client
        .stream_events(&path, |kind, payload| match format {
            OutputFormat::Json => println!("{}", serde_json::json!({"type": kind, "payload": payload})),
            OutputFormat::Text => println!("{kind}  {payload}"),
        })
        .await
}
