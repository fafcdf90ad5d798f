// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rsyncctl connection` - Connection management commands

use anyhow::Result;
use clap::{Args, Subcommand};
use syncd_core::ConnectionId;

use crate::client::DaemonClient;
use crate::output::{print_list, print_one, OutputFormat};
use crate::types::{ConnectionView, CreateConnectionRequest, UpdateConnectionRequest};

#[derive(Args)]
pub struct ConnectionArgs {
    #[command(subcommand)]
    pub command: ConnectionCommand,
}

#[derive(Subcommand)]
pub enum ConnectionCommand {
    /// Create a connection
    Create {
        name: String,
        /// Backend type, e.g. "local" or "s3"
        r#type: String,
        /// Backend-specific config as a JSON object
        #[arg(long)]
        config: Option<String>,
    },
    /// List connections
    List,
    /// Show a connection
    Get { id: ConnectionId },
    /// Rename a connection and/or replace its config
    Update {
        id: ConnectionId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Delete a connection (cascades to its tasks, jobs, and job logs)
    Delete { id: ConnectionId },
}

pub async fn handle(command: ConnectionCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        ConnectionCommand::Create { name, r#type, config } => {
            let config = parse_config(config)?;
            let req = CreateConnectionRequest { name, r#type, config };
            let view: ConnectionView = client.post("/connections", &req).await?;
            print_one(&view, format)
        }
        ConnectionCommand::List => {
            let views: Vec<ConnectionView> = client.get("/connections").await?;
            print_list(&views, format)
        }
        ConnectionCommand::Get { id } => {
            let view: ConnectionView = client.get(&format!("/connections/{id}")).await?;
            print_one(&view, format)
        }
        ConnectionCommand::Update { id, name, config } => {
            let config = match config {
                Some(raw) => Some(serde_json::from_str(&raw)?),
                None => None,
            };
            let req = UpdateConnectionRequest { name, config };
            let view: ConnectionView = client.put(&format!("/connections/{id}"), &req).await?;
            print_one(&view, format)
        }
        ConnectionCommand::Delete { id } => {
            client.delete(&format!("/connections/{id}")).await?;
            println!("deleted connection {id}");
            Ok(())
        }
    }
}

fn parse_config(raw: Option<String>) -> Result<serde_json::Value> {
    match raw {
        Some(s) => Ok(serde_json::from_str(&s)?),
        None => Ok(serde_json::Value::Null),
    }
}
