// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rsyncctl job` - read-only Job commands

use anyhow::Result;
use clap::{Args, Subcommand};
use syncd_core::{ConnectionId, JobId, TaskId};

use crate::client::DaemonClient;
use crate::output::{print_list, print_one, OutputFormat};
use crate::types::{JobListView, JobView, ProgressView};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// List jobs, optionally filtered by task or connection
    List {
        #[arg(long)]
        task_id: Option<TaskId>,
        #[arg(long)]
        connection_id: Option<ConnectionId>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Show a job, including its logs
    Get { id: JobId },
    /// Show a running job's live progress (404 once it has finished)
    Progress { id: JobId },
}

pub async fn handle(command: JobCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        JobCommand::List { task_id, connection_id, limit, offset } => {
            let mut query = format!("limit={limit}&offset={offset}");
            if let Some(id) = task_id {
                query.push_str(&format!("&task_id={id}"));
            }
            if let Some(id) = connection_id {
                query.push_str(&format!("&connection_id={id}"));
            }
            let list: JobListView = client.get(&format!("/jobs?{query}")).await?;
            print_list(&list.data, format)
        }
        JobCommand::Get { id } => {
            let view: JobView = client.get(&format!("/jobs/{id}")).await?;
            print_one(&view, format)
        }
        JobCommand::Progress { id } => {
            let view: ProgressView = client.get(&format!("/jobs/{id}/progress")).await?;
            print_one(&view, format)
        }
    }
}
