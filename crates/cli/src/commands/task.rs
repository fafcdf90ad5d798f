// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rsyncctl task` - Task management commands

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use syncd_core::{ConnectionId, TaskId};

use crate::client::DaemonClient;
use crate::output::{print_list, print_one, OutputFormat};
use crate::types::{CreateTaskRequest, RunView, TaskView, UpdateTaskRequest};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Upload,
    Download,
    Bidirectional,
}

impl From<DirectionArg> for syncd_core::Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Upload => syncd_core::Direction::Upload,
            DirectionArg::Download => syncd_core::Direction::Download,
            DirectionArg::Bidirectional => syncd_core::Direction::Bidirectional,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task
    Create {
        name: String,
        source_path: PathBuf,
        connection_id: ConnectionId,
        remote_path: String,
        #[arg(value_enum)]
        direction: DirectionArg,
        /// Cron schedule; empty means "never scheduled"
        #[arg(long, default_value = "")]
        schedule: String,
        /// Trigger a sync on local filesystem changes
        #[arg(long)]
        realtime: bool,
    },
    /// List tasks, optionally filtered by connection
    List {
        #[arg(long)]
        connection_id: Option<ConnectionId>,
    },
    /// Show a task, including its latest job
    Get { id: TaskId },
    /// Update a task's fields
    Update {
        id: TaskId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        source_path: Option<PathBuf>,
        #[arg(long)]
        remote_path: Option<String>,
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        #[arg(long)]
        schedule: Option<String>,
        #[arg(long)]
        realtime: Option<bool>,
    },
    /// Delete a task (cascades to its jobs and job logs)
    Delete { id: TaskId },
    /// Trigger a manual run
    Run { id: TaskId },
}

pub async fn handle(command: TaskCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        TaskCommand::Create { name, source_path, connection_id, remote_path, direction, schedule, realtime } => {
            let req = CreateTaskRequest {
                name,
                source_path,
                connection_id,
                remote_path,
                direction: direction.into(),
                schedule,
                realtime,
            };
            let view: TaskView = client.post("/tasks", &req).await?;
            print_one(&view, format)
        }
        TaskCommand::List { connection_id } => {
            let path = match connection_id {
                Some(id) => format!("/tasks?connection_id={id}"),
                None => "/tasks".to_string(),
            };
            let views: Vec<TaskView> = client.get(&path).await?;
            print_list(&views, format)
        }
        TaskCommand::Get { id } => {
            let view: TaskView = client.get(&format!("/tasks/{id}")).await?;
            print_one(&view, format)
        }
        TaskCommand::Update { id, name, source_path, remote_path, direction, schedule, realtime } => {
            let req = UpdateTaskRequest {
                name,
                source_path,
                remote_path,
                direction: direction.map(Into::into),
                schedule,
                realtime,
            };
            let view: TaskView = client.put(&format!("/tasks/{id}"), &req).await?;
            print_one(&view, format)
        }
        TaskCommand::Delete { id } => {
            client.delete(&format!("/tasks/{id}")).await?;
            println!("deleted task {id}");
            Ok(())
        }
        TaskCommand::Run { id } => {
            let view: RunView = client.post(&format!("/tasks/{id}/run"), &()).await?;
            print_one(&view, format)
        }
    }
}
