// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rsyncctl - CLI client for the sync orchestration daemon

mod client;
mod commands;
mod output;
mod types;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::DaemonClient;
use commands::{connection, events, job, task};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "rsyncctl", version, about = "Control the sync orchestration daemon")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connection management
    Connection(connection::ConnectionArgs),
    /// Task management
    Task(task::TaskArgs),
    /// Job management
    Job(job::JobArgs),
    /// Tail the daemon's live event stream
    Events(events::EventsArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new()?;

    match cli.command {
        Commands::Connection(args) => connection::handle(args.command, &client, cli.output).await,
        Commands::Task(args) => task::handle(args.command, &client, cli.output).await,
        Commands::Job(args) => job::handle(args.command, &client, cli.output).await,
        Commands::Events(args) => events::handle(args, &client, cli.output).await,
    }
}
