// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::time::Duration;

use syncd_daemon::{Config, Daemon};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/storage work.
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("rclone-syncd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: rclone-syncd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        eprintln!("error: could not create data directory: {e}");
        std::process::exit(1);
    }

    let _log_guard = setup_logging(&config);

    info!("starting sync orchestration daemon");

    let daemon = match Daemon::start(&config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            error!(error = %e, "failed to start daemon");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(config.http_bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.http_bind_addr, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    info!(addr = %config.http_bind_addr, "listening");

    let app = daemon.router();
    let shutdown_timeout = config.shutdown_timeout;

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(wait_for_signal()).await {
        error!(error = %e, "server error");
    }

    info!("http server stopped, waiting for in-flight jobs");
    daemon.shutdown();

    let deadline = tokio::time::Instant::now() + shutdown_timeout;
    loop {
        let live = daemon.live_job_count().await;
        if live == 0 {
            info!("graceful shutdown complete");
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(live_jobs = live, "shutdown timed out with jobs still live");
            std::process::exit(2);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn wait_for_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(sig) => sig,
        Err(e) => {
            error!(error = %e, "failed to install SIGINT handler");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }
}

fn print_help() {
    println!("rclone-syncd {}", env!("CARGO_PKG_VERSION"));
    println!("Sync orchestration daemon: schedules, watches, and runs filesystem-to-object-store sync tasks.");
    println!();
    println!("USAGE:");
    println!("    rclone-syncd");
    println!();
    println!("The daemon serves a REST + SSE API (see `rsyncctl`) on APP_DATA_DIR/HTTP_BIND_ADDR.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn setup_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(&config.data_dir, "daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    guard
}
