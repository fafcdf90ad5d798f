// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate. Everything the
//! process needs is collected and validated once here, passed down as an
//! explicit struct — business logic never reads `std::env` directly.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_CLEANUP_SCHEDULE: &str = "@daily";
const DEFAULT_LOG_MAX_PER_CONNECTION: i64 = 10_000;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_BIND_ADDR: &str = "127.0.0.1:8821";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a platform data directory; set APP_DATA_DIR explicitly")]
    NoDataDir,
    #[error("ENCRYPTION_KEY must decode to exactly 32 bytes (hex or base64), got {0} bytes")]
    BadEncryptionKeyLength(usize),
    #[error("ENCRYPTION_KEY is not valid hex or base64: {0}")]
    BadEncryptionKeyEncoding(String),
    #[error("LOG_CLEANUP_SCHEDULE is not a valid schedule: {0}")]
    BadLogCleanupSchedule(String),
    #[error("LOG_MAX_PER_CONNECTION must be a positive integer: {0}")]
    BadLogMaxPerConnection(String),
    #[error("SHUTDOWN_TIMEOUT_SECS must be a positive integer: {0}")]
    BadShutdownTimeout(String),
    #[error("HTTP_BIND_ADDR is not a valid socket address: {0}")]
    BadBindAddr(String),
}

/// Daemon configuration, collected from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root data directory (e.g. `~/.local/share/rclone-sync`); holds the SQLite file.
    pub data_dir: PathBuf,
    /// 32-byte secret for `Connection.encrypted_config`, absent in plaintext mode.
    pub encryption_key: Option<[u8; 32]>,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_level: String,
    /// Own cron schedule for the log-cleanup sweep.
    pub log_cleanup_schedule: String,
    /// Per-connection `JobLog` retention ceiling.
    pub log_max_per_connection: i64,
    /// Graceful-shutdown wait for in-flight jobs before exit code 2.
    pub shutdown_timeout: Duration,
    /// REST + SSE listen address.
    pub http_bind_addr: SocketAddr,
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("rclone-sync.db")
    }

    /// Collect and validate every environment-driven setting in one place.
    /// Any failure here is a startup failure (process exit code 1).
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match std::env::var("APP_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("rclone-sync"),
        };

        let encryption_key = match std::env::var("ENCRYPTION_KEY") {
            Ok(raw) if !raw.is_empty() => Some(decode_encryption_key(&raw)?),
            _ => {
                tracing::warn!("ENCRYPTION_KEY not set: Connection configs are stored in plaintext");
                None
            }
        };

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_cleanup_schedule =
            std::env::var("LOG_CLEANUP_SCHEDULE").unwrap_or_else(|_| DEFAULT_LOG_CLEANUP_SCHEDULE.to_string());
        syncd_core::parse_schedule(&log_cleanup_schedule)
            .map_err(|e| ConfigError::BadLogCleanupSchedule(e.0))?;

        let log_max_per_connection = match std::env::var("LOG_MAX_PER_CONNECTION") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::BadLogMaxPerConnection(raw))?,
            Err(_) => DEFAULT_LOG_MAX_PER_CONNECTION,
        };

        let shutdown_timeout = match std::env::var("SHUTDOWN_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| ConfigError::BadShutdownTimeout(raw))?),
            Err(_) => Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        };

        let http_bind_addr = match std::env::var("HTTP_BIND_ADDR") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::BadBindAddr(raw))?,
            Err(_) => DEFAULT_HTTP_BIND_ADDR.parse().expect("static default is valid"),
        };

        Ok(Self {
            data_dir,
            encryption_key,
            log_level,
            log_cleanup_schedule,
            log_max_per_connection,
            shutdown_timeout,
            http_bind_addr,
        })
    }
}

/// Accepts hex (64 chars) or standard base64 (44 chars incl. padding).
fn decode_encryption_key(raw: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = if raw.len() == 64 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
        hex_decode(raw).map_err(|e| ConfigError::BadEncryptionKeyEncoding(e.to_string()))?
    } else {
        base64_decode(raw).map_err(|e| ConfigError::BadEncryptionKeyEncoding(e.to_string()))?
    };
    if bytes.len() != 32 {
        return Err(ConfigError::BadEncryptionKeyLength(bytes.len()));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}

fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd-length hex string".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

fn base64_decode(s: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(s).map_err(|e| e.to_string())
}
