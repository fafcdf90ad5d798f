// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client over the daemon's REST + SSE surface. One place that
//! knows how to reach the daemon and how to turn its `{error, message}`
//! bodies into a readable `anyhow::Error` (mirrors the teacher's
//! `DaemonClient`, adapted from a Unix-socket protocol to HTTP).

use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8821";

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new() -> anyhow::Result<Self> {
        let base_url = std::env::var("RSYNCCTL_DAEMON_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if status.is_success() {
            Ok(serde_json::from_slice(&bytes)?)
        } else if let Ok(err) = serde_json::from_slice::<ErrorBody>(&bytes) {
            anyhow::bail!("{} ({})", err.message, err.error)
        } else {
            anyhow::bail!("daemon returned {status}")
        }
    }

    async fn handle_empty(response: reqwest::Response) -> anyhow::Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await?;
        if let Ok(err) = serde_json::from_slice::<ErrorBody>(&bytes) {
            anyhow::bail!("{} ({})", err.message, err.error)
        }
        anyhow::bail!("daemon returned {status}")
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::handle(response).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> anyhow::Result<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::handle(response).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> anyhow::Result<T> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::handle(response).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::handle_empty(response).await
    }

    /// Streams SSE blocks from an endpoint, parsing each block's `event:` label
    /// and `data:` payload (dropping the keep-alive comment lines), until the
    /// connection closes or the caller stops polling.
    pub async fn stream_events(
        &self,
        path: &str,
        mut on_event: impl FnMut(&str, serde_json::Value),
    ) -> anyhow::Result<()> {
        let response = self.http.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("daemon returned {}", response.status());
        }
        let mut stream = response.bytes_stream();
        let mut buf = String::new();
        while let Some(chunk) = stream.next().await {
            buf.push_str(&String::from_utf8_lossy(&chunk?));
            while let Some(idx) = buf.find("\n\n") {
                let block: String = buf.drain(..idx + 2).collect();
                let mut event_label = String::new();
                let mut data = None;
                for line in block.lines() {
                    if let Some(label) = line.strip_prefix("event:") {
                        event_label = label.trim().to_string();
                    } else if let Some(raw) = line.strip_prefix("data:") {
                        data = serde_json::from_str::<serde_json::Value>(raw.trim()).ok();
                    }
                }
                if let Some(value) = data {
                    on_event(&event_label, value);
                }
            }
        }
        Ok(())
    }
}
