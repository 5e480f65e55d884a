//! Resilient outbound calls
//!
//! [`ResilientExecutor::send`] posts one JSON body and returns the parsed JSON
//! response. Attempts are strictly sequential; attempt `i` runs under an
//! escalating timeout and failures are paced by [`crate::retry`]. The executor
//! never writes anything itself.

use crate::config::ExecutorConfig;
use crate::error::{ExecutionError, Result};
use crate::retry::{Sleeper, TokioSleeper, attempt_timeout, with_retry};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Body of a successful call: the parsed value and the exact text it came from
#[derive(Clone, Debug, PartialEq)]
pub struct JsonResponse {
    /// Parsed body
    pub value: Value,
    /// Body as received, byte for byte
    pub text: String,
}

/// Sequential retrying HTTP client for JSON endpoints
#[derive(Clone)]
pub struct ResilientExecutor {
    client: Client,
    config: ExecutorConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for ResilientExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResilientExecutor {
    /// Create an executor that sleeps on the tokio timer
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            config,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the source of pauses between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Retry and timeout settings in use
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// POST `body` to `url` and return the parsed JSON response
    ///
    /// - timeout: retried after `timeout_retry_delay`, [`ExecutionError::Timeout`] on the last attempt
    /// - 4xx: [`ExecutionError::ClientStatus`] immediately
    /// - other non-200: retried after `backoff_unit * 2^i`, [`ExecutionError::ServerStatus`] on the last attempt
    /// - 200 with a non-JSON body: [`ExecutionError::InvalidBody`] immediately
    pub async fn send(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
    ) -> std::result::Result<JsonResponse, ExecutionError> {
        self.send_with(url, body, |_| Ok(headers.clone())).await
    }

    /// Like [`send`](Self::send), with headers built afresh for every attempt
    ///
    /// `headers_for` receives the 0-based attempt index. A failure to build
    /// them ends the call with [`ExecutionError::InvalidRequest`].
    pub async fn send_with<H>(
        &self,
        url: &str,
        body: &Value,
        headers_for: H,
    ) -> std::result::Result<JsonResponse, ExecutionError>
    where
        H: Fn(u32) -> Result<HeaderMap>,
    {
        with_retry(&self.config, self.sleeper.as_ref(), |attempt| {
            let headers = headers_for(attempt);
            async move {
                let headers = headers.map_err(|e| ExecutionError::InvalidRequest(e.to_string()))?;
                self.attempt(url, &headers, body, attempt).await
            }
        })
        .await
    }

    /// One attempt under `timeout`, returning the status and body text as-is
    pub async fn send_once(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<(StatusCode, String), ExecutionError> {
        self.post(url, headers, body, timeout)
            .await
            .map_err(|e| classify_transport(e, 1, timeout))
    }

    async fn attempt(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
        attempt: u32,
    ) -> std::result::Result<JsonResponse, ExecutionError> {
        let timeout = attempt_timeout(&self.config, attempt);
        tracing::debug!(url, attempt = attempt + 1, timeout_secs = timeout.as_secs(), "sending request");

        let (status, text) = self
            .post(url, headers, body, timeout)
            .await
            .map_err(|e| classify_transport(e, attempt + 1, timeout))?;

        if status == StatusCode::OK {
            let value = serde_json::from_str(&text).map_err(ExecutionError::InvalidBody)?;
            return Ok(JsonResponse { value, text });
        }
        if status.is_client_error() {
            return Err(ExecutionError::ClientStatus { status, body: text });
        }
        Err(ExecutionError::ServerStatus {
            status,
            body: text,
            attempts: attempt + 1,
        })
    }

    async fn post(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .json(body)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn classify_transport(error: reqwest::Error, attempts: u32, timeout: Duration) -> ExecutionError {
    if error.is_timeout() {
        ExecutionError::Timeout { attempts, timeout }
    } else {
        ExecutionError::Transport(error)
    }
}
