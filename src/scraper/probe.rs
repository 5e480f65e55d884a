//! Single-shot connection probe.

use crate::error::Result;
use crate::protocol::private_hmac::signed_headers;
use crate::protocol::standard::bearer_headers;
use crate::types::PlatformType;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::Scraper;

/// How much of a non-JSON body is echoed back
const RAW_TEXT_LIMIT: usize = 500;

/// Endpoint settings to try before saving them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// Endpoint URL
    pub base_url: String,
    /// Bearer token or HMAC secret
    pub api_key: String,
    /// Signing identity for the private dialect
    #[serde(default)]
    pub api_user: Option<String>,
    /// Endpoint dialect
    pub platform_type: PlatformType,
    /// Model to ask; the configured probe model when absent
    #[serde(default)]
    pub model: Option<String>,
}

fn probe_request(request: &ProbeRequest, model: &str, prompt: &str) -> Result<(HeaderMap, Value)> {
    match request.platform_type {
        PlatformType::Standard => {
            let headers = bearer_headers(&request.api_key)?;
            let body = json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
            });
            Ok((headers, body))
        }
        PlatformType::PrivateHmac => {
            let headers = signed_headers(
                &request.api_key,
                request.api_user.as_deref(),
                chrono::Utc::now(),
            )?;
            let body = json!({
                "request_id": uuid::Uuid::new_v4().to_string(),
                "model_marker": model,
                "messages": [{
                    "role": "user",
                    "content": [{ "type": "text", "value": prompt }],
                }],
            });
            Ok((headers, body))
        }
    }
}

impl Scraper {
    /// Send one fixed prompt and return whatever came back
    ///
    /// Made for authoring mapping rules: the raw JSON body is returned as-is,
    /// whatever the status. A non-JSON body comes back as
    /// `{"error", "raw_text"}` with the first 500 characters, and a request
    /// that never completed as `{"error"}`. No retries.
    pub async fn probe(&self, request: &ProbeRequest) -> Value {
        let probe = &self.config.probe;
        let model = request.model.as_deref().unwrap_or(&probe.default_model);

        let (headers, body) = match probe_request(request, model, &probe.prompt) {
            Ok(parts) => parts,
            Err(e) => return json!({ "error": format!("请求执行失败: {e}") }),
        };

        match self
            .executor
            .send_once(&request.base_url, &headers, &body, probe.timeout)
            .await
        {
            Ok((status, text)) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(_) => {
                    tracing::debug!(url = %request.base_url, %status, "probe response is not JSON");
                    json!({
                        "error": "接口未返回有效 JSON",
                        "raw_text": text.chars().take(RAW_TEXT_LIMIT).collect::<String>(),
                    })
                }
            },
            Err(e) => {
                tracing::warn!(url = %request.base_url, error = %e, "probe request failed");
                json!({ "error": format!("请求执行失败: {e}") })
            }
        }
    }
}
