//! Protocol adapters: one typed request builder per endpoint dialect
//!
//! Each adapter turns `(system content, prompt, task profile, api config)` into
//! the headers and JSON body of one outbound call, and knows where the answer
//! and token count live in that dialect's responses when no template says
//! otherwise.
//!
//! - [`standard`] - bearer-token chat API
//! - [`private_hmac`] - HMAC-SHA1 signed v2.03 gateway
//! - [`template`] - placeholder substitution on the system instruction

pub mod private_hmac;
pub mod standard;
pub mod template;

pub use private_hmac::PrivateHmacAdapter;
pub use standard::StandardAdapter;

use crate::db::ApiConfig;
use crate::error::{Error, Result};
use crate::extract::MappingRules;
use crate::types::{PlatformType, TaskProfile};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::{Value, json};

/// Model-name substring identifying the higher-capacity tier
pub const HIGH_CAPACITY_MARKER: &str = "pro";

/// Output token cap for the higher-capacity tier
pub const HIGH_CAPACITY_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Output token cap for every other model
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Sampling temperature sent by both dialects
pub const TEMPERATURE: f64 = 1.0;

/// Headers and body of one outbound call
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    /// Request headers
    pub headers: HeaderMap,
    /// JSON body
    pub body: Value,
}

/// Shared capability of every dialect
pub trait ProtocolAdapter: Send + Sync {
    /// Dialect this adapter speaks
    fn platform(&self) -> PlatformType;

    /// Build headers and body for one prompt
    fn build_request(
        &self,
        system_content: &str,
        prompt: &str,
        task: &TaskProfile,
        config: &ApiConfig,
    ) -> Result<OutboundRequest>;

    /// Headers for a retry of `request` made at `now`
    ///
    /// Dialects whose authentication expires re-sign here. The body, and so
    /// any request id inside it, stays the same across attempts.
    fn retry_headers(
        &self,
        request: &OutboundRequest,
        _config: &ApiConfig,
        _now: DateTime<Utc>,
    ) -> Result<HeaderMap> {
        Ok(request.headers.clone())
    }

    /// Where answer/tokens live when the task has no usable template
    fn default_mapping(&self) -> MappingRules;
}

/// Adapter for a dialect
pub fn adapter_for(platform: PlatformType) -> &'static dyn ProtocolAdapter {
    match platform {
        PlatformType::Standard => &StandardAdapter,
        PlatformType::PrivateHmac => &PrivateHmacAdapter,
    }
}

/// Output token cap for a model name
pub fn max_output_tokens(model: &str) -> u32 {
    if model.contains(HIGH_CAPACITY_MARKER) {
        HIGH_CAPACITY_MAX_OUTPUT_TOKENS
    } else {
        DEFAULT_MAX_OUTPUT_TOKENS
    }
}

/// `tools` array attached when search is enabled
pub(crate) fn search_tools(use_search: bool) -> Option<Vec<Value>> {
    use_search.then(|| vec![json!({ "google_search": {} })])
}

/// Serialize a typed body into a JSON value
pub(crate) fn to_body<T: Serialize>(body: &T) -> Result<Value> {
    Ok(serde_json::to_value(body)?)
}

/// Insert a header, rejecting values that cannot be sent
pub(crate) fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    headers.insert(name, value);
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::ApiConfig;
    use crate::types::{ApiConfigId, PlatformType, TaskProfile, ThinkingLevel};

    pub(crate) fn api_config(api_user: Option<&str>) -> ApiConfig {
        ApiConfig {
            id: ApiConfigId(1),
            name: "relay".to_string(),
            base_url: "https://llm.example.com/v1/chat".to_string(),
            api_key: "sk-test".to_string(),
            api_user: api_user.map(str::to_string),
            created_at: 0,
        }
    }

    pub(crate) fn profile(platform: PlatformType, model: &str, use_search: bool) -> TaskProfile {
        TaskProfile {
            model: model.to_string(),
            thinking_level: ThinkingLevel::High,
            platform,
            use_search,
        }
    }
}
