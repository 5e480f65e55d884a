//! HMAC-SHA1 signed v2.03 gateway dialect
//!
//! The gateway drops `role: "system"` messages, so the system instruction is
//! repeated inside the user text. Keep both copies.

use super::{
    OutboundRequest, ProtocolAdapter, TEMPERATURE, insert_header, max_output_tokens, search_tools,
    to_body,
};
use crate::db::ApiConfig;
use crate::error::Result;
use crate::extract::MappingRules;
use crate::signing::{PRIVATE_API_VERSION, PRIVATE_SOURCE, sign_private};
use crate::types::{PlatformType, TaskProfile};
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, DATE, HeaderMap, HeaderName};
use serde::Serialize;
use serde_json::Value;

/// Default answer path in gateway responses
pub const PRIVATE_ANSWER_PATH: &str = "answer.0.value";

/// Default token path in gateway responses
pub const PRIVATE_TOKENS_PATH: &str = "cost_info.total_tokens";

/// Adapter for the private signed gateway
#[derive(Clone, Copy, Debug, Default)]
pub struct PrivateHmacAdapter;

#[derive(Serialize)]
struct GatewayRequest<'a> {
    request_id: String,
    model_marker: &'a str,
    messages: [GatewayMessage; 2],
    generation_config: GenerationConfig<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Serialize)]
struct GatewayMessage {
    role: &'static str,
    content: [TextPart; 1],
}

#[derive(Serialize)]
struct TextPart {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    max_output_tokens: u32,
    temperature: f64,
    thinking_config: ThinkingConfig<'a>,
}

#[derive(Serialize)]
struct ThinkingConfig<'a> {
    thinking_level: &'a str,
}

impl GatewayMessage {
    fn text(role: &'static str, value: String) -> Self {
        Self {
            role,
            content: [TextPart { kind: "text", value }],
        }
    }
}

/// User text carrying both the instruction and the prompt
pub fn combined_user_text(system_content: &str, prompt: &str) -> String {
    format!("SYSTEM_INSTRUCTION:\n{system_content}\n\nUSER_QUERY:\n{prompt}")
}

/// Signed gateway headers; the `Date` header is the exact signed date
pub(crate) fn signed_headers(
    api_key: &str,
    api_user: Option<&str>,
    now: DateTime<Utc>,
) -> Result<HeaderMap> {
    let auth = sign_private(api_key, api_user.unwrap_or_default(), now);

    let mut headers = HeaderMap::new();
    insert_header(&mut headers, AUTHORIZATION, &auth.authorization)?;
    insert_header(&mut headers, DATE, &auth.date)?;
    insert_header(&mut headers, HeaderName::from_static("source"), PRIVATE_SOURCE)?;
    insert_header(
        &mut headers,
        HeaderName::from_static("apiversion"),
        PRIVATE_API_VERSION,
    )?;
    insert_header(&mut headers, CONTENT_TYPE, "application/json")?;
    Ok(headers)
}

impl PrivateHmacAdapter {
    /// Build a request signed at `now`
    pub fn build_request_at(
        &self,
        system_content: &str,
        prompt: &str,
        task: &TaskProfile,
        config: &ApiConfig,
        now: DateTime<Utc>,
    ) -> Result<OutboundRequest> {
        let headers = signed_headers(&config.api_key, config.api_user.as_deref(), now)?;
        let body = to_body(&GatewayRequest {
            request_id: uuid::Uuid::new_v4().to_string(),
            model_marker: &task.model,
            messages: [
                GatewayMessage::text("system", system_content.to_string()),
                GatewayMessage::text("user", combined_user_text(system_content, prompt)),
            ],
            generation_config: GenerationConfig {
                max_output_tokens: max_output_tokens(&task.model),
                temperature: TEMPERATURE,
                thinking_config: ThinkingConfig {
                    thinking_level: task.thinking_level.as_str(),
                },
            },
            tools: search_tools(task.use_search),
        })?;

        Ok(OutboundRequest { headers, body })
    }
}

impl ProtocolAdapter for PrivateHmacAdapter {
    fn platform(&self) -> PlatformType {
        PlatformType::PrivateHmac
    }

    fn build_request(
        &self,
        system_content: &str,
        prompt: &str,
        task: &TaskProfile,
        config: &ApiConfig,
    ) -> Result<OutboundRequest> {
        self.build_request_at(system_content, prompt, task, config, Utc::now())
    }

    fn retry_headers(
        &self,
        _request: &OutboundRequest,
        config: &ApiConfig,
        now: DateTime<Utc>,
    ) -> Result<HeaderMap> {
        signed_headers(&config.api_key, config.api_user.as_deref(), now)
    }

    fn default_mapping(&self) -> MappingRules {
        MappingRules::with_fields(PRIVATE_ANSWER_PATH, PRIVATE_TOKENS_PATH)
    }
}
