//! Bearer-token chat dialect

use super::{
    OutboundRequest, ProtocolAdapter, TEMPERATURE, insert_header, max_output_tokens, search_tools,
    to_body,
};
use crate::db::ApiConfig;
use crate::error::Result;
use crate::extract::MappingRules;
use crate::types::{PlatformType, TaskProfile};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde_json::Value;

/// Adapter for the standard chat API
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardAdapter;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    max_output_tokens: u32,
    temperature: f64,
    #[serde(rename = "thinkingConfig")]
    thinking_config: ThinkingConfig<'a>,
}

#[derive(Serialize)]
struct ThinkingConfig<'a> {
    #[serde(rename = "thinkingLevel")]
    thinking_level: &'a str,
}

/// `Authorization: Bearer` plus JSON content type
pub(crate) fn bearer_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, AUTHORIZATION, &format!("Bearer {api_key}"))?;
    insert_header(&mut headers, CONTENT_TYPE, "application/json")?;
    Ok(headers)
}

impl ProtocolAdapter for StandardAdapter {
    fn platform(&self) -> PlatformType {
        PlatformType::Standard
    }

    fn build_request(
        &self,
        system_content: &str,
        prompt: &str,
        task: &TaskProfile,
        config: &ApiConfig,
    ) -> Result<OutboundRequest> {
        let headers = bearer_headers(&config.api_key)?;
        let body = to_body(&ChatRequest {
            model: &task.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_content,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
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

    fn default_mapping(&self) -> MappingRules {
        MappingRules::default()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_support::{api_config, profile};
    use serde_json::json;

    #[test]
    fn builds_bearer_request_body() {
        let task = profile(PlatformType::Standard, "gemini-3-pro-preview", false);
        let request = StandardAdapter
            .build_request("be brief", "what is rust?", &task, &api_config(None))
            .unwrap();

        assert_eq!(request.headers[AUTHORIZATION], "Bearer sk-test");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(
            request.body,
            json!({
                "model": "gemini-3-pro-preview",
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "what is rust?" }
                ],
                "generationConfig": {
                    "max_output_tokens": 8192,
                    "temperature": 1.0,
                    "thinkingConfig": { "thinkingLevel": "high" }
                }
            })
        );
    }

    #[test]
    fn search_adds_tools_and_small_models_get_small_budget() {
        let task = profile(PlatformType::Standard, "gemini-3-flash", true);
        let request = StandardAdapter
            .build_request("s", "p", &task, &api_config(None))
            .unwrap();

        assert_eq!(request.body["tools"], json!([{ "google_search": {} }]));
        assert_eq!(
            request.body["generationConfig"]["max_output_tokens"],
            json!(2048)
        );
    }

    #[test]
    fn retries_reuse_bearer_headers() {
        let task = profile(PlatformType::Standard, "m", false);
        let config = api_config(None);
        let request = StandardAdapter.build_request("s", "p", &task, &config).unwrap();

        let headers = StandardAdapter
            .retry_headers(&request, &config, chrono::Utc::now())
            .unwrap();
        assert_eq!(headers, request.headers);
    }

    #[test]
    fn default_mapping_reads_chat_completion_shape() {
        let rules = StandardAdapter.default_mapping();
        assert_eq!(rules.answer, "choices.0.message.content");
        assert_eq!(rules.tokens, "usage.total_tokens");
    }
}
