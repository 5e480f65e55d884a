//! One prompt: build, send, extract, persist.
//!
//! Every call records exactly one entry before returning, whatever happened
//! on the wire. Only a failed database write escapes as an error.

use crate::db::{ApiConfig, NewTaskEntry};
use crate::error::Result;
use crate::extract::{MappingRules, extract_standard, get_value_by_path, has_evidence, text_form};
use crate::protocol::{ProtocolAdapter, template};
use crate::types::{EntryId, EntryStatus, Event, TaskId, TaskProfile};
use serde_json::{Value, json};

use super::Scraper;

/// Appended to answers of responses that show tool calls
pub const TOOL_USAGE_NOTE: &str = "\n\n[注：本回答调用了外部工具]";

const FAILURE_PREFIX: &str = "抓取失败: ";
const UPSTREAM_ERROR_PREFIX: &str = "接口返回错误: ";
const EMPTY_ANSWER_PREFIX: &str = "回答为空, finish_reason: ";
const UNKNOWN_FINISH_REASON: &str = "unknown";

/// Everything a prompt needs that is fixed for the whole batch
pub(crate) struct BatchContext<'a> {
    pub(crate) task_id: TaskId,
    pub(crate) profile: &'a TaskProfile,
    pub(crate) api_config: &'a ApiConfig,
    pub(crate) adapter: &'static dyn ProtocolAdapter,
    pub(crate) mapping: &'a MappingRules,
    pub(crate) system_instruction: Option<&'a str>,
}

/// Answer, tokens and status derived from one response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Text stored as the entry's answer
    pub answer: String,
    /// Tokens stored with the entry
    pub tokens_used: i64,
    /// Entry status
    pub status: EntryStatus,
}

/// Judge a successfully received response
///
/// A blank answer is a failed entry even though the call itself succeeded.
/// Its text then names the upstream error message, or failing that the
/// finish reason. A non-blank answer with tool-call evidence gets
/// [`TOOL_USAGE_NOTE`] appended.
pub fn evaluate_response(raw: &Value, rules: &MappingRules) -> Outcome {
    let extracted = extract_standard(raw, Some(rules));

    if extracted.is_blank() {
        let upstream_error = get_value_by_path(raw, &rules.error)
            .map(text_form)
            .filter(|msg| !msg.trim().is_empty());
        let answer = match upstream_error {
            Some(msg) => format!("{UPSTREAM_ERROR_PREFIX}{msg}"),
            None => {
                let reason = get_value_by_path(raw, &rules.finish_reason)
                    .filter(|v| !v.is_null())
                    .map(text_form)
                    .unwrap_or_else(|| UNKNOWN_FINISH_REASON.to_string());
                format!("{EMPTY_ANSWER_PREFIX}{reason}")
            }
        };
        return Outcome {
            answer,
            tokens_used: 0,
            status: EntryStatus::Failed,
        };
    }

    let mut answer = extracted.answer;
    if has_evidence(raw, &rules.tool_calls) {
        answer.push_str(TOOL_USAGE_NOTE);
    }

    Outcome {
        answer,
        tokens_used: extracted.tokens,
        status: EntryStatus::Success,
    }
}

/// Entry fields for a prompt whose request never produced a response
fn failure_outcome(detail: &str, profile: &TaskProfile) -> (Outcome, String) {
    let raw = json!({
        "error": detail,
        "last_level": profile.thinking_level.as_str(),
    });
    (
        Outcome {
            answer: format!("{FAILURE_PREFIX}{detail}"),
            tokens_used: 0,
            status: EntryStatus::Failed,
        },
        raw.to_string(),
    )
}

impl Scraper {
    /// Run one prompt and record its entry
    pub(crate) async fn scrape_one(&self, ctx: &BatchContext<'_>, prompt: &str) -> Result<(EntryId, EntryStatus)> {
        let prompt = prompt.trim();
        let system_content = template::resolve_system_content(
            ctx.system_instruction,
            chrono::Local::now().naive_local(),
            &self.config.template.location,
        );

        let (outcome, raw_response) = match ctx
            .adapter
            .build_request(&system_content, prompt, ctx.profile, ctx.api_config)
        {
            Err(e) => {
                tracing::error!(task_id = ctx.task_id.get(), error = %e, "failed to build request");
                failure_outcome(&e.to_string(), ctx.profile)
            }
            Ok(request) => {
                let headers_for = |attempt: u32| match attempt {
                    0 => Ok(request.headers.clone()),
                    _ => ctx
                        .adapter
                        .retry_headers(&request, ctx.api_config, chrono::Utc::now()),
                };
                match self
                    .executor
                    .send_with(&ctx.api_config.base_url, &request.body, headers_for)
                    .await
                {
                    Err(e) => {
                        tracing::error!(task_id = ctx.task_id.get(), error = %e, "prompt failed");
                        failure_outcome(&e.to_string(), ctx.profile)
                    }
                    Ok(response) => (evaluate_response(&response.value, ctx.mapping), response.text),
                }
            }
        };

        let entry_id = self
            .db
            .insert_entry(&NewTaskEntry {
                task_id: ctx.task_id,
                prompt: prompt.to_string(),
                answer: outcome.answer,
                raw_response,
                tokens_used: outcome.tokens_used,
                status: outcome.status,
            })
            .await?;

        tracing::debug!(
            task_id = ctx.task_id.get(),
            entry_id = entry_id.get(),
            status = %outcome.status,
            tokens = outcome.tokens_used,
            "entry recorded"
        );
        self.emit_event(Event::EntryRecorded {
            task_id: ctx.task_id,
            entry_id,
            status: outcome.status,
            tokens_used: outcome.tokens_used,
        });

        Ok((entry_id, outcome.status))
    }
}
