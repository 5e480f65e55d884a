//! Database layer for prompt-scraper
//!
//! Handles SQLite persistence for endpoint configurations, response templates,
//! instruction presets, scrape tasks and their recorded entries.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`api_configs`] — Endpoint configuration CRUD
//! - [`templates`] — Response mapping templates
//! - [`presets`] — System-instruction presets
//! - [`tasks`] — Scrape task creation and lifecycle updates
//! - [`entries`] — Append-only prompt outcomes and per-task statistics

use crate::types::{ApiConfigId, EntryId, EntryStatus, PresetId, TaskId, TaskStatus, TemplateId};
use serde::Serialize;
use sqlx::{FromRow, sqlite::SqlitePool};

mod api_configs;
mod entries;
mod migrations;
mod presets;
mod tasks;
mod templates;

/// New endpoint configuration to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewApiConfig {
    /// Unique display name
    pub name: String,
    /// Endpoint URL every request is POSTed to
    pub base_url: String,
    /// Bearer token or HMAC secret
    pub api_key: String,
    /// Signing identity, required by the private dialect only
    pub api_user: Option<String>,
}

/// Endpoint configuration record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiConfig {
    /// Unique database ID
    pub id: ApiConfigId,
    /// Unique display name
    pub name: String,
    /// Endpoint URL every request is POSTed to
    pub base_url: String,
    /// Bearer token or HMAC secret
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Signing identity, required by the private dialect only
    pub api_user: Option<String>,
    /// Unix timestamp when the configuration was created
    pub created_at: i64,
}

/// New response template to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewResponseTemplate {
    /// Display name
    pub name: String,
    /// JSON object mapping field names to dotted paths
    pub mapping_rules: Option<String>,
}

/// Response template record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResponseTemplate {
    /// Unique database ID
    pub id: TemplateId,
    /// Display name
    pub name: String,
    /// JSON object mapping field names to dotted paths, stored verbatim
    pub mapping_rules: Option<String>,
    /// Unix timestamp when the template was created
    pub created_at: i64,
}

/// New instruction preset to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewTaskPreset {
    /// Display name
    pub name: String,
    /// System instruction text, may contain placeholders
    pub content: String,
}

/// Instruction preset record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskPreset {
    /// Unique database ID
    pub id: PresetId,
    /// Display name
    pub name: String,
    /// System instruction text, may contain placeholders
    pub content: String,
    /// Unix timestamp when the preset was created
    pub created_at: i64,
}

/// New scrape task; always inserted as `pending`
#[derive(Debug, Clone)]
pub struct NewScrapeTask {
    /// Display name
    pub name: String,
    /// Upstream model name
    pub model: String,
    /// Reasoning effort; validated when the batch starts
    pub thinking_level: Option<String>,
    /// Endpoint dialect; validated when the batch starts
    pub platform_type: String,
    /// Whether to attach the search tool
    pub use_search: bool,
    /// Endpoint the task was created for
    pub api_config_id: Option<ApiConfigId>,
    /// Mapping template, if any
    pub template_id: Option<TemplateId>,
}

/// Scrape task record from database
///
/// `platform_type` and `thinking_level` are kept as stored text so that an
/// unknown value fails the batch instead of the read.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScrapeTask {
    /// Unique database ID
    pub id: TaskId,
    /// Display name
    pub name: String,
    /// Upstream model name
    pub model: String,
    /// Reasoning effort
    pub thinking_level: Option<String>,
    /// Endpoint dialect
    pub platform_type: String,
    /// Whether to attach the search tool
    pub use_search: bool,
    /// Lifecycle state
    pub status: TaskStatus,
    /// Endpoint the task was created for
    pub api_config_id: Option<ApiConfigId>,
    /// Mapping template, if any
    pub template_id: Option<TemplateId>,
    /// Unix timestamp when the task was created
    pub created_at: i64,
    /// Unix timestamp of the last status change
    pub updated_at: i64,
}

/// New prompt outcome to be appended
#[derive(Debug, Clone)]
pub struct NewTaskEntry {
    /// Task the prompt belongs to
    pub task_id: TaskId,
    /// Prompt text, trimmed
    pub prompt: String,
    /// Extracted answer or failure summary
    pub answer: String,
    /// Full response (or failure detail) as JSON text
    pub raw_response: String,
    /// Non-negative token count, 0 on failure
    pub tokens_used: i64,
    /// Outcome
    pub status: EntryStatus,
}

/// Prompt outcome record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskEntry {
    /// Unique database ID
    pub id: EntryId,
    /// Task the prompt belongs to
    pub task_id: TaskId,
    /// Prompt text, trimmed
    pub prompt: String,
    /// Extracted answer or failure summary
    pub answer: String,
    /// Full response (or failure detail) as JSON text
    pub raw_response: String,
    /// Non-negative token count, 0 on failure
    pub tokens_used: i64,
    /// Outcome
    pub status: EntryStatus,
    /// Unix timestamp when the entry was recorded
    pub created_at: i64,
}

/// Aggregate view of a task's entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStats {
    /// Entries recorded
    pub total_count: i64,
    /// Entries with status `success`
    pub success_count: i64,
    /// Entries with status `failed`
    pub failed_count: i64,
    /// Sum of `tokens_used`
    pub total_tokens: i64,
    /// Mean `tokens_used` over all entries (0 when there are none)
    pub avg_tokens: f64,
}

/// Database handle for prompt-scraper
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
