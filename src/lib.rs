//! # prompt-scraper
//!
//! Batch prompt scraping against LLM HTTP endpoints.
//!
//! A task is a list of prompts sent, one at a time, to a configured endpoint
//! in one of two dialects (a bearer-token chat API or an HMAC-signed
//! gateway). Every prompt produces exactly one persisted entry holding the
//! extracted answer, the token count and the full raw response.
//!
//! ## Design Philosophy
//!
//! prompt-scraper is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Never silent** - Failures become failed entries or a failed task, not dropped prompts
//!
//! ## Quick Start
//!
//! ```no_run
//! use prompt_scraper::{Config, NewSubmission, Scraper};
//! use prompt_scraper::db::NewApiConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = Scraper::new(Config::default()).await?;
//!
//!     let api_config_id = scraper
//!         .db
//!         .insert_api_config(&NewApiConfig {
//!             name: "relay".to_string(),
//!             base_url: "https://llm.example.com/v1/chat/completions".to_string(),
//!             api_key: "sk-...".to_string(),
//!             api_user: None,
//!         })
//!         .await?;
//!
//!     let mut events = scraper.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     scraper
//!         .submit(NewSubmission {
//!             name: "capitals".to_string(),
//!             api_config_id,
//!             platform_type: "standard".to_string(),
//!             template_id: None,
//!             model: "gemini-3-pro-preview".to_string(),
//!             thinking: "low".to_string(),
//!             use_search: false,
//!             prompts_text: "Capital of France?\nCapital of Peru?".to_string(),
//!             preset_id: None,
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Resilient outbound HTTP
pub mod executor;
/// Dotted-path extraction from raw responses
pub mod extract;
/// Per-dialect request builders
pub mod protocol;
/// Retry classification and pacing
pub mod retry;
/// Batch orchestration (decomposed into focused submodules)
pub mod scraper;
/// Request signing
pub mod signing;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, ExecutorConfig, ProbeConfig, TemplateConfig};
pub use db::Database;
pub use error::{DatabaseError, Error, ExecutionError, Result};
pub use executor::ResilientExecutor;
pub use extract::{MappingRules, get_value_by_path, reextract};
pub use protocol::{ProtocolAdapter, adapter_for};
pub use scraper::{
    NewSubmission, Outcome, ProbeRequest, Scraper, TOOL_USAGE_NOTE, evaluate_response, split_prompts,
};
pub use types::{
    ApiConfigId, EntryId, EntryStatus, Event, PlatformType, PresetId, TaskId, TaskProfile,
    TaskStatus, TemplateId, ThinkingLevel,
};
