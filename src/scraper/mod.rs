//! Batch scraping split into focused submodules.
//!
//! The `Scraper` struct and its methods are organized by domain:
//! - [`batch`] - Batch orchestration, task lifecycle and submission
//! - [`unit`] - One prompt: build, send, extract, persist
//! - [`probe`] - Single-shot connection probe

mod batch;
mod probe;
mod unit;

pub use batch::{NewSubmission, split_prompts};
pub use probe::ProbeRequest;
pub use unit::{Outcome, TOOL_USAGE_NOTE, evaluate_response};

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::executor::ResilientExecutor;
use crate::retry::Sleeper;
use crate::types::Event;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Main scraper instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Scraper {
    /// Database instance for persistence (wrapped in Arc for sharing across tasks)
    /// Public for integration tests to inspect tasks and entries
    pub db: Arc<Database>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Outbound HTTP with retry discipline
    pub(crate) executor: ResilientExecutor,
}

impl Scraper {
    /// Create a new Scraper instance
    ///
    /// Validates the configuration, opens/creates the SQLite database at
    /// `config.database_path` and runs migrations.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::new(&config.database_path).await?;
        Self::with_database(config, db)
    }

    /// Create a Scraper around an already opened database
    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        config.validate()?;
        let executor = ResilientExecutor::new(config.executor.clone())?;
        let (event_tx, _rx) = broadcast::channel(1000);

        Ok(Self {
            db: Arc::new(db),
            event_tx,
            config: Arc::new(config),
            executor,
        })
    }

    /// Replace the source of pauses between retry attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.executor = self.executor.with_sleeper(sleeper);
        self
    }

    /// Subscribe to scrape events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls behind by more than 1000 events receives
    /// `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Emit an event to all subscribers
    ///
    /// Dropped silently when nobody is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
