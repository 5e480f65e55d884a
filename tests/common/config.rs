//! Scraper setup against a mock endpoint

use prompt_scraper::db::{NewApiConfig, NewScrapeTask};
use prompt_scraper::retry::RecordingSleeper;
use prompt_scraper::{ApiConfigId, Config, Scraper, TaskId, TemplateId};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A scraper on a throwaway database whose retry pauses are only recorded
pub struct Harness {
    /// Scraper under test
    pub scraper: Scraper,
    /// Pauses requested by the executor
    pub sleeper: Arc<RecordingSleeper>,
    /// Keeps the database directory alive
    pub _dir: TempDir,
}

/// Build a harness with short attempt timeouts
pub async fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config {
        database_path: dir.path().join("scrape.db"),
        ..Config::default()
    };
    config.executor.base_timeout = Duration::from_secs(5);
    config.executor.timeout_step = Duration::from_secs(1);
    config.probe.timeout = Duration::from_secs(5);

    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = Scraper::new(config)
        .await
        .expect("scraper")
        .with_sleeper(sleeper.clone());

    Harness {
        scraper,
        sleeper,
        _dir: dir,
    }
}

/// Register an endpoint pointing at `base_url`
pub async fn add_api_config(
    scraper: &Scraper,
    name: &str,
    base_url: &str,
    api_user: Option<&str>,
) -> ApiConfigId {
    scraper
        .db
        .insert_api_config(&NewApiConfig {
            name: name.to_string(),
            base_url: base_url.to_string(),
            api_key: "sk-test".to_string(),
            api_user: api_user.map(str::to_string),
        })
        .await
        .expect("insert api config")
}

/// Create a pending task
pub async fn add_task(
    scraper: &Scraper,
    api_config_id: ApiConfigId,
    platform_type: &str,
    template_id: Option<TemplateId>,
) -> TaskId {
    scraper
        .db
        .insert_task(&NewScrapeTask {
            name: "integration".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            thinking_level: None,
            platform_type: platform_type.to_string(),
            use_search: false,
            api_config_id: Some(api_config_id),
            template_id,
        })
        .await
        .expect("insert task")
}

/// Prompts as owned strings
pub fn prompts(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}
