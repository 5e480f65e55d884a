mod close;
mod entries;
mod tasks;
mod templates;

use crate::db::*;
use crate::types::{ApiConfigId, TemplateId};
use tempfile::NamedTempFile;

/// Open a fresh database; keep the file alive for the duration of the test
async fn open_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}

fn new_api_config(name: &str) -> NewApiConfig {
    NewApiConfig {
        name: name.to_string(),
        base_url: "https://llm.example.com/v1/chat".to_string(),
        api_key: "sk-test".to_string(),
        api_user: None,
    }
}

fn new_task(api_config_id: Option<ApiConfigId>, template_id: Option<TemplateId>) -> NewScrapeTask {
    NewScrapeTask {
        name: "nightly".to_string(),
        model: "gemini-3-pro-preview".to_string(),
        thinking_level: Some("low".to_string()),
        platform_type: "standard".to_string(),
        use_search: false,
        api_config_id,
        template_id,
    }
}
