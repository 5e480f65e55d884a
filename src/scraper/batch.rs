//! Batch orchestration, task lifecycle and submission.
//!
//! A batch runs its prompts one at a time, in input order, and owns every
//! status change of its task: `pending → running → completed`, or `failed`
//! when the task cannot be configured or the loop itself breaks. Nothing is
//! returned to the trigger; outcomes live in the database and the event
//! stream.

use crate::db::{NewScrapeTask, ScrapeTask};
use crate::error::{Error, Result};
use crate::extract::MappingRules;
use crate::protocol::adapter_for;
use crate::types::{
    ApiConfigId, EntryStatus, Event, PlatformType, PresetId, TaskId, TaskProfile, TaskStatus,
    TemplateId, ThinkingLevel,
};
use tokio::task::JoinHandle;

use super::Scraper;
use super::unit::BatchContext;

/// Everything needed to create and start a task
#[derive(Clone, Debug)]
pub struct NewSubmission {
    /// Display name of the task
    pub name: String,
    /// Endpoint to call
    pub api_config_id: ApiConfigId,
    /// Endpoint dialect (`standard` or `private_hmac`)
    pub platform_type: String,
    /// Mapping template, if any
    pub template_id: Option<TemplateId>,
    /// Upstream model name
    pub model: String,
    /// Reasoning effort (`minimal`, `low`, `medium`, `high`)
    pub thinking: String,
    /// Whether to attach the search tool
    pub use_search: bool,
    /// One prompt per line; blank lines are ignored
    pub prompts_text: String,
    /// Preset whose content becomes the system instruction
    pub preset_id: Option<PresetId>,
}

/// Split multi-line input into trimmed, non-empty prompts
pub fn split_prompts(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a stored task into the settings the adapters consume
///
/// Unknown dialects or thinking levels, and a private-dialect endpoint
/// without a signing identity, are configuration errors.
pub(crate) fn task_profile(
    task: &ScrapeTask,
    thinking_level: &str,
    api_user: Option<&str>,
) -> Result<TaskProfile> {
    let platform: PlatformType = task.platform_type.parse()?;
    let thinking_level: ThinkingLevel = thinking_level.parse()?;

    if platform == PlatformType::PrivateHmac && api_user.is_none_or(|user| user.trim().is_empty()) {
        return Err(Error::config(
            "api_user",
            "the private_hmac platform requires an api_user to sign requests",
        ));
    }

    Ok(TaskProfile {
        model: task.model.clone(),
        thinking_level,
        platform,
        use_search: task.use_search,
    })
}

impl Scraper {
    /// Create a pending task from a submission and start its batch
    ///
    /// Returns the new task's ID as soon as the task row exists; the batch
    /// runs in the background.
    pub async fn submit(&self, submission: NewSubmission) -> Result<TaskId> {
        let prompts = split_prompts(&submission.prompts_text);

        let system_instruction = match submission.preset_id {
            Some(preset_id) => self
                .db
                .get_preset(preset_id)
                .await?
                .map(|preset| preset.content)
                .unwrap_or_default(),
            None => String::new(),
        };

        let task_id = self
            .db
            .insert_task(&NewScrapeTask {
                name: submission.name,
                model: submission.model,
                thinking_level: Some(submission.thinking.clone())
                    .filter(|level| !level.trim().is_empty()),
                platform_type: submission.platform_type,
                use_search: submission.use_search,
                api_config_id: Some(submission.api_config_id),
                template_id: submission.template_id,
            })
            .await?;

        tracing::info!(task_id = task_id.get(), prompts = prompts.len(), "task submitted");
        self.emit_event(Event::TaskStatusChanged {
            task_id,
            status: TaskStatus::Pending,
        });

        self.start_batch(
            task_id,
            submission.api_config_id,
            prompts,
            system_instruction,
            submission.thinking,
        );

        Ok(task_id)
    }

    /// Run a batch in the background
    ///
    /// The handle may be dropped; awaiting it only tells when the batch ended.
    pub fn start_batch(
        &self,
        task_id: TaskId,
        config_id: ApiConfigId,
        prompts: Vec<String>,
        system_instruction: String,
        thinking: String,
    ) -> JoinHandle<()> {
        let scraper = self.clone();
        tokio::spawn(async move {
            scraper
                .run_batch(task_id, config_id, &prompts, &system_instruction, &thinking)
                .await;
        })
    }

    /// Run a batch to the end on the current task
    ///
    /// Never fails: configuration problems and loop errors are recorded by
    /// marking the task `failed`.
    pub async fn run_batch(
        &self,
        task_id: TaskId,
        config_id: ApiConfigId,
        prompts: &[String],
        system_instruction: &str,
        thinking: &str,
    ) {
        if let Err(e) = self
            .try_run_batch(task_id, config_id, prompts, system_instruction, thinking)
            .await
        {
            // remaining prompts are skipped, not recorded
            tracing::error!(task_id = task_id.get(), error = %e, "batch aborted");
            self.mark_failed(task_id).await;
        }
    }

    async fn try_run_batch(
        &self,
        task_id: TaskId,
        config_id: ApiConfigId,
        prompts: &[String],
        system_instruction: &str,
        thinking: &str,
    ) -> Result<()> {
        let Some(task) = self.db.get_task(task_id).await? else {
            tracing::error!(task_id = task_id.get(), "task not found, batch not started");
            return Ok(());
        };

        let thinking_level = match task.thinking_level.as_deref().map(str::trim) {
            Some(level) if !level.is_empty() => level.to_string(),
            _ => {
                self.db.set_thinking_level(task_id, thinking).await?;
                thinking.to_string()
            }
        };

        let Some(api_config) = self.db.get_api_config(config_id).await? else {
            tracing::error!(
                task_id = task_id.get(),
                config_id = config_id.get(),
                "api config not found, failing task"
            );
            self.mark_failed(task_id).await;
            return Ok(());
        };

        let profile = match task_profile(&task, &thinking_level, api_config.api_user.as_deref()) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(task_id = task_id.get(), error = %e, "invalid task configuration, failing task");
                self.mark_failed(task_id).await;
                return Ok(());
            }
        };

        let adapter = adapter_for(profile.platform);
        let mapping = self.mapping_rules(task.template_id, adapter.default_mapping()).await?;
        let instruction = Some(system_instruction).filter(|s| !s.trim().is_empty());

        self.set_status(task_id, TaskStatus::Running).await?;
        tracing::info!(
            task_id = task_id.get(),
            prompts = prompts.len(),
            platform = %profile.platform,
            model = %profile.model,
            "batch started"
        );

        let ctx = BatchContext {
            task_id,
            profile: &profile,
            api_config: &api_config,
            adapter,
            mapping: &mapping,
            system_instruction: instruction,
        };

        let (mut succeeded, mut failed) = (0usize, 0usize);
        for prompt in prompts {
            match self.scrape_one(&ctx, prompt).await? {
                (_, EntryStatus::Success) => succeeded += 1,
                (_, EntryStatus::Failed) => failed += 1,
            }
        }

        self.set_status(task_id, TaskStatus::Completed).await?;
        tracing::info!(task_id = task_id.get(), succeeded, failed, "batch finished");
        self.emit_event(Event::BatchFinished {
            task_id,
            succeeded,
            failed,
        });

        Ok(())
    }

    /// Rules from the task's template when it parses, else `fallback`
    async fn mapping_rules(
        &self,
        template_id: Option<TemplateId>,
        fallback: MappingRules,
    ) -> Result<MappingRules> {
        let Some(template_id) = template_id else {
            return Ok(fallback);
        };
        let rules = self
            .db
            .get_template(template_id)
            .await?
            .and_then(|template| template.mapping_rules);
        Ok(MappingRules::parse_or(rules.as_deref(), fallback))
    }

    async fn set_status(&self, task_id: TaskId, status: TaskStatus) -> Result<()> {
        self.db.update_task_status(task_id, status).await?;
        self.emit_event(Event::TaskStatusChanged { task_id, status });
        Ok(())
    }

    async fn mark_failed(&self, task_id: TaskId) {
        if let Err(e) = self.set_status(task_id, TaskStatus::Failed).await {
            tracing::error!(task_id = task_id.get(), error = %e, "failed to mark task as failed");
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn stored_task(platform_type: &str) -> ScrapeTask {
        ScrapeTask {
            id: TaskId(1),
            name: "t".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            thinking_level: Some("high".to_string()),
            platform_type: platform_type.to_string(),
            use_search: true,
            status: TaskStatus::Pending,
            api_config_id: None,
            template_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn split_prompts_trims_and_drops_blank_lines() {
        let prompts = split_prompts("  first \n\n\tsecond\r\n   \nthird");
        assert_eq!(prompts, vec!["first", "second", "third"]);
        assert!(split_prompts(" \n \n").is_empty());
    }

    #[test]
    fn profile_from_valid_task() {
        let profile = task_profile(&stored_task("standard"), "low", None).unwrap();
        assert_eq!(
            profile,
            TaskProfile {
                model: "gemini-3-pro-preview".to_string(),
                thinking_level: ThinkingLevel::Low,
                platform: PlatformType::Standard,
                use_search: true,
            }
        );
    }

    #[test]
    fn unknown_platform_is_config_error() {
        let err = task_profile(&stored_task("api_hmac"), "low", None).unwrap_err();
        assert!(
            matches!(err, Error::Config { ref key, .. } if key.as_deref() == Some("platform_type"))
        );
    }

    #[test]
    fn unknown_thinking_level_is_config_error() {
        let err = task_profile(&stored_task("standard"), "extreme", None).unwrap_err();
        assert!(
            matches!(err, Error::Config { ref key, .. } if key.as_deref() == Some("thinking_level"))
        );
    }

    #[test]
    fn private_platform_requires_identity() {
        for user in [None, Some(""), Some("  ")] {
            let err = task_profile(&stored_task("private_hmac"), "low", user).unwrap_err();
            assert!(
                matches!(err, Error::Config { ref key, .. } if key.as_deref() == Some("api_user"))
            );
        }
        assert!(task_profile(&stored_task("private_hmac"), "low", Some("alice")).is_ok());
    }
}
