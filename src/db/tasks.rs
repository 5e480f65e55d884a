//! Scrape task creation and lifecycle updates.

use crate::error::DatabaseError;
use crate::types::{TaskId, TaskStatus};
use crate::{Error, Result};

use super::{Database, NewScrapeTask, ScrapeTask};

impl Database {
    /// Insert a new task in the `pending` state
    pub async fn insert_task(&self, task: &NewScrapeTask) -> Result<TaskId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO scrape_tasks (
                name, model, thinking_level, platform_type, use_search,
                status, api_config_id, template_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.name)
        .bind(&task.model)
        .bind(&task.thinking_level)
        .bind(&task.platform_type)
        .bind(task.use_search)
        .bind(TaskStatus::Pending)
        .bind(task.api_config_id)
        .bind(task.template_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert task: {}",
                e
            )))
        })?;

        Ok(TaskId(result.last_insert_rowid()))
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: TaskId) -> Result<Option<ScrapeTask>> {
        let row = sqlx::query_as::<_, ScrapeTask>(
            r#"
            SELECT
                id, name, model, thinking_level, platform_type, use_search,
                status, api_config_id, template_id, created_at, updated_at
            FROM scrape_tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get task: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all tasks, newest first
    pub async fn list_tasks(&self) -> Result<Vec<ScrapeTask>> {
        let rows = sqlx::query_as::<_, ScrapeTask>(
            r#"
            SELECT
                id, name, model, thinking_level, platform_type, use_search,
                status, api_config_id, template_id, created_at, updated_at
            FROM scrape_tasks
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list tasks: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Move a task to `status`
    ///
    /// Only forward moves are accepted (see [`TaskStatus::can_transition_to`]);
    /// anything else fails with [`DatabaseError::InvalidTransition`] and leaves
    /// the row untouched.
    pub async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> Result<()> {
        let current = self
            .get_task(id)
            .await?
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(format!("task {}", id))))?
            .status;

        if !current.can_transition_to(status) {
            return Err(Error::Database(DatabaseError::InvalidTransition {
                task_id: id.get(),
                from: current.to_string(),
                to: status.to_string(),
            }));
        }

        let now = chrono::Utc::now().timestamp();
        // compare-and-set so a concurrent writer cannot be overwritten
        let result = sqlx::query(
            "UPDATE scrape_tasks SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(status)
        .bind(now)
        .bind(id)
        .bind(current)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update task status: {}",
                e
            )))
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::Database(DatabaseError::InvalidTransition {
                task_id: id.get(),
                from: current.to_string(),
                to: status.to_string(),
            }));
        }

        tracing::info!(task_id = id.get(), from = %current, to = %status, "task status changed");
        Ok(())
    }

    /// Set the thinking level of a task
    pub async fn set_thinking_level(&self, id: TaskId, thinking_level: &str) -> Result<()> {
        sqlx::query("UPDATE scrape_tasks SET thinking_level = ?, updated_at = ? WHERE id = ?")
            .bind(thinking_level)
            .bind(chrono::Utc::now().timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to set thinking level: {}",
                    e
                )))
            })?;

        Ok(())
    }
}
