//! Append-only prompt outcomes and per-task statistics.
//!
//! Entries are never updated or deleted by the scrape core.

use crate::error::DatabaseError;
use crate::types::{EntryId, EntryStatus, TaskId};
use crate::{Error, Result};

use super::{Database, NewTaskEntry, TaskEntry, TaskStats};

impl Database {
    /// Append one prompt outcome
    pub async fn insert_entry(&self, entry: &NewTaskEntry) -> Result<EntryId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO task_entries (
                task_id, prompt, answer, raw_response, tokens_used, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.task_id)
        .bind(&entry.prompt)
        .bind(&entry.answer)
        .bind(&entry.raw_response)
        .bind(entry.tokens_used.max(0))
        .bind(entry.status)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert task entry: {}",
                e
            )))
        })?;

        Ok(EntryId(result.last_insert_rowid()))
    }

    /// Get an entry by ID
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<TaskEntry>> {
        let row = sqlx::query_as::<_, TaskEntry>(
            r#"
            SELECT id, task_id, prompt, answer, raw_response, tokens_used, status, created_at
            FROM task_entries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get task entry: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// Entries of a task in the order they were recorded
    pub async fn list_entries(&self, task_id: TaskId) -> Result<Vec<TaskEntry>> {
        let rows = sqlx::query_as::<_, TaskEntry>(
            r#"
            SELECT id, task_id, prompt, answer, raw_response, tokens_used, status, created_at
            FROM task_entries
            WHERE task_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list task entries: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Counts and token totals over a task's entries
    pub async fn task_stats(&self, task_id: TaskId) -> Result<TaskStats> {
        let (total_count, success_count, total_tokens): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = ? THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(tokens_used), 0)
            FROM task_entries
            WHERE task_id = ?
            "#,
        )
        .bind(EntryStatus::Success)
        .bind(task_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to compute task stats: {}",
                e
            )))
        })?;

        let avg_tokens = if total_count > 0 {
            total_tokens as f64 / total_count as f64
        } else {
            0.0
        };

        Ok(TaskStats {
            total_count,
            success_count,
            failed_count: total_count - success_count,
            total_tokens,
            avg_tokens,
        })
    }
}
