//! System-instruction presets.

use crate::error::DatabaseError;
use crate::types::PresetId;
use crate::{Error, Result};

use super::{Database, NewTaskPreset, TaskPreset};

impl Database {
    /// Insert an instruction preset
    pub async fn insert_preset(&self, preset: &NewTaskPreset) -> Result<PresetId> {
        let now = chrono::Utc::now().timestamp();

        let result =
            sqlx::query("INSERT INTO task_presets (name, content, created_at) VALUES (?, ?, ?)")
                .bind(&preset.name)
                .bind(&preset.content)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to insert preset: {}",
                        e
                    )))
                })?;

        Ok(PresetId(result.last_insert_rowid()))
    }

    /// Get an instruction preset by ID
    pub async fn get_preset(&self, id: PresetId) -> Result<Option<TaskPreset>> {
        let row = sqlx::query_as::<_, TaskPreset>(
            "SELECT id, name, content, created_at FROM task_presets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get preset: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all presets, oldest first
    pub async fn list_presets(&self) -> Result<Vec<TaskPreset>> {
        let rows = sqlx::query_as::<_, TaskPreset>(
            "SELECT id, name, content, created_at FROM task_presets ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list presets: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Replace a preset's name and content
    pub async fn update_preset(&self, id: PresetId, preset: &NewTaskPreset) -> Result<bool> {
        let result = sqlx::query("UPDATE task_presets SET name = ?, content = ? WHERE id = ?")
            .bind(&preset.name)
            .bind(&preset.content)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update preset: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a preset
    pub async fn delete_preset(&self, id: PresetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM task_presets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete preset: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
