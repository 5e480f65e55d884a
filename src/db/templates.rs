//! Response mapping templates.

use crate::error::DatabaseError;
use crate::types::TemplateId;
use crate::{Error, Result};

use super::{Database, NewResponseTemplate, ResponseTemplate};

impl Database {
    /// Insert a response template
    ///
    /// `mapping_rules` is stored verbatim; it is only parsed when a scrape
    /// reads it, and malformed rules fall back to the dialect default there.
    pub async fn insert_template(&self, template: &NewResponseTemplate) -> Result<TemplateId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            "INSERT INTO response_templates (name, mapping_rules, created_at) VALUES (?, ?, ?)",
        )
        .bind(&template.name)
        .bind(&template.mapping_rules)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert response template: {}",
                e
            )))
        })?;

        Ok(TemplateId(result.last_insert_rowid()))
    }

    /// Get a response template by ID
    pub async fn get_template(&self, id: TemplateId) -> Result<Option<ResponseTemplate>> {
        let row = sqlx::query_as::<_, ResponseTemplate>(
            "SELECT id, name, mapping_rules, created_at FROM response_templates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get response template: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all response templates, oldest first
    pub async fn list_templates(&self) -> Result<Vec<ResponseTemplate>> {
        let rows = sqlx::query_as::<_, ResponseTemplate>(
            "SELECT id, name, mapping_rules, created_at FROM response_templates ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list response templates: {}",
                e
            )))
        })?;

        Ok(rows)
    }
}
