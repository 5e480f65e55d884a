//! Endpoint configuration CRUD operations.

use crate::error::DatabaseError;
use crate::types::ApiConfigId;
use crate::{Error, Result};

use super::{ApiConfig, Database, NewApiConfig};

/// Reject endpoints the executor could never reach
fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| Error::config("base_url", format!("invalid URL {base_url:?}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::config(
            "base_url",
            format!("unsupported scheme {scheme:?}, expected http or https"),
        )),
    }
}

impl Database {
    /// Insert a new endpoint configuration
    ///
    /// Names are unique; inserting a duplicate name fails. `base_url` must be
    /// an absolute http(s) URL.
    pub async fn insert_api_config(&self, config: &NewApiConfig) -> Result<ApiConfigId> {
        validate_base_url(&config.base_url)?;
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO api_configs (name, base_url, api_key, api_user, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&config.name)
        .bind(&config.base_url)
        .bind(&config.api_key)
        .bind(&config.api_user)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert api config: {}",
                e
            )))
        })?;

        Ok(ApiConfigId(result.last_insert_rowid()))
    }

    /// Get an endpoint configuration by ID
    pub async fn get_api_config(&self, id: ApiConfigId) -> Result<Option<ApiConfig>> {
        let row = sqlx::query_as::<_, ApiConfig>(
            r#"
            SELECT id, name, base_url, api_key, api_user, created_at
            FROM api_configs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get api config: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all endpoint configurations, oldest first
    pub async fn list_api_configs(&self) -> Result<Vec<ApiConfig>> {
        let rows = sqlx::query_as::<_, ApiConfig>(
            r#"
            SELECT id, name, base_url, api_key, api_user, created_at
            FROM api_configs
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list api configs: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Replace the fields of an existing endpoint configuration
    ///
    /// Returns `false` if no configuration has that ID.
    pub async fn update_api_config(&self, id: ApiConfigId, config: &NewApiConfig) -> Result<bool> {
        validate_base_url(&config.base_url)?;
        let result = sqlx::query(
            r#"
            UPDATE api_configs
            SET name = ?, base_url = ?, api_key = ?, api_user = ?
            WHERE id = ?
            "#,
        )
        .bind(&config.name)
        .bind(&config.base_url)
        .bind(&config.api_key)
        .bind(&config.api_user)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update api config: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an endpoint configuration
    ///
    /// Tasks that referenced it keep their entries; their `api_config_id` becomes NULL.
    pub async fn delete_api_config(&self, id: ApiConfigId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_configs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete api config: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
