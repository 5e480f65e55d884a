use super::{new_api_config, open_db};
use crate::types::TaskId;

/// Verify that querying the database after closing the pool returns an error
/// rather than hanging or panicking.
#[tokio::test]
async fn test_get_api_config_after_pool_close_returns_error() {
    let (db, _file) = open_db().await;

    let id = db.insert_api_config(&new_api_config("relay")).await.unwrap();
    assert!(db.get_api_config(id).await.unwrap().is_some());

    db.pool().close().await;

    let result = db.get_api_config(id).await;
    assert!(
        result.is_err(),
        "get_api_config after pool close should return an error, got: {:?}",
        result
    );
}

#[tokio::test]
async fn test_status_update_after_pool_close_returns_error() {
    let (db, _file) = open_db().await;

    db.pool().close().await;

    let result = db
        .update_task_status(TaskId(1), crate::types::TaskStatus::Running)
        .await;
    assert!(result.is_err());
}
