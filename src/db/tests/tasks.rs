use super::{new_api_config, new_task, open_db};
use crate::db::*;
use crate::error::DatabaseError;
use crate::types::{TaskId, TaskStatus};
use crate::Error;

#[tokio::test]
async fn test_insert_task_starts_pending() {
    let (db, _file) = open_db().await;

    let config_id = db.insert_api_config(&new_api_config("relay")).await.unwrap();
    let id = db.insert_task(&new_task(Some(config_id), None)).await.unwrap();

    let task = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.model, "gemini-3-pro-preview");
    assert_eq!(task.thinking_level.as_deref(), Some("low"));
    assert_eq!(task.platform_type, "standard");
    assert!(!task.use_search);
    assert_eq!(task.api_config_id, Some(config_id));
    assert_eq!(task.template_id, None);

    db.close().await;
}

#[tokio::test]
async fn test_forward_transitions() {
    let (db, _file) = open_db().await;

    let id = db.insert_task(&new_task(None, None)).await.unwrap();
    db.update_task_status(id, TaskStatus::Running).await.unwrap();
    db.update_task_status(id, TaskStatus::Completed).await.unwrap();

    let task = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);

    db.close().await;
}

#[tokio::test]
async fn test_failure_branch_from_pending_and_running() {
    let (db, _file) = open_db().await;

    let early = db.insert_task(&new_task(None, None)).await.unwrap();
    db.update_task_status(early, TaskStatus::Failed).await.unwrap();

    let late = db.insert_task(&new_task(None, None)).await.unwrap();
    db.update_task_status(late, TaskStatus::Running).await.unwrap();
    db.update_task_status(late, TaskStatus::Failed).await.unwrap();

    assert_eq!(db.get_task(early).await.unwrap().unwrap().status, TaskStatus::Failed);
    assert_eq!(db.get_task(late).await.unwrap().unwrap().status, TaskStatus::Failed);

    db.close().await;
}

#[tokio::test]
async fn test_backward_transition_is_rejected() {
    let (db, _file) = open_db().await;

    let id = db.insert_task(&new_task(None, None)).await.unwrap();
    db.update_task_status(id, TaskStatus::Running).await.unwrap();
    db.update_task_status(id, TaskStatus::Completed).await.unwrap();

    let err = db.update_task_status(id, TaskStatus::Running).await.unwrap_err();
    match err {
        Error::Database(DatabaseError::InvalidTransition { task_id, from, to }) => {
            assert_eq!(task_id, id.get());
            assert_eq!(from, "completed");
            assert_eq!(to, "running");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(db.get_task(id).await.unwrap().unwrap().status, TaskStatus::Completed);

    db.close().await;
}

#[tokio::test]
async fn test_skipping_running_is_rejected() {
    let (db, _file) = open_db().await;

    let id = db.insert_task(&new_task(None, None)).await.unwrap();
    let err = db.update_task_status(id, TaskStatus::Completed).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::InvalidTransition { .. })
    ));

    db.close().await;
}

#[tokio::test]
async fn test_status_update_for_missing_task() {
    let (db, _file) = open_db().await;

    let err = db
        .update_task_status(TaskId(404), TaskStatus::Running)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));

    db.close().await;
}

#[tokio::test]
async fn test_set_thinking_level_and_list() {
    let (db, _file) = open_db().await;

    let mut task = new_task(None, None);
    task.thinking_level = None;
    let first = db.insert_task(&task).await.unwrap();
    let second = db.insert_task(&new_task(None, None)).await.unwrap();

    db.set_thinking_level(first, "high").await.unwrap();
    let stored = db.get_task(first).await.unwrap().unwrap();
    assert_eq!(stored.thinking_level.as_deref(), Some("high"));

    let ids: Vec<TaskId> = db.list_tasks().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second, first]);

    db.close().await;
}

#[tokio::test]
async fn test_deleting_config_detaches_task() {
    let (db, _file) = open_db().await;

    let config_id = db.insert_api_config(&new_api_config("relay")).await.unwrap();
    let id = db.insert_task(&new_task(Some(config_id), None)).await.unwrap();
    db.delete_api_config(config_id).await.unwrap();

    let task = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(task.api_config_id, None);

    db.close().await;
}
