use super::{new_task, open_db};
use crate::db::*;
use crate::types::{EntryId, EntryStatus, TaskId};

fn entry(task_id: TaskId, prompt: &str, status: EntryStatus, tokens_used: i64) -> NewTaskEntry {
    NewTaskEntry {
        task_id,
        prompt: prompt.to_string(),
        answer: format!("answer to {prompt}"),
        raw_response: r#"{"usage":{"total_tokens":1}}"#.to_string(),
        tokens_used,
        status,
    }
}

#[tokio::test]
async fn test_insert_and_get_entry() {
    let (db, _file) = open_db().await;

    let task_id = db.insert_task(&new_task(None, None)).await.unwrap();
    let id = db
        .insert_entry(&entry(task_id, "q1", EntryStatus::Success, 17))
        .await
        .unwrap();

    let stored = db.get_entry(id).await.unwrap().unwrap();
    assert_eq!(stored.task_id, task_id);
    assert_eq!(stored.prompt, "q1");
    assert_eq!(stored.answer, "answer to q1");
    assert_eq!(stored.raw_response, r#"{"usage":{"total_tokens":1}}"#);
    assert_eq!(stored.tokens_used, 17);
    assert_eq!(stored.status, EntryStatus::Success);
    assert!(db.get_entry(EntryId(999)).await.unwrap().is_none());

    db.close().await;
}

#[tokio::test]
async fn test_negative_tokens_are_clamped() {
    let (db, _file) = open_db().await;

    let task_id = db.insert_task(&new_task(None, None)).await.unwrap();
    let id = db
        .insert_entry(&entry(task_id, "q", EntryStatus::Failed, -5))
        .await
        .unwrap();
    assert_eq!(db.get_entry(id).await.unwrap().unwrap().tokens_used, 0);

    db.close().await;
}

#[tokio::test]
async fn test_list_entries_keeps_insertion_order_per_task() {
    let (db, _file) = open_db().await;

    let task_a = db.insert_task(&new_task(None, None)).await.unwrap();
    let task_b = db.insert_task(&new_task(None, None)).await.unwrap();
    for prompt in ["c", "a", "b"] {
        db.insert_entry(&entry(task_a, prompt, EntryStatus::Success, 1))
            .await
            .unwrap();
    }
    db.insert_entry(&entry(task_b, "other", EntryStatus::Failed, 0))
        .await
        .unwrap();

    let prompts: Vec<String> = db
        .list_entries(task_a)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.prompt)
        .collect();
    assert_eq!(prompts, vec!["c", "a", "b"]);
    assert_eq!(db.list_entries(task_b).await.unwrap().len(), 1);

    db.close().await;
}

#[tokio::test]
async fn test_task_stats() {
    let (db, _file) = open_db().await;

    let task_id = db.insert_task(&new_task(None, None)).await.unwrap();
    db.insert_entry(&entry(task_id, "a", EntryStatus::Success, 10))
        .await
        .unwrap();
    db.insert_entry(&entry(task_id, "b", EntryStatus::Success, 20))
        .await
        .unwrap();
    db.insert_entry(&entry(task_id, "c", EntryStatus::Failed, 0))
        .await
        .unwrap();

    let stats = db.task_stats(task_id).await.unwrap();
    assert_eq!(stats.total_count, 3);
    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.failed_count, 1);
    assert_eq!(stats.total_tokens, 30);
    assert!((stats.avg_tokens - 10.0).abs() < f64::EPSILON);

    db.close().await;
}

#[tokio::test]
async fn test_task_stats_for_empty_task() {
    let (db, _file) = open_db().await;

    let task_id = db.insert_task(&new_task(None, None)).await.unwrap();
    assert_eq!(db.task_stats(task_id).await.unwrap(), TaskStats::default());

    db.close().await;
}
