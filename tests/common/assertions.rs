//! Event helpers for integration tests

use prompt_scraper::{Event, TaskId, TaskStatus};
use std::time::Duration;
use tokio::sync::broadcast;

/// Collect events until one matches `stop_predicate` or `timeout` elapses
pub async fn collect_events_until<F>(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}

/// Whether `event` moves `task_id` into a terminal state
pub fn is_terminal_for(event: &Event, task_id: TaskId) -> bool {
    matches!(
        event,
        Event::TaskStatusChanged { task_id: id, status }
            if *id == task_id && status.is_terminal()
    )
}

/// Status changes of `task_id`, in emission order
pub fn status_changes(events: &[Event], task_id: TaskId) -> Vec<TaskStatus> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TaskStatusChanged { task_id: id, status } if *id == task_id => Some(*status),
            _ => None,
        })
        .collect()
}
