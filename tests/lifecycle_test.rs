//! Controller + store scenario tests against a throwaway database file.

use std::time::Duration;

use tasktrack::{
    db::{Database, Task, TaskStatus},
    error::Error,
    tasks::TaskController,
};
use tempfile::TempDir;
use tokio::time::sleep;

fn make_controller(dir: &TempDir) -> TaskController {
    let database = Database::new(dir.path().join("tasks.db")).unwrap();
    TaskController::new(database)
}

/// `last_started` must be non-null exactly while the task is active.
fn assert_running_invariant(task: &Task) {
    assert_eq!(
        task.last_started.is_some(),
        task.status == TaskStatus::Active,
        "last_started/status invariant violated for task {}",
        task.id
    );
}

#[tokio::test]
async fn create_assigns_ids_and_defaults() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let first = controller
        .create("Write spec".to_string(), None)
        .await
        .unwrap();
    let second = controller
        .create("Review spec".to_string(), Some("second pass".to_string()))
        .await
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.status, TaskStatus::NotStarted);
    assert_eq!(first.description, "");
    assert_eq!(second.description, "second pass");
    assert_eq!(first.total_elapsed, 0.0);
    assert!(first.started_at.is_none());
    assert!(first.completed_at.is_none());
    assert!(first.last_started.is_none());
    assert_running_invariant(&first);
}

#[tokio::test]
async fn create_with_empty_title_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let result = controller.create(String::new(), None).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    assert!(controller.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_sets_started_at_once() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();

    let started = controller.start(task.id).await.unwrap();
    assert_eq!(started.status, TaskStatus::Active);
    assert!(started.last_started.is_some());
    let first_started_at = started.started_at.expect("started_at set on first start");
    assert_running_invariant(&started);

    controller.pause(task.id).await.unwrap();
    sleep(Duration::from_millis(10)).await;

    let restarted = controller.start(task.id).await.unwrap();
    assert_eq!(restarted.started_at, Some(first_started_at));
    assert_ne!(restarted.last_started, Some(first_started_at));
    assert_running_invariant(&restarted);
}

#[tokio::test]
async fn pause_folds_open_interval_into_total() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();
    controller.start(task.id).await.unwrap();
    sleep(Duration::from_millis(80)).await;

    let paused = controller.pause(task.id).await.unwrap();
    assert_eq!(paused.status, TaskStatus::Paused);
    assert!(paused.last_started.is_none());
    assert!(
        paused.total_elapsed >= 0.05 && paused.total_elapsed < 5.0,
        "expected roughly 80ms of elapsed time, got {}",
        paused.total_elapsed
    );
    assert_running_invariant(&paused);
}

#[tokio::test]
async fn pause_without_running_interval_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();

    // Pausing a task that never started succeeds and changes nothing.
    let untouched = controller.pause(task.id).await.unwrap();
    assert_eq!(untouched.status, TaskStatus::NotStarted);
    assert_eq!(untouched.total_elapsed, 0.0);

    controller.start(task.id).await.unwrap();
    sleep(Duration::from_millis(30)).await;
    let first_pause = controller.pause(task.id).await.unwrap();

    let second_pause = controller.pause(task.id).await.unwrap();
    assert_eq!(second_pause.total_elapsed, first_pause.total_elapsed);
    assert_eq!(second_pause.status, TaskStatus::Paused);
}

#[tokio::test]
async fn complete_folds_interval_and_is_terminal_by_default() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();
    controller.start(task.id).await.unwrap();
    sleep(Duration::from_millis(60)).await;

    let completed = controller.complete(task.id).await.unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert!(completed.last_started.is_none());
    assert!(completed.total_elapsed >= 0.04);
    assert_running_invariant(&completed);
}

#[tokio::test]
async fn complete_on_paused_task_keeps_total_unchanged() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();
    controller.start(task.id).await.unwrap();
    sleep(Duration::from_millis(40)).await;
    let paused = controller.pause(task.id).await.unwrap();

    let completed = controller.complete(task.id).await.unwrap();
    assert_eq!(completed.total_elapsed, paused.total_elapsed);
    assert_eq!(completed.status, TaskStatus::Completed);
}

#[tokio::test]
async fn total_elapsed_accumulates_across_start_pause_cycles() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();

    controller.start(task.id).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    let after_first = controller.pause(task.id).await.unwrap();

    // Resuming never resets the accumulated total.
    let resumed = controller.start(task.id).await.unwrap();
    assert_eq!(resumed.total_elapsed, after_first.total_elapsed);

    sleep(Duration::from_millis(50)).await;
    let completed = controller.complete(task.id).await.unwrap();
    assert!(completed.total_elapsed > after_first.total_elapsed);
}

#[tokio::test]
async fn starting_a_completed_task_reactivates_it() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let task = controller.create("Focus".to_string(), None).await.unwrap();
    controller.start(task.id).await.unwrap();
    let completed = controller.complete(task.id).await.unwrap();
    let completed_at = completed.completed_at.unwrap();

    let reopened = controller.start(task.id).await.unwrap();
    assert_eq!(reopened.status, TaskStatus::Active);
    // completed_at survives the reactivation; only status and last_started move.
    assert_eq!(reopened.completed_at, Some(completed_at));
    assert_running_invariant(&reopened);
}

#[tokio::test]
async fn get_task_returns_the_persisted_record() {
    let dir = TempDir::new().unwrap();
    let database = Database::new(dir.path().join("tasks.db")).unwrap();
    let controller = TaskController::new(database.clone());

    let created = controller.create("Lookup".to_string(), None).await.unwrap();

    let fetched = database.get_task(created.id).await.unwrap();
    assert_eq!(fetched.title, "Lookup");
    assert_eq!(fetched.status, TaskStatus::NotStarted);

    assert!(matches!(
        database.get_task(42).await,
        Err(Error::NotFound(42))
    ));
}

#[tokio::test]
async fn operations_on_unknown_ids_report_not_found() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    assert!(matches!(
        controller.delete(999).await,
        Err(Error::NotFound(999))
    ));
    assert!(matches!(
        controller.start(999).await,
        Err(Error::NotFound(999))
    ));
    assert!(matches!(
        controller.pause(999).await,
        Err(Error::NotFound(999))
    ));
    assert!(matches!(
        controller.complete(999).await,
        Err(Error::NotFound(999))
    ));
}

#[tokio::test]
async fn delete_removes_the_record_and_never_reuses_the_id() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let first = controller.create("One".to_string(), None).await.unwrap();
    controller.delete(first.id).await.unwrap();

    assert!(matches!(
        controller.delete(first.id).await,
        Err(Error::NotFound(_))
    ));

    let second = controller.create("Two".to_string(), None).await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn list_orders_unfinished_before_finished_then_newest_first() {
    let dir = TempDir::new().unwrap();
    let controller = make_controller(&dir);

    let oldest = controller.create("oldest".to_string(), None).await.unwrap();
    sleep(Duration::from_millis(5)).await;
    let middle = controller.create("middle".to_string(), None).await.unwrap();
    sleep(Duration::from_millis(5)).await;
    let newest = controller.create("newest".to_string(), None).await.unwrap();

    // Completing the newest task pushes it below all unfinished work,
    // regardless of creation order.
    controller.start(newest.id).await.unwrap();
    controller.complete(newest.id).await.unwrap();

    let listed = controller.list().await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![middle.id, oldest.id, newest.id]);

    for task in &listed {
        assert_running_invariant(task);
    }
}

#[tokio::test]
async fn state_survives_a_restart_of_the_store() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("tasks.db");

    let started_at = {
        let controller = TaskController::new(Database::new(db_path.clone()).unwrap());
        let task = controller.create("Persist".to_string(), None).await.unwrap();
        let started = controller.start(task.id).await.unwrap();
        started.started_at.unwrap()
    };

    let controller = TaskController::new(Database::new(db_path).unwrap());
    let listed = controller.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, TaskStatus::Active);
    assert_eq!(listed[0].started_at, Some(started_at));
    assert!(listed[0].last_started.is_some());
}
