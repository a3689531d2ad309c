use chrono::{DateTime, Utc};
use log::info;

use crate::{
    db::{Database, Task, TaskStatus},
    error::Error,
};

/// Implements the task state machine on top of the store. Each transition is
/// a single read-compute-write pass through [`Database::update_task`];
/// elapsed time is folded into `total_elapsed` only at pause/complete
/// boundaries, so the stored value is always "time spent so far excluding
/// the open interval".
#[derive(Clone)]
pub struct TaskController {
    db: Database,
}

impl TaskController {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, title: String, description: Option<String>) -> Result<Task, Error> {
        let task = self
            .db
            .insert_task(title, description.unwrap_or_default())
            .await?;

        info!("Created task {}", task.id);
        Ok(task)
    }

    pub async fn list(&self) -> Result<Vec<Task>, Error> {
        self.db.list_tasks().await
    }

    pub async fn delete(&self, task_id: i64) -> Result<(), Error> {
        self.db.delete_task(task_id).await?;
        info!("Deleted task {task_id}");
        Ok(())
    }

    /// Begin (or resume) an active interval. `started_at` is set on the
    /// first start only and never overwritten; `total_elapsed` is never
    /// touched here. A completed task is silently reactivated without
    /// clearing `completed_at`.
    pub async fn start(&self, task_id: i64) -> Result<Task, Error> {
        let now = Utc::now();
        self.db
            .update_task(task_id, move |task| {
                task.status = TaskStatus::Active;
                if task.started_at.is_none() {
                    task.started_at = Some(now);
                }
                task.last_started = Some(now);
            })
            .await
    }

    /// Close the open interval, if any, and fold it into `total_elapsed`.
    /// Pausing a task that is not running changes nothing and still
    /// succeeds.
    pub async fn pause(&self, task_id: i64) -> Result<Task, Error> {
        let now = Utc::now();
        self.db
            .update_task(task_id, move |task| {
                if let Some(last_started) = task.last_started {
                    task.total_elapsed += elapsed_secs(last_started, now);
                    task.status = TaskStatus::Paused;
                    task.last_started = None;
                }
            })
            .await
    }

    /// Fold the open interval if the task is actively running, then mark the
    /// task completed regardless of its prior state.
    pub async fn complete(&self, task_id: i64) -> Result<Task, Error> {
        let now = Utc::now();
        self.db
            .update_task(task_id, move |task| {
                if task.status == TaskStatus::Active {
                    if let Some(last_started) = task.last_started {
                        task.total_elapsed += elapsed_secs(last_started, now);
                    }
                }

                task.status = TaskStatus::Completed;
                task.completed_at = Some(now);
                task.last_started = None;
            })
            .await
    }
}

/// Wall-clock interval in fractional seconds, clamped at zero so a backwards
/// clock adjustment can never shrink `total_elapsed`.
fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds().max(0) as f64 / 1000.0
}
