use chrono::Utc;
use rusqlite::{params, Connection, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{parse_datetime, parse_optional_datetime, parse_status},
        models::{Task, TaskStatus},
    },
    error::Error,
};

fn row_to_task(row: &Row) -> anyhow::Result<Task> {
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let started_at: Option<String> = row.get("started_at")?;
    let completed_at: Option<String> = row.get("completed_at")?;
    let last_started: Option<String> = row.get("last_started")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_status(&status)?,
        created_at: parse_datetime(&created_at, "created_at")?,
        started_at: parse_optional_datetime(started_at, "started_at")?,
        completed_at: parse_optional_datetime(completed_at, "completed_at")?,
        total_elapsed: row.get("total_elapsed")?,
        last_started: parse_optional_datetime(last_started, "last_started")?,
    })
}

fn fetch_task(conn: &Connection, task_id: i64) -> Result<Task, Error> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, status, created_at, started_at, completed_at, total_elapsed, last_started
         FROM tasks
         WHERE id = ?1",
    )?;

    let mut rows = stmt.query(params![task_id])?;
    match rows.next()? {
        Some(row) => Ok(row_to_task(row)?),
        None => Err(Error::NotFound(task_id)),
    }
}

impl Database {
    /// Create a task in the `not_started` state. Rejects an empty title
    /// before anything touches the database.
    pub async fn insert_task(&self, title: String, description: String) -> Result<Task, Error> {
        if title.is_empty() {
            return Err(Error::Validation("title must not be empty".into()));
        }

        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO tasks (title, description, status, created_at, total_elapsed)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![
                    title,
                    description,
                    TaskStatus::NotStarted.as_str(),
                    now.to_rfc3339(),
                ],
            )?;

            let task_id = conn.last_insert_rowid();
            fetch_task(conn, task_id)
        })
        .await
    }

    pub async fn get_task(&self, task_id: i64) -> Result<Task, Error> {
        self.execute(move |conn| fetch_task(conn, task_id)).await
    }

    /// All tasks, unfinished before finished, newest first within each group.
    /// Callers depend on this ordering to surface open work above history.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, Error> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, status, created_at, started_at, completed_at, total_elapsed, last_started
                 FROM tasks
                 ORDER BY
                     completed_at IS NULL DESC,
                     created_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }

            Ok(tasks)
        })
        .await
    }

    /// Read the task, apply `mutate`, and write every mutable column back.
    /// The read and write happen inside one transaction on the worker
    /// thread, so the transition is atomic with respect to all other jobs.
    pub async fn update_task<F>(&self, task_id: i64, mutate: F) -> Result<Task, Error>
    where
        F: FnOnce(&mut Task) + Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let mut task = fetch_task(&tx, task_id)?;
            mutate(&mut task);

            tx.execute(
                "UPDATE tasks
                 SET title = ?1,
                     description = ?2,
                     status = ?3,
                     started_at = ?4,
                     completed_at = ?5,
                     total_elapsed = ?6,
                     last_started = ?7
                 WHERE id = ?8",
                params![
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.started_at.map(|dt| dt.to_rfc3339()),
                    task.completed_at.map(|dt| dt.to_rfc3339()),
                    task.total_elapsed,
                    task.last_started.map(|dt| dt.to_rfc3339()),
                    task_id,
                ],
            )?;

            tx.commit()?;
            Ok(task)
        })
        .await
    }

    /// Hard delete. The id is never handed out again (AUTOINCREMENT).
    pub async fn delete_task(&self, task_id: i64) -> Result<(), Error> {
        self.execute(move |conn| {
            let rows_affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;

            if rows_affected == 0 {
                return Err(Error::NotFound(task_id));
            }

            Ok(())
        })
        .await
    }
}
