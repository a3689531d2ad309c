use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{db::Task, error::Error, tasks::TaskController};

type ApiError = (StatusCode, Json<Value>);

fn into_api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "error": err.to_string() })))
}

pub async fn list_tasks(
    State(controller): State<TaskController>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = controller.list().await.map_err(into_api_error)?;
    Ok(Json(tasks))
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
}

pub async fn create_task(
    State(controller): State<TaskController>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Json<Value>, ApiError> {
    let task = controller
        .create(body.title, body.description)
        .await
        .map_err(into_api_error)?;

    Ok(Json(json!({ "id": task.id, "status": "success" })))
}

pub async fn delete_task(
    State(controller): State<TaskController>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    controller.delete(task_id).await.map_err(into_api_error)?;
    Ok(Json(json!({ "deleted_id": task_id, "status": "success" })))
}

pub async fn start_task(
    State(controller): State<TaskController>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    controller.start(task_id).await.map_err(into_api_error)?;
    Ok(Json(json!({ "status": "success" })))
}

pub async fn pause_task(
    State(controller): State<TaskController>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    controller.pause(task_id).await.map_err(into_api_error)?;
    Ok(Json(json!({ "status": "success" })))
}

pub async fn complete_task(
    State(controller): State<TaskController>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    controller.complete(task_id).await.map_err(into_api_error)?;
    Ok(Json(json!({ "status": "success" })))
}
