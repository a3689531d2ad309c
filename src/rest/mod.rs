//! HTTP surface for the task lifecycle. Thin glue: every handler maps one
//! route to one controller operation and translates errors to status codes.

pub mod routes;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use log::info;
use tower_http::cors::{Any, CorsLayer};

use crate::{settings::Settings, tasks::TaskController};

pub fn build_router(controller: TaskController, settings: &Settings) -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/api/tasks/{id}", delete(routes::tasks::delete_task))
        .route("/api/tasks/{id}/start", post(routes::tasks::start_task))
        .route("/api/tasks/{id}/pause", post(routes::tasks::pause_task))
        .route("/api/tasks/{id}/complete", post(routes::tasks::complete_task))
        .layer(cors_layer(settings))
        .with_state(controller)
}

pub async fn serve(controller: TaskController, settings: &Settings) -> Result<()> {
    let addr: SocketAddr = ([127, 0, 0, 1], settings.http_port).into();
    let router = build_router(controller, settings);

    info!("API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
