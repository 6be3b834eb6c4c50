use std::sync::Arc;

use axum::{routing::get, Router};

use directory_cell::{create_directory_router, DirectoryService};
use token_queue_cell::{create_token_queue_router, QueueState};

pub fn create_router(directory: Arc<DirectoryService>, queue_state: Arc<QueueState>) -> Router {
    Router::new()
        .route("/", get(|| async { "MedQueue API is running!" }))
        .nest("/directory", create_directory_router(directory))
        .nest("/queue", create_token_queue_router(queue_state))
}
