use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::actor_middleware;

use crate::handlers::{
    book_token, call_token, complete_token, create_token, doctor_queue, estimate_wait,
    patient_active, patient_history, patient_notifications, queue_ws, set_priority, skip_token,
    verify_token, walkin_token,
};
use crate::state::QueueState;

pub fn create_token_queue_router(state: Arc<QueueState>) -> Router {
    let protected_routes = Router::new()
        .route("/tokens", post(create_token))
        .route("/tokens/book", post(book_token))
        .route("/tokens/walkin", post(walkin_token))
        .route("/tokens/{token_id}/call", post(call_token))
        .route("/tokens/{token_id}/complete", post(complete_token))
        .route("/tokens/{token_id}/skip", post(skip_token))
        .route("/tokens/{token_id}/priority", post(set_priority))
        .route("/tokens/{token_id}/verify", get(verify_token))
        .route("/patients/{patient_id}/active", get(patient_active))
        .route("/patients/{patient_id}/history", get(patient_history))
        .route(
            "/patients/{patient_id}/notifications",
            get(patient_notifications),
        )
        .layer(middleware::from_fn(actor_middleware));

    Router::new()
        .route("/doctors/{doctor_id}", get(doctor_queue))
        .route(
            "/doctors/{doctor_id}/estimate/{token_number}",
            get(estimate_wait),
        )
        .route("/ws/doctors/{doctor_id}", get(queue_ws))
        .merge(protected_routes)
        .with_state(state)
}
