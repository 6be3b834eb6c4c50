use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::actor_middleware;

use crate::handlers::{
    get_doctor, get_hospital, list_doctors, register_doctor, register_hospital, register_patient,
    report_delay,
};
use crate::services::directory::DirectoryService;

pub fn create_directory_router(directory: Arc<DirectoryService>) -> Router {
    let protected_routes = Router::new()
        .route("/doctors/{doctor_id}/delay", post(report_delay))
        .layer(middleware::from_fn(actor_middleware));

    Router::new()
        .route("/hospitals", post(register_hospital))
        .route("/hospitals/{hospital_id}", get(get_hospital))
        .route("/doctors", post(register_doctor).get(list_doctors))
        .route("/doctors/{doctor_id}", get(get_doctor))
        .route("/patients", post(register_patient))
        .merge(protected_routes)
        .with_state(directory)
}
