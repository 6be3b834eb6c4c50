use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_models::auth::{Actor, ActorRole};
use shared_models::error::AppError;

use crate::services::directory::DirectoryService;
use crate::{
    RegisterDoctorRequest, RegisterHospitalRequest, RegisterPatientRequest, ReportDelayRequest,
};

pub async fn register_hospital(
    State(directory): State<Arc<DirectoryService>>,
    Json(request): Json<RegisterHospitalRequest>,
) -> Result<Json<Value>, AppError> {
    let hospital = directory.register_hospital(request).await?;
    Ok(Json(json!({
        "hospital_id": hospital.id,
        "name": hospital.name
    })))
}

pub async fn get_hospital(
    State(directory): State<Arc<DirectoryService>>,
    Path(hospital_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let hospital = directory.hospital(hospital_id).await?;
    Ok(Json(json!(hospital)))
}

pub async fn register_doctor(
    State(directory): State<Arc<DirectoryService>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = directory.register_doctor(request).await?;
    Ok(Json(json!({
        "doctor_id": doctor.id,
        "hospital_id": doctor.hospital_id,
        "name": doctor.name,
        "opd_open": doctor.opd_open,
        "opd_close": doctor.opd_close
    })))
}

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub hospital_id: Option<Uuid>,
}

pub async fn list_doctors(
    State(directory): State<Arc<DirectoryService>>,
    Query(query): Query<DoctorListQuery>,
) -> Json<Value> {
    let doctors = directory.list_doctors(query.hospital_id).await;
    Json(json!({ "doctors": doctors }))
}

pub async fn get_doctor(
    State(directory): State<Arc<DirectoryService>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = directory.doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

pub async fn register_patient(
    State(directory): State<Arc<DirectoryService>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient = directory.register_patient(request).await?;
    Ok(Json(json!({
        "patient_id": patient.id,
        "name": patient.name
    })))
}

/// Doctor-reported delay. Logged as an auxiliary signal; the wait estimator
/// only folds it in when delay offsets are enabled in config.
pub async fn report_delay(
    State(directory): State<Arc<DirectoryService>>,
    Extension(actor): Extension<Actor>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<ReportDelayRequest>,
) -> Result<Json<Value>, AppError> {
    let allowed = match actor.role {
        ActorRole::Admin => true,
        ActorRole::Doctor => actor.doctor_id == Some(doctor_id),
        _ => false,
    };
    if !allowed {
        return Err(AppError::Permission(
            "Only the doctor or an admin may report a delay".to_string(),
        ));
    }

    let event = directory
        .record_delay(doctor_id, request.delay_minutes, request.reason)
        .await?;

    info!(
        "Doctor {} delayed by {} minutes: {}",
        doctor_id, event.delay_minutes, event.reason
    );

    Ok(Json(json!({
        "detail": "Doctor delay logged",
        "delay_minutes": event.delay_minutes
    })))
}
