use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Hospital not found: {0}")]
    HospitalNotFound(String),

    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::HospitalNotFound(_)
            | DirectoryError::DoctorNotFound(_)
            | DirectoryError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
            DirectoryError::ValidationError(_) => AppError::Validation(err.to_string()),
        }
    }
}
