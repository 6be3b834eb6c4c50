use thiserror::Error;

use directory_cell::DirectoryError;
use shared_models::error::AppError;

use crate::models::TokenStatus;

#[derive(Error, Debug)]
pub enum TokenQueueError {
    #[error("Token not found: {0}")]
    TokenNotFound(String),

    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Hospital not found: {0}")]
    HospitalNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: TokenStatus, to: TokenStatus },

    #[error("Token is {status}; no further changes are permitted")]
    TerminalToken { status: TokenStatus },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Outside operating hours: {0}")]
    OutOfHours(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DirectoryError> for TokenQueueError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::HospitalNotFound(id) => TokenQueueError::HospitalNotFound(id),
            DirectoryError::DoctorNotFound(id) => TokenQueueError::DoctorNotFound(id),
            DirectoryError::PatientNotFound(id) => TokenQueueError::PatientNotFound(id),
            DirectoryError::ValidationError(msg) => TokenQueueError::ValidationError(msg),
        }
    }
}

impl From<TokenQueueError> for AppError {
    fn from(err: TokenQueueError) -> Self {
        match &err {
            TokenQueueError::TokenNotFound(_)
            | TokenQueueError::DoctorNotFound(_)
            | TokenQueueError::PatientNotFound(_)
            | TokenQueueError::HospitalNotFound(_) => AppError::NotFound(err.to_string()),
            TokenQueueError::Conflict(_) => AppError::Conflict(err.to_string()),
            TokenQueueError::InvalidTransition { .. } | TokenQueueError::TerminalToken { .. } => {
                AppError::InvalidTransition(err.to_string())
            }
            TokenQueueError::PermissionDenied(_) => AppError::Permission(err.to_string()),
            TokenQueueError::OutOfHours(_) => AppError::OutOfHours(err.to_string()),
            TokenQueueError::ValidationError(_) => AppError::Validation(err.to_string()),
        }
    }
}
