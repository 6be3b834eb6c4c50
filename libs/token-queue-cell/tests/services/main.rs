use std::sync::Arc;

use tokio::time::Duration;
use uuid::Uuid;

use directory_cell::{
    DirectoryService, RegisterDoctorRequest, RegisterHospitalRequest, RegisterPatientRequest,
};
use shared_config::AppConfig;
use shared_models::auth::{Actor, ActorRole};
use token_queue_cell::*;

/// Test harness wiring a fresh directory, store and queue state per test.
pub struct TestContext {
    pub state: Arc<QueueState>,
    pub directory: Arc<DirectoryService>,
    pub hospital_id: Uuid,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let directory = Arc::new(DirectoryService::new());
        let hospital = directory
            .register_hospital(RegisterHospitalRequest {
                name: "City General".to_string(),
                city: None,
            })
            .await
            .expect("Failed to register hospital");

        let state = QueueState::new(config, Arc::clone(&directory));

        Self {
            state,
            directory,
            hospital_id: hospital.id,
        }
    }

    pub async fn seed_doctor(&self) -> Uuid {
        self.directory
            .register_doctor(RegisterDoctorRequest {
                hospital_id: self.hospital_id,
                name: "Dr. Mehta".to_string(),
                specialty: Some("general medicine".to_string()),
                opd_open: None,
                opd_close: None,
            })
            .await
            .expect("Failed to register doctor")
            .id
    }

    pub async fn seed_doctor_with_hours(
        &self,
        opd_open: chrono::NaiveTime,
        opd_close: chrono::NaiveTime,
    ) -> Uuid {
        self.directory
            .register_doctor(RegisterDoctorRequest {
                hospital_id: self.hospital_id,
                name: "Dr. Rao".to_string(),
                specialty: None,
                opd_open: Some(opd_open),
                opd_close: Some(opd_close),
            })
            .await
            .expect("Failed to register doctor")
            .id
    }

    pub async fn seed_patient(&self, name: &str) -> Uuid {
        self.directory
            .register_patient(RegisterPatientRequest {
                name: name.to_string(),
                phone: None,
            })
            .await
            .expect("Failed to register patient")
            .id
    }

    pub fn receptionist(&self) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: ActorRole::Receptionist,
            doctor_id: None,
        }
    }

    pub fn doctor_actor(&self, doctor_id: Uuid) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: ActorRole::Doctor,
            doctor_id: Some(doctor_id),
        }
    }

    pub fn patient_actor(&self, patient_id: Uuid) -> Actor {
        Actor {
            id: patient_id,
            role: ActorRole::Patient,
            doctor_id: None,
        }
    }

    /// Issues a normal-priority token through the scheduler.
    pub async fn issue(&self, doctor_id: Uuid, patient_id: Uuid) -> Token {
        self.state
            .scheduler
            .create(doctor_id, patient_id, None, TokenPriority::Normal)
            .await
            .expect("Failed to issue token")
    }

    /// Polls the dispatcher until the patient has at least `count`
    /// notifications or the timeout elapses.
    pub async fn wait_for_notifications(
        &self,
        patient_id: Uuid,
        count: usize,
        timeout_secs: u64,
    ) -> Vec<QueueNotification> {
        let deadline = std::time::Instant::now() + Duration::from_secs(timeout_secs);
        loop {
            let notifications = self.state.dispatcher.for_patient(patient_id).await;
            if notifications.len() >= count || std::time::Instant::now() > deadline {
                return notifications;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

// Test modules
mod broadcast_test;
mod estimator_test;
