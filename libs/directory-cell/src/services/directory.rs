use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    DirectoryError, Doctor, DoctorDelayEvent, Hospital, Patient, RegisterDoctorRequest,
    RegisterHospitalRequest, RegisterPatientRequest,
};

/// In-process registry of the entities the token queue references. Stands in
/// for the hospital information system that owns these records; the queue
/// core only needs existence checks, OPD hours and the delay log.
pub struct DirectoryService {
    hospitals: Arc<RwLock<HashMap<Uuid, Hospital>>>,
    doctors: Arc<RwLock<HashMap<Uuid, Doctor>>>,
    patients: Arc<RwLock<HashMap<Uuid, Patient>>>,
    delays: Arc<RwLock<HashMap<Uuid, Vec<DoctorDelayEvent>>>>,
}

impl DirectoryService {
    pub fn new() -> Self {
        Self {
            hospitals: Arc::new(RwLock::new(HashMap::new())),
            doctors: Arc::new(RwLock::new(HashMap::new())),
            patients: Arc::new(RwLock::new(HashMap::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register_hospital(
        &self,
        request: RegisterHospitalRequest,
    ) -> Result<Hospital, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::ValidationError(
                "Hospital name must not be empty".to_string(),
            ));
        }

        let hospital = Hospital {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            city: request.city,
            created_at: Utc::now(),
        };

        let mut hospitals = self.hospitals.write().await;
        hospitals.insert(hospital.id, hospital.clone());
        info!("Registered hospital {} ({})", hospital.name, hospital.id);
        Ok(hospital)
    }

    pub async fn hospital(&self, id: Uuid) -> Result<Hospital, DirectoryError> {
        let hospitals = self.hospitals.read().await;
        hospitals
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::HospitalNotFound(id.to_string()))
    }

    pub async fn register_doctor(
        &self,
        request: RegisterDoctorRequest,
    ) -> Result<Doctor, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::ValidationError(
                "Doctor name must not be empty".to_string(),
            ));
        }
        if request.opd_open.is_some() != request.opd_close.is_some() {
            return Err(DirectoryError::ValidationError(
                "OPD hours require both opening and closing times".to_string(),
            ));
        }

        // Doctors must hang off a known hospital
        self.hospital(request.hospital_id).await?;

        let doctor = Doctor {
            id: Uuid::new_v4(),
            hospital_id: request.hospital_id,
            name: request.name.trim().to_string(),
            specialty: request.specialty,
            opd_open: request.opd_open,
            opd_close: request.opd_close,
            accepting_tokens: true,
            created_at: Utc::now(),
        };

        let mut doctors = self.doctors.write().await;
        doctors.insert(doctor.id, doctor.clone());
        info!("Registered doctor {} ({})", doctor.name, doctor.id);
        Ok(doctor)
    }

    pub async fn doctor(&self, id: Uuid) -> Result<Doctor, DirectoryError> {
        let doctors = self.doctors.read().await;
        doctors
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::DoctorNotFound(id.to_string()))
    }

    pub async fn set_accepting_tokens(
        &self,
        doctor_id: Uuid,
        accepting: bool,
    ) -> Result<Doctor, DirectoryError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors
            .get_mut(&doctor_id)
            .ok_or_else(|| DirectoryError::DoctorNotFound(doctor_id.to_string()))?;
        doctor.accepting_tokens = accepting;
        Ok(doctor.clone())
    }

    pub async fn list_doctors(&self, hospital_id: Option<Uuid>) -> Vec<Doctor> {
        let doctors = self.doctors.read().await;
        let mut list: Vec<Doctor> = doctors
            .values()
            .filter(|d| hospital_id.map(|h| d.hospital_id == h).unwrap_or(true))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<Patient, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::ValidationError(
                "Patient name must not be empty".to_string(),
            ));
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            phone: request.phone,
            walk_in: false,
            created_at: Utc::now(),
        };

        let mut patients = self.patients.write().await;
        patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    /// Minimal patient record for someone standing at the desk without an
    /// online registration.
    pub async fn create_walkin_patient(&self, name: &str) -> Result<Patient, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::ValidationError(
                "Walk-in patient name must not be empty".to_string(),
            ));
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: None,
            walk_in: true,
            created_at: Utc::now(),
        };

        let mut patients = self.patients.write().await;
        patients.insert(patient.id, patient.clone());
        info!("Created walk-in patient {} ({})", patient.name, patient.id);
        Ok(patient)
    }

    pub async fn patient(&self, id: Uuid) -> Result<Patient, DirectoryError> {
        let patients = self.patients.read().await;
        patients
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::PatientNotFound(id.to_string()))
    }

    /// Records a doctor-reported delay. The estimator may consult the most
    /// recent event when delay offsets are enabled.
    pub async fn record_delay(
        &self,
        doctor_id: Uuid,
        delay_minutes: u32,
        reason: Option<String>,
    ) -> Result<DoctorDelayEvent, DirectoryError> {
        self.doctor(doctor_id).await?;

        let event = DoctorDelayEvent {
            id: Uuid::new_v4(),
            doctor_id,
            delay_minutes,
            reason: reason.unwrap_or_else(|| "Not specified".to_string()),
            recorded_at: Utc::now(),
        };

        let mut delays = self.delays.write().await;
        delays.entry(doctor_id).or_default().push(event.clone());
        debug!(
            "Recorded {} minute delay for doctor {}",
            event.delay_minutes, doctor_id
        );
        Ok(event)
    }

    pub async fn latest_delay(&self, doctor_id: Uuid) -> Option<DoctorDelayEvent> {
        let delays = self.delays.read().await;
        delays.get(&doctor_id).and_then(|v| v.last().cloned())
    }
}

impl Default for DirectoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DirectoryService {
    fn clone(&self) -> Self {
        Self {
            hospitals: Arc::clone(&self.hospitals),
            doctors: Arc::clone(&self.doctors),
            patients: Arc::clone(&self.patients),
            delays: Arc::clone(&self.delays),
        }
    }
}
