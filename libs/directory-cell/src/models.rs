use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub specialty: Option<String>,
    /// OPD window during which the doctor accepts tokens. Doctors without a
    /// configured window accept tokens at any time.
    pub opd_open: Option<NaiveTime>,
    pub opd_close: Option<NaiveTime>,
    pub accepting_tokens: bool,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// Whether the given local time falls inside the doctor's OPD window.
    /// Windows spanning midnight (close < open) wrap around.
    pub fn within_opd_hours(&self, at: NaiveTime) -> bool {
        match (self.opd_open, self.opd_close) {
            (Some(open), Some(close)) => {
                if open <= close {
                    at >= open && at < close
                } else {
                    at >= open || at < close
                }
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    /// Created at the reception desk without prior online registration.
    pub walk_in: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDelayEvent {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub delay_minutes: u32,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterHospitalRequest {
    pub name: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDoctorRequest {
    pub hospital_id: Uuid,
    pub name: String,
    pub specialty: Option<String>,
    pub opd_open: Option<NaiveTime>,
    pub opd_close: Option<NaiveTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportDelayRequest {
    pub delay_minutes: u32,
    pub reason: Option<String>,
}
