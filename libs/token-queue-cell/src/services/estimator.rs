use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use uuid::Uuid;

use directory_cell::DirectoryService;

use crate::models::WaitEstimate;
use crate::services::store::TokenStore;

/// Linear wait model: every still-pending token ahead of the target in the
/// queue ordering costs one average consultation slot. Doctor-reported
/// delays are ignored unless the delay offset is enabled.
pub struct WaitEstimator {
    store: Arc<TokenStore>,
    directory: Arc<DirectoryService>,
    avg_minutes_per_patient: u32,
    apply_doctor_delay: bool,
}

impl WaitEstimator {
    pub fn new(
        store: Arc<TokenStore>,
        directory: Arc<DirectoryService>,
        avg_minutes_per_patient: u32,
        apply_doctor_delay: bool,
    ) -> Self {
        Self {
            store,
            directory,
            avg_minutes_per_patient,
            apply_doctor_delay,
        }
    }

    /// Zero pending predecessors means a zero-minute wait; this never errors,
    /// an unknown doctor or number simply estimates over an empty queue.
    pub async fn estimate(&self, doctor_id: Uuid, token_number: u32) -> WaitEstimate {
        let today = Local::now().date_naive();
        let ahead = self
            .store
            .pending_ahead(doctor_id, today, token_number)
            .await;

        let mut wait_minutes = ahead as u32 * self.avg_minutes_per_patient;

        if self.apply_doctor_delay {
            if let Some(delay) = self.directory.latest_delay(doctor_id).await {
                wait_minutes += delay.delay_minutes;
            }
        }

        WaitEstimate {
            wait_minutes,
            eta: Utc::now() + Duration::minutes(wait_minutes as i64),
        }
    }
}
