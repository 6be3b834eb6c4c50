use std::env;
use std::net::SocketAddr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Linear wait model constant: minutes of consultation per pending token.
    pub avg_minutes_per_patient: u32,
    /// Capacity of each per-doctor broadcast channel; lagging subscribers
    /// lose the oldest events first.
    pub broadcast_buffer: usize,
    /// Reject bookings outside a doctor's configured OPD window.
    pub enforce_opd_hours: bool,
    /// Fold the latest doctor-reported delay into wait estimates.
    /// Off by default pending a product decision.
    pub apply_doctor_delay: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("MEDQUEUE_BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("MEDQUEUE_BIND_ADDR not set, using 0.0.0.0:3000");
                    SocketAddr::from(([0, 0, 0, 0], 3000))
                }),
            avg_minutes_per_patient: env::var("MEDQUEUE_AVG_MINUTES_PER_PATIENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("MEDQUEUE_AVG_MINUTES_PER_PATIENT not set, using 8");
                    8
                }),
            broadcast_buffer: env::var("MEDQUEUE_BROADCAST_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64),
            enforce_opd_hours: env::var("MEDQUEUE_ENFORCE_OPD_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            apply_doctor_delay: env::var("MEDQUEUE_APPLY_DOCTOR_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            avg_minutes_per_patient: 8,
            broadcast_buffer: 64,
            enforce_opd_hours: false,
            apply_doctor_delay: false,
        }
    }
}
