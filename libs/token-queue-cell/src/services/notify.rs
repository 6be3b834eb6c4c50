use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{QueueNotification, Token};

/// Boundary to the delivery collaborator (SMS/email). The scheduler hands
/// off a notification and moves on; a background task records it and logs
/// the would-be delivery. A slow or dead consumer can never fail or delay
/// the queue transition that triggered it.
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<QueueNotification>,
    delivered: Arc<RwLock<HashMap<Uuid, Vec<QueueNotification>>>>,
}

impl NotificationDispatcher {
    /// Spawns the drain task; requires a running Tokio runtime.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueueNotification>();
        let delivered = Arc::new(RwLock::new(HashMap::new()));

        let sink = Arc::clone(&delivered);
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                info!(
                    "Notifying patient {}: {}",
                    notification.patient_id, notification.message
                );
                let mut sink = sink.write().await;
                sink.entry(notification.patient_id)
                    .or_insert_with(Vec::new)
                    .push(notification);
            }
        });

        Self { tx, delivered }
    }

    pub fn token_called(&self, token: &Token) {
        self.send(QueueNotification::called(token));
    }

    pub fn token_upcoming(&self, token: &Token) {
        self.send(QueueNotification::upcoming(token));
    }

    /// Notifications recorded for a patient, oldest first.
    pub async fn for_patient(&self, patient_id: Uuid) -> Vec<QueueNotification> {
        let delivered = self.delivered.read().await;
        delivered.get(&patient_id).cloned().unwrap_or_default()
    }

    fn send(&self, notification: QueueNotification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification drain task is gone, dropping notification");
        }
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NotificationDispatcher {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            delivered: Arc::clone(&self.delivered),
        }
    }
}
