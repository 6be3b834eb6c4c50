use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::models::QueueEvent;

pub type QueueEventSender = broadcast::Sender<QueueEvent>;
pub type QueueEventReceiver = broadcast::Receiver<QueueEvent>;

/// Fan-out of queue-change events, one channel per doctor. Delivery is
/// best-effort at-most-once: publish never blocks the mutating operation
/// and a send failure is swallowed, never surfaced to the caller. Lagging
/// subscribers lose the oldest buffered events.
pub struct QueueBroadcaster {
    channels: Arc<RwLock<HashMap<Uuid, QueueEventSender>>>,
    buffer: usize,
}

impl QueueBroadcaster {
    pub fn new(buffer: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    /// Binds a subscriber to a doctor's channel, creating it on first use.
    /// New subscribers see only events published after this call.
    pub async fn subscribe(&self, doctor_id: Uuid) -> QueueEventReceiver {
        let mut channels = self.channels.write().await;
        let sender = channels.entry(doctor_id).or_insert_with(|| {
            debug!("Opened queue channel for doctor {}", doctor_id);
            broadcast::channel(self.buffer).0
        });
        sender.subscribe()
    }

    pub async fn publish(&self, doctor_id: Uuid, event: QueueEvent) {
        let mut channels = self.channels.write().await;
        match channels.get(&doctor_id) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    // Last receiver went away; drop the channel.
                    channels.remove(&doctor_id);
                    debug!("Pruned queue channel for doctor {}", doctor_id);
                }
            }
            None => {
                debug!("No subscribers for doctor {}, event dropped", doctor_id);
            }
        }
    }

    pub async fn subscriber_count(&self, doctor_id: Uuid) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(&doctor_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_channels(&self) -> Vec<Uuid> {
        let channels = self.channels.read().await;
        channels.keys().cloned().collect()
    }
}

impl Clone for QueueBroadcaster {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            buffer: self.buffer,
        }
    }
}
