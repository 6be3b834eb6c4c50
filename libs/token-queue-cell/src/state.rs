use std::sync::Arc;

use directory_cell::DirectoryService;
use shared_config::AppConfig;

use crate::services::broadcast::QueueBroadcaster;
use crate::services::estimator::WaitEstimator;
use crate::services::notify::NotificationDispatcher;
use crate::services::scheduler::TokenScheduler;
use crate::services::store::TokenStore;

/// Shared state for the token-queue routes; built once at startup so the
/// store, channels and dispatcher live for the whole process.
pub struct QueueState {
    pub config: AppConfig,
    pub store: Arc<TokenStore>,
    pub directory: Arc<DirectoryService>,
    pub broadcaster: Arc<QueueBroadcaster>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub scheduler: TokenScheduler,
    pub estimator: WaitEstimator,
}

impl QueueState {
    /// Requires a running Tokio runtime (the dispatcher spawns its drain
    /// task).
    pub fn new(config: AppConfig, directory: Arc<DirectoryService>) -> Arc<Self> {
        let store = Arc::new(TokenStore::new());
        let broadcaster = Arc::new(QueueBroadcaster::new(config.broadcast_buffer));
        let dispatcher = Arc::new(NotificationDispatcher::new());

        let scheduler = TokenScheduler::new(
            config.clone(),
            Arc::clone(&store),
            Arc::clone(&directory),
            Arc::clone(&broadcaster),
            Arc::clone(&dispatcher),
        );
        let estimator = WaitEstimator::new(
            Arc::clone(&store),
            Arc::clone(&directory),
            config.avg_minutes_per_patient,
            config.apply_doctor_delay,
        );

        Arc::new(Self {
            config,
            store,
            directory,
            broadcaster,
            dispatcher,
            scheduler,
            estimator,
        })
    }
}
