use std::sync::Arc;

use chrono::Local;
use tracing::info;
use uuid::Uuid;

use directory_cell::DirectoryService;
use shared_config::AppConfig;
use shared_models::auth::Actor;

use crate::error::TokenQueueError;
use crate::models::{
    QueueEvent, Token, TokenDraft, TokenPriority, TokenStatus, TokenVerification,
};
use crate::services::broadcast::QueueBroadcaster;
use crate::services::notify::NotificationDispatcher;
use crate::services::store::TokenStore;

/// Drives every token state transition. Authorization is checked before any
/// mutation; events are published after the transition is durable in the
/// store, and publishing can never fail the operation.
pub struct TokenScheduler {
    config: AppConfig,
    store: Arc<TokenStore>,
    directory: Arc<DirectoryService>,
    broadcaster: Arc<QueueBroadcaster>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl TokenScheduler {
    pub fn new(
        config: AppConfig,
        store: Arc<TokenStore>,
        directory: Arc<DirectoryService>,
        broadcaster: Arc<QueueBroadcaster>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            config,
            store,
            directory,
            broadcaster,
            dispatcher,
        }
    }

    /// Issues a token for booking, walk-in and staff-created flows alike.
    /// The hospital defaults to the doctor's own when not given explicitly.
    pub async fn create(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        hospital_id: Option<Uuid>,
        priority: TokenPriority,
    ) -> Result<Token, TokenQueueError> {
        let doctor = self.directory.doctor(doctor_id).await?;

        if !doctor.accepting_tokens {
            return Err(TokenQueueError::OutOfHours(format!(
                "Doctor {} is not accepting tokens",
                doctor.name
            )));
        }
        if self.config.enforce_opd_hours && !doctor.within_opd_hours(Local::now().time()) {
            return Err(TokenQueueError::OutOfHours(format!(
                "Doctor {} is outside OPD hours",
                doctor.name
            )));
        }

        self.directory.patient(patient_id).await?;

        let hospital_id = match hospital_id {
            Some(id) => {
                self.directory.hospital(id).await?;
                id
            }
            None => doctor.hospital_id,
        };

        let token = self
            .store
            .create(TokenDraft {
                hospital_id,
                doctor_id,
                patient_id,
                priority,
            })
            .await?;

        self.broadcaster
            .publish(doctor_id, QueueEvent::created(&token))
            .await;

        info!(
            "Token {} issued for doctor {} (patient {}, priority {:?})",
            token.token_number, doctor_id, patient_id, priority
        );
        Ok(token)
    }

    /// waiting -> in_service. Notifies the called patient and hints the next
    /// waiting token (priority desc, number asc) without mutating it.
    pub async fn call(&self, token_id: Uuid, actor: &Actor) -> Result<Token, TokenQueueError> {
        let token = self.authorize(token_id, actor).await?;
        let called = self
            .store
            .update_status(token.id, TokenStatus::InService)
            .await?;

        self.broadcaster
            .publish(called.doctor_id, QueueEvent::called(&called))
            .await;
        self.dispatcher.token_called(&called);

        if let Some(next) = self.store.next_waiting(called.doctor_id).await {
            self.dispatcher.token_upcoming(&next);
        }

        info!(
            "Token {} called for doctor {}",
            called.token_number, called.doctor_id
        );
        Ok(called)
    }

    /// in_service -> completed (terminal).
    pub async fn complete(&self, token_id: Uuid, actor: &Actor) -> Result<Token, TokenQueueError> {
        let token = self.authorize(token_id, actor).await?;
        let completed = self
            .store
            .update_status(token.id, TokenStatus::Completed)
            .await?;

        self.broadcaster
            .publish(completed.doctor_id, QueueEvent::completed(&completed))
            .await;

        info!(
            "Token {} completed for doctor {}",
            completed.token_number, completed.doctor_id
        );
        Ok(completed)
    }

    /// waiting -> skipped (terminal). Downstream consumers see a completion
    /// event distinguished by the skipped status in the payload.
    pub async fn skip(&self, token_id: Uuid, actor: &Actor) -> Result<Token, TokenQueueError> {
        let token = self.authorize(token_id, actor).await?;
        let skipped = self
            .store
            .update_status(token.id, TokenStatus::Skipped)
            .await?;

        self.broadcaster
            .publish(skipped.doctor_id, QueueEvent::completed(&skipped))
            .await;

        info!(
            "Token {} skipped for doctor {}",
            skipped.token_number, skipped.doctor_id
        );
        Ok(skipped)
    }

    /// Priority change on a non-terminal token. The queue reorders on the
    /// next read; no requeue step exists.
    pub async fn set_priority(
        &self,
        token_id: Uuid,
        priority: TokenPriority,
        actor: &Actor,
    ) -> Result<Token, TokenQueueError> {
        let token = self.authorize(token_id, actor).await?;
        let updated = self.store.update_priority(token.id, priority).await?;

        self.broadcaster
            .publish(updated.doctor_id, QueueEvent::priority_updated(&updated))
            .await;

        info!(
            "Token {} priority set to {:?} for doctor {}",
            updated.token_number, priority, updated.doctor_id
        );
        Ok(updated)
    }

    pub async fn queue(&self, doctor_id: Uuid) -> Vec<Token> {
        self.store.list_active(doctor_id).await
    }

    /// Check-in verification: a token is valid while it has not been served
    /// or skipped.
    pub async fn verify(&self, token_id: Uuid) -> Result<TokenVerification, TokenQueueError> {
        let token = self.store.get(token_id).await?;
        let valid = !token.status.is_terminal();
        Ok(TokenVerification {
            valid,
            token_id: token.id,
            token_number: token.token_number,
            status: token.status,
            message: if valid {
                "Token is valid".to_string()
            } else {
                "Token already used".to_string()
            },
        })
    }

    /// Loads the token and rejects unauthorized actors before anything is
    /// mutated.
    async fn authorize(&self, token_id: Uuid, actor: &Actor) -> Result<Token, TokenQueueError> {
        let token = self.store.get(token_id).await?;
        if !actor.can_manage(token.doctor_id) {
            return Err(TokenQueueError::PermissionDenied(format!(
                "Actor {} may not manage this doctor's queue",
                actor.id
            )));
        }
        Ok(token)
    }
}
