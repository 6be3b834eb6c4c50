use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::TokenQueueError;
use crate::models::{Token, TokenDraft, TokenPriority, TokenStatus};
use crate::services::sequencer;

/// Tokens belonging to one doctor's queue. Every mutation of the queue
/// passes through the shard's Mutex, so numbering and transitions for one
/// doctor are linearized while different doctors proceed in parallel.
#[derive(Default)]
struct DoctorShard {
    tokens: HashMap<Uuid, Token>,
}

/// Single source of truth for token state. Sharded by doctor; an id index
/// routes token-id lookups to the owning shard. Tokens are never removed.
pub struct TokenStore {
    shards: Arc<RwLock<HashMap<Uuid, Arc<Mutex<DoctorShard>>>>>,
    doctor_of: Arc<RwLock<HashMap<Uuid, Uuid>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            shards: Arc::new(RwLock::new(HashMap::new())),
            doctor_of: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mints a token: duplicate-active check, number assignment and insert
    /// all happen under the doctor's shard lock as one atomic unit.
    pub async fn create(&self, draft: TokenDraft) -> Result<Token, TokenQueueError> {
        let shard = self.shard(draft.doctor_id).await;
        let mut guard = shard.lock().await;

        let duplicate = guard
            .tokens
            .values()
            .any(|t| t.patient_id == draft.patient_id && t.status.is_active());
        if duplicate {
            return Err(TokenQueueError::Conflict(format!(
                "Patient {} already holds an active token for this doctor",
                draft.patient_id
            )));
        }

        let now = Utc::now();
        let booking_date = Local::now().date_naive();
        let token_number = sequencer::next_token_number(guard.tokens.values(), booking_date);

        let token = Token {
            id: Uuid::new_v4(),
            token_number,
            hospital_id: draft.hospital_id,
            doctor_id: draft.doctor_id,
            patient_id: draft.patient_id,
            status: TokenStatus::Waiting,
            priority: draft.priority,
            booked_at: now,
            booking_date,
            called_at: None,
            created_at: now,
            updated_at: now,
        };

        guard.tokens.insert(token.id, token.clone());
        drop(guard);

        let mut doctor_of = self.doctor_of.write().await;
        doctor_of.insert(token.id, token.doctor_id);

        debug!(
            "Issued token {} (number {}) for doctor {}",
            token.id, token.token_number, token.doctor_id
        );
        Ok(token)
    }

    pub async fn get(&self, token_id: Uuid) -> Result<Token, TokenQueueError> {
        let shard = self.shard_of(token_id).await?;
        let guard = shard.lock().await;
        guard
            .tokens
            .get(&token_id)
            .cloned()
            .ok_or_else(|| TokenQueueError::TokenNotFound(token_id.to_string()))
    }

    /// The QueueSnapshot: active tokens ordered priority desc, number asc.
    /// Recomputed on every call, never cached.
    pub async fn list_active(&self, doctor_id: Uuid) -> Vec<Token> {
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;
        let mut active: Vec<Token> = guard
            .tokens
            .values()
            .filter(|t| t.status.is_active())
            .cloned()
            .collect();
        active.sort_by(Token::queue_ordering);
        active
    }

    /// Applies a status transition after checking the state machine. On any
    /// failure the token is untouched. `called_at` is stamped on the first
    /// (and only possible) waiting -> in_service transition.
    pub async fn update_status(
        &self,
        token_id: Uuid,
        new_status: TokenStatus,
    ) -> Result<Token, TokenQueueError> {
        let shard = self.shard_of(token_id).await?;
        let mut guard = shard.lock().await;
        let token = guard
            .tokens
            .get_mut(&token_id)
            .ok_or_else(|| TokenQueueError::TokenNotFound(token_id.to_string()))?;

        if !token.status.can_transition_to(&new_status) {
            return Err(TokenQueueError::InvalidTransition {
                from: token.status,
                to: new_status,
            });
        }

        let old_status = token.status;
        token.status = new_status;
        token.updated_at = Utc::now();
        if old_status == TokenStatus::Waiting
            && new_status == TokenStatus::InService
            && token.called_at.is_none()
        {
            token.called_at = Some(token.updated_at);
        }

        debug!(
            "Token {} transitioned {} -> {}",
            token_id, old_status, new_status
        );
        Ok(token.clone())
    }

    /// Priority may change while the token is still active; terminal tokens
    /// are immutable. No status change, reordering happens on the next read.
    pub async fn update_priority(
        &self,
        token_id: Uuid,
        priority: TokenPriority,
    ) -> Result<Token, TokenQueueError> {
        let shard = self.shard_of(token_id).await?;
        let mut guard = shard.lock().await;
        let token = guard
            .tokens
            .get_mut(&token_id)
            .ok_or_else(|| TokenQueueError::TokenNotFound(token_id.to_string()))?;

        if token.status.is_terminal() {
            return Err(TokenQueueError::TerminalToken {
                status: token.status,
            });
        }

        token.priority = priority;
        token.updated_at = Utc::now();
        Ok(token.clone())
    }

    pub async fn max_token_number(&self, doctor_id: Uuid, date: NaiveDate) -> Option<u32> {
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;
        guard
            .tokens
            .values()
            .filter(|t| t.booking_date == date)
            .map(|t| t.token_number)
            .max()
    }

    /// Estimator query: still-pending tokens for the day that sit ahead of
    /// the target in the queue ordering. An unissued number is treated as a
    /// normal-priority tail entry.
    pub async fn pending_ahead(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        token_number: u32,
    ) -> usize {
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;
        let target_priority = guard
            .tokens
            .values()
            .find(|t| t.booking_date == date && t.token_number == token_number)
            .map(|t| t.priority)
            .unwrap_or(TokenPriority::Normal);
        guard
            .tokens
            .values()
            .filter(|t| {
                t.booking_date == date
                    && t.status.is_active()
                    && (t.priority > target_priority
                        || (t.priority == target_priority && t.token_number < token_number))
            })
            .count()
    }

    /// Head of the waiting line under the queue ordering; the upcoming-hint
    /// target after a call.
    pub async fn next_waiting(&self, doctor_id: Uuid) -> Option<Token> {
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;
        guard
            .tokens
            .values()
            .filter(|t| t.status == TokenStatus::Waiting)
            .min_by(|a, b| Token::queue_ordering(a, b))
            .cloned()
    }

    /// A patient's currently active token across all doctors, if any.
    pub async fn active_for_patient(&self, patient_id: Uuid) -> Option<Token> {
        for shard in self.all_shards().await {
            let guard = shard.lock().await;
            if let Some(token) = guard
                .tokens
                .values()
                .find(|t| t.patient_id == patient_id && t.status.is_active())
            {
                return Some(token.clone());
            }
        }
        None
    }

    /// Terminal tokens for a patient, newest first.
    pub async fn history_for_patient(&self, patient_id: Uuid) -> Vec<Token> {
        let mut history = Vec::new();
        for shard in self.all_shards().await {
            let guard = shard.lock().await;
            history.extend(
                guard
                    .tokens
                    .values()
                    .filter(|t| t.patient_id == patient_id && t.status.is_terminal())
                    .cloned(),
            );
        }
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history
    }

    // Private helper methods

    async fn shard(&self, doctor_id: Uuid) -> Arc<Mutex<DoctorShard>> {
        {
            let shards = self.shards.read().await;
            if let Some(shard) = shards.get(&doctor_id) {
                return Arc::clone(shard);
            }
        }

        let mut shards = self.shards.write().await;
        Arc::clone(
            shards
                .entry(doctor_id)
                .or_insert_with(|| Arc::new(Mutex::new(DoctorShard::default()))),
        )
    }

    async fn shard_of(&self, token_id: Uuid) -> Result<Arc<Mutex<DoctorShard>>, TokenQueueError> {
        let doctor_id = {
            let doctor_of = self.doctor_of.read().await;
            doctor_of
                .get(&token_id)
                .copied()
                .ok_or_else(|| TokenQueueError::TokenNotFound(token_id.to_string()))?
        };
        Ok(self.shard(doctor_id).await)
    }

    async fn all_shards(&self) -> Vec<Arc<Mutex<DoctorShard>>> {
        let shards = self.shards.read().await;
        shards.values().map(Arc::clone).collect()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TokenStore {
    fn clone(&self) -> Self {
        Self {
            shards: Arc::clone(&self.shards),
            doctor_of: Arc::clone(&self.doctor_of),
        }
    }
}
