use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A queue ticket entitling one patient to one consultation with one doctor
/// on one day. Never deleted; retention is the collaborator's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    /// Positive, contiguous from 1 per (doctor, booking_date).
    pub token_number: u32,
    pub hospital_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub status: TokenStatus,
    pub priority: TokenPriority,
    pub booked_at: DateTime<Utc>,
    /// Local calendar date the token was booked for; numbering scope key.
    pub booking_date: NaiveDate,
    /// Set exactly once, on the first waiting -> in_service transition.
    pub called_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Waiting,
    InService,
    Completed,
    Skipped,
}

impl TokenStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TokenStatus::Completed | TokenStatus::Skipped)
    }

    /// Still occupying a place in the doctor's queue.
    pub fn is_active(&self) -> bool {
        matches!(self, TokenStatus::Waiting | TokenStatus::InService)
    }

    pub fn can_transition_to(&self, target: &TokenStatus) -> bool {
        use TokenStatus::*;
        match (self, target) {
            (Waiting, InService) => true,
            (Waiting, Skipped) => true,
            (InService, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Waiting => "waiting",
            TokenStatus::InService => "in_service",
            TokenStatus::Completed => "completed",
            TokenStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire format is the bare integer (0 = normal, 1 = emergency), matching the
/// priority field the clients already exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenPriority {
    Normal,
    Emergency,
}

impl TokenPriority {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(TokenPriority::Normal),
            1 => Some(TokenPriority::Emergency),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> u8 {
        match self {
            TokenPriority::Normal => 0,
            TokenPriority::Emergency => 1,
        }
    }
}

impl Serialize for TokenPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for TokenPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        TokenPriority::from_wire(value)
            .ok_or_else(|| serde::de::Error::custom("priority must be 0 (normal) or 1 (emergency)"))
    }
}

impl Token {
    /// Queue position comparator: emergency before normal, then earlier
    /// token numbers first. Evaluated fresh on every queue read so priority
    /// changes reorder implicitly.
    pub fn queue_ordering(a: &Token, b: &Token) -> Ordering {
        b.priority
            .cmp(&a.priority)
            .then(a.token_number.cmp(&b.token_number))
    }
}

/// Fields the store needs to mint a token; numbering and timestamps are
/// assigned inside the store's atomic unit.
#[derive(Debug, Clone)]
pub struct TokenDraft {
    pub hospital_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub priority: TokenPriority,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTokenRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// Defaults to the doctor's hospital when omitted.
    pub hospital_id: Option<Uuid>,
    pub priority: Option<TokenPriority>,
}

/// Patient self-service booking; the patient is the acting caller and the
/// priority is always normal.
#[derive(Debug, Clone, Deserialize)]
pub struct BookTokenRequest {
    pub doctor_id: Uuid,
    pub hospital_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalkinTokenRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPriorityRequest {
    pub priority: TokenPriority,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenIssued {
    pub token_id: Uuid,
    pub token_number: u32,
    pub status: TokenStatus,
    pub priority: TokenPriority,
    pub estimated_wait_minutes: u32,
    pub eta: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitEstimate {
    pub wait_minutes: u32,
    pub eta: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenVerification {
    pub valid: bool,
    pub token_id: Uuid,
    pub token_number: u32,
    pub status: TokenStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEventKind {
    TokenCreated,
    TokenCalled,
    TokenCompleted,
    TokenPriorityUpdated,
}

/// Queue-change event fanned out to a doctor's subscribers. Best-effort,
/// at-most-once; late subscribers query the queue view instead of replaying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEvent {
    pub event: QueueEventKind,
    pub token_id: Uuid,
    pub token_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TokenStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TokenPriority>,
}

impl QueueEvent {
    pub fn created(token: &Token) -> Self {
        Self {
            event: QueueEventKind::TokenCreated,
            token_id: token.id,
            token_number: token.token_number,
            status: Some(token.status),
            priority: Some(token.priority),
        }
    }

    pub fn called(token: &Token) -> Self {
        Self {
            event: QueueEventKind::TokenCalled,
            token_id: token.id,
            token_number: token.token_number,
            status: Some(token.status),
            priority: None,
        }
    }

    /// Emitted for both completion and skip; the payload status tells the
    /// two apart for downstream consumers.
    pub fn completed(token: &Token) -> Self {
        Self {
            event: QueueEventKind::TokenCompleted,
            token_id: token.id,
            token_number: token.token_number,
            status: Some(token.status),
            priority: None,
        }
    }

    pub fn priority_updated(token: &Token) -> Self {
        Self {
            event: QueueEventKind::TokenPriorityUpdated,
            token_id: token.id,
            token_number: token.token_number,
            status: None,
            priority: Some(token.priority),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TokenCalled,
    TokenUpcoming,
}

/// Handed to the delivery collaborator (SMS/email); the core only emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueNotification {
    pub patient_id: Uuid,
    pub token_id: Uuid,
    pub token_number: u32,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl QueueNotification {
    pub fn called(token: &Token) -> Self {
        Self {
            patient_id: token.patient_id,
            token_id: token.id,
            token_number: token.token_number,
            kind: NotificationKind::TokenCalled,
            message: format!(
                "Your token {} has been called. Please proceed.",
                token.token_number
            ),
            created_at: Utc::now(),
        }
    }

    pub fn upcoming(token: &Token) -> Self {
        Self {
            patient_id: token.patient_id,
            token_id: token.id,
            token_number: token.token_number,
            kind: NotificationKind::TokenUpcoming,
            message: format!("Your token {} is coming next.", token.token_number),
            created_at: Utc::now(),
        }
    }
}
