use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller identity as asserted by the upstream gateway. The gateway owns
/// authentication; this service only consumes the resolved role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
    /// Set when the actor is a doctor; identifies the queue they own.
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Receptionist,
    Doctor,
    Patient,
}

impl Actor {
    /// Whether this actor may drive status transitions on a token belonging
    /// to the given doctor's queue. Admins and receptionists manage every
    /// queue; a doctor manages only their own; patients manage none.
    pub fn can_manage(&self, token_doctor_id: Uuid) -> bool {
        match self.role {
            ActorRole::Admin | ActorRole::Receptionist => true,
            ActorRole::Doctor => self.doctor_id == Some(token_doctor_id),
            ActorRole::Patient => false,
        }
    }
}

impl ActorRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(ActorRole::Admin),
            "receptionist" => Some(ActorRole::Receptionist),
            "doctor" => Some(ActorRole::Doctor),
            "patient" => Some(ActorRole::Patient),
            _ => None,
        }
    }
}
