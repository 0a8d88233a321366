//! Interaction data models
//!
//! One recorded contact event tied to exactly one relationship. Append-only;
//! never mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of recorded contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    Email,
    Call,
    Meeting,
    Note,
    Other,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Email => "EMAIL",
            InteractionType::Call => "CALL",
            InteractionType::Meeting => "MEETING",
            InteractionType::Note => "NOTE",
            InteractionType::Other => "OTHER",
        }
    }
}

/// Direction of the contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionDirection {
    Inbound,
    Outbound,
}

/// One recorded contact event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub interaction_type: InteractionType,
    pub direction: InteractionDirection,
    pub occurred_at: DateTime<Utc>,
    /// Non-negative importance signal; scoring caps the summed weight at the
    /// configured ceiling, individual weights are unbounded.
    pub value_weight: u32,
    pub notes: Option<String>,
    /// Tag of the source system when imported
    pub source_system: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(
        relationship_id: Uuid,
        interaction_type: InteractionType,
        direction: InteractionDirection,
        occurred_at: DateTime<Utc>,
        value_weight: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            relationship_id,
            interaction_type,
            direction,
            occurred_at,
            value_weight,
            notes: None,
            source_system: None,
            created_at: Utc::now(),
        }
    }
}
