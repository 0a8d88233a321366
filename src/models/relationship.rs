//! Relationship data models
//!
//! A relationship is one tracked client/contact in the firm's continuity
//! ledger. Score and grade are mutated only by the continuity scorer; the
//! grade must always be the canonical mapping of the score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::InteractionType;

/// Lifecycle status of a tracked relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Strong,
    Stable,
    Pending,
    Review,
    Inactive,
}

impl Default for LifecycleStatus {
    fn default() -> Self {
        LifecycleStatus::Review
    }
}

/// Continuity letter grade, AAA best through B worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContinuityGrade {
    Aaa,
    Aa,
    A,
    Bbb,
    Bb,
    B,
}

impl ContinuityGrade {
    /// Canonical score → grade mapping. The only place the thresholds live;
    /// a persisted (score, grade) pair must always agree with this.
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ContinuityGrade::Aaa,
            80..=89 => ContinuityGrade::Aa,
            70..=79 => ContinuityGrade::A,
            60..=69 => ContinuityGrade::Bbb,
            45..=59 => ContinuityGrade::Bb,
            _ => ContinuityGrade::B,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContinuityGrade::Aaa => "AAA",
            ContinuityGrade::Aa => "AA",
            ContinuityGrade::A => "A",
            ContinuityGrade::Bbb => "BBB",
            ContinuityGrade::Bb => "BB",
            ContinuityGrade::B => "B",
        }
    }
}

/// A tracked client relationship in the continuity ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: Uuid,
    /// Identifier in the originating system, when imported
    pub external_id: Option<String>,
    /// Firm that owns this relationship record
    pub firm_id: Uuid,
    pub display_name: String,
    /// Role/segment label, e.g. book classification
    pub segment: String,
    pub status: LifecycleStatus,
    /// Free-text value outlook
    pub value_outlook: String,
    pub continuity_grade: ContinuityGrade,
    /// Continuity score, 0-100
    pub continuity_score: u8,
    pub last_interaction_at: Option<DateTime<Utc>>,
    pub last_interaction_type: Option<InteractionType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship shell with the ungraded defaults used during
    /// onboarding (grade B, score 0, status under review).
    pub fn new(firm_id: Uuid, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id: None,
            firm_id,
            display_name,
            segment: String::new(),
            status: LifecycleStatus::Review,
            value_outlook: String::new(),
            continuity_grade: ContinuityGrade::B,
            continuity_score: 0,
            last_interaction_at: None,
            last_interaction_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a freshly computed score, keeping grade and score coherent.
    pub fn apply_score(&mut self, score: u8) {
        self.continuity_score = score;
        self.continuity_grade = ContinuityGrade::from_score(score);
        self.updated_at = Utc::now();
    }
}

/// Role of the actor performing a workflow operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Admin,
    Member,
}

/// Caller-supplied identity for role-checked operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: Uuid, role: ActorRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}
