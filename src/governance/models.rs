//! Governance data models
//!
//! Draft and batch entities with their transition rules, and the immutable
//! event records written for every workflow action. Transition validation
//! lives on the models; the store applies them under a single write guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{invalid_transition_error, EngineResult};

/// Outreach draft status in the governance workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    /// Prepared and editable, not yet in any batch
    Prepared,
    /// Collected into a batch awaiting review
    InBatch,
    /// Cleared by an administrator
    Approved,
    /// Outreach sent
    Executed,
    /// Withdrawn or rejected
    Archived,
}

impl Default for DraftStatus {
    fn default() -> Self {
        DraftStatus::Prepared
    }
}

/// Governance batch status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Open,
    UnderReview,
    Approved,
    Executed,
    Archived,
}

impl BatchStatus {
    /// EXECUTED and ARCHIVED batches accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Executed | BatchStatus::Archived)
    }
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Open
    }
}

/// A proposed communication awaiting governance clearance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachDraft {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub firm_id: Uuid,
    pub subject: String,
    pub body: String,
    pub status: DraftStatus,
    pub prepared_by: Uuid,
    pub approved_by: Option<Uuid>,
    /// Set only while the draft is IN_BATCH, APPROVED or EXECUTED
    pub governance_batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutreachDraft {
    pub fn new(
        relationship_id: Uuid,
        firm_id: Uuid,
        subject: String,
        body: String,
        prepared_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            relationship_id,
            firm_id,
            subject,
            body,
            status: DraftStatus::Prepared,
            prepared_by,
            approved_by: None,
            governance_batch_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the draft to an open batch.
    pub fn add_to_batch(&mut self, batch_id: Uuid) -> EngineResult<()> {
        if self.status != DraftStatus::Prepared {
            return Err(invalid_transition_error(format!(
                "Draft must be in PREPARED state to join a batch (currently {:?})",
                self.status
            )));
        }
        self.status = DraftStatus::InBatch;
        self.governance_batch_id = Some(batch_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Detach from its batch and return to PREPARED.
    pub fn remove_from_batch(&mut self) {
        self.status = DraftStatus::Prepared;
        self.governance_batch_id = None;
        self.updated_at = Utc::now();
    }

    /// Mark approved as part of its batch.
    pub fn approve(&mut self, approver_id: Uuid) {
        self.status = DraftStatus::Approved;
        self.approved_by = Some(approver_id);
        self.updated_at = Utc::now();
    }

    /// Mark executed as part of its batch.
    pub fn execute(&mut self) {
        self.status = DraftStatus::Executed;
        self.updated_at = Utc::now();
    }

    /// Retire the draft. Only reachable before approval.
    pub fn archive(&mut self) -> EngineResult<()> {
        match self.status {
            DraftStatus::Prepared | DraftStatus::InBatch => {
                self.status = DraftStatus::Archived;
                self.governance_batch_id = None;
                self.updated_at = Utc::now();
                Ok(())
            }
            other => Err(invalid_transition_error(format!(
                "Draft must be PREPARED or IN_BATCH to archive (currently {:?})",
                other
            ))),
        }
    }
}

/// A named collection of drafts moving through review together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceBatch {
    pub id: Uuid,
    pub firm_id: Uuid,
    pub label: String,
    pub status: BatchStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GovernanceBatch {
    pub fn new(firm_id: Uuid, label: String, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            firm_id,
            label,
            status: BatchStatus::Open,
            created_by,
            approved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn submit_for_review(&mut self) -> EngineResult<()> {
        if self.status != BatchStatus::Open {
            return Err(invalid_transition_error(format!(
                "Batch must be OPEN to submit for review (currently {:?})",
                self.status
            )));
        }
        self.status = BatchStatus::UnderReview;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn approve(&mut self, approver_id: Uuid) -> EngineResult<()> {
        if !matches!(self.status, BatchStatus::Open | BatchStatus::UnderReview) {
            return Err(invalid_transition_error(format!(
                "Batch must be OPEN or UNDER_REVIEW to approve (currently {:?})",
                self.status
            )));
        }
        self.status = BatchStatus::Approved;
        self.approved_by = Some(approver_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return the batch to OPEN. Restricted to UNDER_REVIEW or APPROVED; the
    /// original behavior checked nothing, tightened per DESIGN.md.
    pub fn reject(&mut self) -> EngineResult<()> {
        if !matches!(self.status, BatchStatus::UnderReview | BatchStatus::Approved) {
            return Err(invalid_transition_error(format!(
                "Batch must be UNDER_REVIEW or APPROVED to reject (currently {:?})",
                self.status
            )));
        }
        self.status = BatchStatus::Open;
        self.approved_by = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn execute(&mut self) -> EngineResult<()> {
        if self.status != BatchStatus::Approved {
            return Err(invalid_transition_error(format!(
                "Only APPROVED batches can be executed (currently {:?})",
                self.status
            )));
        }
        self.status = BatchStatus::Executed;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn archive(&mut self) -> EngineResult<()> {
        if self.status.is_terminal() {
            return Err(invalid_transition_error(format!(
                "Batch in terminal state {:?} cannot be archived",
                self.status
            )));
        }
        self.status = BatchStatus::Archived;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Entity a governance event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Relationship,
    OutreachDraft,
    Batch,
    Mapping,
}

/// Event types emitted by workflow mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernanceEventType {
    BatchCreated,
    DraftPrepared,
    DraftAddedToBatch,
    DraftRemovedFromBatch,
    DraftArchived,
    BatchSubmittedForReview,
    BatchApproved,
    BatchRejected,
    BatchExecuted,
    BatchArchived,
    MappingApproved,
}

impl GovernanceEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GovernanceEventType::BatchCreated => "BATCH_CREATED",
            GovernanceEventType::DraftPrepared => "DRAFT_PREPARED",
            GovernanceEventType::DraftAddedToBatch => "DRAFT_ADDED_TO_BATCH",
            GovernanceEventType::DraftRemovedFromBatch => "DRAFT_REMOVED_FROM_BATCH",
            GovernanceEventType::DraftArchived => "DRAFT_ARCHIVED",
            GovernanceEventType::BatchSubmittedForReview => "BATCH_SUBMITTED_FOR_REVIEW",
            GovernanceEventType::BatchApproved => "BATCH_APPROVED",
            GovernanceEventType::BatchRejected => "BATCH_REJECTED",
            GovernanceEventType::BatchExecuted => "BATCH_EXECUTED",
            GovernanceEventType::BatchArchived => "BATCH_ARCHIVED",
            GovernanceEventType::MappingApproved => "MAPPING_APPROVED",
        }
    }
}

/// Immutable audit record for one workflow action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceEvent {
    pub id: Uuid,
    pub firm_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub event_type: GovernanceEventType,
    pub actor_id: Uuid,
    pub payload: Value,
    pub occurred_at: DateTime<Utc>,
}

impl GovernanceEvent {
    pub fn new(
        firm_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
        event_type: GovernanceEventType,
        actor_id: Uuid,
        payload: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            firm_id,
            entity_type,
            entity_id,
            event_type,
            actor_id,
            payload,
            occurred_at: Utc::now(),
        }
    }
}
