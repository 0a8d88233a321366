//! Governance workflow
//!
//! Owns the outreach draft and batch entities, the legal state transitions
//! between them, and the append-only event log every transition writes to.
//! Drafts move PREPARED -> IN_BATCH -> APPROVED -> EXECUTED; batches move
//! OPEN -> UNDER_REVIEW -> APPROVED -> EXECUTED, with ARCHIVED as the
//! rejection/retirement path.

mod models;
mod requests;
mod store;
mod workflow;

pub use models::{
    BatchStatus, DraftStatus, EntityType, GovernanceBatch, GovernanceEvent,
    GovernanceEventType, OutreachDraft,
};
pub use requests::{CreateBatchRequest, CreateDraftRequest, RejectBatchRequest};
pub use store::GovernanceStore;
pub use workflow::GovernanceWorkflow;
