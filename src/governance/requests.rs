//! Workflow request payloads
//!
//! Explicit request structs per operation, validated at the workflow boundary
//! before any state is touched.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request to prepare a new outreach draft
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    pub relationship_id: Uuid,
    pub firm_id: Uuid,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
}

/// Request to open a new governance batch
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub firm_id: Uuid,
    #[validate(length(min = 1, message = "Batch label is required"))]
    pub label: String,
}

/// Request to reject a batch. The reason is mandatory; it is written into the
/// BATCH_REJECTED event payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectBatchRequest {
    #[validate(length(min = 1, message = "Rejection reason is required"))]
    pub reason: String,
}
