//! Governance Workflow
//!
//! The public surface of the draft/batch state machine. Validates request
//! payloads, enforces role preconditions (ADMIN for approve/reject/execute —
//! a business invariant, not a transport concern), delegates each mutation to
//! the store's atomic operations and logs every transition.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EngineError, EngineResult};
use crate::governance::models::{
    BatchStatus, DraftStatus, EntityType, GovernanceBatch, GovernanceEvent,
    GovernanceEventType, OutreachDraft,
};
use crate::governance::requests::{CreateBatchRequest, CreateDraftRequest, RejectBatchRequest};
use crate::governance::store::GovernanceStore;
use crate::models::Actor;

/// The governance workflow engine
pub struct GovernanceWorkflow {
    store: Arc<GovernanceStore>,
}

impl GovernanceWorkflow {
    pub fn new(store: Arc<GovernanceStore>) -> Self {
        Self { store }
    }

    /// Shared handle to the underlying store, for read-side collaborators.
    pub fn store(&self) -> Arc<GovernanceStore> {
        Arc::clone(&self.store)
    }

    /// Prepare a new outreach draft.
    pub async fn create_draft(
        &self,
        actor: Actor,
        request: CreateDraftRequest,
    ) -> EngineResult<OutreachDraft> {
        request.validate()?;
        let draft = OutreachDraft::new(
            request.relationship_id,
            request.firm_id,
            request.subject,
            request.body,
            actor.id,
        );
        let event = GovernanceEvent::new(
            draft.firm_id,
            EntityType::OutreachDraft,
            draft.id,
            GovernanceEventType::DraftPrepared,
            actor.id,
            serde_json::json!({ "relationshipId": draft.relationship_id }),
        );
        let draft = self.store.create_draft(draft, event).await;
        info!(draft_id = %draft.id, firm_id = %draft.firm_id, "draft prepared");
        Ok(draft)
    }

    /// Open a new governance batch.
    pub async fn create_batch(
        &self,
        actor: Actor,
        request: CreateBatchRequest,
    ) -> EngineResult<GovernanceBatch> {
        request.validate()?;
        let batch = GovernanceBatch::new(request.firm_id, request.label, actor.id);
        let event = GovernanceEvent::new(
            batch.firm_id,
            EntityType::Batch,
            batch.id,
            GovernanceEventType::BatchCreated,
            actor.id,
            serde_json::json!({ "label": batch.label }),
        );
        let batch = self.store.create_batch(batch, event).await;
        info!(batch_id = %batch.id, firm_id = %batch.firm_id, "batch created");
        Ok(batch)
    }

    /// Add a PREPARED draft to an OPEN batch.
    pub async fn add_draft_to_batch(
        &self,
        actor: Actor,
        firm_id: Uuid,
        draft_id: Uuid,
        batch_id: Uuid,
    ) -> EngineResult<OutreachDraft> {
        let draft = self
            .store
            .add_draft_to_batch(firm_id, draft_id, batch_id, actor.id)
            .await?;
        info!(%draft_id, %batch_id, "draft added to batch");
        Ok(draft)
    }

    /// Remove a draft from its batch, returning it to PREPARED.
    pub async fn remove_draft_from_batch(
        &self,
        actor: Actor,
        firm_id: Uuid,
        draft_id: Uuid,
    ) -> EngineResult<OutreachDraft> {
        let draft = self
            .store
            .remove_draft_from_batch(firm_id, draft_id, actor.id)
            .await?;
        info!(%draft_id, "draft removed from batch");
        Ok(draft)
    }

    /// Archive a draft that has not yet been approved.
    pub async fn archive_draft(
        &self,
        actor: Actor,
        firm_id: Uuid,
        draft_id: Uuid,
    ) -> EngineResult<OutreachDraft> {
        let draft = self.store.archive_draft(firm_id, draft_id, actor.id).await?;
        info!(%draft_id, "draft archived");
        Ok(draft)
    }

    /// Submit an OPEN batch for review.
    pub async fn submit_batch_for_review(
        &self,
        actor: Actor,
        firm_id: Uuid,
        batch_id: Uuid,
    ) -> EngineResult<GovernanceBatch> {
        let batch = self
            .store
            .submit_batch_for_review(firm_id, batch_id, actor.id)
            .await?;
        info!(%batch_id, "batch submitted for review");
        Ok(batch)
    }

    /// Approve a batch and all its member drafts. ADMIN only.
    pub async fn approve_batch(
        &self,
        actor: Actor,
        firm_id: Uuid,
        batch_id: Uuid,
    ) -> EngineResult<GovernanceBatch> {
        Self::require_admin(&actor, "approve batches")?;
        let (batch, drafts) = self.store.approve_batch(firm_id, batch_id, actor.id).await?;
        info!(%batch_id, draft_count = drafts.len(), approver = %actor.id, "batch approved");
        Ok(batch)
    }

    /// Reject a batch back to OPEN with a mandatory reason. ADMIN only.
    pub async fn reject_batch(
        &self,
        actor: Actor,
        firm_id: Uuid,
        batch_id: Uuid,
        request: RejectBatchRequest,
    ) -> EngineResult<GovernanceBatch> {
        Self::require_admin(&actor, "reject batches")?;
        request.validate()?;
        let batch = self
            .store
            .reject_batch(firm_id, batch_id, actor.id, &request.reason)
            .await?;
        info!(%batch_id, reason = %request.reason, "batch rejected");
        Ok(batch)
    }

    /// Execute an APPROVED batch and all its member drafts. ADMIN only.
    pub async fn execute_batch(
        &self,
        actor: Actor,
        firm_id: Uuid,
        batch_id: Uuid,
    ) -> EngineResult<GovernanceBatch> {
        Self::require_admin(&actor, "execute batches")?;
        let (batch, drafts) = self.store.execute_batch(firm_id, batch_id, actor.id).await?;
        info!(%batch_id, draft_count = drafts.len(), "batch executed");
        Ok(batch)
    }

    /// Archive a non-terminal batch.
    pub async fn archive_batch(
        &self,
        actor: Actor,
        firm_id: Uuid,
        batch_id: Uuid,
    ) -> EngineResult<GovernanceBatch> {
        let batch = self.store.archive_batch(firm_id, batch_id, actor.id).await?;
        info!(%batch_id, "batch archived");
        Ok(batch)
    }

    /// Fetch one draft.
    pub async fn draft(&self, firm_id: Uuid, draft_id: Uuid) -> EngineResult<OutreachDraft> {
        self.store.get_draft(firm_id, draft_id).await
    }

    /// Fetch one batch.
    pub async fn batch(&self, firm_id: Uuid, batch_id: Uuid) -> EngineResult<GovernanceBatch> {
        self.store.get_batch(firm_id, batch_id).await
    }

    /// List drafts, optionally by status.
    pub async fn drafts(&self, firm_id: Uuid, status: Option<DraftStatus>) -> Vec<OutreachDraft> {
        self.store.list_drafts(firm_id, status).await
    }

    /// List batches, optionally by status.
    pub async fn batches(
        &self,
        firm_id: Uuid,
        status: Option<BatchStatus>,
    ) -> Vec<GovernanceBatch> {
        self.store.list_batches(firm_id, status).await
    }

    /// List a batch's member drafts.
    pub async fn batch_drafts(&self, firm_id: Uuid, batch_id: Uuid) -> Vec<OutreachDraft> {
        self.store.list_batch_drafts(firm_id, batch_id).await
    }

    /// Firm audit log in emission order.
    pub async fn events(&self, firm_id: Uuid) -> Vec<GovernanceEvent> {
        self.store.list_events(firm_id).await
    }

    /// Audit log entries for one entity.
    pub async fn entity_events(&self, firm_id: Uuid, entity_id: Uuid) -> Vec<GovernanceEvent> {
        self.store.list_entity_events(firm_id, entity_id).await
    }

    fn require_admin(actor: &Actor, action: &str) -> EngineResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Forbidden(format!(
                "Only administrators can {}",
                action
            )))
        }
    }
}

impl Default for GovernanceWorkflow {
    fn default() -> Self {
        Self::new(Arc::new(GovernanceStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActorRole;

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), ActorRole::Admin)
    }

    fn member() -> Actor {
        Actor::new(Uuid::new_v4(), ActorRole::Member)
    }

    fn draft_request(firm_id: Uuid) -> CreateDraftRequest {
        CreateDraftRequest {
            relationship_id: Uuid::new_v4(),
            firm_id,
            subject: "Quarterly review".to_string(),
            body: "It has been a while since we last spoke.".to_string(),
        }
    }

    fn batch_request(firm_id: Uuid) -> CreateBatchRequest {
        CreateBatchRequest {
            firm_id,
            label: "September outreach".to_string(),
        }
    }

    async fn workflow_with_batch_and_draft(
        firm_id: Uuid,
        actor: Actor,
    ) -> (GovernanceWorkflow, GovernanceBatch, OutreachDraft) {
        let workflow = GovernanceWorkflow::default();
        let batch = workflow
            .create_batch(actor, batch_request(firm_id))
            .await
            .unwrap();
        let draft = workflow
            .create_draft(actor, draft_request(firm_id))
            .await
            .unwrap();
        (workflow, batch, draft)
    }

    #[tokio::test]
    async fn test_add_draft_then_repeat_fails() {
        let firm_id = Uuid::new_v4();
        let actor = member();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, actor).await;

        let updated = workflow
            .add_draft_to_batch(actor, firm_id, draft.id, batch.id)
            .await
            .unwrap();
        assert_eq!(updated.status, DraftStatus::InBatch);
        assert_eq!(updated.governance_batch_id, Some(batch.id));

        // Second add must fail: the draft is no longer PREPARED.
        let err = workflow
            .add_draft_to_batch(actor, firm_id, draft.id, batch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn test_add_draft_requires_open_batch() {
        let firm_id = Uuid::new_v4();
        let actor = member();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, actor).await;

        workflow
            .submit_batch_for_review(actor, firm_id, batch.id)
            .await
            .unwrap();

        let err = workflow
            .add_draft_to_batch(actor, firm_id, draft.id, batch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));
        // Draft untouched by the failed operation.
        let draft = workflow.draft(firm_id, draft.id).await.unwrap();
        assert_eq!(draft.status, DraftStatus::Prepared);
        assert!(draft.governance_batch_id.is_none());
    }

    #[tokio::test]
    async fn test_approve_batch_approves_every_member_draft() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let workflow = GovernanceWorkflow::default();
        let batch = workflow
            .create_batch(reviewer, batch_request(firm_id))
            .await
            .unwrap();
        let mut draft_ids = Vec::new();
        for _ in 0..3 {
            let draft = workflow
                .create_draft(reviewer, draft_request(firm_id))
                .await
                .unwrap();
            workflow
                .add_draft_to_batch(reviewer, firm_id, draft.id, batch.id)
                .await
                .unwrap();
            draft_ids.push(draft.id);
        }
        workflow
            .submit_batch_for_review(reviewer, firm_id, batch.id)
            .await
            .unwrap();

        let approved = workflow
            .approve_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        assert_eq!(approved.status, BatchStatus::Approved);
        assert_eq!(approved.approved_by, Some(reviewer.id));

        for id in draft_ids {
            let draft = workflow.draft(firm_id, id).await.unwrap();
            assert_eq!(draft.status, DraftStatus::Approved);
            assert_eq!(draft.approved_by, Some(reviewer.id));
            assert_eq!(draft.governance_batch_id, Some(batch.id));
        }
    }

    #[tokio::test]
    async fn test_approve_requires_admin_role() {
        let firm_id = Uuid::new_v4();
        let actor = member();
        let (workflow, batch, _draft) = workflow_with_batch_and_draft(firm_id, actor).await;

        let err = workflow
            .approve_batch(actor, firm_id, batch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let err = workflow
            .execute_batch(actor, firm_id, batch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_execute_non_approved_batch_mutates_nothing() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, reviewer).await;
        workflow
            .add_draft_to_batch(reviewer, firm_id, draft.id, batch.id)
            .await
            .unwrap();
        let events_before = workflow.events(firm_id).await.len();

        let err = workflow
            .execute_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));

        let batch = workflow.batch(firm_id, batch.id).await.unwrap();
        assert_eq!(batch.status, BatchStatus::Open);
        let draft = workflow.draft(firm_id, draft.id).await.unwrap();
        assert_eq!(draft.status, DraftStatus::InBatch);
        assert_eq!(workflow.events(firm_id).await.len(), events_before);
    }

    #[tokio::test]
    async fn test_execute_after_approve_executes_members() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, reviewer).await;
        workflow
            .add_draft_to_batch(reviewer, firm_id, draft.id, batch.id)
            .await
            .unwrap();
        workflow
            .approve_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        let executed = workflow
            .execute_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        assert_eq!(executed.status, BatchStatus::Executed);
        let draft = workflow.draft(firm_id, draft.id).await.unwrap();
        assert_eq!(draft.status, DraftStatus::Executed);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_approves_serialize_to_one_winner() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, reviewer).await;
        workflow
            .add_draft_to_batch(reviewer, firm_id, draft.id, batch.id)
            .await
            .unwrap();
        workflow
            .submit_batch_for_review(reviewer, firm_id, batch.id)
            .await
            .unwrap();

        let workflow = Arc::new(workflow);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let workflow = Arc::clone(&workflow);
            handles.push(tokio::spawn(async move {
                workflow.approve_batch(reviewer, firm_id, batch.id).await
            }));
        }

        let mut successes = 0;
        let mut transition_errors = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(approved) => {
                    successes += 1;
                    assert_eq!(approved.status, BatchStatus::Approved);
                }
                Err(EngineError::InvalidStateTransition(_)) => transition_errors += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(transition_errors, 7);

        // Exactly one approval event; no double emission from the losers.
        let approved_events = workflow
            .events(firm_id)
            .await
            .iter()
            .filter(|e| e.event_type == GovernanceEventType::BatchApproved)
            .count();
        assert_eq!(approved_events, 1);

        let draft = workflow.draft(firm_id, draft.id).await.unwrap();
        assert_eq!(draft.status, DraftStatus::Approved);
    }

    #[tokio::test]
    async fn test_reject_requires_reason_and_review_state() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let (workflow, batch, _draft) = workflow_with_batch_and_draft(firm_id, reviewer).await;

        // Rejecting an OPEN batch is not a legal transition.
        let err = workflow
            .reject_batch(
                reviewer,
                firm_id,
                batch.id,
                RejectBatchRequest {
                    reason: "Too early".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));

        workflow
            .submit_batch_for_review(reviewer, firm_id, batch.id)
            .await
            .unwrap();

        // Reason is mandatory.
        let err = workflow
            .reject_batch(
                reviewer,
                firm_id,
                batch.id,
                RejectBatchRequest {
                    reason: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let rejected = workflow
            .reject_batch(
                reviewer,
                firm_id,
                batch.id,
                RejectBatchRequest {
                    reason: "Copy needs rework".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(rejected.status, BatchStatus::Open);

        let events = workflow.entity_events(firm_id, batch.id).await;
        let reject_event = events
            .iter()
            .find(|e| e.event_type == GovernanceEventType::BatchRejected)
            .expect("reject event recorded");
        assert_eq!(reject_event.payload["reason"], "Copy needs rework");
    }

    #[tokio::test]
    async fn test_event_log_records_full_lifecycle_in_order() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, reviewer).await;
        workflow
            .add_draft_to_batch(reviewer, firm_id, draft.id, batch.id)
            .await
            .unwrap();
        workflow
            .submit_batch_for_review(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        workflow
            .approve_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        workflow
            .execute_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap();

        let types: Vec<GovernanceEventType> = workflow
            .events(firm_id)
            .await
            .iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                GovernanceEventType::BatchCreated,
                GovernanceEventType::DraftPrepared,
                GovernanceEventType::DraftAddedToBatch,
                GovernanceEventType::BatchSubmittedForReview,
                GovernanceEventType::BatchApproved,
                GovernanceEventType::BatchExecuted,
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_draft_resets_membership() {
        let firm_id = Uuid::new_v4();
        let actor = member();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, actor).await;
        workflow
            .add_draft_to_batch(actor, firm_id, draft.id, batch.id)
            .await
            .unwrap();
        let removed = workflow
            .remove_draft_from_batch(actor, firm_id, draft.id)
            .await
            .unwrap();
        assert_eq!(removed.status, DraftStatus::Prepared);
        assert!(removed.governance_batch_id.is_none());
        // Removed draft may be re-batched.
        workflow
            .add_draft_to_batch(actor, firm_id, draft.id, batch.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_unbatched_draft_leaves_audit_log_untouched() {
        let firm_id = Uuid::new_v4();
        let actor = member();
        let (workflow, _batch, draft) = workflow_with_batch_and_draft(firm_id, actor).await;
        let events_before = workflow.events(firm_id).await.len();

        // The draft was never batched; removal is an idempotent no-op.
        let removed = workflow
            .remove_draft_from_batch(actor, firm_id, draft.id)
            .await
            .unwrap();
        assert_eq!(removed.status, DraftStatus::Prepared);
        assert!(removed.governance_batch_id.is_none());

        let events = workflow.events(firm_id).await;
        assert_eq!(events.len(), events_before);
        assert!(events
            .iter()
            .all(|e| e.event_type != GovernanceEventType::DraftRemovedFromBatch));
    }

    #[tokio::test]
    async fn test_firm_scoping_hides_foreign_entities() {
        let firm_id = Uuid::new_v4();
        let other_firm = Uuid::new_v4();
        let actor = member();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, actor).await;

        assert!(matches!(
            workflow.batch(other_firm, batch.id).await.unwrap_err(),
            EngineError::NotFound(_)
        ));
        assert!(matches!(
            workflow
                .add_draft_to_batch(actor, other_firm, draft.id, batch.id)
                .await
                .unwrap_err(),
            EngineError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_archive_paths() {
        let firm_id = Uuid::new_v4();
        let reviewer = admin();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, reviewer).await;

        let archived = workflow
            .archive_draft(reviewer, firm_id, draft.id)
            .await
            .unwrap();
        assert_eq!(archived.status, DraftStatus::Archived);

        workflow
            .submit_batch_for_review(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        let archived = workflow
            .archive_batch(reviewer, firm_id, batch.id)
            .await
            .unwrap();
        assert_eq!(archived.status, BatchStatus::Archived);

        // Terminal: no further transitions.
        let err = workflow
            .submit_batch_for_review(reviewer, firm_id, batch.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn test_status_filtered_listings() {
        let firm_id = Uuid::new_v4();
        let actor = member();
        let (workflow, batch, draft) = workflow_with_batch_and_draft(firm_id, actor).await;
        let loose = workflow
            .create_draft(actor, draft_request(firm_id))
            .await
            .unwrap();
        workflow
            .add_draft_to_batch(actor, firm_id, draft.id, batch.id)
            .await
            .unwrap();

        let prepared = workflow.drafts(firm_id, Some(DraftStatus::Prepared)).await;
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].id, loose.id);

        let members = workflow.batch_drafts(firm_id, batch.id).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, draft.id);

        let open = workflow.batches(firm_id, Some(BatchStatus::Open)).await;
        assert_eq!(open.len(), 1);
    }
}
