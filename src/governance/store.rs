//! Governance storage
//!
//! Thread-safe in-memory store for drafts, batches and the event log. One
//! write guard spans each workflow mutation, so the draft/batch/event writes
//! of a single operation are atomic and concurrent operations on the same
//! batch serialize: preconditions are re-checked under the guard and nothing
//! is mutated until every check has passed.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{invalid_transition_error, not_found_error, EngineResult};
use crate::governance::models::{
    BatchStatus, DraftStatus, EntityType, GovernanceBatch, GovernanceEvent,
    GovernanceEventType, OutreachDraft,
};

#[derive(Default)]
struct LedgerState {
    drafts: HashMap<Uuid, OutreachDraft>,
    batches: HashMap<Uuid, GovernanceBatch>,
    events: Vec<GovernanceEvent>,
}

impl LedgerState {
    fn draft_mut(&mut self, firm_id: Uuid, draft_id: Uuid) -> EngineResult<&mut OutreachDraft> {
        self.drafts
            .get_mut(&draft_id)
            .filter(|d| d.firm_id == firm_id)
            .ok_or_else(|| not_found_error(format!("Draft {} not found", draft_id)))
    }

    fn batch_mut(&mut self, firm_id: Uuid, batch_id: Uuid) -> EngineResult<&mut GovernanceBatch> {
        self.batches
            .get_mut(&batch_id)
            .filter(|b| b.firm_id == firm_id)
            .ok_or_else(|| not_found_error(format!("Batch {} not found", batch_id)))
    }

    fn member_draft_ids(&self, batch_id: Uuid) -> Vec<Uuid> {
        self.drafts
            .values()
            .filter(|d| d.governance_batch_id == Some(batch_id))
            .map(|d| d.id)
            .collect()
    }
}

/// Thread-safe store for governance state
pub struct GovernanceStore {
    state: Arc<RwLock<LedgerState>>,
}

impl GovernanceStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// Insert a freshly prepared draft and record its event.
    pub async fn create_draft(
        &self,
        draft: OutreachDraft,
        event: GovernanceEvent,
    ) -> OutreachDraft {
        let mut state = self.state.write().await;
        state.drafts.insert(draft.id, draft.clone());
        state.events.push(event);
        draft
    }

    /// Insert a new open batch and record its event.
    pub async fn create_batch(
        &self,
        batch: GovernanceBatch,
        event: GovernanceEvent,
    ) -> GovernanceBatch {
        let mut state = self.state.write().await;
        state.batches.insert(batch.id, batch.clone());
        state.events.push(event);
        batch
    }

    /// Attach a PREPARED draft to an OPEN batch.
    pub async fn add_draft_to_batch(
        &self,
        firm_id: Uuid,
        draft_id: Uuid,
        batch_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<OutreachDraft> {
        let mut state = self.state.write().await;

        let batch = state.batch_mut(firm_id, batch_id)?;
        if batch.status != BatchStatus::Open {
            return Err(invalid_transition_error(format!(
                "Batch must be OPEN to accept drafts (currently {:?})",
                batch.status
            )));
        }

        let draft = state.draft_mut(firm_id, draft_id)?;
        draft.add_to_batch(batch_id)?;
        let updated = draft.clone();

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::OutreachDraft,
            draft_id,
            GovernanceEventType::DraftAddedToBatch,
            actor_id,
            serde_json::json!({ "batchId": batch_id }),
        ));
        Ok(updated)
    }

    /// Detach a draft from its batch, returning it to PREPARED. Idempotent:
    /// removing an unbatched draft succeeds without touching the audit log.
    pub async fn remove_draft_from_batch(
        &self,
        firm_id: Uuid,
        draft_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<OutreachDraft> {
        let mut state = self.state.write().await;
        let draft = state.draft_mut(firm_id, draft_id)?;
        let former_batch = draft.governance_batch_id;
        draft.remove_from_batch();
        let updated = draft.clone();

        if let Some(batch_id) = former_batch {
            state.events.push(GovernanceEvent::new(
                firm_id,
                EntityType::OutreachDraft,
                draft_id,
                GovernanceEventType::DraftRemovedFromBatch,
                actor_id,
                serde_json::json!({ "batchId": batch_id }),
            ));
        }
        Ok(updated)
    }

    /// Archive a PREPARED or IN_BATCH draft.
    pub async fn archive_draft(
        &self,
        firm_id: Uuid,
        draft_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<OutreachDraft> {
        let mut state = self.state.write().await;
        let draft = state.draft_mut(firm_id, draft_id)?;
        draft.archive()?;
        let updated = draft.clone();

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::OutreachDraft,
            draft_id,
            GovernanceEventType::DraftArchived,
            actor_id,
            serde_json::json!({}),
        ));
        Ok(updated)
    }

    /// Move an OPEN batch into review.
    pub async fn submit_batch_for_review(
        &self,
        firm_id: Uuid,
        batch_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<GovernanceBatch> {
        let mut state = self.state.write().await;
        let batch = state.batch_mut(firm_id, batch_id)?;
        batch.submit_for_review()?;
        let updated = batch.clone();

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::Batch,
            batch_id,
            GovernanceEventType::BatchSubmittedForReview,
            actor_id,
            serde_json::json!({ "label": updated.label }),
        ));
        Ok(updated)
    }

    /// Approve a batch and every member draft. Both succeed or neither is
    /// visible; the batch precondition is checked before any draft mutates.
    pub async fn approve_batch(
        &self,
        firm_id: Uuid,
        batch_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<(GovernanceBatch, Vec<OutreachDraft>)> {
        let mut state = self.state.write().await;

        let batch = state.batch_mut(firm_id, batch_id)?;
        batch.approve(actor_id)?;
        let updated_batch = batch.clone();

        let member_ids = state.member_draft_ids(batch_id);
        let mut updated_drafts = Vec::with_capacity(member_ids.len());
        for id in member_ids {
            if let Some(draft) = state.drafts.get_mut(&id) {
                draft.approve(actor_id);
                updated_drafts.push(draft.clone());
            }
        }

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::Batch,
            batch_id,
            GovernanceEventType::BatchApproved,
            actor_id,
            serde_json::json!({
                "label": updated_batch.label,
                "draftCount": updated_drafts.len(),
            }),
        ));
        Ok((updated_batch, updated_drafts))
    }

    /// Return a batch under review (or already approved) to OPEN.
    pub async fn reject_batch(
        &self,
        firm_id: Uuid,
        batch_id: Uuid,
        actor_id: Uuid,
        reason: &str,
    ) -> EngineResult<GovernanceBatch> {
        let mut state = self.state.write().await;
        let batch = state.batch_mut(firm_id, batch_id)?;
        batch.reject()?;
        let updated = batch.clone();

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::Batch,
            batch_id,
            GovernanceEventType::BatchRejected,
            actor_id,
            serde_json::json!({ "label": updated.label, "reason": reason }),
        ));
        Ok(updated)
    }

    /// Execute an APPROVED batch and every member draft, atomically.
    pub async fn execute_batch(
        &self,
        firm_id: Uuid,
        batch_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<(GovernanceBatch, Vec<OutreachDraft>)> {
        let mut state = self.state.write().await;

        let batch = state.batch_mut(firm_id, batch_id)?;
        batch.execute()?;
        let updated_batch = batch.clone();

        let member_ids = state.member_draft_ids(batch_id);
        let mut updated_drafts = Vec::with_capacity(member_ids.len());
        for id in member_ids {
            if let Some(draft) = state.drafts.get_mut(&id) {
                draft.execute();
                updated_drafts.push(draft.clone());
            }
        }

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::Batch,
            batch_id,
            GovernanceEventType::BatchExecuted,
            actor_id,
            serde_json::json!({
                "label": updated_batch.label,
                "draftCount": updated_drafts.len(),
            }),
        ));
        Ok((updated_batch, updated_drafts))
    }

    /// Archive a non-terminal batch.
    pub async fn archive_batch(
        &self,
        firm_id: Uuid,
        batch_id: Uuid,
        actor_id: Uuid,
    ) -> EngineResult<GovernanceBatch> {
        let mut state = self.state.write().await;
        let batch = state.batch_mut(firm_id, batch_id)?;
        batch.archive()?;
        let updated = batch.clone();

        state.events.push(GovernanceEvent::new(
            firm_id,
            EntityType::Batch,
            batch_id,
            GovernanceEventType::BatchArchived,
            actor_id,
            serde_json::json!({ "label": updated.label }),
        ));
        Ok(updated)
    }

    /// Append an event from outside the draft/batch workflow (e.g. mapping
    /// approval). The log is append-only; there is no update or delete.
    pub async fn record_event(&self, event: GovernanceEvent) {
        let mut state = self.state.write().await;
        state.events.push(event);
    }

    /// Get a draft by id, scoped to the firm.
    pub async fn get_draft(&self, firm_id: Uuid, draft_id: Uuid) -> EngineResult<OutreachDraft> {
        let state = self.state.read().await;
        state
            .drafts
            .get(&draft_id)
            .filter(|d| d.firm_id == firm_id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Draft {} not found", draft_id)))
    }

    /// Get a batch by id, scoped to the firm.
    pub async fn get_batch(&self, firm_id: Uuid, batch_id: Uuid) -> EngineResult<GovernanceBatch> {
        let state = self.state.read().await;
        state
            .batches
            .get(&batch_id)
            .filter(|b| b.firm_id == firm_id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Batch {} not found", batch_id)))
    }

    /// List a firm's drafts, optionally filtered by status.
    pub async fn list_drafts(
        &self,
        firm_id: Uuid,
        status: Option<DraftStatus>,
    ) -> Vec<OutreachDraft> {
        let state = self.state.read().await;
        state
            .drafts
            .values()
            .filter(|d| d.firm_id == firm_id)
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect()
    }

    /// List a firm's batches, optionally filtered by status.
    pub async fn list_batches(
        &self,
        firm_id: Uuid,
        status: Option<BatchStatus>,
    ) -> Vec<GovernanceBatch> {
        let state = self.state.read().await;
        state
            .batches
            .values()
            .filter(|b| b.firm_id == firm_id)
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect()
    }

    /// List the member drafts of one batch.
    pub async fn list_batch_drafts(&self, firm_id: Uuid, batch_id: Uuid) -> Vec<OutreachDraft> {
        let state = self.state.read().await;
        state
            .drafts
            .values()
            .filter(|d| d.firm_id == firm_id && d.governance_batch_id == Some(batch_id))
            .cloned()
            .collect()
    }

    /// List a firm's events in emission order.
    pub async fn list_events(&self, firm_id: Uuid) -> Vec<GovernanceEvent> {
        let state = self.state.read().await;
        state
            .events
            .iter()
            .filter(|e| e.firm_id == firm_id)
            .cloned()
            .collect()
    }

    /// List the events touching one entity, in emission order.
    pub async fn list_entity_events(
        &self,
        firm_id: Uuid,
        entity_id: Uuid,
    ) -> Vec<GovernanceEvent> {
        let state = self.state.read().await;
        state
            .events
            .iter()
            .filter(|e| e.firm_id == firm_id && e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Total event count across firms.
    pub async fn event_count(&self) -> usize {
        let state = self.state.read().await;
        state.events.len()
    }
}

impl Default for GovernanceStore {
    fn default() -> Self {
        Self::new()
    }
}
