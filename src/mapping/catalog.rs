//! Ledger source catalog
//!
//! Tracks external feeds through onboarding and holds their approved field
//! mappings. Mappings are replaced wholesale on re-approval, never merged;
//! approving a source's mappings flips it PENDING -> ACTIVE and writes a
//! MAPPING event to the governance audit log.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{not_found_error, validation_error, EngineResult};
use crate::governance::{EntityType, GovernanceEvent, GovernanceEventType, GovernanceStore};
use crate::mapping::models::{FieldMapping, LedgerSource, SourceStatus, TargetField};
use crate::models::Actor;

#[derive(Default)]
struct CatalogState {
    sources: HashMap<Uuid, LedgerSource>,
    mappings: HashMap<Uuid, Vec<FieldMapping>>,
}

/// Thread-safe catalog of ledger sources and their approved mappings
pub struct LedgerCatalog {
    state: Arc<RwLock<CatalogState>>,
    events: Arc<GovernanceStore>,
}

impl LedgerCatalog {
    pub fn new(events: Arc<GovernanceStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState::default())),
            events,
        }
    }

    /// Register a new feed in PENDING state.
    pub async fn register_source(
        &self,
        firm_id: Uuid,
        name: String,
        source_type: String,
    ) -> EngineResult<LedgerSource> {
        if name.trim().is_empty() {
            return Err(validation_error("Source name is required"));
        }
        let source = LedgerSource::new(firm_id, name, source_type);
        let mut state = self.state.write().await;
        state.sources.insert(source.id, source.clone());
        info!(source_id = %source.id, "ledger source registered");
        Ok(source)
    }

    /// Approve a source's column mappings. Existing mappings are replaced
    /// wholesale and the source becomes ACTIVE.
    pub async fn approve_mappings(
        &self,
        actor: Actor,
        firm_id: Uuid,
        source_id: Uuid,
        pairs: Vec<(String, TargetField)>,
    ) -> EngineResult<LedgerSource> {
        if pairs.is_empty() {
            return Err(validation_error(
                "At least one approved mapping is required",
            ));
        }

        let updated = {
            let mut state = self.state.write().await;
            let source = state
                .sources
                .get_mut(&source_id)
                .filter(|s| s.firm_id == firm_id)
                .ok_or_else(|| not_found_error(format!("Ledger source {} not found", source_id)))?;
            source.status = SourceStatus::Active;
            source.updated_at = chrono::Utc::now();
            let updated = source.clone();

            let replacement: Vec<FieldMapping> = pairs
                .iter()
                .map(|(column, target)| FieldMapping::new(source_id, column.clone(), *target))
                .collect();
            state.mappings.insert(source_id, replacement);
            updated
        };

        self.events
            .record_event(GovernanceEvent::new(
                firm_id,
                EntityType::Mapping,
                source_id,
                GovernanceEventType::MappingApproved,
                actor.id,
                serde_json::json!({
                    "sourceName": updated.name,
                    "mappingCount": pairs.len(),
                }),
            ))
            .await;

        info!(source_id = %source_id, mapping_count = pairs.len(), "mappings approved");
        Ok(updated)
    }

    /// Get one source, scoped to the firm.
    pub async fn source(&self, firm_id: Uuid, source_id: Uuid) -> EngineResult<LedgerSource> {
        let state = self.state.read().await;
        state
            .sources
            .get(&source_id)
            .filter(|s| s.firm_id == firm_id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Ledger source {} not found", source_id)))
    }

    /// List a firm's sources.
    pub async fn sources(&self, firm_id: Uuid) -> Vec<LedgerSource> {
        let state = self.state.read().await;
        state
            .sources
            .values()
            .filter(|s| s.firm_id == firm_id)
            .cloned()
            .collect()
    }

    /// The currently approved mappings of one source.
    pub async fn mappings(&self, firm_id: Uuid, source_id: Uuid) -> EngineResult<Vec<FieldMapping>> {
        let state = self.state.read().await;
        state
            .sources
            .get(&source_id)
            .filter(|s| s.firm_id == firm_id)
            .ok_or_else(|| not_found_error(format!("Ledger source {} not found", source_id)))?;
        Ok(state.mappings.get(&source_id).cloned().unwrap_or_default())
    }
}
