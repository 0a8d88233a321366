//! Ledger mapping data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A raw tabular row from an external feed: column name to cell value.
/// Cells arrive as loose JSON (strings, numbers, nulls) and are coerced
/// during transformation.
pub type RawRecord = HashMap<String, serde_json::Value>;

/// Normalized target fields a raw column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetField {
    RelationshipName,
    BookClass,
    Status,
    LastInteractionDate,
    LastInteractionType,
    ValueOutlookDate,
}

impl TargetField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::RelationshipName => "RELATIONSHIP_NAME",
            TargetField::BookClass => "BOOK_CLASS",
            TargetField::Status => "STATUS",
            TargetField::LastInteractionDate => "LAST_INTERACTION_DATE",
            TargetField::LastInteractionType => "LAST_INTERACTION_TYPE",
            TargetField::ValueOutlookDate => "VALUE_OUTLOOK_DATE",
        }
    }
}

/// One suggested column mapping with a confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub source_column: String,
    pub target_field: Option<TargetField>,
    pub confidence: f32,
}

/// Onboarding status of an external feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceStatus {
    Pending,
    Active,
}

/// One external data feed being onboarded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSource {
    pub id: Uuid,
    pub firm_id: Uuid,
    pub name: String,
    /// Feed kind, e.g. "crm_export" or "spreadsheet"
    pub source_type: String,
    pub status: SourceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerSource {
    pub fn new(firm_id: Uuid, name: String, source_type: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            firm_id,
            name,
            source_type,
            status: SourceStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An approved source-column to target-field pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub id: Uuid,
    pub source_id: Uuid,
    pub source_column: String,
    pub target_field: TargetField,
    pub created_at: DateTime<Utc>,
}

impl FieldMapping {
    pub fn new(source_id: Uuid, source_column: String, target_field: TargetField) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            source_column,
            target_field,
            created_at: Utc::now(),
        }
    }
}
