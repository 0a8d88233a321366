//! Record Transformer
//!
//! Deterministically turns approved mappings plus raw rows into normalized
//! relationship and interaction records. Fuzzy status/type parsing is an
//! ordered first-match-wins rule table; rows without a resolvable display
//! name are skipped with a warning, never a hard failure of the whole import.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::TransformSettings;
use crate::mapping::models::{FieldMapping, RawRecord, TargetField};
use crate::models::{
    ContinuityGrade, Interaction, InteractionDirection, InteractionType, LifecycleStatus,
    Relationship,
};

/// Ordered fuzzy-parse rules for lifecycle status. "inactive" is listed ahead
/// of "active", which it contains, so dormant books are not misread as strong.
static STATUS_RULES: Lazy<Vec<(&'static [&'static str], LifecycleStatus)>> = Lazy::new(|| {
    vec![
        (
            &["inactive", "dormant"] as &[&str],
            LifecycleStatus::Inactive,
        ),
        (&["strong", "active"], LifecycleStatus::Strong),
        (&["stable", "good"], LifecycleStatus::Stable),
        (&["pending", "new"], LifecycleStatus::Pending),
        (&["review", "watch"], LifecycleStatus::Review),
    ]
});

/// Ordered fuzzy-parse rules for interaction type
static TYPE_RULES: Lazy<Vec<(&'static [&'static str], InteractionType)>> = Lazy::new(|| {
    vec![
        (&["email", "mail"] as &[&str], InteractionType::Email),
        (&["call", "phone"], InteractionType::Call),
        (&["meeting", "meet", "visit"], InteractionType::Meeting),
        (&["note", "memo"], InteractionType::Note),
        (&["other"], InteractionType::Other),
    ]
});

/// Date formats accepted by the permissive parser, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Result of one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutcome {
    pub relationships: Vec<Relationship>,
    pub interactions: Vec<Interaction>,
    /// Rows dropped for lack of a resolvable display name
    pub skipped_rows: usize,
}

/// Coarse portfolio health summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAssessment {
    pub total: usize,
    pub strong_stable_pct: f64,
    pub review_pct: f64,
    pub inactive_pct: f64,
    pub rating: u8,
    pub rating_grade: ContinuityGrade,
}

/// Deterministic raw-row to normalized-record transformer
pub struct RecordTransformer {
    settings: TransformSettings,
}

impl RecordTransformer {
    pub fn new(settings: TransformSettings) -> Self {
        Self { settings }
    }

    /// Transform raw rows through the approved mapping lookup. Rows missing a
    /// display name are skipped and counted; every row resolving a
    /// last-interaction date also yields one synthetic imported interaction.
    pub fn apply_mapping(
        &self,
        firm_id: Uuid,
        raw_records: &[RawRecord],
        approved_mappings: &[FieldMapping],
    ) -> TransformOutcome {
        let lookup: HashMap<&str, TargetField> = approved_mappings
            .iter()
            .map(|m| (m.source_column.as_str(), m.target_field))
            .collect();

        let mut relationships = Vec::new();
        let mut interactions = Vec::new();
        let mut skipped_rows = 0usize;

        for (row_index, row) in raw_records.iter().enumerate() {
            let mut relationship = Relationship::new(firm_id, String::new());
            let mut last_interaction_type: Option<InteractionType> = None;
            let mut last_interaction_at: Option<DateTime<Utc>> = None;

            for (column, value) in row {
                let Some(target) = lookup.get(column.as_str()) else {
                    continue;
                };
                let Some(text) = cell_text(value) else {
                    continue;
                };
                match target {
                    TargetField::RelationshipName => relationship.display_name = text,
                    TargetField::BookClass => relationship.segment = text,
                    TargetField::Status => relationship.status = parse_status(&text),
                    TargetField::LastInteractionDate => {
                        // Unparsable dates are discarded silently.
                        last_interaction_at = parse_date(&text);
                    }
                    TargetField::LastInteractionType => {
                        last_interaction_type = Some(parse_interaction_type(&text));
                    }
                    TargetField::ValueOutlookDate => relationship.value_outlook = text,
                }
            }

            if relationship.display_name.is_empty() {
                warn!(row_index, "skipping row without a resolvable display name");
                skipped_rows += 1;
                continue;
            }

            if relationship.segment.is_empty() {
                relationship.segment = self.settings.default_segment.clone();
            }
            if relationship.value_outlook.is_empty() {
                relationship.value_outlook = self.settings.default_outlook.clone();
            }
            relationship.last_interaction_at = last_interaction_at;
            relationship.last_interaction_type = if last_interaction_at.is_some() {
                Some(last_interaction_type.unwrap_or(InteractionType::Note))
            } else {
                last_interaction_type
            };

            if let Some(occurred_at) = last_interaction_at {
                let mut imported = Interaction::new(
                    relationship.id,
                    last_interaction_type.unwrap_or(InteractionType::Note),
                    InteractionDirection::Outbound,
                    occurred_at,
                    1,
                );
                imported.notes = Some(self.settings.import_note.clone());
                interactions.push(imported);
            }

            relationships.push(relationship);
        }

        info!(
            imported = relationships.len(),
            skipped = skipped_rows,
            "ledger rows transformed"
        );

        TransformOutcome {
            relationships,
            interactions,
            skipped_rows,
        }
    }

    /// Coarse portfolio summary over transformed relationships. Empty input
    /// yields the zero-state, never an error.
    pub fn generate_assessment(&self, relationships: &[Relationship]) -> PortfolioAssessment {
        let total = relationships.len();
        let count = |pred: &dyn Fn(&Relationship) -> bool| {
            relationships.iter().filter(|r| pred(r)).count()
        };

        let strong_stable = count(&|r| {
            matches!(r.status, LifecycleStatus::Strong | LifecycleStatus::Stable)
        });
        let review = count(&|r| r.status == LifecycleStatus::Review);
        let inactive = count(&|r| r.status == LifecycleStatus::Inactive);

        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                (n as f64) * 100.0 / (total as f64)
            }
        };

        let strong_stable_pct = pct(strong_stable);
        let rating: u8 = if strong_stable_pct >= 70.0 {
            85
        } else if strong_stable_pct >= 50.0 {
            75
        } else if strong_stable_pct >= 30.0 {
            65
        } else {
            50
        };
        let rating_grade = if rating >= 80 {
            ContinuityGrade::Aa
        } else if rating >= 70 {
            ContinuityGrade::A
        } else if rating >= 60 {
            ContinuityGrade::Bbb
        } else {
            ContinuityGrade::Bb
        };

        PortfolioAssessment {
            total,
            strong_stable_pct,
            review_pct: pct(review),
            inactive_pct: pct(inactive),
            rating,
            rating_grade,
        }
    }
}

impl Default for RecordTransformer {
    fn default() -> Self {
        Self::new(TransformSettings::default())
    }
}

/// Coerce a raw cell to trimmed text. Nulls and empty strings resolve to None.
fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Fuzzy lifecycle-status parse; unrecognized values land under REVIEW.
fn parse_status(raw: &str) -> LifecycleStatus {
    let lowered = raw.to_lowercase();
    STATUS_RULES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| lowered.contains(f)))
        .map(|(_, status)| *status)
        .unwrap_or(LifecycleStatus::Review)
}

/// Fuzzy interaction-type parse; unrecognized values default to NOTE.
fn parse_interaction_type(raw: &str) -> InteractionType {
    let lowered = raw.to_lowercase();
    TYPE_RULES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| lowered.contains(f)))
        .map(|(_, kind)| *kind)
        .unwrap_or(InteractionType::Note)
}

/// Permissive date parse: RFC 3339 first, then common date and datetime
/// layouts. Returns None rather than erroring on unparsable input.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mappings(source_id: Uuid) -> Vec<FieldMapping> {
        vec![
            FieldMapping::new(source_id, "client_name".into(), TargetField::RelationshipName),
            FieldMapping::new(source_id, "tier".into(), TargetField::BookClass),
            FieldMapping::new(source_id, "status".into(), TargetField::Status),
            FieldMapping::new(
                source_id,
                "last_contact".into(),
                TargetField::LastInteractionDate,
            ),
            FieldMapping::new(
                source_id,
                "contact_type".into(),
                TargetField::LastInteractionType,
            ),
            FieldMapping::new(source_id, "outlook".into(), TargetField::ValueOutlookDate),
        ]
    }

    fn row(pairs: &[(&str, Value)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_full_row_transforms_with_synthetic_interaction() {
        let transformer = RecordTransformer::default();
        let firm_id = Uuid::new_v4();
        let rows = vec![row(&[
            ("client_name", json!("  Meridian Holdings  ")),
            ("tier", json!("Private Book")),
            ("status", json!("Active client")),
            ("last_contact", json!("2026-07-15")),
            ("contact_type", json!("phone call")),
            ("outlook", json!("Expansion discussion in Q4")),
        ])];

        let outcome = transformer.apply_mapping(firm_id, &rows, &mappings(Uuid::new_v4()));
        assert_eq!(outcome.relationships.len(), 1);
        assert_eq!(outcome.skipped_rows, 0);

        let rel = &outcome.relationships[0];
        assert_eq!(rel.display_name, "Meridian Holdings");
        assert_eq!(rel.segment, "Private Book");
        assert_eq!(rel.status, LifecycleStatus::Strong);
        assert_eq!(rel.value_outlook, "Expansion discussion in Q4");
        assert_eq!(rel.continuity_grade, ContinuityGrade::B);
        assert_eq!(rel.continuity_score, 0);
        assert_eq!(rel.last_interaction_type, Some(InteractionType::Call));
        assert!(rel.last_interaction_at.is_some());

        assert_eq!(outcome.interactions.len(), 1);
        let imported = &outcome.interactions[0];
        assert_eq!(imported.relationship_id, rel.id);
        assert_eq!(imported.interaction_type, InteractionType::Call);
        assert_eq!(imported.direction, InteractionDirection::Outbound);
        assert_eq!(imported.value_weight, 1);
        assert_eq!(
            imported.notes.as_deref(),
            Some("Imported from ledger source")
        );
    }

    #[test]
    fn test_nameless_row_is_skipped_but_batch_survives() {
        let transformer = RecordTransformer::default();
        let firm_id = Uuid::new_v4();
        let rows = vec![
            row(&[("tier", json!("Gold"))]),
            row(&[("client_name", json!("Harbor Trust"))]),
            row(&[("client_name", json!("   "))]),
        ];

        let outcome = transformer.apply_mapping(firm_id, &rows, &mappings(Uuid::new_v4()));
        assert_eq!(outcome.relationships.len(), 1);
        assert_eq!(outcome.relationships[0].display_name, "Harbor Trust");
        assert_eq!(outcome.skipped_rows, 2);
    }

    #[test]
    fn test_defaults_applied_for_missing_fields() {
        let transformer = RecordTransformer::default();
        let rows = vec![row(&[("client_name", json!("Orchard Partners"))])];
        let outcome =
            transformer.apply_mapping(Uuid::new_v4(), &rows, &mappings(Uuid::new_v4()));

        let rel = &outcome.relationships[0];
        assert_eq!(rel.segment, "Unclassified");
        assert_eq!(rel.status, LifecycleStatus::Review);
        assert_eq!(rel.value_outlook, "Pending classification");
        assert!(rel.last_interaction_at.is_none());
        assert!(outcome.interactions.is_empty());
    }

    #[test]
    fn test_unparsable_date_discarded_silently() {
        let transformer = RecordTransformer::default();
        let rows = vec![row(&[
            ("client_name", json!("Kestrel & Co")),
            ("last_contact", json!("sometime last spring")),
        ])];
        let outcome =
            transformer.apply_mapping(Uuid::new_v4(), &rows, &mappings(Uuid::new_v4()));
        assert_eq!(outcome.relationships.len(), 1);
        assert!(outcome.relationships[0].last_interaction_at.is_none());
        assert!(outcome.interactions.is_empty());
    }

    #[test]
    fn test_status_rules_order_and_fallback() {
        assert_eq!(parse_status("Inactive"), LifecycleStatus::Inactive);
        assert_eq!(parse_status("dormant book"), LifecycleStatus::Inactive);
        assert_eq!(parse_status("Active"), LifecycleStatus::Strong);
        assert_eq!(parse_status("strong"), LifecycleStatus::Strong);
        assert_eq!(parse_status("in good standing"), LifecycleStatus::Stable);
        assert_eq!(parse_status("new lead"), LifecycleStatus::Pending);
        assert_eq!(parse_status("watchlist"), LifecycleStatus::Review);
        assert_eq!(parse_status("???"), LifecycleStatus::Review);
    }

    #[test]
    fn test_interaction_type_rules_and_fallback() {
        assert_eq!(parse_interaction_type("E-Mail"), InteractionType::Email);
        assert_eq!(parse_interaction_type("phone"), InteractionType::Call);
        assert_eq!(parse_interaction_type("on-site visit"), InteractionType::Meeting);
        assert_eq!(parse_interaction_type("memo"), InteractionType::Note);
        assert_eq!(parse_interaction_type("carrier pigeon"), InteractionType::Note);
    }

    #[test]
    fn test_permissive_date_formats() {
        assert!(parse_date("2026-07-15").is_some());
        assert!(parse_date("07/15/2026").is_some());
        assert!(parse_date("2026/07/15").is_some());
        assert!(parse_date("2026-07-15T10:30:00").is_some());
        assert!(parse_date("2026-07-15T10:30:00Z").is_some());
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn test_assessment_rating_steps() {
        let transformer = RecordTransformer::default();
        let firm_id = Uuid::new_v4();
        let make = |status: LifecycleStatus| {
            let mut rel = Relationship::new(firm_id, "X".into());
            rel.status = status;
            rel
        };

        // 8 of 10 strong/stable -> 80% -> rating 85 -> AA.
        let mut portfolio: Vec<Relationship> =
            (0..8).map(|_| make(LifecycleStatus::Strong)).collect();
        portfolio.push(make(LifecycleStatus::Review));
        portfolio.push(make(LifecycleStatus::Inactive));

        let assessment = transformer.generate_assessment(&portfolio);
        assert_eq!(assessment.total, 10);
        assert_eq!(assessment.strong_stable_pct, 80.0);
        assert_eq!(assessment.review_pct, 10.0);
        assert_eq!(assessment.inactive_pct, 10.0);
        assert_eq!(assessment.rating, 85);
        assert_eq!(assessment.rating_grade, ContinuityGrade::Aa);

        // 4 of 10 -> 40% -> rating 65 -> BBB.
        let mixed: Vec<Relationship> = (0..10)
            .map(|n| {
                make(if n < 4 {
                    LifecycleStatus::Stable
                } else {
                    LifecycleStatus::Review
                })
            })
            .collect();
        let assessment = transformer.generate_assessment(&mixed);
        assert_eq!(assessment.rating, 65);
        assert_eq!(assessment.rating_grade, ContinuityGrade::Bbb);
    }

    #[test]
    fn test_empty_portfolio_zero_state() {
        let transformer = RecordTransformer::default();
        let assessment = transformer.generate_assessment(&[]);
        assert_eq!(
            assessment,
            PortfolioAssessment {
                total: 0,
                strong_stable_pct: 0.0,
                review_pct: 0.0,
                inactive_pct: 0.0,
                rating: 50,
                rating_grade: ContinuityGrade::Bb,
            }
        );
    }
}
