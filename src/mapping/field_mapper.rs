//! Field Mapper
//!
//! Turns raw column names into suggested target fields with confidence
//! scores. The rules are an ordered data table evaluated first-match-wins;
//! compound fragments ("contacttype", "lastcontact", "nextcontact") are
//! listed ahead of the bare fragments ("name", "contact") they contain, so a
//! column like "contact_type" resolves to the specific rule rather than being
//! captured by the "contact" fragment.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::mapping::models::{MappingSuggestion, TargetField};

struct MappingRule {
    fragments: &'static [&'static str],
    target: TargetField,
    confidence: f32,
}

static MAPPING_RULES: Lazy<Vec<MappingRule>> = Lazy::new(|| {
    vec![
        MappingRule {
            fragments: &["contacttype", "interactiontype"],
            target: TargetField::LastInteractionType,
            confidence: 0.8,
        },
        MappingRule {
            fragments: &["lastcontact", "lastinteraction", "lasttouch"],
            target: TargetField::LastInteractionDate,
            confidence: 0.85,
        },
        MappingRule {
            fragments: &["nextcontact", "followup", "outlook"],
            target: TargetField::ValueOutlookDate,
            confidence: 0.7,
        },
        MappingRule {
            fragments: &["name", "contact", "fullname"],
            target: TargetField::RelationshipName,
            confidence: 0.9,
        },
        MappingRule {
            fragments: &["segment", "tier", "class", "book"],
            target: TargetField::BookClass,
            confidence: 0.85,
        },
        MappingRule {
            fragments: &["status", "state"],
            target: TargetField::Status,
            confidence: 0.8,
        },
    ]
});

/// Lowercase a column name and strip underscore, space and hyphen.
pub fn normalize_column(column: &str) -> String {
    column
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .collect()
}

/// Suggest a target field for each raw column, sorted by confidence
/// descending. Unmatched columns carry no target and confidence 0.
pub fn preview_mapping(raw_columns: &[String]) -> Vec<MappingSuggestion> {
    let mut suggestions: Vec<MappingSuggestion> = raw_columns
        .iter()
        .map(|column| {
            let normalized = normalize_column(column);
            let matched = MAPPING_RULES.iter().find(|rule| {
                rule.fragments
                    .iter()
                    .any(|fragment| normalized.contains(fragment))
            });
            let suggestion = match matched {
                Some(rule) => MappingSuggestion {
                    source_column: column.clone(),
                    target_field: Some(rule.target),
                    confidence: rule.confidence,
                },
                None => MappingSuggestion {
                    source_column: column.clone(),
                    target_field: None,
                    confidence: 0.0,
                },
            };
            debug!(
                column = %column,
                target = ?suggestion.target_field,
                confidence = suggestion.confidence,
                "mapping suggestion"
            );
            suggestion
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    suggestions
}

/// Stateless mapping preview engine. Thin wrapper over [`preview_mapping`]
/// for callers that prefer an injectable collaborator.
pub struct FieldMapper;

impl FieldMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn preview(&self, raw_columns: &[String]) -> Vec<MappingSuggestion> {
        preview_mapping(raw_columns)
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn suggestion_for<'a>(
        suggestions: &'a [MappingSuggestion],
        column: &str,
    ) -> &'a MappingSuggestion {
        suggestions
            .iter()
            .find(|s| s.source_column == column)
            .expect("column present in suggestions")
    }

    #[test]
    fn test_normalization_strips_separators() {
        assert_eq!(normalize_column("Full_Name"), "fullname");
        assert_eq!(normalize_column("Last Contact-Date"), "lastcontactdate");
        assert_eq!(normalize_column("STATUS"), "status");
    }

    #[test]
    fn test_full_name_maps_to_relationship_name() {
        let suggestions = preview_mapping(&columns(&["Full_Name"]));
        assert_eq!(
            suggestions[0].target_field,
            Some(TargetField::RelationshipName)
        );
        assert_eq!(suggestions[0].confidence, 0.9);
    }

    #[test]
    fn test_unrecognized_column_gets_no_target() {
        let suggestions = preview_mapping(&columns(&["xyz123"]));
        assert_eq!(suggestions[0].target_field, None);
        assert_eq!(suggestions[0].confidence, 0.0);
    }

    #[test]
    fn test_compound_fragments_win_over_bare_contact() {
        let suggestions = preview_mapping(&columns(&[
            "contact_type",
            "last_contact",
            "next_contact",
            "contact",
        ]));
        assert_eq!(
            suggestion_for(&suggestions, "contact_type").target_field,
            Some(TargetField::LastInteractionType)
        );
        assert_eq!(
            suggestion_for(&suggestions, "last_contact").target_field,
            Some(TargetField::LastInteractionDate)
        );
        assert_eq!(
            suggestion_for(&suggestions, "next_contact").target_field,
            Some(TargetField::ValueOutlookDate)
        );
        assert_eq!(
            suggestion_for(&suggestions, "contact").target_field,
            Some(TargetField::RelationshipName)
        );
    }

    #[test]
    fn test_remaining_rule_targets() {
        let suggestions = preview_mapping(&columns(&[
            "client_tier",
            "account_status",
            "interaction_type",
            "last_touch",
            "follow_up",
        ]));
        assert_eq!(
            suggestion_for(&suggestions, "client_tier").target_field,
            Some(TargetField::BookClass)
        );
        assert_eq!(
            suggestion_for(&suggestions, "account_status").target_field,
            Some(TargetField::Status)
        );
        assert_eq!(
            suggestion_for(&suggestions, "interaction_type").target_field,
            Some(TargetField::LastInteractionType)
        );
        assert_eq!(
            suggestion_for(&suggestions, "last_touch").target_field,
            Some(TargetField::LastInteractionDate)
        );
        assert_eq!(
            suggestion_for(&suggestions, "follow_up").target_field,
            Some(TargetField::ValueOutlookDate)
        );
    }

    #[test]
    fn test_output_sorted_by_confidence_descending() {
        let suggestions = preview_mapping(&columns(&["xyz", "status", "full_name", "tier"]));
        let confidences: Vec<f32> = suggestions.iter().map(|s| s.confidence).collect();
        let mut sorted = confidences.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(confidences, sorted);
        assert_eq!(suggestions[0].source_column, "full_name");
        assert_eq!(suggestions.last().unwrap().source_column, "xyz");
    }
}
