//! Engine configuration module
//!
//! The numeric and textual constants of scoring and ledger transformation as
//! plain settings structs. The embedding application decides where values come
//! from (env, file, defaults); the engine only consumes the structs.

use serde::Deserialize;

/// Continuity scoring settings
///
/// NOTE: `value` sums all historical interaction weights with no time window,
/// unlike the recency/frequency components. That asymmetry is preserved from
/// the shipped behavior and is pending product clarification; do not window it
/// here without a decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    /// Cap applied to the summed value-event weights (value component ceiling)
    pub value_weight_cap: u32,
    /// Fixed stability component. Placeholder until historical-volatility
    /// snapshots are integrated; intentionally constant.
    pub stability_baseline: u8,
    /// Trailing window for the frequency component, in days
    pub frequency_window_days: i64,
    /// Window used for the decline-trend comparison, in days
    pub trend_window_days: i64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            value_weight_cap: 20,
            stability_baseline: 5,
            frequency_window_days: 365,
            trend_window_days: 180,
        }
    }
}

/// Ledger transformation settings
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSettings {
    /// Segment label applied when the source row carries none
    pub default_segment: String,
    /// Value-outlook text applied when the source row carries none
    pub default_outlook: String,
    /// Note attached to interactions synthesized during import
    pub import_note: String,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            default_segment: "Unclassified".to_string(),
            default_outlook: "Pending classification".to_string(),
            import_note: "Imported from ledger source".to_string(),
        }
    }
}

/// Complete engine settings
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub scoring: ScoringSettings,
    pub transform: TransformSettings,
}
