//! Continuity Scorer
//!
//! Additive component scoring: recency (0-40) + frequency (0-30) + value
//! (0-20) + stability baseline, clamped to 0-100 and mapped to a grade.
//!
//! The value component deliberately sums ALL historical weights with no time
//! window, unlike recency/frequency. Preserved as shipped; pending product
//! clarification (see ScoringSettings).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::config::ScoringSettings;
use crate::models::{ContinuityGrade, Interaction, Relationship};

/// Per-component breakdown of a continuity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    /// 0-40 by age of the most recent interaction
    pub recency: u8,
    /// 0-30 by trailing-year interaction count
    pub frequency: u8,
    /// 0-20, summed value weights capped
    pub value: u8,
    /// Fixed baseline until volatility snapshots are integrated
    pub stability: u8,
}

/// Result of scoring one relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuityAssessment {
    pub relationship_id: Uuid,
    pub score: u8,
    pub grade: ContinuityGrade,
    pub components: ScoreComponents,
    pub rationale: String,
}

/// Stateless continuity scoring engine
pub struct ContinuityScorer {
    settings: ScoringSettings,
}

impl ContinuityScorer {
    pub fn new(settings: ScoringSettings) -> Self {
        Self { settings }
    }

    /// Score one relationship as of now.
    pub fn score(
        &self,
        relationship: &Relationship,
        interactions: &[Interaction],
    ) -> ContinuityAssessment {
        self.score_at(relationship, interactions, Utc::now())
    }

    /// Score one relationship as of an explicit instant. Deterministic: no
    /// hidden clock reads, no randomness, no external calls.
    pub fn score_at(
        &self,
        relationship: &Relationship,
        interactions: &[Interaction],
        as_of: DateTime<Utc>,
    ) -> ContinuityAssessment {
        let mut sorted: Vec<&Interaction> = interactions.iter().collect();
        sorted.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        let last = sorted.first().copied();

        let recency = Self::recency_points(last.map(|i| age_in_days(i.occurred_at, as_of)));
        let recent_count = self.trailing_window_count(interactions, as_of);
        let frequency = Self::frequency_points(recent_count);
        let value = self.value_points(interactions);
        let stability = self.settings.stability_baseline;

        let total = recency as u32 + frequency as u32 + value as u32 + stability as u32;
        let score = total.min(100) as u8;
        let grade = ContinuityGrade::from_score(score);

        debug!(
            relationship_id = %relationship.id,
            score,
            grade = grade.as_str(),
            recency,
            frequency,
            value,
            "continuity score computed"
        );

        let rationale = self.build_rationale(score, grade, last, recent_count, value, as_of);

        ContinuityAssessment {
            relationship_id: relationship.id,
            score,
            grade,
            components: ScoreComponents {
                recency,
                frequency,
                value,
                stability,
            },
            rationale,
        }
    }

    /// Score a set of relationships independently. Each outcome depends only
    /// on its own history; callers may fan this out across workers and merge
    /// the maps without coordination.
    pub fn calculate_batch(
        &self,
        relationships: &[Relationship],
        interactions_by_relationship: &HashMap<Uuid, Vec<Interaction>>,
        as_of: DateTime<Utc>,
    ) -> HashMap<Uuid, ContinuityAssessment> {
        relationships
            .iter()
            .map(|rel| {
                let history = interactions_by_relationship
                    .get(&rel.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                (rel.id, self.score_at(rel, history, as_of))
            })
            .collect()
    }

    /// Recency component: 0-40 banded by age of the latest interaction.
    fn recency_points(age_days: Option<i64>) -> u8 {
        match age_days {
            None => 5,
            Some(d) if d <= 30 => 40,
            Some(d) if d <= 90 => 30,
            Some(d) if d <= 180 => 20,
            Some(d) if d <= 365 => 10,
            Some(_) => 5,
        }
    }

    /// Frequency component: 0-30 banded by trailing-year interaction count.
    fn frequency_points(recent_count: usize) -> u8 {
        match recent_count {
            n if n >= 12 => 30,
            n if n >= 6 => 24,
            n if n >= 3 => 18,
            n if n >= 1 => 10,
            _ => 0,
        }
    }

    /// Value component: all historical weights summed, capped. No time window.
    fn value_points(&self, interactions: &[Interaction]) -> u8 {
        let total: u32 = interactions.iter().map(|i| i.value_weight).sum();
        total.min(self.settings.value_weight_cap) as u8
    }

    fn trailing_window_count(&self, interactions: &[Interaction], as_of: DateTime<Utc>) -> usize {
        let cutoff = as_of - Duration::days(self.settings.frequency_window_days);
        interactions
            .iter()
            .filter(|i| i.occurred_at > cutoff && i.occurred_at <= as_of)
            .count()
    }

    fn build_rationale(
        &self,
        score: u8,
        grade: ContinuityGrade,
        last: Option<&Interaction>,
        recent_count: usize,
        value: u8,
        as_of: DateTime<Utc>,
    ) -> String {
        let mut parts = Vec::with_capacity(5);
        parts.push(format!("Score {}/100 ({}).", score, grade.as_str()));

        match last {
            Some(i) => {
                let age = age_in_days(i.occurred_at, as_of);
                if age == 0 {
                    parts.push(format!(
                        "Most recent interaction was a {} today.",
                        i.interaction_type.as_str()
                    ));
                } else {
                    parts.push(format!(
                        "Most recent interaction was a {} {} ago.",
                        i.interaction_type.as_str(),
                        humanize_age(age)
                    ));
                }
            }
            None => parts.push("No recorded interactions on file.".to_string()),
        }

        parts.push(format!(
            "{} interactions recorded in the last 12 months.",
            recent_count
        ));
        parts.push(format!(
            "Cumulative value signal of {}/{} from recorded value events.",
            value, self.settings.value_weight_cap
        ));

        parts.push(
            match grade {
                ContinuityGrade::Aaa | ContinuityGrade::Aa => {
                    "Relationship continuity is well established; maintain the current cadence."
                }
                ContinuityGrade::A => {
                    "Continuity is healthy with room to deepen engagement."
                }
                ContinuityGrade::Bbb => {
                    "Continuity is adequate but will erode without a scheduled touchpoint."
                }
                ContinuityGrade::Bb => {
                    "Continuity is at risk; prioritize outreach soon."
                }
                ContinuityGrade::B => {
                    "Continuity is weak; immediate re-engagement is recommended."
                }
            }
            .to_string(),
        );

        parts.join(" ")
    }
}

impl Default for ContinuityScorer {
    fn default() -> Self {
        Self::new(ScoringSettings::default())
    }
}

/// Whole days elapsed between an interaction and the scoring instant.
pub(crate) fn age_in_days(occurred_at: DateTime<Utc>, as_of: DateTime<Utc>) -> i64 {
    (as_of - occurred_at).num_days().max(0)
}

/// Humanized age: "N days" under a month, "N months" within a year (days/30
/// rounded), "N+ months" beyond.
pub(crate) fn humanize_age(age_days: i64) -> String {
    if age_days == 0 {
        "today".to_string()
    } else if age_days < 30 {
        format!("{} days", age_days)
    } else if age_days <= 365 {
        format!("{} months", ((age_days as f64) / 30.0).round() as i64)
    } else {
        format!("{}+ months", age_days / 30)
    }
}
