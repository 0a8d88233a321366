//! Rationale Builder
//!
//! Renders the five narrative sections shown alongside a continuity grade.
//! Pure templates over derived signals: trailing-year volume, high-value event
//! count, days since last contact vs the 90/180 thresholds, and a six-month
//! over six-month volume comparison for decline detection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringSettings;
use crate::models::{ContinuityGrade, Interaction, Relationship};
use crate::scoring::scorer::{age_in_days, humanize_age};

/// Weight at or above which an interaction counts as a high-value event
const HIGH_VALUE_WEIGHT: u32 = 3;

/// The five narrative sections of a relationship rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RationaleSections {
    pub recent_activity: String,
    pub value_drivers: String,
    pub risk_considerations: String,
    pub recommended_next_step: String,
    pub governance_note: String,
}

/// Derived signals the section templates branch on
struct ActivitySignals {
    trailing_year_count: usize,
    high_value_count: usize,
    days_since_last: Option<i64>,
    /// Trailing-six-month count fell below half of the prior six months
    declining: bool,
}

/// Deterministic narrative renderer for continuity assessments
pub struct RationaleBuilder {
    settings: ScoringSettings,
}

impl RationaleBuilder {
    pub fn new(settings: ScoringSettings) -> Self {
        Self { settings }
    }

    /// Render all five sections as of now.
    pub fn build(
        &self,
        relationship: &Relationship,
        interactions: &[Interaction],
        score: u8,
        grade: ContinuityGrade,
    ) -> RationaleSections {
        self.build_at(relationship, interactions, score, grade, Utc::now())
    }

    /// Render all five sections as of an explicit instant. Side-effect free;
    /// identical inputs reproduce identical text.
    pub fn build_at(
        &self,
        relationship: &Relationship,
        interactions: &[Interaction],
        score: u8,
        grade: ContinuityGrade,
        as_of: DateTime<Utc>,
    ) -> RationaleSections {
        let signals = self.derive_signals(interactions, as_of);

        RationaleSections {
            recent_activity: self.recent_activity(relationship, interactions, &signals, as_of),
            value_drivers: Self::value_drivers(&signals, grade),
            risk_considerations: Self::risk_considerations(&signals, grade),
            recommended_next_step: Self::recommended_next_step(&signals, grade),
            governance_note: Self::governance_note(score, grade),
        }
    }

    fn derive_signals(&self, interactions: &[Interaction], as_of: DateTime<Utc>) -> ActivitySignals {
        let year_cutoff = as_of - Duration::days(self.settings.frequency_window_days);
        let half_cutoff = as_of - Duration::days(self.settings.trend_window_days);
        let prior_cutoff = as_of - Duration::days(self.settings.trend_window_days * 2);

        let trailing_year_count = interactions
            .iter()
            .filter(|i| i.occurred_at > year_cutoff && i.occurred_at <= as_of)
            .count();
        let high_value_count = interactions
            .iter()
            .filter(|i| i.value_weight >= HIGH_VALUE_WEIGHT)
            .count();
        let current_half = interactions
            .iter()
            .filter(|i| i.occurred_at > half_cutoff && i.occurred_at <= as_of)
            .count();
        let prior_half = interactions
            .iter()
            .filter(|i| i.occurred_at > prior_cutoff && i.occurred_at <= half_cutoff)
            .count();

        let days_since_last = interactions
            .iter()
            .map(|i| i.occurred_at)
            .max()
            .map(|latest| age_in_days(latest, as_of));

        ActivitySignals {
            trailing_year_count,
            high_value_count,
            days_since_last,
            declining: prior_half > 0 && current_half * 2 < prior_half,
        }
    }

    fn recent_activity(
        &self,
        relationship: &Relationship,
        interactions: &[Interaction],
        signals: &ActivitySignals,
        as_of: DateTime<Utc>,
    ) -> String {
        let latest = interactions.iter().max_by_key(|i| i.occurred_at);
        match latest {
            None => format!(
                "No recorded interactions on file for {}.",
                relationship.display_name
            ),
            Some(i) => {
                let age = age_in_days(i.occurred_at, as_of);
                let when = if age == 0 {
                    "today".to_string()
                } else {
                    format!("{} ago", humanize_age(age))
                };
                format!(
                    "{} interactions in the trailing twelve months; most recent was a {} {}.",
                    signals.trailing_year_count,
                    i.interaction_type.as_str(),
                    when
                )
            }
        }
    }

    fn value_drivers(signals: &ActivitySignals, grade: ContinuityGrade) -> String {
        if signals.high_value_count > 0 {
            let anchor = match grade {
                ContinuityGrade::Aaa | ContinuityGrade::Aa => {
                    "these anchor a well-established relationship"
                }
                ContinuityGrade::A | ContinuityGrade::Bbb => {
                    "these support the current standing"
                }
                _ => "these are the remaining basis of the relationship's value",
            };
            format!(
                "{} high-value events (weight {}+) on record; {}.",
                signals.high_value_count, HIGH_VALUE_WEIGHT, anchor
            )
        } else {
            "No high-value events recorded; the value signal rests entirely on routine contact."
                .to_string()
        }
    }

    fn risk_considerations(signals: &ActivitySignals, grade: ContinuityGrade) -> String {
        let mut notes: Vec<String> = Vec::new();

        match signals.days_since_last {
            None => notes.push("No contact history exists; continuity cannot be assessed from activity.".to_string()),
            Some(d) if d > 180 => notes.push(
                "Contact has lapsed beyond six months, the largest single continuity risk.".to_string(),
            ),
            Some(d) if d > 90 => notes.push(
                "More than ninety days since last contact; the recency component is degrading.".to_string(),
            ),
            Some(_) => {}
        }

        if signals.declining {
            notes.push(
                "Interaction volume fell to less than half of the prior six-month period."
                    .to_string(),
            );
        }

        if notes.is_empty() {
            match grade {
                ContinuityGrade::Aaa | ContinuityGrade::Aa => {
                    "No acute risk indicators; contact cadence is inside all thresholds.".to_string()
                }
                _ => "No lapse or decline detected, but the overall score leaves little buffer."
                    .to_string(),
            }
        } else {
            notes.join(" ")
        }
    }

    fn recommended_next_step(signals: &ActivitySignals, grade: ContinuityGrade) -> String {
        match grade {
            ContinuityGrade::Aaa | ContinuityGrade::Aa => {
                if signals.declining {
                    "Maintain cadence but investigate the recent drop in interaction volume."
                        .to_string()
                } else {
                    "Maintain the current cadence; no corrective action required.".to_string()
                }
            }
            ContinuityGrade::A => {
                "Schedule a routine check-in within the next quarter.".to_string()
            }
            ContinuityGrade::Bbb => {
                "Book a touchpoint within thirty days to protect the grade.".to_string()
            }
            ContinuityGrade::Bb => "Prioritize direct outreach this week.".to_string(),
            ContinuityGrade::B => match signals.days_since_last {
                None => "Establish first contact and record the interaction.".to_string(),
                Some(_) => "Escalate for immediate re-engagement outreach.".to_string(),
            },
        }
    }

    fn governance_note(score: u8, grade: ContinuityGrade) -> String {
        let priority = match grade {
            ContinuityGrade::Bb | ContinuityGrade::B => {
                " Flagged for review priority in the next governance batch."
            }
            _ => "",
        };
        format!(
            "Outreach for this relationship is subject to batch governance; score {}/100 ({}) recorded for the audit trail.{}",
            score,
            grade.as_str(),
            priority
        )
    }
}

impl Default for RationaleBuilder {
    fn default() -> Self {
        Self::new(ScoringSettings::default())
    }
}
