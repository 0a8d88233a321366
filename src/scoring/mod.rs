//! Continuity scoring
//!
//! Converts raw interaction history into a 0-100 stability score, a letter
//! grade and a human-readable audit rationale. Everything in this module is a
//! pure function of its inputs (the clock is an explicit argument), so
//! identical inputs always reproduce identical output.

mod rationale;
mod scorer;

pub use rationale::{RationaleBuilder, RationaleSections};
pub use scorer::{ContinuityAssessment, ContinuityScorer, ScoreComponents};
