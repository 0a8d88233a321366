//! Continuity Governance Engine
//!
//! Tracks a firm's client relationships, scores each relationship's health,
//! and routes proposed outreach through a multi-stage governance workflow
//! before it may execute:
//! - Mapping: ingest raw ledger feeds via column mapping and deterministic
//!   transformation into relationship/interaction records
//! - Scoring: continuity score, grade and audit rationale per relationship
//! - Governance: draft and batch lifecycle (Prepare -> Batch -> Approve ->
//!   Execute -> Archive) with role preconditions and an append-only event log
//!
//! Persistence, HTTP routing and authentication transport belong to the
//! embedding application; this crate exposes plain data contracts only.

pub mod config;
pub mod error;
pub mod governance;
pub mod mapping;
pub mod models;
pub mod scoring;

pub use config::{EngineSettings, ScoringSettings, TransformSettings};
pub use error::{EngineError, EngineResult};
