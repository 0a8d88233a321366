//! Ledger mapping engine
//!
//! Ingests heterogeneous raw tabular records from external feeds: suggests a
//! column-to-field mapping, transforms approved rows into normalized
//! relationship/interaction records, and tracks each feed's onboarding state.

mod catalog;
mod field_mapper;
mod models;
mod transformer;

pub use catalog::LedgerCatalog;
pub use field_mapper::{normalize_column, preview_mapping, FieldMapper};
pub use models::{
    FieldMapping, LedgerSource, MappingSuggestion, RawRecord, SourceStatus, TargetField,
};
pub use transformer::{PortfolioAssessment, RecordTransformer, TransformOutcome};
