//! Core domain models
//!
//! Relationship and interaction records plus the actor identity supplied by
//! callers for role-checked operations.

mod interaction;
mod relationship;

pub use interaction::{Interaction, InteractionDirection, InteractionType};
pub use relationship::{
    Actor, ActorRole, ContinuityGrade, LifecycleStatus, Relationship,
};
