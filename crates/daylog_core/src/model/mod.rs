//! Domain model for daily-log and habit records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep DB column mapping out of the model (repository concern).
//!
//! # Invariants
//! - Every task item is identified by a stable `ItemId`.
//! - Lineage membership is expressed by `origin_id`/`parent_id` references,
//!   never by in-memory tree links.

pub mod habit;
pub mod item;
