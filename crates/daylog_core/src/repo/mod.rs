//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define storage-facing traits for log, lineage and habit operations.
//! - Keep SQL details inside this boundary.
//!
//! # Invariants
//! - Multi-statement mutations run inside one immediate transaction.
//! - Read models are validated on the way out; invalid persisted state is
//!   reported, never masked.

pub mod habit_repo;
pub mod lineage_repo;
pub mod log_repo;
