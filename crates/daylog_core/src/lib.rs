//! Core domain logic for the daylog daily-log and habit tracker.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::habit::{
    HabitDefinition, HabitGroup, HabitPatch, HabitWithStatus, DEFAULT_HABIT_COLOR,
};
pub use model::item::{
    relation_label, DesiredItem, ItemId, LineageNode, RelationType, TaskItem,
};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::lineage_repo::{LineageRepository, SqliteLineageRepository, MILESTONE_SORT_ORDER};
pub use repo::log_repo::{
    DayEntry, HistoryEntry, LogRepository, MonthRow, RepoError, RepoResult, SqliteLogRepository,
};
pub use service::habit_service::{HabitService, HabitServiceError};
pub use service::lineage_service::{LineageService, LineageServiceError};
pub use service::log_service::{LogService, LogServiceError, TitleHistory};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
