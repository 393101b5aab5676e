//! Habit domain model.
//!
//! # Responsibility
//! - Define habit definitions, per-day check-ins and ordering groups.
//!
//! # Invariants
//! - One check-in row per `(log_date, habit_id)` pair, upserted in place.
//! - Archived habits stay in storage but drop out of daily listings.

use serde::{Deserialize, Serialize};

/// Default swatch assigned to new habits.
pub const DEFAULT_HABIT_COLOR: &str = "#3B82F6";

/// One recurring habit definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDefinition {
    pub id: i64,
    pub title: String,
    /// Hex color used by the presentation layer.
    pub color: String,
    /// Owning group id; 0 means ungrouped.
    pub group_id: i64,
    pub is_archived: bool,
    pub sort_order: i64,
}

/// One habit joined with its check-in status for a given date.
///
/// `status` is `None` when no check-in row exists for that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitWithStatus {
    pub id: i64,
    pub title: String,
    pub color: String,
    pub group_id: i64,
    pub status: Option<i64>,
}

/// Partial update for one habit definition; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPatch {
    pub title: Option<String>,
    pub color: Option<String>,
    pub group_id: Option<i64>,
    pub is_archived: Option<bool>,
}

impl HabitPatch {
    /// Returns whether this patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.color.is_none()
            && self.group_id.is_none()
            && self.is_archived.is_none()
    }
}

/// Named ordering bucket for habit definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitGroup {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
}
