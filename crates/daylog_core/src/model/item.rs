//! Task item domain model.
//!
//! # Responsibility
//! - Define the canonical task item record and lineage projections.
//! - Keep one identity (`item_id`) across edits, reorders and re-saves.
//!
//! # Invariants
//! - `item_id` is globally unique across all days, not per-day.
//! - `sort_order` is dense 0..n-1 within one day and is the sole source of
//!   display order.
//! - An item with no `relation_type` is a lineage root.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every task item.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = Uuid;

/// Lineage relation of one item to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Continuation of the same task on a later day.
    Inherit,
    /// Transformed/derived milestone task.
    Evolve,
}

/// One stored task item, as read back from persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Stable global ID used for upsert keying and lineage lookups.
    pub item_id: ItemId,
    pub title: String,
    pub content: String,
    /// Comma/space-delimited free text.
    pub tags: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
    /// Zero-based position within the owning day.
    pub sort_order: i64,
    /// Lineage root this item descends from. `None` means the item is
    /// itself a root.
    pub origin_id: Option<ItemId>,
    /// Immediate predecessor in the lineage graph.
    pub parent_id: Option<ItemId>,
    /// `None` is displayed as `root` by the lineage projection.
    pub relation_type: Option<RelationType>,
}

/// One incoming task item in a full-day save request.
///
/// Items without `item_id` are new; the reconciler assigns a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredItem {
    pub item_id: Option<ItemId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
    #[serde(default)]
    pub origin_id: Option<ItemId>,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub relation_type: Option<RelationType>,
}

impl DesiredItem {
    /// Creates a minimal new (id-less) item with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            item_id: None,
            title: title.into(),
            content: String::new(),
            tags: String::new(),
            is_done: false,
            origin_id: None,
            parent_id: None,
            relation_type: None,
        }
    }

    /// Returns a copy carrying the given stable id.
    pub fn with_id(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }
}

/// One node of a lineage projection, joined to its owning day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    pub item_id: ItemId,
    pub title: String,
    /// Calendar date of the owning day, `YYYY-MM-DD`.
    pub date: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
    pub tags: String,
    pub parent_id: Option<ItemId>,
    /// Normalized relation label: `inherit`, `evolve`, or `root` when the
    /// stored value is unset.
    pub relation_type: String,
}

impl RelationType {
    /// Stable DB/text token for this relation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Evolve => "evolve",
        }
    }

    /// Parses the stable token, rejecting unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inherit" => Some(Self::Inherit),
            "evolve" => Some(Self::Evolve),
            _ => None,
        }
    }
}

/// Display label for an optional relation: unset means lineage root.
pub fn relation_label(relation: Option<RelationType>) -> &'static str {
    relation.map_or("root", RelationType::as_str)
}
