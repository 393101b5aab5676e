//! Lineage use-case service.
//!
//! # Responsibility
//! - Expose the project evolution tree as an ordered node list.
//! - Re-parent nodes and create milestone items.
//!
//! # Invariants
//! - Lineage reads are side-effect free.
//! - Re-parenting never touches item content; only `parent_id` and
//!   `relation_type` change.
//! - Assigning a node's parent to one of its own descendants is not
//!   prevented; the flat lineage query stays correct, but a future
//!   recursive traversal would need a visited-set guard.

use crate::model::item::{ItemId, LineageNode, RelationType};
use crate::repo::lineage_repo::LineageRepository;
use crate::repo::log_repo::RepoError;
use crate::service::log_service::{validate_date, LogServiceError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for lineage use-cases.
#[derive(Debug)]
pub enum LineageServiceError {
    /// Referenced item does not exist.
    ItemNotFound(ItemId),
    /// Milestone date is not shaped like `YYYY-MM-DD`.
    InvalidDate(String),
    /// Milestone title is empty after trimming.
    EmptyTitle,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LineageServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "task item not found: {id}"),
            Self::InvalidDate(value) => write!(f, "invalid date: `{value}`"),
            Self::EmptyTitle => write!(f, "milestone title cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LineageServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LineageServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<LogServiceError> for LineageServiceError {
    fn from(value: LogServiceError) -> Self {
        match value {
            LogServiceError::InvalidDate(date) => Self::InvalidDate(date),
            LogServiceError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Lineage service facade over a lineage repository.
pub struct LineageService<R: LineageRepository> {
    repo: R,
}

impl<R: LineageRepository> LineageService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The whole family of `origin_id`: the root itself plus every
    /// descendant, ordered date ASC then position. An unknown id yields an
    /// empty list, not an error.
    pub fn get_lineage(&self, origin_id: ItemId) -> Result<Vec<LineageNode>, LineageServiceError> {
        Ok(self.repo.lineage(origin_id)?)
    }

    /// Re-parents one node after a presentation-layer rearrange.
    pub fn update_relation(
        &mut self,
        item_id: ItemId,
        target_parent_id: Option<ItemId>,
        relation_type: RelationType,
    ) -> Result<(), LineageServiceError> {
        self.repo
            .update_relation(item_id, target_parent_id, relation_type)?;
        info!(
            "event=update_relation module=lineage status=ok item_id={} relation={}",
            item_id,
            relation_type.as_str()
        );
        Ok(())
    }

    /// Creates an `evolve` milestone under `origin_id` on `date` and
    /// returns its fresh id.
    pub fn add_milestone(
        &mut self,
        origin_id: ItemId,
        title: &str,
        date: &str,
    ) -> Result<ItemId, LineageServiceError> {
        validate_date(date)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(LineageServiceError::EmptyTitle);
        }

        let item_id = self.repo.add_milestone(origin_id, title, date)?;
        info!(
            "event=add_milestone module=lineage status=ok origin_id={} item_id={} date={}",
            origin_id, item_id, date
        );
        Ok(item_id)
    }

    /// Physically deletes one item, typically a dissolved milestone.
    pub fn delete_item(&mut self, item_id: ItemId) -> Result<(), LineageServiceError> {
        self.repo.delete_item(item_id)?;
        info!(
            "event=delete_item module=lineage status=ok item_id={}",
            item_id
        );
        Ok(())
    }
}
