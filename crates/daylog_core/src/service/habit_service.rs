//! Habit use-case service.
//!
//! # Responsibility
//! - Provide habit create/list/toggle/update/delete APIs with input
//!   normalization.
//! - Keep group management alongside habit operations.
//!
//! # Invariants
//! - New habits get the default color when none is supplied.
//! - Check-ins are idempotent upserts per `(date, habit_id)`.

use crate::model::habit::{
    HabitGroup, HabitPatch, HabitWithStatus, DEFAULT_HABIT_COLOR,
};
use crate::repo::habit_repo::HabitRepository;
use crate::repo::log_repo::RepoError;
use crate::service::log_service::{validate_date, LogServiceError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum HabitServiceError {
    /// Habit or group title is empty after trimming.
    EmptyTitle,
    /// Date is not shaped like `YYYY-MM-DD`.
    InvalidDate(String),
    /// Referenced habit does not exist.
    HabitNotFound(i64),
    /// Referenced habit group does not exist.
    GroupNotFound(i64),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "habit title cannot be empty"),
            Self::InvalidDate(value) => write!(f, "invalid date: `{value}`"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "habit group not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::HabitNotFound(id) => Self::HabitNotFound(id),
            RepoError::GroupNotFound(id) => Self::GroupNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<LogServiceError> for HabitServiceError {
    fn from(value: LogServiceError) -> Self {
        match value {
            LogServiceError::InvalidDate(date) => Self::InvalidDate(date),
            LogServiceError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Habit service facade over a habit repository.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one habit; empty `color` falls back to the default swatch.
    pub fn create_habit(
        &self,
        title: &str,
        color: Option<&str>,
        group_id: Option<i64>,
    ) -> Result<i64, HabitServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HabitServiceError::EmptyTitle);
        }

        let color = color
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_HABIT_COLOR);
        let id = self
            .repo
            .create_habit(title, color, group_id.unwrap_or(0))?;
        info!("event=create_habit module=habit status=ok habit_id={id}");
        Ok(id)
    }

    /// Active habits with their check-in status for `date`.
    pub fn habits_for_date(&self, date: &str) -> Result<Vec<HabitWithStatus>, HabitServiceError> {
        validate_date(date)?;
        Ok(self.repo.habits_for_date(date)?)
    }

    /// Upserts the check-in status for `(date, habit_id)`.
    pub fn toggle_habit(
        &self,
        date: &str,
        habit_id: i64,
        status: i64,
    ) -> Result<(), HabitServiceError> {
        validate_date(date)?;
        self.repo.toggle_habit(date, habit_id, status)?;
        Ok(())
    }

    /// Marks every active habit done for `date`; returns how many were
    /// touched.
    pub fn mark_all_done(&mut self, date: &str) -> Result<usize, HabitServiceError> {
        validate_date(date)?;
        let touched = self.repo.mark_all_done(date)?;
        info!("event=mark_all_done module=habit status=ok date={date} habits={touched}");
        Ok(touched)
    }

    /// Applies a partial update; provided fields only.
    pub fn update_habit(&self, habit_id: i64, patch: HabitPatch) -> Result<(), HabitServiceError> {
        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(HabitServiceError::EmptyTitle);
            }
        }
        self.repo.update_habit(habit_id, &patch)?;
        Ok(())
    }

    /// Deletes one habit and its check-in history.
    pub fn delete_habit(&mut self, habit_id: i64) -> Result<(), HabitServiceError> {
        self.repo.delete_habit(habit_id)?;
        info!("event=delete_habit module=habit status=ok habit_id={habit_id}");
        Ok(())
    }

    /// Creates one ordering group.
    pub fn create_group(&self, name: &str) -> Result<i64, HabitServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HabitServiceError::EmptyTitle);
        }
        Ok(self.repo.create_group(name)?)
    }

    /// All groups in display order.
    pub fn list_groups(&self) -> Result<Vec<HabitGroup>, HabitServiceError> {
        Ok(self.repo.list_groups()?)
    }

    /// Renames and/or reorders one group.
    pub fn update_group(
        &self,
        group_id: i64,
        name: Option<&str>,
        sort_order: Option<i64>,
    ) -> Result<(), HabitServiceError> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(HabitServiceError::EmptyTitle);
            }
        }
        self.repo.update_group(group_id, name, sort_order)?;
        Ok(())
    }
}
