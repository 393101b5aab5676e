//! Daily-log use-case service.
//!
//! # Responsibility
//! - Validate incoming dates defensively before touching storage.
//! - Run the full-day reconciliation and trigger the monthly export exactly
//!   once per successful save.
//! - Provide read accessors for one day, all days and title history.
//!
//! # Invariants
//! - A failed reconciliation never triggers an export.
//! - Export failure is logged and swallowed; saved data is already durable
//!   and the summary file is a convenience artifact.

use crate::export;
use crate::model::item::{DesiredItem, ItemId, TaskItem};
use crate::repo::log_repo::{DayEntry, HistoryEntry, LogRepository, RepoError, RepoResult};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Service error for daily-log use-cases.
#[derive(Debug)]
pub enum LogServiceError {
    /// Date is not shaped like `YYYY-MM-DD`.
    InvalidDate(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => write!(f, "invalid date: `{value}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidDate(_) => None,
        }
    }
}

impl From<RepoError> for LogServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Exact-title history projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleHistory {
    /// Number of distinct days the title appears on.
    pub total_days: usize,
    /// Matching rows, date ASC.
    pub entries: Vec<HistoryEntry>,
}

/// Daily-log service facade over a log repository.
pub struct LogService<R: LogRepository> {
    repo: R,
    /// Monthly summaries land here; `None` disables the export side effect.
    export_dir: Option<PathBuf>,
}

impl<R: LogRepository> LogService<R> {
    /// Creates a service with the export side effect disabled.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            export_dir: None,
        }
    }

    /// Creates a service writing monthly summaries into `export_dir`.
    pub fn with_export_dir(repo: R, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            export_dir: Some(export_dir.into()),
        }
    }

    /// Replaces the stored item list for `date` with `items`.
    ///
    /// Returns the stable ids in input order; id-less items carry their
    /// freshly generated one.
    ///
    /// # Side effects
    /// - Regenerates the monthly summary file once after a successful save.
    /// - Emits `save_day` logging events.
    pub fn save_day(
        &mut self,
        date: &str,
        items: &[DesiredItem],
    ) -> Result<Vec<ItemId>, LogServiceError> {
        validate_date(date)?;

        let started_at = Instant::now();
        let assigned = match self.repo.reconcile_day(date, items) {
            Ok(assigned) => assigned,
            Err(err) => {
                error!(
                    "event=save_day module=log status=error date={} duration_ms={} error={}",
                    date,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        info!(
            "event=save_day module=log status=ok date={} items={} duration_ms={}",
            date,
            assigned.len(),
            started_at.elapsed().as_millis()
        );

        self.export_month(date);
        Ok(assigned)
    }

    /// Items for one date, ordered by position. Unknown dates yield an
    /// empty list.
    pub fn day_items(&self, date: &str) -> RepoResult<Vec<TaskItem>> {
        self.repo.day_items(date)
    }

    /// Every stored day with items, newest day first.
    pub fn all_days(&self) -> RepoResult<Vec<DayEntry>> {
        self.repo.all_days()
    }

    /// Rows matching an exact title (and optional tags substring), date
    /// ASC, plus the distinct-day count.
    pub fn title_history(
        &self,
        title: &str,
        tags: Option<&str>,
    ) -> RepoResult<TitleHistory> {
        let entries = self.repo.title_history(title, tags)?;
        let mut seen_dates: Vec<&str> = entries.iter().map(|e| e.date.as_str()).collect();
        seen_dates.sort_unstable();
        seen_dates.dedup();
        let total_days = seen_dates.len();
        Ok(TitleHistory {
            total_days,
            entries,
        })
    }

    fn export_month(&self, date: &str) {
        let Some(export_dir) = self.export_dir.as_ref() else {
            return;
        };

        let prefix = export::month_prefix(date);
        let rows = match self.repo.month_rows(prefix) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    "event=month_export module=log status=error month={} error_code=rows_query_failed error={}",
                    prefix, err
                );
                return;
            }
        };

        if let Err(err) = export::write_month_summary(export_dir, date, &rows) {
            warn!(
                "event=month_export module=log status=error month={} error_code=write_failed error={}",
                prefix, err
            );
        }
    }
}

/// Defensive date-shape check at the service boundary.
///
/// Deep calendar validation (leap days etc.) stays with the input-parsing
/// collaborator; this only rejects clearly malformed keys.
pub fn validate_date(date: &str) -> Result<(), LogServiceError> {
    if DATE_RE.is_match(date) {
        Ok(())
    } else {
        Err(LogServiceError::InvalidDate(date.to_string()))
    }
}
