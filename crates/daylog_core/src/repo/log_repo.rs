//! Daily-log repository: the reconciling log store.
//!
//! # Responsibility
//! - Own task item persistence for whole-day save requests.
//! - Reconcile an incoming full item list against stored state by stable
//!   `item_id`: upsert survivors, delete the complement.
//! - Provide read accessors for one day, all days, and monthly export rows.
//!
//! # Invariants
//! - `reconcile_day` is atomic: upserts and orphan deletes commit together
//!   or not at all.
//! - Upserts key on `item_id` and never change a row's identity; this keeps
//!   cross-day lineage references valid across edits and reorders.
//! - `sort_order` is rewritten on every save from the input position and is
//!   the sole source of display order.

use crate::db::DbError;
use crate::model::item::{DesiredItem, ItemId, RelationType, TaskItem};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error shared by log, lineage and habit persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Referenced task item does not exist.
    ItemNotFound(ItemId),
    /// Referenced habit definition does not exist.
    HabitNotFound(i64),
    /// Referenced habit group does not exist.
    GroupNotFound(i64),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "task item not found: {id}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "habit group not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted log data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::ItemNotFound(_) => None,
            Self::HabitNotFound(_) => None,
            Self::GroupNotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const ITEM_SELECT_SQL: &str = "SELECT
    item_id,
    title,
    content,
    tags,
    is_done,
    sort_order,
    origin_id,
    parent_id,
    relation_type
FROM log_items";

/// One day together with its ordered items, used by whole-store listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Items ordered by `sort_order ASC`.
    pub items: Vec<TaskItem>,
}

/// One flattened row feeding the monthly plain-text export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRow {
    pub date: String,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub is_done: bool,
}

/// One row of an exact-title history lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: String,
    pub content: String,
    pub tags: String,
}

/// Repository interface for the reconciling log store.
pub trait LogRepository {
    /// Makes the stored item set for `date` match `desired` exactly.
    ///
    /// Returns the stable ids in input order; items that arrived without an
    /// id carry their freshly generated one.
    fn reconcile_day(&mut self, date: &str, desired: &[DesiredItem]) -> RepoResult<Vec<ItemId>>;
    /// Items for one date, ordered by `sort_order ASC`. Unknown dates yield
    /// an empty list, not an error.
    fn day_items(&self, date: &str) -> RepoResult<Vec<TaskItem>>;
    /// Every stored day with items, ordered date DESC then `sort_order ASC`.
    fn all_days(&self) -> RepoResult<Vec<DayEntry>>;
    /// Flattened rows for one `YYYY-MM` month, date DESC then `sort_order
    /// ASC`, feeding the export writer.
    fn month_rows(&self, month_prefix: &str) -> RepoResult<Vec<MonthRow>>;
    /// Rows matching an exact title (and optional tags substring), date ASC.
    fn title_history(&self, title: &str, tags: Option<&str>) -> RepoResult<Vec<HistoryEntry>>;
}

/// SQLite-backed reconciling log store.
pub struct SqliteLogRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteLogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl LogRepository for SqliteLogRepository<'_> {
    fn reconcile_day(&mut self, date: &str, desired: &[DesiredItem]) -> RepoResult<Vec<ItemId>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let day_id = resolve_day_id(&tx, date)?;

        // Assign fresh identifiers before diffing so the desired key set is
        // complete.
        let assigned: Vec<ItemId> = desired
            .iter()
            .map(|item| item.item_id.unwrap_or_else(Uuid::new_v4))
            .collect();

        let stored_ids = stored_item_ids(&tx, day_id)?;
        let desired_ids: HashSet<ItemId> = assigned.iter().copied().collect();

        for orphan in complement(&stored_ids, &desired_ids) {
            tx.execute(
                "DELETE FROM log_items WHERE item_id = ?1;",
                [orphan.to_string()],
            )?;
        }

        for (position, (item, item_id)) in desired.iter().zip(assigned.iter()).enumerate() {
            tx.execute(
                "INSERT INTO log_items (
                    item_id,
                    day_id,
                    title,
                    content,
                    tags,
                    is_done,
                    sort_order,
                    origin_id,
                    parent_id,
                    relation_type
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT (item_id) DO UPDATE SET
                    day_id = excluded.day_id,
                    title = excluded.title,
                    content = excluded.content,
                    tags = excluded.tags,
                    is_done = excluded.is_done,
                    sort_order = excluded.sort_order,
                    origin_id = excluded.origin_id,
                    parent_id = excluded.parent_id,
                    relation_type = excluded.relation_type;",
                params![
                    item_id.to_string(),
                    day_id,
                    item.title.as_str(),
                    item.content.as_str(),
                    item.tags.as_str(),
                    bool_to_int(item.is_done),
                    position as i64,
                    item.origin_id.map(|id| id.to_string()),
                    item.parent_id.map(|id| id.to_string()),
                    item.relation_type.map(RelationType::as_str),
                ],
            )?;
        }

        tx.commit()?;
        Ok(assigned)
    }

    fn day_items(&self, date: &str) -> RepoResult<Vec<TaskItem>> {
        let day_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM days WHERE log_date = ?1;",
                [date],
                |row| row.get(0),
            )
            .optional()?;

        let Some(day_id) = day_id else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE day_id = ?1
             ORDER BY sort_order ASC;"
        ))?;
        let mut rows = stmt.query([day_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn all_days(&self) -> RepoResult<Vec<DayEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                d.log_date,
                li.item_id,
                li.title,
                li.content,
                li.tags,
                li.is_done,
                li.sort_order,
                li.origin_id,
                li.parent_id,
                li.relation_type
             FROM days d
             INNER JOIN log_items li ON li.day_id = d.id
             ORDER BY d.log_date DESC, li.sort_order ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut days: Vec<DayEntry> = Vec::new();
        while let Some(row) = rows.next()? {
            let date: String = row.get("log_date")?;
            let item = parse_item_row(row)?;
            match days.last_mut() {
                Some(entry) if entry.date == date => entry.items.push(item),
                _ => days.push(DayEntry {
                    date,
                    items: vec![item],
                }),
            }
        }
        Ok(days)
    }

    fn month_rows(&self, month_prefix: &str) -> RepoResult<Vec<MonthRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                d.log_date,
                li.title,
                li.content,
                li.tags,
                li.is_done
             FROM days d
             INNER JOIN log_items li ON li.day_id = d.id
             WHERE d.log_date LIKE ?1 || '%'
             ORDER BY d.log_date DESC, li.sort_order ASC;",
        )?;

        let mut rows = stmt.query([month_prefix])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(MonthRow {
                date: row.get("log_date")?,
                title: row.get("title")?,
                content: row.get("content")?,
                tags: row.get("tags")?,
                is_done: parse_bool(row.get::<_, i64>("is_done")?, "log_items.is_done")?,
            });
        }
        Ok(result)
    }

    fn title_history(&self, title: &str, tags: Option<&str>) -> RepoResult<Vec<HistoryEntry>> {
        let mut sql = String::from(
            "SELECT d.log_date, li.content, li.tags
             FROM log_items li
             INNER JOIN days d ON li.day_id = d.id
             WHERE li.title = ?1",
        );
        if tags.is_some() {
            sql.push_str(" AND li.tags LIKE '%' || ?2 || '%'");
        }
        sql.push_str(" ORDER BY d.log_date ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match tags {
            Some(tags) => stmt.query(params![title, tags])?,
            None => stmt.query([title])?,
        };

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(HistoryEntry {
                date: row.get("log_date")?,
                content: row.get("content")?,
                tags: row.get("tags")?,
            });
        }
        Ok(entries)
    }
}

/// Resolves the day row for `date`, creating it when absent.
///
/// `INSERT OR IGNORE` plus the `log_date` UNIQUE constraint makes repeated
/// calls idempotent.
pub(crate) fn resolve_day_id(tx: &Transaction<'_>, date: &str) -> RepoResult<i64> {
    tx.execute(
        "INSERT OR IGNORE INTO days (log_date) VALUES (?1);",
        [date],
    )?;
    let day_id = tx.query_row(
        "SELECT id FROM days WHERE log_date = ?1;",
        [date],
        |row| row.get(0),
    )?;
    Ok(day_id)
}

/// Keys present in `stored` but absent from `desired`: the delete set of a
/// set reconciliation.
fn complement<K: Eq + Hash + Copy>(stored: &HashSet<K>, desired: &HashSet<K>) -> Vec<K> {
    stored.difference(desired).copied().collect()
}

fn stored_item_ids(tx: &Transaction<'_>, day_id: i64) -> RepoResult<HashSet<ItemId>> {
    let mut stmt = tx.prepare("SELECT item_id FROM log_items WHERE day_id = ?1;")?;
    let mut rows = stmt.query([day_id])?;
    let mut ids = HashSet::new();
    while let Some(row) = rows.next()? {
        let raw: String = row.get(0)?;
        ids.insert(parse_item_id(&raw)?);
    }
    Ok(ids)
}

pub(crate) fn parse_item_row(row: &Row<'_>) -> RepoResult<TaskItem> {
    let raw_id: String = row.get("item_id")?;
    Ok(TaskItem {
        item_id: parse_item_id(&raw_id)?,
        title: row.get("title")?,
        content: row.get("content")?,
        tags: row.get("tags")?,
        is_done: parse_bool(row.get::<_, i64>("is_done")?, "log_items.is_done")?,
        sort_order: row.get("sort_order")?,
        origin_id: parse_optional_id(row.get("origin_id")?)?,
        parent_id: parse_optional_id(row.get("parent_id")?)?,
        relation_type: parse_optional_relation(row.get("relation_type")?)?,
    })
}

pub(crate) fn parse_item_id(value: &str) -> RepoResult<ItemId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in log_items.item_id"))
    })
}

pub(crate) fn parse_optional_id(value: Option<String>) -> RepoResult<Option<ItemId>> {
    value.as_deref().map(parse_item_id).transpose()
}

pub(crate) fn parse_optional_relation(
    value: Option<String>,
) -> RepoResult<Option<RelationType>> {
    match value {
        None => Ok(None),
        Some(raw) => RelationType::parse(&raw).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid relation type `{raw}` in log_items.relation_type"
            ))
        }),
    }
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::complement;
    use std::collections::HashSet;

    #[test]
    fn complement_returns_stored_minus_desired() {
        let stored: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let desired: HashSet<i32> = [2, 3, 4].into_iter().collect();
        let mut orphans = complement(&stored, &desired);
        orphans.sort_unstable();
        assert_eq!(orphans, vec![1]);
    }

    #[test]
    fn complement_is_empty_for_identical_sets() {
        let keys: HashSet<i32> = [7, 8].into_iter().collect();
        assert!(complement(&keys, &keys).is_empty());
    }
}
