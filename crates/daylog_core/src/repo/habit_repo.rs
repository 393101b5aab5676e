//! Habit repository: definitions, per-day check-ins and ordering groups.
//!
//! # Responsibility
//! - Provide CRUD over habit definitions and groups.
//! - Upsert daily check-ins keyed by `(log_date, habit_id)`.
//!
//! # Invariants
//! - Toggling a check-in twice for the same pair leaves exactly one row.
//! - Deleting a definition removes its check-in rows in the same
//!   transaction.
//! - Daily listings exclude archived definitions.

use crate::model::habit::{HabitDefinition, HabitGroup, HabitPatch, HabitWithStatus};
use crate::repo::log_repo::{bool_to_int, parse_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, TransactionBehavior};

/// Repository interface for habit operations.
pub trait HabitRepository {
    /// Creates one habit definition and returns its row id.
    fn create_habit(&self, title: &str, color: &str, group_id: i64) -> RepoResult<i64>;
    /// Active definitions joined with their check-in status for `date`,
    /// ordered `sort_order ASC, created_at ASC, id ASC`.
    fn habits_for_date(&self, date: &str) -> RepoResult<Vec<HabitWithStatus>>;
    /// Loads one definition, archived or not.
    fn get_habit(&self, habit_id: i64) -> RepoResult<Option<HabitDefinition>>;
    /// Upserts the check-in for `(date, habit_id)` to `status`.
    fn toggle_habit(&self, date: &str, habit_id: i64, status: i64) -> RepoResult<()>;
    /// Upserts status 1 for every active definition on `date`; returns the
    /// number of definitions touched.
    fn mark_all_done(&mut self, date: &str) -> RepoResult<usize>;
    /// Applies the provided fields only; an empty patch is a no-op.
    fn update_habit(&self, habit_id: i64, patch: &HabitPatch) -> RepoResult<()>;
    /// Deletes one definition together with its check-in rows.
    fn delete_habit(&mut self, habit_id: i64) -> RepoResult<()>;
    /// Creates one ordering group and returns its row id.
    fn create_group(&self, name: &str) -> RepoResult<i64>;
    /// All groups ordered `sort_order ASC, id ASC`.
    fn list_groups(&self) -> RepoResult<Vec<HabitGroup>>;
    /// Renames and/or reorders one group; `None` fields are left alone.
    fn update_group(
        &self,
        group_id: i64,
        name: Option<&str>,
        sort_order: Option<i64>,
    ) -> RepoResult<()>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, title: &str, color: &str, group_id: i64) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO habit_definitions (title, color, group_id) VALUES (?1, ?2, ?3);",
            params![title, color, group_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn habits_for_date(&self, date: &str) -> RepoResult<Vec<HabitWithStatus>> {
        let mut stmt = self.conn.prepare(
            "SELECT h.id, h.title, h.color, h.group_id, l.status
             FROM habit_definitions h
             LEFT JOIN habit_logs l ON h.id = l.habit_id AND l.log_date = ?1
             WHERE h.is_archived = 0
             ORDER BY h.sort_order ASC, h.created_at ASC, h.id ASC;",
        )?;

        let mut rows = stmt.query([date])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(HabitWithStatus {
                id: row.get("id")?,
                title: row.get("title")?,
                color: row.get("color")?,
                group_id: row.get("group_id")?,
                status: row.get("status")?,
            });
        }
        Ok(habits)
    }

    fn get_habit(&self, habit_id: i64) -> RepoResult<Option<HabitDefinition>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, color, group_id, is_archived, sort_order
             FROM habit_definitions
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([habit_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(HabitDefinition {
                id: row.get("id")?,
                title: row.get("title")?,
                color: row.get("color")?,
                group_id: row.get("group_id")?,
                is_archived: parse_bool(
                    row.get::<_, i64>("is_archived")?,
                    "habit_definitions.is_archived",
                )?,
                sort_order: row.get("sort_order")?,
            }));
        }
        Ok(None)
    }

    fn toggle_habit(&self, date: &str, habit_id: i64, status: i64) -> RepoResult<()> {
        if self.get_habit(habit_id)?.is_none() {
            return Err(RepoError::HabitNotFound(habit_id));
        }

        self.conn.execute(
            "INSERT INTO habit_logs (log_date, habit_id, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (log_date, habit_id) DO UPDATE SET status = excluded.status;",
            params![date, habit_id, status],
        )?;
        Ok(())
    }

    fn mark_all_done(&mut self, date: &str) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let active_ids: Vec<i64> = {
            let mut stmt =
                tx.prepare("SELECT id FROM habit_definitions WHERE is_archived = 0;")?;
            let mut rows = stmt.query([])?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next()? {
                ids.push(row.get(0)?);
            }
            ids
        };

        for habit_id in &active_ids {
            tx.execute(
                "INSERT INTO habit_logs (log_date, habit_id, status)
                 VALUES (?1, ?2, 1)
                 ON CONFLICT (log_date, habit_id) DO UPDATE SET status = 1;",
                params![date, habit_id],
            )?;
        }

        tx.commit()?;
        Ok(active_ids.len())
    }

    fn update_habit(&self, habit_id: i64, patch: &HabitPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut fields: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            fields.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(color) = patch.color.as_ref() {
            fields.push("color = ?");
            bind_values.push(Value::Text(color.clone()));
        }
        if let Some(group_id) = patch.group_id {
            fields.push("group_id = ?");
            bind_values.push(Value::Integer(group_id));
        }
        if let Some(is_archived) = patch.is_archived {
            fields.push("is_archived = ?");
            bind_values.push(Value::Integer(bool_to_int(is_archived)));
        }

        bind_values.push(Value::Integer(habit_id));
        let sql = format!(
            "UPDATE habit_definitions SET {} WHERE id = ?;",
            fields.join(", ")
        );

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::HabitNotFound(habit_id));
        }
        Ok(())
    }

    fn delete_habit(&mut self, habit_id: i64) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM habit_logs WHERE habit_id = ?1;", [habit_id])?;
        let changed = tx.execute("DELETE FROM habit_definitions WHERE id = ?1;", [habit_id])?;
        if changed == 0 {
            return Err(RepoError::HabitNotFound(habit_id));
        }

        tx.commit()?;
        Ok(())
    }

    fn create_group(&self, name: &str) -> RepoResult<i64> {
        self.conn
            .execute("INSERT INTO habit_groups (name) VALUES (?1);", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_groups(&self) -> RepoResult<Vec<HabitGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, sort_order
             FROM habit_groups
             ORDER BY sort_order ASC, id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(HabitGroup {
                id: row.get("id")?,
                name: row.get("name")?,
                sort_order: row.get("sort_order")?,
            });
        }
        Ok(groups)
    }

    fn update_group(
        &self,
        group_id: i64,
        name: Option<&str>,
        sort_order: Option<i64>,
    ) -> RepoResult<()> {
        if name.is_none() && sort_order.is_none() {
            return Ok(());
        }

        let mut fields: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(name) = name {
            fields.push("name = ?");
            bind_values.push(Value::Text(name.to_string()));
        }
        if let Some(sort_order) = sort_order {
            fields.push("sort_order = ?");
            bind_values.push(Value::Integer(sort_order));
        }
        bind_values.push(Value::Integer(group_id));

        let sql = format!(
            "UPDATE habit_groups SET {} WHERE id = ?;",
            fields.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(group_id));
        }
        Ok(())
    }
}
