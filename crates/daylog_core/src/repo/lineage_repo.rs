//! Lineage graph repository: ancestry queries and re-parenting.
//!
//! # Responsibility
//! - Reconstruct a project family from flat origin/parent references.
//! - Mutate only the relation fields when a node is re-parented.
//! - Create and physically delete milestone items.
//!
//! # Invariants
//! - Lineage retrieval is a flat adjacency query (`origin_id = x OR item_id
//!   = x`), never a recursive walk; that keeps it immune to relation cycles.
//! - `update_relation` touches `parent_id` and `relation_type` only.
//! - Milestones land at a high sentinel `sort_order` so they render after
//!   ordinary items of their day.

use crate::model::item::{relation_label, ItemId, LineageNode, RelationType};
use crate::repo::log_repo::{
    bool_to_int, parse_bool, parse_item_id, parse_optional_id, resolve_day_id, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

/// Sort position placing milestone items after any ordinary day item.
pub const MILESTONE_SORT_ORDER: i64 = 9999;

/// Repository interface for lineage operations.
pub trait LineageRepository {
    /// Every item that is the given root or descends from it, joined to its
    /// day, ordered date ASC then `sort_order ASC`. An unknown id yields an
    /// empty list.
    fn lineage(&self, origin_id: ItemId) -> RepoResult<Vec<LineageNode>>;
    /// Re-parents one node; `None` severs the parent link. Fails with
    /// `ItemNotFound` when the item does not exist.
    fn update_relation(
        &mut self,
        item_id: ItemId,
        target_parent_id: Option<ItemId>,
        relation_type: RelationType,
    ) -> RepoResult<()>;
    /// Creates an `evolve` milestone under `origin_id` on `date` (day
    /// created if absent) and returns its fresh id.
    fn add_milestone(&mut self, origin_id: ItemId, title: &str, date: &str) -> RepoResult<ItemId>;
    /// Physically deletes one item by id.
    fn delete_item(&mut self, item_id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed lineage repository.
pub struct SqliteLineageRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteLineageRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl LineageRepository for SqliteLineageRepository<'_> {
    fn lineage(&self, origin_id: ItemId) -> RepoResult<Vec<LineageNode>> {
        let key = origin_id.to_string();
        let mut stmt = self.conn.prepare(
            "SELECT
                li.item_id,
                li.title,
                li.is_done,
                li.tags,
                li.parent_id,
                li.relation_type,
                d.log_date
             FROM log_items li
             INNER JOIN days d ON li.day_id = d.id
             WHERE li.origin_id = ?1
                OR li.item_id = ?1
             ORDER BY d.log_date ASC, li.sort_order ASC;",
        )?;

        let mut rows = stmt.query([key.as_str()])?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            let raw_id: String = row.get("item_id")?;
            let relation = match row.get::<_, Option<String>>("relation_type")? {
                None => None,
                Some(raw) => Some(RelationType::parse(&raw).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid relation type `{raw}` in log_items.relation_type"
                    ))
                })?),
            };
            nodes.push(LineageNode {
                item_id: parse_item_id(&raw_id)?,
                title: row.get("title")?,
                date: row.get("log_date")?,
                is_done: parse_bool(row.get::<_, i64>("is_done")?, "log_items.is_done")?,
                tags: row.get("tags")?,
                parent_id: parse_optional_id(row.get("parent_id")?)?,
                relation_type: relation_label(relation).to_string(),
            });
        }
        Ok(nodes)
    }

    fn update_relation(
        &mut self,
        item_id: ItemId,
        target_parent_id: Option<ItemId>,
        relation_type: RelationType,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE log_items
             SET
                parent_id = ?2,
                relation_type = ?3
             WHERE item_id = ?1;",
            params![
                item_id.to_string(),
                target_parent_id.map(|id| id.to_string()),
                relation_type.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(item_id));
        }

        Ok(())
    }

    fn add_milestone(&mut self, origin_id: ItemId, title: &str, date: &str) -> RepoResult<ItemId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let day_id = resolve_day_id(&tx, date)?;
        let item_id = Uuid::new_v4();
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
            ) VALUES (?1, ?2, ?3, '', '', ?4, ?5, ?6, ?6, ?7);",
            params![
                item_id.to_string(),
                day_id,
                title,
                bool_to_int(false),
                MILESTONE_SORT_ORDER,
                origin_id.to_string(),
                RelationType::Evolve.as_str(),
            ],
        )?;

        tx.commit()?;
        Ok(item_id)
    }

    fn delete_item(&mut self, item_id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM log_items WHERE item_id = ?1;",
            [item_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(item_id));
        }

        Ok(())
    }
}
