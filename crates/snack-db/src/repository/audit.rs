//! Audit log queries.

use chrono::{DateTime, Utc};
use snack_core::AuditLogEntry;
use sqlx::SqlitePool;

use super::{role_from_str, role_to_str};
use crate::error::DbError;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AuditRow {
    pub id: String,
    pub action: String,
    pub detail: String,
    pub actor_id: Option<i64>,
    pub actor_name: String,
    pub actor_role: String,
    pub meta: String,
    pub at: DateTime<Utc>,
}

impl AuditRow {
    pub(crate) fn into_entry(self) -> AuditLogEntry {
        AuditLogEntry {
            id: self.id,
            action: self.action,
            detail: self.detail,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            actor_role: role_from_str(&self.actor_role),
            meta: serde_json::from_str(&self.meta)
                .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new())),
            at: self.at,
        }
    }
}

pub(crate) fn bind_entry<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    entry: &'q AuditLogEntry,
    meta: String,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(&entry.id)
        .bind(&entry.action)
        .bind(&entry.detail)
        .bind(entry.actor_id)
        .bind(&entry.actor_name)
        .bind(role_to_str(entry.actor_role))
        .bind(meta)
        .bind(entry.at)
}

pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Most recent entries, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<AuditLogEntry>, DbError> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT id, action, detail, actor_id, actor_name, actor_role, meta, at \
             FROM audit_logs ORDER BY at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditRow::into_entry).collect())
    }
}
