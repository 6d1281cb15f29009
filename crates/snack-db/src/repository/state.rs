//! # Whole-State Replace
//!
//! The synchronization write path: one save replaces all five tables.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  replace(&state)                                                    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  write queue (tokio Mutex, FIFO) ── one whole-state write at a time │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  attempt 1..=4 ─── transient busy/locked? ── backoff 50ms × attempt │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  BEGIN; DELETE ×5; INSERT ×N; COMMIT   (full replace, not a diff)   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rollback on any failure leaves the previously persisted state untouched,
//! which is what lets the API reject a bad blob without side effects.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use snack_core::{AppState, Customer, Money, Purchase, Qty, User};
use sqlx::{SqlitePool, Transaction};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::audit::{bind_entry, AuditRow};
use super::snack::SnackRow;
use super::{category_to_str, role_from_str, role_to_str};
use crate::error::DbError;

const MAX_WRITE_ATTEMPTS: u32 = 4;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    name: String,
    shift: String,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    display_name: String,
    aliases: String,
    role: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    customer_name: String,
    snack_id: Option<i64>,
    snack_name: String,
    snack_emoji: Option<String>,
    snack_image: Option<String>,
    qty: i64,
    unit_price: i64,
    unit_cost: i64,
    line_revenue: i64,
    line_cost: i64,
    line_profit: i64,
    purchased_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
}

impl PurchaseRow {
    fn into_purchase(self) -> Purchase {
        Purchase {
            id: self.id,
            customer_name: self.customer_name,
            snack_id: self.snack_id,
            snack_name: self.snack_name,
            snack_emoji: self.snack_emoji,
            snack_image: self.snack_image,
            qty: Qty::from_hundredths(self.qty),
            unit_price: Money::from_hundredths(self.unit_price),
            unit_cost: Money::from_hundredths(self.unit_cost),
            line_revenue: Money::from_hundredths(self.line_revenue),
            line_cost: Money::from_hundredths(self.line_cost),
            line_profit: Money::from_hundredths(self.line_profit),
            purchased_at: self.purchased_at,
            settled_at: self.settled_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

pub struct StateRepository {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl StateRepository {
    pub(crate) fn new(pool: SqlitePool, write_lock: Arc<Mutex<()>>) -> Self {
        StateRepository { pool, write_lock }
    }

    /// Replaces the whole persisted state. Serialized process-wide by the
    /// write queue; transient lock conflicts retry with linear backoff
    /// before the error propagates.
    pub async fn replace(&self, state: &AppState) -> Result<(), DbError> {
        let _queue = self.write_lock.lock().await;

        let mut attempt: u32 = 1;
        loop {
            match self.try_replace(state).await {
                Ok(()) => {
                    info!(
                        snacks = state.snacks.len(),
                        customers = state.customers.len(),
                        users = state.users.len(),
                        purchases = state.purchases.len(),
                        audit_logs = state.audit_logs.len(),
                        attempt,
                        "state replaced"
                    );
                    return Ok(());
                }
                Err(err) if err.is_transient() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, error = %err, "transient lock conflict, retrying state write");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_replace(&self, state: &AppState) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for table in ["audit_logs", "purchases", "users", "customers", "snacks"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }

        insert_snacks(&mut tx, state).await?;
        insert_customers(&mut tx, &state.customers).await?;
        insert_users(&mut tx, &state.users).await?;
        insert_purchases(&mut tx, &state.purchases).await?;
        insert_audit_logs(&mut tx, state).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Loads the whole persisted state. Collections come back in stable
    /// order (ids / names / timestamps ascending).
    pub async fn read(&self) -> Result<AppState, DbError> {
        let snack_rows: Vec<SnackRow> = sqlx::query_as(
            "SELECT id, name, emoji, image, category, price, sell_price, cost_price, \
             stock, total_sold FROM snacks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let customer_rows: Vec<CustomerRow> =
            sqlx::query_as("SELECT name, shift FROM customers ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        let user_rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, display_name, aliases, role FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let purchase_rows: Vec<PurchaseRow> = sqlx::query_as(
            "SELECT id, customer_name, snack_id, snack_name, snack_emoji, snack_image, \
             qty, unit_price, unit_cost, line_revenue, line_cost, line_profit, \
             purchased_at, settled_at FROM purchases ORDER BY purchased_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let audit_rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT id, action, detail, actor_id, actor_name, actor_role, meta, at \
             FROM audit_logs ORDER BY at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AppState {
            snacks: snack_rows.into_iter().map(SnackRow::into_snack).collect(),
            customers: customer_rows
                .into_iter()
                .map(|row| Customer {
                    name: row.name,
                    shift: row.shift.chars().next().unwrap_or('A'),
                })
                .collect(),
            users: user_rows
                .into_iter()
                .map(|row| User {
                    id: row.id,
                    display_name: row.display_name,
                    aliases: serde_json::from_str(&row.aliases).unwrap_or_default(),
                    role: role_from_str(&row.role),
                })
                .collect(),
            purchases: purchase_rows
                .into_iter()
                .map(PurchaseRow::into_purchase)
                .collect(),
            audit_logs: audit_rows.into_iter().map(AuditRow::into_entry).collect(),
        })
    }
}

// =============================================================================
// Bulk Inserts
// =============================================================================

async fn insert_snacks(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    state: &AppState,
) -> Result<(), DbError> {
    for snack in &state.snacks {
        sqlx::query(
            "INSERT INTO snacks (id, name, emoji, image, category, price, sell_price, \
             cost_price, stock, total_sold) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snack.id)
        .bind(&snack.name)
        .bind(&snack.emoji)
        .bind(&snack.image)
        .bind(category_to_str(snack.category))
        .bind(snack.price.hundredths())
        .bind(snack.sell_price.hundredths())
        .bind(snack.cost_price.hundredths())
        .bind(snack.stock.hundredths())
        .bind(snack.total_sold.hundredths())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_customers(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    customers: &[Customer],
) -> Result<(), DbError> {
    for customer in customers {
        sqlx::query("INSERT INTO customers (name, shift) VALUES (?, ?)")
            .bind(&customer.name)
            .bind(customer.shift.to_string())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_users(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    users: &[User],
) -> Result<(), DbError> {
    for user in users {
        let aliases = serde_json::to_string(&user.aliases).unwrap_or_else(|_| "[]".to_string());
        sqlx::query("INSERT INTO users (id, display_name, aliases, role) VALUES (?, ?, ?, ?)")
            .bind(user.id)
            .bind(&user.display_name)
            .bind(aliases)
            .bind(role_to_str(user.role))
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_purchases(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    purchases: &[Purchase],
) -> Result<(), DbError> {
    for p in purchases {
        sqlx::query(
            "INSERT INTO purchases (id, customer_name, snack_id, snack_name, snack_emoji, \
             snack_image, qty, unit_price, unit_cost, line_revenue, line_cost, line_profit, \
             purchased_at, settled_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&p.id)
        .bind(&p.customer_name)
        .bind(p.snack_id)
        .bind(&p.snack_name)
        .bind(&p.snack_emoji)
        .bind(&p.snack_image)
        .bind(p.qty.hundredths())
        .bind(p.unit_price.hundredths())
        .bind(p.unit_cost.hundredths())
        .bind(p.line_revenue.hundredths())
        .bind(p.line_cost.hundredths())
        .bind(p.line_profit.hundredths())
        .bind(p.purchased_at)
        .bind(p.settled_at)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_audit_logs(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    state: &AppState,
) -> Result<(), DbError> {
    for entry in &state.audit_logs {
        let meta = serde_json::to_string(&entry.meta).unwrap_or_else(|_| "{}".to_string());
        let query = sqlx::query(
            "INSERT INTO audit_logs (id, action, detail, actor_id, actor_name, actor_role, \
             meta, at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        );
        bind_entry(query, entry, meta).execute(&mut **tx).await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{TimeZone, Utc};
    use snack_core::normalize::sanitize_state;
    use snack_core::{AppState, Money, Qty};
    use serde_json::json;

    fn fixture() -> AppState {
        sanitize_state(
            &json!({
                "snacks": [{"id": 1, "name": "มาม่า", "price": 7, "costPrice": 5, "stock": 48}],
                "customers": [{"name": "เอ", "shift": "A"}],
                "users": [{"id": 1, "displayName": "Boss", "role": "admin",
                           "aliases": ["boss", "บอส"]}],
                "purchases": [{
                    "id": "p1", "customerName": "เอ", "snackId": 1, "snackName": "มาม่า",
                    "qty": 2, "unitPrice": 7, "unitCost": 5, "date": "2026-02-08"
                }],
                "auditLogs": [{"id": "a1", "action": "purchase.create", "detail": "sold",
                               "actorName": "Boss", "actorRole": "admin",
                               "at": "2026-02-08T09:00:00Z"}]
            }),
            Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_round_trip() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        let state = fixture();
        db.state().replace(&state).await.unwrap();

        let loaded = db.state().read().await.unwrap();
        assert_eq!(loaded.snacks.len(), 1);
        assert_eq!(loaded.snacks[0].sell_price, Money::from_f64(7.0));
        assert_eq!(loaded.customers[0].shift, 'A');
        // "Boss" already matches "boss" case-insensitively, so the sanitizer
        // does not append the display name again.
        assert_eq!(loaded.users[0].aliases, vec!["boss", "บอส"]);
        assert_eq!(loaded.purchases[0].line_revenue, Money::from_f64(14.0));
        assert_eq!(
            loaded.purchases[0].purchased_at,
            Utc.with_ymd_and_hms(2026, 2, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(loaded.audit_logs[0].action, "purchase.create");
    }

    #[tokio::test]
    async fn test_replace_is_full_not_additive() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        db.state().replace(&fixture()).await.unwrap();

        let mut smaller = fixture();
        smaller.purchases.clear();
        smaller.snacks[0].stock = Qty::from_f64(40.0);
        db.state().replace(&smaller).await.unwrap();

        let loaded = db.state().read().await.unwrap();
        assert!(loaded.purchases.is_empty());
        assert_eq!(loaded.snacks[0].stock, Qty::from_f64(40.0));
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_prior_state() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        db.state().replace(&fixture()).await.unwrap();

        // Duplicate primary keys blow up mid-transaction.
        let mut broken = fixture();
        let dup = broken.snacks[0].clone();
        broken.snacks.push(dup);
        assert!(db.state().replace(&broken).await.is_err());

        let loaded = db.state().read().await.unwrap();
        assert_eq!(loaded.snacks.len(), 1);
        assert_eq!(loaded.purchases.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_state_round_trip() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        db.state().replace(&AppState::default()).await.unwrap();
        assert!(db.state().read().await.unwrap().is_empty());
    }
}
