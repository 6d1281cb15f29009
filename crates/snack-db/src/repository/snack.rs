//! Single-snack reads and upserts.
//!
//! The narrow path for product edits (typically large embedded images):
//! one row changes without shipping or rewriting the whole state.

use snack_core::{Money, Qty, Snack};
use sqlx::SqlitePool;
use tracing::debug;

use super::{category_from_str, category_to_str};
use crate::error::DbError;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SnackRow {
    pub id: i64,
    pub name: String,
    pub emoji: Option<String>,
    pub image: Option<String>,
    pub category: String,
    pub price: i64,
    pub sell_price: i64,
    pub cost_price: i64,
    pub stock: i64,
    pub total_sold: i64,
}

impl SnackRow {
    pub(crate) fn into_snack(self) -> Snack {
        Snack {
            id: self.id,
            name: self.name,
            emoji: self.emoji,
            image: self.image,
            category: category_from_str(&self.category),
            price: Money::from_hundredths(self.price),
            sell_price: Money::from_hundredths(self.sell_price),
            cost_price: Money::from_hundredths(self.cost_price),
            stock: Qty::from_hundredths(self.stock),
            total_sold: Qty::from_hundredths(self.total_sold),
        }
    }
}

pub struct SnackRepository {
    pool: SqlitePool,
}

impl SnackRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        SnackRepository { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Snack>, DbError> {
        let row: Option<SnackRow> = sqlx::query_as(
            "SELECT id, name, emoji, image, category, price, sell_price, cost_price, \
             stock, total_sold FROM snacks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SnackRow::into_snack))
    }

    /// Insert-or-update keyed on id. Touches no other table.
    pub async fn upsert(&self, snack: &Snack) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO snacks (id, name, emoji, image, category, price, sell_price, \
             cost_price, stock, total_sold) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               name = excluded.name, \
               emoji = excluded.emoji, \
               image = excluded.image, \
               category = excluded.category, \
               price = excluded.price, \
               sell_price = excluded.sell_price, \
               cost_price = excluded.cost_price, \
               stock = excluded.stock, \
               total_sold = excluded.total_sold",
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
        .execute(&self.pool)
        .await?;

        debug!(snack_id = snack.id, "snack upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use snack_core::{Money, Qty, Snack, SnackCategory};

    fn sample(id: i64) -> Snack {
        Snack {
            id,
            name: "มาม่า".to_string(),
            emoji: Some("🍜".to_string()),
            image: None,
            category: SnackCategory::Snack,
            price: Money::from_f64(7.0),
            sell_price: Money::from_f64(7.0),
            cost_price: Money::from_f64(5.0),
            stock: Qty::from_f64(48.0),
            total_sold: Qty::zero(),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        let repo = db.snacks();

        repo.upsert(&sample(1)).await.unwrap();
        let stored = repo.get(1).await.unwrap().unwrap();
        assert_eq!(stored.name, "มาม่า");
        assert_eq!(stored.sell_price, Money::from_f64(7.0));

        let mut updated = sample(1);
        updated.stock = Qty::from_f64(40.0);
        repo.upsert(&updated).await.unwrap();
        let stored = repo.get(1).await.unwrap().unwrap();
        assert_eq!(stored.stock, Qty::from_f64(40.0));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        assert!(db.snacks().get(999).await.unwrap().is_none());
    }
}
