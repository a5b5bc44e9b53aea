//! # Bill Repository
//!
//! Read-side operations for bills. Bills are write-once: the billing
//! engine (`crate::checkout`) is the only code that inserts them, and
//! nothing updates or deletes them.

use sqlx::SqlitePool;

use crate::error::DbResult;
use bazaar_core::{Bill, BillItem, BillWithItems};

/// Repository for bill reads.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets one of a customer's bills with its items.
    ///
    /// Scoped by owner: another customer's bill id returns `None`.
    pub async fn get_for_user(&self, user_id: &str, bill_id: &str) -> DbResult<Option<BillWithItems>> {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            SELECT id, user_id, total_cents, created_at
            FROM bills
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(bill_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(bill) = bill else {
            return Ok(None);
        };

        let items = self.get_items(&bill.id).await?;
        Ok(Some(BillWithItems { bill, items }))
    }

    /// Lists a customer's bills, newest first, with items.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<BillWithItems>> {
        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT id, user_id, total_cents, created_at
            FROM bills
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(bills.len());
        for bill in bills {
            let items = self.get_items(&bill.id).await?;
            result.push(BillWithItems { bill, items });
        }

        Ok(result)
    }

    /// Gets all items for a bill.
    pub async fn get_items(&self, bill_id: &str) -> DbResult<Vec<BillItem>> {
        let items = sqlx::query_as::<_, BillItem>(
            r#"
            SELECT id, bill_id, product_id, name_snapshot, quantity, price_cents, created_at
            FROM bill_items
            WHERE bill_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
