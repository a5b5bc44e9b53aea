//! # Billing Engine
//!
//! The checkout transaction: converts a customer's cart into an
//! immutable bill while decrementing stock.
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Checkout Transaction                         │
//! │                                                                 │
//! │  BEGIN IMMEDIATE (write lock held for the whole transaction)    │
//! │    1. Read cart lines ──── empty? ──► EmptyCart, ROLLBACK       │
//! │    2. Batch-read products (one IN query, no N+1)                │
//! │    3. Validate stock per line ── short? ──► InsufficientStock,  │
//! │       (first failure wins)                   ROLLBACK           │
//! │    4. total = Σ(price × qty) at checkout-time prices            │
//! │    5. INSERT bill + bill_items (name + unit price frozen)       │
//! │    6. UPDATE products                                           │
//! │         SET quantity = quantity - n                             │
//! │         WHERE id = ? AND quantity >= n                          │
//! │       0 rows? ──► InsufficientStock, ROLLBACK                   │
//! │    7. DELETE cart lines (cart row persists)                     │
//! │  COMMIT                                                         │
//! │                                                                 │
//! │  After commit only: hand the bill to the notifier               │
//! │  (fire-and-forget, owned by the API layer).                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contention
//! The transaction begins IMMEDIATE: checkouts serialize on SQLite's
//! single write lock, so a concurrent checkout waits (busy timeout)
//! and then reads post-commit stock. The loser of a race for the last
//! unit therefore fails the step-3 validation with
//! `InsufficientStock`, never with a lock error. The `quantity >= n`
//! guard on the step-6 decrement is the backstop for the same
//! invariant: a read-modify-write there could over-sell, and an
//! insufficiency it detects surfaces as the identical
//! `InsufficientStock` error.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{Bill, BillItem, BillWithItems, CoreError, Money, Product};

/// Checkout failure.
///
/// Business failures carry the exact client-facing message via
/// `CoreError`; storage failures pass through as `DbError`.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Db(err.into())
    }
}

/// A cart line as read inside the checkout transaction.
#[derive(Debug, sqlx::FromRow)]
struct CartLine {
    cart_id: String,
    product_id: String,
    quantity: i64,
}

/// The transactional core: cart → bill conversion.
#[derive(Debug, Clone)]
pub struct BillingEngine {
    pool: SqlitePool,
}

impl BillingEngine {
    /// Creates a new BillingEngine.
    pub fn new(pool: SqlitePool) -> Self {
        BillingEngine { pool }
    }

    /// Converts the customer's cart into a bill.
    ///
    /// All steps run in one transaction: any failure rolls back the
    /// bill, the stock decrements and the cart clearing together. The
    /// only externally visible effect of a failed checkout is the
    /// error itself.
    ///
    /// ## Errors
    /// * `CoreError::EmptyCart` - no cart or no lines
    /// * `CoreError::ProductNotFound` - a referenced product vanished
    /// * `CoreError::InsufficientStock` - a line exceeds available
    ///   stock, whether detected during validation or by the guarded
    ///   decrement
    pub async fn generate_bill(&self, user_id: &str) -> Result<BillWithItems, CheckoutError> {
        debug!(user_id = %user_id, "Starting checkout");

        // IMMEDIATE: take the write lock before the stock read. A
        // deferred begin would let two checkouts snapshot the same
        // stock, and the loser's first write would then abort with
        // SQLITE_BUSY instead of reaching the stock check.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        // 1. Cart lines, in the order they were added. First-failure
        //    semantics below depend on this ordering being stable.
        let lines: Vec<CartLine> = sqlx::query_as(
            r#"
            SELECT ci.cart_id, ci.product_id, ci.quantity
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            WHERE c.user_id = ?1
            ORDER BY ci.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        let cart_id = lines[0].cart_id.clone();

        // 2. One batch read for every referenced product.
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, description, price_cents, quantity, created_at, updated_at \
             FROM products WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for line in &lines {
            separated.push_bind(&line.product_id);
        }
        qb.push(")");

        let products: Vec<Product> = qb.build_query_as().fetch_all(&mut *tx).await?;
        let products: HashMap<String, Product> =
            products.into_iter().map(|p| (p.id.clone(), p)).collect();

        // 3 + 4. Validate availability line by line and price the cart
        //        from the products read in this transaction.
        let mut total = Money::zero();
        for line in &lines {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if !product.can_fulfill(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                }
                .into());
            }

            total += product.price().multiply_quantity(line.quantity);
        }

        // 5. Persist the bill and its frozen line items.
        let now = Utc::now();
        let bill = Bill {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            total_cents: total.cents(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO bills (id, user_id, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.user_id)
        .bind(bill.total_cents)
        .bind(bill.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            // Presence proven in step 3.
            let product = &products[&line.product_id];
            let item = BillItem {
                id: Uuid::new_v4().to_string(),
                bill_id: bill.id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                quantity: line.quantity,
                price_cents: product.price_cents,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO bill_items (id, bill_id, product_id, name_snapshot, quantity, price_cents, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.bill_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        // 6. Guarded decrement: expression update, never read-modify-
        //    write. Zero affected rows means a concurrent checkout won
        //    the race since our validation read.
        for line in &lines {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let name = products[&line.product_id].name.clone();
                return Err(CoreError::InsufficientStock { name }.into());
            }
        }

        // 7. Clear the cart's lines; the cart row itself persists.
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart_id)
            .execute(&mut *tx)
            .await?;

        // 8. Commit. Notification handoff happens in the caller, after
        //    and outside this transaction.
        tx.commit().await?;

        info!(
            user_id = %user_id,
            bill_id = %bill.id,
            total_cents = bill.total_cents,
            items = items.len(),
            "Checkout complete"
        );

        Ok(BillWithItems { bill, items })
    }
}

/// Convenience for tests and callers that only care about stock.
impl BillingEngine {
    /// Reads a product's current stock quantity.
    pub async fn current_stock(&self, product_id: &str) -> DbResult<i64> {
        let quantity: i64 = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductInput;
    use crate::repository::user::NewUser;
    use bazaar_core::Role;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, email: &str) -> String {
        let (user, _) = db
            .users()
            .create(NewUser {
                email: email.to_string(),
                name: "Casey".to_string(),
                age: 28,
                password_hash: "$argon2id$stub".to_string(),
                role: Role::Customer,
            })
            .await
            .unwrap();
        user.id
    }

    async fn seed_product(db: &Database, name: &str, price_cents: i64, quantity: i64) -> String {
        db.products()
            .insert(ProductInput {
                name: name.to_string(),
                description: String::new(),
                price_cents,
                quantity,
            })
            .await
            .unwrap()
            .id
    }

    fn is_insufficient(err: &CheckoutError) -> bool {
        matches!(err, CheckoutError::Core(CoreError::InsufficientStock { .. }))
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 10_000, 10).await;

        db.carts().add_item(&user_id, &product_id, 3).await.unwrap();

        let bill = db.billing().generate_bill(&user_id).await.unwrap();

        // Total from checkout-time prices: 100.00 × 3.
        assert_eq!(bill.bill.total_cents, 30_000);
        assert_eq!(bill.items.len(), 1);
        assert_eq!(bill.items[0].price_cents, 10_000);
        assert_eq!(bill.items[0].quantity, 3);
        assert_eq!(bill.items[0].name_snapshot, "Widget");

        // Stock decremented by exactly the purchased amount.
        assert_eq!(db.billing().current_stock(&product_id).await.unwrap(), 7);

        // Cart emptied, cart row still present.
        let view = db.carts().get_view(&user_id).await.unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;

        let err = db.billing().generate_bill(&user_id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::EmptyCart)));
        assert_eq!(err.to_string(), "Cart is empty");

        assert!(db.bills().list_for_user(&user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_has_no_side_effects() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 1_000, 2).await;

        db.carts().add_item(&user_id, &product_id, 5).await.unwrap();

        let err = db.billing().generate_bill(&user_id).await.unwrap_err();
        assert!(is_insufficient(&err));
        assert_eq!(err.to_string(), "Not enough stock for Widget");

        // No decrement, no bill, cart unchanged.
        assert_eq!(db.billing().current_stock(&product_id).await.unwrap(), 2);
        assert!(db.bills().list_for_user(&user_id).await.unwrap().is_empty());
        let view = db.carts().get_view(&user_id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_checkout_first_failure_aborts_everything() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let plentiful = seed_product(&db, "Plentiful", 1_000, 100).await;
        let scarce = seed_product(&db, "Scarce", 1_000, 1).await;

        db.carts().add_item(&user_id, &plentiful, 2).await.unwrap();
        db.carts().add_item(&user_id, &scarce, 3).await.unwrap();

        let err = db.billing().generate_bill(&user_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Not enough stock for Scarce");

        // The fulfillable line was not partially committed either.
        assert_eq!(db.billing().current_stock(&plentiful).await.unwrap(), 100);
        assert_eq!(db.billing().current_stock(&scarce).await.unwrap(), 1);
        assert_eq!(db.carts().get_view(&user_id).await.unwrap().items.len(), 2);
    }

    /// Races two connections for the last unit of stock.
    ///
    /// Runs on a file-backed multi-connection pool: the in-memory
    /// config pins the pool to one connection, which would serialize
    /// the checkouts and leave the contended path untested. The loser
    /// must surface InsufficientStock, never a lock error.
    #[tokio::test]
    async fn test_concurrent_checkouts_for_last_unit() {
        let path = std::env::temp_dir().join(format!("bazaar-race-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path)).await.unwrap();

        let first = seed_customer(&db, "first@example.com").await;
        let second = seed_customer(&db, "second@example.com").await;

        for round in 0..20 {
            let product_id =
                seed_product(&db, &format!("Last Unit {round}"), 5_000, 1).await;
            db.carts().add_item(&first, &product_id, 1).await.unwrap();
            db.carts().add_item(&second, &product_id, 1).await.unwrap();

            let (db_a, db_b) = (db.clone(), db.clone());
            let (user_a, user_b) = (first.clone(), second.clone());
            let task_a =
                tokio::spawn(async move { db_a.billing().generate_bill(&user_a).await });
            let task_b =
                tokio::spawn(async move { db_b.billing().generate_bill(&user_b).await });
            let (a, b) = (task_a.await.unwrap(), task_b.await.unwrap());

            // Exactly one winner, and stock never goes negative.
            let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
            assert_eq!(successes, 1, "round {round}");

            let first_lost = a.is_err();
            let loser = if first_lost { a } else { b };
            let err = loser.unwrap_err();
            assert!(is_insufficient(&err), "round {round}: {err:?}");

            assert_eq!(db.billing().current_stock(&product_id).await.unwrap(), 0);

            // The winner's cart was cleared by checkout; drop the
            // loser's stale line so it cannot leak into later rounds.
            let loser_user = if first_lost { &first } else { &second };
            db.carts().remove_item(loser_user, &product_id).await.unwrap();
        }

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(format!("{}-wal", path.display()));
        let _ = std::fs::remove_file(format!("{}-shm", path.display()));
    }

    #[tokio::test]
    async fn test_bill_is_immutable_under_price_changes() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 10_000, 10).await;

        db.carts().add_item(&user_id, &product_id, 2).await.unwrap();
        let bill = db.billing().generate_bill(&user_id).await.unwrap();

        // Reprice the product after checkout.
        db.products()
            .update(
                &product_id,
                ProductInput {
                    name: "Widget".to_string(),
                    description: String::new(),
                    price_cents: 99_900,
                    quantity: 8,
                },
            )
            .await
            .unwrap();

        let reread = db
            .bills()
            .get_for_user(&user_id, &bill.bill.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reread.bill.total_cents, 20_000);
        assert_eq!(reread.items[0].price_cents, 10_000);
        assert_eq!(reread.items[0].name_snapshot, "Widget");
    }

    #[tokio::test]
    async fn test_total_is_sum_of_frozen_line_totals() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let a = seed_product(&db, "Alpha", 1_234, 50).await;
        let b = seed_product(&db, "Beta", 567, 50).await;

        db.carts().add_item(&user_id, &a, 3).await.unwrap();
        db.carts().add_item(&user_id, &b, 7).await.unwrap();

        let bill = db.billing().generate_bill(&user_id).await.unwrap();

        let item_sum: i64 = bill
            .items
            .iter()
            .map(|i| i.price_cents * i.quantity)
            .sum();
        assert_eq!(bill.bill.total_cents, item_sum);
        assert_eq!(bill.bill.total_cents, 3 * 1_234 + 7 * 567);
    }
}
