//! # Cart Repository
//!
//! Database operations for a customer's cart lines.
//!
//! Each operation is independently atomic and scoped to one customer's
//! single cart; there is no cross-customer contention here. Bulk line
//! deletion on checkout belongs to the billing engine.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{Cart, CartItem};

/// A cart line joined with its product, for display.
///
/// `price_cents` here is the product's *current* price; prices are
/// only frozen at checkout, never in the cart.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

/// A customer's cart with its joined lines.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: String,
    pub items: Vec<CartLineView>,
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets a customer's cart row.
    pub async fn get_by_user(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            SELECT id, user_id, created_at, updated_at
            FROM carts
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Gets a customer's cart with its lines joined to product data.
    pub async fn get_view(&self, user_id: &str) -> DbResult<CartView> {
        let cart = self
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        let items = sqlx::query_as::<_, CartLineView>(
            r#"
            SELECT ci.product_id, p.name, p.price_cents, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?1
            ORDER BY ci.created_at
            "#,
        )
        .bind(&cart.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CartView {
            id: cart.id,
            items,
        })
    }

    /// Adds a product to the customer's cart, accumulating quantity if
    /// the line already exists.
    ///
    /// The caller verifies the product exists beforehand; the foreign
    /// key is the backstop.
    pub async fn add_item(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<CartItem> {
        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "Adding cart item");

        let cart = self
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&cart.id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_item(&cart.id, product_id).await
    }

    /// Sets the quantity of an existing line.
    ///
    /// A target quantity of zero or less deletes the line (`Ok(None)`).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such line in the customer's cart
    pub async fn update_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<Option<CartItem>> {
        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "Updating cart item");

        let cart = self
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        if quantity <= 0 {
            self.delete_item(&cart.id, product_id).await?;
            return Ok(None);
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE cart_items SET quantity = ?3, updated_at = ?4
            WHERE cart_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(&cart.id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", product_id));
        }

        Ok(Some(self.get_item(&cart.id, product_id).await?))
    }

    /// Removes a line from the customer's cart.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such line in the customer's cart
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, product_id = %product_id, "Removing cart item");

        let cart = self
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        self.delete_item(&cart.id, product_id).await
    }

    async fn delete_item(&self, cart_id: &str, product_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", product_id));
        }

        Ok(())
    }

    async fn get_item(&self, cart_id: &str, product_id: &str) -> DbResult<CartItem> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, cart_id, product_id, quantity, created_at, updated_at
            FROM cart_items
            WHERE cart_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Cart item", product_id))?;

        Ok(item)
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

    async fn seed_product(db: &Database, name: &str, quantity: i64) -> String {
        db.products()
            .insert(ProductInput {
                name: name.to_string(),
                description: String::new(),
                price_cents: 500,
                quantity,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_add_item_accumulates_quantity() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 50).await;

        let repo = db.carts();
        let item = repo.add_item(&user_id, &product_id, 2).await.unwrap();
        assert_eq!(item.quantity, 2);

        let item = repo.add_item(&user_id, &product_id, 3).await.unwrap();
        assert_eq!(item.quantity, 5);

        let view = repo.get_view(&user_id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_item_sets_quantity() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 50).await;

        let repo = db.carts();
        repo.add_item(&user_id, &product_id, 2).await.unwrap();

        let item = repo.update_item(&user_id, &product_id, 7).await.unwrap();
        assert_eq!(item.unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn test_update_to_zero_deletes_line() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 50).await;

        let repo = db.carts();
        repo.add_item(&user_id, &product_id, 2).await.unwrap();

        let item = repo.update_item(&user_id, &product_id, 0).await.unwrap();
        assert!(item.is_none());

        let view = repo.get_view(&user_id).await.unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_line() {
        let db = test_db().await;
        let user_id = seed_customer(&db, "c@example.com").await;
        let product_id = seed_product(&db, "Widget", 50).await;

        let err = db
            .carts()
            .remove_item(&user_id, &product_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
