//! # User Repository
//!
//! Database operations for accounts.
//!
//! ## Customer Carts
//! Creating a CUSTOMER account also creates that customer's cart, in
//! the same transaction. This is an explicit call at the end of the
//! creation path, not a storage lifecycle hook: the pair either both
//! exist or neither does.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::{Cart, Role, User};

/// Fields required to create an account.
///
/// `password_hash` is already hashed; this crate never sees plaintext
/// passwords.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub age: i64,
    pub password_hash: String,
    pub role: Role,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account, plus a cart when the role is CUSTOMER.
    ///
    /// ## Returns
    /// The created user and, for customers, their new cart.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - email already registered
    pub async fn create(&self, new_user: NewUser) -> DbResult<(User, Option<Cart>)> {
        debug!(email = %new_user.email, role = ?new_user.role, "Creating user");

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email,
            name: new_user.name,
            age: new_user.age,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, age, password_hash, role, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        let cart = if user.role.can_shop() {
            let cart = Cart {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                created_at: now,
                updated_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO carts (id, user_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&cart.id)
            .bind(&cart.user_id)
            .bind(cart.created_at)
            .bind(cart.updated_at)
            .execute(&mut *tx)
            .await?;

            Some(cart)
        } else {
            None
        };

        tx.commit().await?;

        Ok((user, cart))
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, age, password_hash, role, is_active, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by email (the login lookup).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, age, password_hash, role, is_active, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists the email addresses of active employee accounts, for
    /// inventory alert delivery.
    pub async fn list_employee_emails(&self) -> DbResult<Vec<String>> {
        let emails: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT email FROM users
            WHERE role = ?1 AND is_active = 1
            ORDER BY email
            "#,
        )
        .bind(Role::Employee)
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
