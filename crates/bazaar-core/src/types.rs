//! # Domain Types
//!
//! Core domain types used throughout Bazaar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  User ──1:1──► Cart ──1:N──► CartItem ──N:1──► Product          │
//! │   │                                              ▲              │
//! │   └──1:N──► Bill ──1:N──► BillItem ──────N:1─────┘              │
//! │                            (frozen name + unit price)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `BillItem` copies product name and unit price at checkout time so
//! bills remain accurate even when the catalog changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Account role.
///
/// A closed enumeration: every permission decision goes through the
/// capability methods below, never through string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Manages the product catalog, receives inventory alerts.
    Employee,
    /// Owns a cart, places orders.
    Customer,
}

impl Role {
    /// May create, update and delete catalog products.
    #[inline]
    pub const fn can_manage_catalog(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee)
    }

    /// May operate on a cart and generate bills.
    ///
    /// Only customers own carts; admin and employee accounts have none.
    #[inline]
    pub const fn can_shop(&self) -> bool {
        matches!(self, Role::Customer)
    }

    /// Receives inventory alert mail.
    #[inline]
    pub const fn receives_stock_alerts(&self) -> bool {
        matches!(self, Role::Employee)
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login identity, unique.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Age in years, at least 18.
    pub age: i64,

    /// Argon2 password hash. Never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role.
    pub role: Role,

    /// Whether the account may log in.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across the catalog.
    pub name: String,

    pub description: String,

    /// Unit price in cents. Always positive.
    pub price_cents: i64,

    /// Units in stock. Never negative.
    pub quantity: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether `quantity` units can currently be fulfilled.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }

    /// Whether the product is under the employee-alert threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < crate::LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A customer's cart. One per customer, created with the account.
///
/// The cart row itself is long-lived; checkout deletes its lines only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (product, quantity) line within a cart.
///
/// Unique per (cart, product); quantity is always at least 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bill
// =============================================================================

/// An immutable order record produced by checkout.
///
/// Write-once: created exactly once per successful checkout, never
/// updated or deleted thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: String,
    pub user_id: String,
    /// Sum of all line totals at creation time, in cents. Never
    /// recomputed from current product prices.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Returns the bill total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a bill.
///
/// References the product but owns a frozen copy of its name and unit
/// price; later catalog edits do not affect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillItem {
    pub id: String,
    pub bill_id: String,
    pub product_id: String,
    /// Product name at time of purchase (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl BillItem {
    /// Line total (frozen unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// A bill together with its line items, as returned by checkout and
/// the bill read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillWithItems {
    #[serde(flatten)]
    pub bill: Bill,
    pub items: Vec<BillItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
