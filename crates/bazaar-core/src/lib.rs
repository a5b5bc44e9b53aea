//! # bazaar-core: Pure Business Logic for Bazaar
//!
//! This crate is the heart of the Bazaar backend. It contains domain
//! types and business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Bazaar Architecture                         │
//! │                                                                 │
//! │   HTTP clients ──► apps/api (axum routes, auth, notifier)       │
//! │                        │                                        │
//! │                        ▼                                        │
//! │   ★ bazaar-core (THIS CRATE) ★                                  │
//! │     types • money • roles • validation • errors                 │
//! │     NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │
//! │                        │                                        │
//! │                        ▼                                        │
//! │   bazaar-db (SQLite queries, migrations, billing engine)        │
//! │ ────────────────────────────────────────────────────────────────│
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Cart, Bill, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity below which a product is considered low on stock and
/// employees are alerted.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum quantity of a single product in a cart line.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Minimum age for a registered account.
pub const MIN_ACCOUNT_AGE: i64 = 18;
