//! # bazaar-db: SQLite Persistence for Bazaar
//!
//! All database access lives here: the connection pool, embedded
//! migrations, per-entity repositories, and the checkout transaction.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         bazaar-db                               │
//! │                                                                 │
//! │  pool        DbConfig + Database handle (repo accessors)        │
//! │  migrations  sqlx::migrate! embedded SQL                        │
//! │  repository  users / products / carts / bills                   │
//! │  checkout    BillingEngine - the cart→bill transaction          │
//! │  error       DbError + DbResult                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are runtime-checked (`query_as` + derived `FromRow`), so
//! the crate builds without a database present.

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use checkout::{BillingEngine, CheckoutError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
