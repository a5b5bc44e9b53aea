//! # Bazaar API
//!
//! REST server for the Bazaar storefront.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Endpoints                                │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Auth          │  │  Catalog       │  │  Shopping (CUSTOMER)       ││
//! │  │                │  │                │  │                            ││
//! │  │ • Register     │  │ • List / Get   │  │ • View cart                ││
//! │  │ • Login        │  │ • Create*      │  │ • Add / set / remove line  ││
//! │  │ • Refresh      │  │ • Update*      │  │ • Generate bill            ││
//! │  │                │  │ • Delete*      │  │ • List / get bills         ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                       * ADMIN | EMPLOYEE                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                              │  │
//! │  │                                                                  │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │  Notifier    │  │    JWT Auth              ││  │
//! │  │  │              │  │              │  │                          ││  │
//! │  │  │ Primary data │  │ Receipts     │  │ Access + refresh tokens  ││  │
//! │  │  │ store        │  │ Stock alerts │  │ Argon2 password hashes   ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP server port (default: 8080)
//! - `DATABASE_PATH` - SQLite database file (default: bazaar.db)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `JWT_REFRESH_LIFETIME_SECS` - Refresh token lifetime (default: 604800)
//! - `STOCK_SCAN_INTERVAL_SECS` - Low-stock scan period (default: 900)
//! - `DAILY_SUMMARY_INTERVAL_SECS` - Inventory summary period (default: 86400)

pub mod auth;
pub mod config;
pub mod error;
pub mod notifier;
pub mod routes;
pub mod state;
pub mod watcher;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;
