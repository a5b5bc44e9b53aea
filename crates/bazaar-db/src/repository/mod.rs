//! # Repository Modules
//!
//! One repository per aggregate. Each wraps the shared `SqlitePool`
//! and exposes typed operations; cross-aggregate writes (checkout)
//! live in [`crate::checkout`] instead.

pub mod bill;
pub mod cart;
pub mod product;
pub mod user;
