//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  bazaar-core errors (this file)                                 │
//! │  ├── CoreError        - Business rule violations                │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  bazaar-db errors (separate crate)                              │
//! │  └── DbError          - Database operation failures             │
//! │                                                                 │
//! │  API errors (apps/api)                                          │
//! │  └── ApiError         - What HTTP clients see (status + body)   │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → ApiError → client          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, field, ...)
//! 3. Errors are enum variants, never bare Strings
//! 4. Display strings for business failures are the exact strings the
//!    API returns to clients

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. The API layer maps each
/// variant to an HTTP status and returns the Display string verbatim.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was requested against a cart with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// A referenced product does not exist (or vanished between
    /// cart-add and checkout).
    #[error("Product not found")]
    ProductNotFound(String),

    /// A cart line requests more units than the product has in stock.
    ///
    /// Carries the offending product name for display. Raised by both
    /// the validation pass and the conditional stock decrement; the
    /// client-visible contract is identical either way.
    #[error("Not enough stock for {name}")]
    InsufficientStock { name: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, when request data does not meet
/// requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is below an allowed minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: i64 },

    /// Numeric value is above an allowed maximum.
    #[error("{field} must be at most {max}")]
    AboveMaximum { field: String, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format")]
    InvalidFormat { field: String },

    /// Two fields that must agree do not.
    #[error("{field} and {other} do not match")]
    Mismatch { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
