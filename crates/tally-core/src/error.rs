//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                          │
//! │  ├── MoneyError       - Amount parsing / overflow failures              │
//! │  ├── ValidationError  - Bad user input (non-fatal, collected)           │
//! │  └── EngineError      - Structural impossibility (calculation aborts)   │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  HTTP API errors (in server)                                            │
//! │  └── ApiError         - What the frontend sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → DbError → ApiError → Frontend    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, participant id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Validation errors are collected, not short-circuited, so the caller
//!    can report every problem at once

use serde::Serialize;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Money Error
// =============================================================================

/// Errors from parsing or constructing monetary amounts.
///
/// Floating point is permitted only at input boundaries; these errors guard
/// that boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoneyError {
    /// Input value is NaN or infinite.
    #[error("amount is not a finite number")]
    NotFinite,

    /// Input string cannot be read as a decimal amount.
    #[error("malformed amount: '{0}'")]
    Malformed(String),

    /// Amount exceeds the configured maximum (overflow guard).
    #[error("amount exceeds the maximum supported value")]
    TooLarge,

    /// Amount is negative where positivity is required.
    #[error("amount must not be negative")]
    Negative,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. `Bill::validate`
/// collects all of them instead of stopping at the first, so a form can
/// highlight every offending field in one pass.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// A required field is missing or empty after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (zero is allowed).
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. malformed amount string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A bill needs at least one participant before it can be calculated.
    #[error("at least one participant is required")]
    NoParticipants,

    /// An item's consumer set references a participant that doesn't exist.
    ///
    /// The allocation engine self-heals by filtering these out at
    /// calculation time (filter-and-warn, never a hard failure there);
    /// `validate` still reports them so the API layer can reject malformed
    /// input at creation time.
    #[error("item {item_id} references unknown participant {participant_id}")]
    DanglingConsumerReference {
        item_id: String,
        participant_id: String,
    },

    /// An item lists the same participant more than once. Consumer sets
    /// are sets: a repeated id would hand that participant two shares of
    /// the item. The engine counts each id once regardless; `validate`
    /// reports the duplicate so the API layer can reject it.
    #[error("item {item_id} lists participant {participant_id} more than once")]
    DuplicateConsumerReference {
        item_id: String,
        participant_id: String,
    },
}

// =============================================================================
// Engine Error
// =============================================================================

/// Structural impossibilities that abort a split calculation.
///
/// Everything else (dangling consumers, zero-consumer items) is a warning
/// surfaced alongside the result — `compute_split` either returns a fully
/// reconciled result or one of these, never a partial total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The bill has zero participants at calculation time.
    #[error("cannot split a bill with no participants")]
    EmptyParticipantSet,

    /// The resolved tip amount is negative (malformed tip policy).
    #[error("resolved tip amount is negative: {0}")]
    NegativeTip(Money),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
