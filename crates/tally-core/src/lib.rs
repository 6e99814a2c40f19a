//! # tally-core: Pure Business Logic for Tally
//!
//! This crate is the **heart** of Tally, a shared-bill splitting service.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     Frontend (JS)                               │    │
//! │  │   Participants UI ──► Items UI ──► Tip UI ──► Split view        │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    apps/server (axum)                           │    │
//! │  │   POST /api/bills, GET /api/bills/{id}/split, ...               │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ tally-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐           │    │
//! │  │   │  money   │ │   bill   │ │  engine  │ │ receipt  │           │    │
//! │  │   │  Money   │ │   Bill   │ │  Split   │ │ text →   │           │    │
//! │  │   │ Currency │ │  model   │ │  engine  │ │  drafts  │           │    │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘           │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                   tally-db (Database Layer)                     │    │
//! │  │             SQLite queries, migrations, repository              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer minor units (no floating point!) + Currency
//! - [`types`] - Domain types (Participant, Item, TipPolicy)
//! - [`bill`] - The Bill aggregate with validated mutation methods
//! - [`engine`] - The split allocation engine
//! - [`receipt`] - Best-effort receipt-text → item-draft extractor
//! - [`validation`] - Field validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same snapshot in, same split out — always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are minor units (i64); floats
//!    exist only at parse/format boundaries
//! 4. **Exact Reconciliation**: per-participant totals sum to the grand
//!    total by construction, not by a final rounding pass
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::bill::Bill;
//! use tally_core::engine::compute_split;
//! use tally_core::money::{Currency, Money};
//! use tally_core::types::TipPolicy;
//!
//! let mut bill = Bill::new("Team dinner", Currency::new("USD"));
//! let alice = bill.add_participant("Alice", None);
//! let bob = bill.add_participant("Bob", None);
//! bill.add_item("Pizza", Money::from_minor(1899), 1, vec![alice, bob]);
//! bill.set_tip_policy(TipPolicy::Percentage { rate_bps: 1000 });
//!
//! let split = compute_split(&bill).unwrap();
//! assert_eq!(split.grand_total.minor(), 2089); // 18.99 + 1.90 tip
//! let sum: i64 = split.shares.iter().map(|s| s.total.minor()).sum();
//! assert_eq!(sum, split.grand_total.minor());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod engine;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use bill::{new_item_id, new_participant_id, Bill};
pub use engine::{compute_split, ParticipantShare, SplitResult, SplitWarning};
pub use error::{EngineError, MoneyError, ValidationError};
pub use money::{Currency, Money};
pub use receipt::{extract_items, ExtractedReceipt, ItemDraft};
pub use types::{Item, Participant, TipPolicy};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum amount in minor units (overflow guard).
///
/// ## Business Reason
/// 100 million major units is far beyond any restaurant bill; anything
/// larger is a parse glitch or an attack, not input.
pub const MAX_AMOUNT_MINOR: i64 = 100_000_000_00;

/// Maximum quantity of a single item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g. typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum items allowed on a single bill.
pub const MAX_BILL_ITEMS: usize = 200;

/// Maximum length for names and titles, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum percentage tip rate in basis points (100%).
pub const MAX_TIP_RATE_BPS: u32 = 10_000;
