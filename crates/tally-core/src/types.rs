//! # Domain Types
//!
//! Core domain types for Tally bills.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │   Participant   │   │      Item       │   │    TipPolicy    │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (String)    │   │  id (String)    │   │  Percentage     │        │
//! │  │  name           │   │  name           │   │   { rate_bps }  │        │
//! │  │  email?         │   │  unit_price     │   │  Fixed          │        │
//! │  └─────────────────┘   │  quantity       │   │   { amount }    │        │
//! │                        │  consumed_by[]  │   └─────────────────┘        │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All three are explicit records with validated constructors on the `Bill`
//! aggregate — absence of a field is a deserialization error, not an
//! undefined read.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Participant
// =============================================================================

/// A person taking part in the bill.
///
/// ## Identity
/// `id` is an opaque string assigned at creation (`participant_<uuid>`),
/// stable for the lifetime of the bill. Display names are not required to
/// be unique — two Alexes at one table is normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    /// Opaque stable identifier.
    pub id: String,

    /// Display name, non-empty after trimming.
    pub name: String,

    /// Optional contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// =============================================================================
// Item
// =============================================================================

/// A priced line on the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Opaque stable identifier (`item_<uuid>`).
    pub id: String,

    /// Item name, non-empty after trimming.
    pub name: String,

    /// Unit price in minor units, ≥ 0.
    pub unit_price: Money,

    /// Positive integer quantity, default 1.
    pub quantity: i64,

    /// Participant ids who consumed this item. Order is kept as given —
    /// the engine's remainder distribution depends on it being stable.
    /// An empty set means the cost is counted in the bill subtotal but
    /// attributed to nobody.
    pub consumed_by: Vec<String>,
}

impl Item {
    /// Line total = unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Tip Policy
// =============================================================================

/// How the gratuity is computed for a bill.
///
/// An explicit two-case sum type: exactly one variant is active per
/// calculation, resolved once before any arithmetic. This replaces the
/// "check which tip field is truthy" pattern — if a client sends both a
/// rate and a fixed value, only the variant it actually encodes is honored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TipPolicy {
    /// Tip as a fraction of the pre-tip subtotal, in basis points
    /// (1 bps = 0.01%, so 1000 = 10%).
    Percentage { rate_bps: u32 },

    /// Flat tip amount in minor units.
    Fixed { amount: Money },
}

impl TipPolicy {
    /// No tip.
    pub const fn none() -> Self {
        TipPolicy::Percentage { rate_bps: 0 }
    }

    /// Resolves the tip amount for a given pre-tip subtotal.
    ///
    /// Percentage tips round half-up to minor units. The result may be
    /// negative only for a malformed fixed amount; the engine rejects that
    /// case.
    pub fn resolve(&self, subtotal: Money) -> Money {
        match *self {
            TipPolicy::Percentage { rate_bps } => subtotal.percentage_bps(rate_bps),
            TipPolicy::Fixed { amount } => amount,
        }
    }
}

impl Default for TipPolicy {
    fn default() -> Self {
        TipPolicy::none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = Item {
            id: "item_1".to_string(),
            name: "Coffee".to_string(),
            unit_price: Money::from_minor(350),
            quantity: 3,
            consumed_by: vec![],
        };
        assert_eq!(item.line_total().minor(), 1050);
    }

    #[test]
    fn test_tip_policy_resolve() {
        let subtotal = Money::from_minor(1000);

        let percentage = TipPolicy::Percentage { rate_bps: 1000 };
        assert_eq!(percentage.resolve(subtotal).minor(), 100);

        let fixed = TipPolicy::Fixed {
            amount: Money::from_minor(250),
        };
        assert_eq!(fixed.resolve(subtotal).minor(), 250);

        assert_eq!(TipPolicy::none().resolve(subtotal).minor(), 0);
    }

    #[test]
    fn test_tip_policy_serde_tagging() {
        let json = serde_json::to_value(TipPolicy::Percentage { rate_bps: 1000 }).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["rate_bps"], 1000);

        let parsed: TipPolicy =
            serde_json::from_str(r#"{"type":"fixed","amount":500}"#).unwrap();
        assert_eq!(
            parsed,
            TipPolicy::Fixed {
                amount: Money::from_minor(500)
            }
        );
    }
}
