//! # Bill Aggregate
//!
//! The `Bill` is the aggregate root owning participants, items, the tip
//! policy, and the bill's single currency.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Mutation Operations                             │
//! │                                                                         │
//! │  Frontend Action            Bill Method             State Change        │
//! │  ───────────────            ───────────             ────────────        │
//! │                                                                         │
//! │  Add person ──────────────► add_participant() ────► participants.push   │
//! │                                                                         │
//! │  Remove person ───────────► remove_participant() ─► participants.remove │
//! │                                                     + prune consumer    │
//! │                                                       sets (cascade)    │
//! │                                                                         │
//! │  Add line item ───────────► add_item() ───────────► items.push          │
//! │                                                                         │
//! │  Pick tip mode ───────────► set_tip_policy() ─────► tip_policy = ...    │
//! │                                                                         │
//! │  Calculate ───────────────► engine::compute_split(&bill)  (read only)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Participants and items keep insertion order (deterministic display and
//!   deterministic remainder distribution).
//! - `remove_participant` cascades: any item consumer set referencing the
//!   removed id is pruned. UI deletions and engine invocation are not
//!   atomic, so the engine re-filters again at calculation time.
//! - One owner mutates a bill at a time; the engine only ever reads a
//!   snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::{Currency, Money};
use crate::types::{Item, Participant, TipPolicy};
use crate::validation::{validate_name, validate_price, validate_quantity, validate_tip_rate_bps};
use crate::MAX_BILL_ITEMS;

// =============================================================================
// Bill
// =============================================================================

/// A shared bill: who took part, what was bought, and how to tip.
///
/// Fields are public for serialization and storage mapping; use the
/// mutation methods to keep the cascade invariants intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bill {
    /// Opaque stable identifier (`bill_<uuid>`).
    pub id: String,

    /// Bill title, non-empty after trimming.
    pub title: String,

    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The single currency shared by every amount in this bill.
    pub currency: Currency,

    /// Active gratuity rule.
    pub tip_policy: TipPolicy,

    /// Who created the bill ("Anonymous" when not supplied).
    pub created_by: String,

    /// Creation timestamp.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Participants in insertion order.
    pub participants: Vec<Participant>,

    /// Items in insertion order.
    pub items: Vec<Item>,
}

/// Generates a new participant id (`participant_<uuid>`).
pub fn new_participant_id() -> String {
    format!("participant_{}", Uuid::new_v4())
}

/// Generates a new item id (`item_<uuid>`).
pub fn new_item_id() -> String {
    format!("item_{}", Uuid::new_v4())
}

impl Bill {
    /// Creates an empty bill with a generated id.
    pub fn new(title: &str, currency: Currency) -> Self {
        Bill {
            id: format!("bill_{}", Uuid::new_v4()),
            title: title.trim().to_string(),
            description: None,
            currency,
            tip_policy: TipPolicy::default(),
            created_by: "Anonymous".to_string(),
            created_at: Utc::now(),
            participants: Vec::new(),
            items: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Participants
    // -------------------------------------------------------------------------

    /// Adds a participant and returns the generated id.
    ///
    /// The name is stored trimmed; blank emails are dropped.
    pub fn add_participant(&mut self, name: &str, email: Option<&str>) -> String {
        let id = new_participant_id();
        self.participants.push(Participant {
            id: id.clone(),
            name: name.trim().to_string(),
            email: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from),
        });
        id
    }

    /// Removes a participant by id, pruning every item consumer set that
    /// referenced them (cascade). Returns whether the id existed.
    pub fn remove_participant(&mut self, id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        let removed = self.participants.len() < before;

        if removed {
            for item in &mut self.items {
                item.consumed_by.retain(|pid| pid != id);
            }
        }

        removed
    }

    /// Looks up a participant by id.
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// The set of currently valid participant ids.
    pub fn participant_ids(&self) -> HashSet<&str> {
        self.participants.iter().map(|p| p.id.as_str()).collect()
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Adds an item and returns the generated id.
    ///
    /// `consumed_by` is stored as given (order matters for remainder
    /// distribution); an empty set means the cost stays unattributed.
    pub fn add_item(
        &mut self,
        name: &str,
        unit_price: Money,
        quantity: i64,
        consumed_by: Vec<String>,
    ) -> String {
        let id = new_item_id();
        self.items.push(Item {
            id: id.clone(),
            name: name.trim().to_string(),
            unit_price,
            quantity,
            consumed_by,
        });
        id
    }

    /// Removes an item by id. Returns whether the id existed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() < before
    }

    // -------------------------------------------------------------------------
    // Tip
    // -------------------------------------------------------------------------

    /// Replaces the active tip policy.
    pub fn set_tip_policy(&mut self, policy: TipPolicy) {
        self.tip_policy = policy;
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Checks the whole bill and returns **every** problem found.
    ///
    /// An empty vec means the bill is ready to calculate. Dangling consumer
    /// references are reported here even though the engine would tolerate
    /// them — callers creating a bill get a hard 400, callers calculating a
    /// stale snapshot get a warning instead (filter-and-warn policy).
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = validate_name("title", &self.title) {
            errors.push(e);
        }

        if self.participants.is_empty() {
            errors.push(ValidationError::NoParticipants);
        }

        if self.items.len() > MAX_BILL_ITEMS {
            errors.push(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 0,
                max: MAX_BILL_ITEMS as i64,
            });
        }

        for participant in &self.participants {
            if let Err(e) = validate_name("participant name", &participant.name) {
                errors.push(e);
            }
        }

        if let TipPolicy::Percentage { rate_bps } = self.tip_policy {
            if let Err(e) = validate_tip_rate_bps(rate_bps) {
                errors.push(e);
            }
        }
        if let TipPolicy::Fixed { amount } = self.tip_policy {
            if amount.is_negative() {
                errors.push(ValidationError::MustBeNonNegative {
                    field: "tip_amount".to_string(),
                });
            }
        }

        let known_ids = self.participant_ids();
        for item in &self.items {
            if let Err(e) = validate_name("item name", &item.name) {
                errors.push(e);
            }
            if let Err(e) = validate_price(item.unit_price) {
                errors.push(e);
            }
            if let Err(e) = validate_quantity(item.quantity) {
                errors.push(e);
            }
            let mut seen = HashSet::new();
            for pid in &item.consumed_by {
                if !known_ids.contains(pid.as_str()) {
                    errors.push(ValidationError::DanglingConsumerReference {
                        item_id: item.id.clone(),
                        participant_id: pid.clone(),
                    });
                } else if !seen.insert(pid.as_str()) {
                    errors.push(ValidationError::DuplicateConsumerReference {
                        item_id: item.id.clone(),
                        participant_id: pid.clone(),
                    });
                }
            }
        }

        errors
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
