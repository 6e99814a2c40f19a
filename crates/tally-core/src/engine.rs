//! # Split Allocation Engine
//!
//! Turns a bill snapshot into a per-participant monetary breakdown that
//! reconciles exactly with the grand total in minor units.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       compute_split(&bill)                              │
//! │                                                                         │
//! │  1. subtotal = Σ line_total over ALL items                              │
//! │     (zero-consumer items still count — the money was spent)             │
//! │                                                                         │
//! │  2. Per item: filter consumers to valid, distinct participant ids       │
//! │     └── dropped id  → SplitWarning::DanglingConsumer                    │
//! │     └── repeated id → SplitWarning::DuplicateConsumer (counted once)    │
//! │     └── none left   → SplitWarning::UnassignedItem (absorbed slack)     │
//! │                                                                         │
//! │  3. Per item with k consumers: everyone gets line_total div k,          │
//! │     the first (line_total mod k) consumers IN LIST ORDER get one        │
//! │     extra minor unit  ⇒  Σ shares == line_total, exactly                │
//! │                                                                         │
//! │  4. tip = subtotal × rate (half-up)  |  fixed amount                    │
//! │                                                                         │
//! │  5. Tip split proportionally to each participant's attributed           │
//! │     subtotal, floors first, leftover cents in participant order         │
//! │     ⇒  Σ tip_share == tip, exactly                                      │
//! │     (nothing attributed? → equal split across all participants)         │
//! │                                                                         │
//! │  6. total[p] = item_subtotal[p] + tip_share[p]                          │
//! │     Σ total == grand_total − unattributed, by construction —            │
//! │     no rounding happens after steps 3 and 5                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure function over an immutable snapshot: no I/O, no
//! mutation, safely callable from any thread. It either returns a fully
//! reconciled [`SplitResult`] or an [`EngineError`] — never a partial total.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use ts_rs::TS;

use crate::bill::Bill;
use crate::error::{EngineError, EngineResult};
use crate::money::{Currency, Money};

// =============================================================================
// Output Types
// =============================================================================

/// One participant's slice of the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantShare {
    pub participant_id: String,
    pub participant_name: String,

    /// Sum of this participant's per-item shares, pre-tip.
    pub item_subtotal: Money,

    /// This participant's slice of the tip.
    pub tip_share: Money,

    /// item_subtotal + tip_share.
    pub total: Money,
}

/// Non-fatal irregularities surfaced alongside a split result.
///
/// These never abort a calculation — the engine self-heals and reports.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitWarning {
    /// An item's consumer set referenced a participant that no longer
    /// exists; the reference was filtered out.
    #[error("item {item_id} referenced removed participant {participant_id}")]
    DanglingConsumer {
        item_id: String,
        participant_id: String,
    },

    /// An item listed the same participant more than once; the repeat was
    /// dropped so they receive a single share, not two.
    #[error("item {item_id} listed participant {participant_id} more than once")]
    DuplicateConsumer {
        item_id: String,
        participant_id: String,
    },

    /// An item had no valid consumers. Its cost counts toward the bill
    /// subtotal but is attributed to nobody (absorbed slack).
    #[error("item {item_id} is not assigned to any participant")]
    UnassignedItem { item_id: String },
}

/// The computed split: totals plus an ordered per-participant breakdown.
///
/// ## Reconciliation Invariant
/// `Σ shares[].total + unattributed == grand_total`, exactly, in minor
/// units. When every item has at least one valid consumer, `unattributed`
/// is zero and the per-participant totals alone sum to the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitResult {
    pub bill_id: String,
    pub currency: Currency,

    /// Σ line_total over all items, pre-tip.
    pub subtotal: Money,

    /// Resolved tip amount.
    pub tip_amount: Money,

    /// subtotal + tip_amount.
    pub grand_total: Money,

    /// Cost of items nobody valid consumed (absorbed slack, usually zero).
    pub unattributed: Money,

    /// Per-participant breakdown in participant insertion order.
    pub shares: Vec<ParticipantShare>,

    /// Non-fatal irregularities encountered during calculation.
    pub warnings: Vec<SplitWarning>,
}

// =============================================================================
// Remainder Distribution
// =============================================================================

/// Splits `total` minor units into `k` shares that sum to `total` exactly,
/// each within one minor unit of every other.
///
/// Every share gets `total div k`; the first `total mod k` positions get
/// one extra minor unit. Position order is the caller's stable list order,
/// which makes the whole split deterministic.
fn distribute_evenly(total: i64, k: usize) -> Vec<i64> {
    debug_assert!(k > 0, "cannot distribute among zero shares");
    let k_i64 = k as i64;
    let base = total / k_i64;
    let remainder = (total % k_i64) as usize;

    (0..k)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the per-participant split for a bill snapshot.
///
/// Pure and deterministic: calling it twice on the same snapshot yields
/// identical results.
///
/// ## Errors
/// - [`EngineError::EmptyParticipantSet`] — no participants at calculation
///   time
/// - [`EngineError::NegativeTip`] — the resolved tip amount is negative
///
/// Dangling consumer references and unassigned items are warnings in the
/// result, not errors (filter-and-warn keeps the calculation always
/// satisfiable).
pub fn compute_split(bill: &Bill) -> EngineResult<SplitResult> {
    if bill.participants.is_empty() {
        return Err(EngineError::EmptyParticipantSet);
    }

    let mut warnings = Vec::new();

    // Stable participant order drives every distribution below.
    let index_of: HashMap<&str, usize> = bill
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();
    let mut item_subtotals = vec![0i64; bill.participants.len()];

    // Step 1: subtotal over ALL items, attributed or not.
    let subtotal: Money = bill.items.iter().map(|item| item.line_total()).sum();

    // Steps 2-3: per-item attribution with exact remainder distribution.
    for item in &bill.items {
        let mut seen = HashSet::new();
        let consumers: Vec<usize> = item
            .consumed_by
            .iter()
            .filter_map(|pid| match index_of.get(pid.as_str()) {
                Some(&idx) if seen.insert(idx) => Some(idx),
                Some(_) => {
                    warnings.push(SplitWarning::DuplicateConsumer {
                        item_id: item.id.clone(),
                        participant_id: pid.clone(),
                    });
                    None
                }
                None => {
                    warnings.push(SplitWarning::DanglingConsumer {
                        item_id: item.id.clone(),
                        participant_id: pid.clone(),
                    });
                    None
                }
            })
            .collect();

        if consumers.is_empty() {
            warnings.push(SplitWarning::UnassignedItem {
                item_id: item.id.clone(),
            });
            continue;
        }

        let line_shares = distribute_evenly(item.line_total().minor(), consumers.len());
        for (&participant_idx, share) in consumers.iter().zip(line_shares) {
            item_subtotals[participant_idx] += share;
        }
    }

    let attributed_total: i64 = item_subtotals.iter().sum();

    // Step 4: resolve the tip once, from the active policy only.
    let tip = bill.tip_policy.resolve(subtotal);
    if tip.is_negative() {
        return Err(EngineError::NegativeTip(tip));
    }

    // Step 5: distribute the tip exactly.
    let tip_shares = distribute_tip(tip.minor(), &item_subtotals, attributed_total);

    // Step 6: assemble. No rounding happens past this point.
    let shares: Vec<ParticipantShare> = bill
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| ParticipantShare {
            participant_id: p.id.clone(),
            participant_name: p.name.clone(),
            item_subtotal: Money::from_minor(item_subtotals[i]),
            tip_share: Money::from_minor(tip_shares[i]),
            total: Money::from_minor(item_subtotals[i] + tip_shares[i]),
        })
        .collect();

    let grand_total = subtotal + tip;
    let unattributed = Money::from_minor(subtotal.minor() - attributed_total);

    debug_assert_eq!(
        shares.iter().map(|s| s.total.minor()).sum::<i64>() + unattributed.minor(),
        grand_total.minor(),
        "split failed to reconcile"
    );

    Ok(SplitResult {
        bill_id: bill.id.clone(),
        currency: bill.currency.clone(),
        subtotal,
        tip_amount: tip,
        grand_total,
        unattributed,
        shares,
        warnings,
    })
}

/// Distributes `tip` minor units proportionally to `item_subtotals`.
///
/// Floors first (truncation toward zero), then the leftover minor units go
/// one each to participants with a nonzero attributed subtotal, in stable
/// participant order. When nothing was attributable the tip is split
/// equally across everyone with the same largest-remainder technique.
fn distribute_tip(tip: i64, item_subtotals: &[i64], attributed_total: i64) -> Vec<i64> {
    let n = item_subtotals.len();
    if tip == 0 {
        return vec![0; n];
    }

    if attributed_total <= 0 {
        // Nobody has an attributable share; split the tip equally.
        return distribute_evenly(tip, n);
    }

    let mut shares: Vec<i64> = item_subtotals
        .iter()
        .map(|&sub| {
            Money::from_minor(tip)
                .mul_rational(sub, attributed_total)
                .minor()
        })
        .collect();

    // Truncation can leave at most (participants with a share − 1) cents.
    let mut leftover = tip - shares.iter().sum::<i64>();
    for (i, &sub) in item_subtotals.iter().enumerate() {
        if leftover == 0 {
            break;
        }
        if sub > 0 {
            shares[i] += 1;
            leftover -= 1;
        }
    }
    debug_assert_eq!(leftover, 0, "tip distribution failed to reconcile");

    shares
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TipPolicy;
    use proptest::prelude::*;

    fn bill_with(names: &[&str]) -> (Bill, Vec<String>) {
        let mut bill = Bill::new("Dinner", Currency::new("USD"));
        let ids = names
            .iter()
            .map(|n| bill.add_participant(n, None))
            .collect();
        (bill, ids)
    }

    /// The concrete scenario from the product brief: $10.00 three ways
    /// with a 10% tip.
    #[test]
    fn test_ten_dollars_three_ways_ten_percent() {
        let (mut bill, ids) = bill_with(&["A", "B", "C"]);
        bill.add_item("Shared platter", Money::from_minor(1000), 1, ids);
        bill.set_tip_policy(TipPolicy::Percentage { rate_bps: 1000 });

        let result = compute_split(&bill).unwrap();

        assert_eq!(result.subtotal.minor(), 1000);
        assert_eq!(result.tip_amount.minor(), 100);
        assert_eq!(result.grand_total.minor(), 1100);
        assert!(result.unattributed.is_zero());
        assert!(result.warnings.is_empty());

        // Remainder cent goes to the first consumer in list order.
        let item_shares: Vec<i64> = result.shares.iter().map(|s| s.item_subtotal.minor()).collect();
        assert_eq!(item_shares, vec![334, 333, 333]);

        let tip_shares: Vec<i64> = result.shares.iter().map(|s| s.tip_share.minor()).collect();
        assert_eq!(tip_shares.iter().sum::<i64>(), 100);
        assert_eq!(tip_shares, vec![34, 33, 33]);

        let total: i64 = result.shares.iter().map(|s| s.total.minor()).sum();
        assert_eq!(total, 1100);
    }

    #[test]
    fn test_zero_consumer_item_is_absorbed_slack() {
        let (mut bill, ids) = bill_with(&["A", "B"]);
        bill.add_item("Shared", Money::from_minor(600), 1, ids);
        bill.add_item("Mystery", Money::from_minor(1000), 1, vec![]);

        let result = compute_split(&bill).unwrap();

        // Counts toward the subtotal, attributed to nobody.
        assert_eq!(result.subtotal.minor(), 1600);
        assert_eq!(result.unattributed.minor(), 1000);
        for share in &result.shares {
            assert_eq!(share.item_subtotal.minor(), 300);
        }
        assert_eq!(
            result.warnings,
            vec![SplitWarning::UnassignedItem {
                item_id: bill.items[1].id.clone()
            }]
        );
    }

    #[test]
    fn test_dangling_consumer_is_filtered_with_warning() {
        let (mut bill, mut ids) = bill_with(&["A", "B", "C"]);
        let ghost = ids.remove(2);
        bill.add_item("Wine", Money::from_minor(900), 1, bill.participants.iter().map(|p| p.id.clone()).collect());
        bill.remove_participant(&ghost);
        // Simulate a stale snapshot: re-insert the removed id directly.
        bill.items[0].consumed_by.push(ghost.clone());

        let result = compute_split(&bill).unwrap();

        assert_eq!(
            result.warnings,
            vec![SplitWarning::DanglingConsumer {
                item_id: bill.items[0].id.clone(),
                participant_id: ghost,
            }]
        );
        // The two remaining participants absorb the full line.
        let attributed: i64 = result.shares.iter().map(|s| s.item_subtotal.minor()).sum();
        assert_eq!(attributed, 900);
        assert!(result.unattributed.is_zero());
    }

    /// A repeated id in a consumer list must not buy that participant a
    /// second share of the item.
    #[test]
    fn test_repeated_consumer_id_counts_once() {
        let (mut bill, ids) = bill_with(&["A", "B"]);
        let a = ids[0].clone();
        let b = ids[1].clone();
        bill.add_item("Wine", Money::from_minor(900), 1, vec![a.clone(), a.clone(), b]);

        let result = compute_split(&bill).unwrap();

        // An even two-way split, not 2/3 vs 1/3.
        let item_shares: Vec<i64> = result.shares.iter().map(|s| s.item_subtotal.minor()).collect();
        assert_eq!(item_shares, vec![450, 450]);
        assert_eq!(result.grand_total.minor(), 900);
        assert!(result.unattributed.is_zero());

        assert_eq!(
            result.warnings,
            vec![SplitWarning::DuplicateConsumer {
                item_id: bill.items[0].id.clone(),
                participant_id: a,
            }]
        );
    }

    #[test]
    fn test_fixed_tip_is_used_verbatim() {
        let (mut bill, ids) = bill_with(&["A", "B"]);
        bill.add_item("Meal", Money::from_minor(2000), 1, ids);
        bill.set_tip_policy(TipPolicy::Fixed {
            amount: Money::from_minor(555),
        });

        let result = compute_split(&bill).unwrap();

        assert_eq!(result.tip_amount.minor(), 555);
        assert_eq!(result.grand_total.minor(), 2555);
        let tip_sum: i64 = result.shares.iter().map(|s| s.tip_share.minor()).sum();
        assert_eq!(tip_sum, 555);
    }

    #[test]
    fn test_equal_subtotals_get_near_equal_tip_shares() {
        let (mut bill, ids) = bill_with(&["A", "B", "C"]);
        for id in &ids {
            bill.add_item("Entree", Money::from_minor(1500), 1, vec![id.clone()]);
        }
        bill.set_tip_policy(TipPolicy::Percentage { rate_bps: 1000 });

        let result = compute_split(&bill).unwrap();

        let tip_shares: Vec<i64> = result.shares.iter().map(|s| s.tip_share.minor()).collect();
        let min = tip_shares.iter().min().unwrap();
        let max = tip_shares.iter().max().unwrap();
        assert!(max - min <= 1);
        assert_eq!(tip_shares.iter().sum::<i64>(), 450);
    }

    #[test]
    fn test_tip_with_nothing_attributed_splits_equally() {
        let (mut bill, _ids) = bill_with(&["A", "B", "C"]);
        bill.add_item("Mystery", Money::from_minor(1000), 1, vec![]);
        bill.set_tip_policy(TipPolicy::Fixed {
            amount: Money::from_minor(100),
        });

        let result = compute_split(&bill).unwrap();

        let tip_shares: Vec<i64> = result.shares.iter().map(|s| s.tip_share.minor()).collect();
        assert_eq!(tip_shares, vec![34, 33, 33]);
    }

    #[test]
    fn test_tip_leftover_cents_skip_zero_subtotal_participants() {
        // C consumed nothing; leftover tip cents must not land on them.
        let (mut bill, ids) = bill_with(&["A", "B", "C"]);
        bill.add_item("Steak", Money::from_minor(997), 1, vec![ids[0].clone()]);
        bill.add_item("Salad", Money::from_minor(503), 1, vec![ids[1].clone()]);
        bill.set_tip_policy(TipPolicy::Fixed {
            amount: Money::from_minor(101),
        });

        let result = compute_split(&bill).unwrap();

        assert_eq!(result.shares[2].item_subtotal.minor(), 0);
        assert_eq!(result.shares[2].tip_share.minor(), 0);
        let tip_sum: i64 = result.shares.iter().map(|s| s.tip_share.minor()).sum();
        assert_eq!(tip_sum, 101);
    }

    #[test]
    fn test_empty_participant_set_is_an_error() {
        let bill = Bill::new("Ghost town", Currency::default());
        assert_eq!(
            compute_split(&bill).unwrap_err(),
            EngineError::EmptyParticipantSet
        );
    }

    #[test]
    fn test_negative_fixed_tip_is_an_error() {
        let (mut bill, ids) = bill_with(&["A"]);
        bill.add_item("Meal", Money::from_minor(1000), 1, ids);
        bill.set_tip_policy(TipPolicy::Fixed {
            amount: Money::from_minor(-100),
        });

        assert!(matches!(
            compute_split(&bill).unwrap_err(),
            EngineError::NegativeTip(_)
        ));
    }

    #[test]
    fn test_idempotence() {
        let (mut bill, ids) = bill_with(&["A", "B", "C"]);
        bill.add_item("Pizza", Money::from_minor(1999), 1, ids.clone());
        bill.add_item("Beer", Money::from_minor(650), 3, vec![ids[0].clone(), ids[2].clone()]);
        bill.set_tip_policy(TipPolicy::Percentage { rate_bps: 1250 });

        let first = compute_split(&bill).unwrap();
        let second = compute_split(&bill).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distribute_evenly() {
        assert_eq!(distribute_evenly(1000, 3), vec![334, 333, 333]);
        assert_eq!(distribute_evenly(1000, 4), vec![250, 250, 250, 250]);
        assert_eq!(distribute_evenly(1, 3), vec![1, 0, 0]);
        assert_eq!(distribute_evenly(0, 2), vec![0, 0]);

        // Shares always sum exactly and stay within 1 of each other.
        for total in [1, 7, 99, 1001, 12345] {
            for k in 1..=10usize {
                let shares = distribute_evenly(total, k);
                assert_eq!(shares.iter().sum::<i64>(), total);
                let min = shares.iter().min().unwrap();
                let max = shares.iter().max().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Property: reconciliation over random bills
    // -------------------------------------------------------------------------

    fn arb_tip_policy() -> impl Strategy<Value = TipPolicy> {
        prop_oneof![
            (0u32..=10_000).prop_map(|rate_bps| TipPolicy::Percentage { rate_bps }),
            (0i64..=5_000).prop_map(|m| TipPolicy::Fixed {
                amount: Money::from_minor(m)
            }),
        ]
    }

    proptest! {
        /// For any bill where every item has at least one valid consumer,
        /// the per-participant totals sum exactly to the grand total.
        #[test]
        fn prop_split_reconciles_exactly(
            n_participants in 1usize..6,
            raw_items in prop::collection::vec((0i64..100_000, 1i64..5, any::<u32>()), 0..8),
            tip_policy in arb_tip_policy(),
        ) {
            let mut bill = Bill::new("Random bill", Currency::new("USD"));
            let ids: Vec<String> = (0..n_participants)
                .map(|i| bill.add_participant(&format!("P{i}"), None))
                .collect();

            for (price, qty, consumer_seed) in raw_items {
                // Non-empty subset of participants, chosen by bitmask.
                let mask_space = (1u32 << n_participants) - 1;
                let mask = (consumer_seed % mask_space) + 1;
                let consumers: Vec<String> = ids
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, id)| id.clone())
                    .collect();
                bill.add_item("Item", Money::from_minor(price), qty, consumers);
            }
            bill.set_tip_policy(tip_policy);

            let result = compute_split(&bill).unwrap();

            prop_assert_eq!(result.unattributed.minor(), 0);
            prop_assert_eq!(
                result.grand_total.minor(),
                result.subtotal.minor() + result.tip_amount.minor()
            );
            let sum: i64 = result.shares.iter().map(|s| s.total.minor()).sum();
            prop_assert_eq!(sum, result.grand_total.minor());
        }

        /// Even with unattributed items, the slack accounting identity
        /// holds: participant totals plus slack equal the grand total.
        #[test]
        fn prop_slack_accounting_identity(
            n_participants in 1usize..5,
            prices in prop::collection::vec(0i64..50_000, 1..6),
            tip_policy in arb_tip_policy(),
        ) {
            let mut bill = Bill::new("Slack bill", Currency::new("USD"));
            let ids: Vec<String> = (0..n_participants)
                .map(|i| bill.add_participant(&format!("P{i}"), None))
                .collect();

            // Alternate between attributed and unattributed items.
            for (i, price) in prices.iter().enumerate() {
                let consumers = if i % 2 == 0 { ids.clone() } else { vec![] };
                bill.add_item("Item", Money::from_minor(*price), 1, consumers);
            }
            bill.set_tip_policy(tip_policy);

            let result = compute_split(&bill).unwrap();

            let sum: i64 = result.shares.iter().map(|s| s.total.minor()).sum();
            prop_assert_eq!(
                sum + result.unattributed.minor(),
                result.grand_total.minor()
            );
        }
    }
}
