//! # Receipt Text Extractor
//!
//! Best-effort conversion of free-form receipt text (OCR output or a
//! manual paste) into candidate item drafts.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     extract_items(text)                                 │
//! │                                                                         │
//! │  raw multi-line text                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  skip header lines (чек, date, касса, order, ...)                       │
//! │  skip summary lines (итого, total, налог, card, ...)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per remaining line: regex price extraction → name cleanup → filter     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  zero or more { name, unit_price } drafts + running total estimate      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a heuristic classifier, explicitly NOT exact: no guarantee that
//! Σ draft prices equals the printed receipt total, and no error path — any
//! input, including binary garbage, yields zero or more syntactically valid
//! drafts. The bill model treats the output purely as pre-filled,
//! user-editable item drafts.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use ts_rs::TS;

use crate::money::{Currency, Money};

// =============================================================================
// Output Types
// =============================================================================

/// A candidate line item extracted from receipt text.
///
/// Drafts have no id and no consumer assignment — those are added when the
/// user accepts the draft into a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemDraft {
    pub name: String,
    pub unit_price: Money,
}

/// Extractor output: drafts plus a running total estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtractedReceipt {
    /// Candidate items in the order they appeared.
    pub items: Vec<ItemDraft>,

    /// Sum of the candidate prices. An estimate only — summary lines are
    /// skipped, so this is NOT the printed receipt total.
    pub total: Money,

    /// Currency guessed from symbols in the text.
    pub currency: Currency,
}

// =============================================================================
// Heuristics
// =============================================================================

/// Words that mark receipt header/metadata lines (mixed RU/EN, lowercase).
const HEADER_KEYWORDS: &[&str] = &[
    "чек", "чек №", "date", "дата", "время", "time", "касса", "смена", "оператор", "order",
    "заказ", "фискальный", "фн", "фд", "фпд", "регистратор", "наименование", "цена", "кол-во",
    "сумма",
];

/// Words that mark summary/total/payment lines to exclude.
const TOTAL_KEYWORDS: &[&str] = &[
    "итого", "всего", "total", "сумма", "оплата", "налог", "ндс", "сдача", "change", "внесено",
    "наличными", "картой", "cash", "card", "credit",
];

/// Leading unit/packaging words that are not item names.
const UNIT_WORDS: &[&str] = &["шт", "kg", "кг", "pcs", "уп", "упак", "пак", "набор", "компл"];

/// Price patterns tried in order; the first match wins.
///
/// Group 1 captures the price; the "bare integer with optional kopecks"
/// pattern also has group 2 for the fraction digits.
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+[.,]\d{2})\s*$",       // 123.45 at end of line
        r"\s(\d+[.,]\d{2})\s",       // 123.45 mid-line
        r"\s(\d+)[.,]?(\d{2})?\s*$", // 123 or 123 45 at end of line
        r"[x×*]\s*(\d+[.,]\d{2})",   // x 123.45
        r"[x×*]\s*(\d+)",            // x 123
        r"\s(\d+)\s*р",              // 123 р
        r"\s(\d+)\s*руб",            // 123 руб
        r"\s(\d+)\s*₽",              // 123 ₽
        r"\$(\d+[.,]\d{2})",         // $123.45
        r"€(\d+[.,]\d{2})",          // €123.45
        r"£(\d+[.,]\d{2})",          // £123.45
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid price pattern"))
    .collect()
});

static LEADING_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.,]?\d*\s*[x×*]\s*").expect("valid regex"));

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-zА-Яа-яЁё0-9\s\-]").expect("valid regex"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static DIGITS_AND_PUNCT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s.,\-]+$").expect("valid regex"));

// =============================================================================
// Extraction
// =============================================================================

/// Extracts candidate item drafts from raw receipt text.
///
/// Never fails: unparseable lines are simply skipped.
pub fn extract_items(text: &str) -> ExtractedReceipt {
    let currency = sniff_currency(text);
    let mut items = Vec::new();
    let mut total = Money::zero();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || is_header_line(line) || is_total_line(line) {
            continue;
        }

        if let Some((price, name)) = extract_price_and_name(line) {
            if price.is_positive() && is_valid_item_name(&name) {
                total += price;
                items.push(ItemDraft {
                    name,
                    unit_price: price,
                });
            }
        }
    }

    ExtractedReceipt {
        items,
        total,
        currency,
    }
}

/// Guesses the bill currency from symbols in the text.
/// Receipts without a recognizable symbol default to RUB, the dominant
/// locale of the fiscal-receipt formats handled here.
fn sniff_currency(text: &str) -> Currency {
    if text.contains('$') {
        Currency::new("USD")
    } else if text.contains('€') {
        Currency::new("EUR")
    } else if text.contains('£') {
        Currency::new("GBP")
    } else {
        Currency::new("RUB")
    }
}

fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn is_total_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    TOTAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Tries each price pattern in order; on a match, the matched span is cut
/// out of the line and the remainder becomes the candidate name.
fn extract_price_and_name(line: &str) -> Option<(Money, String)> {
    for pattern in PRICE_PATTERNS.iter() {
        let Some(captures) = pattern.captures(line) else {
            continue;
        };
        let Some(price_match) = captures.get(1) else {
            continue;
        };

        let mut price_str = price_match.as_str().replace(',', ".");
        // The bare-integer pattern carries kopecks in a second group.
        if let Some(fraction) = captures.get(2) {
            price_str = format!("{}.{}", price_str, fraction.as_str());
        }

        let Ok(price) = Money::from_decimal_str(&price_str) else {
            continue;
        };

        let name = clean_item_name(&pattern.replace_all(line, ""));
        if !name.is_empty() {
            return Some((price, name));
        }
    }

    None
}

/// Strips quantity markers and non-name characters, collapses whitespace.
fn clean_item_name(raw: &str) -> String {
    let name = LEADING_QUANTITY.replace(raw.trim(), "");
    let name = NON_NAME_CHARS.replace_all(&name, "");
    let name = WHITESPACE_RUNS.replace_all(name.trim(), " ");
    name.into_owned()
}

/// Filters out fragments that survived cleanup but aren't item names.
fn is_valid_item_name(name: &str) -> bool {
    if name.chars().count() < 2 {
        return false;
    }
    if DIGITS_AND_PUNCT_ONLY.is_match(name) {
        return false;
    }
    let lower = name.to_lowercase();
    !UNIT_WORDS.iter().any(|w| lower.starts_with(w))
}

// =============================================================================
// Unit Tests
// =============================================================================
