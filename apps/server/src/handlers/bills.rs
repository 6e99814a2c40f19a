//! # Bill Handlers
//!
//! ## Endpoints
//! ```text
//! POST   /api/bills            Create a bill (201 + stored bill)
//! GET    /api/bills            List summaries, newest first
//! GET    /api/bills/{id}       Full bill
//! DELETE /api/bills/{id}       Delete (cascades)
//! POST   /api/bills/{id}/items Append an item
//! GET    /api/bills/{id}/split Compute the split
//! ```
//!
//! ## Request Defaults
//! Mirrors what casual clients send: items with no consumers are assigned
//! to every participant, a blank creator becomes "Anonymous" (the domain
//! default), and a missing currency becomes USD.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use tally_core::validation::{validate_name, validate_price, validate_quantity};
use tally_core::{
    compute_split, new_item_id, new_participant_id, Bill, Currency, Item, Money, Participant,
    SplitResult, TipPolicy, ValidationError,
};
use tally_db::BillSummary;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub tip_policy: Option<TipPolicy>,
    #[serde(default)]
    pub participants: Vec<ParticipantDraft>,
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

/// Participant as sent by a client. Ids are optional; clients that assign
/// their own (to wire up `consumed_by` before the first round trip) keep
/// them, everyone else gets a generated one.
#[derive(Debug, Deserialize)]
pub struct ParticipantDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Item as sent by a client. Prices arrive as decimal numbers and are
/// converted to minor units at this boundary; everything below works in
/// integers.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub consumed_by: Vec<String>,
}

fn default_quantity() -> i64 {
    1
}

impl ItemRequest {
    fn unit_price(&self) -> ApiResult<Money> {
        Money::from_float(self.price)
            .map_err(|e| ApiError::BadRequest(format!("item '{}': {e}", self.name)))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/bills
pub async fn create_bill(
    State(state): State<AppState>,
    Json(req): Json<CreateBillRequest>,
) -> ApiResult<(StatusCode, Json<Bill>)> {
    let currency = Currency::new(req.currency.as_deref().unwrap_or("USD"));
    let mut bill = Bill::new(&req.title, currency);

    bill.description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    if let Some(by) = req.created_by.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        bill.created_by = by.to_string();
    }

    if let Some(policy) = req.tip_policy {
        bill.set_tip_policy(policy);
    }

    for p in &req.participants {
        bill.participants.push(Participant {
            id: p
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .unwrap_or_else(new_participant_id),
            name: p.name.trim().to_string(),
            email: p
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from),
        });
    }

    let all_participants: Vec<String> = bill.participants.iter().map(|p| p.id.clone()).collect();

    for item in &req.items {
        let unit_price = item.unit_price()?;
        let consumed_by = if item.consumed_by.is_empty() {
            all_participants.clone()
        } else {
            item.consumed_by.clone()
        };
        bill.items.push(Item {
            id: new_item_id(),
            name: item.name.trim().to_string(),
            unit_price,
            quantity: item.quantity,
            consumed_by,
        });
    }

    let errors = bill.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state.db.bills().insert(&bill).await?;
    info!(id = %bill.id, participants = bill.participants.len(), items = bill.items.len(), "bill created");

    Ok((StatusCode::CREATED, Json(bill)))
}

/// GET /api/bills
pub async fn list_bills(State(state): State<AppState>) -> ApiResult<Json<Vec<BillSummary>>> {
    let summaries = state.db.bills().list_summaries().await?;
    Ok(Json(summaries))
}

/// GET /api/bills/{id}
pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Bill>> {
    let bill = state
        .db
        .bills()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", id.as_str()))?;
    Ok(Json(bill))
}

/// DELETE /api/bills/{id}
pub async fn delete_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.bills().delete(&id).await?;
    info!(id = %id, "bill deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/bills/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ItemRequest>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let bill = state
        .db
        .bills()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", id.as_str()))?;

    let unit_price = req.unit_price()?;
    let item_id = new_item_id();

    let consumed_by = if req.consumed_by.is_empty() {
        bill.participants.iter().map(|p| p.id.clone()).collect()
    } else {
        req.consumed_by.clone()
    };

    // Collect every problem before answering, same as bill validation.
    let mut errors: Vec<ValidationError> = Vec::new();
    if let Err(e) = validate_name("name", &req.name) {
        errors.push(e);
    }
    if let Err(e) = validate_price(unit_price) {
        errors.push(e);
    }
    if let Err(e) = validate_quantity(req.quantity) {
        errors.push(e);
    }
    let known = bill.participant_ids();
    let mut seen = HashSet::new();
    for pid in &consumed_by {
        if !known.contains(pid.as_str()) {
            errors.push(ValidationError::DanglingConsumerReference {
                item_id: item_id.clone(),
                participant_id: pid.clone(),
            });
        } else if !seen.insert(pid.as_str()) {
            errors.push(ValidationError::DuplicateConsumerReference {
                item_id: item_id.clone(),
                participant_id: pid.clone(),
            });
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let item = Item {
        id: item_id,
        name: req.name.trim().to_string(),
        unit_price,
        quantity: req.quantity,
        consumed_by,
    };

    state.db.bills().append_item(&id, &item).await?;
    info!(bill_id = %id, item_id = %item.id, "item appended");

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/bills/{id}/split
pub async fn get_split(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SplitResult>> {
    let bill = state
        .db
        .bills()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", id.as_str()))?;

    let split = compute_split(&bill)?;
    Ok(Json(split))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_db::{Database, DbConfig};

    async fn test_state() -> AppState {
        AppState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    fn dinner_request() -> CreateBillRequest {
        CreateBillRequest {
            title: "Dinner".to_string(),
            description: None,
            currency: None,
            created_by: None,
            tip_policy: Some(TipPolicy::Percentage { rate_bps: 1000 }),
            participants: vec![
                ParticipantDraft {
                    id: Some("p1".to_string()),
                    name: "Alice".to_string(),
                    email: None,
                },
                ParticipantDraft {
                    id: Some("p2".to_string()),
                    name: "Bob".to_string(),
                    email: None,
                },
                ParticipantDraft {
                    id: Some("p3".to_string()),
                    name: "Carol".to_string(),
                    email: None,
                },
            ],
            items: vec![ItemRequest {
                name: "Pasta".to_string(),
                price: 10.0,
                quantity: 1,
                consumed_by: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn test_create_bill_defaults() {
        let state = test_state().await;

        let (status, Json(bill)) = create_bill(State(state.clone()), Json(dinner_request()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(bill.currency.code(), "USD");
        assert_eq!(bill.created_by, "Anonymous");
        // Empty consumer set expands to all participants.
        assert_eq!(bill.items[0].consumed_by, vec!["p1", "p2", "p3"]);

        // And it is actually stored.
        let stored = state.db.bills().get_by_id(&bill.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_create_bill_collects_validation_errors() {
        let state = test_state().await;

        let mut req = dinner_request();
        req.title = "   ".to_string();
        req.participants.clear();

        let err = create_bill(State(state), Json(req)).await.unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        // Blank title + no participants + (via defaulting) an item nobody
        // consumes is legal, so exactly two problems.
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_create_bill_rejects_unparseable_price() {
        let state = test_state().await;

        let mut req = dinner_request();
        req.items[0].price = f64::NAN;

        let err = create_bill(State(state), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_get_missing_bill_is_404() {
        let state = test_state().await;
        let err = get_bill(State(state), Path("bill_nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_split_round_trip() {
        let state = test_state().await;
        let (_, Json(bill)) = create_bill(State(state.clone()), Json(dinner_request()))
            .await
            .unwrap();

        let Json(split) = get_split(State(state), Path(bill.id.clone())).await.unwrap();

        assert_eq!(split.bill_id, bill.id);
        assert_eq!(split.grand_total, Money::from_minor(1100));
        let totals: Vec<i64> = split.shares.iter().map(|s| s.total.minor()).collect();
        assert_eq!(totals, vec![368, 366, 366]);
    }

    #[tokio::test]
    async fn test_add_item_rejects_unknown_consumer() {
        let state = test_state().await;
        let (_, Json(bill)) = create_bill(State(state.clone()), Json(dinner_request()))
            .await
            .unwrap();

        let req = ItemRequest {
            name: "Dessert".to_string(),
            price: 6.5,
            quantity: 1,
            consumed_by: vec!["p1".to_string(), "ghost".to_string()],
        };

        let err = add_item(State(state), Path(bill.id), Json(req))
            .await
            .unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(matches!(
            errors[0],
            ValidationError::DanglingConsumerReference { .. }
        ));
    }

    /// A repeated consumer id must be a 400, not a constraint violation
    /// surfacing as a 500 from the `item_consumers` primary key.
    #[tokio::test]
    async fn test_add_item_rejects_repeated_consumer() {
        let state = test_state().await;
        let (_, Json(bill)) = create_bill(State(state.clone()), Json(dinner_request()))
            .await
            .unwrap();

        let req = ItemRequest {
            name: "Dessert".to_string(),
            price: 6.5,
            quantity: 1,
            consumed_by: vec!["p1".to_string(), "p1".to_string(), "p2".to_string()],
        };

        let err = add_item(State(state), Path(bill.id), Json(req))
            .await
            .unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(matches!(
            errors[0],
            ValidationError::DuplicateConsumerReference { .. }
        ));
    }

    #[tokio::test]
    async fn test_add_item_defaults_consumers_and_persists() {
        let state = test_state().await;
        let (_, Json(bill)) = create_bill(State(state.clone()), Json(dinner_request()))
            .await
            .unwrap();

        let req = ItemRequest {
            name: "Dessert".to_string(),
            price: 6.5,
            quantity: 1,
            consumed_by: vec![],
        };

        let (status, Json(item)) = add_item(State(state.clone()), Path(bill.id.clone()), Json(req))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item.consumed_by, vec!["p1", "p2", "p3"]);

        let stored = state.db.bills().get_by_id(&bill.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[1].unit_price, Money::from_minor(650));
    }

    #[tokio::test]
    async fn test_delete_bill() {
        let state = test_state().await;
        let (_, Json(bill)) = create_bill(State(state.clone()), Json(dinner_request()))
            .await
            .unwrap();

        let status = delete_bill(State(state.clone()), Path(bill.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_bill(State(state), Path(bill.id)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
