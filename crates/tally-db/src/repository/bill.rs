//! # Bill Repository
//!
//! Database operations for bills and their nested collections.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Bill Storage Layout                                 │
//! │                                                                         │
//! │  bills ──────────┬── participants   (ordered by position)              │
//! │                  └── items          (ordered by position)              │
//! │                         └── item_consumers (ordered by position)       │
//! │                                                                         │
//! │  Writes replace the whole aggregate in one transaction.                │
//! │  Reads reassemble it in the same order it was written, because the     │
//! │  split engine's remainder distribution depends on list order.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tip policy is stored as a JSON column; a row whose JSON no longer parses
//! surfaces as [`DbError::CorruptRecord`] rather than a silent default.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::{Bill, Currency, Item, Money, Participant, TipPolicy};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct BillRow {
    id: String,
    title: String,
    description: Option<String>,
    currency: String,
    tip_policy: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ParticipantRow {
    id: String,
    name: String,
    email: Option<String>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    name: String,
    unit_price_minor: i64,
    quantity: i64,
}

#[derive(Debug, FromRow)]
struct ConsumerRow {
    item_id: String,
    participant_id: String,
}

/// Lightweight bill listing row, returned by [`BillRepository::list_summaries`].
/// Cheap to produce (no aggregate reassembly).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BillSummary {
    pub id: String,
    pub title: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub participant_count: i64,
    pub item_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Inserts a complete bill aggregate.
    ///
    /// ## Transaction Scope
    /// The bill row, its participants, items, and consumer assignments are
    /// written atomically. Position columns record list order.
    pub async fn insert(&self, bill: &Bill) -> DbResult<()> {
        debug!(id = %bill.id, title = %bill.title, "Inserting bill");

        let tip_policy = serde_json::to_string(&bill.tip_policy)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, title, description, currency,
                tip_policy, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.title)
        .bind(&bill.description)
        .bind(bill.currency.code())
        .bind(&tip_policy)
        .bind(&bill.created_by)
        .bind(bill.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, participant) in bill.participants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO participants (id, bill_id, position, name, email)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&participant.id)
            .bind(&bill.id)
            .bind(position as i64)
            .bind(&participant.name)
            .bind(&participant.email)
            .execute(&mut *tx)
            .await?;
        }

        for (position, item) in bill.items.iter().enumerate() {
            insert_item_tx(&mut tx, &bill.id, position as i64, item).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets a bill by ID, reassembling the full aggregate.
    ///
    /// Returns `Ok(None)` when no bill with that id exists.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bill>> {
        let row: Option<BillRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, currency, tip_policy, created_by, created_at
            FROM bills
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tip_policy: TipPolicy =
            serde_json::from_str(&row.tip_policy).map_err(|e| DbError::CorruptRecord {
                entity: "Bill".to_string(),
                id: row.id.clone(),
                reason: format!("unreadable tip policy: {e}"),
            })?;

        let participant_rows: Vec<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT id, name, email
            FROM participants
            WHERE bill_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let item_rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, unit_price_minor, quantity
            FROM items
            WHERE bill_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let consumer_rows: Vec<ConsumerRow> = sqlx::query_as(
            r#"
            SELECT ic.item_id, ic.participant_id
            FROM item_consumers ic
            JOIN items i ON i.id = ic.item_id
            WHERE i.bill_id = ?1
            ORDER BY ic.item_id, ic.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut consumers_by_item: HashMap<String, Vec<String>> = HashMap::new();
        for row in consumer_rows {
            consumers_by_item
                .entry(row.item_id)
                .or_default()
                .push(row.participant_id);
        }

        let participants = participant_rows
            .into_iter()
            .map(|p| Participant {
                id: p.id,
                name: p.name,
                email: p.email,
            })
            .collect();

        let items = item_rows
            .into_iter()
            .map(|i| {
                let consumed_by = consumers_by_item.remove(&i.id).unwrap_or_default();
                Item {
                    id: i.id,
                    name: i.name,
                    unit_price: Money::from_minor(i.unit_price_minor),
                    quantity: i.quantity,
                    consumed_by,
                }
            })
            .collect();

        Ok(Some(Bill {
            id: row.id,
            title: row.title,
            description: row.description,
            currency: Currency::new(&row.currency),
            tip_policy,
            created_by: row.created_by,
            created_at: row.created_at,
            participants,
            items,
        }))
    }

    /// Lists bill summaries, newest first.
    pub async fn list_summaries(&self) -> DbResult<Vec<BillSummary>> {
        let summaries: Vec<BillSummary> = sqlx::query_as(
            r#"
            SELECT
                b.id,
                b.title,
                b.currency,
                b.created_at,
                (SELECT COUNT(*) FROM participants p WHERE p.bill_id = b.id) AS participant_count,
                (SELECT COUNT(*) FROM items i WHERE i.bill_id = b.id) AS item_count
            FROM bills b
            ORDER BY b.created_at DESC, b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Appends a single item to an existing bill.
    ///
    /// Position is assigned after the current last item, so repeated appends
    /// preserve insertion order.
    pub async fn append_item(&self, bill_id: &str, item: &Item) -> DbResult<()> {
        debug!(bill_id = %bill_id, item_id = %item.id, "Appending item");

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM bills WHERE id = ?1")
            .bind(bill_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Err(DbError::not_found("Bill", bill_id));
        }

        let next_position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM items WHERE bill_id = ?1",
        )
        .bind(bill_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_item_tx(&mut tx, bill_id, next_position, item).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Deletes a bill and (via foreign key cascade) everything under it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting bill");

        let result = sqlx::query("DELETE FROM bills WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", id));
        }

        Ok(())
    }
}

/// Inserts one item row plus its consumer assignments inside a transaction.
async fn insert_item_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    bill_id: &str,
    position: i64,
    item: &Item,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO items (id, bill_id, position, name, unit_price_minor, quantity)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&item.id)
    .bind(bill_id)
    .bind(position)
    .bind(&item.name)
    .bind(item.unit_price.minor())
    .bind(item.quantity)
    .execute(&mut **tx)
    .await?;

    for (consumer_position, participant_id) in item.consumed_by.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO item_consumers (item_id, participant_id, position)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&item.id)
        .bind(participant_id)
        .bind(consumer_position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
