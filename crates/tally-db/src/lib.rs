//! # tally-db: Database Layer for Tally
//!
//! SQLite persistence for bills.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tally-db                                        │
//! │                                                                         │
//! │  pool.rs         DbConfig + Database (WAL SQLite pool)                  │
//! │  migrations.rs   Embedded schema migrations                             │
//! │  repository/     BillRepository (aggregate read/write)                  │
//! │  error.rs        DbError taxonomy                                       │
//! │                                                                         │
//! │  Depends on tally-core for domain types. Nothing above this crate       │
//! │  writes SQL.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("/var/lib/tally/tally.db")).await?;
//! db.bills().insert(&bill).await?;
//! let loaded = db.bills().get_by_id(&bill.id).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::bill::{BillRepository, BillSummary};
