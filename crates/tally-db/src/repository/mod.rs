//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                           │
//! │       │                                                                 │
//! │       │  db.bills().get_by_id("bill_...")                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  BillRepository                                                         │
//! │  ├── insert(&self, bill)                                                │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── list_summaries(&self)                                              │
//! │  ├── append_item(&self, bill_id, item)                                  │
//! │  └── delete(&self, id)                                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test against an in-memory database                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`bill::BillRepository`] - Bill persistence and reassembly

pub mod bill;
