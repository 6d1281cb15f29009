//! # snack-db: SQLite Persistence for the Snack Stand Tracker
//!
//! Everything that touches the database lives here; `snack-core` stays pure.
//!
//! ## Layout
//!
//! - [`pool`] - [`Database`] handle, [`DbConfig`] (file vs in-memory)
//! - [`migrations`] - embedded idempotent schema DDL
//! - [`repository`] - [`repository::StateRepository`] (whole-state replace
//!   behind the write queue), [`repository::SnackRepository`] (narrow
//!   upsert), [`repository::AuditRepository`] (recent-entries query)
//! - [`error`] - [`DbError`] with transient-conflict classification
//!
//! ## Write Model
//!
//! A save is a full replace of five tables in one transaction. Whole-state
//! writes queue on a process-wide mutex (FIFO) and retry transient SQLite
//! busy/locked conflicts up to 4 times with linear backoff. Narrow writes
//! (the single-snack upsert) are single statements and skip the queue.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use pool::{Database, DbConfig};
