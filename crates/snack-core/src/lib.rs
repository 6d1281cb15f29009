//! # snack-core: Pure Business Logic for the Snack Stand Tracker
//!
//! This crate is the **heart** of the snack stand backend. It contains the
//! whole state pipeline as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      State Sync Pipeline                            │
//! │                                                                     │
//! │  PUT /api/state (raw JSON blob)                                     │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              ★ snack-core (THIS CRATE) ★                    │    │
//! │  │                                                             │    │
//! │  │  normalize::sanitize_state   lenient coercion, dedup,       │    │
//! │  │       │                      admin promotion                │    │
//! │  │       ▼                                                     │    │
//! │  │  validate::validate          strict rejection, itemized     │    │
//! │  │       │                      errors                         │    │
//! │  │       ▼                                                     │    │
//! │  │  report / billing            monthly + cumulative folds,    │    │
//! │  │                              settlement                     │    │
//! │  │                                                             │    │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  snack-db (transactional whole-state replace)                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Fixed-point `Money` and `Qty` types (integer hundredths)
//! - [`types`] - Domain types (Snack, Customer, User, Purchase, AppState)
//! - [`normalize`] - Lenient sanitizer for arbitrary JSON state blobs
//! - [`validate`] - Strict structural validation before every write
//! - [`report`] - Monthly and cumulative billing/profit aggregation
//! - [`billing`] - Customer bill settlement
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Lenient in, strict out**: normalization defaults malformed fields,
//!    validation rejects broken invariants. The two never mix.
//! 2. **Integer money**: every monetary/quantity value is i64 hundredths,
//!    so folds over thousands of purchase lines cannot drift.
//! 3. **Explicit errors**: all errors are typed, never strings or panics.

pub mod billing;
pub mod error;
pub mod money;
pub mod normalize;
pub mod report;
pub mod types;
pub mod validate;

pub use error::{ReportError, ValidationError};
pub use money::{Money, Qty};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Collection ceilings enforced by the validator. A state blob exceeding any
/// of these is rejected wholesale before it reaches the database.
pub const MAX_SNACKS: usize = 3_000;
pub const MAX_CUSTOMERS: usize = 10_000;
pub const MAX_USERS: usize = 1_000;
pub const MAX_PURCHASES: usize = 200_000;
pub const MAX_AUDIT_LOGS: usize = 200_000;

/// Shift codes a customer may carry. `O` groups customers outside the four
/// rotating shifts.
pub const SHIFT_CODES: [char; 5] = ['A', 'B', 'C', 'D', 'O'];

/// How many validation messages a caller should surface at most.
pub const MAX_REPORTED_ISSUES: usize = 20;
