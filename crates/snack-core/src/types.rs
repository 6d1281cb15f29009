//! # Domain Types
//!
//! Core domain types for the snack stand state blob.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          AppState                                   │
//! │                                                                     │
//! │  ┌───────────┐ ┌───────────┐ ┌────────┐ ┌──────────┐ ┌──────────┐  │
//! │  │  Snack    │ │ Customer  │ │  User  │ │ Purchase │ │ AuditLog │  │
//! │  │ ───────── │ │ ───────── │ │ ────── │ │ ──────── │ │ Entry    │  │
//! │  │ id (int)  │ │ name (PK) │ │ id     │ │ id (str) │ │ ──────── │  │
//! │  │ prices    │ │ shift     │ │ role   │ │ snapshot │ │ action   │  │
//! │  │ stock     │ │           │ │ aliases│ │ lines    │ │ actor    │  │
//! │  └───────────┘ └───────────┘ └────────┘ └──────────┘ └──────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire format is camelCase JSON (the browser client's shape). Purchases use
//! the snapshot pattern: the snack's identity and prices are frozen into the
//! purchase row at sale time, so deleting a product never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Qty};

// =============================================================================
// Snack
// =============================================================================

/// Product category. Inferred from the name by the sanitizer when a blob
/// doesn't carry it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnackCategory {
    #[default]
    Snack,
    IceCream,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snack {
    /// Positive integer id, unique within the catalog.
    pub id: i64,

    /// Display name shown on the product grid.
    pub name: String,

    /// Emoji display hint, when no image is set.
    #[serde(default)]
    pub emoji: Option<String>,

    /// Image display hint (data URL), preferred over the emoji.
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub category: SnackCategory,

    /// Legacy mirror of `sell_price`. The original client reads either; the
    /// sanitizer keeps the two equal.
    pub price: Money,

    pub sell_price: Money,

    pub cost_price: Money,

    /// Current stock. Fractional for bulk items.
    pub stock: Qty,

    /// Lifetime units sold, maintained as a running counter so cumulative
    /// reports survive gaps in purchase history.
    #[serde(default)]
    pub total_sold: Qty,
}

impl Snack {
    /// Profit locked into one unit at current prices.
    #[inline]
    pub fn profit_per_unit(&self) -> Money {
        self.sell_price - self.cost_price
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer on the roster. The name is the primary key; the shift is a
/// grouping label for the UI, not an access-control concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub shift: char,
}

// =============================================================================
// User
// =============================================================================

/// Staff role. The server enum is exactly two-valued; the UI's `guest` tier
/// is coerced to `staff` at the normalization boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Staff,
}

/// A staff account. Login is by alias match, case-insensitive; the display
/// name is always among the aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub display_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Purchase
// =============================================================================

/// One sale line. Immutable after creation except for `settled_at`.
///
/// Line totals are always recomputed from `qty × unit_*` by the sanitizer;
/// totals embedded in an incoming blob are never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Unique string id (client-minted; the server suffixes collisions).
    pub id: String,

    /// Free text, not a foreign key: purchases outlive roster edits.
    pub customer_name: String,

    /// Snapshot of the snack at time of sale.
    #[serde(default)]
    pub snack_id: Option<i64>,
    pub snack_name: String,
    #[serde(default)]
    pub snack_emoji: Option<String>,
    #[serde(default)]
    pub snack_image: Option<String>,

    pub qty: Qty,
    pub unit_price: Money,
    pub unit_cost: Money,

    /// `qty × unit_price`, recomputed at normalization.
    pub line_revenue: Money,
    /// `qty × unit_cost`, recomputed at normalization.
    pub line_cost: Money,
    /// `line_revenue - line_cost`, recomputed at normalization.
    pub line_profit: Money,

    pub purchased_at: DateTime<Utc>,

    /// Set once when the customer's bill is collected; never cleared.
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Whether the line still counts toward the customer's outstanding bill.
    #[inline]
    pub fn is_unsettled(&self) -> bool {
        self.settled_at.is_none()
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// An append-only audit record. `action` is a dotted taxonomy string such as
/// `snack.create` or `billing.settle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub action: String,
    pub detail: String,
    #[serde(default)]
    pub actor_id: Option<i64>,
    pub actor_name: String,
    #[serde(default)]
    pub actor_role: Role,
    #[serde(default)]
    pub meta: serde_json::Value,
    pub at: DateTime<Utc>,
}

// =============================================================================
// AppState
// =============================================================================

/// The aggregate root: the unit of synchronization between client and
/// server. A save replaces all five collections at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub snacks: Vec<Snack>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,
}

impl AppState {
    /// True when every collection is empty; `GET /api/state` reports this as
    /// `null` so fresh clients fall back to their seeded defaults.
    pub fn is_empty(&self) -> bool {
        self.snacks.is_empty()
            && self.customers.is_empty()
            && self.users.is_empty()
            && self.purchases.is_empty()
            && self.audit_logs.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
