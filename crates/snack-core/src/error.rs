//! Domain error types.
//!
//! Validation produces a *list* of [`ValidationError`]s rather than failing
//! fast: the client shows the operator everything wrong with a state blob in
//! one round trip.

use thiserror::Error;

// =============================================================================
// Validation Errors
// =============================================================================

/// A single structural problem found in a sanitized state.
///
/// Each variant renders to the human-readable message the client displays.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("too many snacks: {0} (max {})", crate::MAX_SNACKS)]
    TooManySnacks(usize),

    #[error("too many customers: {0} (max {})", crate::MAX_CUSTOMERS)]
    TooManyCustomers(usize),

    #[error("too many users: {0} (max {})", crate::MAX_USERS)]
    TooManyUsers(usize),

    #[error("too many purchases: {0} (max {})", crate::MAX_PURCHASES)]
    TooManyPurchases(usize),

    #[error("too many audit logs: {0} (max {})", crate::MAX_AUDIT_LOGS)]
    TooManyAuditLogs(usize),

    #[error("snack #{id} has an empty name")]
    SnackEmptyName { id: i64 },

    #[error("snack '{name}' has a negative price")]
    SnackNegativePrice { name: String },

    #[error("snack '{name}' has a negative cost price")]
    SnackNegativeCost { name: String },

    #[error("snack '{name}' has negative stock")]
    SnackNegativeStock { name: String },

    #[error("snack '{name}' has a negative lifetime sold counter")]
    SnackNegativeTotalSold { name: String },

    #[error("snack id {id} appears more than once")]
    SnackDuplicateId { id: i64 },

    #[error("customer #{index} has an empty name")]
    CustomerEmptyName { index: usize },

    #[error("customer '{name}' has invalid shift '{shift}'")]
    CustomerInvalidShift { name: String, shift: char },

    #[error("customer '{name}' appears more than once")]
    CustomerDuplicateName { name: String },

    #[error("user #{id} has an empty display name")]
    UserEmptyName { id: i64 },

    #[error("user id {id} appears more than once")]
    UserDuplicateId { id: i64 },

    #[error("users exist but none is an admin")]
    NoAdmin,

    #[error("purchase '{id}' has an empty customer name")]
    PurchaseEmptyCustomer { id: String },

    #[error("purchase '{id}' has a non-positive quantity")]
    PurchaseNonPositiveQty { id: String },

    #[error("purchase '{id}' has a negative unit price")]
    PurchaseNegativePrice { id: String },

    #[error("purchase '{id}' has a negative unit cost")]
    PurchaseNegativeCost { id: String },

    #[error("purchase id '{id}' appears more than once")]
    PurchaseDuplicateId { id: String },

    #[error("audit log id '{id}' appears more than once")]
    AuditDuplicateId { id: String },
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors from the reporting fold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// The month key is not `YYYY-MM` or names an impossible month.
    #[error("invalid month key '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),
}
