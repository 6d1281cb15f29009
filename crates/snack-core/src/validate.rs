//! Strict structural validation of a sanitized [`AppState`].
//!
//! Runs after [`crate::normalize::sanitize_state`] and before every
//! whole-state write. Returns *every* violation rather than the first one, so
//! the operator sees the full damage report in one round trip; callers cap
//! what they surface at [`crate::MAX_REPORTED_ISSUES`].

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{AppState, Role};
use crate::{
    MAX_AUDIT_LOGS, MAX_CUSTOMERS, MAX_PURCHASES, MAX_SNACKS, MAX_USERS, SHIFT_CODES,
};

/// Checks every invariant the persistence layer relies on. An empty result
/// means the state may be written.
pub fn validate(state: &AppState) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // ---- collection ceilings ----
    if state.snacks.len() > MAX_SNACKS {
        errors.push(ValidationError::TooManySnacks(state.snacks.len()));
    }
    if state.customers.len() > MAX_CUSTOMERS {
        errors.push(ValidationError::TooManyCustomers(state.customers.len()));
    }
    if state.users.len() > MAX_USERS {
        errors.push(ValidationError::TooManyUsers(state.users.len()));
    }
    if state.purchases.len() > MAX_PURCHASES {
        errors.push(ValidationError::TooManyPurchases(state.purchases.len()));
    }
    if state.audit_logs.len() > MAX_AUDIT_LOGS {
        errors.push(ValidationError::TooManyAuditLogs(state.audit_logs.len()));
    }

    // ---- snacks ----
    let mut snack_ids = HashSet::new();
    for snack in &state.snacks {
        if snack.name.is_empty() {
            errors.push(ValidationError::SnackEmptyName { id: snack.id });
        }
        if snack.sell_price.is_negative() || snack.price.is_negative() {
            errors.push(ValidationError::SnackNegativePrice {
                name: snack.name.clone(),
            });
        }
        if snack.cost_price.is_negative() {
            errors.push(ValidationError::SnackNegativeCost {
                name: snack.name.clone(),
            });
        }
        if snack.stock.is_negative() {
            errors.push(ValidationError::SnackNegativeStock {
                name: snack.name.clone(),
            });
        }
        if snack.total_sold.is_negative() {
            errors.push(ValidationError::SnackNegativeTotalSold {
                name: snack.name.clone(),
            });
        }
        if !snack_ids.insert(snack.id) {
            errors.push(ValidationError::SnackDuplicateId { id: snack.id });
        }
    }

    // ---- customers ----
    let mut customer_names = HashSet::new();
    for (index, customer) in state.customers.iter().enumerate() {
        if customer.name.is_empty() {
            errors.push(ValidationError::CustomerEmptyName { index });
        } else if !customer_names.insert(customer.name.clone()) {
            errors.push(ValidationError::CustomerDuplicateName {
                name: customer.name.clone(),
            });
        }
        if !SHIFT_CODES.contains(&customer.shift) {
            errors.push(ValidationError::CustomerInvalidShift {
                name: customer.name.clone(),
                shift: customer.shift,
            });
        }
    }

    // ---- users ----
    let mut user_ids = HashSet::new();
    for user in &state.users {
        if user.display_name.is_empty() {
            errors.push(ValidationError::UserEmptyName { id: user.id });
        }
        if !user_ids.insert(user.id) {
            errors.push(ValidationError::UserDuplicateId { id: user.id });
        }
    }
    if !state.users.is_empty() && !state.users.iter().any(|u| u.role == Role::Admin) {
        errors.push(ValidationError::NoAdmin);
    }

    // ---- purchases ----
    let mut purchase_ids = HashSet::new();
    for purchase in &state.purchases {
        if purchase.customer_name.is_empty() {
            errors.push(ValidationError::PurchaseEmptyCustomer {
                id: purchase.id.clone(),
            });
        }
        if purchase.qty.hundredths() <= 0 {
            errors.push(ValidationError::PurchaseNonPositiveQty {
                id: purchase.id.clone(),
            });
        }
        if purchase.unit_price.is_negative() {
            errors.push(ValidationError::PurchaseNegativePrice {
                id: purchase.id.clone(),
            });
        }
        if purchase.unit_cost.is_negative() {
            errors.push(ValidationError::PurchaseNegativeCost {
                id: purchase.id.clone(),
            });
        }
        if !purchase_ids.insert(purchase.id.clone()) {
            errors.push(ValidationError::PurchaseDuplicateId {
                id: purchase.id.clone(),
            });
        }
    }

    // ---- audit logs ----
    let mut audit_ids = HashSet::new();
    for entry in &state.audit_logs {
        if !audit_ids.insert(entry.id.clone()) {
            errors.push(ValidationError::AuditDuplicateId {
                id: entry.id.clone(),
            });
        }
    }

    errors
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::sanitize_state;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sanitize(blob: serde_json::Value) -> AppState {
        sanitize_state(&blob, Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_clean_state_passes() {
        let state = sanitize(json!({
            "snacks": [{"id": 1, "name": "มาม่า", "price": 7, "costPrice": 5, "stock": 48}],
            "customers": [{"name": "เอ", "shift": "A"}],
            "users": [{"id": 1, "displayName": "Boss", "role": "admin"}],
            "purchases": [{
                "id": "p1", "customerName": "เอ", "snackId": 1, "snackName": "มาม่า",
                "qty": 2, "unitPrice": 7, "unitCost": 5, "date": "2026-02-08"
            }]
        }));
        assert!(validate(&state).is_empty());
    }

    #[test]
    fn test_negative_price_rejected() {
        let state = sanitize(json!({"snacks": [{"id": 1, "name": "x", "price": -5}]}));
        let errors = validate(&state);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SnackNegativePrice { .. })));
    }

    #[test]
    fn test_negative_stock_rejected() {
        let state = sanitize(json!({"snacks": [{"id": 1, "name": "x", "price": 7, "stock": -1}]}));
        let errors = validate(&state);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SnackNegativeStock { .. })));
    }

    #[test]
    fn test_negative_total_sold_rejected() {
        let state = sanitize(json!({"snacks": [
            {"id": 1, "name": "x", "price": 7, "totalSold": -5}
        ]}));
        let errors = validate(&state);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SnackNegativeTotalSold { .. })));
    }

    #[test]
    fn test_empty_snack_name_rejected() {
        let state = sanitize(json!({"snacks": [{"id": 1, "price": 7}]}));
        assert!(validate(&state)
            .iter()
            .any(|e| matches!(e, ValidationError::SnackEmptyName { id: 1 })));
    }

    #[test]
    fn test_sanitized_state_never_trips_admin_rule() {
        // The sanitizer promotes an admin, so the validator's NoAdmin check
        // only fires on states built outside the pipeline.
        let state = sanitize(json!({"users": [{"id": 1, "displayName": "A", "role": "staff"}]}));
        assert!(validate(&state).is_empty());

        let mut broken = state.clone();
        broken.users[0].role = Role::Staff;
        assert!(validate(&broken)
            .iter()
            .any(|e| matches!(e, ValidationError::NoAdmin)));
    }

    #[test]
    fn test_ceiling_violation() {
        let mut state = AppState::default();
        for i in 0..(MAX_USERS + 1) {
            state.users.push(crate::types::User {
                id: i as i64 + 1,
                display_name: format!("U{}", i),
                aliases: vec![],
                role: if i == 0 { Role::Admin } else { Role::Staff },
            });
        }
        assert!(validate(&state)
            .iter()
            .any(|e| matches!(e, ValidationError::TooManyUsers(_))));
    }

    #[test]
    fn test_duplicate_customer_rejected() {
        let state = sanitize(json!({"customers": [{"name": "เอ"}, {"name": "เอ"}]}));
        assert!(validate(&state)
            .iter()
            .any(|e| matches!(e, ValidationError::CustomerDuplicateName { .. })));
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let state = sanitize(json!({"snacks": [
            {"id": 1, "price": -5},
            {"id": 2, "name": "ok", "costPrice": -1}
        ]}));
        let errors = validate(&state);
        assert!(errors.len() >= 2);
    }
}
