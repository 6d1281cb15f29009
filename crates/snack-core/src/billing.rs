//! Customer bill settlement.
//!
//! Settlement is one-way: a purchase moves from unsettled to settled exactly
//! once and never back. Repeating the call is a no-op, which is what makes
//! the HTTP endpoint safe to retry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::money::{Money, Qty};
use crate::types::AppState;

/// What a settlement pass changed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    /// Purchase lines marked settled by this call.
    pub settled: usize,
    /// Revenue collected by this call.
    pub amount: Money,
    /// Units covered by this call.
    pub units: Qty,
}

impl SettlementOutcome {
    /// True when the call changed nothing, so no write or audit entry is
    /// warranted.
    pub fn is_noop(&self) -> bool {
        self.settled == 0
    }
}

/// Marks every unsettled purchase of `customer_name` as settled at `now`.
/// Already-settled lines keep their original timestamp.
pub fn settle_customer(
    state: &mut AppState,
    customer_name: &str,
    now: DateTime<Utc>,
) -> SettlementOutcome {
    let mut outcome = SettlementOutcome::default();
    for purchase in state
        .purchases
        .iter_mut()
        .filter(|p| p.customer_name == customer_name && p.is_unsettled())
    {
        purchase.settled_at = Some(now);
        outcome.settled += 1;
        outcome.amount += purchase.line_revenue;
        outcome.units += purchase.qty;
    }
    outcome
}
