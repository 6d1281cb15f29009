//! # State Sanitizer
//!
//! Lenient normalization of arbitrary JSON state blobs into [`AppState`].
//!
//! ## The Lenient/Strict Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  raw JSON blob (anything the client managed to produce)             │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  sanitize_state      LENIENT: coerce types, fill defaults,          │
//! │       │              dedup ids, promote an admin. Never rejects.    │
//! │       ▼                                                             │
//! │  validate::validate  STRICT: negative prices, missing names and     │
//! │                      broken invariants become itemized errors.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sanitizer deliberately does NOT clamp negative money: sign survives
//! normalization so the validator can name the broken field. Clamping only
//! happens on paths with no validator behind them ([`merge_snack_patch`]).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::money::{Money, Qty};
use crate::types::{
    AppState, AuditLogEntry, Customer, Purchase, Role, Snack, SnackCategory, User,
};
use crate::{MAX_AUDIT_LOGS, SHIFT_CODES};

// =============================================================================
// Value Coercion Helpers
// =============================================================================

/// Trimmed string from a JSON value. Numbers stringify; everything else is
/// `None`.
fn val_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn val_f64(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn val_i64(value: Option<&Value>) -> Option<i64> {
    val_f64(value).map(|f| f.round() as i64)
}

fn val_money(value: Option<&Value>) -> Option<Money> {
    val_f64(value).map(Money::from_f64)
}

fn val_qty(value: Option<&Value>) -> Option<Qty> {
    val_f64(value).map(Qty::from_f64)
}

/// Timestamp from RFC 3339, a bare `YYYY-MM-DD` date (midnight UTC), or unix
/// milliseconds. Anything else is `None`.
fn val_datetime(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        Some(Value::Number(n)) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key)
}

// =============================================================================
// Per-Entity Sanitizers
// =============================================================================

/// Ice cream detection by name keyword, for blobs that predate the category
/// field.
pub fn infer_category(name: &str) -> SnackCategory {
    let lower = name.to_lowercase();
    if lower.contains("ice cream") || lower.contains("ไอศกรีม") || lower.contains("ไอติม") {
        SnackCategory::IceCream
    } else {
        SnackCategory::Snack
    }
}

fn parse_category(value: Option<&Value>, name: &str) -> SnackCategory {
    match val_str(value).as_deref() {
        Some("ice_cream") | Some("icecream") | Some("ice cream") => SnackCategory::IceCream,
        Some("snack") => SnackCategory::Snack,
        _ => infer_category(name),
    }
}

fn sanitize_snack(raw: &Value, index: usize) -> Snack {
    let name = val_str(field(raw, "name")).unwrap_or_default();

    // sellPrice wins; legacy blobs only carry price.
    let sell_price = val_money(field(raw, "sellPrice"))
        .or_else(|| val_money(field(raw, "price")))
        .unwrap_or(Money::zero());

    let id = val_i64(field(raw, "id")).filter(|id| *id > 0).unwrap_or(index as i64 + 1);

    Snack {
        id,
        category: parse_category(field(raw, "category"), &name),
        emoji: val_str(field(raw, "emoji")),
        image: val_str(field(raw, "image")),
        price: sell_price,
        sell_price,
        cost_price: val_money(field(raw, "costPrice")).unwrap_or(Money::zero()),
        stock: val_qty(field(raw, "stock")).unwrap_or(Qty::zero()),
        total_sold: val_qty(field(raw, "totalSold")).unwrap_or(Qty::zero()),
        name,
    }
}

fn sanitize_customer(raw: &Value) -> Customer {
    let shift = val_str(field(raw, "shift"))
        .and_then(|s| s.to_uppercase().chars().next())
        .filter(|c| SHIFT_CODES.contains(c))
        .unwrap_or('A');

    Customer {
        name: val_str(field(raw, "name")).unwrap_or_default(),
        shift,
    }
}

fn sanitize_user(raw: &Value, index: usize) -> User {
    let display_name =
        val_str(field(raw, "displayName")).unwrap_or_else(|| format!("User {}", index + 1));

    let mut aliases: Vec<String> = field(raw, "aliases")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|a| val_str(Some(a))).collect())
        .unwrap_or_default();
    if !aliases
        .iter()
        .any(|a| a.eq_ignore_ascii_case(&display_name))
    {
        aliases.push(display_name.clone());
    }

    // Anything that isn't exactly "admin" is staff, including the UI's guest
    // tier.
    let role = match val_str(field(raw, "role")).as_deref() {
        Some("admin") => Role::Admin,
        _ => Role::Staff,
    };

    User {
        id: val_i64(field(raw, "id")).filter(|id| *id > 0).unwrap_or(0),
        display_name,
        aliases,
        role,
    }
}

fn sanitize_purchase(raw: &Value, index: usize, now: DateTime<Utc>) -> Purchase {
    let snack = field(raw, "snack");

    let snack_field = |key: &str| snack.and_then(|s| field(s, key));

    let unit_price = val_money(field(raw, "unitPrice"))
        .or_else(|| val_money(field(raw, "price")))
        .or_else(|| val_money(snack_field("sellPrice")))
        .or_else(|| val_money(snack_field("price")))
        .unwrap_or(Money::zero());

    let unit_cost = val_money(field(raw, "unitCost"))
        .or_else(|| val_money(field(raw, "costPrice")))
        .or_else(|| val_money(snack_field("costPrice")))
        .unwrap_or(Money::zero());

    let qty = val_qty(field(raw, "qty"))
        .or_else(|| val_qty(field(raw, "quantity")))
        .unwrap_or(Qty::ONE)
        .max(Qty::MIN_SALE);

    // Line totals are always recomputed; embedded totals are never trusted.
    let line_revenue = unit_price.mul_qty(qty);
    let line_cost = unit_cost.mul_qty(qty);

    Purchase {
        id: val_str(field(raw, "id")).unwrap_or_else(|| format!("p-{}", index + 1)),
        customer_name: val_str(field(raw, "customerName"))
            .or_else(|| val_str(field(raw, "customer")))
            .unwrap_or_default(),
        snack_id: val_i64(field(raw, "snackId"))
            .or_else(|| val_i64(snack_field("id")))
            .filter(|id| *id > 0),
        snack_name: val_str(field(raw, "snackName"))
            .or_else(|| val_str(snack_field("name")))
            .unwrap_or_default(),
        snack_emoji: val_str(field(raw, "snackEmoji")).or_else(|| val_str(snack_field("emoji"))),
        snack_image: val_str(field(raw, "snackImage")).or_else(|| val_str(snack_field("image"))),
        qty,
        unit_price,
        unit_cost,
        line_revenue,
        line_cost,
        line_profit: line_revenue - line_cost,
        purchased_at: val_datetime(field(raw, "purchasedAt"))
            .or_else(|| val_datetime(field(raw, "date")))
            .or_else(|| val_datetime(field(raw, "at")))
            .unwrap_or(now),
        settled_at: val_datetime(field(raw, "settledAt")),
    }
}

fn sanitize_audit_entry(raw: &Value, index: usize, now: DateTime<Utc>) -> AuditLogEntry {
    let meta = match field(raw, "meta") {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => Value::Object(serde_json::Map::new()),
    };

    AuditLogEntry {
        id: val_str(field(raw, "id")).unwrap_or_else(|| format!("a-{}", index + 1)),
        action: val_str(field(raw, "action")).unwrap_or_else(|| "unknown".to_string()),
        detail: val_str(field(raw, "detail")).unwrap_or_default(),
        actor_id: val_i64(field(raw, "actorId")).filter(|id| *id > 0),
        actor_name: val_str(field(raw, "actorName")).unwrap_or_else(|| "Unknown".to_string()),
        actor_role: match val_str(field(raw, "actorRole")).as_deref() {
            Some("admin") => Role::Admin,
            _ => Role::Staff,
        },
        meta,
        at: val_datetime(field(raw, "at")).unwrap_or(now),
    }
}

// =============================================================================
// Dedup Passes
// =============================================================================

/// Colliding snack ids move to `max + 1`. No row is dropped.
fn dedup_snack_ids(snacks: &mut [Snack]) {
    let mut max_id: i64 = snacks.iter().map(|s| s.id).max().unwrap_or(0);
    let mut seen: HashSet<i64> = HashSet::new();
    for snack in snacks.iter_mut() {
        if !seen.insert(snack.id) {
            max_id += 1;
            snack.id = max_id;
            seen.insert(snack.id);
        }
    }
}

/// Users that arrived without a usable id get `max + 1`.
fn assign_user_ids(users: &mut [User]) {
    let mut max_id: i64 = users.iter().map(|u| u.id).max().unwrap_or(0);
    for user in users.iter_mut() {
        if user.id <= 0 {
            max_id += 1;
            user.id = max_id;
        }
    }
}

/// Colliding string ids get `__dup1`, `__dup2`, ... suffixes in arrival
/// order. Applied to purchases and audit logs.
fn dedup_string_ids<T>(items: &mut [T], id_of: fn(&mut T) -> &mut String) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    for item in items.iter_mut() {
        let id = id_of(item);
        if seen.insert(id.clone()) {
            continue;
        }
        let base = id.clone();
        loop {
            let n = counters.entry(base.clone()).or_insert(0);
            *n += 1;
            let candidate = format!("{}__dup{}", base, n);
            if seen.insert(candidate.clone()) {
                *id_of(item) = candidate;
                break;
            }
        }
    }
}

// =============================================================================
// Whole-State Sanitizer
// =============================================================================

/// Normalizes an arbitrary JSON blob into an [`AppState`]. Never fails:
/// missing or malformed fields get defaults and collisions get new ids. Sign
/// is preserved on monetary fields for the validator to reject.
pub fn sanitize_state(raw: &Value, now: DateTime<Utc>) -> AppState {
    let arr = |key: &str| -> Vec<Value> {
        raw.get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let mut snacks: Vec<Snack> = arr("snacks")
        .iter()
        .enumerate()
        .map(|(i, v)| sanitize_snack(v, i))
        .collect();
    dedup_snack_ids(&mut snacks);

    let customers: Vec<Customer> = arr("customers").iter().map(sanitize_customer).collect();

    let mut users: Vec<User> = arr("users")
        .iter()
        .enumerate()
        .map(|(i, v)| sanitize_user(v, i))
        .collect();
    assign_user_ids(&mut users);
    if !users.is_empty() && !users.iter().any(|u| u.role == Role::Admin) {
        users[0].role = Role::Admin;
    }

    let mut purchases: Vec<Purchase> = arr("purchases")
        .iter()
        .enumerate()
        .map(|(i, v)| sanitize_purchase(v, i, now))
        .collect();
    dedup_string_ids(&mut purchases, |p| &mut p.id);

    let mut audit_logs: Vec<AuditLogEntry> = arr("auditLogs")
        .iter()
        .enumerate()
        .map(|(i, v)| sanitize_audit_entry(v, i, now))
        .collect();
    dedup_string_ids(&mut audit_logs, |e| &mut e.id);
    if audit_logs.len() > MAX_AUDIT_LOGS {
        // Keep the most recent entries by timestamp.
        audit_logs.sort_by_key(|e| e.at);
        audit_logs.drain(..audit_logs.len() - MAX_AUDIT_LOGS);
    }

    AppState {
        snacks,
        customers,
        users,
        purchases,
        audit_logs,
    }
}

// =============================================================================
// Snack Patch Merge (upsert path)
// =============================================================================

/// Merges a partial snack payload over an existing row for the single-snack
/// upsert. No validator runs behind this path, so negatives clamp to zero
/// here.
pub fn merge_snack_patch(existing: Option<&Snack>, id: i64, patch: &Value) -> Snack {
    let base = existing.cloned().unwrap_or(Snack {
        id,
        name: String::new(),
        emoji: None,
        image: None,
        category: SnackCategory::Snack,
        price: Money::zero(),
        sell_price: Money::zero(),
        cost_price: Money::zero(),
        stock: Qty::zero(),
        total_sold: Qty::zero(),
    });

    let name = val_str(field(patch, "name")).unwrap_or(base.name);

    let sell_price = val_money(field(patch, "sellPrice"))
        .or_else(|| val_money(field(patch, "price")))
        .unwrap_or(base.sell_price)
        .clamp_non_negative();

    Snack {
        id,
        category: match field(patch, "category") {
            Some(_) => parse_category(field(patch, "category"), &name),
            None => base.category,
        },
        emoji: val_str(field(patch, "emoji")).or(base.emoji),
        image: val_str(field(patch, "image")).or(base.image),
        price: sell_price,
        sell_price,
        cost_price: val_money(field(patch, "costPrice"))
            .unwrap_or(base.cost_price)
            .clamp_non_negative(),
        stock: val_qty(field(patch, "stock"))
            .unwrap_or(base.stock)
            .clamp_non_negative(),
        total_sold: val_qty(field(patch, "totalSold"))
            .unwrap_or(base.total_sold)
            .clamp_non_negative(),
        name,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
