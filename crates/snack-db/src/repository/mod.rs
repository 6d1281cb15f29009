//! Repositories over the SQLite schema.
//!
//! Monetary and quantity columns hold fixed-point hundredths; enum-like
//! columns hold the wire strings. Hydration is lenient: an unknown stored
//! role or category falls back to its default rather than poisoning the
//! whole state read.

mod audit;
mod snack;
mod state;

pub use audit::AuditRepository;
pub use snack::SnackRepository;
pub use state::StateRepository;

use snack_core::{Role, SnackCategory};

pub(crate) fn category_to_str(category: SnackCategory) -> &'static str {
    match category {
        SnackCategory::Snack => "snack",
        SnackCategory::IceCream => "ice_cream",
    }
}

pub(crate) fn category_from_str(raw: &str) -> SnackCategory {
    match raw {
        "ice_cream" => SnackCategory::IceCream,
        _ => SnackCategory::Snack,
    }
}

pub(crate) fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Staff => "staff",
    }
}

pub(crate) fn role_from_str(raw: &str) -> Role {
    match raw {
        "admin" => Role::Admin,
        _ => Role::Staff,
    }
}
