//! Operator roles

use serde::{Deserialize, Serialize};

/// Operator role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Front-of-house / kitchen staff
    Staff,
    /// Shift manager (may force-complete orders)
    Manager,
    /// Venue admin (may run the daily reset)
    Admin,
}

impl Role {
    /// Whether this role carries at least the privilege of `required`
    pub fn at_least(&self, required: Role) -> bool {
        *self >= required
    }

    /// Parse a role name (header value, lowercase)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" => Some(Self::Staff),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}
