//! Order Model (订单)
//!
//! Order status and payment status are independent axes: an order may be
//! IN_PREP and UNPAID at the same time (pay-later / pay-at-till flows).
//! COMPLETED implies PAID unless the completion was forced by a manager;
//! that rule lives in the completion transition, not here.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order preparation/fulfillment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Accepted,
    InPrep,
    Ready,
    Serving,
    Completed,
    Cancelled,
    Refunded,
    Expired,
}

impl OrderStatus {
    /// Statuses that count as "active" for table-occupancy checks
    pub const ACTIVE: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Accepted,
        OrderStatus::InPrep,
        OrderStatus::Ready,
        OrderStatus::Serving,
    ];

    /// Whether this status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Refunded | Self::Expired
        )
    }

    /// Whether this status counts as active (blocks freeing a table)
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Whether `from -> to` is an allowed transition.
    ///
    /// Forward chain: PLACED -> ACCEPTED -> IN_PREP -> READY -> SERVING ->
    /// COMPLETED. CANCELLED and REFUNDED are reachable from any non-terminal
    /// state; EXPIRED only from PLACED/ACCEPTED.
    pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
        if from.is_terminal() || from == to {
            return false;
        }
        match to {
            Self::Accepted => from == Self::Placed,
            Self::InPrep => from == Self::Accepted,
            Self::Ready => from == Self::InPrep,
            Self::Serving => from == Self::Ready,
            Self::Completed => from == Self::Serving,
            Self::Cancelled | Self::Refunded => true,
            Self::Expired => matches!(from, Self::Placed | Self::Accepted),
            Self::Placed => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Accepted => "ACCEPTED",
            Self::InPrep => "IN_PREP",
            Self::Ready => "READY",
            Self::Serving => "SERVING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Refunded => "REFUNDED",
            Self::Expired => "EXPIRED",
        }
    }
}

/// Payment status - independent of preparation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    /// To be settled at the till (pay_at_till orders before collection)
    Till,
    Refunded,
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Online,
    PayAtTill,
    PayLater,
}

/// Concrete payment method recorded at collection time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
    Voucher,
}

impl PaymentMethod {
    /// Parse a method string from the API boundary
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "online" => Some(Self::Online),
            "voucher" => Some(Self::Voucher),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Online => "online",
            Self::Voucher => "voucher",
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub venue_id: i64,
    /// Daily per-venue sequence, e.g. "D-0042"
    pub receipt_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_mode: PaymentMode,
    pub payment_method: Option<PaymentMethod>,
    /// Dine-in table reference (mutually exclusive with counter_label)
    pub table_id: Option<i64>,
    pub table_label: Option<String>,
    /// Counter/takeaway label for non-table orders
    pub counter_label: Option<String>,
    pub guest_count: i32,
    pub total_amount: f64,
    /// Completion bypassed the SERVING/PAID precondition
    pub forced: bool,
    pub force_reason: Option<String>,
    pub paid_by: Option<i64>,
    pub completed_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
    pub completed_at: Option<i64>,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub position: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
    pub note: Option<String>,
}

/// Order with its line items (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// API Request Types
// =============================================================================

/// Line item payload for order placement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 1, max = 999))]
    pub quantity: i32,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub unit_price: f64,
    pub note: Option<String>,
}

/// Place order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    /// Dine-in table (omit for counter orders)
    pub table_id: Option<i64>,
    /// Counter label for takeaway/counter orders
    pub counter_label: Option<String>,
    pub payment_mode: PaymentMode,
    #[validate(range(min = 1, max = 64))]
    pub guest_count: Option<i32>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemCreate>,
}

/// Status transition payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    /// Prep stations to spawn kitchen tickets for when entering IN_PREP
    /// (default: a single unnamed ticket)
    pub stations: Option<Vec<String>>,
}

/// Mark paid payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPaidRequest {
    /// Payment method name: cash | card | online | voucher
    pub method: String,
}

/// Complete order payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompleteOrderRequest {
    /// Bypass the SERVING/PAID precondition (manager role required)
    #[serde(default)]
    pub forced: bool,
    pub force_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        use OrderStatus::*;
        assert!(OrderStatus::can_transition(Placed, Accepted));
        assert!(OrderStatus::can_transition(Accepted, InPrep));
        assert!(OrderStatus::can_transition(InPrep, Ready));
        assert!(OrderStatus::can_transition(Ready, Serving));
        assert!(OrderStatus::can_transition(Serving, Completed));
    }

    #[test]
    fn test_no_skipping_forward_steps() {
        use OrderStatus::*;
        assert!(!OrderStatus::can_transition(Placed, InPrep));
        assert!(!OrderStatus::can_transition(Placed, Completed));
        assert!(!OrderStatus::can_transition(Accepted, Ready));
        assert!(!OrderStatus::can_transition(InPrep, Serving));
        assert!(!OrderStatus::can_transition(Ready, Completed));
    }

    #[test]
    fn test_cancel_and_refund_from_any_non_terminal() {
        use OrderStatus::*;
        for from in [Placed, Accepted, InPrep, Ready, Serving] {
            assert!(OrderStatus::can_transition(from, Cancelled));
            assert!(OrderStatus::can_transition(from, Refunded));
        }
    }

    #[test]
    fn test_terminal_states_are_sinks() {
        use OrderStatus::*;
        for from in [Completed, Cancelled, Refunded, Expired] {
            for to in [Placed, Accepted, InPrep, Ready, Serving, Completed, Cancelled] {
                assert!(!OrderStatus::can_transition(from, to));
            }
        }
    }

    #[test]
    fn test_expiry_only_from_early_states() {
        use OrderStatus::*;
        assert!(OrderStatus::can_transition(Placed, Expired));
        assert!(OrderStatus::can_transition(Accepted, Expired));
        assert!(!OrderStatus::can_transition(InPrep, Expired));
        assert!(!OrderStatus::can_transition(Serving, Expired));
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("crypto"), None);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::InPrep).unwrap();
        assert_eq!(json, "\"IN_PREP\"");
        let json = serde_json::to_string(&PaymentMode::PayAtTill).unwrap();
        assert_eq!(json, "\"pay_at_till\"");
    }
}
