//! Reservation Model (预订)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Booked,
    CheckedIn,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Whether this reservation still occupies its slot
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Booked | Self::CheckedIn)
    }

    /// Allowed transitions: BOOKED -> CHECKED_IN -> COMPLETED;
    /// CANCELLED from BOOKED/CHECKED_IN.
    pub fn can_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
        match to {
            Self::CheckedIn => from == Self::Booked,
            Self::Completed => matches!(from, Self::Booked | Self::CheckedIn),
            Self::Cancelled => from.is_active(),
            Self::Booked => false,
        }
    }
}

/// Why a reservation was auto-completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// end_at has passed
    TimeExpired,
    /// Party checked in, table settled and cleared
    PaymentCompleted,
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub venue_id: i64,
    /// Assigned at check-in (nullable until seated)
    pub table_id: Option<i64>,
    pub status: ReservationStatus,
    pub customer_name: String,
    pub party_size: i32,
    pub start_at: i64,
    pub end_at: i64,
    pub completed_reason: Option<CompletionReason>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Book reservation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    #[validate(length(min = 1, max = 120))]
    pub customer_name: String,
    #[validate(range(min = 1, max = 64))]
    pub party_size: i32,
    pub start_at: i64,
    pub end_at: i64,
    pub table_id: Option<i64>,
}

/// Check-in payload (seats the party at a table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub table_id: i64,
}

/// Auto-complete sweep summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoCompleteSummary {
    pub completed: u32,
    pub time_expired: u32,
    pub payment_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_transitions() {
        use ReservationStatus::*;
        assert!(ReservationStatus::can_transition(Booked, CheckedIn));
        assert!(ReservationStatus::can_transition(Booked, Completed));
        assert!(ReservationStatus::can_transition(CheckedIn, Completed));
        assert!(ReservationStatus::can_transition(Booked, Cancelled));
        assert!(ReservationStatus::can_transition(CheckedIn, Cancelled));

        assert!(!ReservationStatus::can_transition(Completed, Cancelled));
        assert!(!ReservationStatus::can_transition(Cancelled, CheckedIn));
        assert!(!ReservationStatus::can_transition(CheckedIn, Booked));
    }
}
