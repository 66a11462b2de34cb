//! Unified error codes for the Galley coordinator
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Kitchen errors
//! - 7xxx: Table errors
//! - 8xxx: Reservation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4002,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4003,
    /// Requested status transition is not allowed
    InvalidStatusTransition = 4004,
    /// Payment must be collected first
    PaymentRequired = 4005,
    /// Order must be in SERVING status
    OrderNotServing = 4006,
    /// Order has no line items
    OrderEmpty = 4007,

    // ==================== 5xxx: Payment ====================
    /// Payment method is not recognized
    InvalidPaymentMethod = 5001,
    /// Payment has been refunded
    PaymentRefunded = 5002,

    // ==================== 6xxx: Kitchen ====================
    /// Kitchen ticket not found
    TicketNotFound = 6001,
    /// Ticket status value is not valid for this operation
    InvalidTicketStatus = 6002,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied
    TableOccupied = 7002,
    /// Table session must be FREE
    TableNotFree = 7003,
    /// Table is not part of a merge
    TableNotMerged = 7004,
    /// Table is merged into another table
    TableMerged = 7005,

    // ==================== 8xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 8001,
    /// Reservation is not in an active status
    ReservationNotActive = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::NotAuthenticated => "Authentication required",

            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Insufficient role for this action",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::InvalidStatusTransition => "Status transition not allowed",
            ErrorCode::PaymentRequired => {
                "Payment must be collected before marking order as COMPLETED"
            }
            ErrorCode::OrderNotServing => "Order must be SERVING before completion",
            ErrorCode::OrderEmpty => "Order has no line items",

            ErrorCode::InvalidPaymentMethod => "Payment method is not recognized",
            ErrorCode::PaymentRefunded => "Payment has been refunded",

            ErrorCode::TicketNotFound => "Kitchen ticket not found",
            ErrorCode::InvalidTicketStatus => "Invalid ticket status",

            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is occupied",
            ErrorCode::TableNotFree => "Table session must be FREE",
            ErrorCode::TableNotMerged => "Table is not part of a merge",
            ErrorCode::TableMerged => "Table is merged into another table",

            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationNotActive => "Reservation is not active",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            1001 => Ok(ErrorCode::NotAuthenticated),

            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyCompleted),
            4003 => Ok(ErrorCode::OrderAlreadyCancelled),
            4004 => Ok(ErrorCode::InvalidStatusTransition),
            4005 => Ok(ErrorCode::PaymentRequired),
            4006 => Ok(ErrorCode::OrderNotServing),
            4007 => Ok(ErrorCode::OrderEmpty),

            5001 => Ok(ErrorCode::InvalidPaymentMethod),
            5002 => Ok(ErrorCode::PaymentRefunded),

            6001 => Ok(ErrorCode::TicketNotFound),
            6002 => Ok(ErrorCode::InvalidTicketStatus),

            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableNotFree),
            7004 => Ok(ErrorCode::TableNotMerged),
            7005 => Ok(ErrorCode::TableMerged),

            8001 => Ok(ErrorCode::ReservationNotFound),
            8002 => Ok(ErrorCode::ReservationNotActive),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InvalidPaymentMethod.code(), 5001);
        assert_eq!(ErrorCode::TableOccupied.code(), 7002);
        assert_eq!(ErrorCode::ReservationNotFound.code(), 8001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::RoleRequired,
            ErrorCode::OrderAlreadyCompleted,
            ErrorCode::PaymentRequired,
            ErrorCode::TicketNotFound,
            ErrorCode::TableNotFree,
            ErrorCode::ReservationNotActive,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_display_is_numeric() {
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
    }

    #[test]
    fn test_serde_as_u16() {
        let json = serde_json::to_string(&ErrorCode::TableOccupied).unwrap();
        assert_eq!(json, "7002");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::TableOccupied);
    }
}
