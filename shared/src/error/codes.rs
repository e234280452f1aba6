//! Unified error codes for the clinic console
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Session errors
//! - 2xxx: Branch errors
//! - 3xxx: Customer and membership errors
//! - 4xxx: Checkout and order errors
//! - 5xxx: Deals catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes serialize as plain `u16` values.
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
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Session ====================
    /// No user could be resolved for the session
    NotAuthenticated = 1001,

    // ==================== 2xxx: Branch ====================
    /// Branch not found
    BranchNotFound = 2001,

    // ==================== 3xxx: Customer / Membership ====================
    /// Customer not found
    CustomerNotFound = 3001,
    /// Customer has no membership
    MembershipNotFound = 3101,
    /// Membership has expired
    MembershipExpired = 3102,
    /// Membership type requires a custom coverage amount
    MembershipCoverageRequired = 3103,

    // ==================== 4xxx: Checkout ====================
    /// Cart is empty
    CartEmpty = 4001,
    /// Cart line not found
    CartLineNotFound = 4002,
    /// Cart line is locked (bundle line)
    CartLineLocked = 4003,
    /// No customer selected
    CustomerNotSelected = 4004,
    /// Wizard step transition not allowed
    InvalidStep = 4005,

    // ==================== 5xxx: Deals ====================
    /// Bundle has no services
    BundleEmpty = 5001,
    /// Date range is inverted
    InvalidDateRange = 5002,
    /// Discount value is invalid
    InvalidDiscountValue = 5003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            ErrorCode::NotAuthenticated => "User is not authenticated",

            ErrorCode::BranchNotFound => "Branch not found",

            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::MembershipNotFound => "Customer has no membership",
            ErrorCode::MembershipExpired => "Membership has expired",
            ErrorCode::MembershipCoverageRequired => "A coverage amount is required",

            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartLineNotFound => "Cart line not found",
            ErrorCode::CartLineLocked => "Bundle lines cannot be edited individually",
            ErrorCode::CustomerNotSelected => "No customer selected",
            ErrorCode::InvalidStep => "Step transition not allowed",

            ErrorCode::BundleEmpty => "Bundle has no services",
            ErrorCode::InvalidDateRange => "Start date is after end date",
            ErrorCode::InvalidDiscountValue => "Invalid discount value",

            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
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
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            1001 => Ok(ErrorCode::NotAuthenticated),

            2001 => Ok(ErrorCode::BranchNotFound),

            3001 => Ok(ErrorCode::CustomerNotFound),
            3101 => Ok(ErrorCode::MembershipNotFound),
            3102 => Ok(ErrorCode::MembershipExpired),
            3103 => Ok(ErrorCode::MembershipCoverageRequired),

            4001 => Ok(ErrorCode::CartEmpty),
            4002 => Ok(ErrorCode::CartLineNotFound),
            4003 => Ok(ErrorCode::CartLineLocked),
            4004 => Ok(ErrorCode::CustomerNotSelected),
            4005 => Ok(ErrorCode::InvalidStep),

            5001 => Ok(ErrorCode::BundleEmpty),
            5002 => Ok(ErrorCode::InvalidDateRange),
            5003 => Ok(ErrorCode::InvalidDiscountValue),

            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
