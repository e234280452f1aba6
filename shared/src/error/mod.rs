//! Error system for the clinic console
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`AppError`]: Error with code, message and optional details
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::CartEmpty);
//! assert_eq!(err.code.code(), 4001);
//!
//! let err = AppError::validation("Invalid email format").with_detail("field", "email");
//! assert!(err.details.is_some());
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
