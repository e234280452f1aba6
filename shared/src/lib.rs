//! Shared types for the clinic console
//!
//! Wire models of the remote clinic API, the date rules every screen uses,
//! and the checkout core (cart, pricing, order reconciliation). Pure code,
//! no I/O.

pub mod checkout;
pub mod dates;
pub mod error;
pub mod models;
pub mod response;
pub mod util;
pub mod wire;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use response::{Item, Listing, MutationReply, PaginatedResponse, Pagination, paginate};
