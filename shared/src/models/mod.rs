//! Data models
//!
//! Wire shapes of the remote clinic API. Rows arrive loosely typed (string
//! ids and amounts, `0|1` flags, camelCase or snake_case keys), so fields are
//! decoded through [`crate::wire`]. All IDs are `i64`.

pub mod branch;
pub mod bundle;
pub mod customer;
pub mod deal;
pub mod membership;
pub mod service;
pub mod user;

// Re-exports
pub use branch::*;
pub use bundle::*;
pub use customer::*;
pub use deal::*;
pub use membership::*;
pub use service::*;
pub use user::*;
