//! Service acquisition checkout: cart, pricing and order reconciliation

mod cart;
mod order;
mod pricing;

pub use cart::*;
pub use order::*;
pub use pricing::*;

use rust_decimal::prelude::*;

/// Decimal places for money
pub const DECIMAL_PLACES: u32 = 2;

/// Round a money amount to 2 dp, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
