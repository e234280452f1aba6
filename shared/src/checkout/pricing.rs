//! Checkout pricing
//!
//! [`calculate_totals`] is the only place order totals are computed. The
//! service-details summary, the review step and order submission all call it
//! with the same inputs and get the same figures.
//!
//! # Membership policy
//!
//! Members who signed up in this visit (`is_new_member`) pay from their
//! prepaid balance; returning members get 50% off premium services instead.
//! The two benefits never apply together. This is a product rule, not an
//! accident of the formula.
//!
//! # Calculation Steps
//! 1. `subtotal = Σ price × quantity`
//! 2. Promo reduction: the applied promo's single reduction figure
//! 3. Discount reduction: `subtotal × v/100` or `v`
//! 4. Premium subtotal over manual lines whose service is a premium service
//! 5. Membership discount: 50% of the premium subtotal when allowed
//! 6. Balance deduction over manual lines, new members only
//! 7. `grand_total = max(0, subtotal - promo - discount - membership)`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::cart::Cart;
use super::round_money;

/// Share of the premium subtotal returning members get off
const MEMBER_PREMIUM_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Membership inputs of a checkout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipState {
    pub is_member: bool,
    /// "Use membership benefits" toggle
    pub use_membership: bool,
    pub is_expired: bool,
    pub is_new_member: bool,
    pub balance: Decimal,
    /// Services discounted for this membership tier
    pub premium_service_ids: HashSet<i64>,
}

impl MembershipState {
    /// Non-member checkout
    pub fn none() -> Self {
        Self::default()
    }

    fn benefits_on(&self) -> bool {
        self.is_member && self.use_membership
    }
}

/// Every figure shown on the summary and review panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub promo_reduction: Decimal,
    pub discount_reduction: Decimal,
    pub premium_subtotal: Decimal,
    pub can_use_discount: bool,
    pub membership_discount: Decimal,
    /// Manual lines only; promo and bundle lines are already discounted
    pub eligible_total: Decimal,
    pub amount_after_discount: Decimal,
    pub balance_deduction: Decimal,
    pub membership_reduction: Decimal,
    pub grand_total: Decimal,
    /// Provisional balance after this order, `None` when no balance applies
    pub remaining_balance: Option<Decimal>,
}

pub fn calculate_totals(cart: &Cart, membership: &MembershipState) -> CheckoutTotals {
    let lines = cart.lines();
    let subtotal = cart.subtotal();

    let promo_reduction = cart.promo().map(|p| p.reduction).unwrap_or_default();

    let discount_reduction = cart
        .discount()
        .map(|d| d.discount_type.reduction(subtotal, d.value))
        .unwrap_or_default();

    let manual = || lines.iter().filter(|l| !l.is_from_promo() && !l.is_from_bundle());

    let premium_subtotal: Decimal = manual()
        .filter(|l| membership.premium_service_ids.contains(&l.service_id))
        .map(|l| l.line_total())
        .sum();

    let can_use_discount = membership.benefits_on()
        && !membership.is_expired
        && (!membership.is_new_member || membership.balance <= Decimal::ZERO);

    let membership_discount = if can_use_discount {
        premium_subtotal * MEMBER_PREMIUM_RATE
    } else {
        Decimal::ZERO
    };

    let eligible_total: Decimal = manual().map(|l| l.line_total()).sum();

    let amount_after_discount = if !membership.is_new_member && membership_discount > Decimal::ZERO {
        (eligible_total - membership_discount).max(Decimal::ZERO)
    } else {
        eligible_total
    };

    let balance_deduction = if membership.benefits_on()
        && membership.is_new_member
        && membership.balance > Decimal::ZERO
        && !membership.is_expired
    {
        membership.balance.min(amount_after_discount)
    } else {
        Decimal::ZERO
    };

    let membership_reduction = match (membership.benefits_on(), membership.is_new_member) {
        (false, _) => Decimal::ZERO,
        (true, true) => balance_deduction,
        (true, false) => membership_discount,
    };

    let grand_total =
        (subtotal - promo_reduction - discount_reduction - membership_reduction).max(Decimal::ZERO);

    let remaining_balance = (membership.is_member && membership.balance > Decimal::ZERO)
        .then(|| membership.balance - balance_deduction);

    CheckoutTotals {
        subtotal: round_money(subtotal),
        promo_reduction: round_money(promo_reduction),
        discount_reduction: round_money(discount_reduction),
        premium_subtotal: round_money(premium_subtotal),
        can_use_discount,
        membership_discount: round_money(membership_discount),
        eligible_total: round_money(eligible_total),
        amount_after_discount: round_money(amount_after_discount),
        balance_deduction: round_money(balance_deduction),
        membership_reduction: round_money(membership_reduction),
        grand_total: round_money(grand_total),
        remaining_balance: remaining_balance.map(round_money),
    }
}
