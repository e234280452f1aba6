//! Order submission and reconciliation
//!
//! Totals computed locally are provisional. The `saveAcquire` response is
//! authoritative: whatever it echoes back replaces the local figure. When the
//! response cannot be read the order is reported as unverified rather than
//! silently shown with local numbers.

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{Cart, CartLine, LineSource};
use super::pricing::CheckoutTotals;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::wire;

/// `INV-YYMMDD-###`. The suffix is random, so numbers are not guaranteed unique.
pub fn generate_order_number(date: NaiveDate) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("INV-{}-{:03}", date.format("%y%m%d"), suffix)
}

/// Line item as sent to `saveAcquire.php`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub service_id: i64,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "wire::money")]
    pub price: Decimal,
    #[serde(with = "wire::money")]
    pub original_price: Decimal,
    #[serde(with = "wire::opt_money")]
    pub discounted_price: Option<Decimal>,
    pub is_from_promo: bool,
    pub promo_id: Option<i64>,
    pub is_from_bundle: bool,
    pub bundle_id: Option<i64>,
    pub bundle_name: Option<String>,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        let (promo_id, bundle_id, bundle_name) = match &line.source {
            LineSource::Manual => (None, None, None),
            LineSource::Promo { promo_id } => (Some(*promo_id), None, None),
            LineSource::Bundle {
                bundle_id,
                bundle_name,
            } => (None, Some(*bundle_id), Some(bundle_name.clone())),
        };
        Self {
            service_id: line.service_id,
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price,
            original_price: line.original_price,
            discounted_price: line.discounted_price,
            is_from_promo: promo_id.is_some(),
            promo_id,
            is_from_bundle: bundle_id.is_some(),
            bundle_id,
            bundle_name,
        }
    }
}

/// Who placed the order and where
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub branch_id: Option<i64>,
    pub branch_name: Option<String>,
    pub handled_by: Option<String>,
}

/// `POST saveAcquire.php` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_number: String,
    #[serde(with = "wire::date")]
    pub order_date: NaiveDate,
    pub customer_id: i64,
    pub membership_id: Option<i64>,
    pub use_membership: bool,
    pub items: Vec<OrderLine>,
    pub promo_id: Option<i64>,
    pub discount_id: Option<i64>,
    #[serde(with = "wire::money")]
    pub subtotal: Decimal,
    #[serde(with = "wire::money")]
    pub promo_reduction: Decimal,
    #[serde(with = "wire::money")]
    pub discount_reduction: Decimal,
    #[serde(with = "wire::money")]
    pub membership_discount: Decimal,
    #[serde(with = "wire::money")]
    pub balance_deduction: Decimal,
    #[serde(with = "wire::money")]
    pub grand_total: Decimal,
    pub branch_id: Option<i64>,
    pub handled_by: Option<String>,
}

/// Inputs of an order besides the cart
#[derive(Debug, Clone, PartialEq)]
pub struct OrderContext {
    pub order_number: String,
    pub order_date: NaiveDate,
    pub customer_id: i64,
    pub membership_id: Option<i64>,
    pub use_membership: bool,
    pub attribution: Attribution,
}

impl OrderRequest {
    pub fn from_checkout(cart: &Cart, totals: &CheckoutTotals, ctx: &OrderContext) -> AppResult<Self> {
        if cart.is_empty() {
            return Err(AppError::new(ErrorCode::CartEmpty));
        }
        Ok(Self {
            order_number: ctx.order_number.clone(),
            order_date: ctx.order_date,
            customer_id: ctx.customer_id,
            membership_id: ctx.membership_id,
            use_membership: ctx.use_membership,
            items: cart.lines().iter().map(OrderLine::from).collect(),
            promo_id: cart.promo().map(|p| p.promo_id),
            discount_id: cart.discount().map(|d| d.discount_id),
            subtotal: totals.subtotal,
            promo_reduction: totals.promo_reduction,
            discount_reduction: totals.discount_reduction,
            membership_discount: totals.membership_discount,
            balance_deduction: totals.balance_deduction,
            grand_total: totals.grand_total,
            branch_id: ctx.attribution.branch_id,
            handled_by: ctx.attribution.handled_by.clone(),
        })
    }
}

/// `saveAcquire.php` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Absent on replies that only echo the saved figures
    #[serde(default, with = "wire::opt_flag")]
    pub success: Option<bool>,
    #[serde(default, with = "wire::opt_string")]
    pub message: Option<String>,
    #[serde(default, with = "wire::opt_string")]
    pub error: Option<String>,
    #[serde(default, with = "wire::opt_id")]
    pub order_id: Option<i64>,
    #[serde(default, with = "wire::opt_money")]
    pub calculated_total: Option<Decimal>,
    #[serde(default, with = "wire::opt_money")]
    pub new_balance: Option<Decimal>,
    #[serde(default, with = "wire::opt_string")]
    pub branch: Option<String>,
    #[serde(default, with = "wire::opt_string")]
    pub handled_by: Option<String>,
}

/// How far the server confirmed the locally computed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileStatus {
    /// Server echoed a total equal to the local one
    Confirmed,
    /// Server total differs; the server figure is shown
    Diverged { local_total: Decimal, server_total: Decimal },
    /// Server state unknown; local figures are shown
    Unverified { reason: String },
}

/// What the confirmation step displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: String,
    pub order_id: Option<i64>,
    #[serde(flatten)]
    pub status: ReconcileStatus,
    pub grand_total: Decimal,
    pub new_balance: Option<Decimal>,
    pub branch: Option<String>,
    pub handled_by: Option<String>,
}

impl OrderConfirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, ReconcileStatus::Confirmed)
    }
}

/// Merge the server response into the provisional local totals.
///
/// A response reporting failure is an error; an unreadable response yields
/// [`ReconcileStatus::Unverified`].
pub fn reconcile(
    request: &OrderRequest,
    local: &CheckoutTotals,
    attribution: &Attribution,
    body: &str,
) -> AppResult<OrderConfirmation> {
    let local_confirmation = |status: ReconcileStatus| OrderConfirmation {
        order_number: request.order_number.clone(),
        order_id: None,
        status,
        grand_total: local.grand_total,
        new_balance: local.remaining_balance,
        branch: attribution.branch_name.clone(),
        handled_by: attribution.handled_by.clone(),
    };

    let receipt: OrderReceipt = match serde_json::from_str(body) {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::warn!(order_number = %request.order_number, error = %e, "Order response unreadable");
            return Ok(local_confirmation(ReconcileStatus::Unverified {
                reason: format!("unreadable response: {e}"),
            }));
        }
    };

    if let Some(err) = receipt.error.as_deref() {
        return Err(AppError::with_message(ErrorCode::Unknown, err));
    }
    if receipt.success == Some(false) {
        let msg = receipt.message.as_deref().unwrap_or("Order was not saved");
        return Err(AppError::with_message(ErrorCode::Unknown, msg));
    }

    let status = match receipt.calculated_total {
        Some(server) if server == local.grand_total => ReconcileStatus::Confirmed,
        Some(server) => {
            tracing::warn!(
                order_number = %request.order_number,
                local_total = %local.grand_total,
                server_total = %server,
                "Server total differs from local total"
            );
            ReconcileStatus::Diverged {
                local_total: local.grand_total,
                server_total: server,
            }
        }
        None => ReconcileStatus::Unverified {
            reason: "server did not echo a total".to_string(),
        },
    };

    Ok(OrderConfirmation {
        order_number: request.order_number.clone(),
        order_id: receipt.order_id,
        status,
        grand_total: receipt.calculated_total.unwrap_or(local.grand_total),
        new_balance: receipt.new_balance.or(local.remaining_balance),
        branch: receipt.branch.or_else(|| attribution.branch_name.clone()),
        handled_by: receipt.handled_by.or_else(|| attribution.handled_by.clone()),
    })
}
