//! Service acquisition cart
//!
//! Lines come from three sources: manual picks, a promo's services and a
//! bundle's services. At most one promo and one discount are applied at a
//! time. Bundle lines are a unit: they are added, replaced and removed
//! together and their quantity is fixed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_money;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Bundle, Discount, DiscountType, Promo, Service};

/// Where a cart line came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LineSource {
    Manual,
    Promo { promo_id: i64 },
    Bundle { bundle_id: i64, bundle_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart-local handle, stable while the line exists
    pub line_id: u32,
    pub service_id: i64,
    pub name: String,
    pub category: String,
    /// Price counted in the subtotal
    pub price: Decimal,
    /// Catalog price of the service
    pub original_price: Decimal,
    /// Promo price per unit, promo lines only
    pub discounted_price: Option<Decimal>,
    pub quantity: u32,
    #[serde(flatten)]
    pub source: LineSource,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    pub fn is_from_promo(&self) -> bool {
        matches!(self.source, LineSource::Promo { .. })
    }

    pub fn is_from_bundle(&self) -> bool {
        matches!(self.source, LineSource::Bundle { .. })
    }

    pub fn bundle_id(&self) -> Option<i64> {
        match self.source {
            LineSource::Bundle { bundle_id, .. } => Some(bundle_id),
            _ => None,
        }
    }
}

/// The promo currently applied to the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub promo_id: i64,
    pub name: String,
    /// Amount the order total is reduced by. This is the saving of the most
    /// recently added promo line only, not the sum over all promo lines.
    pub reduction: Decimal,
}

/// The discount currently applied to the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub discount_id: i64,
    pub name: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
}

impl From<&Discount> for AppliedDiscount {
    fn from(d: &Discount) -> Self {
        Self {
            discount_id: d.id,
            name: d.name.clone(),
            discount_type: d.discount_type,
            value: d.value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    promo: Option<AppliedPromo>,
    discount: Option<AppliedDiscount>,
    next_line_id: u32,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: u32) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    pub fn discount(&self) -> Option<&AppliedDiscount> {
        self.discount.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `Σ price × quantity`
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn push(&mut self, mut line: CartLine) -> u32 {
        self.next_line_id += 1;
        line.line_id = self.next_line_id;
        self.lines.push(line);
        self.next_line_id
    }

    /// Add a manually picked service; picking it again bumps the quantity
    pub fn add_service(&mut self, service: &Service) -> u32 {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.source == LineSource::Manual && l.service_id == service.service_id)
        {
            line.quantity += 1;
            return line.line_id;
        }
        self.push(CartLine {
            line_id: 0,
            service_id: service.service_id,
            name: service.name.clone(),
            category: service.category.clone(),
            price: service.price,
            original_price: service.price,
            discounted_price: None,
            quantity: 1,
            source: LineSource::Manual,
        })
    }

    /// Add the chosen services of `promo`, replacing any previously applied
    /// promo and its lines.
    pub fn apply_promo(&mut self, promo: &Promo, services: &[Service]) -> AppResult<()> {
        if services.is_empty() {
            return Err(AppError::validation("Select at least one promo service"));
        }
        self.lines.retain(|l| !l.is_from_promo());

        let mut reduction = Decimal::ZERO;
        for service in services {
            let discounted = round_money(promo.discounted_price(service.price));
            reduction = service.price - discounted;
            self.push(CartLine {
                line_id: 0,
                service_id: service.service_id,
                name: service.name.clone(),
                category: service.category.clone(),
                price: service.price,
                original_price: service.price,
                discounted_price: Some(discounted),
                quantity: 1,
                source: LineSource::Promo { promo_id: promo.id },
            });
        }
        self.promo = Some(AppliedPromo {
            promo_id: promo.id,
            name: promo.name.clone(),
            reduction,
        });
        Ok(())
    }

    /// Add every service of `bundle` at an even split of the bundle price,
    /// replacing lines previously added from the same bundle. The rounding
    /// remainder lands on the last line so the lines sum to the bundle price.
    pub fn apply_bundle(&mut self, bundle: &Bundle) -> AppResult<()> {
        if bundle.services.is_empty() {
            return Err(AppError::new(ErrorCode::BundleEmpty).with_detail("bundle_id", bundle.id));
        }
        self.lines.retain(|l| l.bundle_id() != Some(bundle.id));

        let count = bundle.services.len();
        let share = round_money(bundle.price / Decimal::from(count));
        let last_share = bundle.price - share * Decimal::from(count - 1);
        for (i, service) in bundle.services.iter().enumerate() {
            let price = if i + 1 == count { last_share } else { share };
            self.push(CartLine {
                line_id: 0,
                service_id: service.service_id,
                name: service.name.clone(),
                category: service.category.clone(),
                price,
                original_price: service.price,
                discounted_price: None,
                quantity: 1,
                source: LineSource::Bundle {
                    bundle_id: bundle.id,
                    bundle_name: bundle.name.clone(),
                },
            });
        }
        Ok(())
    }

    /// Remove a line. A bundle line takes the whole bundle with it; removing
    /// the last promo line clears the applied promo. Returns the number of
    /// lines removed.
    pub fn remove_line(&mut self, line_id: u32) -> AppResult<usize> {
        let bundle = self
            .line(line_id)
            .ok_or_else(|| AppError::new(ErrorCode::CartLineNotFound).with_detail("line_id", line_id))?
            .bundle_id();
        let before = self.lines.len();
        match bundle {
            Some(bundle_id) => self.lines.retain(|l| l.bundle_id() != Some(bundle_id)),
            None => self.lines.retain(|l| l.line_id != line_id),
        }
        if !self.lines.iter().any(CartLine::is_from_promo) {
            self.promo = None;
        }
        Ok(before - self.lines.len())
    }

    pub fn set_quantity(&mut self, line_id: u32, quantity: u32) -> AppResult<()> {
        if quantity == 0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "Quantity must be at least 1",
            ));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| AppError::new(ErrorCode::CartLineNotFound).with_detail("line_id", line_id))?;
        if line.is_from_bundle() {
            return Err(AppError::new(ErrorCode::CartLineLocked).with_detail("line_id", line_id));
        }
        line.quantity = quantity;
        Ok(())
    }

    pub fn apply_discount(&mut self, discount: &Discount) {
        self.discount = Some(AppliedDiscount::from(discount));
    }

    pub fn clear_discount(&mut self) {
        self.discount = None;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.promo = None;
        self.discount = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{MembershipState, calculate_totals};
    use crate::models::BundleService;

    fn service(id: i64, price: i64) -> Service {
        Service {
            service_id: id,
            name: format!("Service {id}"),
            category: "Face".into(),
            price: Decimal::from(price),
            duration: None,
        }
    }

    fn bundle(id: i64, price: i64, service_ids: &[i64]) -> Bundle {
        Bundle {
            id,
            name: format!("Bundle {id}"),
            description: String::new(),
            price: Decimal::from(price),
            valid_from: None,
            valid_to: None,
            services: service_ids
                .iter()
                .map(|&sid| BundleService {
                    service_id: sid,
                    name: format!("Service {sid}"),
                    category: "Face".into(),
                    price: Decimal::from(1000),
                    duration: None,
                })
                .collect(),
        }
    }

    fn promo(id: i64, kind: DiscountType, value: i64) -> Promo {
        Promo {
            id,
            promo_type: "Seasonal".into(),
            name: format!("Promo {id}"),
            description: String::new(),
            valid_from: None,
            valid_to: None,
            discount_type: kind,
            discount_value: Decimal::from(value),
        }
    }

    #[test]
    fn test_manual_add_increments_quantity() {
        let mut cart = Cart::new();
        let a = cart.add_service(&service(1, 500));
        let b = cart.add_service(&service(1, 500));
        assert_eq!(a, b);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.subtotal(), Decimal::from(1000));
    }

    #[test]
    fn test_bundle_even_split_and_replace() {
        let mut cart = Cart::new();
        cart.apply_bundle(&bundle(7, 1800, &[1, 2, 3])).unwrap();
        assert_eq!(cart.lines().len(), 3);
        assert!(cart.lines().iter().all(|l| l.price == Decimal::new(60000, 2)));
        assert_eq!(cart.subtotal(), Decimal::from(1800));

        cart.apply_bundle(&bundle(7, 1000, &[1, 2, 3])).unwrap();
        assert_eq!(cart.lines().len(), 3);
    }

    #[test]
    fn test_uneven_bundle_split_sums_to_price() {
        let mut cart = Cart::new();
        cart.apply_bundle(&bundle(7, 1000, &[1, 2, 3])).unwrap();
        let prices: Vec<Decimal> = cart.lines().iter().map(|l| l.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::new(33333, 2), Decimal::new(33333, 2), Decimal::new(33334, 2)]
        );
        assert_eq!(cart.subtotal(), Decimal::from(1000));
        let totals = calculate_totals(&cart, &MembershipState::none());
        assert_eq!(totals.grand_total, Decimal::from(1000));
    }

    #[test]
    fn test_removing_bundle_line_removes_bundle() {
        let mut cart = Cart::new();
        cart.add_service(&service(9, 300));
        cart.apply_bundle(&bundle(7, 1800, &[1, 2])).unwrap();
        cart.apply_bundle(&bundle(8, 900, &[3])).unwrap();
        let bundle_line = cart
            .lines()
            .iter()
            .find(|l| l.bundle_id() == Some(7))
            .map(|l| l.line_id)
            .unwrap();

        assert_eq!(cart.remove_line(bundle_line).unwrap(), 2);
        assert!(cart.lines().iter().all(|l| l.bundle_id() != Some(7)));
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_bundle_quantity_locked() {
        let mut cart = Cart::new();
        cart.apply_bundle(&bundle(7, 1800, &[1, 2])).unwrap();
        let id = cart.lines()[0].line_id;
        let err = cart.set_quantity(id, 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartLineLocked);
    }

    #[test]
    fn test_empty_bundle_rejected() {
        let mut cart = Cart::new();
        let err = cart.apply_bundle(&bundle(7, 1800, &[])).unwrap_err();
        assert_eq!(err.code, ErrorCode::BundleEmpty);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_promo_lines_and_reduction() {
        let mut cart = Cart::new();
        cart.apply_promo(&promo(3, DiscountType::Percentage, 20), &[service(1, 1000), service(2, 500)])
            .unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].discounted_price, Some(Decimal::from(800)));
        assert_eq!(cart.lines()[0].price, Decimal::from(1000));
        // Only the last promo line's saving counts
        assert_eq!(cart.promo().map(|p| p.reduction), Some(Decimal::from(100)));
    }

    #[test]
    fn test_new_promo_replaces_previous() {
        let mut cart = Cart::new();
        cart.apply_promo(&promo(3, DiscountType::Fixed, 100), &[service(1, 1000)]).unwrap();
        cart.apply_promo(&promo(4, DiscountType::Fixed, 50), &[service(2, 500)]).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.promo().map(|p| p.promo_id), Some(4));
    }

    #[test]
    fn test_removing_last_promo_line_clears_promo() {
        let mut cart = Cart::new();
        cart.apply_promo(&promo(3, DiscountType::Fixed, 100), &[service(1, 1000), service(2, 500)])
            .unwrap();
        let ids: Vec<u32> = cart.lines().iter().map(|l| l.line_id).collect();
        cart.remove_line(ids[0]).unwrap();
        assert!(cart.promo().is_some());
        cart.remove_line(ids[1]).unwrap();
        assert!(cart.promo().is_none());
    }

    #[test]
    fn test_remove_unknown_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.remove_line(42).unwrap_err().code, ErrorCode::CartLineNotFound);
        cart.add_service(&service(1, 100));
        let id = cart.lines()[0].line_id;
        assert!(cart.set_quantity(id, 0).is_err());
        cart.set_quantity(id, 4).unwrap();
        assert_eq!(cart.subtotal(), Decimal::from(400));
    }
}
