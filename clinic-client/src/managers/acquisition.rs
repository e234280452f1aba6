//! Service acquisition wizard
//!
//! Four linear steps: pick a customer, build the cart, review, confirm.
//! Every totals figure on every step comes from [`calculate_totals`], and
//! the confirmation step shows the server's numbers once it has them.

use serde::{Deserialize, Serialize};
use shared::checkout::{
    Cart, CheckoutTotals, MembershipState, OrderConfirmation, OrderContext, OrderRequest,
    calculate_totals, generate_order_number, reconcile,
};
use shared::dates;
use shared::error::{AppError, ErrorCode};
use shared::models::{Bundle, Customer, CustomerRegistration, Discount, Promo, Service};
use shared::util::now_millis;
use std::collections::HashSet;
use std::sync::Arc;

use super::customer::CustomerManager;
use crate::badge::NewMemberBadges;
use crate::session::SessionContext;
use crate::{ClientResult, HttpClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    CustomerInfo,
    ServiceDetails,
    Review,
    Confirmation,
}

impl WizardStep {
    /// 1-based position shown in the progress bar
    pub fn number(&self) -> u8 {
        match self {
            Self::CustomerInfo => 1,
            Self::ServiceDetails => 2,
            Self::Review => 3,
            Self::Confirmation => 4,
        }
    }
}

fn invalid_step(from: WizardStep, action: &str) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidStep,
        format!("Cannot {action} from step {}", from.number()),
    )
}

/// Services and deals offered on the service step
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub services: Vec<Service>,
    pub promos: Vec<Promo>,
    pub discounts: Vec<Discount>,
    pub bundles: Vec<Bundle>,
}

pub struct AcquisitionWizard {
    http: HttpClient,
    session: Arc<SessionContext>,
    badges: NewMemberBadges,
    step: WizardStep,
    customer: Option<Customer>,
    membership: MembershipState,
    catalog: Catalog,
    cart: Cart,
    confirmation: Option<OrderConfirmation>,
}

impl AcquisitionWizard {
    pub fn new(http: HttpClient, session: Arc<SessionContext>, badges: NewMemberBadges) -> Self {
        Self {
            http,
            session,
            badges,
            step: WizardStep::default(),
            customer: None,
            membership: MembershipState::none(),
            catalog: Catalog::default(),
            cart: Cart::new(),
            confirmation: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn membership(&self) -> &MembershipState {
        &self.membership
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    // ========== Step 1: customer ==========

    /// Pick the customer and derive their membership state.
    ///
    /// Benefits start switched on for members whose membership has not
    /// expired. Premium services of the member's tier are fetched here. The
    /// new-member badge only counts during its first day.
    pub async fn select_customer(&mut self, customer: Customer) -> ClientResult<()> {
        self.require_step(WizardStep::CustomerInfo, "select a customer")?;

        let today = dates::today();
        let is_member = customer.is_member();
        let is_expired = customer.is_expired(today);

        let premium_service_ids: HashSet<i64> = match customer.membership_type() {
            Some(kind) if is_member => self
                .http
                .premium_services(kind)
                .await?
                .into_iter()
                .map(|s| s.service_id)
                .collect(),
            _ => HashSet::new(),
        };

        self.membership = MembershipState {
            is_member,
            use_membership: is_member && !is_expired,
            is_expired,
            is_new_member: is_member
                && self.badges.should_show_recent(
                    customer.id,
                    customer.membership_id,
                    now_millis(),
                ),
            balance: customer.remaining_balance(),
            premium_service_ids,
        };
        tracing::info!(
            customer_id = customer.id,
            is_member,
            is_expired,
            is_new_member = self.membership.is_new_member,
            "Customer selected"
        );
        self.customer = Some(customer);
        Ok(())
    }

    /// Register a walk-in customer and select them
    pub async fn register_customer(
        &mut self,
        customers: &mut CustomerManager,
        registration: CustomerRegistration,
    ) -> ClientResult<()> {
        self.require_step(WizardStep::CustomerInfo, "register a customer")?;
        let registered = customers.register(registration).await?;
        let view = customers.detail(registered.customer_id).await?;
        self.select_customer(view.customer).await
    }

    /// Switch membership benefits on or off
    pub fn set_use_membership(&mut self, enabled: bool) -> ClientResult<()> {
        if enabled {
            if !self.membership.is_member {
                return Err(AppError::new(ErrorCode::MembershipNotFound).into());
            }
            if self.membership.is_expired {
                self.membership.use_membership = false;
                return Err(AppError::new(ErrorCode::MembershipExpired).into());
            }
        }
        self.membership.use_membership = enabled;
        Ok(())
    }

    // ========== Step 2: services ==========

    /// Load the services and the currently active deals
    pub async fn load_catalog(&mut self) -> ClientResult<&Catalog> {
        let today = dates::today();
        let services = self.http.list_services().await?;
        let deals = self.http.promos_and_discounts().await?;
        let bundles = self.http.list_bundles().await?;

        self.catalog = Catalog {
            services,
            promos: deals
                .promos
                .into_iter()
                .filter(|p| p.status(today).is_active())
                .collect(),
            discounts: deals
                .discounts
                .into_iter()
                .filter(|d| d.status(today).is_active())
                .collect(),
            bundles: bundles
                .into_iter()
                .filter(|b| b.status(today).is_active())
                .collect(),
        };
        tracing::debug!(
            services = self.catalog.services.len(),
            promos = self.catalog.promos.len(),
            discounts = self.catalog.discounts.len(),
            bundles = self.catalog.bundles.len(),
            "Catalog loaded"
        );
        Ok(&self.catalog)
    }

    fn editable(&self) -> ClientResult<()> {
        self.require_step(WizardStep::ServiceDetails, "change the cart")
    }

    pub fn add_service(&mut self, service: &Service) -> ClientResult<u32> {
        self.editable()?;
        Ok(self.cart.add_service(service))
    }

    /// Services the promo can be applied to, for the promo picker
    pub async fn promo_services(&self, promo_id: i64) -> ClientResult<Vec<Service>> {
        self.http.deal_services(promo_id).await
    }

    /// Apply a promo to the services chosen from [`Self::promo_services`]
    pub fn apply_promo(&mut self, promo: &Promo, chosen: &[Service]) -> ClientResult<()> {
        self.editable()?;
        self.cart.apply_promo(promo, chosen)?;
        Ok(())
    }

    pub fn apply_bundle(&mut self, bundle: &Bundle) -> ClientResult<()> {
        self.editable()?;
        self.cart.apply_bundle(bundle)?;
        Ok(())
    }

    /// Remove a line; bundle lines take their whole bundle with them
    pub fn remove_line(&mut self, line_id: u32) -> ClientResult<usize> {
        self.editable()?;
        Ok(self.cart.remove_line(line_id)?)
    }

    pub fn set_quantity(&mut self, line_id: u32, quantity: u32) -> ClientResult<()> {
        self.editable()?;
        self.cart.set_quantity(line_id, quantity)?;
        Ok(())
    }

    pub fn apply_discount(&mut self, discount: &Discount) -> ClientResult<()> {
        self.editable()?;
        self.cart.apply_discount(discount);
        Ok(())
    }

    pub fn clear_discount(&mut self) -> ClientResult<()> {
        self.editable()?;
        self.cart.clear_discount();
        Ok(())
    }

    /// Figures for the summary and review panels
    pub fn totals(&self) -> CheckoutTotals {
        calculate_totals(&self.cart, &self.membership)
    }

    // ========== Navigation ==========

    pub fn next(&mut self) -> ClientResult<WizardStep> {
        self.step = match self.step {
            WizardStep::CustomerInfo => {
                if self.customer.is_none() {
                    return Err(AppError::new(ErrorCode::CustomerNotSelected).into());
                }
                WizardStep::ServiceDetails
            }
            WizardStep::ServiceDetails => {
                if self.cart.is_empty() {
                    return Err(AppError::new(ErrorCode::CartEmpty).into());
                }
                WizardStep::Review
            }
            from => return Err(invalid_step(from, "continue").into()),
        };
        Ok(self.step)
    }

    /// Go back one step; the cart is kept
    pub fn back(&mut self) -> ClientResult<WizardStep> {
        self.step = match self.step {
            WizardStep::ServiceDetails => WizardStep::CustomerInfo,
            WizardStep::Review => WizardStep::ServiceDetails,
            from => return Err(invalid_step(from, "go back").into()),
        };
        Ok(self.step)
    }

    fn require_step(&self, expected: WizardStep, action: &str) -> ClientResult<()> {
        if self.step != expected {
            return Err(invalid_step(self.step, action).into());
        }
        Ok(())
    }

    // ========== Step 4: confirmation ==========

    /// Submit the order and reconcile the local totals with the server's.
    ///
    /// A rejected order leaves the wizard on the review step. An unreadable
    /// response still moves to confirmation, flagged as unverified.
    pub async fn place_order(&mut self) -> ClientResult<&OrderConfirmation> {
        self.require_step(WizardStep::Review, "place an order")?;
        let customer = self
            .customer
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::CustomerNotSelected))?;

        let today = dates::today();
        let totals = self.totals();
        let attribution = self.session.attribution();
        let ctx = OrderContext {
            order_number: generate_order_number(today),
            order_date: today,
            customer_id: customer.id,
            membership_id: customer.membership_id,
            use_membership: self.membership.use_membership,
            attribution: attribution.clone(),
        };
        let request = OrderRequest::from_checkout(&self.cart, &totals, &ctx)?;

        tracing::info!(
            order_number = %request.order_number,
            customer_id = request.customer_id,
            items = request.items.len(),
            grand_total = %request.grand_total,
            "Placing order"
        );
        let body = self.http.submit_order(&request).await?;
        let confirmation = reconcile(&request, &totals, &attribution, &body)?;
        tracing::info!(
            order_number = %confirmation.order_number,
            confirmed = confirmation.is_confirmed(),
            grand_total = %confirmation.grand_total,
            "Order placed"
        );

        self.step = WizardStep::Confirmation;
        Ok(self.confirmation.insert(confirmation))
    }

    /// Start over for the next customer; the loaded catalog is kept
    pub fn reset(&mut self) {
        self.step = WizardStep::CustomerInfo;
        self.customer = None;
        self.membership = MembershipState::none();
        self.cart.clear();
        self.confirmation = None;
    }
}
