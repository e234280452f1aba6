//! Customer management screen
//!
//! Lists are decorated with two client-derived flags: `is_new_member` from
//! the badge cache and `is_expired` from the membership snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::dates;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Customer, CustomerCreate, CustomerFilter, CustomerRegistration, CustomerUpdate, CustomerView,
    Membership, MembershipIssue, MembershipLog, MembershipRenewal, MembershipTemplate,
    PaymentMethod, RenewalTerms, latest_membership, renewal_terms,
};
use shared::response::{PaginatedResponse, paginate};
use std::sync::Arc;

use crate::badge::NewMemberBadges;
use crate::debounce::Debouncer;
use crate::session::SessionContext;
use crate::storage::LocalStore;
use crate::{ClientError, ClientResult, HttpClient};

/// Local cache of a customer's fetched membership history
pub const MEMBERSHIP_CACHE_PREFIX: &str = "memberships:";

fn membership_cache_key(customer_id: i64) -> String {
    format!("{MEMBERSHIP_CACHE_PREFIX}{customer_id}")
}

/// Hand-entered values for a promo renewal
#[derive(Debug, Clone, Default)]
pub struct RenewRequest {
    pub custom_coverage: Option<Decimal>,
    pub custom_expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenewOutcome {
    Renewed {
        membership_id: Option<i64>,
        terms: RenewalTerms,
    },
    /// Nothing to renew; the caller should offer to issue a membership instead
    NoPriorMembership,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub customer_id: i64,
    pub membership_id: Option<i64>,
}

pub struct CustomerManager {
    http: HttpClient,
    store: LocalStore,
    badges: NewMemberBadges,
    session: Arc<SessionContext>,
    debouncer: Debouncer,
    page_size: u32,
    filter: CustomerFilter,
    customers: Vec<CustomerView>,
}

impl CustomerManager {
    pub fn new(
        http: HttpClient,
        store: LocalStore,
        session: Arc<SessionContext>,
        debouncer: Debouncer,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            badges: NewMemberBadges::new(store.clone()),
            store,
            session,
            debouncer,
            page_size,
            filter: CustomerFilter::All,
            customers: Vec::new(),
        }
    }

    pub fn badges(&self) -> &NewMemberBadges {
        &self.badges
    }

    pub fn customers(&self) -> &[CustomerView] {
        &self.customers
    }

    pub fn filter(&self) -> CustomerFilter {
        self.filter
    }

    fn decorate(&self, customer: Customer, today: NaiveDate) -> CustomerView {
        CustomerView {
            is_new_member: self.badges.should_show(customer.id, customer.membership_id),
            is_expired: customer.is_expired(today),
            customer,
        }
    }

    /// Load one segment of the customer list
    pub async fn list(&mut self, filter: CustomerFilter) -> ClientResult<&[CustomerView]> {
        let customers = self.http.list_customers(filter).await?;
        let today = dates::today();
        let views = customers
            .into_iter()
            .map(|c| self.decorate(c, today))
            .collect::<Vec<_>>();
        tracing::info!(filter = filter.as_query(), count = views.len(), "Customers loaded");
        self.filter = filter;
        self.customers = views;
        Ok(&self.customers)
    }

    /// Reload with the current filter
    pub async fn refresh(&mut self) -> ClientResult<&[CustomerView]> {
        self.list(self.filter).await
    }

    pub async fn detail(&self, id: i64) -> ClientResult<CustomerView> {
        let customer = self.http.get_customer(id).await?;
        Ok(self.decorate(customer, dates::today()))
    }

    pub fn search(&self, query: &str) -> Vec<&CustomerView> {
        self.customers
            .iter()
            .filter(|c| c.customer.matches(query))
            .collect()
    }

    /// Search after the debounce delay; `None` when a newer query superseded this one
    pub async fn search_debounced(&self, query: &str) -> Option<Vec<CustomerView>> {
        if !self.debouncer.settle().await {
            return None;
        }
        Some(self.search(query).into_iter().cloned().collect())
    }

    pub fn page(&self, query: &str, page: u32) -> PaginatedResponse<CustomerView> {
        let matches: Vec<CustomerView> = self.search(query).into_iter().cloned().collect();
        paginate(&matches, page, self.page_size)
    }

    pub async fn create(&mut self, customer: CustomerCreate) -> ClientResult<i64> {
        let customer = customer.validated()?;
        let reply = self.http.create_customer(&customer).await?;
        let id = reply
            .id
            .ok_or_else(|| ClientError::InvalidResponse("create customer: missing id".into()))?;
        tracing::info!(customer_id = id, "Customer created");
        self.reload_after_write().await;
        Ok(id)
    }

    /// Create a customer and, when requested, issue their membership right away
    pub async fn register(&mut self, registration: CustomerRegistration) -> ClientResult<Registered> {
        let customer_id = self.create(registration.customer).await?;
        let membership_id = match registration.membership {
            Some(mut issue) => {
                issue.customer_id = customer_id;
                self.issue_membership(issue).await?
            }
            None => None,
        };
        Ok(Registered {
            customer_id,
            membership_id,
        })
    }

    pub async fn update(&mut self, id: i64, update: CustomerUpdate) -> ClientResult<()> {
        self.http.update_customer(id, &update).await?;
        tracing::info!(customer_id = id, "Customer updated");
        self.reload_after_write().await;
        Ok(())
    }

    /// "New Member": issue a membership and badge the customer
    pub async fn issue_membership(&mut self, issue: MembershipIssue) -> ClientResult<Option<i64>> {
        let attribution = self.session.attribution();
        let issue = issue
            .validated()?
            .with_attribution(attribution.branch_id, attribution.handled_by);
        let reply = self.http.issue_membership(&issue).await?;
        tracing::info!(
            customer_id = issue.customer_id,
            membership_id = ?reply.membership_id,
            kind = %issue.kind,
            "Membership issued"
        );

        if let Err(e) = self
            .badges
            .record(issue.customer_id, issue.kind, reply.membership_id)
        {
            tracing::warn!(customer_id = issue.customer_id, error = %e, "Failed to record badge");
        }
        if let Some(view) = self
            .customers
            .iter_mut()
            .find(|c| c.customer.id == issue.customer_id)
        {
            view.is_new_member = true;
        }
        Ok(reply.membership_id)
    }

    /// Membership plans offered on the "New Member" form
    pub async fn membership_templates(&self) -> ClientResult<Vec<MembershipTemplate>> {
        self.http.membership_templates().await
    }

    /// Issue a membership pre-filled from the plan `template_id`
    pub async fn issue_from_template(
        &mut self,
        customer_id: i64,
        template_id: i64,
        payment_method: PaymentMethod,
    ) -> ClientResult<Option<i64>> {
        let templates = self.membership_templates().await?;
        let template = templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| AppError::not_found(format!("Membership plan {template_id}")))?;
        let issue = MembershipIssue::from_template(customer_id, template, payment_method);
        self.issue_membership(issue).await
    }

    /// Membership history, falling back to the last cached copy on failure
    pub async fn memberships(&self, customer_id: i64) -> ClientResult<Vec<Membership>> {
        let key = membership_cache_key(customer_id);
        match self.http.list_memberships(customer_id).await {
            Ok(list) => {
                if let Err(e) = self.store.set(&key, &list) {
                    tracing::warn!(customer_id, error = %e, "Failed to cache memberships");
                }
                Ok(list)
            }
            Err(fetch_err) => match self.store.get::<Vec<Membership>>(&key) {
                Ok(Some(cached)) => {
                    tracing::warn!(customer_id, error = %fetch_err, "Using cached memberships");
                    Ok(cached)
                }
                _ => Err(fetch_err),
            },
        }
    }

    /// Renew the customer's most recent membership.
    ///
    /// Posts the renewal, then the audit log entry, then clears the badge and
    /// reloads the list. Log and badge failures after a successful renewal are
    /// logged, not returned.
    pub async fn renew_membership(
        &mut self,
        customer_id: i64,
        request: RenewRequest,
    ) -> ClientResult<RenewOutcome> {
        let history = self.memberships(customer_id).await?;
        let Some(latest) = latest_membership(&history) else {
            tracing::info!(customer_id, "No membership to renew");
            return Ok(RenewOutcome::NoPriorMembership);
        };

        let terms = renewal_terms(
            latest.kind,
            dates::today(),
            request.custom_coverage,
            request.custom_expiry,
        )?;
        let attribution = self.session.attribution();
        let renewal = MembershipRenewal::new(latest, terms)
            .with_attribution(attribution.branch_id, attribution.handled_by);

        let reply = self.http.renew_membership(&renewal).await?;
        tracing::info!(
            customer_id,
            previous = renewal.previous_membership_id,
            membership_id = ?reply.membership_id,
            "Membership renewed"
        );

        let log = MembershipLog::renewal(&renewal, reply.membership_id);
        if let Err(e) = self.http.add_membership_log(&log).await {
            tracing::warn!(customer_id, error = %e, "Failed to write membership log");
        }
        if let Err(e) = self.badges.clear(customer_id) {
            tracing::warn!(customer_id, error = %e, "Failed to clear badge after renewal");
        }
        self.reload_after_write().await;

        Ok(RenewOutcome::Renewed {
            membership_id: reply.membership_id,
            terms,
        })
    }

    /// The write already landed; a failed reload only leaves the list stale
    async fn reload_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Failed to reload customers after write");
        }
    }

    /// Look up a loaded customer
    pub fn find(&self, customer_id: i64) -> ClientResult<&CustomerView> {
        self.customers
            .iter()
            .find(|c| c.customer.id == customer_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::CustomerNotFound)
                    .with_detail("customer_id", customer_id)
                    .into()
            })
    }
}
