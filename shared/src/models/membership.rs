//! Membership Model
//!
//! Memberships are superseded, never mutated: a renewal creates a new record
//! and the customer's `membership_id` is repointed to it.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::dates;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::wire;

/// Membership tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipType {
    Basic,
    Pro,
    Promo,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Promo => "promo",
        }
    }

    /// Coverage granted on renewal; promo coverage is entered by hand
    pub fn renewal_coverage(&self) -> Option<Decimal> {
        match self {
            Self::Basic => Some(Decimal::from(5000)),
            Self::Pro => Some(Decimal::from(10000)),
            Self::Promo => None,
        }
    }

    /// Months added to today on renewal
    pub fn renewal_months(&self) -> Option<u32> {
        match self {
            Self::Basic => Some(1),
            Self::Pro => Some(2),
            Self::Promo => None,
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            "promo" => Ok(Self::Promo),
            other => Err(AppError::validation(format!(
                "unknown membership type: {other}"
            ))),
        }
    }
}

impl Serialize for MembershipType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MembershipType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How the membership fee was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    #[serde(rename = "gcash")]
    GCash,
    BankTransfer,
}

/// Membership record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(with = "wire::id")]
    pub id: i64,
    #[serde(with = "wire::id")]
    pub customer_id: i64,
    #[serde(rename = "type")]
    pub kind: MembershipType,
    #[serde(with = "wire::money")]
    pub coverage: Decimal,
    #[serde(with = "wire::money")]
    pub remaining_balance: Decimal,
    #[serde(with = "wire::date")]
    pub date_registered: NaiveDate,
    #[serde(default, with = "wire::opt_date")]
    pub expire_date: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_id")]
    pub branch_id: Option<i64>,
    #[serde(default, with = "wire::opt_string")]
    pub performed_by: Option<String>,
}

impl Membership {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        dates::is_expired(self.expire_date, today)
    }
}

/// Most recent membership: latest `date_registered`, ties go to the higher id
pub fn latest_membership(memberships: &[Membership]) -> Option<&Membership> {
    memberships.iter().max_by_key(|m| (m.date_registered, m.id))
}

/// Membership catalog entry used to pre-fill the issue form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipTemplate {
    #[serde(with = "wire::id")]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: MembershipType,
    pub name: String,
    #[serde(with = "wire::money")]
    pub price: Decimal,
    #[serde(with = "wire::money")]
    pub consumable_amount: Decimal,
    #[serde(default, with = "wire::opt_date")]
    pub valid_until: Option<NaiveDate>,
    #[serde(default, with = "wire::flag")]
    pub no_expiration: bool,
}

/// Issue ("New Member") payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipIssue {
    pub customer_id: i64,
    #[serde(rename = "type")]
    pub kind: MembershipType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(with = "wire::money")]
    pub coverage: Decimal,
    #[serde(with = "wire::money")]
    pub remaining_balance: Decimal,
    #[serde(with = "wire::opt_date")]
    pub expire_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub branch_id: Option<i64>,
    pub performed_by: Option<String>,
}

impl MembershipIssue {
    /// Coverage is the template's consumable amount and starts fully unspent
    pub fn from_template(
        customer_id: i64,
        template: &MembershipTemplate,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            customer_id,
            kind: template.kind,
            template_id: Some(template.id),
            coverage: template.consumable_amount,
            remaining_balance: template.consumable_amount,
            expire_date: if template.no_expiration {
                None
            } else {
                template.valid_until
            },
            payment_method,
            branch_id: None,
            performed_by: None,
        }
    }

    pub fn with_attribution(mut self, branch_id: Option<i64>, performed_by: Option<String>) -> Self {
        self.branch_id = branch_id;
        self.performed_by = performed_by;
        self
    }

    pub fn validated(self) -> AppResult<Self> {
        if self.coverage <= Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::MembershipCoverageRequired,
                "Coverage must be greater than zero",
            ));
        }
        Ok(self)
    }
}

/// Coverage and expiry of a renewed membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalTerms {
    pub coverage: Decimal,
    pub expire_date: Option<NaiveDate>,
}

/// Renewal policy: basic gets 5000 for one month, pro 10000 for two months,
/// promo takes a hand-entered coverage and an optional hand-entered expiry.
pub fn renewal_terms(
    kind: MembershipType,
    today: NaiveDate,
    custom_coverage: Option<Decimal>,
    custom_expiry: Option<NaiveDate>,
) -> AppResult<RenewalTerms> {
    let coverage = match kind.renewal_coverage() {
        Some(fixed) => fixed,
        None => custom_coverage
            .filter(|c| *c > Decimal::ZERO)
            .ok_or_else(|| AppError::new(ErrorCode::MembershipCoverageRequired))?,
    };
    let expire_date = match kind.renewal_months() {
        Some(months) => Some(
            today
                .checked_add_months(Months::new(months))
                .ok_or_else(|| AppError::new(ErrorCode::InvalidDateRange))?,
        ),
        None => custom_expiry,
    };
    Ok(RenewalTerms {
        coverage,
        expire_date,
    })
}

/// Renewal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRenewal {
    pub customer_id: i64,
    /// Membership being superseded
    pub previous_membership_id: i64,
    #[serde(rename = "type")]
    pub kind: MembershipType,
    #[serde(with = "wire::money")]
    pub coverage: Decimal,
    #[serde(with = "wire::money")]
    pub remaining_balance: Decimal,
    #[serde(with = "wire::opt_date")]
    pub expire_date: Option<NaiveDate>,
    pub branch_id: Option<i64>,
    pub performed_by: Option<String>,
}

impl MembershipRenewal {
    pub fn new(previous: &Membership, terms: RenewalTerms) -> Self {
        Self {
            customer_id: previous.customer_id,
            previous_membership_id: previous.id,
            kind: previous.kind,
            coverage: terms.coverage,
            remaining_balance: terms.coverage,
            expire_date: terms.expire_date,
            branch_id: None,
            performed_by: None,
        }
    }

    pub fn with_attribution(mut self, branch_id: Option<i64>, performed_by: Option<String>) -> Self {
        self.branch_id = branch_id;
        self.performed_by = performed_by;
        self
    }
}

/// Audit trail action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipAction {
    Issue,
    Renew,
}

/// `membership_logs` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipLog {
    pub customer_id: i64,
    pub membership_id: Option<i64>,
    pub action: MembershipAction,
    #[serde(rename = "type")]
    pub kind: MembershipType,
    #[serde(with = "wire::money")]
    pub amount: Decimal,
    pub branch_id: Option<i64>,
    pub performed_by: Option<String>,
}

impl MembershipLog {
    pub fn renewal(renewal: &MembershipRenewal, new_membership_id: Option<i64>) -> Self {
        Self {
            customer_id: renewal.customer_id,
            membership_id: new_membership_id,
            action: MembershipAction::Renew,
            kind: renewal.kind,
            amount: renewal.coverage,
            branch_id: renewal.branch_id,
            performed_by: renewal.performed_by.clone(),
        }
    }
}
