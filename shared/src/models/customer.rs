//! Customer Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::membership::{MembershipIssue, MembershipType};
use crate::dates;
use crate::error::{AppError, AppResult};
use crate::wire;

/// `membership_status` value for customers without a membership
pub const NO_MEMBERSHIP: &str = "None";

/// Embedded snapshot of the customer's current membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDetails {
    #[serde(rename = "type")]
    pub kind: MembershipType,
    #[serde(with = "wire::money")]
    pub coverage: Decimal,
    #[serde(alias = "remaining_balance", with = "wire::money")]
    pub remaining_balance: Decimal,
    #[serde(default, alias = "date_registered", with = "wire::opt_date")]
    pub date_registered: Option<NaiveDate>,
    #[serde(default, alias = "expire_date", with = "wire::opt_date")]
    pub expire_date: Option<NaiveDate>,
}

/// Customer entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(with = "wire::id")]
    pub id: i64,
    pub name: String,
    #[serde(default, with = "wire::opt_string")]
    pub contact: Option<String>,
    #[serde(default, with = "wire::opt_string")]
    pub email: Option<String>,
    #[serde(default, with = "wire::opt_string")]
    pub address: Option<String>,
    #[serde(default, with = "wire::opt_date")]
    pub birthday: Option<NaiveDate>,
    /// Clinic-facing customer code
    #[serde(
        default,
        rename = "customerId",
        alias = "customer_id",
        with = "wire::opt_string"
    )]
    pub customer_code: Option<String>,
    #[serde(default = "no_membership")]
    pub membership_status: String,
    #[serde(default, with = "wire::opt_id")]
    pub membership_id: Option<i64>,
    #[serde(default, rename = "membershipDetails", alias = "membership_details")]
    pub membership_details: Option<MembershipDetails>,
}

fn no_membership() -> String {
    NO_MEMBERSHIP.to_string()
}

impl Customer {
    pub fn is_member(&self) -> bool {
        !self.membership_status.trim().is_empty()
            && !self.membership_status.eq_ignore_ascii_case(NO_MEMBERSHIP)
    }

    pub fn membership_type(&self) -> Option<MembershipType> {
        self.membership_status.parse().ok()
    }

    /// Enforce "status None implies no membership details"
    pub fn normalized(mut self) -> Self {
        if !self.is_member() {
            self.membership_status = NO_MEMBERSHIP.to_string();
            self.membership_details = None;
        }
        self
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.membership_details
            .as_ref()
            .is_some_and(|d| dates::is_expired(d.expire_date, today))
    }

    pub fn remaining_balance(&self) -> Decimal {
        self.membership_details
            .as_ref()
            .map(|d| d.remaining_balance)
            .unwrap_or_default()
    }

    /// Case-insensitive match over name, contact, email and customer code
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&q));
        hit(Some(&self.name))
            || hit(self.contact.as_deref())
            || hit(self.email.as_deref())
            || hit(self.customer_code.as_deref())
    }
}

/// List segmentation understood by `customers.php?filter=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerFilter {
    #[default]
    All,
    Member,
    NonMember,
}

impl CustomerFilter {
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Member => "member",
            Self::NonMember => "nonMember",
        }
    }
}

/// Customer with client-derived badges
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(rename = "isNewMember")]
    pub is_new_member: bool,
    #[serde(rename = "isExpired")]
    pub is_expired: bool,
}

/// Create customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default, with = "wire::opt_date")]
    pub birthday: Option<NaiveDate>,
}

impl CustomerCreate {
    pub fn validated(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(AppError::required("name"));
        }
        let bad_email = self
            .email
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty() && !e.contains('@'));
        if bad_email {
            return Err(AppError::validation("Invalid email format").with_detail("field", "email"));
        }
        Ok(self)
    }
}

/// Update customer payload, `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire::opt_date")]
    pub birthday: Option<NaiveDate>,
}

/// New customer plus an optional membership signed up in the same flow
#[derive(Debug, Clone)]
pub struct CustomerRegistration {
    pub customer: CustomerCreate,
    /// Issued once the customer id is known; its `customer_id` is overwritten
    pub membership: Option<MembershipIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const MEMBER: &str = r#"{
        "id":"9","name":"Maria Santos","contact":"09171234567","email":"maria@example.com",
        "customerId":"CUST-0009","membership_status":"Pro","membership_id":"21",
        "membershipDetails":{"type":"pro","coverage":"10000","remainingBalance":"7500.00",
            "dateRegistered":"2024-05-01","expire_date":"2024-07-01"}
    }"#;

    #[test]
    fn test_member_snapshot_accepts_both_expiry_keys() {
        let c: Customer = serde_json::from_str(MEMBER).unwrap();
        assert!(c.is_member());
        assert_eq!(c.membership_type(), Some(MembershipType::Pro));
        assert_eq!(c.membership_id, Some(21));
        assert_eq!(c.remaining_balance(), Decimal::from(7500));
        assert!(!c.is_expired(d(2024, 7, 1)));
        assert!(c.is_expired(d(2024, 7, 2)));
    }

    #[test]
    fn test_non_member_drops_details() {
        let c: Customer = serde_json::from_str(
            r#"{"id":1,"name":"Jo","membership_status":"None","membership_id":null,
                "membershipDetails":{"type":"basic","coverage":0,"remainingBalance":0}}"#,
        )
        .unwrap();
        let c = c.normalized();
        assert!(!c.is_member());
        assert!(c.membership_details.is_none());
        assert!(!c.is_expired(d(2024, 1, 1)));
    }

    #[test]
    fn test_customer_search() {
        let c: Customer = serde_json::from_str(MEMBER).unwrap();
        assert!(c.matches("maria"));
        assert!(c.matches("cust-0009"));
        assert!(c.matches("0917"));
        assert!(!c.matches("pedro"));
    }

    #[test]
    fn test_create_validation() {
        assert!(CustomerCreate::default().validated().is_err());
        let bad = CustomerCreate {
            name: "Jo".into(),
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(bad.validated().is_err());
    }

    #[test]
    fn test_filter_query_values() {
        assert_eq!(CustomerFilter::NonMember.as_query(), "nonMember");
        assert_eq!(CustomerFilter::default().as_query(), "all");
    }
}
