//! Promo & Discount Models
//!
//! Both kinds are "deals": a discount rule with a validity window and a set
//! of services it applies to. The service set is fetched and saved separately
//! (replace-all). Status is always derived from the window, never trusted
//! from the stored `status` column.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::DealStatus;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::wire;

/// How a deal's value is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(Self::Percentage),
            "fixed" | "amount" => Ok(Self::Fixed),
            other => Err(serde::de::Error::custom(format!(
                "unknown discount type: {other}"
            ))),
        }
    }
}

impl DiscountType {
    /// Price of one unit after the deal: `price × (1 − v/100)` or `max(price − v, 0)`
    pub fn discounted_price(&self, price: Decimal, value: Decimal) -> Decimal {
        match self {
            Self::Percentage => price * (Decimal::ONE - value / Decimal::ONE_HUNDRED),
            Self::Fixed => (price - value).max(Decimal::ZERO),
        }
    }

    /// Amount taken off `base`: `base × v/100` or `v`
    pub fn reduction(&self, base: Decimal, value: Decimal) -> Decimal {
        match self {
            Self::Percentage => base * value / Decimal::ONE_HUNDRED,
            Self::Fixed => value,
        }
    }

    fn validate_value(&self, value: Decimal) -> AppResult<()> {
        if value <= Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::InvalidDiscountValue,
                "Discount value must be greater than zero",
            ));
        }
        if *self == Self::Percentage && value > Decimal::ONE_HUNDRED {
            return Err(AppError::with_message(
                ErrorCode::InvalidDiscountValue,
                "Percentage discount cannot exceed 100",
            ));
        }
        Ok(())
    }
}

/// Which of the two deal tables a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealKind {
    Promo,
    Discount,
}

/// Promotion entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promo {
    #[serde(with = "wire::id")]
    pub id: i64,
    /// Free-text promo category
    #[serde(default, rename = "type", alias = "promoType", alias = "promo_type")]
    pub promo_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "valid_from", with = "wire::opt_date", default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(alias = "valid_to", with = "wire::opt_date", default)]
    pub valid_to: Option<NaiveDate>,
    #[serde(alias = "discount_type")]
    pub discount_type: DiscountType,
    #[serde(alias = "discount_value", with = "wire::money")]
    pub discount_value: Decimal,
}

impl Promo {
    pub fn status(&self, today: NaiveDate) -> DealStatus {
        DealStatus::from_range(self.valid_from, self.valid_to, today)
    }

    pub fn discounted_price(&self, price: Decimal) -> Decimal {
        self.discount_type.discounted_price(price, self.discount_value)
    }
}

/// Discount entity (named reusable discount group)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(with = "wire::id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "discount_type")]
    pub discount_type: DiscountType,
    #[serde(alias = "discountValue", alias = "discount_value", with = "wire::money")]
    pub value: Decimal,
    #[serde(alias = "valid_from", with = "wire::opt_date", default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(alias = "valid_to", with = "wire::opt_date", default)]
    pub valid_to: Option<NaiveDate>,
}

impl Discount {
    pub fn status(&self, today: NaiveDate) -> DealStatus {
        DealStatus::from_range(self.valid_from, self.valid_to, today)
    }
}

/// `GET getPromosAndDiscounts.php` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromosAndDiscounts {
    #[serde(default)]
    pub promos: Vec<Promo>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

fn validate_window(from: NaiveDate, to: NaiveDate) -> AppResult<()> {
    if from > to {
        return Err(AppError::new(ErrorCode::InvalidDateRange)
            .with_detail("valid_from", from.to_string())
            .with_detail("valid_to", to.to_string()));
    }
    Ok(())
}

/// Create promo payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoDraft {
    #[serde(rename = "type")]
    pub promo_type: String,
    pub name: String,
    pub description: String,
    #[serde(with = "wire::date")]
    pub valid_from: NaiveDate,
    #[serde(with = "wire::date")]
    pub valid_to: NaiveDate,
    pub discount_type: DiscountType,
    #[serde(with = "wire::money")]
    pub discount_value: Decimal,
    pub service_ids: Vec<i64>,
}

impl PromoDraft {
    pub fn validated(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(AppError::required("name"));
        }
        validate_window(self.valid_from, self.valid_to)?;
        self.discount_type.validate_value(self.discount_value)?;
        dedup_ids(&mut self.service_ids);
        Ok(self)
    }
}

/// Create discount payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDraft {
    pub name: String,
    pub description: String,
    pub discount_type: DiscountType,
    #[serde(with = "wire::money")]
    pub value: Decimal,
    #[serde(with = "wire::date")]
    pub valid_from: NaiveDate,
    #[serde(with = "wire::date")]
    pub valid_to: NaiveDate,
    pub service_ids: Vec<i64>,
}

impl DiscountDraft {
    pub fn validated(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(AppError::required("name"));
        }
        validate_window(self.valid_from, self.valid_to)?;
        self.discount_type.validate_value(self.value)?;
        dedup_ids(&mut self.service_ids);
        Ok(self)
    }
}

/// `PUT ?action=update_deal` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealUpdate {
    pub id: i64,
    pub kind: DealKind,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub promo_type: Option<String>,
    pub name: String,
    pub description: String,
    pub discount_type: DiscountType,
    #[serde(with = "wire::money")]
    pub value: Decimal,
    #[serde(with = "wire::date")]
    pub valid_from: NaiveDate,
    #[serde(with = "wire::date")]
    pub valid_to: NaiveDate,
}

impl DealUpdate {
    pub fn from_promo(id: i64, draft: &PromoDraft) -> Self {
        Self {
            id,
            kind: DealKind::Promo,
            promo_type: Some(draft.promo_type.clone()),
            name: draft.name.clone(),
            description: draft.description.clone(),
            discount_type: draft.discount_type,
            value: draft.discount_value,
            valid_from: draft.valid_from,
            valid_to: draft.valid_to,
        }
    }

    pub fn from_discount(id: i64, draft: &DiscountDraft) -> Self {
        Self {
            id,
            kind: DealKind::Discount,
            promo_type: None,
            name: draft.name.clone(),
            description: draft.description.clone(),
            discount_type: draft.discount_type,
            value: draft.value,
            valid_from: draft.valid_from,
            valid_to: draft.valid_to,
        }
    }
}

/// `POST ?action=save_group` body: the full replacement service list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealServiceSet {
    pub deal_id: i64,
    pub deal_type: DealKind,
    pub service_ids: Vec<i64>,
}

impl DealServiceSet {
    pub fn new(deal_id: i64, deal_type: DealKind, mut service_ids: Vec<i64>) -> Self {
        dedup_ids(&mut service_ids);
        Self {
            deal_id,
            deal_type,
            service_ids,
        }
    }
}

fn dedup_ids(ids: &mut Vec<i64>) {
    ids.sort_unstable();
    ids.dedup();
}
