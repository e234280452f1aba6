//! Bundle Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::DealStatus;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::wire;

/// Service included in a bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleService {
    #[serde(with = "wire::id")]
    pub service_id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Regular price of the service outside the bundle
    #[serde(alias = "originalPrice", alias = "original_price", with = "wire::money")]
    pub price: Decimal,
    #[serde(default, with = "wire::opt_string")]
    pub duration: Option<String>,
}

/// Fixed-price grouping of services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(with = "wire::id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "wire::money")]
    pub price: Decimal,
    #[serde(alias = "valid_from", with = "wire::opt_date", default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(alias = "valid_to", with = "wire::opt_date", default)]
    pub valid_to: Option<NaiveDate>,
    #[serde(default)]
    pub services: Vec<BundleService>,
}

/// What a customer saves by buying the bundle instead of its services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleSavings {
    /// Sum of the included services' regular prices
    pub regular_total: Decimal,
    pub savings: Decimal,
    /// `None` for a bundle without services
    pub percent: Option<Decimal>,
}

impl Bundle {
    pub fn status(&self, today: NaiveDate) -> DealStatus {
        DealStatus::from_range(self.valid_from, self.valid_to, today)
    }

    pub fn savings(&self) -> BundleSavings {
        savings(self.price, self.services.iter().map(|s| s.price))
    }

    pub fn service_ids(&self) -> Vec<i64> {
        self.services.iter().map(|s| s.service_id).collect()
    }
}

/// `sum(prices) - bundle_price`, and the same over `sum(prices)` as a percentage
pub fn savings(bundle_price: Decimal, prices: impl IntoIterator<Item = Decimal>) -> BundleSavings {
    let regular_total: Decimal = prices.into_iter().sum();
    let savings = regular_total - bundle_price;
    let percent = (!regular_total.is_zero())
        .then(|| (savings / regular_total * Decimal::ONE_HUNDRED).round_dp(2));
    BundleSavings {
        regular_total,
        savings,
        percent,
    }
}

/// Create/update bundle payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    #[serde(with = "wire::money")]
    pub price: Decimal,
    #[serde(with = "wire::date")]
    pub valid_from: NaiveDate,
    #[serde(with = "wire::date")]
    pub valid_to: NaiveDate,
    pub service_ids: Vec<i64>,
}

impl BundleDraft {
    pub fn validated(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(AppError::required("name"));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "Bundle price cannot be negative",
            ));
        }
        if self.valid_from > self.valid_to {
            return Err(AppError::new(ErrorCode::InvalidDateRange));
        }
        self.service_ids.sort_unstable();
        self.service_ids.dedup();
        if self.service_ids.is_empty() {
            return Err(AppError::new(ErrorCode::BundleEmpty));
        }
        Ok(self)
    }
}
