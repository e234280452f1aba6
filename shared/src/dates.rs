//! Calendar rules shared by every screen
//!
//! All comparisons are done on dates, never on timestamps: "today" is the
//! local calendar day, which is the midnight truncation the console relies on.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `from <= today <= to`, both bounds inclusive. A missing bound is open.
pub fn is_date_in_range(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> bool {
    from.is_none_or(|f| f <= today) && to.is_none_or(|t| today <= t)
}

/// A membership is expired once its expiry date is strictly before today.
/// Memberships without an expiry date never expire.
pub fn is_expired(expire_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    expire_date.is_some_and(|d| d < today)
}

/// Status of a promo, discount or bundle, derived from its validity window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    /// Window has not opened yet
    Scheduled,
    Active,
    /// Window has closed
    Expired,
}

impl DealStatus {
    pub fn from_range(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Self {
        if from.is_some_and(|f| today < f) {
            Self::Scheduled
        } else if to.is_some_and(|t| t < today) {
            Self::Expired
        } else {
            Self::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Label shown in the catalog tables
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Scheduled | Self::Expired => "Inactive",
        }
    }
}
