//! Service Catalog Model
//!
//! Services are owned by the remote catalog; the console only reads them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::wire;

/// Service entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(alias = "id", with = "wire::id")]
    pub service_id: i64,
    #[serde(alias = "service_name")]
    pub name: String,
    #[serde(default, alias = "category_name")]
    pub category: String,
    #[serde(with = "wire::money")]
    pub price: Decimal,
    #[serde(default, with = "wire::opt_string")]
    pub duration: Option<String>,
}

/// One node of the category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    #[serde(alias = "name", alias = "group_name")]
    pub category: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Group a flat service list into categories, sorted by category name
pub fn group_by_category(services: Vec<Service>) -> Vec<ServiceCategory> {
    let mut groups: BTreeMap<String, Vec<Service>> = BTreeMap::new();
    for service in services {
        groups.entry(service.category.clone()).or_default().push(service);
    }
    groups
        .into_iter()
        .map(|(category, services)| ServiceCategory { category, services })
        .collect()
}
