//! Typed endpoints of the clinic API
//!
//! Each submodule adds an `impl HttpClient` block for one PHP endpoint group.

mod branches;
mod bundles;
mod catalog;
mod customers;
mod deals;
mod memberships;
mod orders;

pub const BRANCHES: &str = "branches.php";
pub const CUSTOMERS: &str = "customers.php";
pub const MEMBERS: &str = "members.php";
pub const MEMBERSHIP_LOGS: &str = "membership_logs.php";
pub const DEALS: &str = "getPromosAndDiscounts.php";
pub const BUNDLES: &str = "bundles.php";
pub const SERVICE_GROUPS: &str = "servicegroup.php";
pub const ORDERS: &str = "saveAcquire.php";
