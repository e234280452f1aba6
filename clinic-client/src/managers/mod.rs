//! Screen-level managers
//!
//! One manager per console screen. Each owns a clone of the HTTP client and
//! the data its screen last loaded.

pub mod acquisition;
pub mod branch;
pub mod customer;
pub mod deals;

pub use acquisition::{AcquisitionWizard, Catalog, WizardStep};
pub use branch::BranchManager;
pub use customer::{CustomerManager, Registered, RenewOutcome, RenewRequest};
pub use deals::{DealsManager, ServiceSetEditor};
