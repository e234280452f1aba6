//! Branch Model

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::wire;

/// Colour assigned to new branches when the form leaves it blank
pub const DEFAULT_BRANCH_COLOR: &str = "#3b82f6";

/// Placeholder the user picker shows for an unassigned branch
pub const UNASSIGNED_USER: &str = "Not assigned";

/// Branch entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(with = "wire::id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(
        default,
        rename = "contactNumber",
        alias = "contact_number",
        with = "wire::opt_string"
    )]
    pub contact_number: Option<String>,
    /// Assigned user, `None` when unassigned
    #[serde(default, with = "wire::opt_string")]
    pub user_id: Option<String>,
    #[serde(
        default,
        rename = "colorCode",
        alias = "color_code",
        with = "wire::opt_string"
    )]
    pub color_code: Option<String>,
}

impl Branch {
    /// Case-insensitive substring match over name, address and assigned user
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q)
            || self.address.to_lowercase().contains(&q)
            || self
                .user_id
                .as_deref()
                .is_some_and(|u| u.to_lowercase().contains(&q))
    }
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub name: String,
    pub address: String,
    #[serde(rename = "contactNumber")]
    pub contact_number: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "colorCode")]
    pub color_code: String,
}

impl BranchCreate {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            contact_number: None,
            user_id: None,
            color_code: DEFAULT_BRANCH_COLOR.to_string(),
        }
    }

    /// Name and address are required; blank colour falls back to the default.
    pub fn validated(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_string();
        self.address = self.address.trim().to_string();
        if self.name.is_empty() {
            return Err(AppError::required("name"));
        }
        if self.address.is_empty() {
            return Err(AppError::required("address"));
        }
        if self.color_code.trim().is_empty() {
            self.color_code = DEFAULT_BRANCH_COLOR.to_string();
        }
        self.user_id = normalize_user_id(self.user_id);
        Ok(self)
    }
}

/// Update branch payload (full replacement of the editable fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchUpdate {
    pub name: String,
    pub address: String,
    #[serde(rename = "contactNumber")]
    pub contact_number: Option<String>,
    /// Always serialized, `null` unassigns the branch
    pub user_id: Option<String>,
    #[serde(rename = "colorCode", skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,
}

impl BranchUpdate {
    pub fn from_branch(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            address: branch.address.clone(),
            contact_number: branch.contact_number.clone(),
            user_id: branch.user_id.clone(),
            color_code: branch.color_code.clone(),
        }
    }

    pub fn validated(mut self) -> AppResult<Self> {
        if self.name.trim().is_empty() {
            return Err(AppError::required("name"));
        }
        if self.address.trim().is_empty() {
            return Err(AppError::required("address"));
        }
        self.user_id = normalize_user_id(self.user_id);
        Ok(self)
    }
}

/// Map the picker's "Not assigned" sentinel and blank values to `None`
pub fn normalize_user_id(user_id: Option<String>) -> Option<String> {
    user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && u != UNASSIGNED_USER)
}
