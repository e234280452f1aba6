//! Session User Model

use serde::{Deserialize, Serialize};

use crate::wire;

/// Signed-in console user, as returned by `branches.php?action=user|admin`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(alias = "user_id", with = "wire::id")]
    pub id: i64,
    #[serde(alias = "username", alias = "fullname")]
    pub name: String,
    #[serde(default, with = "wire::opt_string")]
    pub role: Option<String>,
    #[serde(default, with = "wire::opt_id")]
    pub branch_id: Option<i64>,
    #[serde(default, alias = "branch", with = "wire::opt_string")]
    pub branch_name: Option<String>,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }
}
