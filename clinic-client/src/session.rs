//! Session context
//!
//! Resolved once when the console starts and shared by every manager:
//! staff user endpoint, then admin endpoint, then the user cached in the
//! local store by a previous session.

use shared::checkout::Attribution;
use shared::error::AppError;
use shared::models::SessionUser;

use crate::storage::LocalStore;
use crate::{ClientResult, HttpClient};

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "authToken";

/// Profile fields cleared together with the token on logout
pub const PROFILE_KEYS: &[&str] = &[
    "userId",
    "userName",
    "userRole",
    "branchId",
    "branchName",
    "email",
];

/// Where the session user came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    UserEndpoint,
    AdminEndpoint,
    Cached,
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    user: Option<SessionUser>,
    source: SessionSource,
}

impl SessionContext {
    pub async fn resolve(http: &HttpClient, store: &LocalStore) -> Self {
        let fetched = match http.current_user().await {
            Ok(user) => Some((user, SessionSource::UserEndpoint)),
            Err(user_err) => {
                tracing::debug!(error = %user_err, "User endpoint failed, trying admin endpoint");
                match http.current_admin().await {
                    Ok(admin) => Some((admin, SessionSource::AdminEndpoint)),
                    Err(admin_err) => {
                        tracing::warn!(error = %admin_err, "Session endpoints unavailable");
                        None
                    }
                }
            }
        };

        if let Some((user, source)) = fetched {
            if let Err(e) = store.set(USER_KEY, &user) {
                tracing::warn!(error = %e, "Failed to cache session user");
            }
            tracing::info!(user_id = user.id, ?source, "Session resolved");
            return Self {
                user: Some(user),
                source,
            };
        }

        match store.get::<SessionUser>(USER_KEY) {
            Ok(Some(user)) => {
                tracing::info!(user_id = user.id, "Session restored from local store");
                Self::from_user(user, SessionSource::Cached)
            }
            Ok(None) => Self::anonymous(),
            Err(e) => {
                tracing::warn!(error = %e, "Cached session user unreadable");
                Self::anonymous()
            }
        }
    }

    pub fn from_user(user: SessionUser, source: SessionSource) -> Self {
        Self {
            user: Some(user),
            source,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user: None,
            source: SessionSource::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn source(&self) -> SessionSource {
        self.source
    }

    pub fn require_user(&self) -> ClientResult<&SessionUser> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::not_authenticated().into())
    }

    /// Branch and staff attribution stamped on memberships and orders
    pub fn attribution(&self) -> Attribution {
        match &self.user {
            Some(user) => Attribution {
                branch_id: user.branch_id,
                branch_name: user.branch_name.clone(),
                handled_by: Some(user.name.clone()),
            },
            None => Attribution::default(),
        }
    }

    /// Forget the session and clear the token and profile keys
    pub fn logout(&mut self, store: &LocalStore) -> ClientResult<()> {
        let mut keys = vec![TOKEN_KEY, USER_KEY];
        keys.extend_from_slice(PROFILE_KEYS);
        let removed = store.remove_many(&keys)?;
        tracing::info!(removed, "Logged out");
        self.user = None;
        self.source = SessionSource::Anonymous;
        Ok(())
    }
}
