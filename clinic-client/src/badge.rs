//! "New member" badge cache
//!
//! Advisory annotation, never a source of truth. Stored per customer under
//! `newMember:<customer id>` as `{type, membershipId, createdAt}`.
//!
//! Invalidation: an entry whose `membershipId` differs from the customer's
//! current `membership_id` (both known) belongs to a superseded membership
//! and is deleted on read. Entries that fail to decode are deleted too.

use serde::{Deserialize, Serialize};
use shared::models::MembershipType;
use shared::util::{DAY_MILLIS, is_older_than, now_millis};

use crate::ClientResult;
use crate::storage::LocalStore;

pub const BADGE_KEY_PREFIX: &str = "newMember:";

/// Age after which [`NewMemberBadges::should_show_recent`] drops an entry
pub const RECENT_WINDOW_MS: i64 = DAY_MILLIS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeEntry {
    #[serde(rename = "type")]
    pub kind: MembershipType,
    #[serde(rename = "membershipId")]
    pub membership_id: Option<i64>,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewMemberBadges {
    store: LocalStore,
}

pub fn badge_key(customer_id: i64) -> String {
    format!("{BADGE_KEY_PREFIX}{customer_id}")
}

impl NewMemberBadges {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn record(
        &self,
        customer_id: i64,
        kind: MembershipType,
        membership_id: Option<i64>,
    ) -> ClientResult<()> {
        let entry = BadgeEntry {
            kind,
            membership_id,
            created_at: now_millis(),
        };
        self.store.set(&badge_key(customer_id), &entry)?;
        tracing::debug!(customer_id, ?membership_id, "New member badge recorded");
        Ok(())
    }

    /// Read an entry, dropping it when it cannot be decoded
    pub fn entry(&self, customer_id: i64) -> Option<BadgeEntry> {
        let key = badge_key(customer_id);
        match self.store.get::<BadgeEntry>(&key) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(customer_id, error = %e, "Dropping unreadable badge entry");
                self.discard(&key);
                None
            }
        }
    }

    /// Whether the customer still carries the "new member" badge
    pub fn should_show(&self, customer_id: i64, current_membership_id: Option<i64>) -> bool {
        let Some(entry) = self.entry(customer_id) else {
            return false;
        };
        if let (Some(stored), Some(current)) = (entry.membership_id, current_membership_id)
            && stored != current
        {
            tracing::debug!(customer_id, stored, current, "Membership renewed, clearing badge");
            self.discard(&badge_key(customer_id));
            return false;
        }
        true
    }

    /// [`Self::should_show`] that also expires entries older than a day
    pub fn should_show_recent(
        &self,
        customer_id: i64,
        current_membership_id: Option<i64>,
        now_ms: i64,
    ) -> bool {
        if !self.should_show(customer_id, current_membership_id) {
            return false;
        }
        let expired = self
            .entry(customer_id)
            .is_none_or(|e| is_older_than(e.created_at, RECENT_WINDOW_MS, now_ms));
        if expired {
            self.discard(&badge_key(customer_id));
            return false;
        }
        true
    }

    pub fn clear(&self, customer_id: i64) -> ClientResult<()> {
        self.store.remove(&badge_key(customer_id))?;
        Ok(())
    }

    /// Badge removal is best effort; failures are logged
    fn discard(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove badge entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn badges() -> (TempDir, NewMemberBadges) {
        let dir = TempDir::new().unwrap();
        let badges = NewMemberBadges::new(LocalStore::in_dir(dir.path()));
        (dir, badges)
    }

    #[test]
    fn test_badge_survives_same_membership() {
        let (_dir, badges) = badges();
        badges.record(7, MembershipType::Basic, Some(100)).unwrap();
        assert!(badges.should_show(7, Some(100)));
        assert!(badges.should_show(7, None));
        assert!(badges.entry(7).is_some());
    }

    #[test]
    fn test_badge_cleared_after_renewal() {
        let (_dir, badges) = badges();
        badges.record(7, MembershipType::Pro, Some(100)).unwrap();
        assert!(!badges.should_show(7, Some(101)));
        assert!(badges.entry(7).is_none());
        assert!(!badges.should_show(7, Some(100)));
    }

    #[test]
    fn test_no_entry_no_badge() {
        let (_dir, badges) = badges();
        assert!(!badges.should_show(1, Some(1)));
    }

    #[test]
    fn test_unknown_stored_id_keeps_badge() {
        let (_dir, badges) = badges();
        badges.record(3, MembershipType::Promo, None).unwrap();
        assert!(badges.should_show(3, Some(55)));
    }

    #[test]
    fn test_recent_window() {
        let (_dir, badges) = badges();
        badges.record(7, MembershipType::Basic, Some(1)).unwrap();
        let created = badges.entry(7).unwrap().created_at;
        assert!(badges.should_show_recent(7, Some(1), created + DAY_MILLIS));
        assert!(!badges.should_show_recent(7, Some(1), created + DAY_MILLIS + 1));
        assert!(badges.entry(7).is_none());
    }

    #[test]
    fn test_corrupt_entry_removed() {
        let (dir, badges) = badges();
        let store = LocalStore::in_dir(dir.path());
        store.set(&badge_key(4), &"garbage").unwrap();
        assert!(!badges.should_show(4, Some(1)));
        assert!(!store.contains(&badge_key(4)));
    }
}
