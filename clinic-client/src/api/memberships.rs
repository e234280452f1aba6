use shared::models::{Membership, MembershipIssue, MembershipLog, MembershipRenewal, MembershipTemplate};
use shared::response::{Listing, MutationReply};

use super::{MEMBERS, MEMBERSHIP_LOGS};
use crate::{ClientResult, HttpClient};

impl HttpClient {
    /// "New Member": create the customer's first membership
    pub async fn issue_membership(&self, issue: &MembershipIssue) -> ClientResult<MutationReply> {
        self.post(MEMBERS, &[], issue).await
    }

    /// Create the membership superseding the customer's current one
    pub async fn renew_membership(&self, renewal: &MembershipRenewal) -> ClientResult<MutationReply> {
        self.post(MEMBERS, &[("action", "renew".to_string())], renewal)
            .await
    }

    /// Every membership the customer ever had
    pub async fn list_memberships(&self, customer_id: i64) -> ClientResult<Vec<Membership>> {
        self.get::<Listing<Membership>>(MEMBERS, &[("customer_id", customer_id.to_string())])
            .await
            .map(Listing::into_vec)
    }

    pub async fn membership_templates(&self) -> ClientResult<Vec<MembershipTemplate>> {
        self.get::<Listing<MembershipTemplate>>(MEMBERS, &[("action", "templates".to_string())])
            .await
            .map(Listing::into_vec)
    }

    pub async fn add_membership_log(&self, log: &MembershipLog) -> ClientResult<MutationReply> {
        self.post(MEMBERSHIP_LOGS, &[], log).await
    }
}
