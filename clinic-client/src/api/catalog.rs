use shared::models::{MembershipType, Service, ServiceCategory};
use shared::response::Listing;

use super::SERVICE_GROUPS;
use crate::{ClientResult, HttpClient};

impl HttpClient {
    pub async fn list_services(&self) -> ClientResult<Vec<Service>> {
        self.get::<Listing<Service>>(SERVICE_GROUPS, &[("action", "services".to_string())])
            .await
            .map(Listing::into_vec)
    }

    /// Category tree used by the service pickers
    pub async fn grouped_services(&self) -> ClientResult<Vec<ServiceCategory>> {
        self.get::<Listing<ServiceCategory>>(SERVICE_GROUPS, &[("action", "grouped".to_string())])
            .await
            .map(Listing::into_vec)
    }

    /// Services currently attached to a promo or discount
    pub async fn deal_services(&self, deal_id: i64) -> ClientResult<Vec<Service>> {
        let query = [
            ("action", "deal_services".to_string()),
            ("deal_id", deal_id.to_string()),
        ];
        self.get::<Listing<Service>>(SERVICE_GROUPS, &query)
            .await
            .map(Listing::into_vec)
    }

    /// Services discounted for members of the given tier
    pub async fn premium_services(&self, membership: MembershipType) -> ClientResult<Vec<Service>> {
        let query = [
            ("action", "premium".to_string()),
            ("membership_type", membership.to_string()),
        ];
        self.get::<Listing<Service>>(SERVICE_GROUPS, &query)
            .await
            .map(Listing::into_vec)
    }
}
