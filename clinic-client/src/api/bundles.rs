use shared::models::{Bundle, BundleDraft};
use shared::response::{Listing, MutationReply};

use super::BUNDLES;
use crate::{ClientResult, HttpClient};

impl HttpClient {
    pub async fn list_bundles(&self) -> ClientResult<Vec<Bundle>> {
        self.get::<Listing<Bundle>>(BUNDLES, &[])
            .await
            .map(Listing::into_vec)
    }

    pub async fn create_bundle(&self, bundle: &BundleDraft) -> ClientResult<MutationReply> {
        self.post(BUNDLES, &[], bundle).await
    }

    pub async fn update_bundle(&self, bundle: &BundleDraft) -> ClientResult<MutationReply> {
        self.put(BUNDLES, &[], bundle).await
    }
}
