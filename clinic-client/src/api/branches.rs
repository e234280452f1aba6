use shared::models::{Branch, BranchCreate, BranchUpdate, SessionUser};
use shared::response::{Item, Listing, MutationReply};

use super::BRANCHES;
use crate::{ClientResult, HttpClient};

impl HttpClient {
    pub async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.get::<Listing<Branch>>(BRANCHES, &[])
            .await
            .map(Listing::into_vec)
    }

    pub async fn get_branch(&self, id: i64) -> ClientResult<Branch> {
        self.get::<Item<Branch>>(BRANCHES, &[("id", id.to_string())])
            .await
            .map(Item::into_inner)
    }

    pub async fn create_branch(&self, branch: &BranchCreate) -> ClientResult<MutationReply> {
        self.post(BRANCHES, &[], branch).await
    }

    pub async fn update_branch(&self, id: i64, branch: &BranchUpdate) -> ClientResult<MutationReply> {
        self.post(BRANCHES, &[("id", id.to_string())], branch).await
    }

    /// Signed-in staff user
    pub async fn current_user(&self) -> ClientResult<SessionUser> {
        self.get::<Item<SessionUser>>(BRANCHES, &[("action", "user".to_string())])
            .await
            .map(Item::into_inner)
    }

    /// Signed-in administrator
    pub async fn current_admin(&self) -> ClientResult<SessionUser> {
        self.get::<Item<SessionUser>>(BRANCHES, &[("action", "admin".to_string())])
            .await
            .map(Item::into_inner)
    }
}
