use shared::models::{DealServiceSet, DealUpdate, DiscountDraft, PromoDraft, PromosAndDiscounts};
use shared::response::{Item, MutationReply};

use super::DEALS;
use crate::{ClientResult, HttpClient};

fn action(name: &str) -> [(&'static str, String); 1] {
    [("action", name.to_string())]
}

impl HttpClient {
    pub async fn promos_and_discounts(&self) -> ClientResult<PromosAndDiscounts> {
        self.get::<Item<PromosAndDiscounts>>(DEALS, &[])
            .await
            .map(Item::into_inner)
    }

    pub async fn add_promo(&self, promo: &PromoDraft) -> ClientResult<MutationReply> {
        self.post(DEALS, &action("addPromo"), promo).await
    }

    pub async fn add_discount(&self, discount: &DiscountDraft) -> ClientResult<MutationReply> {
        self.post(DEALS, &action("addDiscount"), discount).await
    }

    pub async fn update_deal(&self, update: &DealUpdate) -> ClientResult<MutationReply> {
        self.put(DEALS, &action("update_deal"), update).await
    }

    /// Replace the deal's service set
    pub async fn save_deal_services(&self, set: &DealServiceSet) -> ClientResult<MutationReply> {
        self.post(DEALS, &action("save_group"), set).await
    }
}
