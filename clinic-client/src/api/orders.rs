use shared::checkout::OrderRequest;

use super::ORDERS;
use crate::{ClientResult, HttpClient};

impl HttpClient {
    /// Finalize a checkout.
    ///
    /// Returns the raw body: the caller reconciles it against the local
    /// totals, including the case where it is not valid JSON.
    pub async fn submit_order(&self, order: &OrderRequest) -> ClientResult<String> {
        tracing::info!(
            order_number = %order.order_number,
            customer_id = order.customer_id,
            items = order.items.len(),
            "Submitting order"
        );
        self.post_raw(ORDERS, &[], order).await
    }
}
