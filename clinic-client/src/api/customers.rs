use shared::models::{Customer, CustomerCreate, CustomerFilter, CustomerUpdate};
use shared::response::{Item, Listing, MutationReply};

use super::CUSTOMERS;
use crate::{ClientResult, HttpClient};

impl HttpClient {
    pub async fn list_customers(&self, filter: CustomerFilter) -> ClientResult<Vec<Customer>> {
        let customers = self
            .get::<Listing<Customer>>(CUSTOMERS, &[("filter", filter.as_query().to_string())])
            .await?
            .into_vec();
        Ok(customers.into_iter().map(Customer::normalized).collect())
    }

    pub async fn get_customer(&self, id: i64) -> ClientResult<Customer> {
        self.get::<Item<Customer>>(CUSTOMERS, &[("customerId", id.to_string())])
            .await
            .map(|c| c.into_inner().normalized())
    }

    pub async fn create_customer(&self, customer: &CustomerCreate) -> ClientResult<MutationReply> {
        self.post(CUSTOMERS, &[], customer).await
    }

    pub async fn update_customer(&self, id: i64, customer: &CustomerUpdate) -> ClientResult<MutationReply> {
        self.post(CUSTOMERS, &[("customerId", id.to_string())], customer)
            .await
    }
}
