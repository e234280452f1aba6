//! Deals catalog screen: promos, discounts and bundles
//!
//! Status is recomputed from the validity window on every read.

use chrono::NaiveDate;
use shared::error::AppError;
use shared::models::{
    Bundle, BundleDraft, DealKind, DealServiceSet, DealUpdate, Discount, DiscountDraft, Promo,
    PromoDraft, ServiceCategory,
};
use std::collections::BTreeSet;

use crate::{ClientError, ClientResult, HttpClient};

pub struct DealsManager {
    http: HttpClient,
    promos: Vec<Promo>,
    discounts: Vec<Discount>,
    bundles: Vec<Bundle>,
}

impl DealsManager {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            promos: Vec::new(),
            discounts: Vec::new(),
            bundles: Vec::new(),
        }
    }

    pub fn promos(&self) -> &[Promo] {
        &self.promos
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Reload all three tables
    pub async fn load(&mut self) -> ClientResult<()> {
        let deals = self.http.promos_and_discounts().await?;
        let bundles = self.http.list_bundles().await?;
        tracing::info!(
            promos = deals.promos.len(),
            discounts = deals.discounts.len(),
            bundles = bundles.len(),
            "Deals loaded"
        );
        self.promos = deals.promos;
        self.discounts = deals.discounts;
        self.bundles = bundles;
        Ok(())
    }

    pub fn active_promos(&self, today: NaiveDate) -> Vec<&Promo> {
        self.promos
            .iter()
            .filter(|p| p.status(today).is_active())
            .collect()
    }

    pub fn active_discounts(&self, today: NaiveDate) -> Vec<&Discount> {
        self.discounts
            .iter()
            .filter(|d| d.status(today).is_active())
            .collect()
    }

    pub fn active_bundles(&self, today: NaiveDate) -> Vec<&Bundle> {
        self.bundles
            .iter()
            .filter(|b| b.status(today).is_active())
            .collect()
    }

    /// The write already landed; a failed reload only leaves the tables stale
    async fn reload_after_write(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "Failed to reload deals after write");
        }
    }

    fn created_id(id: Option<i64>, what: &str) -> ClientResult<i64> {
        id.ok_or_else(|| ClientError::InvalidResponse(format!("create {what}: missing id")))
    }

    pub async fn create_promo(&mut self, draft: PromoDraft) -> ClientResult<i64> {
        let draft = draft.validated()?;
        let reply = self.http.add_promo(&draft).await?;
        let id = Self::created_id(reply.id, "promo")?;
        self.save_services(id, DealKind::Promo, draft.service_ids.clone())
            .await?;
        tracing::info!(promo_id = id, name = %draft.name, "Promo created");
        self.reload_after_write().await;
        Ok(id)
    }

    pub async fn update_promo(&mut self, id: i64, draft: PromoDraft) -> ClientResult<()> {
        let draft = draft.validated()?;
        self.http
            .update_deal(&DealUpdate::from_promo(id, &draft))
            .await?;
        self.save_services(id, DealKind::Promo, draft.service_ids.clone())
            .await?;
        tracing::info!(promo_id = id, "Promo updated");
        self.reload_after_write().await;
        Ok(())
    }

    pub async fn create_discount(&mut self, draft: DiscountDraft) -> ClientResult<i64> {
        let draft = draft.validated()?;
        let reply = self.http.add_discount(&draft).await?;
        let id = Self::created_id(reply.id, "discount")?;
        self.save_services(id, DealKind::Discount, draft.service_ids.clone())
            .await?;
        tracing::info!(discount_id = id, name = %draft.name, "Discount created");
        self.reload_after_write().await;
        Ok(id)
    }

    pub async fn update_discount(&mut self, id: i64, draft: DiscountDraft) -> ClientResult<()> {
        let draft = draft.validated()?;
        self.http
            .update_deal(&DealUpdate::from_discount(id, &draft))
            .await?;
        self.save_services(id, DealKind::Discount, draft.service_ids.clone())
            .await?;
        tracing::info!(discount_id = id, "Discount updated");
        self.reload_after_write().await;
        Ok(())
    }

    async fn save_services(&self, deal_id: i64, kind: DealKind, ids: Vec<i64>) -> ClientResult<()> {
        self.http
            .save_deal_services(&DealServiceSet::new(deal_id, kind, ids))
            .await?;
        Ok(())
    }

    pub async fn create_bundle(&mut self, mut draft: BundleDraft) -> ClientResult<Option<i64>> {
        draft.id = None;
        let draft = draft.validated()?;
        let reply = self.http.create_bundle(&draft).await?;
        tracing::info!(bundle_id = ?reply.id, name = %draft.name, "Bundle created");
        self.reload_after_write().await;
        Ok(reply.id)
    }

    pub async fn update_bundle(&mut self, id: i64, mut draft: BundleDraft) -> ClientResult<()> {
        draft.id = Some(id);
        let draft = draft.validated()?;
        self.http.update_bundle(&draft).await?;
        tracing::info!(bundle_id = id, "Bundle updated");
        self.reload_after_write().await;
        Ok(())
    }

    /// Open the service picker for a deal; `deal_id` is `None` for a new deal
    pub async fn service_editor(
        &self,
        kind: DealKind,
        deal_id: Option<i64>,
    ) -> ClientResult<ServiceSetEditor> {
        let groups = self.http.grouped_services().await?;
        let selected = match deal_id {
            Some(id) => self
                .http
                .deal_services(id)
                .await?
                .into_iter()
                .map(|s| s.service_id)
                .collect(),
            None => BTreeSet::new(),
        };
        Ok(ServiceSetEditor {
            kind,
            deal_id,
            groups,
            selected,
        })
    }
}

/// Selected-service editor of the promo/discount forms
#[derive(Debug, Clone)]
pub struct ServiceSetEditor {
    kind: DealKind,
    deal_id: Option<i64>,
    groups: Vec<ServiceCategory>,
    selected: BTreeSet<i64>,
}

impl ServiceSetEditor {
    pub fn groups(&self) -> &[ServiceCategory] {
        &self.groups
    }

    pub fn is_selected(&self, service_id: i64) -> bool {
        self.selected.contains(&service_id)
    }

    /// Flip one service; returns whether it is now selected
    pub fn toggle(&mut self, service_id: i64) -> bool {
        if !self.selected.remove(&service_id) {
            self.selected.insert(service_id);
            return true;
        }
        false
    }

    /// Select or clear every service of a category
    pub fn set_group(&mut self, category: &str, selected: bool) {
        let ids = self
            .groups
            .iter()
            .filter(|g| g.category == category)
            .flat_map(|g| g.services.iter().map(|s| s.service_id));
        for id in ids {
            if selected {
                self.selected.insert(id);
            } else {
                self.selected.remove(&id);
            }
        }
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    /// Send the full selection, replacing the deal's previous set
    pub async fn save(&self, http: &HttpClient) -> ClientResult<()> {
        let deal_id = self
            .deal_id
            .ok_or_else(|| AppError::validation("Save the deal before editing its services"))?;
        http.save_deal_services(&DealServiceSet::new(deal_id, self.kind, self.selected_ids()))
            .await?;
        tracing::info!(deal_id, count = self.selected.len(), "Deal services saved");
        Ok(())
    }
}
