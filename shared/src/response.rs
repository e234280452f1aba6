//! API Response types
//!
//! The clinic endpoints do not share one envelope. Lists come back either as
//! a bare JSON array or wrapped in `{"data": [...]}`; mutations answer with
//! some subset of `success` / `message` / `error` / `id`.

use serde::{Deserialize, Serialize};

use crate::wire;

/// Default client-side page size
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// List body, bare or wrapped
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(default = "Vec::new")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) => items,
            Self::Wrapped { data } => data,
        }
    }
}

/// Single-record body, bare or wrapped in `{"data": {...}}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Item<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Item<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Reply to a create/update/issue call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationReply {
    #[serde(default, with = "wire::opt_flag")]
    pub success: Option<bool>,
    #[serde(default, with = "wire::opt_string")]
    pub message: Option<String>,
    #[serde(default, with = "wire::opt_string")]
    pub error: Option<String>,
    #[serde(default, alias = "insert_id", alias = "customer_id", with = "wire::opt_id")]
    pub id: Option<i64>,
    #[serde(default, alias = "membershipId", with = "wire::opt_id")]
    pub membership_id: Option<i64>,
}

impl MutationReply {
    /// Business error reported by the server, if any.
    ///
    /// A non-empty `error` always counts; `success: false` counts with its
    /// `message` (or a generic text) as the reason.
    pub fn failure(&self) -> Option<String> {
        if let Some(err) = self.error.as_deref() {
            return Some(err.to_string());
        }
        match self.success {
            Some(false) => Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| "Request failed".to_string()),
            ),
            _ => None,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total number of items
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(per_page)) as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaginatedResponse<T> {
    /// List of items
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}

/// Slice one page out of `items`; `page` is 1-based and clamped to 1
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> PaginatedResponse<T> {
    let page = page.max(1);
    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let slice = items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect();
    PaginatedResponse::new(slice, page, per_page, items.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_both_shapes() {
        let bare: Listing<i64> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2, 3]);
        let wrapped: Listing<i64> = serde_json::from_str(r#"{"success":true,"data":[4]}"#).unwrap();
        assert_eq!(wrapped.into_vec(), vec![4]);

        let item: Item<Vec<i64>> = serde_json::from_str(r#"{"data":[5]}"#).unwrap();
        assert_eq!(item.into_inner(), vec![5]);
        let item: Item<Vec<i64>> = serde_json::from_str("[6]").unwrap();
        assert_eq!(item.into_inner(), vec![6]);
    }

    #[test]
    fn test_mutation_failure_detection() {
        let ok: MutationReply = serde_json::from_str(r#"{"success":true,"id":"12"}"#).unwrap();
        assert_eq!(ok.failure(), None);
        assert_eq!(ok.id, Some(12));

        let err: MutationReply = serde_json::from_str(r#"{"error":"Duplicate name"}"#).unwrap();
        assert_eq!(err.failure().as_deref(), Some("Duplicate name"));

        let soft: MutationReply =
            serde_json::from_str(r#"{"success":"false","message":"Branch exists"}"#).unwrap();
        assert_eq!(soft.failure().as_deref(), Some("Branch exists"));

        let empty: MutationReply = serde_json::from_str(r#"{"error":""}"#).unwrap();
        assert_eq!(empty.failure(), None);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=23).collect();
        let p = paginate(&items, 3, DEFAULT_PAGE_SIZE);
        assert_eq!(p.items, vec![21, 22, 23]);
        assert_eq!(p.pagination.total_pages, 3);

        let p = paginate(&items, 0, DEFAULT_PAGE_SIZE);
        assert_eq!(p.pagination.page, 1);
        assert_eq!(p.items.len(), 10);

        assert!(paginate(&items, 9, DEFAULT_PAGE_SIZE).items.is_empty());
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }
}
