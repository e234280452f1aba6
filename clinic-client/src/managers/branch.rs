//! Branch management screen

use shared::error::{AppError, ErrorCode};
use shared::models::{Branch, BranchCreate, BranchUpdate};
use shared::response::{PaginatedResponse, paginate};

use crate::{ClientResult, HttpClient};

pub struct BranchManager {
    http: HttpClient,
    branches: Vec<Branch>,
    page_size: u32,
}

impl BranchManager {
    pub fn new(http: HttpClient, page_size: u32) -> Self {
        Self {
            http,
            branches: Vec::new(),
            page_size,
        }
    }

    /// Branches from the last successful refresh
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Reload the list; on failure the previous list is kept
    pub async fn refresh(&mut self) -> ClientResult<&[Branch]> {
        let branches = self.http.list_branches().await?;
        tracing::info!(count = branches.len(), "Branches loaded");
        self.branches = branches;
        Ok(&self.branches)
    }

    pub async fn detail(&self, id: i64) -> ClientResult<Branch> {
        self.http.get_branch(id).await
    }

    /// Create a branch and reload; returns the new id when the API reports it
    pub async fn create(&mut self, branch: BranchCreate) -> ClientResult<Option<i64>> {
        let branch = branch.validated()?;
        let reply = self.http.create_branch(&branch).await?;
        tracing::info!(name = %branch.name, id = ?reply.id, "Branch created");
        self.reload_after_write().await;
        Ok(reply.id)
    }

    /// Replace the editable fields of a branch (last write wins)
    pub async fn update(&mut self, id: i64, update: BranchUpdate) -> ClientResult<()> {
        let update = update.validated()?;
        self.http.update_branch(id, &update).await?;
        tracing::info!(id, "Branch updated");
        self.reload_after_write().await;
        Ok(())
    }

    /// The write already landed; a failed reload only leaves the list stale
    async fn reload_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Failed to reload branches after write");
        }
    }

    /// Look up a loaded branch
    pub fn find(&self, id: i64) -> ClientResult<&Branch> {
        self.branches.iter().find(|b| b.id == id).ok_or_else(|| {
            AppError::new(ErrorCode::BranchNotFound)
                .with_detail("branch_id", id)
                .into()
        })
    }

    pub fn search(&self, query: &str) -> Vec<&Branch> {
        self.branches.iter().filter(|b| b.matches(query)).collect()
    }

    /// One page of the filtered table
    pub fn page(&self, query: &str, page: u32) -> PaginatedResponse<Branch> {
        let matches: Vec<Branch> = self.search(query).into_iter().cloned().collect();
        paginate(&matches, page, self.page_size)
    }
}
