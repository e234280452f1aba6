//! Clinic Client - console client for the clinic PHP API
//!
//! Provides the typed HTTP endpoints, the local store, the session context
//! and one manager per console screen.

pub mod api;
pub mod badge;
pub mod config;
pub mod debounce;
pub mod error;
pub mod http;
pub mod logger;
pub mod managers;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

use std::sync::Arc;

use badge::NewMemberBadges;
use debounce::Debouncer;
use managers::{AcquisitionWizard, BranchManager, CustomerManager, DealsManager};
use session::{SessionContext, TOKEN_KEY};
use storage::LocalStore;

/// Everything a console screen needs, built once at startup
#[derive(Debug, Clone)]
pub struct Console {
    config: ClientConfig,
    http: HttpClient,
    store: LocalStore,
    session: Arc<SessionContext>,
}

impl Console {
    /// Build the HTTP client and local store, then resolve the session.
    ///
    /// A token left in the local store by a previous login is used when the
    /// configuration carries none.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        let store = LocalStore::in_dir(&config.storage_dir);
        let mut http = config.build_http_client()?;
        if http.token().is_none() {
            match store.get::<String>(TOKEN_KEY) {
                Ok(Some(token)) => http = http.with_token(token),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Stored token unreadable"),
            }
        }

        let session = SessionContext::resolve(&http, &store).await;
        tracing::info!(base_url = %http.base_url(), source = ?session.source(), "Console connected");
        Ok(Self {
            config,
            http,
            store,
            session: Arc::new(session),
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn badges(&self) -> NewMemberBadges {
        NewMemberBadges::new(self.store.clone())
    }

    pub fn branches(&self) -> BranchManager {
        BranchManager::new(self.http.clone(), self.config.page_size)
    }

    pub fn customers(&self) -> CustomerManager {
        CustomerManager::new(
            self.http.clone(),
            self.store.clone(),
            Arc::clone(&self.session),
            Debouncer::new(self.config.search_debounce),
            self.config.page_size,
        )
    }

    pub fn deals(&self) -> DealsManager {
        DealsManager::new(self.http.clone())
    }

    pub fn wizard(&self) -> AcquisitionWizard {
        AcquisitionWizard::new(self.http.clone(), Arc::clone(&self.session), self.badges())
    }

    /// End the session: clears the stored token and profile, drops the
    /// bearer token and resets the shared session for managers built later
    pub fn logout(&mut self) -> ClientResult<()> {
        let mut session = (*self.session).clone();
        session.logout(&self.store)?;
        self.session = Arc::new(session);
        self.http.clear_token();
        Ok(())
    }
}
