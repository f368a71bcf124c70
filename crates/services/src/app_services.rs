use std::sync::Arc;

use guided_core::Clock;
use storage::repository::Storage;

use crate::api::{ApiConfig, HttpApi, PlatformApi};
use crate::catalog::CatalogService;
use crate::error::AppServicesError;
use crate::progress::ProgressService;
use crate::session::SessionService;

/// Assembles the session, catalog, and progress stores over one backend.
#[derive(Clone)]
pub struct AppServices {
    session: Arc<SessionService>,
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Wire the stores over an API implementation and local storage.
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>, storage: &Storage, clock: Clock) -> Self {
        let session = Arc::new(SessionService::new(
            Arc::clone(&api),
            Arc::clone(&storage.sessions),
            clock,
        ));
        let catalog = Arc::new(CatalogService::new(Arc::clone(&api)));
        let progress = Arc::new(ProgressService::new(api, Arc::clone(&session)));

        Self {
            session,
            catalog,
            progress,
        }
    }

    /// Build services over the HTTP backend with `SQLite`-persisted local
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if local storage initialization fails.
    pub async fn connect(
        config: ApiConfig,
        database_url: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(database_url).await?;
        let api: Arc<dyn PlatformApi> = Arc::new(HttpApi::new(config));
        Ok(Self::new(api, &storage, clock))
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionService> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
