#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod catalog;
pub mod error;
pub mod progress;
pub mod session;

pub use guided_core::Clock;

pub use api::{ApiConfig, HttpApi, InMemoryApi, NewUser, PlatformApi, ProblemPage, ProgressUpdate};
pub use app_services::AppServices;
pub use catalog::{CatalogService, CatalogState};
pub use error::{ApiError, AppServicesError, CatalogError, ProgressSyncError, SessionError};
pub use progress::{ProgressService, ProgressState};
pub use session::{AuthState, SessionService};
