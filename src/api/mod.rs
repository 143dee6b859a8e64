//! HTTP surface: the `/api/b2` read endpoints, translations, and a health probe.

mod auth;
mod error;
mod events;
mod extract;
mod groups;
mod translations;

pub use auth::CurrentActor;
pub use error::{ApiError, Result};
pub use extract::{ApiJson, ApiQuery};

use crate::authz::{Authorizer, MembershipPolicy};
use crate::store::Store;
use crate::translation::ProviderRegistry;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub const DEFAULT_PER_PAGE: i64 = 50;
pub const MAX_PER_PAGE: i64 = 200;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub authorizer: Arc<dyn Authorizer>,
    pub translator: Arc<ProviderRegistry>,
    pub default_per_page: i64,
    pub max_per_page: i64,
}

impl AppState {
    /// State with the membership policy and default paging
    pub fn new(store: Arc<dyn Store>, translator: ProviderRegistry) -> Self {
        Self {
            store,
            authorizer: Arc::new(MembershipPolicy),
            translator: Arc::new(translator),
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }

    pub fn with_paging(mut self, default_per_page: i64, max_per_page: i64) -> Self {
        self.default_per_page = default_per_page;
        self.max_per_page = max_per_page;
        self
    }

    /// Page size for a `per` parameter, clamped to `[0, max_per_page]`
    pub fn page_size(&self, per: Option<i64>) -> i64 {
        per.unwrap_or(self.default_per_page)
            .clamp(0, self.max_per_page.max(0))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/b2/groups/:id", get(groups::show))
        .route("/api/b2/groups/:id/subgroups", get(groups::subgroups))
        .route("/api/b2/groups/:id/discussions", get(groups::discussions))
        .route("/api/b2/events", get(events::index))
        .route("/api/b2/translations", post(translations::create))
        .route("/api/b2/translations/providers", get(translations::providers))
        .with_state(state)
}

/// Liveness probe
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
