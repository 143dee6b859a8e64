use crate::api::{ApiError, AppState};
use crate::authz::Actor;
use crate::security::redact_key;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ApiKeyParams {
    api_key: Option<String>,
}

/// The caller, resolved from the `api_key` query parameter
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let api_key = Query::<ApiKeyParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.api_key)
            .filter(|key| !key.is_empty());

        let Some(api_key) = api_key else {
            debug!("Rejected request without api_key: {}", parts.uri.path());
            return Err(ApiError::Forbidden);
        };

        let Some(user) = state.store.user_by_api_key(&api_key).await? else {
            warn!("Rejected unknown api_key {}", redact_key(&api_key));
            return Err(ApiError::Forbidden);
        };

        let group_ids = state.store.member_group_ids(user.id).await?;
        Ok(Self(Actor::new(user, group_ids)))
    }
}
