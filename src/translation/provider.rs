use crate::translation::{
    locale, AzureProvider, Result, TranslationError, TranslationRequest, WatsonProvider,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// A configured translation vendor.
///
/// The set of vendors is closed; adding one means adding a variant here and
/// a slot in the registry's priority order.
#[derive(Debug, Clone)]
pub enum Provider {
    Azure(AzureProvider),
    Watson(WatsonProvider),
}

/// Public summary of a provider, safe to render to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub name: &'static str,
    pub available: bool,
    /// Empty means the vendor accepts any locale code
    pub supported_locales: &'static [&'static str],
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Azure(_) => AzureProvider::NAME,
            Self::Watson(_) => WatsonProvider::NAME,
        }
    }

    /// Whether the provider has the configuration it needs. Never touches the network.
    pub fn available(&self) -> bool {
        match self {
            Self::Azure(p) => p.available(),
            Self::Watson(p) => p.available(),
        }
    }

    pub fn supported_locales(&self) -> &'static [&'static str] {
        match self {
            Self::Azure(_) => AzureProvider::SUPPORTED_LOCALES,
            Self::Watson(_) => WatsonProvider::SUPPORTED_LOCALES,
        }
    }

    /// Map an arbitrary locale tag into the dialect this vendor accepts
    pub fn normalize_locale(&self, locale: &str) -> String {
        locale::normalize(locale, self.supported_locales())
    }

    /// Perform exactly one translation call against the vendor
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        match self {
            Self::Azure(p) => p.translate(request).await,
            Self::Watson(p) => p.translate(request).await,
        }
    }

    pub fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: self.name(),
            available: self.available(),
            supported_locales: self.supported_locales(),
        }
    }
}

impl From<AzureProvider> for Provider {
    fn from(provider: AzureProvider) -> Self {
        Self::Azure(provider)
    }
}

impl From<WatsonProvider> for Provider {
    fn from(provider: WatsonProvider) -> Self {
        Self::Watson(provider)
    }
}

/// Quota detection shared by vendors that only signal limits with HTTP 429
pub(crate) fn default_quota_error(status: StatusCode, _body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
}

/// Send a prepared vendor request and return the raw success body.
///
/// Non-2xx responses become `QuotaExceeded` or `RequestFailed` depending on
/// the vendor's quota check.
pub(crate) async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    is_quota_error: fn(StatusCode, &str) -> bool,
) -> Result<String> {
    let response = request.send().await.map_err(|e| {
        warn!("{} translation request could not be sent: {}", provider, e);
        TranslationError::request_failed(provider, format!("Failed to send request: {}", e))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        TranslationError::request_failed(provider, format!("Failed to read response body: {}", e))
    })?;

    if !status.is_success() {
        warn!("{} API error ({}): {}", provider, status, body);

        let message = format!("HTTP {}: {}", status.as_u16(), body);
        if is_quota_error(status, &body) {
            return Err(TranslationError::QuotaExceeded { provider, message });
        }
        return Err(TranslationError::RequestFailed {
            provider,
            status: Some(status.as_u16()),
            message,
        });
    }

    debug!("{} responded with {} bytes", provider, body.len());
    Ok(body)
}

/// Deserialize a vendor success body, reporting shape mismatches as request failures
pub(crate) fn parse_body<T: DeserializeOwned>(provider: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        TranslationError::request_failed(provider, format!("Unexpected response body: {}", e))
    })
}
