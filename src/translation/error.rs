use thiserror::Error;

/// Errors surfaced by translation providers and the registry
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The provider was asked to translate without the configuration it needs
    #[error("translation provider '{provider}' is not configured")]
    ProviderUnavailable { provider: &'static str },

    /// No provider in the registry has credentials configured
    #[error("no translation provider is configured")]
    NoProviderAvailable,

    /// Network failure, non-2xx status, or a response without a translation
    #[error("{provider} translation request failed: {message}")]
    RequestFailed {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// The vendor reported a rate or quota limit
    #[error("{provider} translation quota exceeded: {message}")]
    QuotaExceeded {
        provider: &'static str,
        message: String,
    },

    /// The request itself is malformed (e.g. empty or garbled target locale)
    #[error("invalid translation request: {0}")]
    InvalidRequest(String),
}

impl TranslationError {
    pub(crate) fn request_failed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            provider,
            status: None,
            message: message.into(),
        }
    }

    /// Whether a different provider might succeed where this one failed
    pub fn should_fall_back(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, TranslationError>;
