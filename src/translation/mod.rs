//! Machine translation of user-generated content.
//!
//! Vendor adapters live behind a single [`Provider`] enum so callers never
//! depend on a particular vendor's request shape, auth scheme or locale
//! dialect. The [`ProviderRegistry`] picks the first configured vendor in a
//! fixed priority order.
//!
//! # Architecture
//!
//! - `locale`: locale normalization shared by all vendors
//! - `provider`: the `Provider` enum and the shared HTTP exchange
//! - `azure` / `watson`: vendor request construction and response parsing
//! - `registry`: provider selection and the caller-facing `translate` entry point
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = ProviderRegistry::from_config(&config.translator)?;
//! let request = TranslationRequest::new("<p>Hello</p>", "fr_CA")?.with_format(TextFormat::Html);
//! let result = registry.translate(&request).await?;
//! ```

mod azure;
mod error;
mod http_client;
pub mod locale;
mod provider;
mod registry;
mod watson;

pub use azure::AzureProvider;
pub use error::{Result, TranslationError};
pub use http_client::http_client;
pub use provider::{Provider, ProviderDescriptor};
pub use registry::ProviderRegistry;
pub use watson::WatsonProvider;

use serde::{Deserialize, Serialize};

/// Markup mode of the content being translated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Text,
    Html,
}

impl TextFormat {
    /// Map a stored body format ("html", "md", ...) onto a translation format
    pub fn from_stored(format: &str) -> Self {
        if format.eq_ignore_ascii_case("html") {
            Self::Html
        } else {
            Self::Text
        }
    }
}

/// A single piece of content to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub content: String,
    pub source_locale: Option<String>,
    pub target_locale: String,
    pub format: TextFormat,
}

impl TranslationRequest {
    /// Build a plain-text request, rejecting empty or malformed target locales
    pub fn new(content: impl Into<String>, target_locale: impl Into<String>) -> Result<Self> {
        let target_locale = target_locale.into();
        locale::validate(&target_locale)?;

        Ok(Self {
            content: content.into(),
            source_locale: None,
            target_locale: target_locale.trim().to_string(),
            format: TextFormat::Text,
        })
    }

    pub fn with_source(mut self, source_locale: impl Into<String>) -> Self {
        self.source_locale = Some(source_locale.into());
        self
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }
}

/// Translated text plus where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub translated_text: String,
    pub provider: &'static str,
    pub locale: String,
}
