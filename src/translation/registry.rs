use crate::config::TranslatorConfig;
use crate::translation::{
    http_client, AzureProvider, Provider, ProviderDescriptor, Result, TranslationError,
    TranslationRequest, TranslationResult, WatsonProvider,
};
use tracing::{info, warn};

/// Ordered set of translation providers.
///
/// Order is priority: when several vendors are configured at once, the
/// earliest available one is always used first.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Build the registry in the fixed priority order: Azure, then Watson.
    ///
    /// All providers share one HTTP client bounded by `config.request_timeout`.
    pub fn from_config(config: &TranslatorConfig) -> anyhow::Result<Self> {
        let client = http_client(config.request_timeout)?;

        Ok(Self::new(vec![
            AzureProvider::new(config.azure.clone(), client.clone()).into(),
            WatsonProvider::new(config.watson.clone(), client).into(),
        ]))
    }

    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.providers.iter().map(Provider::descriptor).collect()
    }

    /// Look up a provider by its name
    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// First available provider in priority order
    pub fn pick_provider(&self) -> Result<&Provider> {
        self.providers
            .iter()
            .find(|p| p.available())
            .ok_or(TranslationError::NoProviderAvailable)
    }

    /// Translate with the highest-priority available provider.
    ///
    /// The target locale is normalized into that provider's dialect before
    /// the call. Failures are returned as-is; no retry happens here.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let provider = self.pick_provider()?;
        self.translate_with(provider, request).await
    }

    /// Like [`translate`](Self::translate), but moves on to the next available
    /// provider when one reports its quota is exhausted.
    ///
    /// Any other failure ends the attempt immediately. When every provider is
    /// over quota, the last quota error is returned.
    pub async fn translate_with_fallback(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult> {
        let mut last_error = None;

        for provider in self.providers.iter().filter(|p| p.available()) {
            match self.translate_with(provider, request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.should_fall_back() => {
                    warn!("{}, trying next provider", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(TranslationError::NoProviderAvailable))
    }

    /// Translate with one specific provider, normalizing the target locale
    /// into its dialect. No fallback.
    pub async fn translate_with(
        &self,
        provider: &Provider,
        request: &TranslationRequest,
    ) -> Result<TranslationResult> {
        if !provider.available() {
            return Err(TranslationError::ProviderUnavailable {
                provider: provider.name(),
            });
        }

        let locale = provider.normalize_locale(&request.target_locale);
        let normalized = TranslationRequest {
            target_locale: locale.clone(),
            ..request.clone()
        };

        let translated_text = provider.translate(&normalized).await?;
        info!(
            "Translated {} chars to {} via {}",
            request.content.len(),
            locale,
            provider.name()
        );

        Ok(TranslationResult {
            translated_text,
            provider: provider.name(),
            locale,
        })
    }
}
