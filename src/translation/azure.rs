use crate::config::AzureConfig;
use crate::translation::provider::{default_quota_error, parse_body, send};
use crate::translation::{Result, TextFormat, TranslationError, TranslationRequest};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Azure AI Translator (Text Translation v3)
#[derive(Debug, Clone)]
pub struct AzureProvider {
    config: AzureConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TextItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseItem {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: u32,
}

/// Azure error code for a free-tier subscription that has used up its quota
const FREE_QUOTA_EXCEEDED: u32 = 403001;

impl AzureProvider {
    pub const NAME: &'static str = "azure";

    /// Azure accepts essentially any BCP-47 code, so no set is enumerated
    pub const SUPPORTED_LOCALES: &'static [&'static str] = &[];

    pub fn new(config: AzureConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn available(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(TranslationError::ProviderUnavailable {
                provider: Self::NAME,
            });
        };

        let url = self.build_url(&request.target_locale, request.format)?;
        debug!(
            "Azure translation request: to={}, format={:?}, content_len={}",
            request.target_locale,
            request.format,
            request.content.len()
        );

        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Ocp-Apim-Subscription-Key", api_key)
            .json(&[TextItem {
                text: &request.content,
            }]);
        if let Some(region) = self.config.region.as_deref() {
            builder = builder.header("Ocp-Apim-Subscription-Region", region);
        }

        let body = send(Self::NAME, builder, Self::is_quota_error).await?;
        Self::parse_response(&body)
    }

    /// HTTP 429, or a 403 whose body carries the free-quota error code
    pub fn is_quota_error(status: StatusCode, body: &str) -> bool {
        if default_quota_error(status, body) {
            return true;
        }

        status == StatusCode::FORBIDDEN
            && serde_json::from_str::<ErrorResponse>(body)
                .map(|e| e.error.code == FREE_QUOTA_EXCEEDED)
                .unwrap_or(false)
    }

    fn build_url(&self, target_locale: &str, format: TextFormat) -> Result<Url> {
        let base = format!("{}/translate", self.config.endpoint.trim_end_matches('/'));
        let mut url = Url::parse(&base).map_err(|e| {
            TranslationError::request_failed(
                Self::NAME,
                format!("Invalid endpoint '{}': {}", self.config.endpoint, e),
            )
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", "3.0");
            query.append_pair("to", target_locale);
            if format == TextFormat::Html {
                query.append_pair("textType", "html");
            }
        }

        Ok(url)
    }

    fn parse_response(body: &str) -> Result<String> {
        let items: Vec<TranslateResponseItem> = parse_body(Self::NAME, body)?;

        items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or_else(|| {
                TranslationError::request_failed(Self::NAME, "Response contained no translations")
            })
    }
}
