use crate::config::WatsonConfig;
use crate::translation::locale::WATSON_LOCALES;
use crate::translation::provider::{default_quota_error, parse_body, send};
use crate::translation::{Result, TranslationError, TranslationRequest};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_VERSION: &str = "2018-05-01";

/// IBM Watson Language Translator (v3)
#[derive(Debug, Clone)]
pub struct WatsonProvider {
    config: WatsonConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    text: [&'a str; 1],
    target: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    translation: String,
}

impl WatsonProvider {
    pub const NAME: &'static str = "watson";
    pub const SUPPORTED_LOCALES: &'static [&'static str] = WATSON_LOCALES;

    pub fn new(config: WatsonConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn available(&self) -> bool {
        self.config.api_key.is_some() && self.config.url.is_some()
    }

    /// Translate one piece of content.
    ///
    /// Watson has no markup switch at the request level, so HTML is sent as-is
    /// and `request.format` does not change the request.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let (Some(api_key), Some(base_url)) =
            (self.config.api_key.as_deref(), self.config.url.as_deref())
        else {
            return Err(TranslationError::ProviderUnavailable {
                provider: Self::NAME,
            });
        };

        let url = Self::build_url(base_url);
        debug!(
            "Watson translation request: target={}, content_len={}",
            request.target_locale,
            request.content.len()
        );

        let builder = self
            .client
            .post(&url)
            .basic_auth("apikey", Some(api_key))
            .header("Content-Type", "application/json")
            .json(&TranslateBody {
                text: [request.content.as_str()],
                target: request.target_locale.to_uppercase(),
            });

        let body = send(Self::NAME, builder, Self::is_quota_error).await?;
        Self::parse_response(&body)
    }

    pub fn is_quota_error(status: StatusCode, body: &str) -> bool {
        default_quota_error(status, body)
    }

    fn build_url(base_url: &str) -> String {
        format!(
            "{}/v3/translate?version={}",
            base_url.trim_end_matches('/'),
            API_VERSION
        )
    }

    fn parse_response(body: &str) -> Result<String> {
        let response: TranslateResponse = parse_body(Self::NAME, body)?;

        response
            .translations
            .into_iter()
            .next()
            .map(|t| t.translation)
            .ok_or_else(|| {
                TranslationError::request_failed(Self::NAME, "Response contained no translations")
            })
    }
}
