use crate::api::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_AZURE_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
pub const DEFAULT_TRANSLATOR_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    // Pagination
    pub default_per_page: i64,
    pub max_per_page: i64,

    // Machine translation
    pub translator: TranslatorConfig,
}

/// Credentials and limits for the machine translation vendors
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub azure: AzureConfig,
    pub watson: WatsonConfig,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub api_key: Option<String>,
    pub region: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct WatsonConfig {
    pub api_key: Option<String>,
    pub url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            port: parse_var("PORT")?.unwrap_or(8080),

            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?.unwrap_or(5),
            run_migrations: parse_var("RUN_MIGRATIONS")?.unwrap_or(false),

            // Pagination
            default_per_page: parse_var("DEFAULT_PER_PAGE")?.unwrap_or(DEFAULT_PER_PAGE),
            max_per_page: parse_var("MAX_PER_PAGE")?.unwrap_or(MAX_PER_PAGE),

            translator: TranslatorConfig::from_env()?,
        })
    }
}

impl TranslatorConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_secs =
            parse_var("TRANSLATOR_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TRANSLATOR_TIMEOUT_SECS);
        if timeout_secs == 0 {
            anyhow::bail!("TRANSLATOR_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            azure: AzureConfig {
                api_key: non_blank_var("AZURE_TRANSLATOR_KEY"),
                region: non_blank_var("AZURE_TRANSLATOR_REGION"),
                endpoint: non_blank_var("AZURE_TRANSLATOR_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_AZURE_ENDPOINT.to_string()),
            },
            watson: WatsonConfig {
                api_key: non_blank_var("WATSON_TRANSLATOR_API_KEY"),
                url: non_blank_var("WATSON_TRANSLATOR_URL"),
            },
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Read an environment variable, treating unset and whitespace-only values alike
fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_blank_var(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", name, raw, e)),
        None => Ok(None),
    }
}
