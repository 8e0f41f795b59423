//! Environment configuration
//!
//! Keys and endpoints come from the process environment (optionally
//! seeded from a `.env` file by the binaries). Missing API keys are not an
//! error here; the client that needs one reports it when called.

use crate::alerts::client::{NEWSDATA_URL, OPENSANCTIONS_URL};
use crate::narrative::{NarrativeConfig, DEFAULT_MODEL};

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8501;

/// Endpoint and key for one lookup API
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_HTTP_ADDR.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sanctions: SourceConfig,
    pub news: SourceConfig,
    pub narrative: NarrativeConfig,
    pub http: HttpConfig,
    /// Explicit risk input columns; `None` means discover `PRINCIPLE` columns
    pub risk_columns: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sanctions: SourceConfig {
                api_url: OPENSANCTIONS_URL.to_string(),
                api_key: None,
            },
            news: SourceConfig {
                api_url: NEWSDATA_URL.to_string(),
                api_key: None,
            },
            narrative: NarrativeConfig::default(),
            http: HttpConfig::default(),
            risk_columns: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("ESCM_HTTP_PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("Ignoring ESCM_HTTP_PORT: {}", e);
                DEFAULT_HTTP_PORT
            }
            None => DEFAULT_HTTP_PORT,
        };

        let risk_columns = get("ESCM_RISK_COLUMNS").map(|list| {
            list.split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
        });

        Self {
            sanctions: SourceConfig {
                api_url: get("OPENSANCTIONS_API_URL").unwrap_or(defaults.sanctions.api_url),
                api_key: get("OPENSANCTIONS_API_KEY"),
            },
            news: SourceConfig {
                api_url: get("NEWSDATA_API_URL").unwrap_or(defaults.news.api_url),
                api_key: get("NEWSDATA_API_KEY"),
            },
            narrative: NarrativeConfig {
                api_url: get("SONAR_API_URL"),
                api_key: get("SONAR_API_KEY"),
                model: get("SONAR_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            http: HttpConfig {
                address: get("ESCM_HTTP_ADDR").unwrap_or(defaults.http.address),
                port,
            },
            risk_columns,
        }
    }
}
