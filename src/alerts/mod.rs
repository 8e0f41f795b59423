//! Sanctions and ESG news alerts
//!
//! Each supplier id is checked against a sanctions search and a news search.
//! Both lookups return typed results; the [`AlertsEngine`] turns failures
//! into error-level records and moves on to the next supplier.

pub mod client;
pub mod engine;

pub use client::{news_query, NewsDataClient, OpenSanctionsClient};
pub use engine::{risk_flag_alerts, AlertLevel, AlertRecord, AlertsEngine};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type AlertResult<T> = Result<T, AlertError>;

/// Outcome of a sanctions search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SanctionsMatch {
    pub flagged: bool,
    pub matches: Vec<String>,
}

impl SanctionsMatch {
    pub fn from_names(matches: Vec<String>) -> Self {
        Self {
            flagged: !matches.is_empty(),
            matches,
        }
    }
}

/// A news search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
}

/// Sanctions dataset lookup by supplier id
#[async_trait]
pub trait SanctionsSource: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self, supplier_id: &str) -> AlertResult<SanctionsMatch>;
}

/// ESG news search by supplier id
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, supplier_id: &str) -> AlertResult<Vec<NewsArticle>>;
}
