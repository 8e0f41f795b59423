//! AI risk narratives
//!
//! Builds a fixed prompt from one supplier's fields and asks a hosted
//! chat-completion endpoint for a free-text ESG risk narrative.

pub mod client;

pub use client::NarrativeClient;

use crate::supplier::SupplierRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("AI API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type NarrativeResult<T> = Result<T, NarrativeError>;

pub const DEFAULT_MODEL: &str = "sonar";
pub const SYSTEM_PROMPT: &str = "You are an ESG compliance expert.";
pub const TEMPERATURE: f32 = 0.7;
/// Returned when the completion carries no message content
pub const NO_RESPONSE: &str = "No response from Sonar API.";

/// Chat-completion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// Full completion URL (`SONAR_API_URL`)
    pub api_url: Option<String>,
    /// Bearer token (`SONAR_API_KEY`)
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Anything that can turn a prompt into narrative text
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> NarrativeResult<String>;
}

/// Compliance sub-scores quoted in the prompt, as (label, column)
const PROMPT_SCORES: [(&str, &str); 4] = [
    ("Anti-Corruption", "PRINCIPLE_10_ANTI_CORRUPTION"),
    ("Human Rights", "PRINCIPLE_1_HUMAN_RIGHTS"),
    ("Labour Standards", "PRINCIPLE_3_LABOUR"),
    ("Environmental", "PRINCIPLE_7_ENVIRONMENT"),
];

fn field_or_na(record: &SupplierRecord, column: &str) -> String {
    match record.get(column) {
        Some(value) if !value.is_null() => value.to_string(),
        _ => "NA".to_string(),
    }
}

/// The risk-report prompt for one supplier
pub fn build_prompt(record: &SupplierRecord) -> String {
    let risk = record
        .predicted_risk
        .map(|r| r.as_str().to_string())
        .unwrap_or_else(|| "NA".to_string());

    let mut prompt = format!(
        "Company Name: {}\nRisk Level: {}\nTrend RRI: {}\nCurrent RRI: {}\nCountry Avg: {}\nCompliance Scores:\n",
        record.id,
        risk,
        field_or_na(record, "TREND_RRI"),
        field_or_na(record, "CURRENT_RRI"),
        field_or_na(record, "COUNTRY_SECTOR_AVERAGE"),
    );
    for (label, column) in PROMPT_SCORES {
        prompt.push_str(&format!("- {}: {}\n", label, field_or_na(record, column)));
    }
    prompt.push_str(
        "Provide:\n1. Risk factors analysis\n2. 3 improvement recommendations\n3. Priority actions\n",
    );
    prompt
}
