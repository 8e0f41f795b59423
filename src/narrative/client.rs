//! Chat-completion client for risk narratives

use crate::narrative::{
    NarrativeConfig, NarrativeError, NarrativeGenerator, NarrativeResult, NO_RESPONSE, SYSTEM_PROMPT,
    TEMPERATURE,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct NarrativeClient {
    client: Client,
    config: NarrativeConfig,
}

impl NarrativeClient {
    pub fn new(config: &NarrativeConfig) -> NarrativeResult<Self> {
        let client = Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .map_err(|e| NarrativeError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn chat(&self, prompt: &str) -> NarrativeResult<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            #[serde(default)]
            message: Option<MessageContent>,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            #[serde(default)]
            content: Option<String>,
        }

        let api_url = self
            .config
            .api_url
            .as_ref()
            .ok_or_else(|| NarrativeError::ConfigError("SONAR_API_URL is not set".to_string()))?;
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| NarrativeError::ConfigError("SONAR_API_KEY is not set".to_string()))?;

        let resp = self
            .client
            .post(api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages: vec![
                    Message {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    Message {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: TEMPERATURE,
            })
            .send()
            .await
            .map_err(|e| NarrativeError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NarrativeError::ApiError(format!("Sonar API error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| NarrativeError::SerializationError(e.to_string()))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_else(|| NO_RESPONSE.to_string());
        Ok(text)
    }
}

#[async_trait]
impl NarrativeGenerator for NarrativeClient {
    async fn generate(&self, prompt: &str) -> NarrativeResult<String> {
        let text = self.chat(prompt).await?;
        info!("Generated narrative with model {} ({} chars)", self.config.model, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_config_error() {
        let client = NarrativeClient::new(&NarrativeConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        })
        .unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, NarrativeError::ConfigError(m) if m.contains("SONAR_API_URL")));
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = NarrativeClient::new(&NarrativeConfig {
            api_url: Some("http://127.0.0.1:9/chat".to_string()),
            ..Default::default()
        })
        .unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, NarrativeError::ConfigError(m) if m.contains("SONAR_API_KEY")));
    }
}
