//! HTTP clients for the sanctions and news APIs

use crate::alerts::{AlertError, AlertResult, NewsArticle, NewsSource, SanctionsMatch, SanctionsSource};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

pub const OPENSANCTIONS_URL: &str = "https://api.opensanctions.org/v1/entities/_search";
pub const NEWSDATA_URL: &str = "https://newsdata.io/api/1/news";
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Keyword filter applied to every news search
pub fn news_query(supplier_id: &str) -> String {
    format!(
        "\"{}\" AND (ESG OR sustainability OR sanction OR \"forced labor\" OR corruption)",
        supplier_id
    )
}

fn build_client() -> AlertResult<Client> {
    Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()
        .map_err(|e| AlertError::ConfigError(e.to_string()))
}

fn build_url(base: &str, params: &[(&str, &str)]) -> AlertResult<Url> {
    Url::parse_with_params(base, params).map_err(|e| AlertError::ConfigError(e.to_string()))
}

async fn get_json<T: for<'de> Deserialize<'de>>(client: &Client, url: Url, api: &str) -> AlertResult<T> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| AlertError::NetworkError(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(AlertError::ApiError(format!("{} error: {}", api, resp.status())));
    }

    resp.json::<T>()
        .await
        .map_err(|e| AlertError::SerializationError(e.to_string()))
}

/// OpenSanctions entity search restricted to the `sanctions` dataset
pub struct OpenSanctionsClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl OpenSanctionsClient {
    pub fn new(api_url: Option<String>, api_key: Option<String>) -> AlertResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.unwrap_or_else(|| OPENSANCTIONS_URL.to_string()),
            api_key,
        })
    }
}

#[async_trait]
impl SanctionsSource for OpenSanctionsClient {
    fn name(&self) -> &str {
        "opensanctions"
    }

    async fn check(&self, supplier_id: &str) -> AlertResult<SanctionsMatch> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            results: Vec<Entity>,
        }

        #[derive(Deserialize)]
        struct Entity {
            name: String,
        }

        let mut params = vec![("q", supplier_id), ("dataset", "sanctions")];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.as_str()));
        }
        let url = build_url(&self.api_url, &params)?;

        let result: Response = get_json(&self.client, url, "Sanctions API").await?;
        Ok(SanctionsMatch::from_names(
            result.results.into_iter().map(|e| e.name).collect(),
        ))
    }
}

/// NewsData.io search over business and politics coverage
pub struct NewsDataClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl NewsDataClient {
    pub fn new(api_url: Option<String>, api_key: Option<String>) -> AlertResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.unwrap_or_else(|| NEWSDATA_URL.to_string()),
            api_key,
        })
    }
}

#[async_trait]
impl NewsSource for NewsDataClient {
    fn name(&self) -> &str {
        "newsdata"
    }

    async fn search(&self, supplier_id: &str) -> AlertResult<Vec<NewsArticle>> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            results: Vec<NewsArticle>,
        }

        let query = news_query(supplier_id);
        let mut params = Vec::with_capacity(4);
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.as_str()));
        }
        params.push(("q", query.as_str()));
        params.push(("language", "en"));
        params.push(("category", "business,politics"));
        let url = build_url(&self.api_url, &params)?;

        let result: Response = get_json(&self.client, url, "News API").await?;
        Ok(result.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_query() {
        assert_eq!(
            news_query("ACME"),
            "\"ACME\" AND (ESG OR sustainability OR sanction OR \"forced labor\" OR corruption)"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = build_url("not a url", &[("q", "x")]).unwrap_err();
        assert!(matches!(err, AlertError::ConfigError(_)));
    }

    #[test]
    fn test_query_parameters_are_encoded() {
        let url = build_url(NEWSDATA_URL, &[("q", "\"A&B\" AND x"), ("language", "en")]).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("q".to_string(), "\"A&B\" AND x".to_string()));
        assert_eq!(pairs[1], ("language".to_string(), "en".to_string()));
    }
}
