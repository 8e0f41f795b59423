//! Alerts Engine
//!
//! Checks suppliers one at a time, sanctions first and news second. A
//! failed lookup becomes an error record and counts as "no result".

use super::{NewsSource, SanctionsSource};
use crate::supplier::SupplierTable;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of news hits surfaced per supplier
pub const MAX_NEWS_ITEMS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
    Info,
}

/// One rendered alert line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub supplier_id: String,
    pub level: AlertLevel,
    pub message: String,
}

impl AlertRecord {
    fn new(supplier_id: &str, level: AlertLevel, message: String) -> Self {
        Self {
            supplier_id: supplier_id.to_string(),
            level,
            message,
        }
    }
}

pub struct AlertsEngine {
    sanctions: Arc<dyn SanctionsSource>,
    news: Arc<dyn NewsSource>,
}

impl AlertsEngine {
    pub fn new(sanctions: Arc<dyn SanctionsSource>, news: Arc<dyn NewsSource>) -> Self {
        Self { sanctions, news }
    }

    /// Alert lines for a single supplier
    pub async fn check_supplier(&self, supplier_id: &str) -> Vec<AlertRecord> {
        let mut records = Vec::new();

        let sanctions = match self.sanctions.check(supplier_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!("{} lookup failed for {}: {}", self.sanctions.name(), supplier_id, e);
                records.push(AlertRecord::new(
                    supplier_id,
                    AlertLevel::Error,
                    format!("Sanctions check failed: {}", e),
                ));
                Default::default()
            }
        };
        if sanctions.flagged {
            records.push(AlertRecord::new(
                supplier_id,
                AlertLevel::Error,
                format!(
                    "Sanction Alert: Supplier ID `{}` matches: {}",
                    supplier_id,
                    sanctions.matches.join(", ")
                ),
            ));
        }

        let news = match self.news.search(supplier_id).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("{} lookup failed for {}: {}", self.news.name(), supplier_id, e);
                records.push(AlertRecord::new(
                    supplier_id,
                    AlertLevel::Error,
                    format!("News API error: {}", e),
                ));
                Vec::new()
            }
        };
        for article in news.iter().take(MAX_NEWS_ITEMS) {
            records.push(AlertRecord::new(
                supplier_id,
                AlertLevel::Warning,
                format!(
                    "ESG News for `{}`: [{}]({}) ({})",
                    supplier_id, article.title, article.link, article.pub_date
                ),
            ));
        }

        if !sanctions.flagged && news.is_empty() {
            records.push(AlertRecord::new(
                supplier_id,
                AlertLevel::Info,
                format!("No alerts for `{}`.", supplier_id),
            ));
        }

        records
    }

    /// Alert lines for every row, in table order
    pub async fn scan(&self, table: &SupplierTable) -> Vec<AlertRecord> {
        let mut records = Vec::new();
        for row in table.rows() {
            records.extend(self.check_supplier(&row.id).await);
        }
        debug!("Alerts scan over {} suppliers produced {} lines", table.len(), records.len());
        records
    }
}

/// Risk-flag alerts for every high or dangerous supplier
pub fn risk_flag_alerts(table: &SupplierTable) -> Vec<AlertRecord> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let risk = row.predicted_risk.filter(|r| r.is_flagged())?;
            Some(AlertRecord::new(
                &row.id,
                AlertLevel::Error,
                format!(
                    "Real-time alert: Supplier ID {} flagged as {}!",
                    row.id,
                    risk.title()
                ),
            ))
        })
        .collect()
}
