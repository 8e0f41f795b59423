//! Risk level distribution shown beside the graph

use super::render::escape_xml;
use crate::supplier::SupplierTable;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCount {
    pub label: String,
    pub count: usize,
}

/// Row count per risk label, only labels present, sorted by label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub counts: Vec<RiskCount>,
}

impl RiskDistribution {
    pub fn from_table(table: &SupplierTable) -> Self {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for row in table.rows() {
            if let Some(risk) = row.predicted_risk {
                *counts.entry(risk.as_str()).or_insert(0) += 1;
            }
        }
        Self {
            counts: counts
                .into_iter()
                .map(|(label, count)| RiskCount {
                    label: label.to_string(),
                    count,
                })
                .collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Vertical bar chart, one bar per label
    pub fn render_svg(&self) -> String {
        const WIDTH: f64 = 600.0;
        const HEIGHT: f64 = 400.0;
        const MARGIN: f64 = 50.0;

        let max = self.counts.iter().map(|c| c.count).max().unwrap_or(0).max(1) as f64;
        let slot = (WIDTH - 2.0 * MARGIN) / self.counts.len().max(1) as f64;
        let plot_height = HEIGHT - 2.0 * MARGIN;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = WIDTH,
            h = HEIGHT
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
            m = MARGIN,
            b = HEIGHT - MARGIN,
            r = WIDTH - MARGIN
        );
        for (i, bucket) in self.counts.iter().enumerate() {
            let bar_height = bucket.count as f64 / max * plot_height;
            let x = MARGIN + i as f64 * slot + slot * 0.15;
            let y = HEIGHT - MARGIN - bar_height;
            let _ = writeln!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="steelblue"/>"#,
                x,
                y,
                slot * 0.7,
                bar_height
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="11">{}</text>"#,
                x + slot * 0.35,
                HEIGHT - MARGIN + 16.0,
                escape_xml(&bucket.label)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="11">{}</text>"#,
                x + slot * 0.35,
                y - 4.0,
                bucket.count
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}
