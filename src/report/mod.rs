//! Report Exporter
//!
//! Assembles the compliance report (one section per supplier row, in table
//! order) and the raw-data export of the scored table.

pub mod pdf;

use crate::session::AiReportStore;
use crate::supplier::{SupplierTable, PREDICTED_RISK_COLUMN};
use pdf::{Align, Font, PdfDocument};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const REPORT_TITLE: &str = "ESC-M Compliance Report";
/// Section body for suppliers without a stored narrative
pub const NO_REPORT_PLACEHOLDER: &str = "No AI report available.";
pub const PDF_FILE_NAME: &str = "escm_compliance_report.pdf";
pub const CSV_FILE_NAME: &str = "escm_data.csv";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub supplier_id: String,
    pub body: String,
    pub has_narrative: bool,
}

impl ReportSection {
    pub fn heading(&self) -> String {
        format!("Supplier: {}", self.supplier_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl ComplianceReport {
    pub fn new(table: &SupplierTable, reports: &AiReportStore) -> Self {
        let sections = table
            .rows()
            .iter()
            .map(|row| match reports.get(&row.id) {
                Some(text) => ReportSection {
                    supplier_id: row.id.clone(),
                    body: text.to_string(),
                    has_narrative: true,
                },
                None => ReportSection {
                    supplier_id: row.id.clone(),
                    body: NO_REPORT_PLACEHOLDER.to_string(),
                    has_narrative: false,
                },
            })
            .collect();

        Self {
            title: REPORT_TITLE.to_string(),
            sections,
        }
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        let mut doc = PdfDocument::new(&self.title);
        doc.line(&self.title, Font::Regular, 12.0, Align::Center);
        doc.space(10.0);
        for section in &self.sections {
            doc.paragraph(&section.heading(), Font::Bold, 12.0);
            doc.paragraph(&section.body, Font::Regular, 11.0);
            doc.space(2.0);
        }
        let bytes = doc.finish();
        info!(
            "Rendered compliance report: {} sections, {} bytes",
            self.sections.len(),
            bytes.len()
        );
        bytes
    }
}

/// Scored table as delimited text: header row, no preamble, `Predicted_Risk` last
pub fn export_csv(table: &SupplierTable, delimiter: u8) -> ReportResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    header.push(PREDICTED_RISK_COLUMN);
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut cells: Vec<String> = table
            .columns()
            .iter()
            .map(|column| row.get(column).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        cells.push(
            row.predicted_risk
                .map(|r| r.as_str().to_string())
                .unwrap_or_default(),
        );
        writer.write_record(&cells)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}
