//! Supplier data: CSV ingestion, records and ESG risk tiers
//!
//! The uploaded file is a semicolon-delimited export with two preamble
//! lines before the header row. Every row becomes a [`SupplierRecord`];
//! the [`RiskInputs`] resolved at load time decide which columns feed the
//! risk score.

pub mod loader;
pub mod recommend;
pub mod record;
pub mod risk;

pub use loader::CsvLoader;
pub use recommend::{recommend_alternative, Recommendation};
pub use record::{FieldValue, SupplierRecord, SupplierTable};
pub use risk::{RiskInputs, RiskTier};

use thiserror::Error;

/// Column every upload must carry
pub const ID_COLUMN: &str = "id";

/// Column holding the derived risk tier
pub const PREDICTED_RISK_COLUMN: &str = "Predicted_Risk";

/// Errors raised while turning an upload into a [`SupplierTable`]
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("No columns to parse from file")]
    Empty,

    #[error("Parse error on line {line}: {detail}")]
    Parse { line: u64, detail: String },

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("No risk input columns found (expected at least one column containing 'PRINCIPLE')")]
    NoRiskInputs,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
