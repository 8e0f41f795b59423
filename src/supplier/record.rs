//! Supplier records and the in-memory supplier table

use super::risk::{RiskInputs, RiskTier};
use super::{ID_COLUMN, PREDICTED_RISK_COLUMN};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of the uploaded table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl FieldValue {
    /// Infer a value from raw cell text. Empty cells and `NaN` are null.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = text.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_nan() => FieldValue::Null,
            Ok(f) => FieldValue::Float(f),
            Err(_) => FieldValue::String(text.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view of the value, `None` for text and null
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Null => Ok(()),
        }
    }
}

/// One row of the uploaded supplier table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRecord {
    /// Supplier identifier, the `id` cell rendered as text
    pub id: String,

    /// All remaining cells keyed by trimmed column name (includes `id`)
    pub fields: IndexMap<String, FieldValue>,

    /// Tier assigned by the Risk Scorer
    pub predicted_risk: Option<RiskTier>,
}

impl SupplierRecord {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut fields = IndexMap::new();
        fields.insert(ID_COLUMN.to_string(), FieldValue::String(id.clone()));
        Self {
            id,
            fields,
            predicted_risk: None,
        }
    }

    /// Builder-style setter used by tests and fixtures
    pub fn with_field(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(column.into(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FieldValue::as_f64)
    }

    /// Field map including the derived `Predicted_Risk` column
    pub fn details(&self) -> IndexMap<String, FieldValue> {
        let mut details = self.fields.clone();
        if let Some(risk) = self.predicted_risk {
            details.insert(
                PREDICTED_RISK_COLUMN.to_string(),
                FieldValue::String(risk.as_str().to_string()),
            );
        }
        details
    }
}

/// The uploaded table: ordered columns, rows, and the resolved risk inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierTable {
    columns: Vec<String>,
    rows: Vec<SupplierRecord>,
    risk_inputs: RiskInputs,
}

impl SupplierTable {
    pub fn new(columns: Vec<String>, rows: Vec<SupplierRecord>, risk_inputs: RiskInputs) -> Self {
        Self {
            columns,
            rows,
            risk_inputs,
        }
    }

    /// Column names in file order, excluding `Predicted_Risk`
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SupplierRecord] {
        &self.rows
    }

    pub fn risk_inputs(&self) -> &RiskInputs {
        &self.risk_inputs
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose id matches
    pub fn get(&self, id: &str) -> Option<&SupplierRecord> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Distinct supplier ids in first-seen order
    pub fn ids(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for row in &self.rows {
            seen.insert(row.id.clone());
        }
        seen.into_iter().collect()
    }

    /// Run the Risk Scorer over every row, replacing any previous tier
    pub fn score(&mut self) {
        for row in &mut self.rows {
            row.predicted_risk = Some(self.risk_inputs.tier(row));
        }
        tracing::debug!(
            "Scored {} rows using {} risk input columns",
            self.rows.len(),
            self.risk_inputs.columns().len()
        );
    }

    pub fn is_scored(&self) -> bool {
        self.rows.iter().all(|row| row.predicted_risk.is_some())
    }

    /// `(id, Predicted_Risk)` pairs in table order
    pub fn risk_pairs(&self) -> Vec<(String, Option<RiskTier>)> {
        self.rows
            .iter()
            .map(|row| (row.id.clone(), row.predicted_risk))
            .collect()
    }
}
