//! CSV Loader
//!
//! Parses an uploaded supplier export: skip the preamble lines, read the
//! header, drop columns that are entirely empty, trim header whitespace and
//! resolve the risk input columns.

use super::record::{FieldValue, SupplierRecord, SupplierTable};
use super::risk::{RiskInputs, RiskTier};
use super::{LoadError, LoadResult, ID_COLUMN, PREDICTED_RISK_COLUMN};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Loader configuration for supplier uploads
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    preamble_lines: usize,
    risk_columns: Option<Vec<String>>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: b';',
            preamble_lines: 2,
            risk_columns: None,
        }
    }
}

impl CsvLoader {
    /// Semicolon-delimited, two preamble lines, `PRINCIPLE` column discovery
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn preamble_lines(mut self, lines: usize) -> Self {
        self.preamble_lines = lines;
        self
    }

    /// Declare the risk input columns instead of discovering them
    pub fn risk_columns(mut self, columns: Option<Vec<String>>) -> Self {
        self.risk_columns = columns;
        self
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> LoadResult<SupplierTable> {
        let bytes = std::fs::read(path.as_ref())?;
        self.load(&bytes)
    }

    /// Parse an upload into an unscored table
    pub fn load(&self, bytes: &[u8]) -> LoadResult<SupplierTable> {
        let text = std::str::from_utf8(bytes).map_err(|e| LoadError::Encoding(e.to_string()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let body = skip_lines(text, self.preamble_lines);
        if body.trim().is_empty() {
            return Err(LoadError::Empty);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let raw_headers = reader
            .headers()
            .map_err(|e| parse_error(&e, self.preamble_lines))?
            .clone();
        let headers = name_headers(&raw_headers);
        let id_col = headers.iter().position(|h| h == ID_COLUMN);

        // Ids keep their source text; `007` and `1e3` are names, not numbers
        let mut raw_ids: Vec<String> = Vec::new();
        let mut cells: Vec<Vec<FieldValue>> = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| parse_error(&e, self.preamble_lines))?;
            if record.len() > headers.len() {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(LoadError::Parse {
                    line: line + self.preamble_lines as u64,
                    detail: format!("Expected {} fields, saw {}", headers.len(), record.len()),
                });
            }
            raw_ids.push(
                id_col
                    .and_then(|col| record.get(col))
                    .map(|raw| raw.trim().to_string())
                    .unwrap_or_default(),
            );
            let mut row: Vec<FieldValue> = record.iter().map(FieldValue::parse).collect();
            row.resize(headers.len(), FieldValue::Null);
            cells.push(row);
        }

        // Drop all-empty columns
        let keep: Vec<usize> = (0..headers.len())
            .filter(|&col| cells.is_empty() || cells.iter().any(|row| !row[col].is_null()))
            .collect();
        let dropped = headers.len() - keep.len();

        let mut columns: Vec<String> = keep.iter().map(|&col| headers[col].clone()).collect();
        let id_index = columns
            .iter()
            .position(|c| c == ID_COLUMN)
            .ok_or_else(|| LoadError::MissingColumn(ID_COLUMN.to_string()))?;
        let risk_index = columns.iter().position(|c| c == PREDICTED_RISK_COLUMN);

        let mut rows = Vec::with_capacity(cells.len());
        for (row, id) in cells.iter().zip(raw_ids) {
            let mut fields = IndexMap::with_capacity(keep.len());
            let mut predicted_risk = None;
            for (pos, &col) in keep.iter().enumerate() {
                if pos == id_index {
                    let value = if id.is_empty() {
                        FieldValue::Null
                    } else {
                        FieldValue::String(id.clone())
                    };
                    fields.insert(columns[pos].clone(), value);
                    continue;
                }
                if Some(pos) == risk_index {
                    predicted_risk = row[col].as_str().and_then(|s| s.parse::<RiskTier>().ok());
                    continue;
                }
                fields.insert(columns[pos].clone(), row[col].clone());
            }
            rows.push(SupplierRecord {
                id,
                fields,
                predicted_risk,
            });
        }
        if let Some(pos) = risk_index {
            columns.remove(pos);
        }

        let risk_inputs = match &self.risk_columns {
            Some(declared) => RiskInputs::declared(declared, &columns)?,
            None => RiskInputs::discover(&columns)?,
        };

        debug!("Dropped {} empty columns", dropped);
        info!(
            "Loaded supplier table: {} rows, {} columns, risk inputs {:?}",
            rows.len(),
            columns.len(),
            risk_inputs.columns()
        );

        Ok(SupplierTable::new(columns, rows, risk_inputs))
    }
}

/// Remainder of `text` after its first `count` lines
fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

/// Trim headers, name blank ones `Unnamed: <n>` and de-duplicate repeats
/// with `.<k>`
fn name_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim();
            let base = if name.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

fn parse_error(err: &csv::Error, preamble: usize) -> LoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    LoadError::Parse {
        line: line + preamble as u64,
        detail: err.to_string(),
    }
}
