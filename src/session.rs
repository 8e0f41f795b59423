//! Per-session state shared by the dashboard stages

use crate::supplier::SupplierTable;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Generated narratives keyed by supplier id, in generation order
#[derive(Debug, Clone, Default, Serialize)]
pub struct AiReportStore {
    reports: IndexMap<String, String>,
}

impl AiReportStore {
    /// Store a narrative, replacing any earlier one for the same supplier
    pub fn insert(&mut self, supplier_id: impl Into<String>, text: impl Into<String>) {
        self.reports.insert(supplier_id.into(), text.into());
    }

    pub fn get(&self, supplier_id: &str) -> Option<&str> {
        self.reports.get(supplier_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn supplier_ids(&self) -> impl Iterator<Item = &str> {
        self.reports.keys().map(String::as_str)
    }
}

/// State for one user session: the current table and its narratives
#[derive(Debug, Clone)]
pub struct SessionContext {
    table: Option<SupplierTable>,
    reports: AiReportStore,
    started_at: DateTime<Utc>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            table: None,
            reports: AiReportStore::default(),
            started_at: Utc::now(),
        }
    }

    pub fn table(&self) -> Option<&SupplierTable> {
        self.table.as_ref()
    }

    /// Install a freshly uploaded table. Narratives from an earlier upload
    /// are kept; they are keyed by supplier id.
    pub fn set_table(&mut self, table: SupplierTable) {
        self.table = Some(table);
    }

    pub fn reports(&self) -> &AiReportStore {
        &self.reports
    }

    pub fn store_narrative(&mut self, supplier_id: impl Into<String>, text: impl Into<String>) {
        self.reports.insert(supplier_id, text);
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Drop all state, as at the end of a session
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
