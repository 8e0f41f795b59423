//! View Controller
//!
//! Five stages over one [`SessionContext`]. Upload fills the table; every
//! other stage re-renders from the current session and answers with an
//! informational prompt when its input is not there yet.

use crate::alerts::{
    risk_flag_alerts, AlertError, AlertRecord, AlertsEngine, NewsDataClient, OpenSanctionsClient,
};
use crate::config::AppConfig;
use crate::graph::{
    build_multi_tier_graph, edge_color, render_svg, spring_layout, RiskDistribution, DEFAULT_TIERS,
    LAYOUT_SEED,
};
use crate::narrative::{build_prompt, NarrativeClient, NarrativeError, NarrativeGenerator};
use crate::report::{export_csv, ComplianceReport, ReportError};
use crate::session::SessionContext;
use crate::supplier::{
    recommend_alternative, CsvLoader, FieldValue, LoadError, RiskTier, SupplierTable,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const UPLOAD_FIRST: &str = "Please upload supplier data in Step 1.";
pub const ALERTS_NEED_DATA: &str = "Upload or process supplier data in Step 1 first.";
pub const INSIGHTS_NEED_DATA: &str = "Please upload and process your data first.";
pub const REPORTS_NEED_NARRATIVE: &str =
    "Generate at least one AI report to enable compliance report download.";

/// Rows shown in the upload preview
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Upload,
    Graph,
    Alerts,
    Insights,
    Reports,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Upload,
        Stage::Graph,
        Stage::Alerts,
        Stage::Insights,
        Stage::Reports,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Upload => "Data & Risk Mapping",
            Stage::Graph => "Multi-Tier Graph",
            Stage::Alerts => "Real-Time Alerts",
            Stage::Insights => "Insights & Actions",
            Stage::Reports => "Compliance Reports",
        }
    }
}

#[derive(Error, Debug)]
pub enum ViewError {
    /// A stage's input is missing; shown as an informational prompt
    #[error("{0}")]
    Precondition(&'static str),

    #[error("Unknown supplier '{0}'")]
    UnknownSupplier(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("AI analysis failed: {0}")]
    Narrative(#[from] NarrativeError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Alert(#[from] AlertError),
}

pub type ViewResult<T> = Result<T, ViewError>;

#[derive(Debug, Clone, Serialize)]
pub struct RiskRow {
    pub id: String,
    #[serde(rename = "Predicted_Risk")]
    pub predicted_risk: Option<RiskTier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadView {
    pub rows: usize,
    pub columns: Vec<String>,
    pub risk_inputs: Vec<String>,
    pub preview: Vec<IndexMap<String, FieldValue>>,
    pub risk: Vec<RiskRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNodeView {
    pub name: String,
    pub tier: Option<u8>,
    pub risk: Option<RiskTier>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdgeView {
    pub source: String,
    pub target: String,
    pub tier: u8,
    pub risk: Option<RiskTier>,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub tiers: usize,
    pub nodes: Vec<GraphNodeView>,
    pub edges: Vec<GraphEdgeView>,
    pub svg: String,
    pub distribution: RiskDistribution,
    pub distribution_svg: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertsView {
    pub risk_flags: Vec<AlertRecord>,
    pub alerts: Vec<AlertRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsView {
    pub supplier_ids: Vec<String>,
    pub selected: String,
    pub details: IndexMap<String, FieldValue>,
    pub prompt: String,
    pub recommendation: String,
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedNarrative {
    pub supplier_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ReportsView {
    pub report: ComplianceReport,
    pub pdf: Vec<u8>,
    pub csv: Vec<u8>,
}

/// Stage logic with its collaborators; holds no session state itself
pub struct Dashboard {
    loader: CsvLoader,
    alerts: AlertsEngine,
    narrative: Arc<dyn NarrativeGenerator>,
}

impl Dashboard {
    pub fn new(loader: CsvLoader, alerts: AlertsEngine, narrative: Arc<dyn NarrativeGenerator>) -> Self {
        Self {
            loader,
            alerts,
            narrative,
        }
    }

    /// Wire the HTTP clients described by `config`
    pub fn from_config(config: &AppConfig) -> ViewResult<Self> {
        let sanctions = OpenSanctionsClient::new(
            Some(config.sanctions.api_url.clone()),
            config.sanctions.api_key.clone(),
        )?;
        let news = NewsDataClient::new(Some(config.news.api_url.clone()), config.news.api_key.clone())?;
        let narrative = NarrativeClient::new(&config.narrative)?;

        Ok(Self::new(
            CsvLoader::new().risk_columns(config.risk_columns.clone()),
            AlertsEngine::new(Arc::new(sanctions), Arc::new(news)),
            Arc::new(narrative),
        ))
    }

    /// Stage 1: parse, score and install the upload
    pub fn upload(&self, session: &mut SessionContext, bytes: &[u8]) -> ViewResult<UploadView> {
        let mut table = self.loader.load(bytes)?;
        table.score();

        let view = UploadView {
            rows: table.len(),
            columns: table.columns().to_vec(),
            risk_inputs: table.risk_inputs().columns().to_vec(),
            preview: table
                .rows()
                .iter()
                .take(PREVIEW_ROWS)
                .map(|row| row.fields.clone())
                .collect(),
            risk: table
                .risk_pairs()
                .into_iter()
                .map(|(id, predicted_risk)| RiskRow { id, predicted_risk })
                .collect(),
        };

        info!("Supplier data loaded: {} rows", view.rows);
        session.set_table(table);
        Ok(view)
    }

    /// Stage 2: graph, layout and risk distribution
    pub fn graph(&self, session: &SessionContext) -> ViewResult<GraphView> {
        let table = require_table(session, UPLOAD_FIRST)?;
        let graph = build_multi_tier_graph(table, DEFAULT_TIERS);
        let layout = spring_layout(&graph, LAYOUT_SEED);

        let nodes = graph
            .nodes()
            .iter()
            .map(|node| {
                let (x, y) = layout.position(node.id.as_usize()).unwrap_or((0.0, 0.0));
                GraphNodeView {
                    name: node.name.clone(),
                    tier: node.tier,
                    risk: node.risk,
                    x,
                    y,
                }
            })
            .collect();
        let name = |id: crate::graph::NodeId| {
            graph
                .get_node(id)
                .map(|n| n.name.clone())
                .unwrap_or_default()
        };
        let edges = graph
            .edges()
            .iter()
            .map(|edge| GraphEdgeView {
                source: name(edge.source),
                target: name(edge.target),
                tier: edge.tier,
                risk: edge.risk,
                color: edge_color(edge.risk),
            })
            .collect();

        let distribution = RiskDistribution::from_table(table);
        let distribution_svg = distribution.render_svg();

        Ok(GraphView {
            tiers: graph.tiers(),
            nodes,
            edges,
            svg: render_svg(&graph, &layout),
            distribution,
            distribution_svg,
        })
    }

    /// Stage 3: risk flags plus one sanctions/news call pair per supplier
    pub async fn alerts(&self, session: &SessionContext) -> ViewResult<AlertsView> {
        self.alerts_for(session.table()).await
    }

    /// Stage 3 over a table snapshot, so no session lock is held while the
    /// lookups run
    pub async fn alerts_for(&self, table: Option<&SupplierTable>) -> ViewResult<AlertsView> {
        let table = table.ok_or(ViewError::Precondition(ALERTS_NEED_DATA))?;
        Ok(AlertsView {
            risk_flags: risk_flag_alerts(table),
            alerts: self.alerts.scan(table).await,
        })
    }

    /// Stage 4: details for one supplier, defaulting to the first id
    pub fn insights(&self, session: &SessionContext, supplier_id: Option<&str>) -> ViewResult<InsightsView> {
        let table = require_table(session, INSIGHTS_NEED_DATA)?;
        if table.is_empty() {
            return Err(ViewError::Precondition(INSIGHTS_NEED_DATA));
        }

        let supplier_ids = table.ids();
        let selected = match supplier_id {
            Some(id) => id.to_string(),
            None => supplier_ids[0].clone(),
        };
        let record = table
            .get(&selected)
            .ok_or_else(|| ViewError::UnknownSupplier(selected.clone()))?;

        Ok(InsightsView {
            details: record.details(),
            prompt: build_prompt(record),
            recommendation: recommend_alternative(table, record).to_string(),
            narrative: session.reports().get(&selected).map(str::to_string),
            supplier_ids,
            selected,
        })
    }

    /// Stage 4 action: ask the AI endpoint for one supplier's narrative.
    /// The caller stores the result with [`Dashboard::record_narrative`].
    pub async fn generate_narrative(
        &self,
        session: &SessionContext,
        supplier_id: &str,
    ) -> ViewResult<GeneratedNarrative> {
        let table = require_table(session, INSIGHTS_NEED_DATA)?;
        let record = table
            .get(supplier_id)
            .ok_or_else(|| ViewError::UnknownSupplier(supplier_id.to_string()))?;

        let text = self.narrative.generate(&build_prompt(record)).await?;
        Ok(GeneratedNarrative {
            supplier_id: supplier_id.to_string(),
            text,
        })
    }

    /// Persist a narrative where the Reports stage reads it
    pub fn record_narrative(&self, session: &mut SessionContext, narrative: &GeneratedNarrative) {
        session.store_narrative(narrative.supplier_id.clone(), narrative.text.clone());
        info!(
            "Stored AI report for {} ({} reports in session)",
            narrative.supplier_id,
            session.reports().len()
        );
    }

    /// Generate and store in one step
    pub async fn generate_and_store(
        &self,
        session: &mut SessionContext,
        supplier_id: &str,
    ) -> ViewResult<GeneratedNarrative> {
        let narrative = self.generate_narrative(session, supplier_id).await?;
        self.record_narrative(session, &narrative);
        Ok(narrative)
    }

    /// Stage 5: PDF report and CSV export, once a narrative exists
    pub fn reports(&self, session: &SessionContext) -> ViewResult<ReportsView> {
        let table = require_table(session, REPORTS_NEED_NARRATIVE)?;
        if session.reports().is_empty() {
            return Err(ViewError::Precondition(REPORTS_NEED_NARRATIVE));
        }

        let report = ComplianceReport::new(table, session.reports());
        let pdf = report.to_pdf();
        let csv = export_csv(table, b';')?;
        Ok(ReportsView { report, pdf, csv })
    }
}

fn require_table<'a>(session: &'a SessionContext, prompt: &'static str) -> ViewResult<&'a SupplierTable> {
    session.table().ok_or(ViewError::Precondition(prompt))
}
