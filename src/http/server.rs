//! HTTP server implementation for the dashboard

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use crate::config::HttpConfig;
use crate::session::SessionContext;
use crate::view::Dashboard;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use super::handler::{
    alerts_handler, generate_handler, graph_handler, graph_svg_handler, insight_handler,
    insights_handler, report_csv_handler, report_pdf_handler, reports_handler, status_handler,
    upload_handler,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "src/http/static/"]
struct Assets;

async fn static_handler() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(file) => Html(String::from_utf8_lossy(file.data.as_ref()).into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], "dashboard assets missing")
            .into_response(),
    }
}

/// Shared state: the stage logic and the single session it serves
pub struct AppState {
    pub dashboard: Dashboard,
    pub session: RwLock<SessionContext>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            session: RwLock::new(SessionContext::new()),
        }
    }
}

/// All dashboard routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(static_handler))
        .route("/api/status", get(status_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/graph", get(graph_handler))
        .route("/api/graph.svg", get(graph_svg_handler))
        .route("/api/alerts", get(alerts_handler))
        .route("/api/insights", get(insights_handler))
        .route("/api/insights/:id", get(insight_handler))
        .route("/api/insights/:id/report", post(generate_handler))
        .route("/api/reports", get(reports_handler))
        .route("/api/reports/pdf", get(report_pdf_handler))
        .route("/api/reports/csv", get(report_csv_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server for the dashboard
pub struct HttpServer {
    state: Arc<AppState>,
    config: HttpConfig,
}

impl HttpServer {
    pub fn new(dashboard: Dashboard, config: HttpConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(dashboard)),
            config,
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(Arc::clone(&self.state));

        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("ESC-M dashboard available at http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
