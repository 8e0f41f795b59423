//! HTTP handlers for the dashboard API

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use crate::report::{CSV_FILE_NAME, PDF_FILE_NAME};
use crate::view::{Stage, ViewError};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};
use super::server::AppState;

/// Multipart field carrying the supplier CSV
pub const UPLOAD_FIELD: &str = "file";

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ViewError::Precondition(prompt) => (StatusCode::CONFLICT, json!({ "info": prompt })),
            ViewError::UnknownSupplier(_) => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            ViewError::Load(_) => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
            ViewError::Narrative(_) => (StatusCode::BAD_GATEWAY, json!({ "error": self.to_string() })),
            ViewError::Report(_) | ViewError::Alert(_) => {
                error!("Dashboard error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": self.to_string() }))
            }
        };
        (status, Json(body)).into_response()
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn attachment(content_type: mime::Mime, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

/// Handler for system status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    let stages: Vec<_> = Stage::ALL
        .iter()
        .map(|s| json!({ "stage": s, "title": s.title() }))
        .collect();
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "session_started": session.started_at().to_rfc3339(),
        "table_loaded": session.table().is_some(),
        "rows": session.table().map(|t| t.len()).unwrap_or(0),
        "reports": session.reports().len(),
        "stages": stages,
    }))
}

/// Stage 1: multipart upload of the supplier CSV
pub async fn upload_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(UPLOAD_FIELD) {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some(bytes);
                        break;
                    }
                    Err(e) => return bad_request(format!("Upload failed: {}", e)),
                }
            }
            Ok(None) => break,
            Err(e) => return bad_request(format!("Upload failed: {}", e)),
        }
    }

    let Some(bytes) = upload else {
        return bad_request(format!("Missing multipart field '{}'", UPLOAD_FIELD));
    };

    let mut session = state.session.write().await;
    match state.dashboard.upload(&mut session, &bytes) {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            warn!("Upload rejected: {}", e);
            e.into_response()
        }
    }
}

/// Stage 2: graph data, SVG and risk distribution
pub async fn graph_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.graph(&session) {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn graph_svg_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.graph(&session) {
        Ok(view) => ([(header::CONTENT_TYPE, mime::IMAGE_SVG.to_string())], view.svg).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Stage 3: fires the sanctions and news lookups on every call
pub async fn alerts_handler(State(state): State<Arc<AppState>>) -> Response {
    let table = state.session.read().await.table().cloned();
    match state.dashboard.alerts_for(table.as_ref()).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Stage 4 with the default selection
pub async fn insights_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.insights(&session, None) {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn insight_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.insights(&session, Some(&id)) {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Stage 4 action: generate a narrative and keep it for the report
pub async fn generate_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    // The AI call can take a while; only hold the read lock for it
    let generated = {
        let session = state.session.read().await;
        state.dashboard.generate_narrative(&session, &id).await
    };

    match generated {
        Ok(narrative) => {
            let mut session = state.session.write().await;
            state.dashboard.record_narrative(&mut session, &narrative);
            Json(narrative).into_response()
        }
        Err(e) => {
            warn!("Narrative generation for {} failed: {}", id, e);
            e.into_response()
        }
    }
}

/// Stage 5: section overview of the compliance report
pub async fn reports_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.reports(&session) {
        Ok(view) => Json(view.report).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn report_pdf_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.reports(&session) {
        Ok(view) => attachment(mime::APPLICATION_PDF, PDF_FILE_NAME, view.pdf),
        Err(e) => e.into_response(),
    }
}

pub async fn report_csv_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    match state.dashboard.reports(&session) {
        Ok(view) => attachment(mime::TEXT_CSV, CSV_FILE_NAME, view.csv),
        Err(e) => e.into_response(),
    }
}
