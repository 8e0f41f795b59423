mod common;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use escm::alerts::AlertResult;
use escm::http::{router, AppState};
use escm::narrative::NarrativeResult;
use escm::view::{INSIGHTS_NEED_DATA, REPORTS_NEED_NARRATIVE, UPLOAD_FIRST};
use escm::{
    AlertsEngine, CsvLoader, Dashboard, NarrativeGenerator, NewsArticle, NewsSource, SanctionsMatch,
    SanctionsSource,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tower::ServiceExt;

const BOUNDARY: &str = "escm-test-boundary";

struct Offline;

#[async_trait]
impl SanctionsSource for Offline {
    fn name(&self) -> &str {
        "offline"
    }
    async fn check(&self, supplier_id: &str) -> AlertResult<SanctionsMatch> {
        if supplier_id == "BOLT" {
            Ok(SanctionsMatch::from_names(vec!["Bolt Holdings".to_string()]))
        } else {
            Ok(SanctionsMatch::default())
        }
    }
}

#[async_trait]
impl NewsSource for Offline {
    fn name(&self) -> &str {
        "offline"
    }
    async fn search(&self, _supplier_id: &str) -> AlertResult<Vec<NewsArticle>> {
        Ok(Vec::new())
    }
}

/// Sanctions lookups that park until the test releases them
struct Gated {
    started: Notify,
    release: Semaphore,
}

#[async_trait]
impl SanctionsSource for Gated {
    fn name(&self) -> &str {
        "gated"
    }
    async fn check(&self, _supplier_id: &str) -> AlertResult<SanctionsMatch> {
        self.started.notify_one();
        let _permit = self.release.acquire().await;
        Ok(SanctionsMatch::default())
    }
}

struct Scripted;

#[async_trait]
impl NarrativeGenerator for Scripted {
    async fn generate(&self, prompt: &str) -> NarrativeResult<String> {
        Ok(format!("Scripted narrative ({} chars of prompt)", prompt.len()))
    }
}

fn app() -> Router {
    app_with(Arc::new(Offline))
}

fn app_with(sanctions: Arc<dyn SanctionsSource>) -> Router {
    let dashboard = Dashboard::new(
        CsvLoader::new(),
        AlertsEngine::new(sanctions, Arc::new(Offline)),
        Arc::new(Scripted),
    );
    router(Arc::new(AppState::new(dashboard)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

fn upload(csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"suppliers.csv\"\r\n\
Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        csv = csv
    );
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes, content_type)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes, _) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_stages_before_upload_prompt_for_data() {
    let app = app();

    let (status, body) = send_json(&app, get("/api/graph")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["info"], UPLOAD_FIRST);

    let (status, body) = send_json(&app, get("/api/insights")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["info"], INSIGHTS_NEED_DATA);

    let (status, body) = send_json(&app, get("/api/reports")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["info"], REPORTS_NEED_NARRATIVE);
}

#[tokio::test]
async fn test_index_page_is_served() {
    let (status, bytes, content_type) = send(&app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap_or_default().starts_with("text/html"));
    assert!(String::from_utf8_lossy(&bytes).contains("Ethical Supply Chain Mapper"));
}

#[tokio::test]
async fn test_bad_upload_is_rejected() {
    let app = app();
    let (status, body) = send_json(&app, upload("x\ny\nname;PRINCIPLE_1\nA;1\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("id"));

    let (_, status_body) = send_json(&app, get("/api/status")).await;
    assert_eq!(status_body["table_loaded"], false);
}

#[tokio::test]
async fn test_full_session_flow() {
    let app = app();

    // Stage 1
    let (status, body) = send_json(&app, upload(common::SUPPLIERS)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 4);
    assert_eq!(body["risk"][1]["id"], "BOLT");
    assert_eq!(body["risk"][1]["Predicted_Risk"], "dangerous_risk");

    // Stage 2
    let (status, body) = send_json(&app, get("/api/graph")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(body["edges"].as_array().unwrap().len(), 5);
    let (_, svg, content_type) = send(&app, get("/api/graph.svg")).await;
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    assert!(String::from_utf8_lossy(&svg).contains("Supplier_ACME"));

    // Stage 3
    let (status, body) = send_json(&app, get("/api/alerts")).await;
    assert_eq!(status, StatusCode::OK);
    let flags = body["risk_flags"].as_array().unwrap();
    assert_eq!(flags.len(), 1);
    let alerts = body["alerts"].as_array().unwrap();
    assert!(alerts
        .iter()
        .any(|a| a["message"] == "Sanction Alert: Supplier ID `BOLT` matches: Bolt Holdings"));

    // Stage 4
    let (status, body) = send_json(&app, get("/api/insights")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"], "ACME");
    assert!(body["narrative"].is_null());

    let (status, _) = send_json(&app, get("/api/insights/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, get("/api/reports")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(&app, post("/api/insights/BOLT/report")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supplier_id"], "BOLT");

    let (_, body) = send_json(&app, get("/api/insights/BOLT")).await;
    assert!(body["narrative"].as_str().unwrap().starts_with("Scripted narrative"));

    // Stage 5
    let (status, body) = send_json(&app, get("/api/reports")).await;
    assert_eq!(status, StatusCode::OK);
    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 4);
    assert_eq!(sections[1]["has_narrative"], true);
    assert_eq!(sections[0]["has_narrative"], false);

    let (status, pdf, content_type) = send(&app, get("/api/reports/pdf")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/pdf"));
    assert!(pdf.starts_with(b"%PDF-1.4"));

    let (status, csv, content_type) = send(&app, get("/api/reports/csv")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/csv"));
    let reloaded = CsvLoader::new().preamble_lines(0).load(&csv).unwrap();
    assert_eq!(reloaded.len(), 4);
}

#[tokio::test]
async fn test_upload_is_not_blocked_by_a_running_alert_scan() {
    let gate = Arc::new(Gated {
        started: Notify::new(),
        release: Semaphore::new(0),
    });
    let app = app_with(gate.clone());

    let (status, _) = send_json(&app, upload(common::SUPPLIERS)).await;
    assert_eq!(status, StatusCode::OK);

    let scan = tokio::spawn(app.clone().oneshot(get("/api/alerts")));
    gate.started.notified().await;

    // The scan is parked inside a lookup; the session must stay writable
    let reupload = tokio::time::timeout(Duration::from_secs(5), send_json(&app, upload(common::SUPPLIERS)));
    let (status, body) = reupload.await.expect("upload waited for the alert scan");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 4);

    let (status, _) = tokio::time::timeout(Duration::from_secs(5), send_json(&app, get("/api/status")))
        .await
        .expect("status waited for the alert scan");
    assert_eq!(status, StatusCode::OK);

    gate.release.add_permits(16);
    let response = scan.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
