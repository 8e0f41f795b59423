//! Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::Router;
use tokio::net::TcpListener;

/// Supplier portal export: two preamble lines, semicolon-delimited
pub const SUPPLIERS: &str = "Supplier ESG export\nGenerated 2024-03-01\n\
id;PRINCIPLE_1;PRINCIPLE_2;PRINCIPLE_3;PRINCIPLE_4;TREND_RRI;CURRENT_RRI;COUNTRY_SECTOR_AVERAGE\n\
ACME;2;3;2;1;0.5;12;20\n\
BOLT;10;10;8;5;1.5;40;35\n\
CORE;1;1;1;1;0.1;5;22\n\
DYNA;4;4;4;4;0.9;20;30\n";

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A URL nothing is listening on
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/search", addr)
}
