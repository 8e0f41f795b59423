//! Dashboard HTTP server
//!
//! Serves the single-page dashboard and a JSON API with one route group per
//! stage. One server process holds one session.

pub mod handler;
pub mod server;

pub use server::{router, AppState, HttpServer};
