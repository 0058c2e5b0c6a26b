// crates/decor-layout-server/src/lib.rs
// ============================================================================
// Module: Decor Layout Server Crate
// Description: HTTP layout service over the SQLite layout store.
// Purpose: Expose the versioned load/save protocol with strict validation.
// Dependencies: axum, decor-layout-core, decor-layout-store-sqlite, serde,
// serde_json, thiserror, tokio, toml
// ============================================================================

//! ## Overview
//! The layout service exposes the persistence protocol over HTTP: `GET
//! /layout` returns the stored layout for a warehouse, `POST /layout`
//! replaces its item list and bumps the version. Requests are validated at
//! the trust boundary with whole-batch rejection; every response travels in
//! the `{"data": ...}` / `{"error": ...}` envelope.
//!
//! Security posture: request bodies are untrusted; sizes are capped before
//! buffering and batches are sanitized before they reach storage.

pub mod config;
pub mod routes;
pub mod telemetry;

pub use config::ConfigError;
pub use config::ServerConfig;
pub use routes::AppState;
pub use routes::build_router;
pub use telemetry::LayoutMetricEvent;
pub use telemetry::LayoutMetrics;
pub use telemetry::LayoutOperation;
pub use telemetry::LayoutOutcome;
pub use telemetry::NoopMetrics;
