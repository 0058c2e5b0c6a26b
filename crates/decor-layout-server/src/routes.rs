// crates/decor-layout-server/src/routes.rs
// ============================================================================
// Module: Layout Service Routes
// Description: HTTP handlers for the versioned layout protocol.
// Purpose: Validate requests at the trust boundary and drive the store.
// Dependencies: axum, decor-layout-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Two routes cover the whole protocol:
//! - `GET /layout?warehouse=ID` returns the stored layout; a warehouse with
//!   no record yields the empty first-version layout.
//! - `POST /layout` replaces the full item list. The batch is validated with
//!   whole-batch rejection before anything touches storage: not-an-array,
//!   over-cap, per-element shape failures, and a non-string `warehouseId`
//!   all map to `400`; oversized bodies are refused with `413` before
//!   buffering completes.
//!
//! Every response travels in the `{"data": ...}` / `{"error": ...}` envelope.
//! An uninitialized store reports the fixed migration message with status
//! `500` so operators know to run the migration rather than retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use decor_layout_core::Layout;
use decor_layout_core::LayoutStore;
use decor_layout_core::MIGRATION_REQUIRED_MESSAGE;
use decor_layout_core::StoreError;
use decor_layout_core::WarehouseId;
use decor_layout_core::parse_items_strict;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::telemetry::LayoutMetricEvent;
use crate::telemetry::LayoutMetrics;
use crate::telemetry::LayoutOperation;
use crate::telemetry::LayoutOutcome;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Layout store backing the service.
    pub store: Arc<dyn LayoutStore + Send + Sync>,
    /// Metrics sink for request accounting.
    pub metrics: Arc<dyn LayoutMetrics>,
    /// Warehouse served when a request names none.
    pub default_warehouse_id: WarehouseId,
}

impl AppState {
    /// Resolves the warehouse for a request, falling back to the default.
    fn warehouse_for(&self, requested: Option<&str>) -> WarehouseId {
        match requested {
            Some(id) if !id.is_empty() => WarehouseId::new(id),
            _ => self.default_warehouse_id.clone(),
        }
    }
}

/// Builds the service router with the body limit applied.
#[must_use]
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/layout", get(handle_load).post(handle_save))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Query parameters accepted by `GET /layout`.
#[derive(Debug, Deserialize)]
struct LoadQuery {
    /// Warehouse whose layout is requested.
    warehouse: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Serves `GET /layout`.
async fn handle_load(
    State(state): State<AppState>,
    Query(query): Query<LoadQuery>,
) -> Response {
    let started = Instant::now();
    let warehouse_id = state.warehouse_for(query.warehouse.as_deref());
    match state.store.load(&warehouse_id) {
        Ok(layout) => {
            observe(&state, started, LayoutOperation::Load, LayoutOutcome::Ok, Some(layout.items.len()));
            data_response(&layout)
        }
        Err(error) => {
            observe(&state, started, LayoutOperation::Load, LayoutOutcome::Error, None);
            store_failure_response(&error)
        }
    }
}

/// Serves `POST /layout`.
async fn handle_save(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let started = Instant::now();
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            observe(&state, started, LayoutOperation::Save, LayoutOutcome::Rejected, None);
            return error_response(rejection.status(), &rejection.body_text());
        }
    };
    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(error) => {
            observe(&state, started, LayoutOperation::Save, LayoutOutcome::Rejected, None);
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("request body is not valid JSON: {error}"),
            );
        }
    };
    // A present-but-malformed warehouseId must not fall back to the default
    // warehouse; only an absent or null field does.
    let warehouse_id = match payload.get("warehouseId") {
        None | Some(Value::Null) => state.default_warehouse_id.clone(),
        Some(Value::String(id)) if !id.is_empty() => WarehouseId::new(id.as_str()),
        Some(_) => {
            observe(&state, started, LayoutOperation::Save, LayoutOutcome::Rejected, None);
            return error_response(
                StatusCode::BAD_REQUEST,
                "warehouseId must be a non-empty string",
            );
        }
    };
    let candidate_items = payload.get("items").unwrap_or(&Value::Null);
    let items = match parse_items_strict(candidate_items) {
        Ok(items) => items,
        Err(error) => {
            observe(&state, started, LayoutOperation::Save, LayoutOutcome::Rejected, None);
            return error_response(StatusCode::BAD_REQUEST, &error.to_string());
        }
    };
    match state.store.save(&warehouse_id, &items) {
        Ok(layout) => {
            observe(&state, started, LayoutOperation::Save, LayoutOutcome::Ok, Some(layout.items.len()));
            data_response(&layout)
        }
        Err(error) => {
            observe(&state, started, LayoutOperation::Save, LayoutOutcome::Error, None);
            store_failure_response(&error)
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Wraps a layout in the success envelope.
fn data_response(layout: &Layout) -> Response {
    (StatusCode::OK, Json(json!({ "data": layout }))).into_response()
}

/// Wraps a failure message in the error envelope.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Maps a store failure onto the protocol error surface.
fn store_failure_response(error: &StoreError) -> Response {
    match error {
        StoreError::MigrationRequired => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, MIGRATION_REQUIRED_MESSAGE)
        }
        StoreError::Db(_) | StoreError::Corrupt(_) | StoreError::Invalid(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
        }
    }
}

/// Records the request and latency against the metrics sink.
fn observe(
    state: &AppState,
    started: Instant,
    operation: LayoutOperation,
    outcome: LayoutOutcome,
    item_count: Option<usize>,
) {
    let event = LayoutMetricEvent {
        operation,
        outcome,
        item_count,
    };
    state.metrics.record_request(&event);
    state.metrics.record_latency(&event, started.elapsed());
}
