// crates/decor-layout-server/src/telemetry.rs
// ============================================================================
// Module: Layout Service Telemetry
// Description: Observability hooks for layout request handling.
// Purpose: Provide metric events and latency observation without hard deps.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for layout request counters
//! and latencies. It is intentionally dependency-light so deployments can
//! plug in Prometheus or OpenTelemetry without redesign.
//! Security posture: telemetry must not leak stored layout contents; labels
//! are closed enumerations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Layout request operation classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOperation {
    /// `GET /layout`.
    Load,
    /// `POST /layout`.
    Save,
}

impl LayoutOperation {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
        }
    }
}

/// Layout request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Successful request.
    Ok,
    /// Rejected request (validation failure).
    Rejected,
    /// Failed request (storage or internal failure).
    Error,
}

impl LayoutOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

/// Layout request metric event payload.
#[derive(Debug, Clone)]
pub struct LayoutMetricEvent {
    /// Operation classification.
    pub operation: LayoutOperation,
    /// Request outcome.
    pub outcome: LayoutOutcome,
    /// Item count carried by the request or response, when known.
    pub item_count: Option<usize>,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for layout requests and latencies.
pub trait LayoutMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: &LayoutMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: &LayoutMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl LayoutMetrics for NoopMetrics {
    fn record_request(&self, _event: &LayoutMetricEvent) {}

    fn record_latency(&self, _event: &LayoutMetricEvent, _latency: Duration) {}
}
