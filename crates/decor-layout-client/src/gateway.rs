// crates/decor-layout-client/src/gateway.rs
// ============================================================================
// Module: HTTP Layout Gateway
// Description: Blocking HTTP client speaking the layout service protocol.
// Purpose: Implement LayoutGateway with bounded loads and uncancelled saves.
// Dependencies: decor-layout-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`HttpLayoutGateway`] talks to the layout service over two dedicated
//! clients: the load client carries a hard request timeout, the save client
//! carries none. Responses use a `{"data": ...}` / `{"error": ...}` envelope;
//! error statuses map onto the gateway error taxonomy so the session can
//! distinguish a rejected payload from an uninitialized store or a dead
//! network.
//!
//! Security posture: service responses are untrusted; parsing fails closed
//! and the session re-sanitizes every loaded item.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use decor_layout_core::DecorItem;
use decor_layout_core::GatewayError;
use decor_layout_core::Layout;
use decor_layout_core::LayoutGateway;
use decor_layout_core::MIGRATION_REQUIRED_MESSAGE;
use decor_layout_core::WarehouseId;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default hard timeout for layout loads, in seconds.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 8;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the HTTP layout gateway.
///
/// # Invariants
/// - `base_url` carries no trailing slash handling; it is joined verbatim
///   with the protocol paths.
/// - `load_timeout_secs` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpLayoutGatewayConfig {
    /// Service base URL, for example `http://127.0.0.1:8087`.
    pub base_url: String,
    /// Hard timeout applied to layout loads, in seconds.
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
}

impl HttpLayoutGatewayConfig {
    /// Returns a config with the default load timeout for a base URL.
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

/// Returns the default load timeout in seconds.
const fn default_load_timeout_secs() -> u64 {
    DEFAULT_LOAD_TIMEOUT_SECS
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Response envelope wrapping every service reply.
#[derive(Debug, Deserialize)]
struct Envelope {
    /// Successful payload, when present.
    data: Option<Layout>,
    /// Failure description, when present.
    error: Option<String>,
}

/// Save request body carrying the full replacement item list.
#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    /// Warehouse whose layout is being replaced.
    #[serde(rename = "warehouseId")]
    warehouse_id: &'a str,
    /// Full item list replacing the stored one.
    items: &'a [DecorItem],
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Blocking HTTP implementation of the layout gateway contract.
///
/// # Invariants
/// - Loads fail with [`GatewayError::Timeout`] after the configured window.
/// - Saves carry no client-side timeout; an in-flight save is never
///   abandoned by this gateway.
/// - Redirects are never followed.
pub struct HttpLayoutGateway {
    /// Client used for loads, carrying the hard timeout.
    load_client: Client,
    /// Client used for saves, carrying no timeout.
    save_client: Client,
    /// Service base URL.
    base_url: String,
    /// Load timeout in seconds, echoed in timeout errors.
    load_timeout_secs: u64,
}

impl HttpLayoutGateway {
    /// Builds a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for an invalid configuration and
    /// [`GatewayError::Transport`] when client construction fails.
    pub fn new(config: &HttpLayoutGatewayConfig) -> Result<Self, GatewayError> {
        if config.base_url.is_empty() {
            return Err(GatewayError::Validation("base_url must not be empty".to_string()));
        }
        if config.load_timeout_secs == 0 {
            return Err(GatewayError::Validation(
                "load_timeout_secs must be greater than zero".to_string(),
            ));
        }
        let load_client = Client::builder()
            .timeout(Duration::from_secs(config.load_timeout_secs))
            .redirect(Policy::none())
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let save_client = Client::builder()
            .timeout(None::<Duration>)
            .redirect(Policy::none())
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self {
            load_client,
            save_client,
            base_url: config.base_url.clone(),
            load_timeout_secs: config.load_timeout_secs,
        })
    }

    /// Returns the layout endpoint URL.
    fn layout_url(&self) -> String {
        format!("{}/layout", self.base_url)
    }

    /// Maps a transport-level request failure onto the gateway taxonomy.
    fn request_error(&self, err: &reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.load_timeout_secs)
        } else {
            GatewayError::Transport(err.to_string())
        }
    }

    /// Converts a service response into a layout or a classified error.
    fn decode_response(response: Response) -> Result<Layout, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let envelope: Option<Envelope> = serde_json::from_str(&body).ok();
        if status.is_success() {
            return envelope
                .and_then(|envelope| envelope.data)
                .ok_or_else(|| GatewayError::Transport("response carried no layout".to_string()));
        }
        let message = envelope
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| format!("service returned status {status}"));
        Err(classify_failure(status, message))
    }
}

/// Maps an error status and message onto the gateway error taxonomy.
fn classify_failure(status: StatusCode, message: String) -> GatewayError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => {
            GatewayError::Validation(message)
        }
        _ if message == MIGRATION_REQUIRED_MESSAGE => GatewayError::StorageUnavailable(message),
        _ => GatewayError::Transport(format!("status {status}: {message}")),
    }
}

impl LayoutGateway for HttpLayoutGateway {
    fn load(&self, warehouse_id: &WarehouseId) -> Result<Layout, GatewayError> {
        let response = self
            .load_client
            .get(self.layout_url())
            .query(&[("warehouse", warehouse_id.as_str())])
            .send()
            .map_err(|err| self.request_error(&err))?;
        Self::decode_response(response)
    }

    fn save(&self, warehouse_id: &WarehouseId, items: &[DecorItem]) -> Result<Layout, GatewayError> {
        let request = SaveRequest {
            warehouse_id: warehouse_id.as_str(),
            items,
        };
        let response = self
            .save_client
            .post(self.layout_url())
            .json(&request)
            .send()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Self::decode_response(response)
    }
}
