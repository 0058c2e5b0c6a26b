// crates/decor-layout-client/src/lib.rs
// ============================================================================
// Module: Decor Layout Client Crate
// Description: HTTP gateway implementation for the layout service.
// Purpose: Drive the layout persistence protocol on behalf of edit sessions.
// Dependencies: decor-layout-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Blocking HTTP implementation of the layout gateway contract. Loads run
//! under a hard timeout so a stalled service cannot wedge session startup;
//! saves deliberately run without one, since an accepted save must run to
//! completion or failure rather than be abandoned midway.

pub mod gateway;

pub use gateway::DEFAULT_LOAD_TIMEOUT_SECS;
pub use gateway::HttpLayoutGateway;
pub use gateway::HttpLayoutGatewayConfig;
