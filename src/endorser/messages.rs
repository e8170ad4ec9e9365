//! Endorser RPC messages.

use serde::{Deserialize, Serialize};

use crate::impl_has_envelope;
use crate::rpc::envelope::Envelope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndorserRequest {
    pub header: Option<Envelope>,
    pub request_name: String,
    pub request_data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndorserResponse {
    pub header: Option<Envelope>,
    pub endorser_address: String,
    pub response_name: String,
    pub response_data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingRequest {
    pub header: Option<Envelope>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingResponse {
    pub header: Option<Envelope>,
    pub node_name: String,
}

impl_has_envelope!(EndorserRequest, EndorserResponse, PingRequest, PingResponse);

/// RPC paths served by the endorser surface.
pub const ENDORSER_CALL_PATH: &str = "/v1/EndorserCall";
pub const PING_PATH: &str = "/v1/Ping";
