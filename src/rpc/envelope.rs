//! Message envelope and status mapping.
//!
//! # Responsibilities
//! - Define the envelope carried by every request and response
//! - Generate correlation ids
//! - Map gateway errors to internal status descriptors, and descriptors to
//!   wire status codes
//!
//! # Design Decisions
//! - Message types opt in through [`HasEnvelope`] instead of runtime field
//!   inspection; [`impl_has_envelope!`] covers the common `header` field
//! - The wire registry is a fixed table; anything outside it is `UnknownError`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GatewayError;

/// Wire status codes carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Success,
    #[default]
    UnknownError,
    InternalError,
    InvalidRequest,
    NotFound,
    ConnectRefuse,
    ServiceRefused,
    Timeout,
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusCode::Success => "SUCCESS",
            StatusCode::UnknownError => "UNKNOWN_ERROR",
            StatusCode::InternalError => "INTERNAL_ERROR",
            StatusCode::InvalidRequest => "INVALID_REQUEST",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::ConnectRefuse => "CONNECT_REFUSE",
            StatusCode::ServiceRefused => "SERVICE_REFUSED",
            StatusCode::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}

/// Correlation id, origin id and status attached to every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Envelope {
    pub correlation_id: String,
    pub origin_id: String,
    pub status: StatusCode,
}

impl Envelope {
    /// Envelope synthesized for a request that arrived without one.
    pub fn default_request() -> Self {
        Self {
            correlation_id: gen_correlation_id(),
            origin_id: String::new(),
            status: StatusCode::UnknownError,
        }
    }
}

/// Generate a fresh correlation id.
pub fn gen_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A message that carries an optional, settable envelope.
pub trait HasEnvelope {
    fn envelope(&self) -> Option<&Envelope>;
    fn envelope_mut(&mut self) -> &mut Option<Envelope>;
}

/// Implement [`HasEnvelope`] for structs holding `header: Option<Envelope>`.
#[macro_export]
macro_rules! impl_has_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::rpc::envelope::HasEnvelope for $ty {
                fn envelope(&self) -> Option<&$crate::rpc::envelope::Envelope> {
                    self.header.as_ref()
                }

                fn envelope_mut(&mut self) -> &mut Option<$crate::rpc::envelope::Envelope> {
                    &mut self.header
                }
            }
        )+
    };
}

/// Make sure a request carries an envelope with a correlation id.
///
/// A missing envelope is synthesized; an empty correlation id is filled in
/// place without touching the other fields. Returns a copy of the envelope.
pub fn inject_request_envelope<M: HasEnvelope>(req: &mut M) -> Envelope {
    let envelope = req.envelope_mut().get_or_insert_with(Envelope::default_request);
    if envelope.correlation_id.is_empty() {
        envelope.correlation_id = gen_correlation_id();
    }
    envelope.clone()
}

/// Attach `envelope` to a response unless it already carries one.
pub fn attach_response_envelope<M: HasEnvelope>(resp: &mut M, envelope: Envelope) {
    let slot = resp.envelope_mut();
    if slot.is_none() {
        *slot = Some(envelope);
    }
}

/// Internal status descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdError {
    pub status: u16,
    pub code: u32,
    pub msg: String,
}

pub const CODE_SUCCESS: u32 = 0;
pub const CODE_PARAM_ERROR: u32 = 40000;
pub const CODE_NOT_FOUND: u32 = 40400;
pub const CODE_INTERNAL: u32 = 50000;
pub const CODE_UNKNOWN: u32 = 50001;
pub const CODE_CONNECT_REFUSE: u32 = 50200;
pub const CODE_SERVICE_REFUSED: u32 = 50300;
pub const CODE_TIMEOUT: u32 = 50400;

impl StdError {
    fn new(status: u16, code: u32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn success() -> Self {
        Self::new(200, CODE_SUCCESS, "success")
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(500, CODE_INTERNAL, msg)
    }

    /// Map a handler outcome to a descriptor. `None` means success.
    pub fn from_outcome(err: Option<&GatewayError>) -> Self {
        match err {
            None => Self::success(),
            Some(e) => Self::cast(e),
        }
    }

    /// Map a gateway error to a descriptor.
    pub fn cast(err: &GatewayError) -> Self {
        match err {
            GatewayError::ContextCreation(_) => Self::internal(err.to_string()),
            GatewayError::EmptyHost => Self::new(503, CODE_SERVICE_REFUSED, err.to_string()),
            GatewayError::Dial { .. } => Self::new(502, CODE_CONNECT_REFUSE, err.to_string()),
            GatewayError::Handler { code, msg } => {
                let status = u16::try_from(code / 100).unwrap_or(500);
                Self::new(status, *code, msg.clone())
            }
            GatewayError::UnknownStatus(msg) => Self::new(500, CODE_UNKNOWN, msg.clone()),
            GatewayError::ContainedFault(_) => Self::internal(err.to_string()),
            GatewayError::Engine(e) => {
                let code = e.code();
                let status = u16::try_from(code / 100).unwrap_or(500);
                Self::new(status, code, e.to_string())
            }
            GatewayError::Subsystem { .. } => Self::internal(err.to_string()),
        }
    }

    /// Wire status for this descriptor; unregistered codes are `UnknownError`.
    pub fn wire_status(&self) -> StatusCode {
        registered_status(self.code).unwrap_or(StatusCode::UnknownError)
    }
}

/// Registry of internal error codes with a designated wire code.
pub fn registered_status(code: u32) -> Option<StatusCode> {
    let status = match code {
        CODE_SUCCESS => StatusCode::Success,
        CODE_PARAM_ERROR => StatusCode::InvalidRequest,
        CODE_NOT_FOUND => StatusCode::NotFound,
        CODE_INTERNAL => StatusCode::InternalError,
        CODE_UNKNOWN => StatusCode::UnknownError,
        CODE_CONNECT_REFUSE => StatusCode::ConnectRefuse,
        CODE_SERVICE_REFUSED => StatusCode::ServiceRefused,
        CODE_TIMEOUT => StatusCode::Timeout,
        _ => return None,
    };
    Some(status)
}
