//! Error taxonomy for the gateway.
//!
//! Transport and context errors travel back to the caller as a transport-level
//! error *and* show up in the response envelope. Handler errors never fail the
//! transport: they are folded into the envelope status.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors raised by the gateway core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The transport did not expose a usable peer address.
    #[error("create request context failed: {0}")]
    ContextCreation(String),

    /// No endorser host was given.
    #[error("empty host")]
    EmptyHost,

    /// Establishing an outbound connection failed.
    #[error("dial {host} failed: {reason}")]
    Dial { host: String, reason: String },

    /// Business logic failure carrying an internal error code.
    #[error("handler error {code}: {msg}")]
    Handler { code: u32, msg: String },

    /// A handler error kind that has no registered wire mapping.
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    /// A panic inside a handler, caught at the per-call boundary.
    #[error("contained fault: {0}")]
    ContainedFault(String),

    /// The engine rejected or could not serve the call.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A subsystem failed while starting or serving.
    #[error("subsystem {name} failed: {reason}")]
    Subsystem { name: String, reason: String },
}

impl GatewayError {
    /// Shorthand for a business-logic error with an internal code.
    pub fn handler(code: u32, msg: impl Into<String>) -> Self {
        GatewayError::Handler {
            code,
            msg: msg.into(),
        }
    }

    /// True for errors that originate below the handler (peer, context).
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::ContextCreation(_))
    }
}
