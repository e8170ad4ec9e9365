//! Node engine collaborator.
//!
//! The engine's consensus and storage live elsewhere; this module exposes only
//! what the gateway needs from it: a long-running `start` that returns once
//! exit is requested, and a request dispatcher for the endorser service.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::error::GatewayError;
use crate::lifecycle::orchestrator::Subsystem;
use crate::lifecycle::shutdown::ExitLatch;
use crate::rpc::envelope::{CODE_CONNECT_REFUSE, CODE_PARAM_ERROR, CODE_SERVICE_REFUSED};

/// Engine-side failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("request name is empty")]
    EmptyRequestName,

    #[error("unsupported request: {0}")]
    UnsupportedRequest(String),

    #[error("engine stopped")]
    Stopped,
}

impl EngineError {
    /// Internal error code for status mapping.
    pub fn code(&self) -> u32 {
        match self {
            EngineError::EmptyRequestName => CODE_PARAM_ERROR,
            EngineError::UnsupportedRequest(_) => CODE_SERVICE_REFUSED,
            EngineError::Stopped => CODE_CONNECT_REFUSE,
        }
    }
}

/// The blockchain engine as seen by the gateway.
#[derive(Debug)]
pub struct NodeEngine {
    name: String,
    exit: ExitLatch,
    served: AtomicU64,
}

impl NodeEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exit: ExitLatch::new(),
            served: AtomicU64::new(0),
        }
    }

    /// Dispatch an endorsement request to the engine.
    pub fn handle_endorsement(
        &self,
        request_name: &str,
        data: &[u8],
    ) -> Result<Vec<u8>, EngineError> {
        if self.exit.is_requested() {
            return Err(EngineError::Stopped);
        }
        let out = match request_name {
            "" => return Err(EngineError::EmptyRequestName),
            "Echo" => data.to_vec(),
            other => return Err(EngineError::UnsupportedRequest(other.to_string())),
        };
        self.served.fetch_add(1, Ordering::Relaxed);
        Ok(out)
    }

    /// Number of requests served successfully.
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }
}

impl Subsystem for NodeEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), GatewayError> {
        tracing::info!(engine = %self.name, "engine started");
        self.exit.wait().await;
        tracing::info!(engine = %self.name, served = self.served(), "engine exited");
        Ok(())
    }

    fn request_exit(&self) {
        tracing::debug!(engine = %self.name, "engine exit requested");
        self.exit.request();
    }
}
