//! RPC service manager.
//!
//! # Data Flow
//! ```text
//! TCP listener (axum)
//!     → routes.rs (one route per RPC method)
//!     → rpc::interceptor (envelope, context, logging, fault containment)
//!     → endorser::service (peer forward or engine)
//! ```
//!
//! # Design Decisions
//! - Each inbound call runs as its own task; the connection cache is the only
//!   shared mutable state between calls
//! - Serving stops gracefully once exit is requested

pub mod routes;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::ServConfig;
use crate::endorser::{ConnectionCache, EndorserService, HttpDialer};
use crate::engine::NodeEngine;
use crate::error::GatewayError;
use crate::lifecycle::orchestrator::Subsystem;
use crate::lifecycle::shutdown::ExitLatch;
use crate::rpc::interceptor::RequestInterceptor;

use routes::{build_router, AppState};

/// Owns the RPC server and its lifetime.
pub struct ServiceManager {
    config: Arc<ServConfig>,
    state: AppState,
    exit: ExitLatch,
    listener: Mutex<Option<TcpListener>>,
}

impl ServiceManager {
    pub fn new(config: Arc<ServConfig>, node_id: &str, engine: Arc<NodeEngine>) -> Self {
        let dialer = HttpDialer::new(
            Duration::from_millis(config.dial_timeout_ms),
            Duration::from_millis(config.peer_timeout_ms),
        );
        let cache = ConnectionCache::new(config.endorser_hosts.clone(), dialer);
        let state = AppState {
            interceptor: Arc::new(RequestInterceptor::new(node_id)),
            endorser: Arc::new(EndorserService::new(node_id, engine, cache)),
        };
        Self {
            config,
            state,
            exit: ExitLatch::new(),
            listener: Mutex::new(None),
        }
    }

    /// Serve on an already-bound listener instead of `rpc_bind_address`.
    pub fn with_listener(self, listener: TcpListener) -> Self {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
        self
    }

    pub fn endorser(&self) -> &EndorserService {
        &self.state.endorser
    }

    async fn take_listener(&self) -> Result<TcpListener, GatewayError> {
        let prebound = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take();
        match prebound {
            Some(listener) => Ok(listener),
            None => TcpListener::bind(&self.config.rpc_bind_address)
                .await
                .map_err(|e| self.failure(format!("bind {}: {e}", self.config.rpc_bind_address))),
        }
    }

    fn failure(&self, reason: String) -> GatewayError {
        GatewayError::Subsystem {
            name: self.name().to_string(),
            reason,
        }
    }
}

impl Subsystem for ServiceManager {
    fn name(&self) -> &str {
        "service"
    }

    async fn start(&self) -> Result<(), GatewayError> {
        let listener = self.take_listener().await?;
        let addr = listener.local_addr().map_err(|e| self.failure(e.to_string()))?;
        tracing::info!(
            address = %addr,
            endorser_hosts = ?self.config.endorser_hosts,
            "rpc service starting"
        );

        let app = build_router(self.state.clone(), self.config.enable_endorser)
            .into_make_service_with_connect_info::<SocketAddr>();

        let exit = self.exit.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { exit.wait().await })
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        tracing::info!("rpc service stopped");
        Ok(())
    }

    fn request_exit(&self) {
        tracing::debug!("rpc service exit requested");
        self.exit.request();
    }
}
