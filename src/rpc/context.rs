//! Per-call request context.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::error::GatewayError;

/// Transport metadata about the remote end of a call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Peer {
    pub addr: Option<SocketAddr>,
}

impl Peer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr: Some(addr) }
    }
}

/// Derive the caller's address (host part only) from peer metadata.
pub fn client_address(peer: Option<&Peer>) -> Result<String, GatewayError> {
    let peer = peer.ok_or_else(|| {
        GatewayError::ContextCreation("peer metadata missing from call".into())
    })?;
    let addr = peer
        .addr
        .ok_or_else(|| GatewayError::ContextCreation("peer address is empty".into()))?;
    Ok(addr.ip().to_string())
}

/// Elapsed-time timer started when the context is created.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl std::fmt::Display for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}ms", self.elapsed().as_secs_f64() * 1000.0)
    }
}

/// State derived for a single inbound call.
///
/// Owned by that call's execution and dropped when the call returns.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client_address: String,
    pub correlation_id: String,
    span: tracing::Span,
    timer: Timer,
}

impl RequestContext {
    pub fn new(client_address: String, correlation_id: String) -> Self {
        let span = tracing::info_span!(
            "rpc",
            correlation_id = %correlation_id,
            client_address = %client_address
        );
        Self {
            client_address,
            correlation_id,
            span,
            timer: Timer::start(),
        }
    }

    /// Build a context from transport metadata.
    pub fn from_peer(peer: Option<&Peer>, correlation_id: &str) -> Result<Self, GatewayError> {
        let client_address = client_address(peer)?;
        Ok(Self::new(client_address, correlation_id.to_string()))
    }

    /// Logger handle for this call.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_host_only() {
        let peer = Peer::new("10.1.2.3:52000".parse().unwrap());
        assert_eq!(client_address(Some(&peer)).unwrap(), "10.1.2.3");
    }

    #[test]
    fn missing_peer_fails() {
        assert!(matches!(
            client_address(None),
            Err(GatewayError::ContextCreation(_))
        ));
        assert!(matches!(
            client_address(Some(&Peer::default())),
            Err(GatewayError::ContextCreation(_))
        ));
    }

    #[test]
    fn context_keeps_correlation_id() {
        let peer = Peer::new("[::1]:9000".parse().unwrap());
        let ctx = RequestContext::from_peer(Some(&peer), "cid-1").unwrap();
        assert_eq!(ctx.correlation_id, "cid-1");
        assert_eq!(ctx.client_address, "::1");
    }
}
