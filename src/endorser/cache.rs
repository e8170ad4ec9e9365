//! Outbound connection cache for endorser peers.
//!
//! # Responsibilities
//! - Pick a peer host uniformly at random
//! - Establish at most one connection per host and share it
//!
//! # Design Decisions
//! - Lock-free reads from a concurrent map; a mutex guards only the
//!   dial-and-insert path, re-checking the map before dialing
//! - Failed dials are not cached, so a later call may retry
//! - Entries are never evicted; connections live as long as the process
//! - One random source, seeded once when the cache is built

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::GatewayError;

/// Establishes outbound connections to a `host:port`.
pub trait Dialer: Send + Sync + 'static {
    type Connection: Clone + Send + Sync + 'static;

    fn dial(
        &self,
        host: &str,
    ) -> impl Future<Output = Result<Self::Connection, GatewayError>> + Send;
}

/// Memoized connections to a static set of peer hosts.
pub struct ConnectionCache<D: Dialer> {
    hosts: Vec<String>,
    dialer: D,
    clients: DashMap<String, D::Connection>,
    dial_lock: tokio::sync::Mutex<()>,
    rng: Mutex<StdRng>,
}

impl<D: Dialer> ConnectionCache<D> {
    pub fn new(hosts: Vec<String>, dialer: D) -> Self {
        Self::with_rng(hosts, dialer, StdRng::from_entropy())
    }

    /// Build with a caller-provided random source.
    pub fn with_rng(hosts: Vec<String>, dialer: D, rng: StdRng) -> Self {
        Self {
            hosts,
            dialer,
            clients: DashMap::new(),
            dial_lock: tokio::sync::Mutex::new(()),
            rng: Mutex::new(rng),
        }
    }

    /// Pick a configured host uniformly at random.
    pub fn select_host(&self) -> Option<String> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.hosts.choose(&mut *rng).cloned()
    }

    /// Return the connection for `host`, dialing it on first use.
    pub async fn get_connection(&self, host: &str) -> Result<D::Connection, GatewayError> {
        if host.is_empty() {
            return Err(GatewayError::EmptyHost);
        }
        if let Some(conn) = self.clients.get(host) {
            return Ok(conn.value().clone());
        }

        let _guard = self.dial_lock.lock().await;
        if let Some(conn) = self.clients.get(host) {
            return Ok(conn.value().clone());
        }

        let conn = self.dialer.dial(host).await.map_err(|e| {
            tracing::warn!(host, error = %e, "dial endorser failed");
            e
        })?;
        self.clients.insert(host.to_string(), conn.clone());
        tracing::info!(host, "endorser connection established");
        Ok(conn)
    }

    /// Number of cached connections.
    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }
}
