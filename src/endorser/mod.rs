//! Endorser subsystem.
//!
//! # Data Flow
//! ```text
//! EndorserCall (through the interceptor)
//!     → service.rs
//!         peers configured: cache.rs (select_host, get_connection)
//!                           → client.rs (HTTP forward to the peer)
//!         no peers:         engine.handle_endorsement
//! ```

pub mod cache;
pub mod client;
pub mod messages;
pub mod service;

pub use cache::{ConnectionCache, Dialer};
pub use client::{EndorserClient, HttpDialer};
pub use service::EndorserService;
