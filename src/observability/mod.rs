//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! interceptor / cache / orchestrator
//!     → tracing events (correlation id carried on the per-call `rpc` span)
//!     → logging.rs subscriber (stdout, text or JSON)
//! ```

pub mod logging;

pub use logging::init_logging;
