//! RPC envelope handling.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → interceptor.rs: envelope.rs (inject) → context.rs (peer, timer)
//!     → access log → handler (panic boundary)
//!     → envelope.rs (status mapping, finalize) → completion log
//!     → Reply { response, error }
//! ```

pub mod context;
pub mod envelope;
pub mod interceptor;

pub use context::{Peer, RequestContext};
pub use envelope::{Envelope, HasEnvelope, StatusCode, StdError};
pub use interceptor::{Reply, RequestInterceptor};
