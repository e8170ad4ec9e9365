//! Node RPC gateway: request interception, endorser connection caching, and
//! engine/service lifecycle supervision.

pub mod config;
pub mod endorser;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod rpc;
pub mod service;

pub use error::GatewayError;
pub use lifecycle::Orchestrator;
pub use rpc::RequestInterceptor;
