//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Build engine + service → orchestrator
//!
//! Supervision (orchestrator.rs):
//!     engine done  → service exit
//!     service done → engine exit
//!     signal       → both exit
//!     wait for both completions
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGQUIT → Termination event
//! ```

pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use orchestrator::{LifecycleState, Orchestrator, ShutdownReport, ShutdownTrigger, Subsystem};
pub use shutdown::ExitLatch;
pub use signals::Termination;
