//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! env.toml (--conf)
//!     → loader.rs (parse, resolve root_path)
//!     → conf_dir/serv_conf
//!     → loader.rs (parse) → validation.rs (semantic checks)
//!     → (EnvConfig, ServConfig), immutable, shared via Arc
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{EnvConfig, LogFormat, ServConfig};
