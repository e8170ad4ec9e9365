//! Configuration schema definitions.
//!
//! Two files make up a node's configuration: the environment config passed on
//! the command line, and the service config it points to.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment configuration (`--conf`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Node root directory. Defaults to the directory holding the env file.
    pub root_path: Option<PathBuf>,

    /// Config directory, relative to `root_path`.
    pub conf_dir: String,

    /// Service config file name, inside `conf_dir`.
    pub serv_conf: String,

    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Identifier placed in `origin_id` of responses.
    pub node_name: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            conf_dir: "conf".to_string(),
            serv_conf: "server.toml".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            node_name: None,
        }
    }
}

impl EnvConfig {
    /// Root directory, `.` if none was resolved.
    pub fn root(&self) -> &Path {
        self.root_path.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Resolve a config file name against `root_path/conf_dir`.
    pub fn conf_file_path(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.root().join(&self.conf_dir).join(path)
    }

    /// Node identifier: configured name, else hostname, else a placeholder.
    pub fn node_id(&self) -> String {
        self.node_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| "unknown-node".to_string())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServConfig {
    /// RPC listener bind address.
    pub rpc_bind_address: String,

    /// Serve the endorser RPC surface.
    pub enable_endorser: bool,

    /// Peer endorser hosts (`host:port`). Empty means serve locally.
    pub endorser_hosts: Vec<String>,

    /// Connection setup timeout to endorser peers, in milliseconds.
    pub dial_timeout_ms: u64,

    /// Bound on a whole outbound call to an endorser peer, in milliseconds.
    /// Expiry is reported to the caller as a `TIMEOUT` envelope status.
    pub peer_timeout_ms: u64,
}

impl Default for ServConfig {
    fn default() -> Self {
        Self {
            rpc_bind_address: "127.0.0.1:37101".to_string(),
            enable_endorser: true,
            endorser_hosts: Vec::new(),
            dial_timeout_ms: 3000,
            peer_timeout_ms: 10_000,
        }
    }
}
