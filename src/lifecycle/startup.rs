//! Node startup.
//!
//! Load config → init logging → build engine and service → supervise both
//! until they have exited.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{load_config, ConfigError};
use crate::engine::NodeEngine;
use crate::lifecycle::orchestrator::{Orchestrator, ShutdownReport};
use crate::lifecycle::signals;
use crate::observability::init_logging;
use crate::service::ServiceManager;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("install signal handlers: {0}")]
    Signals(#[from] std::io::Error),
}

/// Start the node and block until both the engine and the service exit.
pub async fn startup(env_conf_path: &Path) -> Result<ShutdownReport, StartupError> {
    let (env, serv) = load_config(env_conf_path)?;

    init_logging(&env.log_level, env.log_format);

    let node_id = env.node_id();
    tracing::info!(
        node_id = %node_id,
        root_path = %env.root().display(),
        rpc_bind_address = %serv.rpc_bind_address,
        "configuration loaded"
    );

    let engine = Arc::new(NodeEngine::new(format!("{node_id}-engine")));
    let service = Arc::new(ServiceManager::new(Arc::new(serv), &node_id, engine.clone()));

    let signals = signals::listen()?;
    let report = Orchestrator::new(engine, service).run(signals).await;

    tracing::info!(trigger = ?report.trigger, "shutdown complete");
    Ok(report)
}
