//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::schema::{EnvConfig, ServConfig};
use crate::config::validation::{validate_serv_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the environment config. `root_path` defaults to the file's directory.
pub fn load_env_config(path: &Path) -> Result<EnvConfig, ConfigError> {
    let mut config: EnvConfig = read_toml(path)?;
    if config.root_path.is_none() {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        config.root_path = Some(dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf));
    }
    Ok(config)
}

/// Load and validate a service config.
pub fn load_serv_config(path: &Path) -> Result<ServConfig, ConfigError> {
    let config: ServConfig = read_toml(path)?;
    validate_serv_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the environment config and the service config it references.
pub fn load_config(env_path: &Path) -> Result<(EnvConfig, ServConfig), ConfigError> {
    let env = load_env_config(env_path)?;
    let serv = load_serv_config(&env.conf_file_path(&env.serv_conf))?;
    Ok((env, serv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gateway-conf-{}", Uuid::new_v4().simple()));
        fs::create_dir_all(dir.join("conf")).unwrap();
        dir
    }

    #[test]
    fn loads_both_files() {
        let dir = scratch_dir();
        fs::write(dir.join("env.toml"), "log_level = \"debug\"\nnode_name = \"node-a\"\n").unwrap();
        fs::write(
            dir.join("conf").join("server.toml"),
            "rpc_bind_address = \"127.0.0.1:40001\"\nendorser_hosts = [\"10.0.0.2:37101\"]\n",
        )
        .unwrap();

        let (env, serv) = load_config(&dir.join("env.toml")).unwrap();
        assert_eq!(env.log_level, "debug");
        assert_eq!(env.root_path.as_deref(), Some(dir.as_path()));
        assert_eq!(env.node_id(), "node-a");
        assert_eq!(serv.rpc_bind_address, "127.0.0.1:40001");
        assert_eq!(serv.endorser_hosts, vec!["10.0.0.2:37101".to_string()]);
        assert!(serv.enable_endorser);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn invalid_service_config_is_rejected() {
        let dir = scratch_dir();
        fs::write(dir.join("env.toml"), "").unwrap();
        fs::write(dir.join("conf").join("server.toml"), "endorser_hosts = [\"nope\"]\n").unwrap();

        let err = load_config(&dir.join("env.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_env_config(Path::new("/definitely/not/here/env.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
