//! Configuration validation.
//!
//! Serde handles syntax; these checks are semantic. Every failure is
//! reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid rpc_bind_address {0:?}")]
    BindAddress(String),

    #[error("invalid endorser host {0:?}, expected host:port")]
    EndorserHost(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

pub fn validate_serv_config(config: &ServConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc_bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.rpc_bind_address.clone()));
    }

    for host in &config.endorser_hosts {
        if !is_host_port(host) {
            errors.push(ValidationError::EndorserHost(host.clone()));
        }
    }

    if config.dial_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("dial_timeout_ms"));
    }
    if config.peer_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("peer_timeout_ms"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a numeric port.
pub fn is_host_port(s: &str) -> bool {
    match s.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_serv_config(&ServConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let config = ServConfig {
            rpc_bind_address: "nowhere".into(),
            endorser_hosts: vec!["10.0.0.1:37101".into(), "".into(), "peer:http".into()],
            dial_timeout_ms: 0,
            peer_timeout_ms: 0,
            ..Default::default()
        };
        let errors = validate_serv_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("nowhere".into()),
                ValidationError::EndorserHost("".into()),
                ValidationError::EndorserHost("peer:http".into()),
                ValidationError::ZeroTimeout("dial_timeout_ms"),
                ValidationError::ZeroTimeout("peer_timeout_ms"),
            ]
        );
    }

    #[test]
    fn host_port_forms() {
        assert!(is_host_port("endorser.local:8080"));
        assert!(is_host_port("[::1]:8080"));
        assert!(!is_host_port("endorser.local"));
        assert!(!is_host_port(":8080"));
    }
}
