//! HTTP client for a single endorser peer.

use std::time::Duration;

use crate::config::validation::is_host_port;
use crate::endorser::cache::Dialer;
use crate::endorser::messages::{EndorserRequest, EndorserResponse, ENDORSER_CALL_PATH};
use crate::error::GatewayError;
use crate::rpc::envelope::{CODE_CONNECT_REFUSE, CODE_TIMEOUT};

/// Connection handle to one endorser peer, over plain HTTP.
#[derive(Debug, Clone)]
pub struct EndorserClient {
    host: String,
    base_url: String,
    client: reqwest::Client,
}

impl EndorserClient {
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Forward an endorser call to the peer.
    pub async fn endorser_call(
        &self,
        req: &EndorserRequest,
    ) -> Result<EndorserResponse, GatewayError> {
        let url = format!("{}{}", self.base_url, ENDORSER_CALL_PATH);
        let res = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        // Transport errors from the peer still carry a JSON body with an envelope.
        res.json::<EndorserResponse>()
            .await
            .map_err(|e| self.request_error(e))
    }

    fn request_error(&self, e: reqwest::Error) -> GatewayError {
        let code = if e.is_timeout() {
            CODE_TIMEOUT
        } else {
            CODE_CONNECT_REFUSE
        };
        tracing::warn!(host = %self.host, error = %e, "endorser request failed");
        GatewayError::handler(code, format!("endorser {}: {}", self.host, e))
    }
}

/// Dials endorser peers with a dedicated HTTP client per host.
///
/// `connect_timeout` bounds connection setup; `call_timeout` bounds a whole
/// outbound call, response body included.
#[derive(Debug, Clone)]
pub struct HttpDialer {
    connect_timeout: Duration,
    call_timeout: Duration,
}

impl HttpDialer {
    pub fn new(connect_timeout: Duration, call_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            call_timeout,
        }
    }
}

impl Dialer for HttpDialer {
    type Connection = EndorserClient;

    async fn dial(&self, host: &str) -> Result<EndorserClient, GatewayError> {
        let dial_err = |reason: String| GatewayError::Dial {
            host: host.to_string(),
            reason,
        };
        if !is_host_port(host) {
            return Err(dial_err("expected host:port".into()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.call_timeout)
            .no_proxy()
            .build()
            .map_err(|e| dial_err(e.to_string()))?;
        Ok(EndorserClient {
            host: host.to_string(),
            base_url: format!("http://{host}"),
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialer() -> HttpDialer {
        HttpDialer::new(Duration::from_secs(1), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn dial_rejects_malformed_host() {
        let dialer = dialer();
        assert!(matches!(
            dialer.dial("no-port").await,
            Err(GatewayError::Dial { .. })
        ));
        let client = dialer.dial("127.0.0.1:1").await.unwrap();
        assert_eq!(client.host(), "127.0.0.1:1");
    }

    #[tokio::test]
    async fn unreachable_peer_maps_to_connect_refuse() {
        let client = dialer().dial("127.0.0.1:1").await.unwrap();
        let err = client.endorser_call(&EndorserRequest::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Handler { code: CODE_CONNECT_REFUSE, .. }));
    }

    #[tokio::test]
    async fn silent_peer_maps_to_timeout() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let held = tokio::spawn(async move {
            let mut conns = Vec::new();
            while let Ok((conn, _)) = listener.accept().await {
                conns.push(conn);
            }
        });

        let dialer = HttpDialer::new(Duration::from_secs(1), Duration::from_millis(150));
        let client = dialer.dial(&addr.to_string()).await.unwrap();
        let err = client.endorser_call(&EndorserRequest::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Handler { code: CODE_TIMEOUT, .. }));
        held.abort();
    }
}
