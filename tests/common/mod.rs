//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use endorser_gateway::config::ServConfig;
use endorser_gateway::endorser::Dialer;
use endorser_gateway::engine::NodeEngine;
use endorser_gateway::lifecycle::{ExitLatch, Subsystem};
use endorser_gateway::service::ServiceManager;
use endorser_gateway::GatewayError;
use tokio::net::TcpListener;

/// A subsystem that runs until asked to exit or told to finish on its own.
pub struct MockSubsystem {
    name: String,
    exit: ExitLatch,
    finish: ExitLatch,
    stop_delay: Duration,
    fail: bool,
    completed: AtomicBool,
}

#[allow(dead_code)]
impl MockSubsystem {
    pub fn new(name: &str) -> Arc<Self> {
        Self::build(name, Duration::ZERO, false)
    }

    /// Takes `stop_delay` to wind down after an exit request.
    pub fn slow(name: &str, stop_delay: Duration) -> Arc<Self> {
        Self::build(name, stop_delay, false)
    }

    /// Returns an error from `start` when it completes.
    pub fn failing(name: &str) -> Arc<Self> {
        Self::build(name, Duration::ZERO, true)
    }

    fn build(name: &str, stop_delay: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            exit: ExitLatch::new(),
            finish: ExitLatch::new(),
            stop_delay,
            fail,
            completed: AtomicBool::new(false),
        })
    }

    /// Complete without an exit request.
    pub fn finish(&self) {
        self.finish.request();
    }

    pub fn exit_requests(&self) -> usize {
        self.exit.request_count()
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Subsystem for MockSubsystem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), GatewayError> {
        tokio::select! {
            _ = self.exit.wait() => tokio::time::sleep(self.stop_delay).await,
            _ = self.finish.wait() => {}
        }
        self.completed.store(true, Ordering::SeqCst);
        if self.fail {
            return Err(GatewayError::Subsystem {
                name: self.name.clone(),
                reason: "mock failure".into(),
            });
        }
        Ok(())
    }

    fn request_exit(&self) {
        self.exit.request();
    }
}

/// Dialer that counts connection-establishment operations.
#[derive(Clone, Default)]
pub struct CountingDialer {
    pub dials: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingDialer {
    pub fn count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

impl Dialer for CountingDialer {
    type Connection = Arc<String>;

    async fn dial(&self, host: &str) -> Result<Arc<String>, GatewayError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        // Widen the race window for concurrent first access.
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(Arc::new(host.to_string()))
    }
}

/// A running RPC service bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestNode {
    pub addr: SocketAddr,
    pub service: Arc<ServiceManager>,
    pub engine: Arc<NodeEngine>,
    pub task: tokio::task::JoinHandle<Result<(), GatewayError>>,
}

#[allow(dead_code)]
impl TestNode {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.service.request_exit();
        let res = tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("service should stop")
            .expect("service task panicked");
        assert!(res.is_ok());
    }
}

/// Start a service node on `127.0.0.1:0`.
#[allow(dead_code)]
pub async fn start_node(node_id: &str, endorser_hosts: Vec<String>) -> TestNode {
    let config = ServConfig {
        endorser_hosts,
        ..Default::default()
    };
    start_node_with(node_id, config).await
}

/// Start a service node on `127.0.0.1:0` with a custom service config.
#[allow(dead_code)]
pub async fn start_node_with(node_id: &str, mut config: ServConfig) -> TestNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.rpc_bind_address = addr.to_string();
    let engine = Arc::new(NodeEngine::new(format!("{node_id}-engine")));
    let service = Arc::new(
        ServiceManager::new(Arc::new(config), node_id, engine.clone()).with_listener(listener),
    );

    let runner = service.clone();
    let task = tokio::spawn(async move { runner.start().await });
    TestNode {
        addr,
        service,
        engine,
        task,
    }
}

/// A peer that accepts connections and never writes a byte back.
#[allow(dead_code)]
pub async fn silent_peer() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((conn, _)) = listener.accept().await {
            held.push(conn);
        }
    });
    (addr, task)
}

#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
