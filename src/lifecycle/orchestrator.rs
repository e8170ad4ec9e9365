//! Concurrent supervision of the engine and service subsystems.
//!
//! # Data Flow
//! ```text
//! engine.start()  ──done──┐
//! service.start() ──done──┼──▶ coordinator (select) ──▶ exit requests
//! OS signals ─────────────┘           │
//!                                     ▼
//!                         two-count completion barrier ──▶ return
//! ```
//!
//! # Design Decisions
//! - Engine done requests service exit; service done requests engine exit
//! - A termination signal requests exit on every subsystem still running
//! - `run` returns only after both subsystems have completed

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::error::GatewayError;
use crate::lifecycle::signals::Termination;

/// A long-running collaborator supervised by the orchestrator.
pub trait Subsystem: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Run until stopped.
    fn start(&self) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Ask the subsystem to stop. Idempotent and non-blocking.
    fn request_exit(&self);
}

/// Orchestrator states. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    StoppingBoth,
    Stopped,
}

/// The event that started the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    EngineExited,
    ServiceExited,
    Signal(Termination),
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct ShutdownReport {
    pub trigger: ShutdownTrigger,
    pub engine_exit_requests: usize,
    pub service_exit_requests: usize,
    pub engine_result: Result<(), GatewayError>,
    pub service_result: Result<(), GatewayError>,
}

/// Starts both subsystems and drives their mutual shutdown.
pub struct Orchestrator<E, S> {
    engine: Arc<E>,
    service: Arc<S>,
    state: LifecycleState,
    trigger: Option<ShutdownTrigger>,
    engine_exit_requests: usize,
    service_exit_requests: usize,
}

impl<E: Subsystem, S: Subsystem> Orchestrator<E, S> {
    pub fn new(engine: Arc<E>, service: Arc<S>) -> Self {
        Self {
            engine,
            service,
            state: LifecycleState::Running,
            trigger: None,
            engine_exit_requests: 0,
            service_exit_requests: 0,
        }
    }

    /// Launch both subsystems and block until both have completed.
    ///
    /// `signals` delivers external termination requests. A closed channel
    /// simply stops contributing events.
    pub async fn run(
        mut self,
        mut signals: mpsc::UnboundedReceiver<Termination>,
    ) -> ShutdownReport {
        let mut engine_task = spawn_subsystem(self.engine.clone());
        let mut service_task = spawn_subsystem(self.service.clone());

        let mut engine_result = None;
        let mut service_result = None;
        let mut signals_open = true;
        let mut remaining = 2usize;

        while remaining > 0 {
            tokio::select! {
                res = &mut engine_task, if engine_result.is_none() => {
                    remaining -= 1;
                    engine_result = Some(self.completed(self.engine.name().to_string(), res));
                    self.begin_stopping(ShutdownTrigger::EngineExited);
                    if service_result.is_none() {
                        self.request_service_exit();
                    }
                }
                res = &mut service_task, if service_result.is_none() => {
                    remaining -= 1;
                    service_result = Some(self.completed(self.service.name().to_string(), res));
                    self.begin_stopping(ShutdownTrigger::ServiceExited);
                    if engine_result.is_none() {
                        self.request_engine_exit();
                    }
                }
                sig = signals.recv(), if signals_open => match sig {
                    Some(sig) => {
                        tracing::info!(signal = %sig, "termination signal received");
                        self.begin_stopping(ShutdownTrigger::Signal(sig));
                        if engine_result.is_none() {
                            self.request_engine_exit();
                        }
                        if service_result.is_none() {
                            self.request_service_exit();
                        }
                    }
                    None => signals_open = false,
                },
            }
        }

        self.state = LifecycleState::Stopped;
        tracing::info!(
            engine_exit_requests = self.engine_exit_requests,
            service_exit_requests = self.service_exit_requests,
            "all subsystems exited"
        );

        ShutdownReport {
            // Both branches above set a trigger before the barrier can reach zero.
            trigger: self.trigger.unwrap_or(ShutdownTrigger::EngineExited),
            engine_exit_requests: self.engine_exit_requests,
            service_exit_requests: self.service_exit_requests,
            engine_result: engine_result.unwrap_or(Ok(())),
            service_result: service_result.unwrap_or(Ok(())),
        }
    }

    fn begin_stopping(&mut self, trigger: ShutdownTrigger) {
        if self.state == LifecycleState::Running {
            tracing::info!(trigger = ?trigger, "stopping subsystems");
            self.state = LifecycleState::StoppingBoth;
            self.trigger = Some(trigger);
        }
    }

    fn request_engine_exit(&mut self) {
        self.engine_exit_requests += 1;
        self.engine.request_exit();
    }

    fn request_service_exit(&mut self) {
        self.service_exit_requests += 1;
        self.service.request_exit();
    }

    fn completed(
        &self,
        name: String,
        res: Result<Result<(), GatewayError>, JoinError>,
    ) -> Result<(), GatewayError> {
        let res = res.unwrap_or_else(|e| {
            Err(GatewayError::Subsystem {
                name: name.clone(),
                reason: e.to_string(),
            })
        });
        match &res {
            Ok(()) => tracing::info!(subsystem = %name, "subsystem exited"),
            Err(e) => tracing::error!(subsystem = %name, error = %e, "subsystem exited with error"),
        }
        res
    }
}

fn spawn_subsystem<T: Subsystem>(subsystem: Arc<T>) -> JoinHandle<Result<(), GatewayError>> {
    tokio::spawn(async move { subsystem.start().await })
}
