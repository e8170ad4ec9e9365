//! OS signal handling.
//!
//! SIGINT, SIGTERM and SIGQUIT are all treated as a request to shut down and
//! forwarded as [`Termination`] events on a channel.

use tokio::sync::mpsc;

/// A termination request from outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Interrupt,
    Terminate,
    Quit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Termination::Interrupt => "SIGINT",
            Termination::Terminate => "SIGTERM",
            Termination::Quit => "SIGQUIT",
        };
        f.write_str(s)
    }
}

/// Install signal handlers and return the event stream.
///
/// The forwarding task ends once the receiver is dropped.
#[cfg(unix)]
pub fn listen() -> std::io::Result<mpsc::UnboundedReceiver<Termination>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let sig = tokio::select! {
                Some(()) = sigint.recv() => Termination::Interrupt,
                Some(()) = sigterm.recv() => Termination::Terminate,
                Some(()) = sigquit.recv() => Termination::Quit,
                else => break,
            };
            if tx.send(sig).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

#[cfg(not(unix))]
pub fn listen() -> std::io::Result<mpsc::UnboundedReceiver<Termination>> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(Termination::Interrupt).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}
