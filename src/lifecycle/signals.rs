//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM (ctrl-c elsewhere)
//! - Translate them into [`Signal`] values on a channel
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The listener only forwards; deciding what a signal means is the
//!   shutdown controller's job, which keeps the controller testable with
//!   injected signals

use std::fmt;
use std::io;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A process termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Forward termination signals into `tx` until the receiver is dropped.
pub fn spawn_listener(tx: mpsc::Sender<Signal>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = forward(tx).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    })
}

#[cfg(unix)]
async fn forward(tx: mpsc::Sender<Signal>) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    loop {
        let received = tokio::select! {
            _ = interrupt.recv() => Signal::Interrupt,
            _ = terminate.recv() => Signal::Terminate,
        };
        tracing::debug!(signal = %received, "Signal received");
        if tx.send(received).await.is_err() {
            return Ok(());
        }
    }
}

#[cfg(not(unix))]
async fn forward(tx: mpsc::Sender<Signal>) -> io::Result<()> {
    loop {
        tokio::signal::ctrl_c().await?;
        if tx.send(Signal::Interrupt).await.is_err() {
            return Ok(());
        }
    }
}
