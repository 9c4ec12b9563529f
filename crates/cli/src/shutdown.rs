//! Signal handling for an import run.
//!
//! A signal never interrupts a pipeline step. It cancels the run scope, which
//! stops the background import-mode ticker; the executor still switches every
//! store back to normal mode before the run returns. A signal received before
//! the run starts makes it return without touching the cluster.

use crate::error::CliError;
use std::{
    fmt,
    sync::{Arc, OnceLock},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

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

/// Cancellation scope shared by the CLI and the executor.
#[derive(Clone, Default)]
pub struct RunScope {
    token: CancellationToken,
    received: Arc<OnceLock<Signal>>,
}

impl RunScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the scope on the first SIGINT or SIGTERM.
    pub fn listen(&self) {
        let scope = self.clone();
        tokio::spawn(async move {
            let signal = wait_for_signal().await;
            scope.interrupt(signal);
        });
    }

    pub fn interrupt(&self, signal: Signal) {
        if self.received.set(signal).is_ok() {
            info!(
                signal = %signal,
                "Stopping the import-mode ticker, the current step will finish and stores will be switched back to normal mode"
            );
        }
        self.token.cancel();
    }

    /// First signal received, if any.
    pub fn received(&self) -> Option<Signal> {
        self.received.get().copied()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

async fn wait_for_signal() -> Signal {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => Signal::Interrupt,
        _ = terminate => Signal::Terminate,
    }
}

/// How a command ended, as seen by the calling shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    /// The command failed after a signal, usually because the run never started.
    Interrupted,
}

impl Outcome {
    pub fn of(result: &Result<(), CliError>, scope: &RunScope) -> Self {
        match (result, scope.received()) {
            (Ok(()), _) => Outcome::Completed,
            (Err(_), Some(_)) => Outcome::Interrupted,
            (Err(_), None) => Outcome::Failed,
        }
    }
}

impl From<Outcome> for std::process::ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => std::process::ExitCode::SUCCESS,
            Outcome::Failed => std::process::ExitCode::from(1),
            // 128 + SIGINT, what shells report for an interrupted command
            Outcome::Interrupted => std::process::ExitCode::from(130),
        }
    }
}
