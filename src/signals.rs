//! Process signals bridged into the event loop.
//!
//! Handlers only record that a signal arrived; each one becomes a tagged
//! message on a bounded channel and the loop does the actual work.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use crate::error::Result;

/// A signal the loop reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalEvent {
    /// The outer terminal changed size (`SIGWINCH`).
    Resize,
    /// A child process changed state (`SIGCHLD`).
    ChildExited,
    /// Termination was requested (`SIGTERM` or `SIGHUP`).
    Terminate,
}

impl SignalEvent {
    fn kinds(self) -> Vec<SignalKind> {
        match self {
            Self::Resize => vec![SignalKind::window_change()],
            Self::ChildExited => vec![SignalKind::child()],
            Self::Terminate => vec![SignalKind::terminate(), SignalKind::hangup()],
        }
    }
}

/// Install the handlers and forward every delivery to `tx`.
///
/// Must be called from within a tokio runtime. While the channel is full
/// a forwarding task waits, and further deliveries of its signal merge
/// into the one it holds.
///
/// # Errors
/// Returns an error if a handler cannot be registered.
pub fn install(tx: &mpsc::Sender<SignalEvent>) -> Result<()> {
    for event in [
        SignalEvent::Resize,
        SignalEvent::ChildExited,
        SignalEvent::Terminate,
    ] {
        for kind in event.kinds() {
            let mut stream = signal(kind)?;
            let tx = tx.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
        }
    }
    tracing::debug!("signal handlers installed");
    Ok(())
}
