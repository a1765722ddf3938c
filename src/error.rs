//! Error types for the tilemux crate.

use thiserror::Error;

/// Result type alias using tilemux's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tilemux operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure on a terminal, pipe or FIFO.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anyhow error from portable-pty.
    #[error("PTY error: {0}")]
    Pty(#[from] anyhow::Error),

    /// Failed to create PTY pair.
    #[error("failed to create PTY: {0}")]
    PtyCreate(String),

    /// PTY resize failed.
    #[error("failed to resize PTY: {0}")]
    Resize(String),

    /// Input send failed.
    #[error("failed to send input to client")]
    InputSend,

    /// Layout tree operation on an unsuitable window.
    #[error("layout error: {0}")]
    Layout(String),

    /// Client not found with the given ID.
    #[error("client not found: {0}")]
    ClientNotFound(u32),

    /// A command needed a focused or selected client and there was none.
    #[error("no client selected")]
    NoClient,

    /// A key sequence collides with an existing binding.
    #[error("conflicting binding for '{0}'")]
    BindingConflict(String),

    /// A binding was given an empty key sequence.
    #[error("empty key sequence")]
    EmptyBinding,

    /// A binding carried more arguments than an action can hold.
    #[error("too many arguments for '{command}': {count} (at most {max})")]
    TooManyArguments {
        /// Command name.
        command: String,
        /// Number of arguments given.
        count: usize,
        /// Maximum accepted.
        max: usize,
    },

    /// Command name not present in the command table.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A command argument could not be interpreted.
    #[error("invalid argument for '{command}': {value}")]
    InvalidArgument {
        /// Command name.
        command: &'static str,
        /// Offending value.
        value: String,
    },

    /// The configured shell is unusable.
    #[error("SHELL ({0}) is invalid")]
    InvalidShell(String),

    /// Refusing to start inside another instance.
    #[error("nested session prevented; use -f to allow")]
    NestedSession,

    /// Sending a signal to a process group failed.
    #[error("failed to signal process: {0}")]
    Signal(#[from] nix::Error),

    /// A FIFO path exists but is not a named pipe.
    #[error("{0} is not a named pipe")]
    NotAFifo(String),
}
