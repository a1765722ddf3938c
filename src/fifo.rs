//! Named pipes for external commands and status text.

use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use nix::sys::stat::Mode;
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Which FIFO a line came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FifoKind {
    /// Command lines, dispatched like key bindings.
    Command,
    /// Free text for the status bar.
    Status,
}

/// A complete line read from a FIFO.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FifoLine {
    /// Source FIFO.
    pub kind: FifoKind,
    /// Line without its terminator.
    pub text: String,
}

/// A named pipe this process reads from.
///
/// The pipe is removed on drop only if it was created here.
#[derive(Debug)]
pub struct Fifo {
    path: PathBuf,
    created: bool,
}

impl Fifo {
    /// Open `path` for reading, creating it with mode 0600 if missing.
    ///
    /// The pipe is opened read-write so that it never reports end of file
    /// when the last writer goes away. Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the path exists but is not a FIFO, or if it
    /// cannot be created or opened.
    pub fn open(path: &Path) -> Result<(Self, pipe::Receiver)> {
        let created = match std::fs::metadata(path) {
            Ok(meta) if meta.file_type().is_fifo() => false,
            Ok(_) => return Err(Error::NotAFifo(path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                nix::unistd::mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR)?;
                true
            }
            Err(e) => return Err(e.into()),
        };
        let fifo = Self {
            path: path.to_path_buf(),
            created,
        };
        let receiver = pipe::OpenOptions::new()
            .read_write(true)
            .open_receiver(path)?;
        tracing::info!(path = %path.display(), created, "fifo opened");
        Ok((fifo, receiver))
    }

    /// Location of the pipe.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this process created the pipe.
    #[must_use]
    pub fn created(&self) -> bool {
        self.created
    }
}

impl Drop for Fifo {
    fn drop(&mut self) {
        if self.created {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::debug!(path = %self.path.display(), "unlink failed: {}", e);
            }
        }
    }
}

/// Longest unterminated command line kept while waiting for its newline.
pub const MAX_PENDING: usize = 4096;

/// Splits a byte stream into lines, holding back an unterminated tail.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes and return every line they completed.
    ///
    /// A tail longer than [`MAX_PENDING`] is dropped.
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(data);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..pos]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        if self.pending.len() > MAX_PENDING {
            tracing::warn!(bytes = self.pending.len(), "dropping overlong fifo line");
            self.pending.clear();
        }
        lines
    }

    /// Bytes waiting for a newline.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Texts one read produces: complete lines for commands, the whole
/// chunk for the status bar, newline or not.
fn texts(kind: FifoKind, lines: &mut LineBuffer, data: &[u8]) -> Vec<String> {
    match kind {
        FifoKind::Command => lines.push(data),
        FifoKind::Status => vec![String::from_utf8_lossy(data).into_owned()],
    }
}

/// Read `receiver` until it fails, sending each complete line to `tx`.
pub fn spawn_reader(kind: FifoKind, mut receiver: pipe::Receiver, tx: mpsc::Sender<FifoLine>) {
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        let mut lines = LineBuffer::default();
        loop {
            match receiver.read(&mut buf).await {
                Ok(0) => {
                    tracing::debug!(?kind, "fifo closed");
                    return;
                }
                Ok(n) => {
                    for text in texts(kind, &mut lines, &buf[..n]) {
                        if tx.send(FifoLine { kind, text }).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(?kind, "fifo read failed: {}", e);
                    return;
                }
            }
        }
    });
}
