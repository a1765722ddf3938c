//! PTY spawning and I/O management.

use std::io::{Read, Write};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use tokio::sync::mpsc;

use crate::client::{SpawnRequest, TermSize};
use crate::error::{Error, Result};

/// Identifies one spawned process, client program or copy-mode helper.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ProcessId(pub u64);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened on a process's pty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PtyEventKind {
    /// Bytes written by the program.
    Output(Vec<u8>),
    /// The pty reached end of file or failed.
    Closed,
}

/// Event emitted by a pty reader thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PtyEvent {
    /// Process the event belongs to.
    pub process: ProcessId,
    /// What happened.
    pub kind: PtyEventKind,
}

/// A running program attached to a pty.
pub trait Process: Send + std::fmt::Debug {
    /// Process id used to route pty events.
    fn id(&self) -> ProcessId;

    /// Operating system process id, if known.
    fn pid(&self) -> Option<u32>;

    /// Queue bytes for the program's input.
    ///
    /// # Errors
    /// Returns an error if the writer is gone or its queue is full.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Resize the pty.
    ///
    /// # Errors
    /// Returns an error if the resize fails.
    fn resize(&mut self, size: TermSize) -> Result<()>;

    /// Collect the exit status without blocking. Returns true once exited.
    fn try_reap(&mut self) -> bool;

    /// Send a signal to the program's process group.
    ///
    /// # Errors
    /// Returns an error for unknown signals or when delivery fails.
    fn signal(&mut self, signal: i32) -> Result<()>;
}

/// Starts programs in ptys.
pub trait Spawner {
    /// Start the program described by `request`.
    ///
    /// # Errors
    /// Returns an error if the pty cannot be opened or the program cannot start.
    fn spawn(&mut self, request: &SpawnRequest) -> Result<Box<dyn Process>>;
}

/// Spawner backed by the native pty system.
#[derive(Debug)]
pub struct PtySpawner {
    event_tx: mpsc::Sender<PtyEvent>,
    next_id: u64,
}

impl PtySpawner {
    /// Create a spawner reporting pty output on `event_tx`.
    #[must_use]
    pub fn new(event_tx: mpsc::Sender<PtyEvent>) -> Self {
        Self {
            event_tx,
            next_id: 0,
        }
    }
}

impl Spawner for PtySpawner {
    fn spawn(&mut self, request: &SpawnRequest) -> Result<Box<dyn Process>> {
        self.next_id += 1;
        let id = ProcessId(self.next_id);
        let size = request.size.clamped();
        let pair = native_pty_system()
            .openpty(pty_size(size))
            .map_err(|e| Error::PtyCreate(e.to_string()))?;

        let argv = request.argv();
        let mut cmd = CommandBuilder::new(&argv[0]);
        for arg in &argv[1..] {
            cmd.arg(arg);
        }
        if let Some(cwd) = &request.cwd {
            cmd.cwd(cwd);
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }

        let child = pair.slave.spawn_command(cmd)?;
        drop(pair.slave);

        let reader = pair.master.try_clone_reader()?;
        let writer = pair.master.take_writer()?;
        let (input_tx, input_rx) = mpsc::channel::<Vec<u8>>(256);

        spawn_reader_thread(id, reader, self.event_tx.clone())?;
        spawn_writer_thread(id, writer, input_rx)?;

        tracing::debug!(process = %id, pid = ?child.process_id(), argv = ?argv, "spawned");
        Ok(Box::new(PtyProcess {
            id,
            master: pair.master,
            child,
            input_tx,
            exited: false,
        }))
    }
}

/// A program running under a native pty.
struct PtyProcess {
    id: ProcessId,
    master: Box<dyn portable_pty::MasterPty + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
    input_tx: mpsc::Sender<Vec<u8>>,
    exited: bool,
}

impl std::fmt::Debug for PtyProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyProcess")
            .field("id", &self.id)
            .field("pid", &self.child.process_id())
            .field("exited", &self.exited)
            .finish_non_exhaustive()
    }
}

impl Process for PtyProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.input_tx
            .try_send(data.to_vec())
            .map_err(|_| Error::InputSend)
    }

    fn resize(&mut self, size: TermSize) -> Result<()> {
        self.master
            .resize(pty_size(size.clamped()))
            .map_err(|e| Error::Resize(e.to_string()))
    }

    fn try_reap(&mut self) -> bool {
        if !self.exited {
            self.exited = match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(process = %self.id, code = status.exit_code(), "exited");
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    tracing::debug!(process = %self.id, "wait failed: {}", e);
                    true
                }
            };
        }
        self.exited
    }

    fn signal(&mut self, signal: i32) -> Result<()> {
        let signal = Signal::try_from(signal)?;
        let pid = self
            .pid()
            .and_then(|pid| i32::try_from(pid).ok())
            .ok_or(Error::NoClient)?;
        killpg(Pid::from_raw(pid), signal)?;
        Ok(())
    }
}

impl Drop for PtyProcess {
    fn drop(&mut self) {
        if !self.try_reap() {
            if let Err(e) = self.signal(Signal::SIGHUP as i32) {
                tracing::debug!(process = %self.id, "hangup failed: {}", e);
            }
            let _ = self.child.try_wait();
        }
    }
}

fn pty_size(size: TermSize) -> PtySize {
    PtySize {
        rows: size.rows,
        cols: size.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// Spawns the thread that reads PTY output.
///
/// Reads block, so this runs on a plain thread that ends at EOF rather
/// than on the runtime's blocking pool.
fn spawn_reader_thread(
    id: ProcessId,
    mut reader: Box<dyn Read + Send>,
    event_tx: mpsc::Sender<PtyEvent>,
) -> Result<()> {
    std::thread::Builder::new()
        .name(format!("pty-reader-{id}"))
        .spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let event = PtyEvent {
                            process: id,
                            kind: PtyEventKind::Output(buf[..n].to_vec()),
                        };
                        if event_tx.blocking_send(event).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("PTY read error for process {}: {}", id, e);
                        break;
                    }
                }
            }
            let _ = event_tx.blocking_send(PtyEvent {
                process: id,
                kind: PtyEventKind::Closed,
            });
            tracing::debug!("Reader thread for process {} finished", id);
        })?;
    Ok(())
}

/// Spawns the thread that writes to PTY.
fn spawn_writer_thread(
    id: ProcessId,
    mut writer: Box<dyn Write + Send>,
    mut input_rx: mpsc::Receiver<Vec<u8>>,
) -> Result<()> {
    std::thread::Builder::new()
        .name(format!("pty-writer-{id}"))
        .spawn(move || {
            while let Some(data) = input_rx.blocking_recv() {
                if let Err(e) = writer.write_all(&data).and_then(|()| writer.flush()) {
                    tracing::debug!("PTY write error for process {}: {}", id, e);
                    break;
                }
            }
            tracing::debug!("Writer thread for process {} finished", id);
        })?;
    Ok(())
}
