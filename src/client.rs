//! Clients: a program running in a pty, shown in a window.

use std::collections::HashMap;
use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::copy_mode::CopySession;
use crate::emulator::Emulator;
use crate::error::Result;
use crate::layout::WindowId;
use crate::pty::Process;

/// Unique identifier for a client. Ids start at 1 and are never reused.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ClientId(pub u32);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal dimensions in rows and columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TermSize {
    /// Number of rows.
    pub rows: u16,
    /// Number of columns.
    pub cols: u16,
}

impl TermSize {
    /// Create a new terminal size.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// The size with both dimensions at least one.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.rows.max(1), self.cols.max(1))
    }
}

impl From<Rect> for TermSize {
    fn from(rect: Rect) -> Self {
        Self::new(rect.height, rect.width)
    }
}

/// Everything needed to start a program in a pty.
#[derive(Clone, Debug, Default)]
pub struct SpawnRequest {
    /// Shell used to run the program.
    pub shell: String,

    /// Command line handed to `shell -c`. If None, runs the shell itself.
    pub command: Option<String>,

    /// Initial size of the pty.
    pub size: TermSize,

    /// Working directory for the process.
    pub cwd: Option<PathBuf>,

    /// Additional environment variables.
    pub env: HashMap<String, String>,
}

impl SpawnRequest {
    /// Create a request running `shell` interactively.
    #[must_use]
    pub fn new(shell: impl Into<String>, size: TermSize) -> Self {
        Self {
            shell: shell.into(),
            size,
            ..Default::default()
        }
    }

    /// Set the command line to run.
    #[must_use]
    pub fn command(mut self, cmd: impl Into<String>) -> Self {
        self.command = Some(cmd.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Program and arguments to execute.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        match &self.command {
            Some(cmd) => vec![self.shell.clone(), "-c".to_string(), cmd.clone()],
            None => vec![self.shell.clone()],
        }
    }
}

/// A process paired with the emulator displaying its output.
#[derive(Debug)]
pub struct Session {
    /// Screen state.
    pub emulator: Emulator,
    /// Running program.
    pub process: Box<dyn Process>,
    /// Set once the process has exited or its pty closed.
    pub died: bool,
}

impl Session {
    /// Pair a freshly spawned process with its emulator.
    #[must_use]
    pub fn new(emulator: Emulator, process: Box<dyn Process>) -> Self {
        Self {
            emulator,
            process,
            died: false,
        }
    }

    /// Resize the emulator, and the pty when the size changed.
    ///
    /// # Errors
    /// Returns an error if the pty resize fails.
    pub fn resize(&mut self, size: TermSize) -> Result<()> {
        if self.emulator.resize(size) {
            self.process.resize(self.emulator.size())?;
        }
        Ok(())
    }
}

/// A program shown in a window.
#[derive(Debug)]
pub struct Client {
    /// Client id.
    pub id: ClientId,
    /// Command line it was started with, empty for a plain shell.
    pub cmd: String,
    /// Title announced by the program, or the command line.
    pub title: String,
    /// Window showing the client.
    pub window: Option<WindowId>,
    /// The client's own program.
    pub app: Session,
    /// Editor or pager running over the client in copy mode.
    pub editor: Option<CopySession>,
    /// Bell rang while the client was not focused.
    pub urgent: bool,
}

impl Client {
    /// Create a client around a running session.
    #[must_use]
    pub fn new(id: ClientId, cmd: impl Into<String>, app: Session) -> Self {
        let cmd = cmd.into();
        Self {
            id,
            title: cmd.clone(),
            cmd,
            window: None,
            app,
            editor: None,
            urgent: false,
        }
    }

    /// Session receiving input and shown on screen.
    #[must_use]
    pub fn active(&self) -> &Session {
        self.editor.as_ref().map_or(&self.app, |e| &e.session)
    }

    /// Mutable access to the displayed session.
    pub fn active_mut(&mut self) -> &mut Session {
        match self.editor.as_mut() {
            Some(editor) => &mut editor.session,
            None => &mut self.app,
        }
    }

    /// Whether copy mode is running.
    #[must_use]
    pub fn in_copy_mode(&self) -> bool {
        self.editor.is_some()
    }

    /// Title shown in the window's title row.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.editor.as_ref().map_or(&self.title, |e| &e.title)
    }

    /// Send bytes to the displayed session's process.
    ///
    /// # Errors
    /// Returns an error if the process's input channel is gone.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.active_mut().process.write(data)
    }

    /// Resize every session of the client.
    ///
    /// # Errors
    /// Returns an error if a pty resize fails.
    pub fn resize(&mut self, size: TermSize) -> Result<()> {
        self.app.resize(size)?;
        if let Some(editor) = self.editor.as_mut() {
            editor.session.resize(size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_runs_command_through_shell() {
        let req = SpawnRequest::new("/bin/sh", TermSize::new(24, 80)).command("top -d 1");
        assert_eq!(req.argv(), vec!["/bin/sh", "-c", "top -d 1"]);
    }

    #[test]
    fn test_argv_plain_shell() {
        let req = SpawnRequest::new("/bin/bash", TermSize::new(24, 80));
        assert_eq!(req.argv(), vec!["/bin/bash"]);
    }

    #[test]
    fn test_size_from_rect() {
        let size = TermSize::from(Rect::new(3, 4, 80, 23));
        assert_eq!(size, TermSize::new(23, 80));
        assert_eq!(TermSize::new(0, 0).clamped(), TermSize::new(1, 1));
    }
}
