//! Manager configuration and default key bindings.

use std::path::PathBuf;

use nix::sys::signal::Signal;

use crate::binding::Keymap;
use crate::command::{Action, Command};
use crate::error::{Error, Result};
use crate::mode::Mode;

/// Default prefix key, `^G`.
pub const DEFAULT_MODIFIER: u8 = 0x07;

/// Default escape-key delay in milliseconds.
pub const DEFAULT_ESCAPE_DELAY: u64 = 100;

/// Accepted escape-key delays in milliseconds.
pub const ESCAPE_DELAY_RANGE: std::ops::RangeInclusive<u64> = 50..=1000;

/// Default history kept per client.
pub const DEFAULT_SCROLLBACK: usize = 500;

/// Configuration for the manager.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Prefix byte entering command mode.
    pub modifier: u8,
    /// Escape-key delay, exported to children as `ESCDELAY`.
    pub escape_delay: u64,
    /// Scrollback lines per client.
    pub scrollback_lines: usize,
    /// Fixed terminal title; follows the focused client when unset.
    pub title: Option<String>,
    /// Shell running client commands.
    pub shell: String,
    /// Command FIFO path.
    pub cmd_fifo: Option<PathBuf>,
    /// Status FIFO path.
    pub status_fifo: Option<PathBuf>,
    /// Allow running inside another instance.
    pub force: bool,
    /// Commands spawned at startup; empty means one shell.
    pub startup: Vec<String>,
    /// Signal sent by `killclient`.
    pub kill_signal: i32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            modifier: DEFAULT_MODIFIER,
            escape_delay: DEFAULT_ESCAPE_DELAY,
            scrollback_lines: DEFAULT_SCROLLBACK,
            title: None,
            shell: "/bin/sh".to_string(),
            cmd_fifo: None,
            status_fifo: None,
            force: false,
            startup: Vec::new(),
            kill_signal: Signal::SIGHUP as i32,
        }
    }
}

impl ManagerConfig {
    /// Clamp an escape delay into the accepted range.
    #[must_use]
    pub fn clamp_escape_delay(delay: u64) -> u64 {
        delay.clamp(*ESCAPE_DELAY_RANGE.start(), *ESCAPE_DELAY_RANGE.end())
    }

    /// One `create` action per startup command, or a single shell.
    #[must_use]
    pub fn startup_actions(&self) -> Vec<Action> {
        if self.startup.is_empty() {
            return vec![Action::new(Command::Create)];
        }
        self.startup
            .iter()
            .map(|cmd| Action::with_args(Command::Create, [cmd.as_str()]))
            .collect()
    }

    /// Build the default key bindings around the configured modifier.
    ///
    /// # Errors
    /// Returns an error if two default bindings collide, e.g. when the
    /// modifier is one of the command keys.
    pub fn keymap(&self) -> Result<Keymap> {
        default_keymap(self.modifier)
    }
}

/// Default bindings for both modes.
///
/// # Errors
/// Returns an error if the modifier collides with a command key.
pub fn default_keymap(modifier: u8) -> Result<Keymap> {
    use Command::{
        ChangeKillSignal, ChangeState, CopyMode, Create, Digit, FocusN, FocusTransition,
        KillClient, Mov, Paste, Quit, Redraw, Scrollback, SignalClient, Split,
    };

    let mut keymap = Keymap::new();
    keymap.bind(
        Mode::Keypress,
        &[modifier],
        Action::with_args(ChangeState, ["command"]),
    )?;

    keymap.bind(Mode::Command, &[modifier], Action::with_args(ChangeState, ["keypress"]))?;
    keymap.bind(Mode::Command, b"c", Action::new(Create))?;
    keymap.bind(Mode::Command, b"C", Action::with_args(Create, ["", "", "$CWD"]))?;
    keymap.bind(Mode::Command, b"s", Action::new(Split))?;
    keymap.bind(Mode::Command, b"v", Action::with_args(Split, ["v"]))?;
    keymap.bind(Mode::Command, b"xx", Action::new(KillClient))?;
    keymap.bind(Mode::Command, b"j", Action::with_args(Mov, ["down"]))?;
    keymap.bind(Mode::Command, b"k", Action::with_args(Mov, ["up"]))?;
    keymap.bind(Mode::Command, b"h", Action::with_args(Mov, ["left"]))?;
    keymap.bind(Mode::Command, b"l", Action::with_args(Mov, ["right"]))?;
    keymap.bind(Mode::Command, b"g", Action::new(FocusN))?;
    keymap.bind(Mode::Command, b"\r", Action::new(FocusTransition))?;
    keymap.bind(Mode::Command, b"qq", Action::new(Quit))?;
    keymap.bind(Mode::Command, b"r", Action::new(Redraw))?;
    keymap.bind(Mode::Command, &[0x0c], Action::new(Redraw))?;
    keymap.bind(Mode::Command, b"e", Action::with_args(CopyMode, ["editor"]))?;
    keymap.bind(Mode::Command, b"E", Action::with_args(CopyMode, ["pager"]))?;
    keymap.bind(Mode::Command, b"/", Action::with_args(CopyMode, ["pager", "/"]))?;
    keymap.bind(Mode::Command, b"?", Action::with_args(CopyMode, ["pager", "bindings"]))?;
    keymap.bind(Mode::Command, b"p", Action::new(Paste))?;
    keymap.bind(Mode::Command, b"u", Action::with_args(Scrollback, ["-1"]))?;
    keymap.bind(Mode::Command, b"n", Action::with_args(Scrollback, ["1"]))?;
    keymap.bind(Mode::Command, b"K", Action::new(ChangeKillSignal))?;
    keymap.bind(Mode::Command, b"!", Action::new(SignalClient))?;
    for digit in b'0'..=b'9' {
        keymap.bind(Mode::Command, &[digit], Action::new(Digit))?;
    }
    Ok(keymap)
}

/// Pick the shell from the value of `$SHELL`.
///
/// Unset or empty falls back to `/bin/sh`.
///
/// # Errors
/// Returns an error if the shell is not an absolute path or names this
/// program.
pub fn resolve_shell(shell: Option<&str>) -> Result<String> {
    let shell = match shell {
        Some(s) if !s.is_empty() => s,
        _ => return Ok("/bin/sh".to_string()),
    };
    let path = std::path::Path::new(shell);
    let own = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == env!("CARGO_PKG_NAME"));
    if !path.is_absolute() || own {
        return Err(Error::InvalidShell(shell.to_string()));
    }
    Ok(shell.to_string())
}

/// Parse a modifier given as `^x` or a single character.
///
/// # Errors
/// Returns an error for anything that is not exactly one key.
pub fn parse_modifier(text: &str) -> Result<u8> {
    match crate::binding::parse_keys(text).as_slice() {
        [key] => Ok(*key),
        _ => Err(Error::InvalidArgument {
            command: "modifier",
            value: text.to_string(),
        }),
    }
}
