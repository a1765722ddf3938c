//! Command line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{parse_modifier, ManagerConfig, DEFAULT_ESCAPE_DELAY, DEFAULT_SCROLLBACK};
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "tilemux",
    about = "Tiling terminal window manager with modal key bindings",
    version
)]
pub struct Cli {
    /// Start even when running inside another tilemux.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Prefix key entering command mode, as `^x` or a single character.
    #[arg(short = 'm', long, default_value = "^g")]
    pub modifier: String,

    /// Escape-key delay in milliseconds, clamped to 50..=1000.
    #[arg(short = 'd', long = "escape-delay", default_value_t = DEFAULT_ESCAPE_DELAY)]
    pub escape_delay: u64,

    /// Scrollback lines kept per client.
    #[arg(short = 'r', long, default_value_t = DEFAULT_SCROLLBACK)]
    pub scrollback: usize,

    /// Fixed terminal title instead of the focused client's.
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Named pipe whose last line is shown in a status bar.
    #[arg(short = 's', long = "status-fifo")]
    pub status_fifo: Option<PathBuf>,

    /// Named pipe accepting command lines.
    #[arg(short = 'c', long = "cmd-fifo")]
    pub cmd_fifo: Option<PathBuf>,

    /// Write logs to this file (filter with `TILEMUX_LOG`).
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Commands to start, one client each; defaults to a shell.
    pub commands: Vec<String>,
}

impl Cli {
    /// Build the manager configuration, running clients under `shell`.
    ///
    /// # Errors
    /// Returns an error if the modifier is not a single key.
    pub fn into_config(self, shell: String) -> Result<ManagerConfig> {
        Ok(ManagerConfig {
            modifier: parse_modifier(&self.modifier)?,
            escape_delay: ManagerConfig::clamp_escape_delay(self.escape_delay),
            scrollback_lines: self.scrollback,
            title: self.title,
            shell,
            cmd_fifo: self.cmd_fifo,
            status_fifo: self.status_fifo,
            force: self.force,
            startup: self.commands,
            ..ManagerConfig::default()
        })
    }
}
