//! # Tilemux
//!
//! A tiling terminal window manager.
//!
//! Tilemux runs several programs side by side in one terminal. Each program
//! gets its own pty and a vt100 emulator; windows are arranged in a tree of
//! row and column layouts. Input is modal: in keypress mode bytes go to the
//! focused program, and a prefix key switches to command mode where keys
//! run commands (split, create, move focus, copy mode, ...).
//!
//! ## Features
//!
//! - **Layout tree**: nested rows and columns with proportional shares
//! - **Key binding trie**: multi-key sequences and numeric prefixes
//! - **Copy mode**: scrollback opened in `$EDITOR` or `$PAGER`, edits pasted back
//! - **FIFOs**: external command and status pipes
//! - **Ratatui rendering**: windows, title rows and status bar as widgets
//!
//! ## Example
//!
//! ```no_run
//! use ratatui::layout::Rect;
//! use tilemux::{default_keymap, ManagerConfig, ManagerState, PtySpawner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> tilemux::Result<()> {
//!     let (tx, _rx) = tokio::sync::mpsc::channel(64);
//!     let config = ManagerConfig::default();
//!     let keymap = default_keymap(config.modifier)?;
//!     let mut manager =
//!         ManagerState::new(config, keymap, Box::new(PtySpawner::new(tx)), Rect::new(0, 0, 80, 24));
//!
//!     // Spawn a shell, split the screen and start `top` below it
//!     manager.run_startup();
//!     manager.handle_command_line("create top");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod app;
mod binding;
mod cli;
mod client;
mod command;
mod config;
mod copy_mode;
mod emulator;
mod error;
mod fifo;
mod input;
mod layout;
mod manager;
mod mode;
mod pty;
mod render;
mod signals;
mod view;
mod widget;

// Re-export public API
pub use app::{run, run_loop, EventSources};
pub use binding::{format_keys, parse_keys, Keymap, Lookup};
pub use cli::Cli;
pub use client::{Client, ClientId, Session, SpawnRequest, TermSize};
pub use command::{parse_line, tokenize, Action, Command};
pub use config::{default_keymap, parse_modifier, resolve_shell, ManagerConfig};
pub use copy_mode::{CopyKind, CopySession};
pub use emulator::{Emulator, Notification};
pub use error::{Error, Result};
pub use fifo::{Fifo, FifoKind, FifoLine};
pub use input::{key_to_bytes, TerminalEvent};
pub use layout::{Axis, LayoutId, LayoutKind, LayoutTree, Placement, Slot, WindowId};
pub use manager::{ManagerState, ENV_CMD_FIFO, ENV_INSTANCE, ENV_STATUS_FIFO, ENV_WINDOW_ID};
pub use mode::{Dispatch, Mode, ModeState};
pub use pty::{Process, ProcessId, PtyEvent, PtyEventKind, PtySpawner, Spawner};
pub use render::{cursor_position, draw};
pub use signals::SignalEvent;
pub use view::{Direction, View};
pub use widget::{Divider, ScreenWidget, StatusBar, TitleBar};
