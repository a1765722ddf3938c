#![forbid(unsafe_code)]

use std::io::{self, stdout};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tilemux::{resolve_shell, Cli, Error, ENV_INSTANCE};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    if std::env::var_os(ENV_INSTANCE).is_some() && !cli.force {
        return Err(Error::NestedSession.into());
    }
    let shell = resolve_shell(std::env::var("SHELL").ok().as_deref())?;
    let config = cli.into_config(shell)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    install_panic_hook();
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Run the app
    let result = runtime.block_on(tilemux::run(config, &mut terminal, &mut out));

    // Restore terminal
    restore_terminal()?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}

/// Log to `path` when given; stderr belongs to the managed screen.
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter = EnvFilter::try_from_env("TILEMUX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));
}
