//! The event loop.
//!
//! Every source of events (pty output, terminal input, FIFO lines and
//! signals) feeds a bounded channel; one `select!` waits on all of them.
//! Each iteration handles whatever woke it, sweeps dead clients, and ends
//! with a single draw.

use std::io::Write;

use crossterm::terminal::SetTitle;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::command::{Action, Command};
use crate::config::ManagerConfig;
use crate::error::Result;
use crate::fifo::{self, Fifo, FifoKind, FifoLine};
use crate::input::{self, key_to_bytes, TerminalEvent};
use crate::manager::ManagerState;
use crate::pty::{PtyEvent, PtySpawner};
use crate::render;
use crate::signals::{self, SignalEvent};

/// Upper bound of pty events applied before the next draw.
const PTY_BATCH: usize = 256;

/// Receiving ends of every event source.
#[derive(Debug)]
pub struct EventSources {
    /// Output and closure of client ptys.
    pub pty: mpsc::Receiver<PtyEvent>,
    /// Keys and resizes from the outer terminal.
    pub input: mpsc::Receiver<TerminalEvent>,
    /// Lines from the command and status FIFOs.
    pub fifo: mpsc::Receiver<FifoLine>,
    /// Signal notifications.
    pub signals: mpsc::Receiver<SignalEvent>,
}

/// Set up every event source and run the manager until it stops.
///
/// `out` receives the escape sequences ratatui does not cover: the
/// terminal title and the bell.
///
/// # Errors
/// Returns an error if setup fails or the terminal cannot be drawn.
pub async fn run<B, W>(config: ManagerConfig, terminal: &mut Terminal<B>, out: &mut W) -> Result<()>
where
    B: Backend,
    W: Write,
{
    let (pty_tx, pty_rx) = mpsc::channel(1024);
    let (input_tx, input_rx) = mpsc::channel(256);
    let (fifo_tx, fifo_rx) = mpsc::channel(64);
    let (signal_tx, signal_rx) = mpsc::channel(16);

    signals::install(&signal_tx)?;

    let mut fifos = Vec::new();
    for (path, kind) in [
        (&config.cmd_fifo, FifoKind::Command),
        (&config.status_fifo, FifoKind::Status),
    ] {
        if let Some(path) = path {
            let (guard, receiver) = Fifo::open(path)?;
            tracing::info!(?kind, path = %guard.path().display(), created = guard.created(), "fifo open");
            fifo::spawn_reader(kind, receiver, fifo_tx.clone());
            fifos.push(guard);
        }
    }

    let keymap = config.keymap()?;
    let size = terminal.size()?;
    let screen = Rect::new(0, 0, size.width, size.height);
    tracing::info!(width = size.width, height = size.height, "starting");

    let spawner = PtySpawner::new(pty_tx);
    let mut manager = ManagerState::new(config, keymap, Box::new(spawner), screen);
    manager.run_startup();
    input::spawn_reader(input_tx)?;

    let sources = EventSources {
        pty: pty_rx,
        input: input_rx,
        fifo: fifo_rx,
        signals: signal_rx,
    };
    let result = run_loop(&mut manager, terminal, out, sources).await;
    tracing::info!("shutting down");
    drop(manager);
    drop(fifos);
    result
}

/// Run the loop over already wired event sources.
///
/// # Errors
/// Returns an error if the terminal cannot be drawn or written.
pub async fn run_loop<B, W>(
    manager: &mut ManagerState,
    terminal: &mut Terminal<B>,
    out: &mut W,
    mut sources: EventSources,
) -> Result<()>
where
    B: Backend,
    W: Write,
{
    let mut title = None;
    draw(manager, terminal, out, &mut title)?;

    while !manager.stop_requested() {
        tokio::select! {
            biased;

            Some(signal) = sources.signals.recv() => handle_signal(manager, signal),
            Some(event) = sources.input.recv() => handle_terminal(manager, event),
            Some(event) = sources.pty.recv() => {
                manager.handle_pty_event(event);
                for _ in 1..PTY_BATCH {
                    match sources.pty.try_recv() {
                        Ok(event) => manager.handle_pty_event(event),
                        Err(_) => break,
                    }
                }
            }
            Some(line) = sources.fifo.recv() => match line.kind {
                FifoKind::Command => manager.handle_command_line(&line.text),
                FifoKind::Status => manager.set_status(&line.text),
            },
            else => break,
        }

        while let Ok(signal) = sources.signals.try_recv() {
            handle_signal(manager, signal);
        }
        manager.sweep();
        if manager.stop_requested() {
            break;
        }
        draw(manager, terminal, out, &mut title)?;
    }
    Ok(())
}

fn handle_signal(manager: &mut ManagerState, signal: SignalEvent) {
    match signal {
        SignalEvent::Resize => match crossterm::terminal::size() {
            Ok((cols, rows)) => manager.set_screen(Rect::new(0, 0, cols, rows)),
            Err(e) => tracing::warn!("terminal size query failed: {}", e),
        },
        SignalEvent::ChildExited => manager.reap(),
        SignalEvent::Terminate => {
            tracing::info!("terminated by signal");
            manager.run_action(&Action::new(Command::Quit), None);
        }
    }
}

fn handle_terminal(manager: &mut ManagerState, event: TerminalEvent) {
    match event {
        TerminalEvent::Key(key) => {
            let application_cursor = manager
                .focused()
                .is_some_and(|c| c.active().emulator.application_cursor());
            for byte in key_to_bytes(key, application_cursor) {
                manager.handle_input(byte);
            }
        }
        TerminalEvent::Resize { cols, rows } => manager.set_screen(Rect::new(0, 0, cols, rows)),
    }
}

/// Batched refresh: reflow, repaint, then title and bell.
fn draw<B, W>(
    manager: &mut ManagerState,
    terminal: &mut Terminal<B>,
    out: &mut W,
    title: &mut Option<String>,
) -> Result<()>
where
    B: Backend,
    W: Write,
{
    manager.arrange();
    if manager.take_redraw() {
        terminal.clear()?;
    }
    terminal.draw(|frame| render::draw(frame, manager))?;

    let current = manager.terminal_title().filter(|t| !t.is_empty());
    if current != *title {
        if let Some(text) = &current {
            crossterm::execute!(out, SetTitle(text))?;
        }
        *title = current;
    }
    if manager.take_bell() {
        out.write_all(b"\x07")?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::default_keymap;
    use crate::pty::fake::FakeSpawner;
    use crate::pty::PtyEventKind;

    struct Harness {
        manager: ManagerState,
        spawner: FakeSpawner,
        pty: mpsc::Sender<PtyEvent>,
        input: mpsc::Sender<TerminalEvent>,
        fifo: mpsc::Sender<FifoLine>,
        signals: mpsc::Sender<SignalEvent>,
        sources: EventSources,
    }

    fn harness(config: ManagerConfig) -> Harness {
        let spawner = FakeSpawner::default();
        let keymap = default_keymap(config.modifier).unwrap();
        let mut manager =
            ManagerState::new(config, keymap, Box::new(spawner.clone()), Rect::new(0, 0, 40, 10));
        manager.run_startup();

        let (pty, pty_rx) = mpsc::channel(16);
        let (input, input_rx) = mpsc::channel(16);
        let (fifo, fifo_rx) = mpsc::channel(16);
        let (signals, signal_rx) = mpsc::channel(16);
        Harness {
            manager,
            spawner,
            pty,
            input,
            fifo,
            signals,
            sources: EventSources {
                pty: pty_rx,
                input: input_rx,
                fifo: fifo_rx,
                signals: signal_rx,
            },
        }
    }

    fn char_key(c: char) -> TerminalEvent {
        TerminalEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_keys_reach_client_until_quit() {
        let Harness {
            mut manager,
            spawner,
            input,
            sources,
            ..
        } = harness(ManagerConfig::default());

        for c in "ls".chars() {
            input.send(char_key(c)).await.unwrap();
        }
        input
            .send(TerminalEvent::Key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL)))
            .await
            .unwrap();
        input.send(char_key('q')).await.unwrap();
        input.send(char_key('q')).await.unwrap();

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut out = Vec::new();
        run_loop(&mut manager, &mut terminal, &mut out, sources)
            .await
            .unwrap();
        assert!(manager.stop_requested());
        assert_eq!(spawner.input_of(spawner.last_id()), b"ls");
    }

    #[tokio::test]
    async fn test_title_bell_and_exit_of_last_client() {
        let Harness {
            mut manager,
            spawner,
            pty,
            sources,
            ..
        } = harness(ManagerConfig::default());
        let id = spawner.last_id();

        pty.send(PtyEvent {
            process: id,
            kind: PtyEventKind::Output(b"\x1b]2;editor\x07\x07".to_vec()),
        })
        .await
        .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut out = Vec::new();
        let run = run_loop(&mut manager, &mut terminal, &mut out, sources);
        let exit = async {
            tokio::task::yield_now().await;
            pty.send(PtyEvent {
                process: id,
                kind: PtyEventKind::Closed,
            })
            .await
            .unwrap();
        };
        let (result, ()) = tokio::join!(run, exit);
        result.unwrap();

        assert!(manager.clients().is_empty());
        let out = String::from_utf8_lossy(&out);
        assert!(out.contains("editor"));
        assert!(out.ends_with('\x07'));
    }

    #[tokio::test]
    async fn test_fifo_lines_and_terminate_signal() {
        let config = ManagerConfig {
            status_fifo: Some("/tmp/tilemux-status".into()),
            ..ManagerConfig::default()
        };
        let Harness {
            mut manager,
            fifo,
            signals,
            sources,
            ..
        } = harness(config);

        fifo.send(FifoLine {
            kind: FifoKind::Command,
            text: "create top".to_string(),
        })
        .await
        .unwrap();
        fifo.send(FifoLine {
            kind: FifoKind::Status,
            text: "12:00".to_string(),
        })
        .await
        .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut out = Vec::new();
        let run = run_loop(&mut manager, &mut terminal, &mut out, sources);
        let stop = async {
            tokio::task::yield_now().await;
            signals.send(SignalEvent::Terminate).await.unwrap();
        };
        let (result, ()) = tokio::join!(run, stop);
        result.unwrap();

        assert_eq!(manager.clients().len(), 2);
        assert_eq!(manager.status(), Some("12:00"));
        assert!(manager.stop_requested());
    }
}
