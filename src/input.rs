//! Terminal input: crossterm events turned into the bytes a client expects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::error::Result;

/// Something the user did on the outer terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized to `cols` x `rows`.
    Resize {
        /// New width.
        cols: u16,
        /// New height.
        rows: u16,
    },
}

/// Start the thread reading terminal events into `tx`.
///
/// `crossterm::event::read` blocks, so it gets a plain thread. The thread
/// ends when the receiver is dropped or reading fails.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_reader(tx: mpsc::Sender<TerminalEvent>) -> Result<()> {
    std::thread::Builder::new()
        .name("terminal-input".to_string())
        .spawn(move || loop {
            let event = match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => TerminalEvent::Key(key),
                Ok(Event::Resize(cols, rows)) => TerminalEvent::Resize { cols, rows },
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("terminal read failed: {}", e);
                    break;
                }
            };
            if tx.blocking_send(event).is_err() {
                break;
            }
        })?;
    Ok(())
}

/// Encode a key press for a program.
///
/// With `application_cursor` the arrow and home/end keys use their SS3
/// form, as programs expect after enabling application cursor mode.
#[must_use]
pub fn key_to_bytes(key: KeyEvent, application_cursor: bool) -> Vec<u8> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let mut bytes = match key.code {
        KeyCode::Char(c) if ctrl => match control_byte(c) {
            Some(b) => vec![b],
            None => return Vec::new(),
        },
        KeyCode::Char(c) => c.to_string().into_bytes(),
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Esc => vec![0x1b],
        KeyCode::Up => cursor_key(b'A', application_cursor),
        KeyCode::Down => cursor_key(b'B', application_cursor),
        KeyCode::Right => cursor_key(b'C', application_cursor),
        KeyCode::Left => cursor_key(b'D', application_cursor),
        KeyCode::Home => cursor_key(b'H', application_cursor),
        KeyCode::End => cursor_key(b'F', application_cursor),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::Insert => b"\x1b[2~".to_vec(),
        KeyCode::F(n) => match n {
            1 => b"\x1bOP".to_vec(),
            2 => b"\x1bOQ".to_vec(),
            3 => b"\x1bOR".to_vec(),
            4 => b"\x1bOS".to_vec(),
            5 => b"\x1b[15~".to_vec(),
            6 => b"\x1b[17~".to_vec(),
            7 => b"\x1b[18~".to_vec(),
            8 => b"\x1b[19~".to_vec(),
            9 => b"\x1b[20~".to_vec(),
            10 => b"\x1b[21~".to_vec(),
            11 => b"\x1b[23~".to_vec(),
            12 => b"\x1b[24~".to_vec(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    // Alt sends ESC prefix
    if alt && !bytes.is_empty() {
        bytes.insert(0, 0x1b);
    }
    bytes
}

/// Control byte for `c`, e.g. `^A` = 0x01, `^@`/`^Space` = 0x00.
fn control_byte(c: char) -> Option<u8> {
    match c {
        ' ' | '@' | '2' => Some(0),
        'a'..='z' => Some(c as u8 - b'a' + 1),
        'A'..='Z' => Some(c as u8 - b'A' + 1),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

fn cursor_key(code: u8, application: bool) -> Vec<u8> {
    let intro = if application { b'O' } else { b'[' };
    vec![0x1b, intro, code]
}
