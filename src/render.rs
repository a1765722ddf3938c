//! Drawing the manager's state into a frame.

use ratatui::layout::{Position, Rect};
use ratatui::widgets::Clear;
use ratatui::Frame;

use crate::binding::format_keys;
use crate::manager::ManagerState;
use crate::mode::Mode;
use crate::widget::{Divider, ScreenWidget, StatusBar, TitleBar};

/// Draw every window, the status bar and the cursor.
///
/// Call [`ManagerState::arrange`] first so the placements are current.
pub fn draw(frame: &mut Frame<'_>, manager: &ManagerState) {
    let command_mode = manager.mode() == Mode::Command;
    let focus = manager.view().focus;

    if let Some(text) = manager.status() {
        let area = frame.area();
        let pending = command_mode.then(|| pending_input(manager));
        frame.render_widget(
            StatusBar::new(text).pending(pending),
            Rect::new(area.x, area.y, area.width, 1),
        );
    }

    for placement in manager.placements() {
        if let Some(divider) = placement.divider {
            frame.render_widget(Divider::new(placement.title.is_some()), divider);
        }
        if !placement.leaf {
            continue;
        }

        let focused = focus == Some(placement.window);
        match manager.client_in(placement.window) {
            Some(client) => {
                let session = client.active();
                frame.render_widget(ScreenWidget::new(session.emulator.screen()), placement.content);
                if let Some(title) = placement.title {
                    let bar = TitleBar::new(client.id.0, client.display_title())
                        .pid(client.app.process.pid())
                        .copy_mode(client.in_copy_mode())
                        .focused(focused)
                        .command_mode(command_mode)
                        .urgent(client.urgent);
                    frame.render_widget(bar, title);
                }
            }
            None => {
                frame.render_widget(Clear, placement.content);
                if let Some(title) = placement.title {
                    frame.render_widget(
                        TitleBar::empty().focused(focused).command_mode(command_mode),
                        title,
                    );
                }
            }
        }
    }

    if let Some(position) = cursor_position(manager) {
        frame.set_cursor_position(position);
    }
}

/// Entry buffer or count shown while a command is being typed.
fn pending_input(manager: &ManagerState) -> String {
    if manager.entry().is_empty() && manager.count() > 0 {
        manager.count().to_string()
    } else {
        format_keys(manager.entry())
    }
}

/// Where the hardware cursor goes, if it is shown at all.
///
/// Only in keypress mode, for a focused client whose program shows its
/// cursor and whose view is not scrolled back.
#[must_use]
pub fn cursor_position(manager: &ManagerState) -> Option<Position> {
    if manager.mode() != Mode::Keypress {
        return None;
    }
    let window = manager.view().focus?;
    let emulator = &manager.client_in(window)?.active().emulator;
    if !emulator.cursor_visible() || emulator.scroll_offset() != 0 {
        return None;
    }
    let content = manager
        .placements()
        .iter()
        .find(|p| p.window == window)?
        .content;
    let (row, col) = emulator.cursor_position();
    (row < content.height && col < content.width)
        .then(|| Position::new(content.x + col, content.y + row))
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::command::{Action, Command};
    use crate::config::{default_keymap, ManagerConfig, DEFAULT_MODIFIER};
    use crate::pty::fake::FakeSpawner;
    use crate::pty::{PtyEvent, PtyEventKind};

    fn manager(config: ManagerConfig) -> (ManagerState, FakeSpawner) {
        let spawner = FakeSpawner::default();
        let keymap = default_keymap(config.modifier).unwrap();
        let mut manager =
            ManagerState::new(config, keymap, Box::new(spawner.clone()), Rect::new(0, 0, 40, 10));
        manager.run_startup();
        manager.arrange();
        (manager, spawner)
    }

    fn screen(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_single_client_fills_screen_without_title() {
        let (mut manager, spawner) = manager(ManagerConfig::default());
        manager.handle_pty_event(PtyEvent {
            process: spawner.last_id(),
            kind: PtyEventKind::Output(b"$ ls".to_vec()),
        });

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| draw(frame, &manager)).unwrap();
        assert!(screen(&terminal, 0).starts_with("$ ls"));
        assert!(!screen(&terminal, 9).contains('─'));
        assert_eq!(cursor_position(&manager), Some(Position::new(4, 0)));
    }

    #[test]
    fn test_split_windows_get_titles_and_dividers() {
        let (mut manager, _) = manager(ManagerConfig::default());
        manager.run_action(&Action::with_args(Command::Split, ["v"]), None);
        manager.run_action(&Action::new(Command::Create), None);
        manager.arrange();

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| draw(frame, &manager)).unwrap();
        let bottom = screen(&terminal, 9);
        assert!(bottom.starts_with("#1 (1001)"));
        assert!(bottom.contains('┴'));
        assert!(bottom.contains("#2 (1002)"));
        assert!(screen(&terminal, 0).contains('│'));
    }

    #[test]
    fn test_no_cursor_in_command_mode_or_scrollback() {
        let (mut manager, spawner) = manager(ManagerConfig::default());
        manager.handle_input(DEFAULT_MODIFIER);
        assert_eq!(cursor_position(&manager), None);
        manager.handle_input(DEFAULT_MODIFIER);
        assert!(cursor_position(&manager).is_some());

        for i in 0..30 {
            manager.handle_pty_event(PtyEvent {
                process: spawner.last_id(),
                kind: PtyEventKind::Output(format!("{i}\r\n").into_bytes()),
            });
        }
        manager.run_action(&Action::new(Command::Scrollback), None);
        assert_eq!(cursor_position(&manager), None);
    }

    #[test]
    fn test_status_bar_row() {
        let config = ManagerConfig {
            status_fifo: Some("/tmp/tilemux-status".into()),
            ..ManagerConfig::default()
        };
        let (mut manager, _) = manager(config);
        manager.set_status("battery 80%\n");
        manager.handle_input(DEFAULT_MODIFIER);
        manager.handle_input(b'4');

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| draw(frame, &manager)).unwrap();
        assert!(screen(&terminal, 0).starts_with("[4] battery 80%"));
    }
}
