//! Ratatui widgets for client screens, title rows, dividers and the status bar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Widget for rendering a client's terminal content.
pub struct ScreenWidget<'a> {
    /// Screen to render.
    screen: &'a vt100::Screen,
}

impl<'a> ScreenWidget<'a> {
    /// Create a new screen widget.
    #[must_use]
    pub fn new(screen: &'a vt100::Screen) -> Self {
        Self { screen }
    }
}

impl Widget for ScreenWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        for row in 0..area.height {
            for col in 0..area.width {
                let buf_cell = &mut buf[(area.x + col, area.y + row)];
                let Some(cell) = self.screen.cell(row, col) else {
                    buf_cell.reset();
                    continue;
                };

                if cell.is_wide_continuation() {
                    buf_cell.set_symbol("");
                } else if cell.has_contents() {
                    buf_cell.set_symbol(&cell.contents());
                } else {
                    buf_cell.set_char(' ');
                }

                let mut fg = convert_color(cell.fgcolor());
                let mut bg = convert_color(cell.bgcolor());
                if cell.inverse() {
                    std::mem::swap(&mut fg, &mut bg);
                }

                let mut style = Style::default().fg(fg).bg(bg);
                if cell.bold() {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if cell.italic() {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                if cell.underline() {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                buf_cell.set_style(style);
            }
        }
    }
}

/// Title row under a window: `#id (pid) | title`, padded with a fill
/// character to the full width.
pub struct TitleBar<'a> {
    /// Client shown in the window, `None` for an empty slot.
    id: Option<u32>,
    /// Process id of the client's program.
    pid: Option<u32>,
    /// Title text.
    title: &'a str,
    /// Whether copy mode runs in the window.
    copy_mode: bool,
    /// Whether the window has focus.
    focused: bool,
    /// Whether the manager is in command mode.
    command_mode: bool,
    /// Whether the client rang the bell while unfocused.
    urgent: bool,
}

impl<'a> TitleBar<'a> {
    /// Title row for a client.
    #[must_use]
    pub fn new(id: u32, title: &'a str) -> Self {
        Self {
            id: Some(id),
            pid: None,
            title,
            copy_mode: false,
            focused: false,
            command_mode: false,
            urgent: false,
        }
    }

    /// Title row for an empty window.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: None,
            pid: None,
            title: "",
            copy_mode: false,
            focused: false,
            command_mode: false,
            urgent: false,
        }
    }

    /// Set the process id.
    #[must_use]
    pub fn pid(mut self, pid: Option<u32>) -> Self {
        self.pid = pid;
        self
    }

    /// Set whether copy mode is active.
    #[must_use]
    pub fn copy_mode(mut self, copy_mode: bool) -> Self {
        self.copy_mode = copy_mode;
        self
    }

    /// Set whether the window is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set whether command mode is active.
    #[must_use]
    pub fn command_mode(mut self, command_mode: bool) -> Self {
        self.command_mode = command_mode;
        self
    }

    /// Set whether the client is urgent.
    #[must_use]
    pub fn urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// Text of the row before padding.
    #[must_use]
    pub fn label(&self) -> String {
        let Some(id) = self.id else {
            return String::new();
        };
        let mut label = format!("#{id}");
        if let Some(pid) = self.pid {
            label.push_str(&format!(" ({pid})"));
        }
        if !self.title.is_empty() {
            label.push_str(" | ");
            label.push_str(self.title);
        }
        label.push(' ');
        label
    }

    fn style(&self) -> Style {
        let style = if self.focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if self.urgent {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if self.focused && self.command_mode {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }
}

impl Widget for TitleBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }
        let fill = if self.copy_mode { '▒' } else { '─' };
        let style = self.style();
        let label = self.label();
        let mut chars = label.chars().filter(|c| !c.is_control());
        for col in 0..area.width {
            let cell = &mut buf[(area.x + col, area.y)];
            cell.set_char(chars.next().unwrap_or(fill));
            cell.set_style(style);
        }
    }
}

/// Vertical line between side-by-side windows.
pub struct Divider {
    /// Draw a junction on the last row, where it meets a title row.
    junction: bool,
}

impl Divider {
    /// Create a divider.
    #[must_use]
    pub fn new(junction: bool) -> Self {
        Self { junction }
    }
}

impl Widget for Divider {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        let style = Style::default().fg(Color::DarkGray);
        for row in 0..area.height {
            let last = row + 1 == area.height;
            let symbol = if last && self.junction { '┴' } else { '│' };
            for col in 0..area.width {
                let cell = &mut buf[(area.x + col, area.y + row)];
                cell.set_char(symbol);
                cell.set_style(style);
            }
        }
    }
}

/// One-row bar showing the status FIFO text, plus the pending key
/// sequence while in command mode.
pub struct StatusBar<'a> {
    /// Text last read from the status FIFO.
    text: &'a str,
    /// Pending command-mode input, shown at the left.
    pending: Option<String>,
}

impl<'a> StatusBar<'a> {
    /// Create a status bar.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pending: None,
        }
    }

    /// Show pending command input.
    #[must_use]
    pub fn pending(mut self, pending: Option<String>) -> Self {
        self.pending = pending;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }
        let line = match &self.pending {
            Some(pending) => format!("[{pending}] {}", self.text),
            None => self.text.to_string(),
        };
        let style = Style::default().add_modifier(Modifier::REVERSED);
        let mut chars = line.chars().filter(|c| !c.is_control());
        for col in 0..area.width {
            let cell = &mut buf[(area.x + col, area.y)];
            cell.set_char(chars.next().unwrap_or(' '));
            cell.set_style(style);
        }
    }
}

/// Convert a vt100 color to a ratatui color.
fn convert_color(color: vt100::Color) -> Color {
    match color {
        vt100::Color::Default => Color::Reset,
        vt100::Color::Idx(idx) => Color::Indexed(idx),
        vt100::Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_screen_widget_copies_cells() {
        let mut parser = vt100::Parser::new(2, 10, 0);
        parser.process(b"hi \x1b[31mred\x1b[m");
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        ScreenWidget::new(parser.screen()).render(area, &mut buf);

        assert_eq!(row_text(&buf, 0), "hi red    ");
        assert_eq!(buf[(3, 0)].fg, Color::Indexed(1));
        assert_eq!(buf[(0, 0)].fg, Color::Reset);
    }

    #[test]
    fn test_title_bar_label_and_fill() {
        let area = Rect::new(0, 0, 24, 1);
        let mut buf = Buffer::empty(area);
        TitleBar::new(3, "vim").pid(Some(42)).render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "#3 (42) | vim ──────────");

        let mut buf = Buffer::empty(area);
        TitleBar::new(3, "vim").copy_mode(true).render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "#3 | vim ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒");
    }

    #[test]
    fn test_title_bar_highlight() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        TitleBar::new(1, "sh")
            .focused(true)
            .command_mode(true)
            .render(area, &mut buf);
        assert!(buf[(0, 0)].modifier.contains(Modifier::REVERSED));

        let mut buf = Buffer::empty(area);
        TitleBar::new(1, "sh").urgent(true).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Yellow);
    }

    #[test]
    fn test_empty_title_bar_is_all_fill() {
        let area = Rect::new(0, 0, 5, 1);
        let mut buf = Buffer::empty(area);
        TitleBar::empty().render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "─────");
    }

    #[test]
    fn test_divider_junction() {
        let area = Rect::new(0, 0, 1, 3);
        let mut buf = Buffer::empty(area);
        Divider::new(true).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "│");
        assert_eq!(buf[(0, 2)].symbol(), "┴");
    }

    #[test]
    fn test_status_bar_shows_pending_input() {
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new("load 0.5")
            .pending(Some("12".to_string()))
            .render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "[12] load 0.");
    }
}
