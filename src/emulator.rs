//! Terminal emulation for a client's screen.

use crate::client::TermSize;

/// Something a client's output asked the frontend to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The program set a new window title.
    Title(String),
    /// The program rang the bell.
    Bell,
}

/// A vt100 screen plus scrollback, fed with a client's output.
pub struct Emulator {
    parser: vt100::Parser,
    size: TermSize,
    bells: usize,
    title: String,
}

impl Emulator {
    /// Create an emulator of the given size keeping `scrollback` lines of history.
    #[must_use]
    pub fn new(size: TermSize, scrollback: usize) -> Self {
        let size = size.clamped();
        Self {
            parser: vt100::Parser::new(size.rows, size.cols, scrollback),
            size,
            bells: 0,
            title: String::new(),
        }
    }

    /// Feed output bytes and report title changes and bells they caused.
    pub fn process(&mut self, data: &[u8]) -> Vec<Notification> {
        self.parser.process(data);
        let screen = self.parser.screen();

        let mut notifications = Vec::new();
        let title = sanitize_title(screen.title());
        if title != self.title {
            self.title.clone_from(&title);
            notifications.push(Notification::Title(title));
        }
        let bells = screen.audible_bell_count();
        if bells != self.bells {
            self.bells = bells;
            notifications.push(Notification::Bell);
        }
        notifications
    }

    /// Current screen size.
    #[must_use]
    pub fn size(&self) -> TermSize {
        self.size
    }

    /// Resize the screen. Returns false when the size did not change.
    pub fn resize(&mut self, size: TermSize) -> bool {
        let size = size.clamped();
        if size == self.size {
            return false;
        }
        self.size = size;
        self.parser.set_size(size.rows, size.cols);
        true
    }

    /// The underlying vt100 screen, at the current scroll offset.
    #[must_use]
    pub fn screen(&self) -> &vt100::Screen {
        self.parser.screen()
    }

    /// Whether the program wants its cursor shown.
    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        !self.parser.screen().hide_cursor()
    }

    /// Cursor position as (row, col).
    #[must_use]
    pub fn cursor_position(&self) -> (u16, u16) {
        self.parser.screen().cursor_position()
    }

    /// Whether the program enabled application cursor keys.
    #[must_use]
    pub fn application_cursor(&self) -> bool {
        self.parser.screen().application_cursor()
    }

    /// Lines the view is scrolled back from the live screen.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.parser.screen().scrollback()
    }

    /// Scroll the view; positive moves back into history, negative toward
    /// the live screen. Zero returns to the live screen.
    pub fn scroll(&mut self, lines: isize) {
        let offset = if lines == 0 {
            0
        } else {
            self.scroll_offset().saturating_add_signed(lines)
        };
        self.parser.set_scrollback(offset);
    }

    /// Number of history lines currently stored.
    #[must_use]
    pub fn history_len(&mut self) -> usize {
        let current = self.scroll_offset();
        self.parser.set_scrollback(usize::MAX);
        let len = self.scroll_offset();
        self.parser.set_scrollback(current);
        len
    }

    /// Dump history followed by the screen, one line per row.
    ///
    /// With `colored` each row carries SGR escapes and ends with a reset.
    /// Trailing blank lines are dropped. The scroll offset is restored.
    pub fn content(&mut self, colored: bool) -> Vec<u8> {
        let current = self.scroll_offset();
        let history = self.history_len();
        let rows = usize::from(self.size.rows);
        let cols = self.size.cols;
        let total = history + rows;

        let mut lines: Vec<Vec<u8>> = Vec::with_capacity(total);
        let mut next = 0;
        while next < total {
            let offset = history.saturating_sub(next);
            self.parser.set_scrollback(offset);
            let first = history - offset;
            let skip = next - first;
            let screen = self.parser.screen();
            if colored {
                lines.extend(screen.rows_formatted(0, cols).skip(skip).map(|mut row| {
                    row.extend_from_slice(b"\x1b[m");
                    row
                }));
            } else {
                lines.extend(
                    screen
                        .rows(0, cols)
                        .skip(skip)
                        .map(|row| row.trim_end().as_bytes().to_vec()),
                );
            }
            next = first + rows;
        }
        self.parser.set_scrollback(current);

        while lines.last().is_some_and(|l| is_blank(l)) {
            lines.pop();
        }
        let mut out = Vec::new();
        for line in lines {
            out.extend_from_slice(&line);
            out.push(b'\n');
        }
        out
    }

    /// Line number of the first screen row within [`Emulator::content`],
    /// counted from one. Editors open here so the view matches the screen.
    #[must_use]
    pub fn content_start(&mut self) -> usize {
        self.history_len() + 1
    }
}

impl std::fmt::Debug for Emulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emulator")
            .field("size", &self.size)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace) || line == b"\x1b[m"
}

/// Keep printable characters and collapse runs of whitespace to one space.
#[must_use]
pub fn sanitize_title(raw: &str) -> String {
    let mut title = String::with_capacity(raw.len());
    let mut space = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            if !space {
                title.push(' ');
            }
            space = true;
        } else if !c.is_control() {
            title.push(c);
            space = false;
        }
    }
    title
}
