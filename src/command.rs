//! Commands and the actions that carry them.

use std::fmt;

/// Most arguments a key binding may carry.
pub const MAX_BINDING_ARGS: usize = 3;

/// Most arguments accepted from a command FIFO line.
pub const MAX_FIFO_ARGS: usize = 8;

/// Every command the manager understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Spawn a client: `[cmd] [title] [cwd]`.
    Create,
    /// Split the focused window: `[v]`.
    Split,
    /// Move focus: `up|down|left|right`, repeated by count.
    Mov,
    /// Focus the client whose id is the count.
    FocusN,
    /// Focus like `focusn`, then return to keypress mode.
    FocusTransition,
    /// Accumulate the typed digit into the count.
    Digit,
    /// Switch mode: `command|keypress`.
    ChangeState,
    /// Start copy mode: `editor|pager [bindings]`.
    CopyMode,
    /// Send the register to the focused client.
    Paste,
    /// Stop the manager.
    Quit,
    /// Repaint the whole screen.
    Redraw,
    /// Scroll the focused client: `[pages]`.
    Scrollback,
    /// Send the argument bytes to the focused client.
    Send,
    /// Send the kill signal to the selected client.
    KillClient,
    /// Send the signal numbered by the count to the selected client.
    SignalClient,
    /// Set the kill signal to the count.
    ChangeKillSignal,
    /// Add a keypress-mode binding: `keys command [args..]`.
    Bind,
}

impl Command {
    /// All commands, in table order.
    pub const ALL: [Self; 17] = [
        Self::Create,
        Self::Split,
        Self::Mov,
        Self::FocusN,
        Self::FocusTransition,
        Self::Digit,
        Self::ChangeState,
        Self::CopyMode,
        Self::Paste,
        Self::Quit,
        Self::Redraw,
        Self::Scrollback,
        Self::Send,
        Self::KillClient,
        Self::SignalClient,
        Self::ChangeKillSignal,
        Self::Bind,
    ];

    /// Name used in FIFO lines and binding listings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Split => "split",
            Self::Mov => "mov",
            Self::FocusN => "focusn",
            Self::FocusTransition => "focus_transition",
            Self::Digit => "digit",
            Self::ChangeState => "change_state",
            Self::CopyMode => "copymode",
            Self::Paste => "paste",
            Self::Quit => "quit",
            Self::Redraw => "redraw",
            Self::Scrollback => "scrollback",
            Self::Send => "send",
            Self::KillClient => "killclient",
            Self::SignalClient => "signalclient",
            Self::ChangeKillSignal => "change_kill_signal",
            Self::Bind => "bind",
        }
    }

    /// Look a command up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    /// The command to run.
    pub command: Command,
    /// Arguments handed to it.
    pub args: Vec<String>,
}

impl Action {
    /// Create an action without arguments.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }

    /// Create an action with arguments.
    #[must_use]
    pub fn with_args<I, S>(command: Command, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Argument at `index`, if given.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command.name())?;
        for arg in &self.args {
            write!(f, " {arg:?}")?;
        }
        Ok(())
    }
}

/// Parse one command FIFO line.
///
/// Returns `None` for blank lines and unknown commands. Arguments past
/// [`MAX_FIFO_ARGS`] are dropped.
#[must_use]
pub fn parse_line(line: &str) -> Option<Action> {
    let mut words = tokenize(line).into_iter();
    let name = words.next()?;
    let Some(command) = Command::from_name(&name) else {
        tracing::debug!("ignoring unknown fifo command {:?}", name);
        return None;
    };
    let args: Vec<String> = words.collect();
    if args.len() > MAX_FIFO_ARGS {
        tracing::warn!(command = %command, "dropping {} extra arguments", args.len() - MAX_FIFO_ARGS);
    }
    Some(Action::with_args(command, args.into_iter().take(MAX_FIFO_ARGS)))
}

/// Split a line into words on whitespace.
///
/// Single or double quotes group words; inside or outside quotes a
/// backslash escapes a quote or another backslash. Other backslashes are
/// kept as typed.
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('\\' | '\'' | '"')) => {
                if let Some(next) = chars.next() {
                    word.push(next);
                }
                in_word = true;
            }
            '\'' | '"' if quote == Some(c) => quote = None,
            '\'' | '"' if quote.is_none() => {
                quote = Some(c);
                in_word = true;
            }
            c if c.is_whitespace() && quote.is_none() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}
