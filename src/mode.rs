//! Input mode state machine.

use crate::binding::{Keymap, TableId};
use crate::command::{Action, Command};

/// Which binding table input goes through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Bytes pass through to the focused client unless bound.
    #[default]
    Keypress,
    /// Bytes are commands.
    Command,
}

impl Mode {
    /// Parse the argument of `change_state`. Anything but `command` is keypress.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("command") => Self::Command,
            _ => Self::Keypress,
        }
    }
}

/// What one input byte resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A binding completed.
    Execute(Action),
    /// The byte continued a binding; more input is needed.
    Pending,
    /// The bytes typed so far, this one included, match no binding.
    Unbound(Vec<u8>),
}

/// Current mode, the partially typed sequence, and the numeric prefix.
#[derive(Clone, Debug)]
pub struct ModeState {
    mode: Mode,
    entry: Vec<u8>,
    count: u32,
    cursor: TableId,
}

impl ModeState {
    /// Start in keypress mode at the root of its table.
    #[must_use]
    pub fn new(keymap: &Keymap) -> Self {
        Self {
            mode: Mode::Keypress,
            entry: Vec::new(),
            count: 0,
            cursor: keymap.root(Mode::Keypress),
        }
    }

    /// Active mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Bytes typed toward the current binding, digits included.
    #[must_use]
    pub fn entry(&self) -> &[u8] {
        &self.entry
    }

    /// Accumulated numeric prefix; 0 means none was typed.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the next byte starts a fresh sequence.
    #[must_use]
    pub fn at_root(&self, keymap: &Keymap) -> bool {
        self.cursor == keymap.root(self.mode)
    }

    /// Advance through the trie by one byte.
    pub fn feed(&mut self, keymap: &Keymap, byte: u8) -> Dispatch {
        let node = keymap.node(self.cursor, byte);
        if let Some(action) = &node.action {
            self.entry.push(byte);
            self.cursor = node.next.unwrap_or_else(|| keymap.root(self.mode));
            Dispatch::Execute(action.clone())
        } else if let Some(next) = node.next {
            self.entry.push(byte);
            self.cursor = next;
            Dispatch::Pending
        } else {
            let mut keys = std::mem::take(&mut self.entry);
            keys.push(byte);
            self.count = 0;
            self.cursor = keymap.root(self.mode);
            Dispatch::Unbound(keys)
        }
    }

    /// Switch modes, dropping any partial sequence.
    pub fn set_mode(&mut self, keymap: &Keymap, mode: Mode) {
        self.mode = mode;
        self.entry.clear();
        self.cursor = keymap.root(mode);
    }

    /// Append a decimal digit to the count.
    pub fn push_digit(&mut self, digit: u32) {
        self.count = self.count.saturating_mul(10).saturating_add(digit);
    }

    /// Bookkeeping after a command ran.
    ///
    /// Every command but `digit` consumes the count. The entry buffer is
    /// cleared once nothing is pending.
    pub fn finish(&mut self, keymap: &Keymap, command: Command) {
        if command != Command::Digit {
            self.count = 0;
        }
        if self.at_root(keymap) && self.count == 0 {
            self.entry.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keymap() -> Keymap {
        let mut keymap = Keymap::new();
        keymap
            .bind(Mode::Keypress, &[0x07], Action::with_args(Command::ChangeState, ["command"]))
            .unwrap();
        keymap.bind(Mode::Command, b"qq", Action::new(Command::Quit)).unwrap();
        keymap.bind(Mode::Command, b"1", Action::new(Command::Digit)).unwrap();
        keymap
            .bind_repeating(Mode::Command, b"wj", Action::with_args(Command::Mov, ["down"]))
            .unwrap();
        keymap
    }

    #[test]
    fn test_unbound_keypress_bytes_pass_through() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        assert_eq!(state.feed(&keymap, b'a'), Dispatch::Unbound(vec![b'a']));
        assert!(state.at_root(&keymap));
    }

    #[test]
    fn test_multi_key_sequence() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        state.set_mode(&keymap, Mode::Command);

        assert_eq!(state.feed(&keymap, b'q'), Dispatch::Pending);
        assert_eq!(state.entry(), b"q");
        assert_eq!(
            state.feed(&keymap, b'q'),
            Dispatch::Execute(Action::new(Command::Quit))
        );
        assert!(state.at_root(&keymap));
    }

    #[test]
    fn test_broken_sequence_returns_typed_bytes() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        state.set_mode(&keymap, Mode::Command);

        state.feed(&keymap, b'q');
        assert_eq!(state.feed(&keymap, b'x'), Dispatch::Unbound(b"qx".to_vec()));
        assert!(state.entry().is_empty());
        assert!(state.at_root(&keymap));
    }

    #[test]
    fn test_unbound_command_key_restarts_at_command_root() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        state.set_mode(&keymap, Mode::Command);
        state.push_digit(4);

        state.feed(&keymap, b'q');
        assert_eq!(state.feed(&keymap, b'z'), Dispatch::Unbound(b"qz".to_vec()));
        assert_eq!(state.mode(), Mode::Command);
        assert_eq!(state.count(), 0);
        assert!(state.at_root(&keymap));

        state.feed(&keymap, b'q');
        assert_eq!(
            state.feed(&keymap, b'q'),
            Dispatch::Execute(Action::new(Command::Quit))
        );
    }

    #[test]
    fn test_count_survives_digits_only() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        state.set_mode(&keymap, Mode::Command);

        for _ in 0..3 {
            assert!(matches!(state.feed(&keymap, b'1'), Dispatch::Execute(_)));
            state.push_digit(1);
            state.finish(&keymap, Command::Digit);
        }
        assert_eq!(state.count(), 111);
        assert_eq!(state.entry(), b"111");

        state.feed(&keymap, b'q');
        state.feed(&keymap, b'q');
        state.finish(&keymap, Command::Quit);
        assert_eq!(state.count(), 0);
        assert!(state.entry().is_empty());
    }

    #[test]
    fn test_count_saturates() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        for _ in 0..20 {
            state.push_digit(9);
        }
        assert_eq!(state.count(), u32::MAX);
    }

    #[test]
    fn test_repeating_binding_keeps_cursor() {
        let keymap = keymap();
        let mut state = ModeState::new(&keymap);
        state.set_mode(&keymap, Mode::Command);

        assert_eq!(state.feed(&keymap, b'w'), Dispatch::Pending);
        let down = Dispatch::Execute(Action::with_args(Command::Mov, ["down"]));
        assert_eq!(state.feed(&keymap, b'j'), down);
        assert!(!state.at_root(&keymap));
        assert_eq!(state.feed(&keymap, b'j'), down);
        assert_eq!(state.feed(&keymap, b'z'), Dispatch::Unbound(b"wjjz".to_vec()));
    }

    #[test]
    fn test_mode_from_arg() {
        assert_eq!(Mode::from_arg(Some("command")), Mode::Command);
        assert_eq!(Mode::from_arg(Some("keypress")), Mode::Keypress);
        assert_eq!(Mode::from_arg(None), Mode::Keypress);
    }
}
