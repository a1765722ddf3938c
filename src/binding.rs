//! Key binding trie.
//!
//! Bindings map byte sequences to actions. Each trie level is a table of
//! 256 nodes indexed by the next input byte; tables live in one arena and
//! refer to each other by index. A node either ends a binding (it has an
//! action) or continues one (it has a `next` table). A repeating binding
//! has both: its `next` points back at the table holding it, so the last
//! key can be pressed again without retyping the prefix.

use crate::command::{Action, MAX_BINDING_ARGS};
use crate::error::{Error, Result};
use crate::mode::Mode;

/// Index of a table in a [`Keymap`].
pub type TableId = usize;

/// One entry of a trie table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    /// Action run when the sequence ends here.
    pub action: Option<Action>,
    /// Table consulted for the following byte.
    pub next: Option<TableId>,
}

/// Outcome of resolving a whole key sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The sequence is bound to an action.
    Action(&'a Action),
    /// The sequence is a proper prefix of one or more bindings.
    Incomplete,
    /// Nothing is bound along this sequence.
    Unbound,
}

/// The binding tables of both modes.
#[derive(Clone, Debug)]
pub struct Keymap {
    tables: Vec<Vec<Node>>,
    keypress: TableId,
    command: TableId,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

impl Keymap {
    /// Create a keymap with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: vec![empty_table(), empty_table()],
            keypress: 0,
            command: 1,
        }
    }

    /// Root table of a mode.
    #[must_use]
    pub fn root(&self, mode: Mode) -> TableId {
        match mode {
            Mode::Keypress => self.keypress,
            Mode::Command => self.command,
        }
    }

    /// Node reached from `table` by `byte`.
    #[must_use]
    pub fn node(&self, table: TableId, byte: u8) -> &Node {
        &self.tables[table][usize::from(byte)]
    }

    /// Bind `keys` to `action` in `mode`.
    ///
    /// # Errors
    /// Returns an error if `keys` is empty, the action has too many
    /// arguments, or the sequence collides with an existing binding.
    pub fn bind(&mut self, mode: Mode, keys: &[u8], action: Action) -> Result<()> {
        self.insert(mode, keys, action, false)
    }

    /// Bind `keys` so that, once typed, its last byte repeats the action.
    ///
    /// # Errors
    /// Same as [`Keymap::bind`].
    pub fn bind_repeating(&mut self, mode: Mode, keys: &[u8], action: Action) -> Result<()> {
        self.insert(mode, keys, action, true)
    }

    fn insert(&mut self, mode: Mode, keys: &[u8], action: Action, repeat: bool) -> Result<()> {
        let Some((&last, prefix)) = keys.split_last() else {
            return Err(Error::EmptyBinding);
        };
        if action.args.len() > MAX_BINDING_ARGS {
            return Err(Error::TooManyArguments {
                command: action.command.name().to_string(),
                count: action.args.len(),
                max: MAX_BINDING_ARGS,
            });
        }

        let mut table = self.root(mode);
        for &byte in prefix {
            let node = &self.tables[table][usize::from(byte)];
            if node.action.is_some() {
                return Err(Error::BindingConflict(format_keys(keys)));
            }
            let next = node.next;
            table = match next {
                Some(next) => next,
                None => {
                    let next = self.tables.len();
                    self.tables.push(empty_table());
                    self.tables[table][usize::from(byte)].next = Some(next);
                    next
                }
            };
        }

        let node = &mut self.tables[table][usize::from(last)];
        if node.action.is_some() || node.next.is_some() {
            return Err(Error::BindingConflict(format_keys(keys)));
        }
        node.action = Some(action);
        if repeat {
            node.next = Some(table);
        }
        Ok(())
    }

    /// Resolve a complete key sequence typed from the root of `mode`.
    #[must_use]
    pub fn lookup(&self, mode: Mode, keys: &[u8]) -> Lookup<'_> {
        let mut table = self.root(mode);
        for (i, &byte) in keys.iter().enumerate() {
            let node = self.node(table, byte);
            if let Some(action) = &node.action {
                return if i + 1 == keys.len() {
                    Lookup::Action(action)
                } else {
                    Lookup::Unbound
                };
            }
            match node.next {
                Some(next) => table = next,
                None => return Lookup::Unbound,
            }
        }
        if keys.is_empty() {
            Lookup::Unbound
        } else {
            Lookup::Incomplete
        }
    }

    /// Every binding of `mode` as (keys, action), in byte order.
    #[must_use]
    pub fn bindings(&self, mode: Mode) -> Vec<(Vec<u8>, &Action)> {
        let mut out = Vec::new();
        let mut keys = Vec::new();
        self.collect(self.root(mode), &mut keys, &mut out);
        out
    }

    fn collect<'a>(
        &'a self,
        table: TableId,
        keys: &mut Vec<u8>,
        out: &mut Vec<(Vec<u8>, &'a Action)>,
    ) {
        for (byte, node) in (0..=u8::MAX).zip(&self.tables[table]) {
            keys.push(byte);
            if let Some(action) = &node.action {
                out.push((keys.clone(), action));
            } else if let Some(next) = node.next {
                self.collect(next, keys, out);
            }
            keys.pop();
        }
    }

    /// Human-readable listing of both modes' bindings.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = String::new();
        for (mode, heading) in [(Mode::Keypress, "keypress mode"), (Mode::Command, "command mode")] {
            text.push_str(heading);
            text.push('\n');
            for (keys, action) in self.bindings(mode) {
                text.push_str(&format!("  {:<10} {}\n", format_keys(&keys), action));
            }
        }
        text
    }
}

fn empty_table() -> Vec<Node> {
    vec![Node::default(); 256]
}

/// Render key bytes readably, control bytes in caret notation.
#[must_use]
pub fn format_keys(keys: &[u8]) -> String {
    let mut out = String::new();
    for &b in keys {
        match b {
            b' ' => out.push_str("<space>"),
            0x7f => out.push_str("^?"),
            0..=0x1f => {
                out.push('^');
                out.push(char::from(b + 0x40));
            }
            0x80..=0xff => out.push_str(&format!("\\x{b:02x}")),
            _ => out.push(char::from(b)),
        }
    }
    out
}

/// Parse a key description: `^x` is the control byte of `x`, anything
/// else is taken literally.
#[must_use]
pub fn parse_keys(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut keys = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'^', Some(&c)) if c == b'?' => {
                keys.push(0x7f);
                i += 2;
            }
            (b'^', Some(&c)) if c.is_ascii_alphabetic() || (b'@'..=b'_').contains(&c) => {
                keys.push(c.to_ascii_uppercase() & 0x1f);
                i += 2;
            }
            (b, _) => {
                keys.push(b);
                i += 1;
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    fn quit() -> Action {
        Action::new(Command::Quit)
    }

    #[test]
    fn test_lookup_single_and_multi_key() {
        let mut keymap = Keymap::new();
        keymap.bind(Mode::Command, b"r", Action::new(Command::Redraw)).unwrap();
        keymap.bind(Mode::Command, b"qq", quit()).unwrap();

        assert_eq!(
            keymap.lookup(Mode::Command, b"r"),
            Lookup::Action(&Action::new(Command::Redraw))
        );
        assert_eq!(keymap.lookup(Mode::Command, b"q"), Lookup::Incomplete);
        assert_eq!(keymap.lookup(Mode::Command, b"qq"), Lookup::Action(&quit()));
        assert_eq!(keymap.lookup(Mode::Command, b"qx"), Lookup::Unbound);
        assert_eq!(keymap.lookup(Mode::Keypress, b"qq"), Lookup::Unbound);
    }

    #[test]
    fn test_lookup_is_repeatable() {
        let mut keymap = Keymap::new();
        keymap.bind(Mode::Command, b"xx", Action::new(Command::KillClient)).unwrap();
        let first = keymap.lookup(Mode::Command, b"xx").clone();
        let second = keymap.lookup(Mode::Command, b"xx");
        assert_eq!(first, second);
    }

    #[test]
    fn test_prefix_with_action_conflicts() {
        let mut keymap = Keymap::new();
        keymap.bind(Mode::Command, b"q", quit()).unwrap();
        let err = keymap.bind(Mode::Command, b"qq", quit()).unwrap_err();
        assert!(matches!(err, Error::BindingConflict(_)));
    }

    #[test]
    fn test_binding_over_prefix_conflicts() {
        let mut keymap = Keymap::new();
        keymap.bind(Mode::Command, b"qq", quit()).unwrap();
        assert!(keymap.bind(Mode::Command, b"q", quit()).is_err());
        assert!(keymap.bind(Mode::Command, b"qq", quit()).is_err());
    }

    #[test]
    fn test_empty_and_oversized_bindings_rejected() {
        let mut keymap = Keymap::new();
        assert!(matches!(
            keymap.bind(Mode::Command, b"", quit()),
            Err(Error::EmptyBinding)
        ));
        let action = Action::with_args(Command::Send, ["a", "b", "c", "d"]);
        assert!(matches!(
            keymap.bind(Mode::Command, b"s", action),
            Err(Error::TooManyArguments { count: 4, .. })
        ));
    }

    #[test]
    fn test_repeating_binding_loops_to_own_table() {
        let mut keymap = Keymap::new();
        let down = Action::with_args(Command::Mov, ["down"]);
        keymap.bind_repeating(Mode::Command, b"wj", down.clone()).unwrap();

        let root = keymap.root(Mode::Command);
        let table = keymap.node(root, b'w').next.unwrap();
        let node = keymap.node(table, b'j');
        assert_eq!(node.action.as_ref(), Some(&down));
        assert_eq!(node.next, Some(table));
        assert!(keymap.bind(Mode::Command, b"wjk", quit()).is_err());
    }

    #[test]
    fn test_bindings_listing() {
        let mut keymap = Keymap::new();
        keymap.bind(Mode::Command, b"qq", quit()).unwrap();
        keymap.bind(Mode::Command, b"c", Action::new(Command::Create)).unwrap();
        let listed: Vec<Vec<u8>> = keymap
            .bindings(Mode::Command)
            .into_iter()
            .map(|(keys, _)| keys)
            .collect();
        assert_eq!(listed, vec![b"c".to_vec(), b"qq".to_vec()]);
        assert!(keymap.describe().contains("qq"));
    }

    #[test]
    fn test_key_notation() {
        assert_eq!(parse_keys("^g"), vec![0x07]);
        assert_eq!(parse_keys("^Lx"), vec![0x0c, b'x']);
        assert_eq!(parse_keys("^"), vec![b'^']);
        assert_eq!(format_keys(&[0x07, b'q', b' ']), "^Gq<space>");
        assert_eq!(format_keys(&parse_keys("^[")), "^[");
    }
}
