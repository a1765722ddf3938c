//! Copy mode: an editor or pager run over a client's scrollback.
//!
//! The client's history is written to a scratch file and a helper program
//! is started on it in its own pty. While it runs, the helper's screen
//! replaces the client's. When an editor exits, whatever it saved becomes
//! the paste register.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::client::Session;
use crate::error::{Error, Result};

/// Which helper copy mode runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyKind {
    /// Editable copy; the saved file is captured into the register.
    Editor,
    /// Read-only view with colors preserved.
    Pager,
}

impl CopyKind {
    /// Parse the first argument of the `copymode` command.
    ///
    /// # Errors
    /// Returns an error for anything but `editor` or `pager`.
    pub fn from_arg(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("editor") => Ok(Self::Editor),
            Some("pager") => Ok(Self::Pager),
            Some(other) => Err(Error::InvalidArgument {
                command: "copymode",
                value: other.to_string(),
            }),
        }
    }

    /// Environment variables consulted for the helper, in order.
    #[must_use]
    pub fn env_vars(self) -> &'static [&'static str] {
        match self {
            Self::Editor => &["TILEMUX_EDITOR", "VISUAL", "EDITOR"],
            Self::Pager => &["TILEMUX_PAGER", "PAGER"],
        }
    }

    /// Helper used when none of the variables is set.
    #[must_use]
    pub fn fallback(self) -> &'static str {
        match self {
            Self::Editor => "vi",
            Self::Pager => "less -R",
        }
    }

    /// Resolve the helper program through `lookup`.
    pub fn program(self, lookup: impl Fn(&str) -> Option<String>) -> String {
        self.env_vars()
            .iter()
            .filter_map(|var| lookup(var))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.fallback().to_string())
    }

    /// Label shown in the title row while the helper runs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Editor => "copy",
            Self::Pager => "view",
        }
    }
}

/// A helper session running over a client.
#[derive(Debug)]
pub struct CopySession {
    /// The helper's process and screen.
    pub session: Session,
    /// Scratch file holding the dumped content.
    pub file: NamedTempFile,
    /// Whether the file is read back into the register on exit.
    pub capture: bool,
    /// Title shown while the helper runs.
    pub title: String,
}

impl CopySession {
    /// Read back what the helper left in the scratch file.
    ///
    /// Returns `None` for pagers.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn finish(self) -> Result<Option<Vec<u8>>> {
        if !self.capture {
            return Ok(None);
        }
        // Editors may replace the file rather than rewrite it.
        Ok(Some(std::fs::read(self.file.path())?))
    }
}

/// Write `content` to a fresh scratch file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn scratch_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().prefix("tilemux-").tempfile()?;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Shell command line starting `program` on `path` at `line`.
#[must_use]
pub fn helper_command(program: &str, line: usize, path: &str) -> String {
    format!("exec {program} +{line} {}", shell_quote(path))
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Trim trailing whitespace before pasting.
#[must_use]
pub fn paste_payload(register: &[u8]) -> &[u8] {
    let end = register
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &register[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_arg() {
        assert_eq!(CopyKind::from_arg(None).unwrap(), CopyKind::Editor);
        assert_eq!(CopyKind::from_arg(Some("pager")).unwrap(), CopyKind::Pager);
        assert!(CopyKind::from_arg(Some("emacs")).is_err());
    }

    #[test]
    fn test_program_lookup_order() {
        let env = |var: &str| match var {
            "VISUAL" => Some("nvim".to_string()),
            "EDITOR" => Some("nano".to_string()),
            _ => None,
        };
        assert_eq!(CopyKind::Editor.program(env), "nvim");
        assert_eq!(CopyKind::Pager.program(env), "less -R");
        assert_eq!(
            CopyKind::Pager.program(|v| (v == "TILEMUX_PAGER").then(|| "most".to_string())),
            "most"
        );
    }

    #[test]
    fn test_empty_variable_is_skipped() {
        let env = |var: &str| match var {
            "TILEMUX_EDITOR" => Some(String::new()),
            "EDITOR" => Some("ed".to_string()),
            _ => None,
        };
        assert_eq!(CopyKind::Editor.program(env), "ed");
    }

    #[test]
    fn test_helper_command_quotes_path() {
        assert_eq!(
            helper_command("vi", 12, "/tmp/a b"),
            "exec vi +12 '/tmp/a b'"
        );
        assert_eq!(helper_command("vi", 1, "it's"), r"exec vi +1 'it'\''s'");
    }

    #[test]
    fn test_paste_payload_trims_trailing_whitespace() {
        assert_eq!(paste_payload(b"echo hi\n\n  "), b"echo hi");
        assert_eq!(paste_payload(b"  \n"), b"");
        assert_eq!(paste_payload(b" a b"), b" a b");
    }

    #[test]
    fn test_scratch_file_roundtrip() {
        let file = scratch_file(b"history\n").unwrap();
        let text = std::fs::read(file.path()).unwrap();
        assert_eq!(text, b"history\n");
    }
}
