use crate::interpreter::LineSource;
use crate::login::CredentialPrompt;
use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::{ColorMode, Completer, Editor, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::cell::RefCell;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed writer for capturing the output of a redirected built-in.
///
/// Clones share one buffer, so a built-in's stdout and stderr can both be
/// captured in the order they were written.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Line-editor helper that hides input while `masking` is set.
#[derive(Completer, Helper, Hinter, Validator, Default)]
pub struct MaskingHelper {
    masking: bool,
}

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Cow::Owned("*".repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        self.masking
    }
}

/// The interactive terminal: login prompts and the shell prompt.
pub struct Terminal {
    editor: Editor<MaskingHelper, DefaultHistory>,
    record_history: bool,
}

impl Terminal {
    pub fn new(record_history: bool) -> Result<Self> {
        let mut editor = Editor::<MaskingHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(MaskingHelper::default()));
        Ok(Self {
            editor,
            record_history,
        })
    }

    fn set_masking(&mut self, masking: bool) {
        self.editor.set_color_mode(if masking {
            ColorMode::Forced
        } else {
            ColorMode::Enabled
        });
        if let Some(helper) = self.editor.helper_mut() {
            helper.masking = masking;
        }
    }

    /// Read one line; `None` on end-of-input or Ctrl-C.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl CredentialPrompt for Terminal {
    fn username(&mut self) -> Result<Option<String>> {
        self.prompt("Username: ")
    }

    fn password(&mut self) -> Result<Option<String>> {
        self.set_masking(true);
        let password = self.prompt("Password: ");
        self.set_masking(false);
        password
    }
}

impl LineSource for Terminal {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if self.record_history && !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the half-typed line and re-prompts.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_buffer() {
        let (mut out, handle) = MemWriter::with_handle();
        let mut err = out.clone();
        out.write_all(b"one ").unwrap();
        err.write_all(b"two ").unwrap();
        out.write_all(b"three").unwrap();
        assert_eq!(&*handle.borrow(), b"one two three");
    }

    #[test]
    fn masking_hides_every_character() {
        let mut helper = MaskingHelper::default();
        assert_eq!(helper.highlight("hunter2", 0), "hunter2");
        assert!(!helper.highlight_char("hunter2", 0, CmdKind::Other));
        helper.masking = true;
        assert_eq!(helper.highlight("pässwd", 0), "******");
        assert!(helper.highlight_char("x", 0, CmdKind::Other));
    }
}
