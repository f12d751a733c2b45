use std::fs::File;
use std::io::{self, Write};
use std::process::Stdio;

/// Whether the shell loop keeps reading lines after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl Flow {
    pub fn should_continue(self) -> bool {
        self == Flow::Continue
    }
}

/// Where a child process sends its standard output and standard error.
///
/// A file sink is owned here for the duration of one launch and closed when
/// the sink is dropped.
#[derive(Debug)]
pub enum OutputSink {
    Console,
    File(File),
}

impl OutputSink {
    /// Handles for the child's stdout and stderr.
    ///
    /// Both streams of a file sink point at the same open file.
    pub fn stdio(&self) -> io::Result<(Stdio, Stdio)> {
        match self {
            OutputSink::Console => Ok((Stdio::inherit(), Stdio::inherit())),
            OutputSink::File(file) => {
                let out = file.try_clone()?;
                let err = file.try_clone()?;
                Ok((out.into(), err.into()))
            }
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, OutputSink::Console)
    }
}

/// Streams and line ending used by one built-in invocation.
///
/// On the console lines end in `\n`. When a built-in is captured for a
/// redirection, both streams feed one buffer and lines end in `\r\n`.
pub struct BuiltinIo<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub eol: &'static str,
}

impl<'a> BuiltinIo<'a> {
    pub const CONSOLE_EOL: &'static str = "\n";
    pub const FILE_EOL: &'static str = "\r\n";

    pub fn console(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self {
            stdout,
            stderr,
            eol: Self::CONSOLE_EOL,
        }
    }

    pub fn captured(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self {
            stdout,
            stderr,
            eol: Self::FILE_EOL,
        }
    }

    /// Write `text` followed by the line ending to stdout.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        write!(self.stdout, "{}{}", text, self.eol)
    }

    /// Write a `shell: `-prefixed diagnostic line to stderr.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        write!(self.stderr, "shell: {}{}", message, self.eol)
    }
}
