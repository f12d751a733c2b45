//! Output redirection: opening the target file and running a command into it.

use crate::builtin::Builtin;
use crate::command::{BuiltinIo, Flow, OutputSink};
use crate::env::Environment;
use crate::external;
use crate::io_adapters::MemWriter;
use crate::lexer::ArgumentVector;
use crate::parser::{RedirectKind, Redirection};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// How a redirection target is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    Truncate,
    Append,
}

#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("input redirection not yet implemented")]
    InputUnsupported,
    #[error("redirection error: missing filename after '{0}'.")]
    MissingFilename(&'static str),
    #[error("redirection error: Failed to open file '{path}'. Error {code}.")]
    Open {
        path: String,
        code: i32,
        #[source]
        source: io::Error,
    },
}

/// Open `path` for writing.
///
/// Truncate mode creates or empties the file. Append mode creates it if needed
/// and positions every write at the end.
pub fn open_sink(path: &Path, mode: SinkMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    match mode {
        SinkMode::Truncate => options.write(true).create(true).truncate(true),
        SinkMode::Append => options.create(true).append(true),
    };
    options.open(path)
}

/// Validate a redirection and open its target.
pub fn open_target(redirection: &Redirection) -> Result<File, RedirectError> {
    let mode = match redirection.kind {
        RedirectKind::Truncate => SinkMode::Truncate,
        RedirectKind::Append => SinkMode::Append,
        RedirectKind::Input => return Err(RedirectError::InputUnsupported),
    };
    let target = redirection
        .target
        .as_deref()
        .ok_or(RedirectError::MissingFilename(redirection.kind.operator()))?;
    open_sink(Path::new(target), mode).map_err(|source| RedirectError::Open {
        path: target.to_string(),
        code: source.raw_os_error().unwrap_or(-1),
        source,
    })
}

/// Run a line containing a redirection.
///
/// Built-ins render into a buffer that is written to the file in one go;
/// anything else is started as a child with its output bound to the file.
/// The file is closed before this returns, on every path.
pub fn run_redirected(
    args: &ArgumentVector,
    redirection: &Redirection,
    env: &Environment,
    stderr: &mut dyn Write,
) -> Flow {
    let file = match open_target(redirection) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("redirection rejected: {e:?}");
            report(stderr, &format!("shell: {e}"));
            return Flow::Continue;
        }
    };
    let words = &args[..redirection.position];
    match args.command().and_then(Builtin::from_name) {
        Some(builtin) => run_builtin_into(builtin, words, file, env, stderr),
        None => external::launch(words, OutputSink::File(file), env, stderr),
    }
}

fn run_builtin_into(
    builtin: Builtin,
    words: &[String],
    mut file: File,
    env: &Environment,
    stderr: &mut dyn Write,
) -> Flow {
    let (mut out, captured) = MemWriter::with_handle();
    let mut err = out.clone();
    {
        let mut io = BuiltinIo::captured(&mut out, &mut err);
        if builtin.supports_redirection() {
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            builtin.run(&words, &mut io, env);
        } else if let Err(e) = io.error(&format!(
            "redirection not supported for '{}'",
            builtin.name()
        )) {
            log::warn!("could not capture output: {e}");
        }
    }
    let buffer = captured.borrow();
    if let Err(e) = file.write_all(&buffer) {
        report(
            stderr,
            &format!("shell: write error: {}", e.raw_os_error().unwrap_or(-1)),
        );
    }
    Flow::Continue
}

fn report(stderr: &mut dyn Write, message: &str) {
    if let Err(e) = writeln!(stderr, "{message}") {
        log::warn!("could not report `{message}`: {e}");
    }
}
