use crate::command::{Flow, OutputSink};
use crate::env::Environment;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Command that is not a builtin.
#[derive(Debug)]
pub struct ExternalCommand {
    program: OsString,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<OsString>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build a command from `words`, which must not contain the redirection.
    ///
    /// The name is replaced by its full path when it can be found; otherwise it
    /// is kept as typed and left for process creation to reject.
    pub fn resolve(env: &Environment, words: &[String]) -> Option<Self> {
        let (name, args) = words.split_first()?;
        if name.is_empty() {
            return None;
        }
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let program = match find_command_path(OsStr::new(&search_paths), Path::new(name)) {
            Some(found) => found.into_owned().into_os_string(),
            None => OsString::from(name),
        };
        Some(Self::new(program, args.to_vec()))
    }

    /// The program followed by its arguments, space-separated.
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Start the process with both output streams bound to `sink` and wait for it.
    ///
    /// The child's handle is released before returning.
    pub fn execute(self, sink: &OutputSink, env: &Environment) -> io::Result<ExitStatus> {
        let (stdout, stderr) = sink.stdio()?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .spawn()?;
        child.wait()
    }
}

/// Run `words` as a child process writing to `sink`.
///
/// Failures are reported on `stderr`. The child's exit status is logged but
/// not returned: the shell continues whatever the child's outcome.
pub fn launch(
    words: &[String],
    sink: OutputSink,
    env: &Environment,
    stderr: &mut dyn Write,
) -> Flow {
    let Some(cmd) = ExternalCommand::resolve(env, words) else {
        return Flow::Continue;
    };
    let command_line = cmd.command_line();
    log::debug!(
        "launching `{command_line}` ({})",
        if sink.is_console() { "console" } else { "file" }
    );
    match cmd.execute(&sink, env) {
        Ok(status) => {
            log::info!("`{command_line}` exited with {}", exit_code(status));
        }
        Err(e) => {
            let code = e.raw_os_error().unwrap_or(-1);
            if let Err(write_err) = writeln!(stderr, "shell: command failed ({code}): {e}") {
                log::warn!("could not report launch failure: {write_err}");
            }
        }
    }
    Flow::Continue
}

/// Numeric form of an exit status, for logging.
pub fn exit_code(exit_status: ExitStatus) -> i32 {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it is an executable file.
/// - `./foo` on Unix or any existing relative path on other platforms: returned as is.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && is_executable(path) {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.into_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<Cow<'_, Path>> {
    if is_executable(path) {
        return Some(Cow::Borrowed(path));
    }
    if cfg!(windows) && path.extension().is_none() {
        let with_exe = path.with_extension("exe");
        if is_executable(&with_exe) {
            return Some(Cow::Owned(with_exe));
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && (m.permissions().mode() & 0o111 != 0))
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
