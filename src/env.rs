use std::collections::HashMap;
use std::env as stdenv;
use std::io;
use std::path::{Path, PathBuf};

/// The parts of process state the shell consults.
///
/// The working directory is not cached: it is process-global and read from the
/// OS whenever it is needed, so `cd` only has to change it in one place.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variables handed to child processes and used for `PATH` lookup.
    pub vars: HashMap<String, String>,
    /// Directory a bare `cd` switches to.
    pub root_dir: PathBuf,
}

impl Environment {
    /// Capture the process variables, with `root_dir` as the `cd` default.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: stdenv::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
                .collect(),
            root_dir: root_dir.into(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    pub fn current_dir(&self) -> io::Result<PathBuf> {
        stdenv::current_dir()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

/// The filesystem root used when no `root_dir` is configured.
pub fn default_root_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}
