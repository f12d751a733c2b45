//! Gatekeeping before the shell starts: a few attempts at a username and password.

use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Could not open user database ({}).", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Checks a username and password against some credential store.
pub trait Authenticator {
    fn authenticate(&self, username: &str, password: &str) -> Result<bool, LoginError>;
}

/// A text file of `username:password` lines.
///
/// Fields are the first two non-empty pieces between colons, so neither field
/// can contain a colon. Lines with fewer than two fields are skipped and the
/// first matching line wins.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = line.split(':').filter(|field| !field.is_empty());
    Some((fields.next()?, fields.next()?))
}

impl Authenticator for CredentialFile {
    fn authenticate(&self, username: &str, password: &str) -> Result<bool, LoginError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| LoginError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        Ok(contents
            .lines()
            .filter_map(parse_line)
            .any(|(user, pass)| user == username && pass == password))
    }
}

/// Interactive source of credentials.
pub trait CredentialPrompt {
    /// `None` if the user closed the input.
    fn username(&mut self) -> Result<Option<String>>;

    /// Read a password without echoing it. `None` if the user closed the input.
    fn password(&mut self) -> Result<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted { username: String },
    /// Every attempt failed.
    Denied,
    /// Input ended before a login succeeded.
    Aborted,
}

/// Ask for credentials up to `max_attempts` times.
///
/// Progress messages go to `out`; an unreadable credential store is reported
/// and counts as a failed attempt.
pub fn login(
    prompt: &mut dyn CredentialPrompt,
    auth: &dyn Authenticator,
    max_attempts: u32,
    out: &mut dyn Write,
) -> Result<LoginOutcome> {
    for attempt in 1..=max_attempts {
        let Some(username) = prompt.username()? else {
            return Ok(LoginOutcome::Aborted);
        };
        let Some(password) = prompt.password()? else {
            return Ok(LoginOutcome::Aborted);
        };
        let username = username.trim_end_matches(['\r', '\n']).to_string();
        let password = password.trim_end_matches(['\r', '\n']);

        let granted = match auth.authenticate(&username, password) {
            Ok(granted) => granted,
            Err(e) => {
                log::error!("{e:#}");
                writeln!(out, "Error: {e}")?;
                false
            }
        };
        if granted {
            log::info!("login granted to {username} on attempt {attempt}");
            writeln!(out, "Login successful!\n")?;
            return Ok(LoginOutcome::Granted { username });
        }
        log::warn!("login attempt {attempt} of {max_attempts} failed for {username}");
        writeln!(out, "Invalid username or password. Please try again.\n")?;
    }
    Ok(LoginOutcome::Denied)
}
