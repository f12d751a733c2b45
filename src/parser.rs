//! Classifying a tokenized line: which built-in (if any) and which redirection.

use crate::builtin::Builtin;
use crate::lexer::ArgumentVector;

/// Kind of redirection
///
/// Only one operator per line is honoured; the first one found wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `>`: create the target, discarding any previous contents.
    Truncate,
    /// `>>`: create the target if needed and write after its current end.
    Append,
    /// `<`: recognised so it is never passed on as an argument, but not executed.
    Input,
}

impl RedirectKind {
    /// Map a word to an operator kind, if the word is exactly an operator.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            ">" => Some(Self::Truncate),
            ">>" => Some(Self::Append),
            "<" => Some(Self::Input),
            _ => None,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            Self::Truncate => ">",
            Self::Append => ">>",
            Self::Input => "<",
        }
    }
}

/// Returns true if `word` is one of the redirection operators.
pub fn is_operator(word: &str) -> bool {
    RedirectKind::from_word(word).is_some()
}

/// A redirection found in an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub kind: RedirectKind,
    /// Index of the operator; always at least 1.
    pub position: usize,
    /// The word following the operator, if there is one.
    pub target: Option<String>,
}

/// Find the first redirection operator, ignoring the command name.
pub fn find_redirection(args: &ArgumentVector) -> Option<Redirection> {
    args.iter()
        .enumerate()
        .skip(1)
        .find_map(|(position, word)| {
            RedirectKind::from_word(word).map(|kind| Redirection {
                kind,
                position,
                target: args.arg(position + 1).map(str::to_owned),
            })
        })
}

/// Exact, case-sensitive lookup in the built-in table.
#[cfg(test)]
pub fn is_builtin(name: &str) -> bool {
    Builtin::from_name(name).is_some()
}

/// What the interpreter should do with a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing was typed.
    Empty,
    /// A redirection is present; it takes precedence over built-in lookup.
    Redirected(Redirection),
    /// A built-in writing straight to the console.
    Builtin(Builtin),
    /// Anything else is started as a child process on the console.
    External,
}

pub fn classify(args: &ArgumentVector) -> Dispatch {
    let Some(name) = args.command() else {
        return Dispatch::Empty;
    };
    if let Some(redirection) = find_redirection(args) {
        return Dispatch::Redirected(redirection);
    }
    match Builtin::from_name(name) {
        Some(builtin) => Dispatch::Builtin(builtin),
        None => Dispatch::External,
    }
}
