//! Splitting a raw input line into shell words.
//!
//! There is no quoting, escaping or comment syntax: a word is any maximal run of
//! characters that are not delimiters.

use std::ops::Deref;

/// Characters that separate words: space, tab, carriage return, newline and bell.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// The words of one input line, in order.
///
/// Indexing past the last word with [`ArgumentVector::arg`] yields `None`, which
/// plays the role of the end-of-arguments terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    words: Vec<String>,
}

impl ArgumentVector {
    /// The word at `index`, or `None` once the arguments are exhausted.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// The command name, i.e. the first word.
    pub fn command(&self) -> Option<&str> {
        self.arg(0)
    }

    /// Borrowed view of the words, convenient for argument parsers.
    pub fn as_strs(&self) -> Vec<&str> {
        self.words.iter().map(String::as_str).collect()
    }
}

impl Deref for ArgumentVector {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.words
    }
}

impl<S: Into<String>> FromIterator<S> for ArgumentVector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Split `line` into words on [`DELIMITERS`].
///
/// Empty runs between delimiters are dropped, so a blank line produces an empty
/// vector. Storage grows as needed; there is no cap on the number of words.
pub fn split_into_tokens(line: &str) -> ArgumentVector {
    let args: ArgumentVector = line
        .split(&DELIMITERS[..])
        .filter(|word| !word.is_empty())
        .collect();
    log::debug!("tokenized {:?}", args.words);
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_every_delimiter() {
        let args = split_into_tokens("echo\ta  b\r\nc\x07d");
        assert_eq!(&*args, &["echo", "a", "b", "c", "d"]);
    }

    #[test]
    fn delimiter_only_lines_are_empty() {
        for line in ["", " ", "\t\t", " \r\n", "\x07 \t\r\n "] {
            let args = split_into_tokens(line);
            assert!(args.is_empty(), "line {line:?} gave {args:?}");
            assert_eq!(args.command(), None);
        }
    }

    #[test]
    fn past_the_end_is_none() {
        let args = split_into_tokens("pwd");
        assert_eq!(args.arg(0), Some("pwd"));
        assert_eq!(args.arg(1), None);
        assert_eq!(args.arg(100), None);
    }

    #[test]
    fn no_quote_handling() {
        let args = split_into_tokens("echo \"a b\" 'c'");
        assert_eq!(&*args, &["echo", "\"a", "b\"", "'c'"]);
    }

    #[test]
    fn many_words_are_kept() {
        let line = (0..1000).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let args = split_into_tokens(&line);
        assert_eq!(args.len(), 1000);
        assert_eq!(args.arg(999), Some("999"));
    }

    #[test]
    fn redirection_operators_are_plain_words() {
        let args = split_into_tokens("echo a>b > c >> d");
        assert_eq!(&*args, &["echo", "a>b", ">", "c", ">>", "d"]);
    }
}
