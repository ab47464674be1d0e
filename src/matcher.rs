// Prefix resolution shared by every name lookup (commands, help topics, songs,
// playlists, scripts). Matching is byte-wise and case-sensitive.

use crate::error::{ShellError, ShellResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    NoMatch,
    Exact(String),
    /// More than one candidate shares the prefix, listed in candidate order.
    Ambiguous(Vec<String>),
}

/// Resolve `prefix` against `candidates`.
///
/// A candidate equal to `prefix` does not win over longer candidates sharing
/// the prefix; callers that want an exact-name shortcut check for it first.
pub fn resolve<I, S>(candidates: I, prefix: &str) -> Match
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut matches: Vec<String> = candidates
        .into_iter()
        .filter(|c| c.as_ref().starts_with(prefix))
        .map(|c| c.as_ref().to_string())
        .collect();

    match matches.len() {
        0 => Match::NoMatch,
        1 => Match::Exact(matches.remove(0)),
        _ => Match::Ambiguous(matches),
    }
}

impl Match {
    /// Collapse into a result, mapping a miss to `not_found` and ambiguity to
    /// `ShellError::Ambiguous` with each candidate passed through `display`.
    pub fn into_result<F, D>(self, not_found: F, display: D) -> ShellResult<String>
    where
        F: FnOnce() -> ShellError,
        D: Fn(&str) -> String,
    {
        match self {
            Match::NoMatch => Err(not_found()),
            Match::Exact(value) => Ok(value),
            Match::Ambiguous(matches) => Err(ShellError::Ambiguous(
                matches.iter().map(|m| display(m)).collect(),
            )),
        }
    }

    pub fn exact(&self) -> Option<&str> {
        match self {
            Match::Exact(value) => Some(value),
            _ => None,
        }
    }
}
