// Durations typed at the prompt: either whole seconds or a timestamp
// `M:SS`, `MM:SS`, `H:MM:SS`.

use crate::error::{ShellError, ShellResult};
use regex::Regex;
use std::sync::OnceLock;

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(\d{1,2}):)?([0-5]?\d):([0-5]\d)$").expect("timestamp pattern is valid")
    })
}

/// Parse seconds or a timestamp into absolute seconds.
pub fn parse_duration(input: &str) -> ShellResult<u64> {
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        return input
            .parse()
            .map_err(|_| ShellError::InvalidTimestamp(input.to_string()));
    }

    let caps = timestamp_pattern()
        .captures(input)
        .ok_or_else(|| ShellError::InvalidTimestamp(input.to_string()))?;

    let field = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    Ok(field(1) * 3600 + field(2) * 60 + field(3))
}

/// `M:SS` below an hour, `H:MM:SS` otherwise.
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
