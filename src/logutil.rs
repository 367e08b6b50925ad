//! Logging utilities for player-supplied strings (names, command arguments)
//! so a crafted value cannot break or flood a log line.

const MAX_PREVIEW: usize = 120;

/// Escape a string for single-line logging:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
///   Truncates after `MAX_PREVIEW` characters with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Escape each argument and join them with spaces, for logging a command line.
pub fn escape_args(args: &[&str]) -> String {
    args.iter()
        .map(|a| escape_log(a))
        .collect::<Vec<_>>()
        .join(" ")
}
