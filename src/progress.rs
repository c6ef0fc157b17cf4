//! Progress line handling for piped transfer output.
//!
//! When s3cmd writes to a pipe instead of a terminal it emits each progress
//! update on its own line. The echo logic here restores the single-line
//! progress display: the line announcing a transfer (`upload: ...` or
//! `download: ...`) is printed normally, and every line after it overwrites
//! the current console line with a carriage return.

use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;

static TRANSFER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(download|upload)").expect("transfer start pattern is valid"));

/// Returns true if `line` announces the start of a transfer.
///
/// Matches lines beginning with `download` or `upload` (case-sensitive).
pub fn is_transfer_start_line(line: &str) -> bool {
    TRANSFER_START.is_match(line)
}

/// Carriage-return progress emulation over a stream of output lines.
#[derive(Debug, Default)]
pub struct ProgressEcho {
    in_transfer: bool,
}

impl ProgressEcho {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one output line to `out`.
    ///
    /// Outside a transfer the line is newline-terminated; inside one it is
    /// written as `\r<line>` so it overwrites the previous progress update.
    /// A start line inside a transfer (the next file of a recursive upload)
    /// first ends the open progress line, then prints like the first one.
    pub fn write_line<W: Write>(&mut self, out: &mut W, line: &str) -> io::Result<()> {
        if self.in_transfer && is_transfer_start_line(line) {
            write!(out, "\n{}\n", line)?;
        } else if self.in_transfer {
            write!(out, "\r{}", line)?;
        } else {
            writeln!(out, "{}", line)?;
            self.in_transfer = is_transfer_start_line(line);
        }
        out.flush()
    }
}
