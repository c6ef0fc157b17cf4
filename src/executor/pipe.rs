//! Internal utilities for draining command output.
//!
//! This module reads a child's output pipe line by line, echoes each line
//! to its target as it arrives, and accumulates the captured text.

use std::io::{BufRead, BufReader, Read, Write};

use super::EchoTarget;
use crate::progress::ProgressEcho;

/// Type of output stream for logging purposes.
#[derive(Clone, Copy)]
pub(super) enum StreamType {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Extracts a human-readable message from a thread panic.
pub(super) fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    err.downcast_ref::<&str>()
        .copied()
        .or_else(|| err.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic")
}

/// Reads `pipe` to EOF, echoing each line and returning the captured text.
///
/// - stdout lines echoed to the console go through [`ProgressEcho`];
///   stderr lines (separate mode only) are logged at INFO instead, since
///   tools such as icgc-get report progress there.
/// - Binary data uses lossy UTF-8 conversion; a trailing CR is trimmed.
/// - I/O errors on the pipe stop reading but don't fail the command
///   (its result is decided by the exit code).
/// - A failing console stops echoing, capture continues.
/// - With `trailing_newline`, one `\n` is written to the console after EOF.
pub(super) fn drain_output<R: Read, W: Write>(
    pipe: R,
    stream_type: StreamType,
    echo: EchoTarget,
    trailing_newline: bool,
    console: &mut W,
) -> String {
    let mut reader = BufReader::new(pipe);
    let mut line_buf = Vec::new();
    let mut captured = String::new();
    let mut progress = ProgressEcho::new();
    let mut console_ok = true;

    loop {
        line_buf.clear();
        match reader.read_until(b'\n', &mut line_buf) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let content = line_buf.strip_suffix(b"\n").unwrap_or(&line_buf);
                let text = String::from_utf8_lossy(content);
                let line = text.trim_end_matches('\r');
                captured.push_str(line);
                captured.push('\n');

                match (echo, stream_type) {
                    (EchoTarget::Console, StreamType::Stdout) if console_ok => {
                        if let Err(e) = progress.write_line(console, line) {
                            tracing::debug!(error = %e, "console write failed, echo disabled");
                            console_ok = false;
                        }
                    }
                    (EchoTarget::Console, StreamType::Stderr) => {
                        tracing::info!(stream = %stream_type, "{}", line);
                    }
                    (EchoTarget::Diagnostic, _) => {
                        tracing::debug!(stream = %stream_type, "{}", line);
                    }
                    _ => {}
                }
            }
            Err(e) => {
                tracing::error!(stream = %stream_type, error = %e, "I/O error, stopping read");
                break;
            }
        }
    }

    if trailing_newline && echo == EchoTarget::Console && console_ok {
        if let Err(e) = writeln!(console).and_then(|()| console.flush()) {
            tracing::debug!(error = %e, "failed to terminate progress line");
        }
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;

    const S3CMD_GET_OUTPUT: &[u8] = b"download: 's3://b/k.txt' -> '/tmp/k.txt'  [1 of 1]\n\
        \x20 16 of 33    48% in    0s\n\
        \x20 33 of 33   100% in    0s    95.46 B/s  done\n";

    #[test]
    fn test_drain_captures_all_lines() {
        let mut console = Vec::new();
        let captured = drain_output(
            S3CMD_GET_OUTPUT,
            StreamType::Stdout,
            EchoTarget::Silent,
            false,
            &mut console,
        );
        assert_eq!(captured.lines().count(), 3);
        assert!(captured.starts_with("download: "));
        assert!(console.is_empty());
    }

    #[test]
    fn test_drain_echoes_progress_with_trailing_newline() {
        let mut console = Vec::new();
        drain_output(S3CMD_GET_OUTPUT, StreamType::Stdout, EchoTarget::Console, true, &mut console);
        let echoed = String::from_utf8(console).unwrap();
        assert_eq!(
            echoed,
            "download: 's3://b/k.txt' -> '/tmp/k.txt'  [1 of 1]\n\r  16 of 33    48% in    0s\r  33 of 33   100% in    0s    95.46 B/s  done\n"
        );
    }

    #[test]
    fn test_drain_without_trailing_newline_leaves_line_open() {
        let mut console = Vec::new();
        drain_output(S3CMD_GET_OUTPUT, StreamType::Stdout, EchoTarget::Console, false, &mut console);
        let echoed = String::from_utf8(console).unwrap();
        assert!(echoed.ends_with("done"));
    }

    #[test]
    fn test_diagnostic_target_never_touches_console() {
        let mut console = Vec::new();
        let captured = drain_output(
            &b"s3://bucket/ (bucket):\n   Location:  us-east-1\n"[..],
            StreamType::Stdout,
            EchoTarget::Diagnostic,
            true,
            &mut console,
        );
        assert!(console.is_empty());
        assert!(captured.contains("Location:"));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_stderr_is_logged_at_info() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let mut console = Vec::new();
        let captured = tracing::subscriber::with_default(subscriber, || {
            drain_output(
                &b"Downloading FI509397  42%\n"[..],
                StreamType::Stderr,
                EchoTarget::Console,
                false,
                &mut console,
            )
        });

        assert_eq!(captured, "Downloading FI509397  42%\n");
        assert!(console.is_empty());
        let logged = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains(" INFO "), "unexpected log output: {}", logged);
        assert!(logged.contains("Downloading FI509397"));
        assert!(!logged.contains("WARN"));
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let mut console = Vec::new();
        let captured = drain_output(
            &b"first\r\nsecond"[..],
            StreamType::Stdout,
            EchoTarget::Silent,
            false,
            &mut console,
        );
        assert_eq!(captured, "first\nsecond\n");
    }

    #[test]
    fn test_panic_message_variants() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(&*boxed), "static message");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(&*boxed), "owned message");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*boxed), "unknown panic");
    }
}
