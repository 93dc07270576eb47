//! Exit-status classification for the wkhtmltoimage process.
//!
//! The tool's exit semantics are not "zero means success": exit code 1 is
//! still a successful render when the only complaint on stderr is one of a
//! fixed set of benign diagnostics and the tool actually produced output.

use crate::{Error, Result};

/// Stderr lines that do not indicate a failed render when the tool exits
/// with code 1. Five describe transient network conditions for subresources,
/// one is a font-size diagnostic unrelated to failure.
///
/// Matching is exact on the trimmed line, not substring.
pub const IGNORABLE_STDERR_LINES: [&str; 6] = [
    "Exit with code 1 due to network error: ContentNotFoundError",
    "QFont::setPixelSize: Pixel size <= 0",
    "Exit with code 1 due to network error: ProtocolUnknownError",
    "Exit with code 1 due to network error: HostNotFoundError",
    "Exit with code 1 due to network error: ContentOperationNotPermittedError",
    "Exit with code 1 due to network error: UnknownContentError",
];

/// Final state of an exited render process, gathered once after exit and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Raw process exit code (-1 when the process was terminated by a
    /// signal and reported no code).
    pub code: i32,
    /// Last non-empty line seen on stderr, empty string if none.
    pub last_stderr_line: String,
    /// Whether the render produced any output bytes.
    pub output_not_empty: bool,
}

impl ExitOutcome {
    /// Bundle the observed process state for classification.
    pub fn new(code: i32, last_stderr_line: impl Into<String>, output_not_empty: bool) -> Self {
        Self {
            code,
            last_stderr_line: last_stderr_line.into(),
            output_not_empty,
        }
    }
}

/// Map an [`ExitOutcome`] to a verdict.
///
/// | exit code | condition                                          | verdict |
/// |-----------|----------------------------------------------------|---------|
/// | 0         | always                                             | success |
/// | 1         | last stderr line ignorable AND output non-empty    | success |
/// | 1         | otherwise                                          | failure |
/// | other     | always                                             | failure |
///
/// Failure verdicts carry the exit code and last stderr line in
/// [`Error::RenderFailed`].
pub fn classify_exit(outcome: &ExitOutcome) -> Result<()> {
    let ignorable = match outcome.code {
        0 => return Ok(()),
        1 => IGNORABLE_STDERR_LINES.contains(&outcome.last_stderr_line.trim()),
        _ => false,
    };

    if ignorable && outcome.output_not_empty {
        return Ok(());
    }

    Err(Error::RenderFailed {
        code: outcome.code,
        stderr: outcome.last_stderr_line.clone(),
    })
}
