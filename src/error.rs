use std::time::Duration;

/// Error code reported for renders aborted by the execution timeout.
///
/// wkhtmltoimage never exits with a negative code, so this sentinel is
/// distinguishable from any real exit status.
pub const TIMEOUT_EXIT_CODE: i32 = -2;

/// Errors that can occur when using wkimage.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Spawn errors: failed to start the wkhtmltoimage process
/// - IO errors: communication failures with the subprocess
/// - Runtime errors: failures during a render
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected at build() time)
    // -------------------------------------------------------------------------
    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Spawn errors
    // -------------------------------------------------------------------------
    /// The wkhtmltoimage executable does not exist at the resolved path.
    ///
    /// No process is spawned when this is raised.
    #[error("wkhtmltoimage not found at {path}")]
    ToolNotFound { path: String },

    /// Failed to spawn the wkhtmltoimage subprocess.
    #[error("failed to spawn wkhtmltoimage process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error communicating with the wkhtmltoimage subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// The process (or its output drain) exceeded the configured timeout.
    ///
    /// When the process itself is the laggard it is force-killed before this
    /// is raised. [`Error::code`] reports [`TIMEOUT_EXIT_CODE`] for this kind.
    #[error("wkhtmltoimage exceeded execution timeout ({0:?}) and was aborted")]
    Timeout(Duration),

    /// The process exited with a failure verdict.
    ///
    /// Carries the raw exit code and the last non-empty line the tool wrote
    /// to stderr (empty if it wrote none).
    #[error("wkhtmltoimage exited with code {code}: {stderr}")]
    RenderFailed { code: i32, stderr: String },
}

/// A specialized Result type for wkimage operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// The numeric error code associated with this error, if any.
    ///
    /// Returns the tool's exit code for [`Error::RenderFailed`] and the
    /// [`TIMEOUT_EXIT_CODE`] sentinel for [`Error::Timeout`].
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Timeout(_) => Some(TIMEOUT_EXIT_CODE),
            Error::RenderFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this error was caused by the execution timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn code_mapping() {
        assert_eq!(
            Error::Timeout(Duration::from_secs(30)).code(),
            Some(TIMEOUT_EXIT_CODE)
        );
        assert_eq!(
            Error::RenderFailed {
                code: 2,
                stderr: "boom".into()
            }
            .code(),
            Some(2)
        );
        assert_eq!(Error::InvalidConfig("bad zoom".into()).code(), None);
        assert_eq!(
            Error::ToolNotFound {
                path: "/opt/wk/wkhtmltoimage".into()
            }
            .code(),
            None
        );
    }

    #[test]
    fn is_timeout_detection() {
        assert!(Error::Timeout(Duration::from_millis(100)).is_timeout());
        assert!(
            !Error::RenderFailed {
                code: 1,
                stderr: String::new()
            }
            .is_timeout()
        );
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn question_mark_operator_io() {
        fn fallible_io() -> Result<()> {
            let _file = std::fs::File::open("/nonexistent/path/that/does/not/exist")?;
            Ok(())
        }
        let result = fallible_io();
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn timeout_sentinel_is_negative() {
        assert!(TIMEOUT_EXIT_CODE < 0);
    }
}
