//! Log observer trait and implementations.

/// Observer for stderr log lines emitted by the wkhtmltoimage process.
///
/// Implementations receive every line the tool writes to stderr, in the
/// order it wrote them, independently of the render outcome. This is a
/// side channel for diagnostics only; it has no effect on how the render
/// is classified.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; blocking delays stderr draining.
/// - The method has a default empty implementation.
/// - Lines are delivered with the trailing newline stripped; empty lines
///   are delivered too.
/// - Run the tool without quiet mode (via extra args) if you want its
///   info/debug messages in addition to warnings.
///
/// # Example
///
/// ```ignore
/// use wkimage::LogObserver;
///
/// struct CountingObserver {
///     lines: std::sync::atomic::AtomicUsize,
/// }
///
/// impl LogObserver for CountingObserver {
///     fn on_log_line(&self, _line: &str) {
///         self.lines.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
/// }
/// ```
pub trait LogObserver: Send + Sync {
    /// Called once for each line received on the tool's stderr.
    fn on_log_line(&self, line: &str) {
        let _ = line;
    }
}

/// Simple observer that forwards tool log lines to tracing.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use wkimage::{HtmlToImageConverter, TracingLogObserver};
///
/// let converter = HtmlToImageConverter::builder()
///     .log_observer(Arc::new(TracingLogObserver::new()))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracingLogObserver {
    level: LogLevel,
}

/// Log level for TracingLogObserver.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Log at trace level.
    Trace,
    /// Log at debug level (default).
    #[default]
    Debug,
    /// Log at info level.
    Info,
}

impl TracingLogObserver {
    /// Create a new tracing observer with debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracing observer with a specific level.
    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

impl LogObserver for TracingLogObserver {
    fn on_log_line(&self, line: &str) {
        match self.level {
            LogLevel::Trace => tracing::trace!(line = %line, "wkhtmltoimage"),
            LogLevel::Debug => tracing::debug!(line = %line, "wkhtmltoimage"),
            LogLevel::Info => tracing::info!(line = %line, "wkhtmltoimage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[test]
    fn log_observer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn LogObserver>();
        assert_send_sync::<TracingLogObserver>();
    }

    #[test]
    fn tracing_observer_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<TracingLogObserver>();
    }

    struct CollectingObserver {
        lines: Mutex<Vec<String>>,
    }

    impl LogObserver for CollectingObserver {
        fn on_log_line(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    #[test]
    fn collecting_observer_preserves_order() {
        let observer = CollectingObserver {
            lines: Mutex::new(Vec::new()),
        };

        observer.on_log_line("Loading page (1/2)");
        observer.on_log_line("");
        observer.on_log_line("Rendering (2/2)");

        let lines = observer.lines.lock().unwrap();
        assert_eq!(
            *lines,
            vec!["Loading page (1/2)", "", "Rendering (2/2)"]
        );
    }

    #[test]
    fn default_trait_method_is_no_op() {
        struct EmptyObserver;
        impl LogObserver for EmptyObserver {}

        let observer = EmptyObserver;
        observer.on_log_line("anything");
    }

    #[test]
    fn arc_observer_works() {
        let observer: Arc<dyn LogObserver> = Arc::new(TracingLogObserver::new());
        observer.on_log_line("line");
    }
}
