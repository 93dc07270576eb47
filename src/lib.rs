//! # wkimage
//!
//! Async Rust wrapper for the wkhtmltoimage command line tool.
//!
//! This library renders HTML into raster images by driving wkhtmltoimage
//! as a child process, supporting:
//! - Literal HTML content piped through stdin or file/URL sources
//! - In-memory, caller-stream, or tool-written file outputs
//! - Execution timeouts with forced process termination
//! - Exit classification that knows the tool's benign code-1 warnings
//!
//! ## Quick Start
//!
//! ```ignore
//! use wkimage::{HtmlToImageConverter, ImageFormat, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let converter = HtmlToImageConverter::builder()
//!         .tool_dir("/opt/wkhtmltox/bin")
//!         .build()?;
//!     let png = converter.render("<h1>Hello</h1>", ImageFormat::Png).await?;
//!     std::fs::write("hello.png", png)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Rendering a URL to a file
//!
//! ```ignore
//! let size = converter
//!     .render_source_to_file("https://example.com", None, "example.png")
//!     .await?;
//! println!("wrote {} bytes", size);
//! ```
//!
//! ## Configuration
//!
//! ```ignore
//! use std::time::Duration;
//! use wkimage::{HtmlToImageConverter, ProcessPriority};
//!
//! let converter = HtmlToImageConverter::builder()
//!     .tool_dir("/opt/wkhtmltox/bin")
//!     .zoom(1.5)
//!     .width(1280)
//!     .priority(ProcessPriority::BelowNormal)
//!     .timeout(Duration::from_secs(60))
//!     .build()?;
//! ```
//!
//! ## Observing tool output
//!
//! ```ignore
//! use std::sync::Arc;
//! use wkimage::TracingLogObserver;
//!
//! let converter = HtmlToImageConverter::builder()
//!     .log_observer(Arc::new(TracingLogObserver::new()))
//!     .build()?;
//! ```

pub mod config;
mod convert;
mod error;
pub mod observer;
pub mod process;

pub use error::{Error, Result, TIMEOUT_EXIT_CODE};

// Re-export the main converter types at crate root
pub use convert::{ConverterBuilder, HtmlToImageConverter};

// Re-export commonly used config types at crate root
pub use config::{
    ConverterConfig, ConverterConfigBuilder, ImageFormat, ProcessPriority, DEFAULT_TOOL_NAME,
};

// Re-export commonly used observer types at crate root
pub use observer::{LogLevel, LogObserver, TracingLogObserver};

// Re-export commonly used process types at crate root
pub use process::{ExitOutcome, OutputPump, RenderProcess, IGNORABLE_STDERR_LINES};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}
    fn assert_send<T: Send>() {}

    /// All major public types must be Send + Sync for use across async tasks.
    #[test]
    fn public_types_are_send_sync() {
        // Main converter types
        assert_send_sync::<HtmlToImageConverter>();
        assert_send_sync::<ConverterBuilder>();

        // Configuration types
        assert_send_sync::<ConverterConfig>();
        assert_send_sync::<ConverterConfigBuilder>();
        assert_send_sync::<ImageFormat>();
        assert_send_sync::<ProcessPriority>();

        // Observer types
        assert_send_sync::<TracingLogObserver>();

        // Process types
        assert_send_sync::<ExitOutcome>();

        // Error type
        assert_send_sync::<Error>();
    }

    /// Process-side types are Send but hold process handles, so Sync is not
    /// required of them.
    #[test]
    fn process_types_are_send() {
        assert_send::<RenderProcess>();
        assert_send::<OutputPump<Vec<u8>>>();
    }
}
