//! High-level converter for turning HTML into images.
//!
//! This module provides [`HtmlToImageConverter`], the main entry point for
//! rendering HTML with the wkhtmltoimage tool.
//!
//! # Example
//!
//! ```ignore
//! use wkimage::{HtmlToImageConverter, ImageFormat, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let converter = HtmlToImageConverter::builder()
//!         .tool_dir("/opt/wkhtmltox/bin")
//!         .build()?;
//!
//!     let png = converter
//!         .render("<h1>Hello</h1>", ImageFormat::Png)
//!         .await?;
//!     std::fs::write("hello.png", png)?;
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;

use crate::config::{ConverterConfig, ConverterConfigBuilder, ImageFormat, ProcessPriority};
use crate::observer::LogObserver;
use crate::process::{
    build_args, classify_exit, ExitOutcome, OutputPump, RenderProcess, STDIO_PLACEHOLDER,
};
use crate::{Error, Result};

/// Where the HTML input comes from.
enum RenderSource<'a> {
    /// Literal content, piped through the tool's stdin.
    Content(&'a [u8]),
    /// File path or absolute URL, passed as a command line argument.
    PathOrUrl(&'a str),
}

impl RenderSource<'_> {
    fn spec(&self) -> &str {
        match self {
            RenderSource::Content(_) => STDIO_PLACEHOLDER,
            RenderSource::PathOrUrl(s) => s,
        }
    }

    fn pipes_stdin(&self) -> bool {
        matches!(self, RenderSource::Content(_))
    }
}

/// A converter that renders HTML into raster images.
///
/// `HtmlToImageConverter` is the main entry point. It holds the
/// configuration and provides methods for rendering literal HTML content
/// ([`render`](Self::render), [`render_into`](Self::render_into)) or a
/// file/URL source ([`render_source`](Self::render_source),
/// [`render_source_into`](Self::render_source_into),
/// [`render_source_to_file`](Self::render_source_to_file)).
///
/// Each call spawns one tool process and blocks (asynchronously) until the
/// render completes, fails, or times out; there is no retry. All process
/// resources are released on every exit path.
///
/// # Thread Safety
///
/// `HtmlToImageConverter` is `Send + Sync` and cheap to clone. Concurrent
/// renders are supported; each owns an independent process and pipes.
#[derive(Debug, Clone)]
pub struct HtmlToImageConverter {
    config: Arc<ConverterConfig>,
}

impl HtmlToImageConverter {
    /// Create a converter with the default configuration (tool expected in
    /// the current directory).
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Create a converter with the given configuration.
    pub fn with_config(config: ConverterConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create a builder for configuring a new converter.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    /// Get a reference to the converter's configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Render HTML content and return the image bytes.
    ///
    /// The content is piped through the tool's stdin and the image is
    /// drained from its stdout into memory.
    pub async fn render(
        &self,
        html: impl AsRef<[u8]>,
        format: ImageFormat,
    ) -> Result<Vec<u8>> {
        let (image, _) = self
            .run_to_stream(RenderSource::Content(html.as_ref()), Some(&format), Vec::new())
            .await?;
        Ok(image)
    }

    /// Render HTML content into a caller-provided sink.
    ///
    /// Returns the sink together with the number of bytes written to it.
    pub async fn render_into<W>(
        &self,
        html: impl AsRef<[u8]>,
        format: ImageFormat,
        sink: W,
    ) -> Result<(W, u64)>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.run_to_stream(RenderSource::Content(html.as_ref()), Some(&format), sink)
            .await
    }

    /// Render an HTML file or absolute URL and return the image bytes.
    pub async fn render_source(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>> {
        let (image, _) = self
            .run_to_stream(RenderSource::PathOrUrl(source), Some(&format), Vec::new())
            .await?;
        Ok(image)
    }

    /// Render an HTML file or absolute URL into a caller-provided sink.
    ///
    /// Returns the sink together with the number of bytes written to it.
    pub async fn render_source_into<W>(
        &self,
        source: &str,
        format: ImageFormat,
        sink: W,
    ) -> Result<(W, u64)>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.run_to_stream(RenderSource::PathOrUrl(source), Some(&format), sink)
            .await
    }

    /// Render an HTML file or absolute URL directly to an image file
    /// written by the tool itself.
    ///
    /// A pre-existing file at `dest` is deleted before the render so a
    /// stale result cannot mask a failed run. With `format: None` the tool
    /// infers the format from the destination extension. Returns the size
    /// of the produced file in bytes.
    pub async fn render_source_to_file(
        &self,
        source: &str,
        format: Option<ImageFormat>,
        dest: impl AsRef<Path>,
    ) -> Result<u64> {
        self.run_to_file(
            RenderSource::PathOrUrl(source),
            format.as_ref(),
            dest.as_ref(),
        )
        .await
    }

    /// The internal pipeline for stream sinks: spawn, pump stdout, feed
    /// stdin, wait under the timeout, classify the exit.
    async fn run_to_stream<W>(
        &self,
        source: RenderSource<'_>,
        format: Option<&ImageFormat>,
        sink: W,
    ) -> Result<(W, u64)>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let args = build_args(&self.config, format, source.spec(), STDIO_PLACEHOLDER);
        let mut process =
            RenderProcess::spawn(&self.config, &args, source.pipes_stdin(), true).await?;

        // The drain starts before stdin is fed so a tool that produces
        // output early can never fill the pipe and stall the write.
        let stdout = process.take_stdout().expect("stdout was configured");
        let mut pump = OutputPump::new(stdout, sink);

        if let RenderSource::Content(content) = source {
            process.feed_stdin(content).await?;
        }

        let timeout = self.config.timeout();
        let code = process.wait(timeout).await?;
        let total = pump.wait(timeout).await?;
        let last_line = process.last_error_line().await;

        classify_exit(&ExitOutcome::new(code, last_line, total > 0))?;

        let sink = pump.into_sink().expect("pump finished with the sink");
        Ok((sink, total))
    }

    /// The internal pipeline for file sinks: the tool writes the file, we
    /// only measure it afterwards.
    async fn run_to_file(
        &self,
        source: RenderSource<'_>,
        format: Option<&ImageFormat>,
        dest: &Path,
    ) -> Result<u64> {
        match tokio::fs::remove_file(dest).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(e)),
        }

        let sink_spec = dest.display().to_string();
        let args = build_args(&self.config, format, source.spec(), &sink_spec);
        let mut process =
            RenderProcess::spawn(&self.config, &args, source.pipes_stdin(), false).await?;

        if let RenderSource::Content(content) = source {
            process.feed_stdin(content).await?;
        }

        let code = process.wait(self.config.timeout()).await?;
        let size = match tokio::fs::metadata(dest).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };
        let last_line = process.last_error_line().await;

        classify_exit(&ExitOutcome::new(code, last_line, size > 0))?;

        Ok(size)
    }
}

impl Default for HtmlToImageConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`HtmlToImageConverter`].
///
/// This wraps [`ConverterConfigBuilder`] and builds directly into a
/// converter.
///
/// # Example
///
/// ```ignore
/// let converter = HtmlToImageConverter::builder()
///     .tool_dir("/opt/wkhtmltox/bin")
///     .zoom(1.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConverterBuilder {
    inner: ConverterConfigBuilder,
}

impl ConverterBuilder {
    /// Create a new converter builder with default settings.
    pub fn new() -> Self {
        Self {
            inner: ConverterConfigBuilder::default(),
        }
    }

    /// Build the converter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (e.g. a
    /// non-positive zoom factor).
    pub fn build(self) -> Result<HtmlToImageConverter> {
        let config = self.inner.build()?;
        Ok(HtmlToImageConverter::with_config(config))
    }

    /// Directory where the wkhtmltoimage executable is located.
    pub fn tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.tool_dir(dir);
        self
    }

    /// Executable file name of the tool.
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.tool_name(name);
        self
    }

    /// Zoom factor (1.0 = no scaling).
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.inner = self.inner.zoom(zoom);
        self
    }

    /// Minimum image width in pixels (0 = automatic).
    pub fn width(mut self, width: u32) -> Self {
        self.inner = self.inner.width(width);
        self
    }

    /// Minimum image height in pixels (0 = automatic).
    pub fn height(mut self, height: u32) -> Self {
        self.inner = self.inner.height(height);
        self
    }

    /// Raw extra command line arguments.
    pub fn extra_args(mut self, args: impl Into<String>) -> Self {
        self.inner = self.inner.extra_args(args);
        self
    }

    /// Scheduling priority for the tool process.
    pub fn priority(mut self, priority: ProcessPriority) -> Self {
        self.inner = self.inner.priority(priority);
        self
    }

    /// Maximum execution time for a render.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    /// Register an observer that receives every stderr line of the tool.
    pub fn log_observer(mut self, observer: Arc<dyn LogObserver>) -> Self {
        self.inner = self.inner.log_observer(observer);
        self
    }
}
