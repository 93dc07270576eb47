//! Converter configuration and builder.
//!
//! This module provides the builder pattern for configuring the converter.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wkimage::config::{ConverterConfig, ProcessPriority};
//!
//! let config = ConverterConfig::builder()
//!     .tool_dir("/opt/wkhtmltox/bin")
//!     .zoom(1.5)
//!     .width(1024)
//!     .priority(ProcessPriority::BelowNormal)
//!     .timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::options::ProcessPriority;
use crate::observer::LogObserver;
use crate::{Error, Result};

/// Default executable file name of the rendering tool.
pub const DEFAULT_TOOL_NAME: &str = if cfg!(windows) {
    "wkhtmltoimage.exe"
} else {
    "wkhtmltoimage"
};

/// Configuration for the wkhtmltoimage converter.
///
/// Use [`ConverterConfig::builder()`] to create a new configuration.
/// The configuration is immutable once built; every render call reads it
/// without modification.
#[derive(Clone)]
pub struct ConverterConfig {
    // Tool location
    pub(crate) tool_dir: PathBuf,
    pub(crate) tool_name: String,

    // Rendering options
    pub(crate) zoom: f32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) extra_args: String,

    // Process options
    pub(crate) priority: ProcessPriority,
    pub(crate) timeout: Option<Duration>,
    pub(crate) log_observer: Option<Arc<dyn LogObserver>>,
}

impl ConverterConfig {
    /// Create a new builder for ConverterConfig.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }

    /// Directory the tool executable lives in.
    pub fn tool_dir(&self) -> &PathBuf {
        &self.tool_dir
    }

    /// Executable file name of the tool.
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Full path to the tool executable.
    pub fn tool_path(&self) -> PathBuf {
        self.tool_dir.join(&self.tool_name)
    }

    /// Zoom factor (1.0 = no scaling).
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Minimum image width in pixels (0 = automatic).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Minimum image height in pixels (0 = automatic).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw extra command line arguments.
    pub fn extra_args(&self) -> &str {
        &self.extra_args
    }

    /// Scheduling priority for the tool process.
    pub fn priority(&self) -> ProcessPriority {
        self.priority
    }

    /// Maximum execution time, or `None` for no limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The stderr log observer, if one is registered.
    pub fn log_observer(&self) -> Option<&Arc<dyn LogObserver>> {
        self.log_observer.as_ref()
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            tool_dir: PathBuf::from("."),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            zoom: 1.0,
            width: 0,
            height: 0,
            extra_args: String::new(),
            priority: ProcessPriority::default(),
            timeout: None,
            log_observer: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("tool_dir", &self.tool_dir)
            .field("tool_name", &self.tool_name)
            .field("zoom", &self.zoom)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("extra_args", &self.extra_args)
            .field("priority", &self.priority)
            .field("timeout", &self.timeout)
            .field("log_observer", &self.log_observer.is_some())
            .finish()
    }
}

/// Builder for [`ConverterConfig`].
///
/// The builder validates the configuration when
/// [`build()`](ConverterConfigBuilder::build) is called. The tool executable
/// itself is checked lazily at render time, so a config can be built on a
/// machine that does not have the tool installed.
#[derive(Clone, Default)]
pub struct ConverterConfigBuilder {
    tool_dir: Option<PathBuf>,
    tool_name: Option<String>,
    zoom: Option<f32>,
    width: u32,
    height: u32,
    extra_args: String,
    priority: ProcessPriority,
    timeout: Option<Duration>,
    log_observer: Option<Arc<dyn LogObserver>>,
}

impl ConverterConfigBuilder {
    /// Directory where the wkhtmltoimage executable is located
    /// (default: current directory).
    pub fn tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    /// Executable file name (default: [`DEFAULT_TOOL_NAME`]).
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }

    /// Zoom factor. 1.0 (the default) is omitted from the command line.
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Minimum image width in pixels. 0 (the default) lets the tool decide.
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Minimum image height in pixels. 0 (the default) lets the tool decide.
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Raw extra command line arguments appended after the built-in flags.
    ///
    /// The string is split on whitespace into individual arguments with no
    /// quote-aware parsing; anything fancier is the caller's responsibility.
    pub fn extra_args(mut self, args: impl Into<String>) -> Self {
        self.extra_args = args.into();
        self
    }

    /// Scheduling priority for the tool process. Applied after spawn only
    /// when it differs from [`ProcessPriority::Normal`].
    pub fn priority(mut self, priority: ProcessPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Maximum execution time for a render (default: no limit).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register an observer that receives every stderr line the tool writes.
    pub fn log_observer(mut self, observer: Arc<dyn LogObserver>) -> Self {
        self.log_observer = Some(observer);
        self
    }

    /// Build the configuration.
    ///
    /// This validates:
    /// - zoom is finite and positive
    /// - the tool file name is non-empty
    pub fn build(self) -> Result<ConverterConfig> {
        let zoom = self.zoom.unwrap_or(1.0);
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "zoom must be finite and positive, got {}",
                zoom
            )));
        }

        let tool_name = self
            .tool_name
            .unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string());
        if tool_name.is_empty() {
            return Err(Error::InvalidConfig("tool name must not be empty".into()));
        }

        Ok(ConverterConfig {
            tool_dir: self.tool_dir.unwrap_or_else(|| PathBuf::from(".")),
            tool_name,
            zoom,
            width: self.width,
            height: self.height,
            extra_args: self.extra_args,
            priority: self.priority,
            timeout: self.timeout,
            log_observer: self.log_observer,
        })
    }
}

impl fmt::Debug for ConverterConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfigBuilder")
            .field("tool_dir", &self.tool_dir)
            .field("tool_name", &self.tool_name)
            .field("zoom", &self.zoom)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("extra_args", &self.extra_args)
            .field("priority", &self.priority)
            .field("timeout", &self.timeout)
            .field("log_observer", &self.log_observer.is_some())
            .finish()
    }
}
