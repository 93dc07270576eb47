//! Configuration for the wkhtmltoimage converter.
//!
//! This module provides:
//!
//! - [`ConverterConfig`] and [`ConverterConfigBuilder`] for configuring renders
//! - Type-safe options like [`ImageFormat`] and [`ProcessPriority`]
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wkimage::config::{ConverterConfig, ProcessPriority};
//!
//! let config = ConverterConfig::builder()
//!     .tool_dir("/opt/wkhtmltox/bin")
//!     .zoom(1.25)
//!     .priority(ProcessPriority::BelowNormal)
//!     .timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

pub mod builder;
pub mod options;

// Re-export commonly used types
pub use builder::{ConverterConfig, ConverterConfigBuilder, DEFAULT_TOOL_NAME};
pub use options::{ImageFormat, ProcessPriority};
