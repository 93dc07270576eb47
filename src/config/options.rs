//! Type-safe options for the wkhtmltoimage command line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output image format with escape hatch for formats the tool learns later.
///
/// The `Display` form is the tag passed to the tool's `-f` flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image format.
    #[default]
    Png,
    /// JPEG image format.
    Jpg,
    /// BMP image format.
    Bmp,
    /// Custom format tag passed through verbatim.
    #[serde(untagged)]
    Custom(String),
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpg => write!(f, "jpg"),
            ImageFormat::Bmp => write!(f, "bmp"),
            ImageFormat::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ImageFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" => ImageFormat::Jpg,
            "bmp" => ImageFormat::Bmp,
            _ => ImageFormat::Custom(s.to_string()),
        }
    }
}

impl From<String> for ImageFormat {
    fn from(s: String) -> Self {
        ImageFormat::from(s.as_str())
    }
}

/// Scheduling priority applied to the wkhtmltoimage process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessPriority {
    /// Lower priority than normal processes.
    BelowNormal,
    /// Default scheduling priority; nothing is applied to the process.
    #[default]
    Normal,
    /// Higher priority than normal processes.
    AboveNormal,
    /// High priority.
    High,
    /// Highest priority the scheduler allows.
    Realtime,
}

impl ProcessPriority {
    /// The nice level this priority maps to on Unix.
    #[cfg(unix)]
    pub(crate) fn nice_level(self) -> i32 {
        match self {
            ProcessPriority::BelowNormal => 10,
            ProcessPriority::Normal => 0,
            ProcessPriority::AboveNormal => -5,
            ProcessPriority::High => -10,
            ProcessPriority::Realtime => -20,
        }
    }
}

impl fmt::Display for ProcessPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessPriority::BelowNormal => write!(f, "below-normal"),
            ProcessPriority::Normal => write!(f, "normal"),
            ProcessPriority::AboveNormal => write!(f, "above-normal"),
            ProcessPriority::High => write!(f, "high"),
            ProcessPriority::Realtime => write!(f, "realtime"),
        }
    }
}
