//! Process management for the wkhtmltoimage tool.
//!
//! This module handles spawning and communicating with the wkhtmltoimage
//! subprocess. Each render call spawns one process whose streams are wired
//! according to where the input comes from and where the output goes.
//!
//! # Architecture
//!
//! ```text
//! wkimage                             wkhtmltoimage
//! ┌──────────────┐                   ┌─────────────┐
//! │ RenderProcess│──stdin (html)────▶│             │
//! │  OutputPump  │◀─stdout (image)───│             │
//! │ StderrMonitor│◀─stderr (logs)────│             │
//! └──────────────┘                   └─────────────┘
//! ```
//!
//! stdin is piped only when the source is literal HTML content (the `-`
//! placeholder on the command line); stdout only when the output is drained
//! to a stream. A path/URL source and a file sink travel as plain command
//! line arguments instead, and stderr is always consumed line by line.

mod exit;
mod io;
mod spawn;

pub use exit::{classify_exit, ExitOutcome, IGNORABLE_STDERR_LINES};
pub use io::{OutputPump, StderrMonitor, StdinWriter};
pub use spawn::RenderProcess;

pub(crate) use spawn::build_args;

/// Command line placeholder telling the tool to read stdin / write stdout.
pub const STDIO_PLACEHOLDER: &str = "-";

/// Chunk size for the stdout drain.
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;
