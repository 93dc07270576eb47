//! Test utilities for wkimage integration tests.
//!
//! [`FakeTool`] writes a small shell script into a temp directory that
//! stands in for the wkhtmltoimage executable. The script understands the
//! converter's calling convention (options first, then source spec, then
//! sink spec) and can be scripted to echo stdin, emit fixed payloads,
//! write stderr lines, stall, and exit with a chosen code.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wkimage::{ConverterBuilder, HtmlToImageConverter};

/// Shell preamble: capture the last two arguments as source/sink specs and
/// define `emit`, which writes its stdin to the sink (stdout when the sink
/// spec is the `-` placeholder, the named file otherwise).
const SCRIPT_PREAMBLE: &str = r#"#!/bin/sh
src=""
dst=""
for arg in "$@"; do
  src="$dst"
  dst="$arg"
done

emit() {
  if [ "$dst" = "-" ]; then
    cat
  else
    cat > "$dst"
  fi
}

"#;

/// A scripted stand-in for the wkhtmltoimage executable.
pub struct FakeTool {
    dir: TempDir,
    name: String,
}

impl FakeTool {
    /// Start building a fake tool.
    pub fn builder() -> FakeToolBuilder {
        FakeToolBuilder {
            behaviors: Vec::new(),
            exit_code: 0,
        }
    }

    /// The directory holding the fake executable.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// The fake executable's file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A converter builder already pointed at this tool.
    pub fn converter_builder(&self) -> ConverterBuilder {
        HtmlToImageConverter::builder()
            .tool_dir(self.dir())
            .tool_name(self.name())
    }

    /// Place an auxiliary file (input document, stale output) next to the
    /// tool and return its path.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write auxiliary file");
        path
    }
}

/// Builder assembling the fake tool's script body line by line.
pub struct FakeToolBuilder {
    behaviors: Vec<String>,
    exit_code: i32,
}

impl FakeToolBuilder {
    /// Copy stdin to the sink (the echo renderer).
    pub fn echo_stdin(mut self) -> Self {
        self.behaviors.push("emit".to_string());
        self
    }

    /// Consume stdin without producing anything, so a piped writer never
    /// sees a closed pipe.
    pub fn drain_stdin(mut self) -> Self {
        self.behaviors.push("cat > /dev/null".to_string());
        self
    }

    /// Write a fixed payload to the sink.
    pub fn emit_output(mut self, payload: &str) -> Self {
        self.behaviors
            .push(format!("printf '%s' {} | emit", sh_quote(payload)));
        self
    }

    /// Copy the source-spec file to the sink.
    pub fn copy_source(mut self) -> Self {
        self.behaviors.push("emit < \"$src\"".to_string());
        self
    }

    /// Write the full argument list to the sink, one argument per line.
    pub fn dump_args(mut self) -> Self {
        self.behaviors
            .push("printf '%s\\n' \"$@\" | emit".to_string());
        self
    }

    /// Write one line to stderr. May be called repeatedly; lines are
    /// emitted in call order.
    pub fn stderr_line(mut self, line: &str) -> Self {
        self.behaviors
            .push(format!("printf '%s\\n' {} >&2", sh_quote(line)));
        self
    }

    /// Stall for the given number of seconds before exiting.
    pub fn sleep_secs(mut self, secs: u32) -> Self {
        self.behaviors.push(format!("sleep {}", secs));
        self
    }

    /// Exit code of the fake tool (default 0).
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Write the script into a fresh temp directory and mark it executable.
    pub fn build(self) -> FakeTool {
        let dir = TempDir::new().expect("create temp dir");
        let name = "wkhtmltoimage-fake".to_string();

        let mut script = String::from(SCRIPT_PREAMBLE);
        for behavior in &self.behaviors {
            script.push_str(behavior);
            script.push('\n');
        }
        script.push_str(&format!("exit {}\n", self.exit_code));

        let path = dir.path().join(&name);
        fs::write(&path, script).expect("write fake tool script");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("mark fake tool executable");
        }

        FakeTool { dir, name }
    }
}

/// Single-quote a string for safe embedding in a POSIX shell script.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
