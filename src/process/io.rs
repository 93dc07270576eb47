//! I/O primitives for communicating with the wkhtmltoimage subprocess.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::ChildStdin;
use tokio::task::JoinHandle;

use super::COPY_BUFFER_SIZE;
use crate::observer::LogObserver;
use crate::{Error, Result};

/// Writes the HTML content to the tool's stdin.
///
/// Used when the render source is literal content rather than a file path
/// or URL.
pub struct StdinWriter {
    stdin: ChildStdin,
}

impl StdinWriter {
    /// Create a new writer from a child process stdin.
    pub fn new(stdin: ChildStdin) -> Self {
        Self { stdin }
    }

    /// Write the content and close stdin.
    ///
    /// Closing stdin signals end-of-input to the tool; without it the tool
    /// would wait for more content forever.
    pub async fn write_content(mut self, content: &[u8]) -> Result<()> {
        self.stdin.write_all(content).await.map_err(Error::io)?;
        self.stdin.shutdown().await.map_err(Error::io)?;
        Ok(())
    }
}

/// Consumes the tool's stderr line by line on a background task.
///
/// Each non-empty line overwrites the "last error line"; only the most
/// recent one is kept, not a full log. Every line (empty included) is also
/// forwarded verbatim to the registered [`LogObserver`].
///
/// The task owns the line state and hands it back through its join handle,
/// so it has a single writer and is read only after stderr has closed.
#[derive(Debug)]
pub struct StderrMonitor {
    handle: JoinHandle<String>,
}

impl StderrMonitor {
    /// Start draining the given stderr stream.
    pub fn spawn<R>(stderr: R, observer: Option<Arc<dyn LogObserver>>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut last_line = String::new();
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let text = line.trim_end_matches(['\r', '\n']);
                        if !text.is_empty() {
                            last_line.clear();
                            last_line.push_str(text);
                        }
                        if let Some(ref obs) = observer {
                            obs.on_log_line(text);
                        }
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "stderr read failed, stopping monitor");
                        break;
                    }
                }
            }

            last_line
        });

        Self { handle }
    }

    /// Wait for stderr to close and return the last non-empty line seen
    /// (empty string if the tool wrote nothing).
    ///
    /// Call this only after the process has exited; stderr closes at exit,
    /// so the await is brief.
    pub async fn last_error_line(mut self) -> String {
        (&mut self.handle).await.unwrap_or_default()
    }
}

impl Drop for StderrMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Drains the tool's stdout into a sink stream on a background task.
///
/// The copy loop starts immediately at construction and runs concurrently
/// with stdin feeding and the process-exit wait. Ownership of the producer
/// stream transfers to the pump; dropping the pump cancels any in-flight
/// copy and releases the producer.
pub struct OutputPump<W> {
    task: Option<JoinHandle<Result<(u64, W)>>>,
    total: u64,
    sink: Option<W>,
}

impl<W> OutputPump<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    /// Start copying `source` into `sink` in [`COPY_BUFFER_SIZE`] chunks.
    pub fn new<R>(source: R, sink: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let task = tokio::spawn(copy_loop(source, sink));
        Self {
            task: Some(task),
            total: 0,
            sink: None,
        }
    }

    /// Wait for the copy to finish and return the total bytes transferred.
    ///
    /// With a timeout configured, waits at most that long; on expiry the
    /// copy is cancelled and [`Error::Timeout`] is raised. Terminating the
    /// source process is the caller's separate responsibility. Idempotent:
    /// a second call returns the recorded total.
    pub async fn wait(&mut self, timeout: Option<Duration>) -> Result<u64> {
        let Some(mut task) = self.task.take() else {
            return Ok(self.total);
        };

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    return Err(Error::Timeout(limit));
                }
            },
            None => (&mut task).await,
        };

        let (total, sink) = match joined {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Io(std::io::Error::other(
                    "output drain task was cancelled",
                )));
            }
        };

        self.total = total;
        self.sink = Some(sink);
        Ok(total)
    }

    /// Total bytes transferred so far (final once [`wait`](Self::wait)
    /// returned successfully).
    pub fn total_bytes(&self) -> u64 {
        self.total
    }

    /// Take back the sink after a successful [`wait`](Self::wait).
    pub fn into_sink(mut self) -> Option<W> {
        self.sink.take()
    }
}

impl<W> Drop for OutputPump<W> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The pump's copy loop. Returns the byte count together with the sink so
/// the caller gets its stream back.
async fn copy_loop<R, W>(mut source: R, mut sink: W) -> Result<(u64, W)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = source.read(&mut buf).await.map_err(Error::io)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await.map_err(Error::io)?;
        total += n as u64;
    }

    sink.flush().await.map_err(Error::io)?;
    Ok((total, sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use std::sync::Mutex;

    #[test]
    fn types_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<StderrMonitor>();
        assert_send::<OutputPump<Vec<u8>>>();
    }

    #[tokio::test]
    async fn pump_transfers_all_bytes() {
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let source = Cursor::new(payload.clone());

        let mut pump = OutputPump::new(source, Vec::new());
        let total = pump.wait(None).await.unwrap();

        assert_eq!(total, payload.len() as u64);
        assert_eq!(pump.total_bytes(), total);
        assert_eq!(pump.into_sink().unwrap(), payload);
    }

    #[tokio::test]
    async fn pump_handles_empty_source() {
        let mut pump = OutputPump::new(Cursor::new(Vec::new()), Vec::new());
        let total = pump.wait(None).await.unwrap();

        assert_eq!(total, 0);
        assert_eq!(pump.into_sink().unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn pump_wait_is_idempotent() {
        let mut pump = OutputPump::new(Cursor::new(vec![1, 2, 3]), Vec::new());

        assert_eq!(pump.wait(None).await.unwrap(), 3);
        assert_eq!(pump.wait(Some(Duration::from_secs(1))).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn pump_times_out_when_source_stalls() {
        // Keep the write half alive so reads stay pending forever.
        let (read_half, _write_half) = tokio::io::duplex(64);

        let mut pump = OutputPump::new(read_half, Vec::new());
        let result = pump.wait(Some(Duration::from_millis(50))).await;

        match result {
            Err(Error::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(50)),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pump_drop_cancels_copy() {
        let (read_half, mut write_half) = tokio::io::duplex(64);

        let pump: OutputPump<Vec<u8>> = OutputPump::new(read_half, Vec::new());
        drop(pump);

        // The read half is gone once the task is aborted; the writer
        // eventually observes a closed pipe.
        let mut closed = false;
        for _ in 0..100 {
            if write_half.write_all(b"x").await.is_err() {
                closed = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(closed, "write half should observe the dropped reader");
    }

    #[tokio::test]
    async fn monitor_keeps_last_non_empty_line() {
        let stderr = Cursor::new(b"first warning\n\nsecond warning\n\n".to_vec());
        let monitor = StderrMonitor::spawn(stderr, None);

        assert_eq!(monitor.last_error_line().await, "second warning");
    }

    #[tokio::test]
    async fn monitor_returns_empty_when_silent() {
        let monitor = StderrMonitor::spawn(Cursor::new(Vec::new()), None);
        assert_eq!(monitor.last_error_line().await, "");
    }

    #[tokio::test]
    async fn monitor_strips_crlf() {
        let stderr = Cursor::new(b"windows line\r\n".to_vec());
        let monitor = StderrMonitor::spawn(stderr, None);

        assert_eq!(monitor.last_error_line().await, "windows line");
    }

    struct CollectingObserver {
        lines: Mutex<Vec<String>>,
    }

    impl LogObserver for CollectingObserver {
        fn on_log_line(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    #[tokio::test]
    async fn monitor_forwards_every_line_to_observer() {
        let observer = Arc::new(CollectingObserver {
            lines: Mutex::new(Vec::new()),
        });
        let stderr = Cursor::new(b"one\n\ntwo\n".to_vec());

        let monitor = StderrMonitor::spawn(stderr, Some(observer.clone() as _));
        let last = monitor.last_error_line().await;

        assert_eq!(last, "two");
        // Empty lines reach the observer even though they never become the
        // last error line.
        assert_eq!(*observer.lines.lock().unwrap(), vec!["one", "", "two"]);
    }
}
