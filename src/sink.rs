//! Output sink for rendered diagnostics.
//!
//! Diagnostics that are not delivered to a delegate are printed as single
//! log lines. The destination is configurable so tests can capture output:
//! - Stderr: the process's standard error (default)
//! - Buffer: in-memory capture for assertions
//!
//! Uses enum dispatch instead of trait objects for static dispatch on this
//! frequently-used path.

use std::io::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;

/// Default sink that writes one line per diagnostic to standard error.
///
/// Write failures are swallowed; the dispatcher must never fail or re-enter
/// itself from a post path.
#[derive(Default)]
pub struct StderrSink;

impl StderrSink {
    /// Write one diagnostic line.
    pub fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

/// Sink that captures diagnostic lines to a buffer, for tests.
pub struct BufferSink {
    buffer: Mutex<String>,
}

impl BufferSink {
    /// Create an empty buffer sink.
    pub fn new() -> Self {
        BufferSink {
            buffer: Mutex::new(String::new()),
        }
    }

    /// Write one diagnostic line.
    pub fn write_line(&self, line: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(line);
        buf.push('\n');
    }

    /// All captured output.
    pub fn captured(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Discard captured output.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostic output sink implementation using enum dispatch.
pub enum SinkImpl {
    /// Writes to standard error (default).
    Stderr(StderrSink),
    /// Captures to a buffer (testing).
    Buffer(BufferSink),
}

impl SinkImpl {
    /// Write one diagnostic line.
    pub fn write_line(&self, line: &str) {
        match self {
            SinkImpl::Stderr(s) => s.write_line(line),
            SinkImpl::Buffer(s) => s.write_line(line),
        }
    }

    /// All captured output.
    ///
    /// Returns the empty string for the stderr sink, which does not capture.
    pub fn captured(&self) -> String {
        match self {
            SinkImpl::Stderr(_) => String::new(),
            SinkImpl::Buffer(s) => s.captured(),
        }
    }

    /// Discard captured output. No-op for the stderr sink.
    pub fn clear(&self) {
        match self {
            SinkImpl::Stderr(_) => {}
            SinkImpl::Buffer(s) => s.clear(),
        }
    }
}

/// Shared sink handle installed on a dispatcher.
pub type SharedSink = Arc<SinkImpl>;

/// Create the default stderr sink.
pub fn stderr_sink() -> SharedSink {
    Arc::new(SinkImpl::Stderr(StderrSink))
}

/// Create a capturing buffer sink.
pub fn buffer_sink() -> SharedSink {
    Arc::new(SinkImpl::Buffer(BufferSink::new()))
}
