//! Diagnostic record value types.
//!
//! A [`DiagnosticRecord`] is an immutable snapshot of one reportable event:
//! its kind, semantic code, call-site context, rendered commentary, and an
//! opaque info payload. Records appended to a thread's error stream are
//! additionally stamped with a process-wide serial number used for ordering;
//! the serial is reassigned at most once, when a record is moved between
//! threads by [`crate::ErrorTransport`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::DiagnosticCode;

/// Kind of a diagnostic: which routing path it takes through the dispatcher.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticKind {
    /// Recoverable error; enters the calling thread's error stream.
    Error,
    /// Advisory; delivered to the delegate or printed, never stored.
    Warning,
    /// Informational; delivered to the delegate or printed, never stored.
    Status,
    /// Unrecoverable; terminates the process.
    Fatal,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
            DiagnosticKind::Status => write!(f, "status"),
            DiagnosticKind::Fatal => write!(f, "fatal error"),
        }
    }
}

/// Call-site context captured when a diagnostic is posted.
///
/// The posting macros fill this in from `file!()`, `line!()`, and a
/// type-name probe that yields the fully qualified enclosing function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallContext {
    file: &'static str,
    line: u32,
    pretty_function: &'static str,
}

impl CallContext {
    /// Create a call context from explicit components.
    pub const fn new(file: &'static str, line: u32, pretty_function: &'static str) -> Self {
        CallContext {
            file,
            line,
            pretty_function,
        }
    }

    /// Source file path.
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Source line number (1-based).
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Fully qualified function path, e.g. `myapp::loader::read_asset`.
    pub const fn pretty_function(&self) -> &'static str {
        self.pretty_function
    }

    /// Bare function name: the last path segment of [`pretty_function`].
    ///
    /// [`pretty_function`]: CallContext::pretty_function
    pub fn function(&self) -> &'static str {
        self.pretty_function
            .rsplit("::")
            .next()
            .unwrap_or(self.pretty_function)
    }
}

/// Opaque auxiliary payload attached to a diagnostic.
///
/// Transported as-is; the dispatcher never inspects it. Consumers that know
/// the concrete type recover it with [`DiagnosticInfo::downcast_ref`].
#[derive(Clone, Default)]
pub struct DiagnosticInfo(Option<Arc<dyn Any + Send + Sync>>);

impl DiagnosticInfo {
    /// The empty payload.
    pub const fn none() -> Self {
        DiagnosticInfo(None)
    }

    /// Wrap a value as an opaque payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        DiagnosticInfo(Some(Arc::new(value)))
    }

    /// Recover the payload if it has type `T`.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.as_deref().and_then(<dyn Any + Send + Sync>::downcast_ref)
    }

    /// Whether no payload is attached.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for DiagnosticInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_some() {
            write!(f, "DiagnosticInfo(<opaque>)")
        } else {
            write!(f, "DiagnosticInfo(None)")
        }
    }
}

/// One reportable diagnostic event.
///
/// Immutable after construction, with one exception: the serial number is
/// (re)assigned by the dispatcher when the record is appended to an error
/// stream or spliced into another thread's stream.
#[derive(Clone, Debug)]
pub struct DiagnosticRecord {
    kind: DiagnosticKind,
    code: DiagnosticCode,
    code_name: &'static str,
    context: CallContext,
    commentary: String,
    info: DiagnosticInfo,
    quiet: bool,
    serial: u64,
}

impl DiagnosticRecord {
    /// Build a record. The serial is unassigned until the dispatcher stamps
    /// it at append time.
    pub fn new(
        kind: DiagnosticKind,
        code: DiagnosticCode,
        code_name: &'static str,
        context: CallContext,
        commentary: impl Into<String>,
        info: DiagnosticInfo,
    ) -> Self {
        DiagnosticRecord {
            kind,
            code,
            code_name,
            context,
            commentary: commentary.into(),
            info,
            quiet: false,
            serial: 0,
        }
    }

    /// Mark the record as quiet: suppressed from stderr even when the
    /// dispatcher is not globally quiet.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Kind of this diagnostic.
    pub const fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Semantic category code.
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Human-readable spelling of the code.
    pub const fn code_name(&self) -> &'static str {
        self.code_name
    }

    /// Call-site context.
    pub const fn context(&self) -> &CallContext {
        &self.context
    }

    /// Rendered human-readable message.
    pub fn commentary(&self) -> &str {
        &self.commentary
    }

    /// Opaque auxiliary payload.
    pub const fn info(&self) -> &DiagnosticInfo {
        &self.info
    }

    /// Whether this record is individually suppressed from stderr.
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Process-wide ordering stamp. Zero until assigned at append time.
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    pub(crate) fn set_serial(&mut self, serial: u64) {
        self.serial = serial;
    }
}

impl fmt::Display for DiagnosticRecord {
    /// One human-readable log line: kind tag, code name, commentary, and
    /// call context. No structural format is guaranteed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} [{} at {}:{}]",
            self.kind,
            self.code_name,
            self.commentary,
            self.context.function(),
            self.context.file(),
            self.context.line(),
        )
    }
}

#[cfg(test)]
mod tests;
