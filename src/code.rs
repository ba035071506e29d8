//! Semantic category codes for diagnostics.
//!
//! Every posted diagnostic carries a [`DiagnosticCode`] identifying its
//! semantic category, plus the code's canonical spelling for rendering.
//! Call sites normally pass the spelling produced by the posting macros
//! (`stringify!` of the enumerator), so custom spellings are possible for
//! codes bridged in from other subsystems.

use std::fmt;

/// Semantic category of a diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticCode {
    /// A bug in the calling code: an API contract was violated.
    CodingError,
    /// A coding error severe enough to terminate the process.
    FatalCodingError,
    /// An error caused by invalid input or environment, not by a bug.
    RuntimeError,
    /// An unrecoverable error; the process cannot continue.
    FatalError,
    /// An error the caller is expected to handle and drain.
    NonfatalError,
    /// An advisory condition that does not enter the error stream.
    Warning,
    /// A progress or informational message.
    Status,
    /// Orderly process exit requested through the fatal path.
    ApplicationExit,
}

impl DiagnosticCode {
    /// Canonical spelling of the code.
    pub const fn name(self) -> &'static str {
        match self {
            DiagnosticCode::CodingError => "CODING_ERROR",
            DiagnosticCode::FatalCodingError => "FATAL_CODING_ERROR",
            DiagnosticCode::RuntimeError => "RUNTIME_ERROR",
            DiagnosticCode::FatalError => "FATAL_ERROR",
            DiagnosticCode::NonfatalError => "NONFATAL_ERROR",
            DiagnosticCode::Warning => "WARNING",
            DiagnosticCode::Status => "STATUS",
            DiagnosticCode::ApplicationExit => "APPLICATION_EXIT",
        }
    }

    /// Whether this code denotes a condition that must terminate the process.
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            DiagnosticCode::FatalCodingError
                | DiagnosticCode::FatalError
                | DiagnosticCode::ApplicationExit
        )
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
