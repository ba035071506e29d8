//! Context-capturing posting macros.
//!
//! The user-facing way to post: each macro captures the call site's file,
//! line, and enclosing function, formats the commentary, and hands the
//! rendered string to the singleton dispatcher.
//!
//! ```no_run
//! use diagmgr::{diag_error, DiagnosticCode};
//!
//! fn load(path: &str) {
//!     diag_error!(DiagnosticCode::RuntimeError, "cannot load {path}");
//! }
//! ```

/// Fully qualified name of the enclosing function, as a `&'static str`.
#[doc(hidden)]
#[macro_export]
macro_rules! diag_function {
    () => {{
        fn probe() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(probe);
        name.strip_suffix("::probe").unwrap_or(name)
    }};
}

/// Capture a [`crate::CallContext`] for the current call site.
#[macro_export]
macro_rules! diag_context {
    () => {
        $crate::CallContext::new(file!(), line!(), $crate::diag_function!())
    };
}

/// Post a formatted error to the singleton dispatcher.
///
/// Returns `Some` cursor to the appended record on the main thread, `None`
/// on any other thread (where the error goes to stderr only).
#[macro_export]
macro_rules! diag_error {
    ($code:expr, $($arg:tt)+) => {{
        let code: $crate::DiagnosticCode = $code;
        $crate::DiagnosticMgr::get().post_error(
            code,
            code.name(),
            $crate::diag_context!(),
            ::std::format!($($arg)+),
            $crate::DiagnosticInfo::none(),
            false,
        )
    }};
}

/// Post a formatted warning to the singleton dispatcher.
#[macro_export]
macro_rules! diag_warning {
    ($code:expr, $($arg:tt)+) => {{
        let code: $crate::DiagnosticCode = $code;
        $crate::DiagnosticMgr::get().post_warning(
            code,
            code.name(),
            $crate::diag_context!(),
            ::std::format!($($arg)+),
            $crate::DiagnosticInfo::none(),
            false,
        )
    }};
}

/// Post a formatted status message to the singleton dispatcher.
#[macro_export]
macro_rules! diag_status {
    ($code:expr, $($arg:tt)+) => {{
        let code: $crate::DiagnosticCode = $code;
        $crate::DiagnosticMgr::get().post_status(
            code,
            code.name(),
            $crate::diag_context!(),
            ::std::format!($($arg)+),
            $crate::DiagnosticInfo::none(),
            false,
        )
    }};
}

/// Post a formatted fatal diagnostic to the singleton dispatcher and
/// terminate the process. Does not return.
#[macro_export]
macro_rules! diag_fatal {
    ($code:expr, $($arg:tt)+) => {{
        let code: $crate::DiagnosticCode = $code;
        $crate::DiagnosticMgr::get().post_fatal(
            $crate::diag_context!(),
            code,
            &::std::format!($($arg)+),
        )
    }};
}
