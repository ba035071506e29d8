use super::*;

fn context() -> CallContext {
    CallContext::new("src/loader.rs", 42, "myapp::loader::read_asset")
}

#[test]
fn function_is_last_path_segment() {
    let ctx = context();
    assert_eq!(ctx.function(), "read_asset");
    assert_eq!(ctx.pretty_function(), "myapp::loader::read_asset");
}

#[test]
fn function_without_path_is_unchanged() {
    let ctx = CallContext::new("main.rs", 1, "main");
    assert_eq!(ctx.function(), "main");
}

#[test]
fn render_contains_kind_code_context_and_commentary() {
    let record = DiagnosticRecord::new(
        DiagnosticKind::Error,
        DiagnosticCode::RuntimeError,
        "RUNTIME_ERROR",
        context(),
        "asset not found",
        DiagnosticInfo::none(),
    );
    let line = record.to_string();
    assert_eq!(
        line,
        "error: RUNTIME_ERROR: asset not found [read_asset at src/loader.rs:42]"
    );
}

#[test]
fn fatal_renders_with_fatal_tag() {
    let record = DiagnosticRecord::new(
        DiagnosticKind::Fatal,
        DiagnosticCode::FatalError,
        "FATAL_ERROR",
        context(),
        "out of memory",
        DiagnosticInfo::none(),
    );
    assert!(record.to_string().starts_with("fatal error: FATAL_ERROR:"));
}

#[test]
fn info_roundtrips_through_downcast() {
    let info = DiagnosticInfo::new(vec![1_u32, 2, 3]);
    assert!(!info.is_empty());
    assert_eq!(info.downcast_ref::<Vec<u32>>(), Some(&vec![1, 2, 3]));
    assert!(info.downcast_ref::<String>().is_none());
}

#[test]
fn empty_info_downcasts_to_nothing() {
    let info = DiagnosticInfo::none();
    assert!(info.is_empty());
    assert!(info.downcast_ref::<u32>().is_none());
}

#[test]
fn serial_starts_unassigned() {
    let record = DiagnosticRecord::new(
        DiagnosticKind::Error,
        DiagnosticCode::CodingError,
        "CODING_ERROR",
        context(),
        "bad call",
        DiagnosticInfo::none(),
    );
    assert_eq!(record.serial(), 0);
}

#[test]
fn quiet_flag_is_carried() {
    let record = DiagnosticRecord::new(
        DiagnosticKind::Warning,
        DiagnosticCode::Warning,
        "WARNING",
        context(),
        "deprecated",
        DiagnosticInfo::none(),
    )
    .with_quiet(true);
    assert!(record.is_quiet());
}
