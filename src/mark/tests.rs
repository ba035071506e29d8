use super::*;
use crate::{CallContext, DiagnosticCode, DiagnosticInfo};
use pretty_assertions::assert_eq;

fn post(mgr: &DiagnosticMgr, msg: &str) {
    mgr.post_error(
        DiagnosticCode::RuntimeError,
        DiagnosticCode::RuntimeError.name(),
        CallContext::new("mark.rs", 1, "tests::post"),
        msg,
        DiagnosticInfo::none(),
        true,
    );
}

#[test]
fn accumulate_then_mark_then_clear() {
    let mgr = DiagnosticMgr::new();
    post(&mgr, "A");

    let mark = mgr.mark();
    assert!(mark.is_clean());
    post(&mgr, "B");
    post(&mgr, "C");

    assert!(!mark.is_clean());
    assert_eq!(mark.error_count(), 2);
    let region: Vec<String> = mark
        .errors()
        .iter()
        .map(|r| r.commentary().to_owned())
        .collect();
    assert_eq!(region, ["B", "C"]);

    mark.clear();
    assert!(mark.is_clean());

    let all = mgr.errors_in(mgr.error_begin(), mgr.error_end());
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].commentary(), "A");
}

#[test]
fn nested_marks_snapshot_in_order() {
    let mgr = DiagnosticMgr::new();
    let outer = mgr.mark();
    post(&mgr, "one");
    let inner = mgr.mark();

    assert!(outer.begin() <= inner.begin());
    assert!(inner.is_clean());
    assert!(!outer.is_clean());

    post(&mgr, "two");
    assert_eq!(inner.error_count(), 1);
    assert_eq!(outer.error_count(), 2);

    // Draining the inner region shrinks the outer one.
    inner.clear();
    assert_eq!(outer.error_count(), 1);
    outer.clear();
}

#[test]
fn mark_depth_tracks_live_marks() {
    let mgr = DiagnosticMgr::new();
    assert!(!mgr.has_active_error_mark());
    {
        let _outer = mgr.mark();
        assert!(mgr.has_active_error_mark());
        {
            let _inner = mgr.mark();
            assert!(mgr.has_active_error_mark());
        }
        assert!(mgr.has_active_error_mark());
    }
    assert!(!mgr.has_active_error_mark());
}

#[test]
fn mark_depth_decrements_on_unwind() {
    let mgr = DiagnosticMgr::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _mark = mgr.mark();
        panic!("unwinding through a live mark");
    }));
    assert!(result.is_err());
    assert!(!mgr.has_active_error_mark());
}

#[test]
fn dropping_a_mark_leaves_errors_in_the_stream() {
    let mgr = DiagnosticMgr::new();
    {
        let mark = mgr.mark();
        post(&mgr, "survives the mark");
        assert!(!mark.is_clean());
    }
    let all = mgr.errors_in(mgr.error_begin(), mgr.error_end());
    assert_eq!(all.len(), 1);
    mgr.erase_range(mgr.error_begin(), mgr.error_end());
}
