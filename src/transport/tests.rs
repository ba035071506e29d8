use super::*;
use crate::{CallContext, DiagnosticCode, DiagnosticInfo, DiagnosticKind};
use pretty_assertions::assert_eq;

fn record(msg: &str) -> DiagnosticRecord {
    DiagnosticRecord::new(
        DiagnosticKind::Error,
        DiagnosticCode::RuntimeError,
        "RUNTIME_ERROR",
        CallContext::new("transport.rs", 1, "tests::record"),
        msg,
        DiagnosticInfo::none(),
    )
}

fn post(mgr: &DiagnosticMgr, msg: &str) {
    mgr.post_error(
        DiagnosticCode::RuntimeError,
        DiagnosticCode::RuntimeError.name(),
        CallContext::new("transport.rs", 1, "tests::post"),
        msg,
        DiagnosticInfo::none(),
        true,
    );
}

#[test]
fn post_assigns_fresh_ascending_serials() {
    let mgr = DiagnosticMgr::new();
    post(&mgr, "existing");

    let mut transport = ErrorTransport::new();
    transport.add(record("P"));
    transport.add(record("Q"));
    assert_eq!(transport.len(), 2);

    transport.post(&mgr);
    assert!(transport.is_empty());

    let all = mgr.errors_in(mgr.error_begin(), mgr.error_end());
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].commentary(), "P");
    assert_eq!(all[2].commentary(), "Q");
    assert!(all[0].serial() < all[1].serial());
    assert!(all[1].serial() < all[2].serial());
    mgr.erase_range(mgr.error_begin(), mgr.error_end());
}

#[test]
fn posting_an_empty_transport_is_a_no_op() {
    let mgr = DiagnosticMgr::new();
    let mut transport = ErrorTransport::new();
    transport.post(&mgr);
    assert_eq!(mgr.error_count_in(mgr.error_begin(), mgr.error_end()), 0);
}

#[test]
fn mark_transport_drains_the_source_region() {
    let mgr = DiagnosticMgr::new();
    post(&mgr, "before");
    let mark = mgr.mark();
    post(&mgr, "taken one");
    post(&mgr, "taken two");

    let transport = mark.transport();
    assert_eq!(transport.len(), 2);
    assert!(mark.is_clean());

    let remaining = mgr.errors_in(mgr.error_begin(), mgr.error_end());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].commentary(), "before");
    mgr.erase_range(mgr.error_begin(), mgr.error_end());
}
