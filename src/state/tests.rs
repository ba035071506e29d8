use super::*;
use crate::{CallContext, DiagnosticCode, DiagnosticInfo, DiagnosticKind};
use pretty_assertions::assert_eq;

fn record(serial: u64, msg: &str) -> DiagnosticRecord {
    let mut r = DiagnosticRecord::new(
        DiagnosticKind::Error,
        DiagnosticCode::RuntimeError,
        "RUNTIME_ERROR",
        CallContext::new("state.rs", 1, "tests::record"),
        msg,
        DiagnosticInfo::none(),
    );
    r.set_serial(serial);
    r
}

#[test]
fn log_text_mirrors_appends() {
    let mut state = ThreadState::new();
    assert!(state.log_text.is_none());

    state.append(record(1, "one"));
    state.append(record(2, "two"));

    let expected = format!("{}\n{}\n", record(1, "one"), record(2, "two"));
    assert_eq!(state.log_snapshot(), expected);
}

#[test]
fn truncate_records_drops_tail_text() {
    let mut log = LogText::new();
    log.append(&record(1, "a"));
    log.append(&record(2, "b"));
    log.append(&record(3, "c"));

    log.truncate_records(1);
    assert_eq!(log.as_str(), format!("{}\n", record(1, "a")));

    log.truncate_records(0);
    assert_eq!(log.as_str(), "");
}

#[test]
fn rebuild_rerenders_remaining_records() {
    let mut log = LogText::new();
    log.append(&record(1, "a"));
    log.append(&record(2, "b"));

    let remaining = [record(1, "a"), record(3, "c")];
    log.rebuild(&remaining);
    assert_eq!(
        log.as_str(),
        format!("{}\n{}\n", record(1, "a"), record(3, "c"))
    );
}

#[test]
fn first_at_or_after_is_a_lower_bound() {
    let mut state = ThreadState::new();
    for serial in [2, 4, 6] {
        state.append(record(serial, "x"));
    }

    assert_eq!(state.first_at_or_after(1), 0);
    assert_eq!(state.first_at_or_after(2), 0);
    assert_eq!(state.first_at_or_after(3), 1);
    assert_eq!(state.first_at_or_after(6), 2);
    assert_eq!(state.first_at_or_after(7), 3);
}

#[test]
fn states_are_keyed_by_dispatcher_id() {
    with_state(u64::MAX, |st| st.append(record(1, "a")));
    with_state(u64::MAX - 1, |st| assert!(st.errors.is_empty()));
    with_state(u64::MAX, |st| {
        assert_eq!(st.errors.len(), 1);
        st.errors.clear();
        st.log_text = None;
    });
}

#[test]
fn states_are_thread_isolated() {
    with_state(u64::MAX - 2, |st| st.append(record(1, "main side")));
    std::thread::scope(|s| {
        s.spawn(|| {
            with_state(u64::MAX - 2, |st| assert!(st.errors.is_empty()));
        });
    });
    with_state(u64::MAX - 2, |st| {
        assert_eq!(st.errors.len(), 1);
        st.errors.clear();
        st.log_text = None;
    });
}
