use super::*;
use tokio_util::sync::CancellationToken;

fn composer() -> Composer {
    Composer::new(StopHandle::default())
}

#[test]
fn rows_grow_with_lines_and_clamp() {
    let mut c = composer();
    assert_eq!(c.rows(), 1);
    c.set_input("a\nb\nc");
    assert_eq!(c.rows(), 3);
    c.set_input("\n".repeat(20));
    assert_eq!(c.rows(), MAX_ROWS);
}

#[test]
fn can_send_needs_text_and_idle() {
    let mut c = composer();
    assert!(!c.can_send(false));
    c.set_input("   \n ");
    assert!(!c.can_send(false));
    c.set_input("hi");
    assert!(c.can_send(false));
    assert!(!c.can_send(true));
}

#[test]
fn enter_submits_trimmed_text_and_clears() {
    let mut c = composer();
    c.set_input("  hello  ");
    assert_eq!(c.on_enter(false, false), KeyAction::Submit("hello".into()));
    assert_eq!(c.input(), "");
}

#[test]
fn shift_enter_inserts_newline() {
    let mut c = composer();
    c.set_input("line");
    assert_eq!(c.on_enter(true, false), KeyAction::Newline);
    assert_eq!(c.input(), "line\n");
    assert_eq!(c.rows(), 2);
}

#[test]
fn enter_while_in_flight_keeps_draft() {
    let mut c = composer();
    c.set_input("queued");
    assert_eq!(c.on_enter(false, true), KeyAction::Ignored);
    assert_eq!(c.input(), "queued");
    assert_eq!(c.submit(true), None);
}

#[test]
fn stop_cancels_in_flight_turn() {
    let handle = StopHandle::default();
    let c = Composer::new(handle.clone());
    assert!(!c.can_stop());
    assert!(!c.stop());

    let token = CancellationToken::new();
    handle.arm(token.clone());
    assert!(c.can_stop());
    assert!(c.stop());
    assert!(token.is_cancelled());

    handle.disarm();
    assert!(!c.can_stop());
}
