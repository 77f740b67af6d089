mod common;

use common::{key_from_url, start_api, wait_until, FakeDesk};
use slot_relay::business::ReceivedKind;
use slot_relay::SlotError;

#[test]
fn password_slot_is_typed_on_shortcut() {
    let dir = tempfile::tempdir().unwrap();
    let desk = FakeDesk::with_clipboard("user copy");
    let api = start_api(&dir, &desk, 8001);

    api.upsert_slot("row2", "s3cret!".into(), true, Some("ctrl+alt+p".into()))
        .unwrap();
    assert!(wait_until(|| desk.is_bound("ctrl+alt+p")));

    assert!(desk.press("ctrl+alt+p"));

    assert!(wait_until(|| desk.typed() == vec!["s3cret!".to_string()]));
    assert!(wait_until(|| desk.is_bound("ctrl+alt+p")));
    assert!(desk.pasted().is_empty());
    assert_eq!(desk.clipboard().as_deref(), Some("user copy"));
}

#[test]
fn plain_slot_is_pasted_and_clipboard_restored() {
    let dir = tempfile::tempdir().unwrap();
    let desk = FakeDesk::with_clipboard("user copy");
    let api = start_api(&dir, &desk, 8001);

    api.upsert_slot("row1", "hello".into(), false, Some("ctrl+1".into()))
        .unwrap();
    assert!(wait_until(|| desk.is_bound("ctrl+1")));
    desk.press("ctrl+1");

    assert!(wait_until(|| desk.pasted() == vec!["hello".to_string()]));
    assert!(wait_until(|| desk.clipboard().as_deref() == Some("user copy")));
    assert!(desk.typed().is_empty());
}

#[test]
fn clipboard_pairing_sets_the_clipboard() {
    let dir = tempfile::tempdir().unwrap();
    let desk = FakeDesk::default();
    let api = start_api(&dir, &desk, 8001);
    let key = key_from_url(&api.begin_pairing("CLIPBOARD", "127.0.0.1").unwrap().url);

    api.submit(&key, "from phone").unwrap();

    assert!(wait_until(|| desk.clipboard().as_deref() == Some("from phone")));
    assert!(api.get_initial_state().slots.is_empty());
    assert_eq!(
        api.poll_received().map(|n| n.kind),
        Some(ReceivedKind::Clipboard)
    );
    assert_eq!(api.poll_received(), None);
}

#[test]
fn slots_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let api = start_api(&dir, &FakeDesk::default(), 8001);
        api.upsert_slot("row1", "kept".into(), false, Some("ctrl+1".into()))
            .unwrap();
    }

    let desk = FakeDesk::default();
    let api = start_api(&dir, &desk, 8001);

    assert_eq!(api.get_initial_state().slots["row1"].text, "kept");
    assert!(desk.is_bound("ctrl+1"));
}

#[test]
fn reset_all_wipes_store_and_shortcuts() {
    let dir = tempfile::tempdir().unwrap();
    let desk = FakeDesk::default();
    let api = start_api(&dir, &desk, 8001);
    api.upsert_slot("row1", "a".into(), false, Some("ctrl+1".into()))
        .unwrap();
    api.set_pin("4321").unwrap();
    let key = key_from_url(&api.begin_pairing("row1", "127.0.0.1").unwrap().url);
    assert!(wait_until(|| desk.is_bound("ctrl+1")));

    assert!(api.reset_all());

    assert!(api.get_initial_state().is_empty());
    assert!(!api.has_pin());
    assert!(!dir.path().join("slots.dat").exists());
    assert!(api.submit(&key, "late").is_err());
    assert!(wait_until(|| !desk.is_bound("ctrl+1")));
}

#[test]
fn pairing_refuses_targets_that_cannot_hold_text() {
    let dir = tempfile::tempdir().unwrap();
    let api = start_api(&dir, &FakeDesk::default(), 8001);

    let err = api.begin_pairing("__SETTINGS__", "127.0.0.1").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SlotError>(),
        Some(SlotError::ReservedId(_))
    ));
    assert!(api.begin_pairing("", "127.0.0.1").is_err());

    assert!(!api.pairing().is_armed());
    assert!(api.get_initial_state().slots.is_empty());
}
