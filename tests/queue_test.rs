mod common;

use std::sync::atomic::Ordering;

use clipboard_core::models::ContentType;
use clipboard_core::queue::{PasteQueue, SeparatorMode};
use clipboard_core::settings::CoreSettings;

use common::{Harness, Written, history_item};

#[test]
fn merge_strips_html_entries() {
    let mut queue = PasteQueue::new();
    queue.add(history_item(1, ContentType::Text, "A"));
    queue.add(history_item(2, ContentType::Html, "<b>B</b>"));
    assert_eq!(queue.merge(SeparatorMode::Newline, ""), "A\nB");
}

#[test]
fn duplicate_add_keeps_length() {
    let mut queue = PasteQueue::new();
    queue.add(history_item(1, ContentType::Text, "A"));
    queue.add(history_item(1, ContentType::Text, "A"));
    assert_eq!(queue.len(), 1);
}

#[test]
fn move_to_queue_length_is_ignored() {
    let mut queue = PasteQueue::new();
    for id in 1..=3 {
        queue.add(history_item(id, ContentType::Text, &id.to_string()));
    }
    queue.move_entry(0, queue.len());
    assert_eq!(queue.snapshot().ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn paste_writes_merged_text_as_internal_copy() {
    let h = Harness::new();
    h.bridge.start().expect("start");

    let mut queue = PasteQueue::from_settings(&CoreSettings {
        paste_queue_separator: SeparatorMode::Custom,
        paste_queue_custom_separator: " + ".to_string(),
        ..CoreSettings::default()
    });
    queue.add(history_item(1, ContentType::Text, "one"));
    queue.add(history_item(2, ContentType::Text, "two"));

    let pasted = queue.paste(&h.dispatcher).await.expect("paste");
    assert_eq!(pasted.as_deref(), Some("one + two"));
    assert_eq!(h.binding.writes(), vec![Written::Text("one + two".to_string())]);
    assert_eq!(queue.len(), 2);

    h.bridge.process_pending().await;
    assert!(h.store.persisted()[0].is_internal_copy);
}

#[tokio::test]
async fn paste_auto_clears_when_enabled() {
    let h = Harness::new();
    let mut queue = PasteQueue::from_settings(&CoreSettings {
        paste_queue_auto_clear: true,
        ..CoreSettings::default()
    });
    let snapshots = queue.subscribe();
    queue.add(history_item(1, ContentType::Text, "one"));

    queue.paste(&h.dispatcher).await.expect("paste");
    assert!(queue.is_empty());
    assert_eq!(snapshots.borrow().count, 0);
}

#[tokio::test]
async fn empty_queue_paste_writes_nothing() {
    let h = Harness::new();
    let mut queue = PasteQueue::new();
    assert_eq!(queue.paste(&h.dispatcher).await.expect("paste"), None);
    assert!(h.binding.writes().is_empty());
}

#[tokio::test]
async fn failed_paste_keeps_queue() {
    let h = Harness::new();
    h.binding.fail_write.store(true, Ordering::SeqCst);
    let mut queue = PasteQueue::from_settings(&CoreSettings {
        paste_queue_auto_clear: true,
        ..CoreSettings::default()
    });
    queue.add(history_item(1, ContentType::Text, "one"));

    assert!(queue.paste(&h.dispatcher).await.is_err());
    assert_eq!(queue.len(), 1);
}
