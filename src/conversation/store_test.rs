use super::*;
use crate::conversation::storage::{FileStorage, MemoryStorage};
use crate::conversation::{Conversation, Role};

fn sample() -> Vec<Conversation> {
    let mut a = Conversation::new(1_000);
    a.push(Role::User, "hello", 2_000);
    let b = Conversation::new(3_000);
    vec![a, b]
}

#[test]
fn load_empty_storage_is_empty() {
    let store = ConversationStore::new(MemoryStorage::new());
    assert!(store.load().is_empty());
}

#[test]
fn save_then_load_preserves_order_and_content() {
    let store = ConversationStore::new(MemoryStorage::new());
    let conversations = sample();
    store.save(&conversations);
    assert_eq!(store.load(), conversations);
}

#[test]
fn load_malformed_json_is_empty() {
    let storage = MemoryStorage::new();
    storage.set_item(CONVERSATIONS_KEY, "{not json").unwrap();
    let store = ConversationStore::new(storage);
    assert!(store.load().is_empty());
}

#[test]
fn load_non_array_is_empty() {
    let storage = MemoryStorage::new();
    storage.set_item(CONVERSATIONS_KEY, r#"{"id":"x"}"#).unwrap();
    let store = ConversationStore::new(storage);
    assert!(store.load().is_empty());
}

#[test]
fn load_reads_browser_format() {
    let storage = MemoryStorage::new();
    let raw = r#"[{"id":"c1","title":"hello","createdAt":1,"updatedAt":5,
        "messages":[{"id":"m1","role":"user","content":"hello","createdAt":2}]}]"#;
    storage.set_item(CONVERSATIONS_KEY, raw).unwrap();
    let store = ConversationStore::new(storage);
    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].updated_at, 5);
    assert_eq!(loaded[0].messages[0].role, Role::User);
}

#[test]
fn load_skips_bad_records_and_keeps_the_rest() {
    let storage = MemoryStorage::new();
    let raw = r#"[
        {"id":"c1","title":"Keep me","createdAt":1,"updatedAt":5,
         "messages":[{"id":"m1","role":"user","content":"hello","createdAt":2}]},
        {"id":"c2","title":"Broken","createdAt":1,"updatedAt":6,
         "messages":[{"id":"m2","role":"system","content":"x","createdAt":2}]},
        {"id":"c3","title":"No timestamps"}
    ]"#;
    storage.set_item(CONVERSATIONS_KEY, raw).unwrap();
    let store = ConversationStore::new(storage);

    let loaded = store.load();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Keep me");
}

#[test]
fn session_start_with_bad_record_preserves_good_history() {
    let storage = MemoryStorage::new();
    let raw = r#"[
        {"id":"c1","title":"Keep me","createdAt":1,"updatedAt":5,"messages":[]},
        {"id":"c2","title":"Broken","createdAt":1,"updatedAt":6,
         "messages":[{"id":"m2","role":"system","content":"x","createdAt":2}]}
    ]"#;
    storage.set_item(CONVERSATIONS_KEY, raw).unwrap();
    let store = ConversationStore::new(storage);

    let mut list = crate::conversation::ConversationList::from_loaded(store.load(), 10);
    list.rename("c1", "Still here", 20);
    store.save(list.as_slice());

    let reloaded = store.load();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].id, "c1");
    assert_eq!(reloaded[0].title, "Still here");
}

#[test]
fn save_over_quota_is_silently_ignored() {
    let store = ConversationStore::new(MemoryStorage::with_capacity(16));
    store.save(&sample());
    assert!(store.load().is_empty());
}

#[test]
fn save_over_quota_keeps_previous_snapshot() {
    let store = ConversationStore::new(MemoryStorage::with_capacity(600));
    let small = vec![Conversation::new(1)];
    store.save(&small);
    let mut big = small.clone();
    big[0].push(Role::User, "x".repeat(1_000), 2);
    store.save(&big);
    assert_eq!(store.load(), small);
}

#[test]
fn file_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConversationStore::new(FileStorage::new(dir.path()));
    let conversations = sample();
    store.save(&conversations);

    let reopened = ConversationStore::new(FileStorage::new(dir.path()));
    assert_eq!(reopened.load(), conversations);
}

// =============================================================================
// Model preference
// =============================================================================

#[test]
fn load_model_defaults_to_first_option() {
    let store = ConversationStore::new(MemoryStorage::new());
    assert_eq!(store.load_model(), "gpt-4o-mini");
}

#[test]
fn save_model_persists_known_option() {
    let store = ConversationStore::new(MemoryStorage::new());
    assert!(store.save_model("gpt-4o"));
    assert_eq!(store.load_model(), "gpt-4o");
}

#[test]
fn save_model_rejects_unknown_option() {
    let store = ConversationStore::new(MemoryStorage::new());
    assert!(!store.save_model("mystery-model"));
    assert_eq!(store.load_model(), "gpt-4o-mini");
}

#[test]
fn load_model_ignores_unknown_stored_value() {
    let storage = MemoryStorage::new();
    storage.set_item(MODEL_KEY, "retired-model").unwrap();
    let store = ConversationStore::new(storage);
    assert_eq!(store.load_model(), "gpt-4o-mini");
}
