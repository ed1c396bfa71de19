mod common;

use chrono::{Duration, Utc};

use clipboard_core::history::popular_tags;
use clipboard_core::models::ContentType;
use clipboard_core::query::{SmartSearch, contains_ignore_case};
use clipboard_core::settings::CoreSettings;

use common::{Harness, history_item};

fn seeded() -> Harness {
    let h = Harness::new();
    for id in 1..=5 {
        let mut item = history_item(id, ContentType::Text, &format!("note {id}"));
        if id % 2 == 0 {
            item.tags = vec!["work".to_string()];
        }
        h.store.insert(item);
    }
    h
}

fn ids(h: &Harness) -> Vec<i64> {
    h.history.current().iter().map(|item| item.id).collect()
}

#[tokio::test]
async fn load_history_pages_newest_first() {
    let h = seeded();
    h.history.load_history(2, 1).await.expect("load");
    assert_eq!(ids(&h), vec![4, 3]);
}

#[tokio::test]
async fn delete_refreshes_with_last_page_request() {
    let h = seeded();
    h.history.load_history(3, 0).await.expect("load");
    h.history.delete_item(4).await.expect("delete");
    assert_eq!(ids(&h), vec![5, 3, 2]);
}

#[tokio::test]
async fn search_replaces_current_page() {
    let h = seeded();
    h.history.search_history("NOTE 3", 10).await.expect("search");
    assert_eq!(ids(&h), vec![3]);
}

#[tokio::test]
async fn clear_history_reports_removed_count() {
    let h = seeded();
    let removed = h.history.clear_history(Some(2), None).await.expect("clear");
    assert_eq!(removed, 3);
    assert_eq!(ids(&h), vec![5, 4]);
}

#[tokio::test]
async fn retention_applies_count_then_age() {
    let h = Harness::new();
    let mut old = history_item(1, ContentType::Text, "old");
    old.created_at = Utc::now() - Duration::days(40);
    h.store.insert(old);
    for id in 2..=4 {
        h.store.insert(history_item(id, ContentType::Text, "fresh"));
    }

    let settings = CoreSettings {
        max_history_count: 3,
        auto_cleanup_days: 30,
        ..CoreSettings::default()
    };
    let removed = h.history.apply_retention(&settings).await.expect("retention");
    assert_eq!(removed, 1);
    assert_eq!(ids(&h), vec![4, 3, 2]);

    let disabled = CoreSettings {
        max_history_count: 0,
        auto_cleanup_days: 0,
        ..CoreSettings::default()
    };
    assert_eq!(h.history.apply_retention(&disabled).await.expect("noop"), 0);
}

#[tokio::test]
async fn smart_search_filters_current_page() {
    let h = seeded();
    h.history.load_history(10, 0).await.expect("load");

    let mut search = SmartSearch::default();
    search.set_query("note");
    search.add_tag_to_search("work");

    let hits: Vec<i64> = h
        .history
        .filter(&search.parsed(), contains_ignore_case)
        .iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(hits, vec![4, 2]);

    search.clear_search();
    assert_eq!(h.history.filter(&search.parsed(), contains_ignore_case).len(), 5);
}

#[tokio::test]
async fn popular_tags_over_current_page() {
    let h = seeded();
    h.history.load_history(10, 0).await.expect("load");
    let tags = popular_tags(&h.history.current(), 10);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].tag, "work");
    assert_eq!(tags[0].count, 2);
}

#[tokio::test]
async fn update_tags_normalizes_and_refreshes_page() {
    let h = seeded();
    h.history.load_history(10, 0).await.expect("load");

    h.history
        .update_tags(
            3,
            vec![" urgent ".to_string(), "urgent".to_string(), "  ".to_string(), "work".to_string()],
        )
        .await
        .expect("update tags");

    let page = h.history.current();
    let item = page.iter().find(|item| item.id == 3).expect("item 3 on page");
    assert_eq!(item.tags, vec!["urgent".to_string(), "work".to_string()]);

    let mut search = SmartSearch::default();
    search.set_query("@urgent");
    let hits = h.history.filter(&search.parsed(), contains_ignore_case);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 3);
}

#[tokio::test]
async fn update_tags_for_missing_item_keeps_page() {
    let h = seeded();
    h.history.load_history(10, 0).await.expect("load");
    let before = h.history.current();

    let result = h.history.update_tags(99, vec!["x".to_string()]).await;
    assert!(result.is_err());
    assert_eq!(h.history.current(), before);
}

#[tokio::test]
async fn all_tags_are_sorted_and_unique_across_store() {
    let h = seeded();
    h.history.update_tags(1, vec!["misc".to_string()]).await.expect("tag 1");
    h.history.update_tags(5, vec!["alpha".to_string(), "work".to_string()]).await.expect("tag 5");

    let tags = h.history.all_tags().await.expect("all tags");
    assert_eq!(tags, vec!["alpha".to_string(), "misc".to_string(), "work".to_string()]);
}
