use std::cmp::Ordering;

use idea_capture::index::{collate, priority_rank, IndexKey, IndexName, Reduce, ViewQuery};
use idea_capture::models::{Idea, MetadataValue, Priority, Status};
use serde_json::json;

fn tagged(content: &str, tags: &[&str], status: Status, priority: Priority) -> Idea {
    let mut idea = Idea::new(content);
    idea.tags = tags.iter().map(|tag| (*tag).to_owned()).collect();
    idea.status = status;
    idea.priority = priority;
    idea
}

#[test]
fn unknown_priority_ranks_last() {
    assert_eq!(priority_rank("high"), 1);
    assert_eq!(priority_rank("urgent"), 4);
}

#[test]
fn single_field_indexes_emit_one_row() {
    let idea = tagged("x", &["a"], Status::Done, Priority::Low);
    let rows = IndexName::ByStatus.emit(&idea);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key, IndexKey::status(Status::Done));
    assert_eq!(rows[0].value, json!(null));

    let rows = IndexName::ByPriority.emit(&idea);
    assert_eq!(rows[0].key, IndexKey::priority(Priority::Low));
}

#[test]
fn tag_indexes_emit_one_row_per_tag() {
    let idea = tagged("x", &["a", "b", "c"], Status::Todo, Priority::High);
    assert_eq!(IndexName::ByTag.emit(&idea).len(), 3);
    let compound = IndexName::ByTagAndStatus.emit(&idea);
    assert_eq!(compound[1].key, IndexKey(json!(["b", "todo"])));
    let counted = IndexName::AllTags.emit(&idea);
    assert!(counted.iter().all(|row| row.value == json!(1)));
}

#[test]
fn next_actions_only_covers_todo() {
    for status in Status::ALL {
        let idea = tagged("x", &[], status, Priority::High);
        let rows = IndexName::NextActions.emit(&idea);
        if status == Status::Todo {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].key, IndexKey::rank(1));
        } else {
            assert!(rows.is_empty(), "{status} must not be a next action");
        }
    }
}

#[test]
fn status_and_priority_key_uses_rank() {
    let idea = tagged("x", &[], Status::InProgress, Priority::Medium);
    let rows = IndexName::ByStatusAndPriority.emit(&idea);
    assert_eq!(rows[0].key, IndexKey(json!(["in-progress", 2])));
    assert_eq!(
        rows[0].key,
        IndexKey::status_priority(Status::InProgress, Priority::Medium)
    );
}

#[test]
fn metadata_keys_emit_each_key() {
    let mut idea = Idea::new("x");
    idea.metadata
        .insert("project".into(), MetadataValue::from("home"));
    idea.metadata.insert("source".into(), MetadataValue::Null);
    let keys: Vec<String> = IndexName::MetadataKeys
        .emit(&idea)
        .into_iter()
        .map(|row| row.key.to_text())
        .collect();
    assert_eq!(keys, vec!["project", "source"]);
}

#[test]
fn formatted_list_value_carries_display_line() {
    let idea = tagged("Ship it", &["work"], Status::Todo, Priority::High);
    let rows = IndexName::FormattedList.emit(&idea);
    assert_eq!(rows[0].value["display"], json!("☐ 🔴 Ship it [#work]"));
    assert_eq!(rows[0].key.0[0], json!(1));
}

#[test]
fn reduce_kinds() {
    assert_eq!(IndexName::ByStatus.reduce(), Some(Reduce::Count));
    assert_eq!(IndexName::ByTag.reduce(), Some(Reduce::Count));
    assert_eq!(IndexName::AllTags.reduce(), Some(Reduce::Sum));
    assert_eq!(IndexName::MetadataKeys.reduce(), Some(Reduce::Count));
    assert_eq!(IndexName::NextActions.reduce(), None);
    assert_eq!(IndexName::ByStatusAndPriority.reduce(), None);
    assert_eq!(IndexName::FormattedList.reduce(), None);
}

#[test]
fn string_keys_sort_case_insensitively() {
    let mut keys: Vec<IndexKey> = ["b", "a", "C", "A"]
        .into_iter()
        .map(IndexKey::tag)
        .collect();
    keys.sort();
    let sorted: Vec<String> = keys.iter().map(IndexKey::to_text).collect();
    assert_eq!(sorted, vec!["a", "A", "b", "C"]);
    assert_eq!(collate(&json!(null), &json!(false)), Ordering::Less);
}

#[test]
fn lowercase_sorts_before_uppercase_on_case_ties() {
    assert_eq!(collate(&json!("a"), &json!("A")), Ordering::Less);
    assert_eq!(collate(&json!("A"), &json!("a")), Ordering::Greater);
    assert_eq!(collate(&json!("A"), &json!("b")), Ordering::Less);
    assert_eq!(collate(&json!("Rust"), &json!("rust")), Ordering::Greater);
    assert_eq!(collate(&json!("rust"), &json!("rust")), Ordering::Equal);

    let mut keys: Vec<IndexKey> = ["Work", "work", "WORK"]
        .into_iter()
        .map(IndexKey::tag)
        .collect();
    keys.sort();
    let sorted: Vec<String> = keys.iter().map(IndexKey::to_text).collect();
    assert_eq!(sorted, vec!["work", "Work", "WORK"]);
}

#[test]
fn compound_keys_compare_elementwise() {
    let low = IndexKey::status_priority(Status::Todo, Priority::High);
    let high = IndexKey::status_priority(Status::Todo, Priority::Low);
    assert!(low < high);
    assert!(IndexKey(json!(["done", 3])) < low);
}

#[test]
fn view_query_matching() {
    let key = IndexKey::tag("rust");
    assert!(ViewQuery::All.matches(&key));
    assert!(ViewQuery::Key(IndexKey::tag("rust")).matches(&key));
    assert!(!ViewQuery::Key(IndexKey::tag("go")).matches(&key));
    let range = ViewQuery::Range {
        start: IndexKey::tag("q"),
        end: IndexKey::tag("s"),
    };
    assert!(range.matches(&key));
    assert!(!range.matches(&IndexKey::tag("t")));
}

#[test]
fn query_value_is_json_text() {
    assert_eq!(IndexKey::tag("a b").to_query_value(), "\"a b\"");
    assert_eq!(
        IndexKey::tag_status("x", Status::Done).to_query_value(),
        r#"["x","done"]"#
    );
}
