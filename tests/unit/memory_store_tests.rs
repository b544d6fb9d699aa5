use idea_capture::index::{IndexKey, IndexName, ViewQuery};
use idea_capture::models::{Idea, Status};
use idea_capture::persistence::{DocumentStore, MemoryStore, StoreCall};
use idea_capture::AppError;

fn idea(content: &str, tags: &[&str]) -> Idea {
    let mut idea = Idea::new(content);
    idea.tags = tags.iter().map(|tag| (*tag).to_owned()).collect();
    idea
}

#[tokio::test]
async fn put_then_get_assigns_revision() {
    let store = MemoryStore::new();
    let idea = idea("a", &[]);
    let revision = store.put(&idea).await.expect("create");
    assert!(revision.starts_with("1-"));

    let stored = store.get(&idea.id).await.expect("get").expect("present");
    assert_eq!(stored.revision.as_deref(), Some(revision.as_str()));
    assert_eq!(stored.content, "a");
}

#[tokio::test]
async fn stale_revision_conflicts_and_keeps_document() {
    let store = MemoryStore::new();
    let mut idea = idea("first", &[]);
    let first = store.put(&idea).await.expect("create");

    idea.revision = Some(first.clone());
    idea.content = "second".into();
    let second = store.put(&idea).await.expect("update");
    assert!(second.starts_with("2-"));

    idea.revision = Some(first);
    idea.content = "stale".into();
    let err = store.put(&idea).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = store.get(&idea.id).await.unwrap().unwrap();
    assert_eq!(stored.content, "second");
    assert_eq!(stored.revision, Some(second));
}

#[tokio::test]
async fn create_over_existing_id_conflicts() {
    let store = MemoryStore::new();
    let idea = idea("a", &[]);
    store.put(&idea).await.expect("create");
    let written = store.put(&idea).await;
    assert!(matches!(written, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn delete_checks_revision() {
    let store = MemoryStore::new();
    let idea = idea("a", &[]);
    let revision = store.put(&idea).await.expect("create");

    assert!(matches!(
        store.delete(&idea.id, "1-wrong").await,
        Err(AppError::Conflict(_))
    ));
    store.delete(&idea.id, &revision).await.expect("delete");
    assert!(store.get(&idea.id).await.unwrap().is_none());
    assert!(matches!(
        store.delete(&idea.id, &revision).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn scan_pages_in_insertion_order() {
    let store = MemoryStore::new();
    for content in ["a", "b", "c", "d"] {
        store.put(&idea(content, &[])).await.unwrap();
    }
    let page = store.scan(1, Some(2)).await.unwrap();
    let contents: Vec<&str> = page.iter().map(|idea| idea.content.as_str()).collect();
    assert_eq!(contents, vec!["b", "c"]);
}

#[tokio::test]
async fn query_index_matches_keys() {
    let store = MemoryStore::new();
    store.put(&idea("a", &["x", "y"])).await.unwrap();
    store.put(&idea("b", &["y"])).await.unwrap();

    let hits = store
        .query_index(IndexName::ByTag, &ViewQuery::Key(IndexKey::tag("y")))
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);

    let hits = store
        .query_index(IndexName::ByTag, &ViewQuery::Key(IndexKey::tag("x")))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "a");
}

#[tokio::test]
async fn grouped_counts_sum_and_count() {
    let store = MemoryStore::new();
    store.put(&idea("a", &["x", "y"])).await.unwrap();
    store.put(&idea("b", &["y"])).await.unwrap();

    let tags = store.grouped_counts(IndexName::AllTags).await.unwrap();
    assert_eq!(tags, vec![("x".to_owned(), 1), ("y".to_owned(), 2)]);

    let statuses = store.grouped_counts(IndexName::ByStatus).await.unwrap();
    assert_eq!(statuses, vec![(Status::Todo.as_str().to_owned(), 2)]);

    assert!(matches!(
        store.grouped_counts(IndexName::NextActions).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn empty_store_needs_setup() {
    let store = MemoryStore::empty();
    let written = store.put(&idea("a", &[])).await;
    assert!(matches!(written, Err(AppError::NotFound(_))));
    store.ensure_database().await.unwrap();
    store.put(&idea("a", &[])).await.unwrap();
    assert!(matches!(
        store.query_index(IndexName::ByTag, &ViewQuery::All).await,
        Err(AppError::NotFound(_))
    ));
    store.install_indexes().await.unwrap();
    assert_eq!(
        store
            .query_index(IndexName::ByStatus, &ViewQuery::All)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn unavailable_store_fails_with_transport() {
    let store = MemoryStore::new();
    store.set_unavailable(true);
    let fetched = store.get("x").await;
    assert!(matches!(fetched, Err(AppError::Transport(_))));
    store.set_unavailable(false);
    assert!(store.get("x").await.unwrap().is_none());
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let store = MemoryStore::new();
    store.get("a").await.unwrap();
    store.scan(0, None).await.unwrap();
    assert_eq!(
        store.calls(),
        vec![
            StoreCall::Get("a".into()),
            StoreCall::Scan {
                skip: 0,
                limit: None
            }
        ]
    );
    store.clear_calls();
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn status_reports_state() {
    let store = MemoryStore::new();
    store.put(&idea("a", &[])).await.unwrap();
    let status = store.status().await.unwrap();
    assert!(status.database_exists);
    assert!(status.indexes_installed);
    assert_eq!(status.doc_count, Some(1));

    let status = MemoryStore::empty().status().await.unwrap();
    assert!(!status.database_exists);
    assert_eq!(status.doc_count, None);
}
