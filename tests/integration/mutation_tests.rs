//! Create, update, delete, and setup through the service.

use idea_capture::models::{CreateIdeaRequest, Priority, Status, UpdateIdeaRequest};
use idea_capture::persistence::{DocumentStore, MemoryStore, StoreCall};
use idea_capture::{AppError, IdeaService};

use super::test_helpers::{seed, test_service};

#[tokio::test]
async fn create_persists_and_returns_revision() {
    let service = test_service();
    let idea = seed(
        &service,
        "Plant tomatoes",
        &["garden"],
        Priority::High,
        Status::Inbox,
    )
    .await;

    assert!(idea.revision.is_some());
    let stored = service.get(&idea.id).await.unwrap().expect("stored");
    assert_eq!(stored, idea);
}

#[tokio::test]
async fn create_ensures_database_first() {
    let service = IdeaService::new(MemoryStore::empty());
    let idea = service
        .create(CreateIdeaRequest::new("first idea"))
        .await
        .expect("database created on demand");
    assert_eq!(
        service.store().calls(),
        vec![StoreCall::EnsureDatabase, StoreCall::Put(idea.id.clone())]
    );
}

#[tokio::test]
async fn invalid_create_never_reaches_store() {
    let service = test_service();
    let err = service
        .create(CreateIdeaRequest::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(service.store().calls().is_empty());

    let err = service
        .create(CreateIdeaRequest {
            tags: vec!["#".into()],
            ..CreateIdeaRequest::new("ok")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(service.store().calls().is_empty());
}

#[tokio::test]
async fn get_missing_is_none_and_require_is_not_found() {
    let service = test_service();
    assert!(service.get("nope").await.unwrap().is_none());
    let missing = service.require("nope").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn update_applies_changes_and_advances_revision() {
    let service = test_service();
    let idea = seed(&service, "Draft", &["a"], Priority::Low, Status::Todo).await;

    let updated = service
        .update(
            &idea.id,
            UpdateIdeaRequest {
                content: Some("Final".into()),
                add_tags: vec!["b".into()],
                status: Some(Status::Done),
                ..UpdateIdeaRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.content, "Final");
    assert_eq!(updated.tags, vec!["a", "b"]);
    assert_eq!(updated.status, Status::Done);
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.created, idea.created);
    assert!(updated.updated >= idea.updated);
    assert_ne!(updated.revision, idea.revision);
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let service = test_service();
    let err = service
        .update(
            "missing",
            UpdateIdeaRequest {
                status: Some(Status::Done),
                ..UpdateIdeaRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn invalid_update_is_rejected_before_lookup() {
    let service = test_service();
    let idea = seed(&service, "x", &[], Priority::Medium, Status::Todo).await;
    service.store().clear_calls();

    let err = service
        .update(
            &idea.id,
            UpdateIdeaRequest {
                content: Some(String::new()),
                ..UpdateIdeaRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(service.store().calls().is_empty());
}

#[tokio::test]
async fn stale_revision_conflicts_without_changing_store() {
    let service = test_service();
    let idea = seed(&service, "v1", &[], Priority::Medium, Status::Todo).await;

    let mut first_copy = idea.clone();
    let mut second_copy = idea.clone();

    first_copy.content = "v2".into();
    service.update_with_revision(first_copy).await.unwrap();

    second_copy.content = "lost update".into();
    let err = service.update_with_revision(second_copy).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = service.require(&idea.id).await.unwrap();
    assert_eq!(stored.content, "v2");
}

#[tokio::test]
async fn delete_removes_idea() {
    let service = test_service();
    let idea = seed(&service, "temp", &[], Priority::Medium, Status::Todo).await;
    service.delete(&idea.id).await.unwrap();
    assert!(service.get(&idea.id).await.unwrap().is_none());
    assert!(service.store().is_empty());
}

#[tokio::test]
async fn delete_missing_is_not_found() {
    let service = test_service();
    let deleted = service.delete("ghost").await;
    assert!(matches!(deleted, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_with_stale_revision_conflicts() {
    let service = test_service();
    let idea = seed(&service, "temp", &[], Priority::Medium, Status::Todo).await;
    let stale = idea.revision.clone().unwrap();
    service
        .update(
            &idea.id,
            UpdateIdeaRequest {
                priority: Some(Priority::High),
                ..UpdateIdeaRequest::default()
            },
        )
        .await
        .unwrap();

    let err = service
        .delete_with_revision(&idea.id, &stale)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(service.store().len(), 1);
}

#[tokio::test]
async fn setup_creates_database_and_indexes() {
    let service = IdeaService::new(MemoryStore::empty());
    service.setup().await.unwrap();
    let status = service.diagnose().await.unwrap();
    assert!(status.database_exists);
    assert!(status.indexes_installed);

    service.setup().await.expect("setup is repeatable");
    assert!(service.store().status().await.unwrap().indexes_installed);
}
