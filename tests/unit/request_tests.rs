use idea_capture::models::request::{
    normalize_tag, normalize_tags, validate_content, MAX_CONTENT_CHARS, MAX_TAG_CHARS,
    SOURCE_METADATA_KEY,
};
use idea_capture::models::{
    CreateIdeaRequest, Idea, MetadataValue, Priority, SourceInfo, Status, UpdateIdeaRequest,
};
use idea_capture::AppError;
use serde_json::json;

#[test]
fn create_request_builds_idea() {
    let request = CreateIdeaRequest {
        tags: vec!["#Work".into(), " home ".into(), "Work".into()],
        priority: Some(Priority::High),
        status: Some(Status::Inbox),
        ..CreateIdeaRequest::new("Fix the gutter")
    };
    let idea = request.into_idea().expect("valid");
    assert_eq!(idea.content, "Fix the gutter");
    assert_eq!(idea.tags, vec!["Work", "home"]);
    assert_eq!(idea.priority, Priority::High);
    assert_eq!(idea.status, Status::Inbox);
}

#[test]
fn create_request_defaults_priority_and_status() {
    let idea = CreateIdeaRequest::new("x").into_idea().expect("valid");
    assert_eq!(idea.priority, Priority::Medium);
    assert_eq!(idea.status, Status::Todo);
}

#[test]
fn source_is_stored_in_metadata() {
    let request = CreateIdeaRequest {
        source: Some(SourceInfo {
            client: "cursor".into(),
            project: Some("idea-capture".into()),
            files: vec!["src/lib.rs".into()],
            ..SourceInfo::default()
        }),
        ..CreateIdeaRequest::new("Refactor the router")
    };
    let idea = request.into_idea().expect("valid");
    let MetadataValue::Map(source) = &idea.metadata[SOURCE_METADATA_KEY] else {
        panic!("source should be a map");
    };
    assert_eq!(source["client"].as_text(), Some("cursor"));
    assert!(!source.contains_key("branch"));
}

#[test]
fn create_request_deserializes_from_json() {
    let request: CreateIdeaRequest = serde_json::from_value(json!({
        "content": "Buy milk",
        "tags": ["errand"],
        "priority": "low",
        "status": "doing",
        "metadata": { "store": "corner" }
    }))
    .expect("valid json");
    assert_eq!(request.priority, Some(Priority::Low));
    assert_eq!(request.status, Some(Status::InProgress));
    assert_eq!(request.metadata["store"].as_text(), Some("corner"));
}

#[test]
fn content_rules() {
    assert!(validate_content("ok").is_ok());
    assert!(matches!(validate_content(""), Err(AppError::Validation(_))));
    assert!(matches!(validate_content(" \n\t "), Err(AppError::Validation(_))));
    assert!(validate_content(&"x".repeat(MAX_CONTENT_CHARS)).is_ok());
    assert!(validate_content(&"x".repeat(MAX_CONTENT_CHARS + 1)).is_err());
}

#[test]
fn tag_rules() {
    assert_eq!(normalize_tag("  #rust ").unwrap(), "rust");
    assert!(normalize_tag("#").is_err());
    assert!(normalize_tag("   ").is_err());
    assert!(normalize_tag(&"t".repeat(MAX_TAG_CHARS)).is_ok());
    assert!(normalize_tag(&"t".repeat(MAX_TAG_CHARS + 1)).is_err());
    assert_eq!(
        normalize_tags(vec!["b".into(), "a".into(), "#b".into()]).unwrap(),
        vec!["b", "a"]
    );
}

#[test]
fn update_replaces_then_adds_tags() {
    let mut idea = Idea::new("x");
    idea.tags = vec!["old".into()];
    let before = idea.updated;

    UpdateIdeaRequest {
        tags: Some(vec!["new".into()]),
        add_tags: vec!["extra".into(), "new".into()],
        status: Some(Status::Done),
        ..UpdateIdeaRequest::default()
    }
    .apply_to(&mut idea)
    .expect("valid");

    assert_eq!(idea.tags, vec!["new", "extra"]);
    assert_eq!(idea.status, Status::Done);
    assert!(idea.updated >= before);
}

#[test]
fn update_merges_metadata() {
    let mut idea = Idea::new("x");
    idea.metadata.insert("a".into(), 1_i64.into());
    idea.metadata.insert("b".into(), 2_i64.into());

    let mut changes = idea_capture::models::Metadata::new();
    changes.insert("b".into(), 20_i64.into());
    changes.insert("c".into(), "three".into());
    UpdateIdeaRequest {
        metadata: Some(changes),
        ..UpdateIdeaRequest::default()
    }
    .apply_to(&mut idea)
    .expect("valid");

    assert_eq!(idea.metadata["a"], MetadataValue::Integer(1));
    assert_eq!(idea.metadata["b"], MetadataValue::Integer(20));
    assert_eq!(idea.metadata["c"].as_text(), Some("three"));
}

#[test]
fn invalid_update_leaves_idea_untouched() {
    let mut idea = Idea::new("keep me");
    let original = idea.clone();
    let err = UpdateIdeaRequest {
        content: Some("   ".into()),
        priority: Some(Priority::High),
        ..UpdateIdeaRequest::default()
    }
    .apply_to(&mut idea)
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(idea, original);
}

#[test]
fn empty_update_is_detected() {
    assert!(UpdateIdeaRequest::default().is_empty());
    assert!(!UpdateIdeaRequest {
        add_tags: vec!["x".into()],
        ..UpdateIdeaRequest::default()
    }
    .is_empty());
}
