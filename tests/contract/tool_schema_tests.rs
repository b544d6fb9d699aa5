//! Contract tests for the advertised MCP tool set and input schemas.

use serde_json::{json, Value};

use idea_capture::mcp::handler::{all_tools, resolve_alias, TOOL_ALIASES, TOOL_NAMES};
use idea_capture::models::{Priority, Status};

fn input_schema(name: &str) -> Value {
    let tool = all_tools()
        .into_iter()
        .find(|tool| tool.name == name)
        .unwrap_or_else(|| panic!("tool {name} not advertised"));
    Value::Object((*tool.input_schema).clone())
}

fn status_values() -> Value {
    json!(Status::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>())
}

fn priority_values() -> Value {
    json!(Priority::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>())
}

#[test]
fn advertised_tools_match_names_in_order() {
    let names: Vec<String> = all_tools()
        .iter()
        .map(|tool| tool.name.to_string())
        .collect();
    assert_eq!(names, TOOL_NAMES);
}

#[test]
fn every_tool_has_object_schema_and_description() {
    for tool in all_tools() {
        assert_eq!(
            tool.input_schema.get("type"),
            Some(&json!("object")),
            "{}",
            tool.name
        );
        assert!(
            tool.description.as_deref().is_some_and(|d| !d.is_empty()),
            "{} has no description",
            tool.name
        );
    }
}

#[test]
fn required_fields() {
    let cases: [(&str, Value); 5] = [
        ("idea_add", json!(["content"])),
        ("idea_get", json!(["idea_id"])),
        ("idea_update", json!(["idea_id"])),
        ("idea_delete", json!(["idea_id"])),
        ("idea_search_by_tag", json!(["tag"])),
    ];
    for (name, required) in cases {
        assert_eq!(input_schema(name)["required"], required, "{name}");
    }
    for name in ["idea_list", "idea_next_actions", "idea_tags"] {
        assert!(input_schema(name).get("required").is_none(), "{name}");
    }
}

#[test]
fn enumerations_follow_model() {
    for name in ["idea_add", "idea_list", "idea_update"] {
        let schema = input_schema(name);
        assert_eq!(
            schema["properties"]["status"]["enum"],
            status_values(),
            "{name}"
        );
        assert_eq!(
            schema["properties"]["priority"]["enum"],
            priority_values(),
            "{name}"
        );
    }
}

#[test]
fn add_defaults_and_source_shape() {
    let schema = input_schema("idea_add");
    assert_eq!(schema["properties"]["priority"]["default"], json!("medium"));
    assert_eq!(schema["properties"]["status"]["default"], json!("todo"));
    assert_eq!(
        schema["properties"]["source"]["required"],
        json!(["client"])
    );
}

#[test]
fn limit_defaults() {
    assert_eq!(
        input_schema("idea_list")["properties"]["limit"]["default"],
        json!(20)
    );
    assert_eq!(
        input_schema("idea_next_actions")["properties"]["limit"]["default"],
        json!(5)
    );
}

#[test]
fn update_offers_replace_and_append_tags() {
    let properties = &input_schema("idea_update")["properties"];
    assert_eq!(properties["tags"]["type"], json!("array"));
    assert_eq!(properties["add_tags"]["type"], json!("array"));
}

#[test]
fn earlier_search_name_routes_to_current_tool() {
    assert_eq!(
        resolve_alias("idea_search_by_tags"),
        Some("idea_search_by_tag")
    );
    assert_eq!(resolve_alias("idea_search_by_tag"), None);
    assert_eq!(resolve_alias("idea_list"), None);

    for (alias, canonical) in TOOL_ALIASES {
        assert!(TOOL_NAMES.contains(&canonical), "{alias} -> {canonical}");
        assert!(!TOOL_NAMES.contains(&alias), "{alias} is advertised");
    }
}
