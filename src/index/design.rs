//! `CouchDB` design document holding the JavaScript index definitions.

use serde_json::{json, Map, Value};

use super::IndexName;

/// Document id of the design document.
pub const DESIGN_DOC_ID: &str = "_design/queries";

/// Design document name (the part after `_design/`).
pub const DESIGN_DOC_NAME: &str = "queries";

const PRIORITY_ORDER: &str = "var priority_order = {high: 1, medium: 2, low: 3};";

/// Stored status with the legacy `doing` spelling read as `in-progress`.
const STATUS: &str = "var status = doc.status === 'doing' ? 'in-progress' : doc.status;";

const FOR_EACH_TAG: &str = "for (var i = 0; i < doc.tags.length; i++) {";

const PRIORITY_EMOJI: &str = "var priority_emoji = {high: '🔴', medium: '🟡', low: '🟢'};";

const STATUS_EMOJI: &str = "var status_emoji = {inbox: '📥', todo: '☐',\n      \
                            'in-progress': '⏳', done: '✓', archived: '📦'};";

const BY_PRIORITY: &str = "if (doc.type === 'idea') {\n    emit(doc.priority, null);\n  }";

const METADATA_KEYS: &str = "if (doc.type === 'idea' && doc.metadata) {\n    \
                             for (var key in doc.metadata) {\n      \
                             if (doc.metadata.hasOwnProperty(key)) {\n        \
                             emit(key, null);\n      }\n    }\n  }";

/// JavaScript map function for an index.
#[must_use]
pub fn map_source(index: IndexName) -> String {
    let body = match index {
        IndexName::ByStatus => format!(
            "if (doc.type === 'idea') {{\n    {STATUS}\n    emit(status, null);\n  }}"
        ),
        IndexName::ByPriority => BY_PRIORITY.to_owned(),
        IndexName::ByTag => format!(
            "if (doc.type === 'idea' && doc.tags) {{\n    \
             {FOR_EACH_TAG}\n      emit(doc.tags[i], null);\n    }}\n  }}"
        ),
        IndexName::NextActions => format!(
            "if (doc.type === 'idea' && doc.status === 'todo') {{\n    {PRIORITY_ORDER}\n    \
             emit(priority_order[doc.priority] || 4, null);\n  }}"
        ),
        IndexName::ByStatusAndPriority => format!(
            "if (doc.type === 'idea') {{\n    {STATUS}\n    {PRIORITY_ORDER}\n    \
             emit([status, priority_order[doc.priority] || 4], null);\n  }}"
        ),
        IndexName::ByTagAndStatus => format!(
            "if (doc.type === 'idea' && doc.tags) {{\n    {STATUS}\n    \
             {FOR_EACH_TAG}\n      emit([doc.tags[i], status], null);\n    }}\n  }}"
        ),
        IndexName::AllTags => format!(
            "if (doc.type === 'idea' && doc.tags) {{\n    \
             {FOR_EACH_TAG}\n      emit(doc.tags[i], 1);\n    }}\n  }}"
        ),
        IndexName::MetadataKeys => METADATA_KEYS.to_owned(),
        IndexName::FormattedList => format!(
            "if (doc.type === 'idea') {{\n    {STATUS}\n    {PRIORITY_ORDER}\n    \
             {PRIORITY_EMOJI}\n    {STATUS_EMOJI}\n    \
             var display = status_emoji[status] + ' ' + priority_emoji[doc.priority] \
             + ' ' + doc.content;\n    \
             if (doc.tags && doc.tags.length > 0) {{\n      \
             display += ' [' + doc.tags.map(function(t) {{ return '#' + t; }})\n        \
             .join(', ') + ']';\n    }}\n    \
             emit([priority_order[doc.priority] || 4, doc.created], {{\n      \
             display: display, id: doc._id, content: doc.content, priority: doc.priority,\n      \
             status: status, tags: doc.tags || [], created: doc.created, updated: doc.updated\n    \
             }});\n  }}"
        ),
    };
    format!("function(doc) {{\n  {body}\n}}")
}

/// Full design document for every index, without a revision.
#[must_use]
pub fn design_document() -> Value {
    let mut views = Map::new();
    for index in IndexName::ALL {
        let mut view = Map::new();
        view.insert("map".into(), Value::String(map_source(index)));
        if let Some(reduce) = index.reduce() {
            view.insert("reduce".into(), Value::String(reduce.as_str().into()));
        }
        views.insert(index.as_str().into(), Value::Object(view));
    }
    json!({
        "_id": DESIGN_DOC_ID,
        "language": "javascript",
        "views": views,
    })
}
