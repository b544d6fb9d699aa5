use idea_capture::models::{Idea, MetadataValue, Priority, Status};
use idea_capture::query::{KeyCount, PriorityCount, Stats, StatusCount};
use idea_capture::render::{
    format_idea, format_ideas, format_stats, format_tag_counts, priority_glyph, status_glyph,
};

fn sample() -> Idea {
    let mut idea = Idea::new("Learn Rust");
    idea.id = "abc".into();
    idea.tags = vec!["rust".into(), "learning".into()];
    idea.priority = Priority::High;
    idea
}

#[test]
fn glyphs_cover_every_value() {
    assert_eq!(status_glyph(Status::Inbox), "📥");
    assert_eq!(status_glyph(Status::Todo), "☐");
    assert_eq!(status_glyph(Status::InProgress), "⏳");
    assert_eq!(status_glyph(Status::Done), "✓");
    assert_eq!(status_glyph(Status::Archived), "📦");
    assert_eq!(priority_glyph(Priority::High), "🔴");
    assert_eq!(priority_glyph(Priority::Medium), "🟡");
    assert_eq!(priority_glyph(Priority::Low), "🟢");
}

#[test]
fn summary_rendering() {
    let text = format_idea(&sample(), false, "   ");
    assert_eq!(
        text,
        "☐ 🔴 Learn Rust\n   ID: abc\n   Tags: #rust, #learning"
    );
}

#[test]
fn detailed_rendering_includes_fields_and_metadata() {
    let mut idea = sample();
    idea.metadata
        .insert("project".into(), MetadataValue::from("home"));
    let text = format_idea(&idea, true, "");
    assert!(text.contains("\nStatus: todo"));
    assert!(text.contains("\nPriority: high"));
    assert!(text.contains("\nCreated: "));
    assert!(text.contains("\nMetadata: {\n  \"project\": \"home\"\n}"));
}

#[test]
fn untagged_idea_has_no_tag_line() {
    let mut idea = sample();
    idea.tags.clear();
    assert!(!format_idea(&idea, false, "").contains("Tags:"));
}

#[test]
fn ideas_are_separated_by_blank_lines() {
    let text = format_ideas(&[sample(), sample()], "");
    assert_eq!(text.matches("ID: abc").count(), 2);
    assert!(text.contains("#learning\n\n☐"));
}

#[test]
fn tag_table() {
    assert_eq!(format_tag_counts(&[]), "No tags found");
    let text = format_tag_counts(&[
        KeyCount {
            key: "work".into(),
            count: 3,
        },
        KeyCount {
            key: "home".into(),
            count: 1,
        },
    ]);
    assert!(text.starts_with("Tags (sorted by usage):\n"));
    assert!(text.contains(&format!("  #{:<30} 3 idea(s)", "work")));
    assert!(text.find("#work").unwrap() < text.find("#home").unwrap());
}

#[test]
fn stats_skip_zero_rows() {
    let stats = Stats {
        total: 3,
        by_status: vec![
            StatusCount {
                status: Status::Inbox,
                count: 0,
            },
            StatusCount {
                status: Status::Todo,
                count: 3,
            },
        ],
        by_priority: vec![
            PriorityCount {
                priority: Priority::High,
                count: 1,
            },
            PriorityCount {
                priority: Priority::Low,
                count: 2,
            },
        ],
        unique_tags: 4,
    };
    let text = format_stats(&stats);
    assert!(text.starts_with("📊 Idea Statistics\n\nBy Status:"));
    assert!(!text.contains("inbox"));
    assert!(text.contains(&format!("☐ {:<15} 3", "todo")));
    assert!(text.contains(&format!("🟢 {:<15} 2", "low")));
    assert!(text.ends_with("🏷️  Total unique tags: 4"));
}
