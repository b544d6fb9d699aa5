use clap::Parser;
use idea_capture::cli::{Cli, Command};
use idea_capture::logging::LogFormat;
use idea_capture::models::{Priority, Status};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("idea").chain(args.iter().copied())).expect("valid args")
}

#[test]
fn add_collects_repeated_tags() {
    let cli = parse(&[
        "add",
        "Fix bug",
        "-t",
        "work",
        "--tags",
        "urgent",
        "-p",
        "high",
        "-s",
        "inbox",
        "-m",
        r#"{"a":1}"#,
    ]);
    assert_eq!(
        cli.command,
        Command::Add {
            content: "Fix bug".into(),
            tags: vec!["work".into(), "urgent".into()],
            priority: Some(Priority::High),
            status: Some(Status::Inbox),
            metadata: Some(r#"{"a":1}"#.into()),
        }
    );
}

#[test]
fn list_filters_and_pagination() {
    let cli = parse(&[
        "list",
        "--status",
        "in-progress",
        "--priority",
        "low",
        "--tag",
        "home",
        "-l",
        "5",
        "--skip",
        "2",
    ]);
    assert_eq!(
        cli.command,
        Command::List {
            status: Some(Status::InProgress),
            priority: Some(Priority::Low),
            tag: Some("home".into()),
            limit: Some(5),
            skip: 2,
        }
    );
}

#[test]
fn doing_is_accepted_as_status() {
    let cli = parse(&["list", "--status", "doing"]);
    assert!(matches!(
        cli.command,
        Command::List {
            status: Some(Status::InProgress),
            ..
        }
    ));
}

#[test]
fn update_distinguishes_replace_and_add() {
    let cli = parse(&[
        "update",
        "abc",
        "-t",
        "new",
        "--add-tag",
        "extra",
        "-s",
        "done",
    ]);
    assert_eq!(
        cli.command,
        Command::Update {
            id: "abc".into(),
            content: None,
            tags: vec!["new".into()],
            add_tags: vec!["extra".into()],
            priority: None,
            status: Some(Status::Done),
        }
    );
}

#[test]
fn delete_confirmation_flag() {
    assert_eq!(
        parse(&["delete", "abc", "-y"]).command,
        Command::Delete {
            id: "abc".into(),
            yes: true
        }
    );
    assert_eq!(
        parse(&["delete", "abc"]).command,
        Command::Delete {
            id: "abc".into(),
            yes: false
        }
    );
}

#[test]
fn global_flags_after_subcommand() {
    let cli = parse(&[
        "next",
        "--memory",
        "--log-format",
        "json",
        "--config",
        "c.toml",
    ]);
    assert!(cli.memory);
    assert_eq!(cli.log_format, LogFormat::Json);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("c.toml")));
    assert_eq!(cli.command, Command::Next { limit: None });
}

#[test]
fn invalid_values_are_rejected() {
    assert!(Cli::try_parse_from(["idea", "add", "x", "-p", "urgent"]).is_err());
    assert!(Cli::try_parse_from(["idea", "list", "--status", "later"]).is_err());
    assert!(Cli::try_parse_from(["idea", "get"]).is_err());
}

#[test]
fn only_doctor_reports_its_own_credentials() {
    assert!(Command::Doctor.reports_own_credentials());
    assert!(!Command::Setup.reports_own_credentials());
}
