use super::*;
use crate::test_utils::list_names;
use std::path::PathBuf;
use tempfile::TempDir;

fn hit(session: &str, session_no: usize, table_no: usize, member: &str) -> RoutingMatch {
    RoutingMatch {
        session: session.to_string(),
        session_no,
        table_no,
        member: member.to_string(),
    }
}

#[test]
fn test_default_layout_paths() {
    let layout = SessionLayout::with_defaults(PathBuf::from("/out"));

    assert_eq!(
        layout.table_dir(&hit("S1", 2, 3, "123")),
        PathBuf::from("/out/Session-2/Table-3")
    );
    assert_eq!(layout.error_dir(None), PathBuf::from("/out/ERROR"));
    assert_eq!(
        layout.error_dir(Some("carol")),
        PathBuf::from("/out/ERROR/carol")
    );
}

#[test]
fn test_custom_templates_render_label_and_id() {
    let layout = SessionLayout::new(
        PathBuf::from("/out"),
        NameTemplate::parse("s", "{label}", SessionLayout::SESSION_PLACEHOLDERS).unwrap(),
        NameTemplate::parse("t", "Table-{no}-{id}", SessionLayout::TABLE_PLACEHOLDERS).unwrap(),
    );

    assert_eq!(
        layout.table_dir(&hit("Monday", 1, 4, "123")),
        PathBuf::from("/out/Monday/Table-4-123")
    );
}

#[test]
fn test_template_rejects_unknown_placeholder_and_separators() {
    let err = NameTemplate::parse("session.table_name_format", "T-{label}", &["no", "id"])
        .unwrap_err();
    assert!(err.to_string().contains("session.table_name_format"));

    assert!(NameTemplate::parse("k", "a/{no}", &["no"]).is_err());
    assert!(NameTemplate::parse("k", "plain", &["no"]).is_ok());
}

#[test]
fn test_create_builds_every_table_and_error_bucket() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("grouped");
    let layout = SessionLayout::with_defaults(root.clone());
    let roster = Roster::new(
        vec![
            RosterSession {
                label: "S1".to_string(),
                members: vec!["1".to_string(), "2".to_string()],
            },
            RosterSession {
                label: "S2".to_string(),
                members: vec!["3".to_string()],
            },
        ],
        MatchStrategy::Substring,
    )
    .unwrap();

    layout.create(&roster).unwrap();
    layout.create(&roster).unwrap();

    assert_eq!(list_names(&root), ["ERROR", "Session-1", "Session-2"]);
    assert_eq!(list_names(&root.join("Session-1")), ["Table-1", "Table-2"]);
    assert_eq!(list_names(&root.join("Session-2")), ["Table-1"]);
}

fn labeled(sessions: &[(&str, &[&str])]) -> Roster {
    Roster::new(
        sessions
            .iter()
            .map(|(label, members)| RosterSession {
                label: label.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            })
            .collect(),
        MatchStrategy::Substring,
    )
    .unwrap()
}

fn layout_with(root: PathBuf, session: &str, table: &str) -> SessionLayout {
    SessionLayout::new(
        root,
        NameTemplate::parse("s", session, SessionLayout::SESSION_PLACEHOLDERS).unwrap(),
        NameTemplate::parse("t", table, SessionLayout::TABLE_PLACEHOLDERS).unwrap(),
    )
}

#[test]
fn test_validate_rejects_names_escaping_the_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("grouped");
    let roster = labeled(&[("S1", &["1"])]);

    for (session, table) in [("..", "{no}"), (".", "{id}"), ("{label}", ".."), ("{label}", "")] {
        let layout = layout_with(root.clone(), session, table);
        assert!(layout.validate(&roster).is_err(), "{session} / {table}");
        assert!(layout.create(&roster).is_err());
    }
    assert!(!root.exists());
}

#[test]
fn test_validate_rejects_duplicate_rendered_names() {
    let layout = layout_with(PathBuf::from("/out"), "{label}", "Table-{no}");
    assert!(layout.validate(&labeled(&[("Mon", &["1"]), ("Mon", &["2"])])).is_err());
    assert!(layout.validate(&labeled(&[("Mon", &["1"]), ("Tue", &["2"])])).is_ok());

    let shared_table = layout_with(PathBuf::from("/out"), "Session-{no}", "Table");
    assert!(shared_table.validate(&labeled(&[("S1", &["1", "2"])])).is_err());

    let reserved = layout_with(PathBuf::from("/out"), "{label}", "Table-{no}");
    assert!(reserved.validate(&labeled(&[("ERROR", &["1"])])).is_err());
}
