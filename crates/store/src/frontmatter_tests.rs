// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::Task;

#[test]
fn split_basic_document() {
    let (header, body) = split("---\nid: t-1\n---\n\nBody text\n").unwrap();
    assert_eq!(header, "id: t-1\n");
    assert_eq!(body, "Body text\n");
}

#[test]
fn split_missing_opening_delimiter() {
    assert!(split("id: t-1\n").is_none());
}

#[test]
fn split_unterminated_header() {
    assert!(split("---\nid: t-1\n").is_none());
}

#[test]
fn split_tolerates_missing_trailing_newline() {
    let (header, body) = split("---\nid: t-1\n---").unwrap();
    assert_eq!(header, "id: t-1\n");
    assert_eq!(body, "");
}

#[test]
fn parse_task_round_trip_preserves_body_and_extras() {
    let text = "---\nid: t-1\ntitle: Fix login\nstate: todo\nx-unknown: 42\n---\n\nThe body.\n\n## Primary Files / Areas\n- src/login.rs\n";
    let (task, body) = parse::<Task>(text).unwrap();
    assert_eq!(task.id, "t-1");
    assert!(body.contains("Primary Files"));

    let mut task = task;
    task.description = body.clone();
    let rendered = render(&task, &body).unwrap();
    let (back, body2) = parse::<Task>(&rendered).unwrap();
    assert_eq!(back.id, task.id);
    assert_eq!(back.extras, task.extras);
    assert_eq!(body2.trim_end(), body.trim_end());
}

#[test]
fn render_empty_body_has_no_blank_tail() {
    let task = Task::new("t-1", "T", "todo");
    let rendered = render(&task, "").unwrap();
    assert!(rendered.ends_with("---\n"));
    assert_eq!(rendered.matches("---").count(), 2);
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any body free of a bare `---` line round-trips byte-for-byte
        /// modulo trailing-newline normalisation.
        #[test]
        fn body_round_trips(body in "[a-zA-Z0-9 \n#*_.-]{0,200}") {
            prop_assume!(!body.lines().any(|l| l.trim_end() == "---"));
            let task = Task::new("t-1", "T", "todo");
            let rendered = render(&task, &body).unwrap();
            let (_, parsed) = parse::<Task>(&rendered).unwrap();
            prop_assert_eq!(parsed.trim_end_matches('\n'), body.trim_end_matches('\n'));
        }
    }
}
