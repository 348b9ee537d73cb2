// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[derive(Serialize)]
struct Payload {
    name: &'static str,
    count: u32,
}

#[test]
fn default_is_never_json() {
    assert_eq!(
        effective_format(None, false, OutputFormat::Markdown),
        OutputFormat::Markdown
    );
    assert_eq!(
        effective_format(None, false, OutputFormat::Yaml),
        OutputFormat::Yaml
    );
}

#[test]
fn json_alias_applies() {
    assert_eq!(
        effective_format(None, true, OutputFormat::Markdown),
        OutputFormat::Json
    );
}

#[test]
fn explicit_format_beats_alias() {
    assert_eq!(
        effective_format(Some(OutputFormat::Yaml), true, OutputFormat::Markdown),
        OutputFormat::Yaml
    );
}

#[test]
fn render_json_and_yaml() {
    let payload = Payload {
        name: "t-1",
        count: 2,
    };
    let json = render(OutputFormat::Json, &payload, || unreachable!());
    assert!(json.contains("\"name\": \"t-1\""));
    let yaml = render(OutputFormat::Yaml, &payload, || unreachable!());
    assert!(yaml.contains("name: t-1"));
}

#[test]
fn render_markdown_uses_closure() {
    let payload = Payload {
        name: "t-1",
        count: 2,
    };
    let md = render(OutputFormat::Markdown, &payload, || "# Title\n".to_string());
    assert_eq!(md, "# Title\n");
}

#[test]
fn md_section_omits_empty() {
    assert_eq!(md_section("Blockers", &[]), "");
    let rendered = md_section("Blockers", &["dep a missing".to_string()]);
    assert!(rendered.contains("## Blockers"));
    assert!(rendered.contains("- dep a missing"));
}
