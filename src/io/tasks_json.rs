use std::path::Path;

use anyhow::Context;

use crate::model::task::RawTask;

/// Load an ordered list of task records from a JSON array file.
pub fn load_tasks(path: &Path) -> anyhow::Result<Vec<RawTask>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_tasks(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse task records from JSON text.
pub fn parse_tasks(text: &str) -> anyhow::Result<Vec<RawTask>> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::DependencyList;

    #[test]
    fn parses_records_with_mixed_fields() {
        let text = r##"[
            {"id": "a", "name": "Alpha", "start": "2024-01-01", "end": "2024-01-03"},
            {"name": "Beta", "start": "2024-01-02", "end": "2024-01-05",
             "dependencies": "a", "swimlane": "Ops", "sub_swimlane": "Infra",
             "progress": 40, "primary_color": "#4682b4"}
        ]"##;
        let records = parse_tasks(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("a"));
        assert!(records[0].dependencies.is_none());
        assert_eq!(
            records[1].dependencies,
            Some(DependencyList::Text("a".into()))
        );
        assert_eq!(records[1].swimlane.as_deref(), Some("Ops"));
        assert_eq!(records[1].progress, Some(40.0));
        assert_eq!(records[1].primary_color.as_deref(), Some("#4682b4"));
    }

    #[test]
    fn dependencies_accept_a_list_too() {
        let text = r#"[{"name": "c", "dependencies": ["a", "b"]}]"#;
        let records = parse_tasks(text).unwrap();
        assert_eq!(
            records[0].dependencies,
            Some(DependencyList::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn rejects_non_array_input() {
        assert!(parse_tasks(r#"{"name": "solo"}"#).is_err());
    }
}
