use std::path::Path;

use anyhow::Context;

use crate::model::task::{DependencyList, RawTask};

/// Column roles we recognize in a task CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Start,
    End,
    Progress,
    Dependencies,
    Swimlane,
    SubSwimlane,
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

/// Map a normalized header to a column role.
fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "taskid" | "key" => Some(Column::Id),

        "name" | "task" | "taskname" | "label" | "title" | "activity" => Some(Column::Name),

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => {
            Some(Column::End)
        }

        "progress" | "percent" | "percentcomplete" | "complete" => Some(Column::Progress),

        "dependencies" | "dependson" | "deps" | "predecessors" | "after" => {
            Some(Column::Dependencies)
        }

        "swimlane" | "lane" | "group" | "team" => Some(Column::Swimlane),

        "subswimlane" | "sublane" | "subgroup" => Some(Column::SubSwimlane),

        _ => None,
    }
}

/// Import task records from a CSV file. The delimiter is sniffed from the
/// header line and column order is free; unrecognized columns are ignored.
pub fn import_csv(path: &Path) -> anyhow::Result<Vec<RawTask>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_csv(&text).with_context(|| format!("importing {}", path.display()))
}

/// Parse CSV text into task records.
pub fn parse_csv(text: &str) -> anyhow::Result<Vec<RawTask>> {
    let first_line = text.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("reading CSV header")?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();
    if !columns.iter().any(|c| *c == Some(Column::Name)) {
        anyhow::bail!("no name column found in CSV header");
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("reading CSV row")?;
        let mut record = RawTask::default();
        for (value, column) in row.iter().zip(&columns) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match column {
                Some(Column::Id) => record.id = Some(value.to_string()),
                Some(Column::Name) => record.name = value.to_string(),
                Some(Column::Start) => record.start = Some(value.to_string()),
                Some(Column::End) => record.end = Some(value.to_string()),
                Some(Column::Progress) => {
                    record.progress = value.trim_end_matches('%').parse::<f32>().ok();
                }
                Some(Column::Dependencies) => {
                    record.dependencies = Some(DependencyList::Text(value.to_string()));
                }
                Some(Column::Swimlane) => record.swimlane = Some(value.to_string()),
                Some(Column::SubSwimlane) => record.sub_swimlane = Some(value.to_string()),
                None => {}
            }
        }
        if record.name.is_empty() {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolon_delimiters_and_maps_headers() {
        let text = "Task Name;Start Date;End Date;Depends On;Lane\n\
                    Alpha;2024-01-01;2024-01-03;;Ops\n\
                    Beta;2024-01-02;2024-01-05;Alpha;Ops\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alpha");
        assert_eq!(records[0].start.as_deref(), Some("2024-01-01"));
        assert_eq!(records[0].swimlane.as_deref(), Some("Ops"));
        assert!(records[0].dependencies.is_none());
        assert_eq!(
            records[1].dependencies,
            Some(DependencyList::Text("Alpha".into()))
        );
    }

    #[test]
    fn progress_sheds_percent_signs() {
        let text = "name,progress\nAlpha,45%\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records[0].progress, Some(45.0));
    }

    #[test]
    fn rows_without_names_are_skipped() {
        let text = "name,start\nAlpha,2024-01-01\n,2024-01-02\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_name_column_is_an_error() {
        assert!(parse_csv("start,end\n2024-01-01,2024-01-02\n").is_err());
    }

    #[test]
    fn comma_files_still_work() {
        let text = "id,name,start,end,sub_swimlane\nt1,Alpha,2024-01-01,2024-01-03,Infra\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records[0].id.as_deref(), Some("t1"));
        assert_eq!(records[0].sub_swimlane.as_deref(), Some("Infra"));
    }
}
