use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Dependencies as they arrive: either a comma-separated string
/// (`"a, b, c"`) or an already-split list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyList {
    Text(String),
    List(Vec<String>),
}

/// A raw task record as supplied by the host — partial, unvalidated.
/// The normalizer turns these into [`Task`] entities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTask {
    pub id: Option<String>,
    pub name: String,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Percent complete, 0–100.
    pub progress: Option<f32>,
    pub dependencies: Option<DependencyList>,
    pub swimlane: Option<String>,
    pub sub_swimlane: Option<String>,
    pub editable: Option<bool>,
    pub start_drag: Option<bool>,
    pub end_drag: Option<bool>,
    pub custom_class: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub text_color: Option<String>,
}

/// Optional display color hints, hex strings. Parsed to concrete colors
/// only in the widget layer; the engine treats them as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskColors {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub text: Option<String>,
}

/// A validated task entity. `row_index` is assigned by row grouping, never
/// user-supplied. Invariant: `end > start`; when normalization could not
/// establish both from the record, `invalid` is set and the task is
/// excluded from gestures while still occupying a row.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub progress: f32,
    pub dependencies: Vec<String>,
    pub swimlane: Option<String>,
    pub sub_swimlane: Option<String>,
    pub row_index: usize,
    pub invalid: bool,
    pub editable: bool,
    pub start_drag: bool,
    pub end_drag: bool,
    pub custom_class: Option<String>,
    pub colors: TaskColors,
}

impl Task {
    /// Whether this task may move as part of a cascaded drag.
    pub fn cascadable(&self) -> bool {
        self.start_drag && self.end_drag
    }

    /// Interactive means drawn with handles and endpoints and reachable by
    /// gestures; invalid tasks are display-only.
    pub fn interactive(&self) -> bool {
        !self.invalid
    }
}
