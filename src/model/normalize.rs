use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::model::deps::DependencyMap;
use crate::model::task::{DependencyList, RawTask, Task, TaskColors};
use crate::time::{self, TimeUnit};

/// Spans longer than this many (30-day) years discard the provided end.
const MAX_DURATION_YEARS: i64 = 10;

/// Id source for records that arrive without one. Injected so tests can
/// supply a deterministic generator.
pub trait IdGenerator {
    fn generate(&mut self, name: &str) -> String;
}

/// Production generator: task name plus a random suffix.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&mut self, name: &str) -> String {
        format!("{}_{}", name, Uuid::new_v4().simple())
    }
}

/// Deterministic generator for tests: `prefix_1`, `prefix_2`, …
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: usize,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&mut self, _name: &str) -> String {
        self.next += 1;
        format!("{}_{}", self.prefix, self.next)
    }
}

/// Turns raw records into validated [`Task`] entities plus the dependents
/// multimap. "Today" is a field rather than a clock read so defaulting is
/// reproducible.
pub struct TaskNormalizer {
    id_gen: Box<dyn IdGenerator>,
    today: NaiveDateTime,
}

impl TaskNormalizer {
    pub fn new(id_gen: Box<dyn IdGenerator>, today: NaiveDateTime) -> Self {
        Self { id_gen, today }
    }

    /// Production normalizer: uuid-suffixed ids.
    pub fn with_today(today: NaiveDateTime) -> Self {
        Self::new(Box::new(UuidIdGenerator), today)
    }

    /// Normalize every record independently, in order.
    pub fn normalize(&mut self, records: Vec<RawTask>) -> (Vec<Task>, DependencyMap) {
        let tasks: Vec<Task> = records.into_iter().map(|r| self.normalize_one(r)).collect();
        let deps = DependencyMap::build(&tasks);
        (tasks, deps)
    }

    fn normalize_one(&mut self, record: RawTask) -> Task {
        let mut start = record.start.as_deref().and_then(|s| time::parse(s).ok());
        let mut end = record.end.as_deref().and_then(|s| time::parse(s).ok());

        // an implausibly long span means the end is bogus; re-default it
        if let (Some(s), Some(e)) = (start, end) {
            if time::diff(e, s, TimeUnit::Year) > MAX_DURATION_YEARS {
                end = None;
            }
        }

        let had_start = start.is_some();
        let had_end = end.is_some();

        let (start, end) = match (start.take(), end.take()) {
            (Some(s), Some(e)) => (s, e),
            (Some(s), None) => (s, time::add(s, 2, TimeUnit::Day)),
            (None, Some(e)) => (time::add(e, -2, TimeUnit::Day), e),
            (None, None) => (self.today, time::add(self.today, 2, TimeUnit::Day)),
        };

        // a midnight end means the whole last day is included
        let end = if end == time::start_of(end, TimeUnit::Day) {
            time::add(end, 24, TimeUnit::Hour)
        } else {
            end
        };

        let id = match record.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => self.id_gen.generate(&record.name),
        };

        Task {
            id,
            name: record.name,
            start,
            end,
            progress: record.progress.unwrap_or(0.0).clamp(0.0, 100.0),
            dependencies: split_dependencies(record.dependencies),
            swimlane: record.swimlane,
            sub_swimlane: record.sub_swimlane,
            row_index: 0,
            invalid: !had_start || !had_end,
            editable: record.editable.unwrap_or(true),
            start_drag: record.start_drag.unwrap_or(true),
            end_drag: record.end_drag.unwrap_or(true),
            custom_class: record.custom_class,
            colors: TaskColors {
                primary: record.primary_color,
                secondary: record.secondary_color,
                text: record.text_color,
            },
        }
    }
}

/// Trim tokens and drop empties, for both incoming forms.
fn split_dependencies(deps: Option<DependencyList>) -> Vec<String> {
    let items: Vec<String> = match deps {
        None => return Vec::new(),
        Some(DependencyList::Text(text)) => text.split(',').map(str::to_string).collect(),
        Some(DependencyList::List(list)) => list,
    };
    items
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}
