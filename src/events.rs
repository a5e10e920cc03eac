use chrono::NaiveDateTime;

use crate::scale::ViewMode;

/// State-transition events the host drains after feeding input.
///
/// `DateChange` reports the inclusive end (one second before the stored
/// exclusive end), matching what the popup shows.
#[derive(Debug, Clone, PartialEq)]
pub enum GanttEvent {
    ViewChange(ViewMode),
    DateChange {
        task_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    ProgressChange {
        task_id: String,
        progress: i32,
    },
    DependencyAdded {
        from: String,
    },
    DependencyDeleted {
        from: String,
        to: String,
    },
    Click {
        task_id: String,
    },
}
