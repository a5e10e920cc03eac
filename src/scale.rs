use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::ColumnSpec;
use crate::model::task::Task;
use crate::time::{self, Language, TimeUnit};

/// A named timescale. Ordering follows zoom level, finest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ViewMode {
    QuarterDay,
    HalfDay,
    Day,
    Week,
    Month,
    Year,
}

impl ViewMode {
    pub const ALL: [ViewMode; 6] = [
        ViewMode::QuarterDay,
        ViewMode::HalfDay,
        ViewMode::Day,
        ViewMode::Week,
        ViewMode::Month,
        ViewMode::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::QuarterDay => "Quarter Day",
            ViewMode::HalfDay => "Half Day",
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
            ViewMode::Year => "Year",
        }
    }
}

/// Upper/lower header text for one column. Lower text may be empty when a
/// column repeats the previous label; upper text appears only on boundary
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLabel {
    pub lower_text: String,
    pub lower_x: f32,
    pub lower_y: f32,
    pub upper_text: Option<String>,
    pub upper_x: f32,
    pub upper_y: f32,
}

/// A vertical grid tick. Month boundaries, first-of-month weeks and
/// quarter months render thick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub x: f32,
    pub thick: bool,
}

/// The active timescale: mode, column sizing and the global date window
/// derived from the task set plus mode-specific padding. Rebuilt wholesale
/// on refresh or view-mode change.
#[derive(Debug, Clone)]
pub struct ViewScale {
    pub mode: ViewMode,
    pub step_hours: f64,
    pub column_width: f32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// One instant per rendered column, first at `start`; the last entry
    /// overshoots `end` by up to one step.
    pub columns: Vec<NaiveDateTime>,
}

impl ViewScale {
    /// Compute the window for `tasks` under `mode`. `now` anchors the
    /// empty-task fallback window.
    pub fn compute(tasks: &[Task], mode: ViewMode, spec: ColumnSpec, now: NaiveDateTime) -> Self {
        let (mut start, mut end) = if tasks.is_empty() {
            (now, time::add(now, 2, TimeUnit::Year))
        } else {
            let min = tasks.iter().map(|t| t.start).min().unwrap_or(now);
            let max = tasks.iter().map(|t| t.end).max().unwrap_or(now);
            (
                time::start_of(min, TimeUnit::Day),
                time::start_of(max, TimeUnit::Day),
            )
        };

        match mode {
            ViewMode::QuarterDay | ViewMode::HalfDay => {
                start = time::add(start, -7, TimeUnit::Day);
                end = time::add(end, 7, TimeUnit::Day);
            }
            ViewMode::Month => {
                start = time::start_of(start, TimeUnit::Year);
                end = time::add(end, 1, TimeUnit::Year);
            }
            ViewMode::Year => {
                start = time::add(start, -2, TimeUnit::Year);
                end = time::add(end, 2, TimeUnit::Year);
            }
            ViewMode::Day | ViewMode::Week => {
                start = time::add(start, -1, TimeUnit::Month);
                end = time::add(end, 1, TimeUnit::Month);
            }
        }

        let mut columns = vec![start];
        let mut cursor = start;
        while cursor < end {
            cursor = match mode {
                ViewMode::Year => time::add(cursor, 1, TimeUnit::Year),
                ViewMode::Month => time::add(cursor, 1, TimeUnit::Month),
                _ => time::add_millis_f64(cursor, spec.step_hours * 3_600_000.0),
            };
            columns.push(cursor);
        }

        Self {
            mode,
            step_hours: spec.step_hours,
            column_width: spec.column_width,
            start,
            end,
            columns,
        }
    }

    /// Full grid width in pixels.
    pub fn table_width(&self) -> f32 {
        self.columns.len() as f32 * self.column_width
    }

    /// Center x of the "today" highlight column; only the Day view shows it.
    pub fn today_x(&self, today: NaiveDateTime) -> f32 {
        time::diff(today, self.start, TimeUnit::Hour) as f32 / self.step_hours as f32
            * self.column_width
    }

    /// Tick x positions; Month view spaces ticks by actual month length.
    pub fn ticks(&self) -> Vec<Tick> {
        use chrono::Datelike;

        let mut out = Vec::with_capacity(self.columns.len());
        let mut x = 0.0f32;
        for date in &self.columns {
            let thick = match self.mode {
                ViewMode::Day => date.day() == 1,
                ViewMode::Week => date.day() < 8,
                ViewMode::Month => date.month() % 3 == 0,
                _ => false,
            };
            out.push(Tick { x, thick });
            x += if self.mode == ViewMode::Month {
                time::days_in_month(*date) as f32 * self.column_width / 30.0
            } else {
                self.column_width
            };
        }
        out
    }

    /// Header text plan: one entry per column, positioned relative to the
    /// grid origin. Repeated labels collapse to empty strings the way the
    /// chart leaves duplicate days/months unlabeled.
    pub fn header_labels(&self, lang: Language, header_height: f32) -> Vec<HeaderLabel> {
        use chrono::Datelike;

        let cw = self.column_width;
        let mut out = Vec::with_capacity(self.columns.len());
        let mut last: Option<NaiveDateTime> = None;

        for (i, &date) in self.columns.iter().enumerate() {
            let prev = last.unwrap_or_else(|| time::add(date, 1, TimeUnit::Year));
            let day_changed = date.day() != prev.day();
            let month_changed = date.month() != prev.month();
            let year_changed = date.year() != prev.year();

            let fmt = |pattern: &str| time::format(date, pattern, lang);
            let (lower_text, upper_text) = match self.mode {
                ViewMode::QuarterDay => (
                    fmt("HH"),
                    day_changed.then(|| fmt("D MMM")),
                ),
                ViewMode::HalfDay => (
                    fmt("HH"),
                    day_changed.then(|| {
                        if month_changed {
                            fmt("D MMM")
                        } else {
                            fmt("D")
                        }
                    }),
                ),
                ViewMode::Day => (
                    if day_changed { fmt("D") } else { String::new() },
                    month_changed.then(|| fmt("MMMM")),
                ),
                ViewMode::Week => (
                    if month_changed { fmt("D MMM") } else { fmt("D") },
                    month_changed.then(|| fmt("MMMM")),
                ),
                ViewMode::Month => (fmt("MMMM"), year_changed.then(|| fmt("YYYY"))),
                ViewMode::Year => (fmt("YYYY"), year_changed.then(|| fmt("YYYY"))),
            };

            let base_x = i as f32 * cw;
            let (lower_dx, upper_dx) = match self.mode {
                ViewMode::QuarterDay => (cw * 4.0 / 2.0, 0.0),
                ViewMode::HalfDay => (cw * 2.0 / 2.0, 0.0),
                ViewMode::Day => (cw / 2.0, cw * 30.0 / 2.0),
                ViewMode::Week => (0.0, cw * 4.0 / 2.0),
                ViewMode::Month => (cw / 2.0, cw * 12.0 / 2.0),
                ViewMode::Year => (cw / 2.0, cw * 30.0 / 2.0),
            };

            out.push(HeaderLabel {
                lower_text,
                lower_x: base_x + lower_dx,
                lower_y: header_height,
                upper_text: upper_text.filter(|t| !t.is_empty()),
                upper_x: base_x + upper_dx,
                upper_y: header_height - 25.0,
            });
            last = Some(date);
        }
        out
    }
}
