use chrono::NaiveDateTime;

use crate::config::GanttConfig;
use crate::model::task::Task;
use crate::scale::{ViewMode, ViewScale};
use crate::time::{self, TimeUnit};

pub const ENDPOINT_RADIUS: f32 = 4.0;
pub const HANDLE_WIDTH: f32 = 8.0;
/// Height of the progress-handle triangle below the bar.
const PROGRESS_HANDLE_RISE: f32 = 8.66;

/// A plain rectangle in chart coordinates. Returned by the render-surface
/// adapter and used everywhere a measured or derived box travels between
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.end_x() && py >= self.y && py <= self.y + self.height
    }
}

/// Derived bar geometry for one task. Never a source of truth: recomputed
/// whenever scale, row index or task dates/progress change, and mutated
/// only provisionally during an active gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub task_index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Outer progress width; the rendered inner fill clamps to `width`.
    pub progress_width: f32,
    pub invalid: bool,
}

impl Bar {
    pub fn rect(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.width, self.height)
    }

    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Inner progress fill, clamped so it cannot overflow the outline.
    pub fn progress_inner_width(&self) -> f32 {
        self.progress_width.min(self.width)
    }

    pub fn handle_left(&self) -> Geometry {
        Geometry::new(self.x + 1.0, self.y + 1.0, HANDLE_WIDTH, self.height - 2.0)
    }

    pub fn handle_right(&self) -> Geometry {
        Geometry::new(
            self.end_x() - HANDLE_WIDTH - 1.0,
            self.y + 1.0,
            HANDLE_WIDTH,
            self.height - 2.0,
        )
    }

    /// Triangle below the end of the progress fill.
    pub fn progress_handle_points(&self) -> [(f32, f32); 3] {
        let tip_x = self.x + self.progress_inner_width();
        let base_y = self.y + self.height;
        [
            (tip_x - 5.0, base_y),
            (tip_x + 5.0, base_y),
            (tip_x, base_y - PROGRESS_HANDLE_RISE),
        ]
    }

    /// Connector circle center at the leading (left) edge.
    pub fn endpoint_leading(&self) -> (f32, f32) {
        (self.x - ENDPOINT_RADIUS * 2.0, self.center_y())
    }

    /// Connector circle center at the trailing (right) edge.
    pub fn endpoint_trailing(&self) -> (f32, f32) {
        (self.end_x() + ENDPOINT_RADIUS * 2.0, self.center_y())
    }
}

/// Where a bar label lands once its rendered width is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelPlacement {
    /// Centered inside the bar.
    Centered { x: f32 },
    /// Wider than the bar: placed just past the trailing edge.
    PastEnd { x: f32 },
}

/// Date↔pixel mapping for the active scale and configuration.
#[derive(Debug, Clone, Copy)]
pub struct GeometryCtx<'a> {
    pub scale: &'a ViewScale,
    pub config: &'a GanttConfig,
}

impl<'a> GeometryCtx<'a> {
    pub fn new(scale: &'a ViewScale, config: &'a GanttConfig) -> Self {
        Self { scale, config }
    }

    /// X offset of an instant. The Month view works in whole days scaled by
    /// `column_width / 30`, consistent with the 30-day month rule; every
    /// other view converts hours through the column step.
    pub fn x_of(&self, instant: NaiveDateTime) -> f32 {
        if self.scale.mode == ViewMode::Month {
            let days = time::diff(instant, self.scale.start, TimeUnit::Day);
            days as f32 * self.scale.column_width / 30.0
        } else {
            let hours = time::diff(instant, self.scale.start, TimeUnit::Hour);
            (hours as f64 / self.scale.step_hours) as f32 * self.scale.column_width
        }
    }

    /// Width of a span, same unit rules as [`Self::x_of`].
    pub fn width_of(&self, start: NaiveDateTime, end: NaiveDateTime) -> f32 {
        if self.scale.mode == ViewMode::Month {
            let days = time::diff(end, start, TimeUnit::Day);
            days as f32 * self.scale.column_width / 30.0
        } else {
            let hours = time::diff(end, start, TimeUnit::Hour);
            (hours as f64 / self.scale.step_hours) as f32 * self.scale.column_width
        }
    }

    /// Top of a grid row.
    pub fn row_y(&self, row: usize) -> f32 {
        self.config.header_height + self.config.padding / 2.0 + row as f32 * self.config.row_height()
    }

    /// Top of the bar within its row (half a padding below the row top).
    pub fn bar_y(&self, row: usize) -> f32 {
        self.config.header_height
            + self.config.padding
            + row as f32 * (self.config.bar_height + self.config.padding)
    }

    /// Derive the bar for a task.
    pub fn bar_for(&self, task_index: usize, task: &Task) -> Bar {
        let width = self.width_of(task.start, task.end);
        Bar {
            task_index,
            x: self.x_of(task.start),
            y: self.bar_y(task.row_index),
            width,
            height: self.config.bar_height,
            progress_width: width * task.progress / 100.0,
            invalid: task.invalid,
        }
    }

    /// Invert a provisional pixel position back to dates. Fractional hours
    /// are carried in milliseconds so fine view modes stay precise.
    pub fn dates_from_position(&self, x: f32, width: f32) -> (NaiveDateTime, NaiveDateTime) {
        let hours_per_px = self.scale.step_hours / self.scale.column_width as f64;
        let start = time::add_millis_f64(self.scale.start, x as f64 * hours_per_px * 3_600_000.0);
        let end = time::add_millis_f64(start, width as f64 * hours_per_px * 3_600_000.0);
        (start, end)
    }

    /// Progress percent from the current sub-bar width, truncated to an
    /// integer the way the chart has always reported it.
    pub fn progress_percent(&self, bar: &Bar) -> i32 {
        if bar.width <= 0.0 {
            return 0;
        }
        (bar.progress_inner_width() / bar.width * 100.0) as i32
    }

    /// Snap a drag delta to the view's increment: a seventh of a column per
    /// week, a thirtieth per month, otherwise whole columns. Round half up;
    /// the remainder keeps the delta's sign, so leftward drags mirror
    /// toward zero.
    pub fn snap(&self, dx: f32) -> f32 {
        let cw = self.scale.column_width;
        let increment = match self.scale.mode {
            ViewMode::Week => cw / 7.0,
            ViewMode::Month => cw / 30.0,
            _ => cw,
        };
        let rem = dx % increment;
        dx - rem + if rem < increment / 2.0 { 0.0 } else { increment }
    }

    /// Place a label once its rendered width is known (the deferred step:
    /// callers measure during paint, then ask).
    pub fn label_position(&self, bar: &Bar, measured_width: f32) -> LabelPlacement {
        if measured_width > bar.width {
            LabelPlacement::PastEnd {
                x: bar.end_x() + 5.0,
            }
        } else {
            LabelPlacement::Centered {
                x: bar.x + bar.width / 2.0,
            }
        }
    }

    /// Horizontal scroll that parks the oldest task one column inside the
    /// viewport.
    pub fn initial_scroll_x(&self, oldest_start: NaiveDateTime) -> f32 {
        let hours = time::diff(oldest_start, self.scale.start, TimeUnit::Hour);
        (hours as f64 / self.scale.step_hours) as f32 * self.scale.column_width
            - self.scale.column_width
    }

    /// Full grid height: header, half a padding, and one spare row below
    /// the content (five rows when the chart is empty).
    pub fn table_height(&self, row_count: usize) -> f32 {
        let rows = if row_count == 0 { 5 } else { row_count + 1 };
        self.config.header_height + self.config.padding / 2.0 + self.config.row_height() * rows as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GanttConfig;
    use crate::scale::ViewScale;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn task(start: NaiveDateTime, end: NaiveDateTime) -> Task {
        Task {
            id: "t".into(),
            name: "t".into(),
            start,
            end,
            progress: 50.0,
            dependencies: Vec::new(),
            swimlane: None,
            sub_swimlane: None,
            row_index: 0,
            invalid: false,
            editable: true,
            start_drag: true,
            end_drag: true,
            custom_class: None,
            colors: Default::default(),
        }
    }

    fn scale_for(mode: ViewMode, tasks: &[Task]) -> ViewScale {
        let config = GanttConfig::default();
        ViewScale::compute(tasks, mode, config.column_spec(mode).unwrap(), dt(2024, 6, 1))
    }

    #[test]
    fn day_view_maps_hours_to_columns() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 1, 1), dt(2024, 1, 4))];
        let scale = scale_for(ViewMode::Day, &tasks);
        let ctx = GeometryCtx::new(&scale, &config);

        let bar = ctx.bar_for(0, &tasks[0]);
        // 31 December days before the start, 38px columns
        assert_eq!(bar.x, 31.0 * 38.0);
        assert_eq!(bar.width, 3.0 * 38.0);
        assert_eq!(bar.progress_width, bar.width / 2.0);
        assert_eq!(bar.height, 20.0);
    }

    #[test]
    fn bar_y_stacks_rows_below_the_header() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 1, 1), dt(2024, 1, 2))];
        let scale = scale_for(ViewMode::Day, &tasks);
        let ctx = GeometryCtx::new(&scale, &config);

        assert_eq!(ctx.row_y(0), 50.0 + 9.0);
        assert_eq!(ctx.bar_y(0), 50.0 + 18.0);
        assert_eq!(ctx.bar_y(1), 50.0 + 18.0 + 38.0);
    }

    #[test]
    fn month_view_uses_whole_days_over_thirty() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 3, 10), dt(2024, 3, 20))];
        let scale = scale_for(ViewMode::Month, &tasks);
        let ctx = GeometryCtx::new(&scale, &config);

        let bar = ctx.bar_for(0, &tasks[0]);
        // Jan 1 window start; Jan+Feb 2024 = 60 days, plus 9 into March
        assert_eq!(bar.x, 69.0 * 120.0 / 30.0);
        assert_eq!(bar.width, 10.0 * 120.0 / 30.0);
    }

    #[test]
    fn inverse_mapping_round_trips_day_aligned_bars() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 1, 1), dt(2024, 1, 4))];
        let scale = scale_for(ViewMode::Day, &tasks);
        let ctx = GeometryCtx::new(&scale, &config);

        let bar = ctx.bar_for(0, &tasks[0]);
        let (start, end) = ctx.dates_from_position(bar.x, bar.width);
        assert_eq!(start, tasks[0].start);
        assert_eq!(end, tasks[0].end);
    }

    #[test]
    fn snap_rounds_half_up_per_view() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 1, 1), dt(2024, 1, 4))];

        let day = scale_for(ViewMode::Day, &tasks);
        let ctx = GeometryCtx::new(&day, &config);
        assert_eq!(ctx.snap(5.0), 0.0);
        assert_eq!(ctx.snap(25.0), 38.0);
        assert_eq!(ctx.snap(-25.0), 0.0);
        assert_eq!(ctx.snap(-45.0), -38.0);

        let week = scale_for(ViewMode::Week, &tasks);
        let ctx = GeometryCtx::new(&week, &config);
        assert_eq!(ctx.snap(9.0), 0.0);
        assert_eq!(ctx.snap(12.0), 20.0);

        let month = scale_for(ViewMode::Month, &tasks);
        let ctx = GeometryCtx::new(&month, &config);
        assert_eq!(ctx.snap(1.9), 0.0);
        assert_eq!(ctx.snap(2.5), 4.0);
    }

    #[test]
    fn progress_handles_and_endpoints_derive_from_the_bar() {
        let bar = Bar {
            task_index: 0,
            x: 100.0,
            y: 68.0,
            width: 80.0,
            height: 20.0,
            progress_width: 40.0,
            invalid: false,
        };
        assert_eq!(bar.handle_left(), Geometry::new(101.0, 69.0, 8.0, 18.0));
        assert_eq!(bar.handle_right(), Geometry::new(171.0, 69.0, 8.0, 18.0));
        assert_eq!(bar.endpoint_leading(), (92.0, 78.0));
        assert_eq!(bar.endpoint_trailing(), (188.0, 78.0));
        let [left, right, tip] = bar.progress_handle_points();
        assert_eq!(left, (135.0, 88.0));
        assert_eq!(right, (145.0, 88.0));
        assert_eq!(tip, (140.0, 88.0 - 8.66));
    }

    #[test]
    fn progress_inner_width_clamps_to_the_bar() {
        let mut bar = Bar {
            task_index: 0,
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 20.0,
            progress_width: 70.0,
            invalid: false,
        };
        assert_eq!(bar.progress_inner_width(), 50.0);
        bar.progress_width = 20.0;
        assert_eq!(bar.progress_inner_width(), 20.0);
    }

    #[test]
    fn progress_percent_truncates() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 1, 1), dt(2024, 1, 4))];
        let scale = scale_for(ViewMode::Day, &tasks);
        let ctx = GeometryCtx::new(&scale, &config);
        let bar = Bar {
            task_index: 0,
            x: 0.0,
            y: 0.0,
            width: 90.0,
            height: 20.0,
            progress_width: 30.0,
            invalid: false,
        };
        assert_eq!(ctx.progress_percent(&bar), 33);
    }

    #[test]
    fn wide_labels_move_past_the_trailing_edge() {
        let config = GanttConfig::default();
        let tasks = vec![task(dt(2024, 1, 1), dt(2024, 1, 4))];
        let scale = scale_for(ViewMode::Day, &tasks);
        let ctx = GeometryCtx::new(&scale, &config);
        let bar = ctx.bar_for(0, &tasks[0]);

        match ctx.label_position(&bar, bar.width + 10.0) {
            LabelPlacement::PastEnd { x } => assert_eq!(x, bar.end_x() + 5.0),
            other => panic!("expected past-end placement, got {other:?}"),
        }
        match ctx.label_position(&bar, bar.width - 10.0) {
            LabelPlacement::Centered { x } => assert_eq!(x, bar.x + bar.width / 2.0),
            other => panic!("expected centered placement, got {other:?}"),
        }
    }
}
