use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use chrono::NaiveDateTime;

use crate::arrow::{Arrow, EndpointSide};
use crate::config::{ConfigError, GanttConfig, PopupTrigger};
use crate::events::GanttEvent;
use crate::geometry::{Bar, GeometryCtx, LabelPlacement};
use crate::interaction::Gesture;
use crate::model::rows::RowPlan;
use crate::model::task::{RawTask, Task};
use crate::model::{DependencyMap, TaskNormalizer};
use crate::scale::{ViewMode, ViewScale};
use crate::surface::{PopupAction, PopupRequest, RenderSurface, TextStyle};
use crate::time::{self, TimeUnit};

/// The chart engine: owns the task entities and every cache derived from
/// them (rows, scale, bars, arrows), plus the gesture machine state.
///
/// All mutation happens inside methods called from the host's event loop;
/// derived state is rebuilt wholesale on [`Gantt::refresh`] and
/// [`Gantt::change_view_mode`], never patched incrementally.
pub struct Gantt {
    pub(crate) config: GanttConfig,
    pub(crate) tasks: Vec<Task>,
    pub(crate) deps: DependencyMap,
    pub(crate) rows: RowPlan,
    pub(crate) scale: ViewScale,
    pub(crate) bars: Vec<Bar>,
    pub(crate) arrows: Vec<Arrow>,
    pub(crate) index_by_id: HashMap<String, usize>,
    pub(crate) gesture: Gesture,
    pub(crate) events: VecDeque<GanttEvent>,
    pub(crate) pending_popup: Option<PopupAction>,
    pub(crate) cooldowns: HashMap<usize, Instant>,
    normalizer: TaskNormalizer,
    today: NaiveDateTime,
}

impl Gantt {
    /// Build a chart from raw records using the wall clock for "today" and
    /// random task ids.
    pub fn new(records: Vec<RawTask>, config: GanttConfig) -> Result<Self, ConfigError> {
        let today = chrono::Local::now().naive_local();
        Self::with_normalizer(records, config, TaskNormalizer::with_today(today), today)
    }

    /// Build with an injected normalizer (deterministic ids and "today").
    pub fn with_normalizer(
        records: Vec<RawTask>,
        config: GanttConfig,
        normalizer: TaskNormalizer,
        today: NaiveDateTime,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = config.view_mode;
        let mut gantt = Self {
            scale: ViewScale::compute(
                &[],
                mode,
                config.column_spec(mode).unwrap_or(crate::config::ColumnSpec::new(24.0, 38.0)),
                today,
            ),
            config,
            tasks: Vec::new(),
            deps: DependencyMap::default(),
            rows: RowPlan::default(),
            bars: Vec::new(),
            arrows: Vec::new(),
            index_by_id: HashMap::new(),
            gesture: Gesture::Idle,
            events: VecDeque::new(),
            pending_popup: None,
            cooldowns: HashMap::new(),
            normalizer,
            today,
        };
        gantt.load(records);
        gantt.change_view_mode(mode);
        Ok(gantt)
    }

    /// Discard the task set and every derived cache, then rebuild from
    /// fresh records.
    pub fn refresh(&mut self, records: Vec<RawTask>) {
        self.load(records);
        self.pending_popup = Some(PopupAction::Hide);
        self.change_view_mode(self.config.view_mode);
    }

    fn load(&mut self, records: Vec<RawTask>) {
        let (mut tasks, deps) = self.normalizer.normalize(records);
        self.rows = RowPlan::assign(&mut tasks);
        self.index_by_id = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        self.tasks = tasks;
        self.deps = deps;
        self.gesture = Gesture::Idle;
        self.cooldowns.clear();
    }

    /// Switch the timescale and rebuild all geometry. Fires `view_change`.
    pub fn change_view_mode(&mut self, mode: ViewMode) {
        let Some(spec) = self.config.column_spec(mode) else {
            log::warn!("no column spec configured for view mode {mode:?}; keeping the current one");
            return;
        };
        self.config.view_mode = mode;
        self.scale = ViewScale::compute(&self.tasks, mode, spec, self.today);
        self.rebuild_geometry();
        self.events.push_back(GanttEvent::ViewChange(mode));
    }

    /// Recompute bars and arrows from the current task state and scale.
    /// Arrows are rebuilt from scratch here (endpoints re-chosen); only
    /// in-gesture rerouting keeps them sticky.
    fn rebuild_geometry(&mut self) {
        let ctx = GeometryCtx::new(&self.scale, &self.config);
        self.bars = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| ctx.bar_for(i, task))
            .collect();

        let mut arrows = Vec::new();
        for (ti, task) in self.tasks.iter().enumerate() {
            for dep in &task.dependencies {
                let Some(&fi) = self.index_by_id.get(dep) else {
                    log::warn!(
                        "task `{}` depends on unknown id `{dep}`; no arrow drawn",
                        task.id
                    );
                    continue;
                };
                arrows.push(Arrow::new(
                    dep.clone(),
                    task.id.clone(),
                    &self.bars[fi],
                    &self.bars[ti],
                    self.tasks[fi].row_index,
                    task.row_index,
                    &self.config,
                ));
            }
        }
        self.arrows = arrows;
    }

    /// Reroute every arrow touching `task_index`, keeping endpoints.
    pub(crate) fn reroute_arrows_for(&mut self, task_index: usize) {
        let id = self.tasks[task_index].id.clone();
        let Self {
            arrows,
            bars,
            tasks,
            index_by_id,
            config,
            ..
        } = self;
        for arrow in arrows.iter_mut() {
            if arrow.from != id && arrow.to != id {
                continue;
            }
            let (Some(&fi), Some(&ti)) = (index_by_id.get(&arrow.from), index_by_id.get(&arrow.to))
            else {
                continue;
            };
            arrow.reroute(
                &bars[fi],
                &bars[ti],
                tasks[fi].row_index,
                tasks[ti].row_index,
                config,
            );
        }
    }

    /// Append a dependency edge `from -> to`, route its arrow and fire
    /// `dependency_added`. Refused when either id is unknown, the edge
    /// exists, or it would link a task to itself.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> bool {
        let (Some(&fi), Some(&ti)) = (self.index_by_id.get(from), self.index_by_id.get(to)) else {
            return false;
        };
        if fi == ti || self.tasks[ti].dependencies.iter().any(|d| d == from) {
            return false;
        }
        self.tasks[ti].dependencies.push(from.to_string());
        self.deps.insert(from, to);
        self.arrows.push(Arrow::new(
            from.to_string(),
            to.to_string(),
            &self.bars[fi],
            &self.bars[ti],
            self.tasks[fi].row_index,
            self.tasks[ti].row_index,
            &self.config,
        ));
        self.events
            .push_back(GanttEvent::DependencyAdded { from: from.to_string() });
        true
    }

    /// Remove the edge `from -> to` and its arrow; fires
    /// `dependency_deleted`.
    pub fn delete_dependency(&mut self, from: &str, to: &str) -> bool {
        let Some(&ti) = self.index_by_id.get(to) else {
            return false;
        };
        let before = self.tasks[ti].dependencies.len();
        self.tasks[ti].dependencies.retain(|d| d != from);
        if self.tasks[ti].dependencies.len() == before {
            return false;
        }
        self.deps.remove(from, to);
        self.arrows.retain(|a| !(a.from == from && a.to == to));
        self.events.push_back(GanttEvent::DependencyDeleted {
            from: from.to_string(),
            to: to.to_string(),
        });
        true
    }

    /// Whether a bar's connector on `side` anchors any arrow; used
    /// endpoints stay visible at full opacity.
    pub fn endpoint_used(&self, task_index: usize, side: EndpointSide) -> bool {
        let id = &self.tasks[task_index].id;
        self.arrows
            .iter()
            .any(|a| a.from == *id && a.endpoint == side)
    }

    // ── Popup plumbing ──────────────────────────────────────────────────

    pub(crate) fn popup_request(&self, task_index: usize) -> PopupRequest {
        let task = &self.tasks[task_index];
        let subtitle = format!(
            "{} - {}",
            time::format(task.start, "MMM D", self.config.language),
            time::format(
                time::add(task.end, -1, TimeUnit::Second),
                "MMM D",
                self.config.language
            ),
        );
        let mut request = PopupRequest::new(
            self.bars[task_index].rect(),
            task.name.clone(),
            subtitle,
            task.id.clone(),
        );
        request.custom_html = self.config.custom_popup_html.map(|render| render(task));
        request
    }

    /// Ask for the popup over a bar, honoring the post-drag cooldown.
    /// Hover-triggered hosts call this from their hover handling; nothing
    /// shows while a gesture is in flight.
    pub fn show_popup(&mut self, task_index: usize, now: Instant) {
        if self.active_task().is_some()
            || !self.tasks[task_index].interactive()
            || !self.popup_allowed(task_index, now)
        {
            return;
        }
        self.pending_popup = Some(PopupAction::Show(self.popup_request(task_index)));
    }

    pub fn hide_popup(&mut self) {
        self.pending_popup = Some(PopupAction::Hide);
    }

    /// Drain the queued popup command, if any.
    pub fn take_popup_action(&mut self) -> Option<PopupAction> {
        self.pending_popup.take()
    }

    pub(crate) fn popup_allowed(&self, task_index: usize, now: Instant) -> bool {
        self.cooldowns
            .get(&task_index)
            .map_or(true, |until| now >= *until)
    }

    /// Arm the one-shot popup cooldown; a pending one is not extended.
    pub(crate) fn arm_cooldown(&mut self, task_index: usize, until: Instant, now: Instant) {
        match self.cooldowns.get(&task_index) {
            Some(existing) if now < *existing => {}
            _ => {
                self.cooldowns.insert(task_index, until);
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.index_by_id.get(id).map(|&i| &self.tasks[i])
    }

    pub fn task_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar(&self, id: &str) -> Option<&Bar> {
        self.index_by_id.get(id).map(|&i| &self.bars[i])
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// The row grouping plan; doubles as the debug observability hook for
    /// the swimlane map.
    pub fn row_plan(&self) -> &RowPlan {
        &self.rows
    }

    pub fn scale(&self) -> &ViewScale {
        &self.scale
    }

    pub fn geometry(&self) -> GeometryCtx<'_> {
        GeometryCtx::new(&self.scale, &self.config)
    }

    /// Drain queued output events.
    pub fn take_events(&mut self) -> Vec<GanttEvent> {
        self.events.drain(..).collect()
    }

    pub fn table_width(&self) -> f32 {
        self.scale.table_width()
    }

    pub fn table_height(&self) -> f32 {
        self.geometry().table_height(self.rows.row_count)
    }

    /// Scroll offset that brings the earliest task into view.
    pub fn initial_scroll_x(&self) -> f32 {
        match self.tasks.iter().map(|t| t.start).min() {
            Some(oldest) => self.geometry().initial_scroll_x(oldest).max(0.0),
            None => 0.0,
        }
    }

    pub(crate) fn popup_trigger(&self) -> PopupTrigger {
        self.config.popup_trigger
    }

    /// Place every bar label against its measured width. This is the
    /// deferred layout pass: hosts call it during paint, once the surface
    /// can answer for rendered text sizes.
    pub fn label_placements(&self, surface: &dyn RenderSurface) -> Vec<LabelPlacement> {
        let ctx = self.geometry();
        self.tasks
            .iter()
            .zip(&self.bars)
            .map(|(task, bar)| {
                let measured = surface.measure_text(&task.name, TextStyle::BarLabel);
                ctx.label_position(bar, measured.width)
            })
            .collect()
    }

    /// Width of the swimlane header panel: longest title plus longest
    /// sub-swimlane label plus three paddings; zero without groups.
    pub fn swimlane_panel_width(&self, surface: &dyn RenderSurface) -> f32 {
        if self.rows.groups.is_empty() {
            return 0.0;
        }
        let longest_title = self
            .rows
            .groups
            .iter()
            .map(|g| surface.measure_text(&g.label, TextStyle::SwimlaneTitle).width)
            .fold(0.0f32, f32::max);
        let longest_sub = self
            .rows
            .groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .filter_map(|s| s.label.as_deref())
            .map(|label| surface.measure_text(label, TextStyle::SwimlaneSubtitle).width)
            .fold(0.0f32, f32::max);
        longest_title + longest_sub + 3.0 * self.config.padding
    }

    /// Longest sub-swimlane label width, for the panel's right-aligned
    /// sub-row band.
    pub fn swimlane_sub_band_width(&self, surface: &dyn RenderSurface) -> f32 {
        self.rows
            .groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .filter_map(|s| s.label.as_deref())
            .map(|label| surface.measure_text(label, TextStyle::SwimlaneSubtitle).width)
            .fold(0.0f32, f32::max)
    }
}
