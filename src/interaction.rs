use std::time::{Duration, Instant};

use crate::arrow::Arrow;
use crate::chart::Gantt;
use crate::config::PopupTrigger;
use crate::events::GanttEvent;
use crate::geometry::ENDPOINT_RADIUS;
use crate::surface::PopupAction;
use crate::time::{self, TimeUnit};

/// Popup suppression window after a committed gesture.
const COOLDOWN: Duration = Duration::from_millis(1000);
/// How close a pointer must come to an arrow polyline to hit it.
const ARROW_HIT_SLOP: f32 = 3.0;

/// What lives under a pointer position, in front-to-back priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Bar(usize),
    HandleLeft(usize),
    HandleRight(usize),
    HandleProgress(usize),
    EndpointTrailing(usize),
    Arrow(usize),
    Background,
}

/// Per-bar gesture scratch: original x/width and the applied snapped delta.
#[derive(Debug, Clone)]
pub(crate) struct BarSnapshot {
    pub bar: usize,
    pub ox: f32,
    pub owidth: f32,
    pub finaldx: f32,
}

/// Scoped state of a move/resize gesture; dropped wholesale on release.
#[derive(Debug, Clone)]
pub(crate) struct DragSession {
    pub origin_x: f32,
    pub grabbed: usize,
    pub snapshots: Vec<BarSnapshot>,
    pub moved: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ProgressSession {
    pub origin_x: f32,
    pub bar: usize,
    pub owidth: f32,
    pub finaldx: f32,
}

/// The pointer-gesture state machine. `Idle` is both the initial and the
/// terminal state; only explicit release leaves a drag.
#[derive(Debug, Clone, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    Dragging(DragSession),
    ResizingLeft(DragSession),
    ResizingRight(DragSession),
    ResizingProgress(ProgressSession),
    Linking {
        from: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragKind {
    Move,
    Left,
    Right,
}

impl Gantt {
    /// Resolve what sits under chart-local coordinates. Connector circles
    /// and handles win over the bar body; invalid tasks are transparent to
    /// hits entirely.
    pub fn hit_test(&self, x: f32, y: f32) -> HitTarget {
        for (i, bar) in self.bars.iter().enumerate() {
            if !self.tasks[i].interactive() {
                continue;
            }
            let (ex, ey) = bar.endpoint_trailing();
            let reach = ENDPOINT_RADIUS + 2.0;
            if (x - ex) * (x - ex) + (y - ey) * (y - ey) <= reach * reach {
                return HitTarget::EndpointTrailing(i);
            }
            if self.tasks[i].progress > 0.0 {
                let [left, right, tip] = bar.progress_handle_points();
                if x >= left.0 && x <= right.0 && y >= tip.1 && y <= left.1 {
                    return HitTarget::HandleProgress(i);
                }
            }
            if bar.handle_left().contains(x, y) {
                return HitTarget::HandleLeft(i);
            }
            if bar.handle_right().contains(x, y) {
                return HitTarget::HandleRight(i);
            }
            if bar.rect().contains(x, y) {
                return HitTarget::Bar(i);
            }
        }
        for (k, arrow) in self.arrows.iter().enumerate() {
            if arrow_hit(arrow, x, y) {
                return HitTarget::Arrow(k);
            }
        }
        HitTarget::Background
    }

    /// Press. Either resolves a pending dependency link or opens a gesture.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if let Gesture::Linking { from } = self.gesture {
            self.gesture = Gesture::Idle;
            let target = match self.hit_test(x, y) {
                HitTarget::Bar(i)
                | HitTarget::HandleLeft(i)
                | HitTarget::HandleRight(i)
                | HitTarget::HandleProgress(i)
                | HitTarget::EndpointTrailing(i) => Some(i),
                _ => None,
            };
            if let Some(to) = target {
                if to != from && self.link_eligible(from, to) {
                    let from_id = self.tasks[from].id.clone();
                    let to_id = self.tasks[to].id.clone();
                    self.add_dependency(&from_id, &to_id);
                }
            }
            return;
        }

        match self.hit_test(x, y) {
            HitTarget::EndpointTrailing(i) => {
                self.gesture = Gesture::Linking { from: i };
            }
            HitTarget::HandleProgress(i) => {
                if self.tasks[i].editable {
                    self.gesture = Gesture::ResizingProgress(ProgressSession {
                        origin_x: x,
                        bar: i,
                        owidth: self.bars[i].progress_inner_width(),
                        finaldx: 0.0,
                    });
                }
            }
            HitTarget::HandleLeft(i) => {
                self.gesture = Gesture::ResizingLeft(self.drag_session(i, x, true));
            }
            HitTarget::HandleRight(i) => {
                self.gesture = Gesture::ResizingRight(self.drag_session(i, x, false));
            }
            HitTarget::Bar(i) => {
                self.gesture = Gesture::Dragging(self.drag_session(i, x, true));
            }
            HitTarget::Arrow(k) => {
                let from = self.arrows[k].from.clone();
                let to = self.arrows[k].to.clone();
                self.delete_dependency(&from, &to);
            }
            HitTarget::Background => {
                self.hide_popup();
            }
        }
    }

    /// Pointer travel during an open gesture. Idle/linking moves are inert.
    pub fn pointer_move(&mut self, x: f32, _y: f32) {
        let mut gesture = std::mem::take(&mut self.gesture);
        match &mut gesture {
            Gesture::Dragging(session) => self.apply_drag(session, x, DragKind::Move),
            Gesture::ResizingLeft(session) => self.apply_drag(session, x, DragKind::Left),
            Gesture::ResizingRight(session) => self.apply_drag(session, x, DragKind::Right),
            Gesture::ResizingProgress(session) => self.apply_progress(session, x),
            Gesture::Idle | Gesture::Linking { .. } => {}
        }
        self.gesture = gesture;
    }

    /// Release: commit whatever actually changed, emit events, arm the
    /// popup cooldown. A gesture with no net delta is a click.
    pub fn pointer_up(&mut self, now: Instant) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Linking { from } => {
                // linking is click-driven; it survives the release
                self.gesture = Gesture::Linking { from };
            }
            Gesture::Dragging(session)
            | Gesture::ResizingLeft(session)
            | Gesture::ResizingRight(session) => self.finish_drag(session, now),
            Gesture::ResizingProgress(session) => self.finish_progress(session, now),
            Gesture::Idle => {}
        }
    }

    /// The dependency link being drawn, if any.
    pub fn linking_from(&self) -> Option<usize> {
        match self.gesture {
            Gesture::Linking { from } => Some(from),
            _ => None,
        }
    }

    /// A link target is eligible when it is a different, interactive task
    /// that does not already depend on the source.
    pub fn link_eligible(&self, from: usize, to: usize) -> bool {
        from != to
            && self.tasks[to].interactive()
            && !self.tasks[to]
                .dependencies
                .iter()
                .any(|d| *d == self.tasks[from].id)
    }

    /// Index of the task being moved or resized, if a gesture is open.
    pub fn active_task(&self) -> Option<usize> {
        match &self.gesture {
            Gesture::Dragging(s) | Gesture::ResizingLeft(s) | Gesture::ResizingRight(s) => {
                Some(s.grabbed)
            }
            Gesture::ResizingProgress(s) => Some(s.bar),
            _ => None,
        }
    }

    fn drag_session(&self, grabbed: usize, origin_x: f32, cascade: bool) -> DragSession {
        // a non-editable grab still opens a session (so release resolves to
        // a click or a cooldown) but pins every bar in place
        let mut members = Vec::new();
        if self.tasks[grabbed].editable {
            members.push(grabbed);
            if cascade {
                let closure: Vec<usize> = self
                    .deps
                    .all_dependents(&self.tasks[grabbed].id)
                    .iter()
                    .filter_map(|id| self.index_by_id.get(id).copied())
                    .collect();
                // the whole closure moves, or none of it does
                if closure.iter().all(|&i| self.tasks[i].cascadable()) {
                    members.extend(closure.into_iter().filter(|&i| self.tasks[i].editable));
                }
            }
        }
        let snapshots = members
            .into_iter()
            .map(|i| BarSnapshot {
                bar: i,
                ox: self.bars[i].x,
                owidth: self.bars[i].width,
                finaldx: 0.0,
            })
            .collect();
        DragSession {
            origin_x,
            grabbed,
            snapshots,
            moved: false,
        }
    }

    fn apply_drag(&mut self, session: &mut DragSession, x: f32, kind: DragKind) {
        let finaldx = self.geometry().snap(x - session.origin_x);
        for snap in session.snapshots.iter_mut() {
            snap.finaldx = finaldx;
            let i = snap.bar;
            let is_grabbed = i == session.grabbed;
            match kind {
                DragKind::Move => {
                    if self.tasks[i].cascadable() {
                        self.try_move_x(i, snap.ox + finaldx);
                    }
                }
                DragKind::Left => {
                    if is_grabbed {
                        if self.tasks[i].start_drag {
                            self.try_move_x(i, snap.ox + finaldx);
                            self.try_set_width(i, snap.owidth - finaldx);
                        }
                    } else if self.tasks[i].cascadable() {
                        self.try_move_x(i, snap.ox + finaldx);
                    }
                }
                DragKind::Right => {
                    if is_grabbed && self.tasks[i].end_drag {
                        self.try_set_width(i, snap.owidth + finaldx);
                    }
                }
            }
            self.bars[i].progress_width = self.bars[i].width * self.tasks[i].progress / 100.0;
        }
        if finaldx != 0.0 {
            session.moved = true;
        }
        let touched: Vec<usize> = session.snapshots.iter().map(|s| s.bar).collect();
        for i in touched {
            self.reroute_arrows_for(i);
        }
    }

    /// Apply a proposed x unless it would put the bar before any bar it
    /// depends on; a rejection skips only this frame's x change.
    fn try_move_x(&mut self, i: usize, x: f32) -> bool {
        for dep in &self.tasks[i].dependencies {
            if let Some(&di) = self.index_by_id.get(dep) {
                if x < self.bars[di].x {
                    return false;
                }
            }
        }
        self.bars[i].x = x;
        true
    }

    /// Widths are floored at one column.
    fn try_set_width(&mut self, i: usize, width: f32) -> bool {
        if width < self.scale.column_width {
            return false;
        }
        self.bars[i].width = width;
        true
    }

    fn apply_progress(&mut self, session: &mut ProgressSession, x: f32) {
        let dx = (x - session.origin_x).max(-session.owidth);
        let bar_width = self.bars[session.bar].width;
        let new_width = (session.owidth + dx).clamp(0.0, bar_width);
        self.bars[session.bar].progress_width = new_width;
        session.finaldx = new_width - session.owidth;
    }

    fn finish_drag(&mut self, session: DragSession, now: Instant) {
        if !session.moved {
            self.emit_click(session.grabbed, now);
            return;
        }
        self.arm_cooldown(session.grabbed, now + COOLDOWN, now);
        for snap in &session.snapshots {
            if snap.finaldx == 0.0 {
                continue;
            }
            self.commit_dates(snap.bar);
            self.arm_cooldown(snap.bar, now + COOLDOWN, now);
        }
    }

    fn finish_progress(&mut self, session: ProgressSession, now: Instant) {
        if session.finaldx == 0.0 {
            self.emit_click(session.bar, now);
            return;
        }
        let new_progress = self.geometry().progress_percent(&self.bars[session.bar]);
        let task = &mut self.tasks[session.bar];
        if task.progress != new_progress as f32 {
            task.progress = new_progress as f32;
            let task_id = task.id.clone();
            self.events.push_back(GanttEvent::ProgressChange {
                task_id,
                progress: new_progress,
            });
        }
        self.arm_cooldown(session.bar, now + COOLDOWN, now);
    }

    /// Invert the bar's pixel position to dates and commit when they moved.
    fn commit_dates(&mut self, i: usize) {
        let (new_start, new_end) = self
            .geometry()
            .dates_from_position(self.bars[i].x, self.bars[i].width);
        let task = &mut self.tasks[i];
        if task.start == new_start && task.end == new_end {
            return;
        }
        task.start = new_start;
        task.end = new_end;
        let task_id = task.id.clone();
        self.events.push_back(GanttEvent::DateChange {
            task_id,
            start: new_start,
            end: time::add(new_end, -1, TimeUnit::Second),
        });
    }

    fn emit_click(&mut self, i: usize, now: Instant) {
        if !self.tasks[i].interactive() || self.popup_trigger() != PopupTrigger::Click {
            return;
        }
        if !self.popup_allowed(i, now) {
            return;
        }
        self.events.push_back(GanttEvent::Click {
            task_id: self.tasks[i].id.clone(),
        });
        self.pending_popup = Some(PopupAction::Show(self.popup_request(i)));
    }
}

fn arrow_hit(arrow: &Arrow, x: f32, y: f32) -> bool {
    for polyline in arrow.flatten() {
        for pair in polyline.windows(2) {
            if point_segment_distance((x, y), pair[0], pair[1]) <= ARROW_HIT_SLOP {
                return true;
            }
        }
    }
    false
}

fn point_segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - cx) * (p.0 - cx) + (p.1 - cy) * (p.1 - cy)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GanttConfig;
    use crate::model::normalize::SequentialIdGenerator;
    use crate::model::task::{DependencyList, RawTask};
    use crate::model::TaskNormalizer;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(y: i32, mo: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn record(id: &str, start: &str, end: &str) -> RawTask {
        RawTask {
            id: Some(id.into()),
            name: id.to_uppercase(),
            start: Some(start.into()),
            end: Some(end.into()),
            ..Default::default()
        }
    }

    /// A{Jan 1–3} and B{Jan 2–5, depends on A}, Day view.
    fn sample_records() -> Vec<RawTask> {
        let a = record("a", "2024-01-01", "2024-01-03");
        let mut b = record("b", "2024-01-02", "2024-01-05");
        b.dependencies = Some(DependencyList::Text("a".into()));
        vec![a, b]
    }

    fn gantt_with(records: Vec<RawTask>) -> Gantt {
        let normalizer = TaskNormalizer::new(
            Box::new(SequentialIdGenerator::new("task")),
            dt(2024, 6, 1),
        );
        let mut gantt =
            Gantt::with_normalizer(records, GanttConfig::default(), normalizer, dt(2024, 6, 1))
                .unwrap();
        gantt.take_events();
        gantt
    }

    fn gantt() -> Gantt {
        gantt_with(sample_records())
    }

    // grid math under the default Day view: scale starts 2023-12-01,
    // columns are 38px wide, one per day
    const COL: f32 = 38.0;
    const A_X: f32 = 31.0 * COL;
    const B_X: f32 = 32.0 * COL;

    fn bar_center(gantt: &Gantt, id: &str) -> (f32, f32) {
        let bar = gantt.bar(id).unwrap();
        (bar.x + bar.width / 2.0, bar.center_y())
    }

    #[test]
    fn end_to_end_rows_scale_and_arrow() {
        let gantt = gantt();
        assert_eq!(gantt.task("a").unwrap().row_index, 0);
        assert_eq!(gantt.task("b").unwrap().row_index, 1);
        assert_eq!(gantt.scale().start, dt(2023, 12, 1));
        assert_eq!(gantt.bar("a").unwrap().x, A_X);
        assert_eq!(gantt.bar("b").unwrap().x, B_X);

        assert_eq!(gantt.arrows().len(), 1);
        let arrow = &gantt.arrows()[0];
        assert_eq!(arrow.from, "a");
        assert_eq!(arrow.to, "b");
        assert_eq!(arrow.endpoint, crate::arrow::EndpointSide::Trailing);
    }

    #[test]
    fn dragging_left_handle_before_the_dependency_is_rejected() {
        let mut gantt = gantt();
        let handle = gantt.bar("b").unwrap().handle_left();
        let (hx, hy) = (handle.x + 2.0, handle.y + 2.0);

        gantt.pointer_down(hx, hy);
        gantt.pointer_move(hx - 2.0 * COL, hy);
        // the proposed x would land before A: rejected, B stays put
        assert_eq!(gantt.bar("b").unwrap().x, B_X);

        gantt.pointer_up(Instant::now());
        assert_eq!(gantt.task("b").unwrap().start, dt(2024, 1, 2));
    }

    #[test]
    fn dragging_a_bar_cascades_to_its_dependents() {
        let mut gantt = gantt();
        let (cx, cy) = bar_center(&gantt, "a");

        gantt.pointer_down(cx, cy);
        gantt.pointer_move(cx + COL, cy);
        assert_eq!(gantt.bar("a").unwrap().x, A_X + COL);
        assert_eq!(gantt.bar("b").unwrap().x, B_X + COL);
        assert!(gantt.bar("b").unwrap().x >= gantt.bar("a").unwrap().x);

        gantt.pointer_up(Instant::now());
        assert_eq!(gantt.task("a").unwrap().start, dt(2024, 1, 2));
        assert_eq!(gantt.task("b").unwrap().start, dt(2024, 1, 3));
        let dates_changed = gantt
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GanttEvent::DateChange { .. }))
            .count();
        assert_eq!(dates_changed, 2);
    }

    #[test]
    fn cascade_requires_every_closure_member_to_allow_both_drags() {
        let mut records = sample_records();
        records[1].start_drag = Some(false);
        let mut gantt = gantt_with(records);
        let (cx, cy) = bar_center(&gantt, "a");

        gantt.pointer_down(cx, cy);
        gantt.pointer_move(cx + COL, cy);
        // only the grabbed bar moves
        assert_eq!(gantt.bar("a").unwrap().x, A_X + COL);
        assert_eq!(gantt.bar("b").unwrap().x, B_X);
    }

    #[test]
    fn right_resize_touches_only_the_grabbed_bar() {
        let mut gantt = gantt();
        let handle = gantt.bar("a").unwrap().handle_right();
        let (hx, hy) = (handle.x + 2.0, handle.y + 2.0);
        let old_width = gantt.bar("a").unwrap().width;

        gantt.pointer_down(hx, hy);
        gantt.pointer_move(hx + COL, hy);
        assert_eq!(gantt.bar("a").unwrap().width, old_width + COL);
        assert_eq!(gantt.bar("b").unwrap().x, B_X);

        gantt.pointer_up(Instant::now());
        let events = gantt.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GanttEvent::DateChange { task_id, end, .. }
                if task_id == "a" && *end == dt(2024, 1, 4) + chrono::Duration::seconds(86_399)
        )));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GanttEvent::DateChange { task_id, .. } if task_id == "b")));
    }

    #[test]
    fn width_never_shrinks_below_one_column() {
        let mut gantt = gantt();
        let handle = gantt.bar("a").unwrap().handle_right();
        let (hx, hy) = (handle.x + 2.0, handle.y + 2.0);

        gantt.pointer_down(hx, hy);
        gantt.pointer_move(hx - 10.0 * COL, hy);
        assert_eq!(gantt.bar("a").unwrap().width, 3.0 * COL);
    }

    #[test]
    fn sub_snap_movement_commits_nothing_and_clicks() {
        let mut gantt = gantt();
        let (cx, cy) = bar_center(&gantt, "a");

        gantt.pointer_down(cx, cy);
        gantt.pointer_move(cx + 5.0, cy); // snaps to zero
        gantt.pointer_up(Instant::now());

        let events = gantt.take_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, GanttEvent::DateChange { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GanttEvent::Click { task_id } if task_id == "a")));
        assert!(matches!(
            gantt.take_popup_action(),
            Some(PopupAction::Show(request)) if request.title == "A"
        ));
    }

    #[test]
    fn progress_drag_clamps_to_the_bar_and_commits_percent() {
        let mut records = sample_records();
        records[0].progress = Some(50.0);
        let mut gantt = gantt_with(records);

        let bar = gantt.bar("a").unwrap().clone();
        let [_, _, tip] = bar.progress_handle_points();
        let (hx, hy) = (tip.0, tip.1 + 4.0);

        gantt.pointer_down(hx, hy);
        gantt.pointer_move(hx + bar.width, hy); // way past the end
        assert_eq!(gantt.bar("a").unwrap().progress_width, bar.width);

        gantt.pointer_up(Instant::now());
        assert_eq!(gantt.task("a").unwrap().progress, 100.0);
        assert!(gantt.take_events().iter().any(|e| matches!(
            e,
            GanttEvent::ProgressChange { task_id, progress } if task_id == "a" && *progress == 100
        )));
    }

    #[test]
    fn progress_drag_clamps_at_zero() {
        let mut records = sample_records();
        records[0].progress = Some(50.0);
        let mut gantt = gantt_with(records);

        let bar = gantt.bar("a").unwrap().clone();
        let [_, _, tip] = bar.progress_handle_points();
        let (hx, hy) = (tip.0, tip.1 + 4.0);

        gantt.pointer_down(hx, hy);
        gantt.pointer_move(hx - 10.0 * bar.width, hy);
        gantt.pointer_up(Instant::now());
        assert_eq!(gantt.task("a").unwrap().progress, 0.0);
    }

    #[test]
    fn linking_completes_on_an_eligible_bar() {
        let mut records = sample_records();
        records.push(record("c", "2024-01-03", "2024-01-06"));
        let mut gantt = gantt_with(records);

        let (ex, ey) = gantt.bar("a").unwrap().endpoint_trailing();
        gantt.pointer_down(ex, ey);
        gantt.pointer_up(Instant::now());
        assert_eq!(gantt.linking_from(), gantt.task_index("a"));

        let (cx, cy) = bar_center(&gantt, "c");
        gantt.pointer_down(cx, cy);
        assert_eq!(gantt.linking_from(), None);
        assert_eq!(gantt.task("c").unwrap().dependencies, ["a"]);
        assert_eq!(gantt.arrows().len(), 2);
        assert!(gantt
            .take_events()
            .iter()
            .any(|e| matches!(e, GanttEvent::DependencyAdded { from } if from == "a")));
    }

    #[test]
    fn linking_rejects_an_existing_dependent_and_cancels_on_background() {
        let mut gantt = gantt();

        let (ex, ey) = gantt.bar("a").unwrap().endpoint_trailing();
        gantt.pointer_down(ex, ey);
        // b already depends on a: the click cancels without a new edge
        let (bx, by) = bar_center(&gantt, "b");
        gantt.pointer_down(bx, by);
        assert_eq!(gantt.linking_from(), None);
        assert_eq!(gantt.arrows().len(), 1);

        gantt.pointer_down(ex, ey);
        gantt.pointer_down(5.0, 5.0); // background
        assert_eq!(gantt.linking_from(), None);
        assert_eq!(gantt.arrows().len(), 1);
        assert!(!gantt
            .take_events()
            .iter()
            .any(|e| matches!(e, GanttEvent::DependencyAdded { .. })));
    }

    #[test]
    fn clicking_an_arrow_deletes_the_edge() {
        let mut gantt = gantt();
        // the first run of the A→B arrow drops straight down from the
        // trailing connector
        let (ex, ey) = gantt.bar("a").unwrap().endpoint_trailing();
        gantt.pointer_down(ex, ey + 10.0);

        assert!(gantt.arrows().is_empty());
        assert!(gantt.task("b").unwrap().dependencies.is_empty());
        assert!(gantt.take_events().iter().any(|e| matches!(
            e,
            GanttEvent::DependencyDeleted { from, to } if from == "a" && to == "b"
        )));
    }

    #[test]
    fn cooldown_suppresses_the_click_popup_then_expires() {
        let mut gantt = gantt();
        let (cx, cy) = bar_center(&gantt, "a");
        let t0 = Instant::now();

        gantt.pointer_down(cx, cy);
        gantt.pointer_move(cx + COL, cy);
        gantt.pointer_up(t0);
        gantt.take_events();
        gantt.take_popup_action();

        let (cx, cy) = bar_center(&gantt, "a");
        gantt.pointer_down(cx, cy);
        gantt.pointer_up(t0 + Duration::from_millis(10));
        assert!(gantt.take_popup_action().is_none());
        assert!(!gantt
            .take_events()
            .iter()
            .any(|e| matches!(e, GanttEvent::Click { .. })));

        gantt.pointer_down(cx, cy);
        gantt.pointer_up(t0 + Duration::from_millis(1500));
        assert!(gantt.take_popup_action().is_some());
    }

    #[test]
    fn invalid_tasks_take_no_gestures() {
        let mut records = sample_records();
        records.push(RawTask {
            id: Some("ghost".into()),
            name: "Ghost".into(),
            ..Default::default()
        });
        let mut gantt = gantt_with(records);
        assert!(gantt.task("ghost").unwrap().invalid);

        let (cx, cy) = bar_center(&gantt, "ghost");
        assert_eq!(gantt.hit_test(cx, cy), HitTarget::Background);
        gantt.pointer_down(cx, cy);
        gantt.pointer_move(cx + COL, cy);
        gantt.pointer_up(Instant::now());
        assert!(!gantt
            .take_events()
            .iter()
            .any(|e| matches!(e, GanttEvent::DateChange { .. } | GanttEvent::Click { .. })));
    }

    #[test]
    fn non_editable_tasks_click_but_do_not_drag() {
        let mut records = sample_records();
        records[0].editable = Some(false);
        let mut gantt = gantt_with(records);
        let (cx, cy) = bar_center(&gantt, "a");

        gantt.pointer_down(cx, cy);
        gantt.pointer_move(cx + COL, cy);
        // neither the grabbed bar nor its dependents budge
        assert_eq!(gantt.bar("a").unwrap().x, A_X);
        assert_eq!(gantt.bar("b").unwrap().x, B_X);
        gantt.pointer_up(Instant::now());
        assert!(!gantt
            .take_events()
            .iter()
            .any(|e| matches!(e, GanttEvent::DateChange { .. })));

        // a plain click still reaches the host
        let later = Instant::now() + Duration::from_secs(5);
        gantt.pointer_down(cx, cy);
        gantt.pointer_up(later);
        assert!(gantt
            .take_events()
            .iter()
            .any(|e| matches!(e, GanttEvent::Click { task_id } if task_id == "a")));
    }
}
