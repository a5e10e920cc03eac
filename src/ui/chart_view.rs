use std::time::Instant;

use egui::{Color32, CursorIcon, Id, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use crate::chart::Gantt;
use crate::config::PopupTrigger;
use crate::geometry::{Bar, GeometryCtx, LabelPlacement, ENDPOINT_RADIUS};
use crate::interaction::HitTarget;
use crate::scale::ViewMode;
use crate::surface::{PopupAction, PopupRequest, RenderSurface, TextStyle};
use crate::ui::theme;

const POPUP_ID: &str = "gantt-popup";
const SCROLLED_ID: &str = "gantt-initial-scroll";

/// Render the Gantt chart and feed pointer input back into the engine.
///
/// The swimlane header panel sits to the left of a two-way scroll area
/// holding the grid, bars and arrows. All geometry comes from the engine;
/// this layer only paints it and translates egui responses into the
/// engine's pointer protocol.
pub fn show_gantt(gantt: &mut Gantt, ui: &mut Ui) {
    ui.horizontal_top(|ui| {
        draw_swimlane_panel(gantt, ui);
        draw_chart_area(gantt, ui);
    });

    // popup plumbing: the engine queues show/hide, we keep the last request
    let popup_id = Id::new(POPUP_ID);
    match gantt.take_popup_action() {
        Some(PopupAction::Show(request)) => {
            ui.ctx().data_mut(|d| d.insert_temp(popup_id, request));
        }
        Some(PopupAction::Hide) => {
            ui.ctx().data_mut(|d| d.remove_temp::<PopupRequest>(popup_id));
        }
        None => {}
    }
}

fn draw_chart_area(gantt: &mut Gantt, ui: &mut Ui) {
    let table_width = gantt.table_width();
    let table_height = gantt.table_height();
    let available = ui.available_size();

    let scrolled_id = Id::new(SCROLLED_ID);
    let already_scrolled = ui
        .ctx()
        .data(|d| d.get_temp::<bool>(scrolled_id))
        .unwrap_or(false);
    let mut scroll_area = egui::ScrollArea::both().auto_shrink([false, false]);
    if !already_scrolled {
        scroll_area = scroll_area.horizontal_scroll_offset(gantt.initial_scroll_x());
        ui.ctx().data_mut(|d| d.insert_temp(scrolled_id, true));
    }

    scroll_area.show(ui, |ui| {
        let (response, painter) = ui.allocate_painter(
            Vec2::new(table_width.max(available.x), table_height.max(available.y)),
            Sense::click_and_drag(),
        );
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

        draw_grid(gantt, &painter, origin, table_width, table_height);
        draw_header(gantt, &painter, origin, table_width);
        draw_arrows(gantt, &painter, origin);

        let hovered = response
            .hover_pos()
            .map(|pos| gantt.hit_test(pos.x - origin.x, pos.y - origin.y));
        draw_bars(gantt, &painter, origin, hovered);

        route_input(gantt, ui, &response, origin, hovered);
        draw_popup(gantt, ui, origin);
    });
}

fn draw_grid(gantt: &Gantt, painter: &egui::Painter, origin: Pos2, width: f32, height: f32) {
    let config = gantt.config();
    let row_height = config.row_height();
    let ctx = gantt.geometry();
    let row_count = gantt.row_plan().row_count.max(1);

    // alternating row bands with a hairline under each
    for row in 0..row_count {
        let y = origin.y + ctx.row_y(row);
        if row % 2 == 0 {
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(origin.x, y),
                    Vec2::new(width, row_height),
                ),
                0.0,
                theme::BG_PANEL,
            );
        }
        painter.line_segment(
            [
                Pos2::new(origin.x, y + row_height),
                Pos2::new(origin.x + width, y + row_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }

    // column ticks
    let tick_top = origin.y + config.header_height + config.padding / 2.0;
    for tick in gantt.scale().ticks() {
        let x = origin.x + tick.x;
        let (stroke_width, color) = if tick.thick {
            (1.5, theme::GRID_LINE_THICK)
        } else {
            (0.5, theme::GRID_LINE)
        };
        painter.line_segment(
            [Pos2::new(x, tick_top), Pos2::new(x, origin.y + height)],
            Stroke::new(stroke_width, color),
        );
    }

    // today's column, Day view only
    if gantt.scale().mode == ViewMode::Day {
        let today = chrono::Local::now().naive_local();
        let x = origin.x + gantt.scale().today_x(today);
        painter.rect_filled(
            Rect::from_min_size(
                Pos2::new(x, origin.y),
                Vec2::new(gantt.scale().column_width, height),
            ),
            0.0,
            theme::TODAY_FILL,
        );
    }
}

fn draw_header(gantt: &Gantt, painter: &egui::Painter, origin: Pos2, width: f32) {
    let config = gantt.config();
    painter.rect_filled(
        Rect::from_min_size(
            origin,
            Vec2::new(width, config.header_height + 10.0),
        ),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + config.header_height + 10.0),
            Pos2::new(origin.x + width, origin.y + config.header_height + 10.0),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for label in gantt.scale().header_labels(config.language, config.header_height) {
        if !label.lower_text.is_empty() {
            painter.text(
                Pos2::new(origin.x + label.lower_x, origin.y + label.lower_y),
                egui::Align2::CENTER_BOTTOM,
                &label.lower_text,
                theme::font_sub(),
                theme::TEXT_SECONDARY,
            );
        }
        if let Some(upper) = &label.upper_text {
            // drop upper labels that would overflow the grid
            let galley = painter.layout_no_wrap(upper.clone(), theme::font_header(), theme::TEXT_PRIMARY);
            if label.upper_x + galley.size().x <= width {
                painter.galley(
                    Pos2::new(
                        origin.x + label.upper_x,
                        origin.y + label.upper_y - galley.size().y,
                    ),
                    galley,
                    Color32::TRANSPARENT,
                );
            }
        }
    }
}

fn draw_arrows(gantt: &Gantt, painter: &egui::Painter, origin: Pos2) {
    for arrow in gantt.arrows() {
        for polyline in arrow.flatten() {
            let points: Vec<Pos2> = polyline
                .iter()
                .map(|(x, y)| Pos2::new(origin.x + x, origin.y + y))
                .collect();
            painter.add(Shape::line(points, Stroke::new(1.4, theme::ARROW)));
        }
    }
}

fn bar_fill(gantt: &Gantt, index: usize) -> Color32 {
    let task = &gantt.tasks()[index];
    if task.invalid {
        return theme::BAR_INVALID;
    }
    task.colors
        .primary
        .as_deref()
        .and_then(theme::parse_hex_color)
        .unwrap_or(theme::BAR_DEFAULT)
}

fn progress_fill(gantt: &Gantt, index: usize) -> Color32 {
    gantt.tasks()[index]
        .colors
        .secondary
        .as_deref()
        .and_then(theme::parse_hex_color)
        .unwrap_or(theme::PROGRESS_DEFAULT)
}

fn draw_bars(gantt: &Gantt, painter: &egui::Painter, origin: Pos2, hovered: Option<HitTarget>) {
    let config = gantt.config();
    let rounding = Rounding::same(config.bar_corner_radius);
    let ctx = gantt.geometry();
    let linking = gantt.linking_from();

    for (i, bar) in gantt.bars().iter().enumerate() {
        let task = &gantt.tasks()[i];
        let rect = Rect::from_min_size(
            Pos2::new(origin.x + bar.x, origin.y + bar.y),
            Vec2::new(bar.width.max(2.0), bar.height),
        );

        painter.rect_filled(rect, rounding, bar_fill(gantt, i));

        // progress: translucent outer width plus the clamped solid fill
        if !bar.invalid && bar.progress_width > 0.0 {
            let fill = progress_fill(gantt, i);
            painter.rect_filled(
                Rect::from_min_size(rect.min, Vec2::new(bar.progress_width, bar.height)),
                rounding,
                fill.gamma_multiply(0.5),
            );
            painter.rect_filled(
                Rect::from_min_size(rect.min, Vec2::new(bar.progress_inner_width(), bar.height)),
                rounding,
                fill,
            );
        }

        let bar_hovered = matches!(
            hovered,
            Some(
                HitTarget::Bar(h)
                    | HitTarget::HandleLeft(h)
                    | HitTarget::HandleRight(h)
                    | HitTarget::HandleProgress(h)
                    | HitTarget::EndpointTrailing(h)
            ) if h == i
        );
        let active = gantt.active_task() == Some(i);
        if active {
            painter.rect_stroke(
                rect.expand(1.5),
                Rounding::same(config.bar_corner_radius + 1.5),
                Stroke::new(2.0, theme::BORDER_ACCENT),
            );
        }

        draw_label(gantt, painter, origin, bar, &ctx, &task.name, task.colors.text.as_deref());

        if task.interactive() && (bar_hovered || active) {
            draw_handles(painter, origin, bar, task.progress > 0.0, rounding);
        }
        if task.interactive() {
            draw_endpoints(gantt, painter, origin, i, bar, bar_hovered, linking);
        }
    }
}

/// Label placement is the deferred step: the galley is measured during
/// this paint pass, then the engine decides centered vs past-the-end.
fn draw_label(
    gantt: &Gantt,
    painter: &egui::Painter,
    origin: Pos2,
    bar: &Bar,
    ctx: &GeometryCtx<'_>,
    name: &str,
    text_color: Option<&str>,
) {
    let color = text_color
        .and_then(theme::parse_hex_color)
        .unwrap_or(theme::TEXT_ON_BAR);
    let galley = painter.layout_no_wrap(name.to_string(), theme::font_bar(), color);
    let y = origin.y + bar.center_y() - galley.size().y / 2.0;
    match ctx.label_position(bar, galley.size().x) {
        LabelPlacement::PastEnd { x } => {
            let galley = painter.layout_no_wrap(name.to_string(), theme::font_bar(), theme::TEXT_SECONDARY);
            painter.galley(Pos2::new(origin.x + x, y), galley, Color32::TRANSPARENT);
        }
        LabelPlacement::Centered { x } => {
            let half = galley.size().x / 2.0;
            painter.galley(
                Pos2::new(origin.x + x - half, y),
                galley,
                Color32::TRANSPARENT,
            );
        }
    }
}

fn draw_handles(
    painter: &egui::Painter,
    origin: Pos2,
    bar: &Bar,
    with_progress: bool,
    rounding: Rounding,
) {
    for handle in [bar.handle_left(), bar.handle_right()] {
        painter.rect_filled(
            Rect::from_min_size(
                Pos2::new(origin.x + handle.x, origin.y + handle.y),
                Vec2::new(handle.width, handle.height),
            ),
            rounding,
            theme::HANDLE_COLOR.gamma_multiply(0.6),
        );
    }
    if with_progress {
        let points = bar
            .progress_handle_points()
            .iter()
            .map(|(x, y)| Pos2::new(origin.x + x, origin.y + y))
            .collect();
        painter.add(Shape::convex_polygon(
            points,
            theme::HANDLE_COLOR.gamma_multiply(0.8),
            Stroke::NONE,
        ));
    }
}

fn draw_endpoints(
    gantt: &Gantt,
    painter: &egui::Painter,
    origin: Pos2,
    index: usize,
    bar: &Bar,
    bar_hovered: bool,
    linking: Option<usize>,
) {
    use crate::arrow::EndpointSide;

    let trailing_used = gantt.endpoint_used(index, EndpointSide::Trailing);
    let leading_used = gantt.endpoint_used(index, EndpointSide::Leading);
    let eligible = linking.is_some_and(|from| gantt.link_eligible(from, index));
    let is_source = linking == Some(index);

    if trailing_used || bar_hovered || eligible || is_source {
        let (x, y) = bar.endpoint_trailing();
        let color = if eligible || is_source {
            theme::ENDPOINT_ACTIVE
        } else if trailing_used {
            theme::ENDPOINT
        } else {
            theme::ENDPOINT.gamma_multiply(0.5)
        };
        painter.circle_filled(Pos2::new(origin.x + x, origin.y + y), ENDPOINT_RADIUS, color);
    }
    if leading_used || bar_hovered {
        let (x, y) = bar.endpoint_leading();
        let color = if leading_used {
            theme::ENDPOINT
        } else {
            theme::ENDPOINT.gamma_multiply(0.5)
        };
        painter.circle_filled(Pos2::new(origin.x + x, origin.y + y), ENDPOINT_RADIUS, color);
    }
}

fn route_input(
    gantt: &mut Gantt,
    ui: &Ui,
    response: &egui::Response,
    origin: Pos2,
    hovered: Option<HitTarget>,
) {
    if let Some(target) = hovered {
        let icon = match target {
            HitTarget::HandleLeft(_) | HitTarget::HandleRight(_) | HitTarget::HandleProgress(_) => {
                CursorIcon::ResizeHorizontal
            }
            HitTarget::Bar(_) => CursorIcon::Grab,
            HitTarget::EndpointTrailing(_) | HitTarget::Arrow(_) => CursorIcon::PointingHand,
            HitTarget::Background => CursorIcon::Default,
        };
        ui.ctx().set_cursor_icon(icon);

        // hover-triggered popups come from this layer
        if gantt.config().popup_trigger == PopupTrigger::Hover {
            if let HitTarget::Bar(i) = target {
                gantt.show_popup(i, Instant::now());
            }
        }
    }

    let local = |pos: Pos2| (pos.x - origin.x, pos.y - origin.y);
    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            gantt.pointer_down(x, y);
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            gantt.pointer_move(x, y);
        }
    }
    if response.drag_stopped() {
        gantt.pointer_up(Instant::now());
    }
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            gantt.pointer_down(x, y);
            gantt.pointer_up(Instant::now());
        }
    }
}

fn draw_popup(gantt: &Gantt, ui: &Ui, origin: Pos2) {
    let popup_id = Id::new(POPUP_ID);
    let Some(request) = ui.ctx().data(|d| d.get_temp::<PopupRequest>(popup_id)) else {
        return;
    };
    // keep the popup glued to the bar it describes
    let target = gantt
        .bar(&request.task_id)
        .map(|bar| bar.rect())
        .unwrap_or(request.target);
    let pos = Pos2::new(origin.x + target.end_x() + 10.0, origin.y + target.y);

    egui::Area::new(popup_id.with("area"))
        .fixed_pos(pos)
        .order(egui::Order::Foreground)
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                if let Some(html) = &request.custom_html {
                    ui.label(html);
                } else {
                    ui.strong(&request.title);
                    ui.label(&request.subtitle);
                }
            });
        });
}

/// The render-surface contract answered from egui font galleys.
struct GalleySurface<'a> {
    painter: &'a egui::Painter,
}

impl RenderSurface for GalleySurface<'_> {
    fn measure_text(&self, text: &str, style: TextStyle) -> crate::geometry::Geometry {
        let font = match style {
            TextStyle::BarLabel => theme::font_bar(),
            TextStyle::SwimlaneTitle => theme::font_header(),
            TextStyle::SwimlaneSubtitle => theme::font_sub(),
        };
        let size = self
            .painter
            .layout_no_wrap(text.to_string(), font, theme::TEXT_PRIMARY)
            .size();
        crate::geometry::Geometry::new(0.0, 0.0, size.x, size.y)
    }
}

fn draw_swimlane_panel(gantt: &Gantt, ui: &mut Ui) {
    let groups = &gantt.row_plan().groups;
    if groups.is_empty() {
        return;
    }
    let config = gantt.config();
    let row_height = config.row_height();
    let ctx = gantt.geometry();
    let table_height = gantt.table_height();

    // the panel is sized by its longest rendered titles
    let surface = GalleySurface { painter: ui.painter() };
    let panel_width = gantt.swimlane_panel_width(&surface);
    let longest_sub = gantt.swimlane_sub_band_width(&surface);

    let (response, painter) = ui.allocate_painter(
        Vec2::new(panel_width, table_height),
        Sense::hover(),
    );
    let origin = response.rect.min;

    painter.rect_filled(response.rect, 0.0, theme::SWIMLANE_BG);
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(panel_width, config.header_height + 10.0)),
        0.0,
        theme::BG_HEADER,
    );

    let sub_band_x = origin.x + panel_width - longest_sub - config.padding;
    for group in groups {
        let top = origin.y + ctx.row_y(group.from_row);
        let span = row_height * (group.to_row - group.from_row + 1) as f32;

        painter.line_segment(
            [
                Pos2::new(origin.x, top),
                Pos2::new(origin.x + panel_width, top),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
        painter.text(
            Pos2::new(origin.x + config.padding, top + span / 2.0),
            egui::Align2::LEFT_CENTER,
            &group.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );

        for sub in &group.rows {
            let Some(label) = &sub.label else { continue };
            let y = origin.y + ctx.row_y(sub.row);
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(sub_band_x, y),
                    Vec2::new(longest_sub + config.padding, row_height),
                ),
                0.0,
                theme::SWIMLANE_SUB_BG,
            );
            painter.text(
                Pos2::new(sub_band_x + config.padding / 2.0, y + 3.0 * row_height / 5.0),
                egui::Align2::LEFT_CENTER,
                label,
                theme::font_sub(),
                theme::TEXT_SECONDARY,
            );
        }
    }

    // right separator between the panel and the grid
    painter.line_segment(
        [
            Pos2::new(origin.x + panel_width, origin.y),
            Pos2::new(origin.x + panel_width, origin.y + table_height),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}
