use crate::config::GanttConfig;
use crate::geometry::Bar;

/// Which connector circle of the dependency bar anchors the arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    /// The circle before the bar's left edge.
    Leading,
    /// The circle after the bar's right edge.
    Trailing,
}

/// One step of an arrow path, mirroring the SVG path grammar the chart
/// draws with. Upper-case variants are absolute, `*By` are relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    MoveBy(f32, f32),
    LineTo(f32, f32),
    LineBy(f32, f32),
    HorizontalTo(f32),
    HorizontalBy(f32),
    VerticalTo(f32),
    VerticalBy(f32),
    ArcBy {
        radius: f32,
        clockwise: bool,
        dx: f32,
        dy: f32,
    },
}

/// A dependency arrow between two bars. The endpoint is chosen once when
/// the edge first routes and then held stable: bar movement recomputes the
/// path but never reselects the connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub endpoint: EndpointSide,
    pub path: Vec<PathSegment>,
}

impl Arrow {
    /// Create the arrow for edge `from -> to`, choosing its endpoint.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        from_bar: &Bar,
        to_bar: &Bar,
        from_row: usize,
        to_row: usize,
        config: &GanttConfig,
    ) -> Self {
        let endpoint = choose_endpoint(from_bar, to_bar);
        let path = route(endpoint, from_bar, to_bar, from_row, to_row, config);
        Self {
            from: from.into(),
            to: to.into(),
            endpoint,
            path,
        }
    }

    /// Recompute the path after either bar moved; the endpoint sticks.
    pub fn reroute(
        &mut self,
        from_bar: &Bar,
        to_bar: &Bar,
        from_row: usize,
        to_row: usize,
        config: &GanttConfig,
    ) {
        self.path = route(self.endpoint, from_bar, to_bar, from_row, to_row, config);
    }

    /// SVG `d` attribute equivalent of the path.
    pub fn to_svg_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() {
                out.push(' ');
            }
            match *segment {
                PathSegment::MoveTo(x, y) => out.push_str(&format!("M {x} {y}")),
                PathSegment::MoveBy(dx, dy) => out.push_str(&format!("m {dx} {dy}")),
                PathSegment::LineTo(x, y) => out.push_str(&format!("L {x} {y}")),
                PathSegment::LineBy(dx, dy) => out.push_str(&format!("l {dx} {dy}")),
                PathSegment::HorizontalTo(x) => out.push_str(&format!("H {x}")),
                PathSegment::HorizontalBy(dx) => out.push_str(&format!("h {dx}")),
                PathSegment::VerticalTo(y) => out.push_str(&format!("V {y}")),
                PathSegment::VerticalBy(dy) => out.push_str(&format!("v {dy}")),
                PathSegment::ArcBy {
                    radius,
                    clockwise,
                    dx,
                    dy,
                } => out.push_str(&format!(
                    "a {radius} {radius} 0 0 {} {dx} {dy}",
                    clockwise as u8
                )),
            }
        }
        out
    }

    /// Flatten to polylines for a painter that strokes point lists. Arcs
    /// become short quadratic Bézier fans; each `m`/`M` after the first
    /// starts a new polyline (the chevron head is one).
    pub fn flatten(&self) -> Vec<Vec<(f32, f32)>> {
        let mut polylines: Vec<Vec<(f32, f32)>> = Vec::new();
        let mut current: Vec<(f32, f32)> = Vec::new();
        let mut cursor = (0.0f32, 0.0f32);
        // direction of the previous advance, used to orient arc corners
        let mut heading = (0.0f32, 0.0f32);

        let start_new = |polylines: &mut Vec<Vec<(f32, f32)>>,
                             current: &mut Vec<(f32, f32)>,
                             at: (f32, f32)| {
            if current.len() > 1 {
                polylines.push(std::mem::take(current));
            } else {
                current.clear();
            }
            current.push(at);
        };

        for segment in &self.path {
            match *segment {
                PathSegment::MoveTo(x, y) => {
                    cursor = (x, y);
                    start_new(&mut polylines, &mut current, cursor);
                    heading = (0.0, 0.0);
                }
                PathSegment::MoveBy(dx, dy) => {
                    cursor = (cursor.0 + dx, cursor.1 + dy);
                    start_new(&mut polylines, &mut current, cursor);
                    heading = (0.0, 0.0);
                }
                PathSegment::LineTo(x, y) => {
                    heading = (x - cursor.0, y - cursor.1);
                    cursor = (x, y);
                    current.push(cursor);
                }
                PathSegment::LineBy(dx, dy) => {
                    heading = (dx, dy);
                    cursor = (cursor.0 + dx, cursor.1 + dy);
                    current.push(cursor);
                }
                PathSegment::HorizontalTo(x) => {
                    heading = (x - cursor.0, 0.0);
                    cursor = (x, cursor.1);
                    current.push(cursor);
                }
                PathSegment::HorizontalBy(dx) => {
                    heading = (dx, 0.0);
                    cursor = (cursor.0 + dx, cursor.1);
                    current.push(cursor);
                }
                PathSegment::VerticalTo(y) => {
                    heading = (0.0, y - cursor.1);
                    cursor = (cursor.0, y);
                    current.push(cursor);
                }
                PathSegment::VerticalBy(dy) => {
                    heading = (0.0, dy);
                    cursor = (cursor.0, cursor.1 + dy);
                    current.push(cursor);
                }
                PathSegment::ArcBy { dx, dy, .. } => {
                    let target = (cursor.0 + dx, cursor.1 + dy);
                    // the corner continues the incoming direction first
                    let control = if heading.0.abs() >= heading.1.abs() {
                        (cursor.0 + dx, cursor.1)
                    } else {
                        (cursor.0, cursor.1 + dy)
                    };
                    const STEPS: usize = 6;
                    for i in 1..=STEPS {
                        let t = i as f32 / STEPS as f32;
                        let mt = 1.0 - t;
                        let x = mt * mt * cursor.0 + 2.0 * mt * t * control.0 + t * t * target.0;
                        let y = mt * mt * cursor.1 + 2.0 * mt * t * control.1 + t * t * target.1;
                        current.push((x, y));
                    }
                    heading = (target.0 - control.0, target.1 - control.1);
                    cursor = target;
                }
            }
        }
        if current.len() > 1 {
            polylines.push(current);
        }
        polylines
    }
}

/// Trailing when the dependency starts at or before its dependent, else
/// leading. Called exactly once per edge.
pub fn choose_endpoint(from_bar: &Bar, to_bar: &Bar) -> EndpointSide {
    if from_bar.x <= to_bar.x {
        EndpointSide::Trailing
    } else {
        EndpointSide::Leading
    }
}

/// Build the path for an edge given the current bar geometry.
pub fn route(
    endpoint: EndpointSide,
    from_bar: &Bar,
    to_bar: &Bar,
    from_row: usize,
    to_row: usize,
    config: &GanttConfig,
) -> Vec<PathSegment> {
    let (start_x, start_y) = match endpoint {
        EndpointSide::Trailing => from_bar.endpoint_trailing(),
        EndpointSide::Leading => from_bar.endpoint_leading(),
    };
    let end_x = to_bar.x - config.padding / 2.0;
    let end_y = to_bar.center_y();

    let from_below_to = from_row >= to_row;
    let curve = config.arrow_curve;
    let clockwise = from_below_to;
    let curve_y = if from_below_to { -curve } else { curve };

    let down_1 = config.padding - curve;
    let down_2 = to_bar.center_y() - curve_y;
    let left = to_bar.x - config.padding;

    let mut path = vec![PathSegment::MoveTo(start_x, start_y)];
    match endpoint {
        EndpointSide::Leading => {
            // hook backward off the leading connector, then drop to the
            // dependent's row
            if to_bar.x > from_bar.x {
                path.push(PathSegment::HorizontalBy(-curve * 2.0));
            } else {
                path.push(PathSegment::HorizontalTo(left));
            }
            path.push(PathSegment::ArcBy {
                radius: curve,
                clockwise,
                dx: -curve,
                dy: curve_y,
            });
            path.push(PathSegment::VerticalTo(down_2));
            path.push(PathSegment::ArcBy {
                radius: curve,
                clockwise,
                dx: curve,
                dy: curve_y,
            });
            path.push(PathSegment::LineTo(end_x, end_y));
        }
        EndpointSide::Trailing => {
            if to_bar.x <= from_bar.end_x() {
                // the dependent starts behind the dependency: route down
                // and around
                path.push(PathSegment::VerticalBy(down_1));
                path.push(PathSegment::ArcBy {
                    radius: curve,
                    clockwise: true,
                    dx: -curve,
                    dy: curve,
                });
                path.push(PathSegment::HorizontalTo(left));
                path.push(PathSegment::ArcBy {
                    radius: curve,
                    clockwise,
                    dx: -curve,
                    dy: curve_y,
                });
                path.push(PathSegment::VerticalTo(down_2));
                path.push(PathSegment::ArcBy {
                    radius: curve,
                    clockwise,
                    dx: curve,
                    dy: curve_y,
                });
                path.push(PathSegment::LineTo(end_x, end_y));
            } else if (to_bar.y - from_bar.y).abs() > f32::EPSILON {
                path.push(PathSegment::VerticalTo(down_2));
                path.push(PathSegment::ArcBy {
                    radius: curve,
                    clockwise,
                    dx: curve,
                    dy: curve_y,
                });
                path.push(PathSegment::LineTo(end_x, end_y));
            } else {
                path.push(PathSegment::LineTo(end_x, end_y));
            }
        }
    }

    // fixed 5px chevron arrowhead
    path.push(PathSegment::MoveBy(-5.0, -5.0));
    path.push(PathSegment::LineBy(5.0, 5.0));
    path.push(PathSegment::LineBy(-5.0, 5.0));
    path
}
