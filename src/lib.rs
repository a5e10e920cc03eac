//! An interactive Gantt timeline engine with an egui widget.
//!
//! The core ([`Gantt`]) is renderer-agnostic: it normalizes task records,
//! groups them into swimlane rows, derives bar and arrow geometry for the
//! active timescale, and runs the pointer-gesture state machine that turns
//! drags, resizes and connector clicks into validated date, progress and
//! dependency mutations. The [`ui`] module renders that state with egui
//! and feeds pointer input back in.

pub mod arrow;
pub mod chart;
pub mod config;
pub mod events;
pub mod geometry;
pub mod interaction;
pub mod io;
pub mod model;
pub mod scale;
pub mod surface;
pub mod time;
pub mod ui;

pub use arrow::{Arrow, EndpointSide, PathSegment};
pub use chart::Gantt;
pub use config::{ColumnSpec, GanttConfig, PopupTrigger};
pub use events::GanttEvent;
pub use geometry::{Bar, Geometry, GeometryCtx, LabelPlacement};
pub use interaction::HitTarget;
pub use model::{DependencyList, RawTask, Task, TaskNormalizer};
pub use scale::{ViewMode, ViewScale};
pub use surface::{FixedMetrics, PopupAction, PopupHost, PopupRequest, RenderSurface};
pub use time::{Language, TimeUnit};
