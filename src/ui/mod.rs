pub mod chart_view;
pub mod theme;
pub mod toolbar;

pub use chart_view::show_gantt;
pub use toolbar::{show_toolbar, ToolbarAction};
