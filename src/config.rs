use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::task::Task;
use crate::scale::ViewMode;
use crate::time::Language;

/// How the detail popup is summoned for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupTrigger {
    #[default]
    Click,
    Hover,
}

/// Column scale for one view mode: hours per column and column pixel width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub step_hours: f64,
    pub column_width: f32,
}

impl ColumnSpec {
    pub const fn new(step_hours: f64, column_width: f32) -> Self {
        Self {
            step_hours,
            column_width,
        }
    }
}

/// Hook rendering custom popup body text for a task.
pub type PopupHtmlFn = fn(&Task) -> String;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositiveDimension(&'static str),
    #[error("no column spec for the active view mode {0:?}")]
    MissingViewMode(ViewMode),
    #[error("view mode {0:?} has a non-positive step or column width")]
    BadColumnSpec(ViewMode),
}

/// Chart options. Every recognized knob is an explicit field with a default
/// matching the stock chart; [`GanttConfig::validate`] rejects nonsense
/// before any geometry is derived from it.
#[derive(Debug, Clone)]
pub struct GanttConfig {
    pub header_height: f32,
    pub bar_height: f32,
    pub bar_corner_radius: f32,
    pub arrow_curve: f32,
    pub padding: f32,
    pub popup_trigger: PopupTrigger,
    pub custom_popup_html: Option<PopupHtmlFn>,
    pub language: Language,
    pub date_format: String,
    /// Per-mode column table; hosts may override entries or add zoomier ones.
    pub view_modes: BTreeMap<ViewMode, ColumnSpec>,
    pub view_mode: ViewMode,
}

impl Default for GanttConfig {
    fn default() -> Self {
        let view_modes = BTreeMap::from([
            (ViewMode::QuarterDay, ColumnSpec::new(6.0, 38.0)),
            (ViewMode::HalfDay, ColumnSpec::new(12.0, 38.0)),
            (ViewMode::Day, ColumnSpec::new(24.0, 38.0)),
            (ViewMode::Week, ColumnSpec::new(24.0 * 7.0, 140.0)),
            (ViewMode::Month, ColumnSpec::new(24.0 * 30.0, 120.0)),
            (ViewMode::Year, ColumnSpec::new(24.0 * 365.0, 120.0)),
        ]);
        Self {
            header_height: 50.0,
            bar_height: 20.0,
            bar_corner_radius: 3.0,
            arrow_curve: 5.0,
            padding: 18.0,
            popup_trigger: PopupTrigger::Click,
            custom_popup_html: None,
            language: Language::En,
            date_format: "YYYY-MM-DD".to_string(),
            view_modes,
            view_mode: ViewMode::Day,
        }
    }
}

impl GanttConfig {
    /// Row pitch: one bar plus its padding.
    pub fn row_height(&self) -> f32 {
        self.bar_height + self.padding
    }

    pub fn column_spec(&self, mode: ViewMode) -> Option<ColumnSpec> {
        self.view_modes.get(&mode).copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("header_height", self.header_height),
            ("bar_height", self.bar_height),
            ("padding", self.padding),
            ("arrow_curve", self.arrow_curve),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositiveDimension(name));
            }
        }
        if self.bar_corner_radius < 0.0 {
            return Err(ConfigError::NonPositiveDimension("bar_corner_radius"));
        }
        for (mode, spec) in &self.view_modes {
            if spec.step_hours <= 0.0 || spec.column_width <= 0.0 {
                return Err(ConfigError::BadColumnSpec(*mode));
            }
        }
        if !self.view_modes.contains_key(&self.view_mode) {
            return Err(ConfigError::MissingViewMode(self.view_mode));
        }
        Ok(())
    }
}
