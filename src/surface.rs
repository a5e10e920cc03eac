use crate::geometry::Geometry;

/// Text roles a surface may size differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    BarLabel,
    SwimlaneTitle,
    SwimlaneSubtitle,
}

/// The engine's view of the render surface: it only ever needs to know how
/// big a piece of text came out. The egui widget answers from its font
/// galleys; tests use [`FixedMetrics`].
pub trait RenderSurface {
    fn measure_text(&self, text: &str, style: TextStyle) -> Geometry;
}

/// Deterministic character-grid metrics for headless tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

impl RenderSurface for FixedMetrics {
    fn measure_text(&self, text: &str, _style: TextStyle) -> Geometry {
        Geometry::new(
            0.0,
            0.0,
            text.chars().count() as f32 * self.char_width,
            self.line_height,
        )
    }
}

/// What the popup collaborator receives. The target geometry is a required
/// constructor argument — there is no way to request a popup without one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupRequest {
    pub target: Geometry,
    pub title: String,
    pub subtitle: String,
    pub task_id: String,
    /// Pre-rendered body from the `custom_popup_html` hook, when set.
    pub custom_html: Option<String>,
}

impl PopupRequest {
    pub fn new(
        target: Geometry,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        Self {
            target,
            title: title.into(),
            subtitle: subtitle.into(),
            task_id: task_id.into(),
            custom_html: None,
        }
    }
}

/// Popup commands the chart queues for its collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupAction {
    Show(PopupRequest),
    Hide,
}

/// The popup collaborator contract; opaque to the engine beyond this.
pub trait PopupHost {
    fn show(&mut self, request: PopupRequest);
    fn hide(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_metrics_scale_with_length() {
        let metrics = FixedMetrics::default();
        let size = metrics.measure_text("abcd", TextStyle::BarLabel);
        assert_eq!(size.width, 28.0);
        assert_eq!(size.height, 14.0);
    }
}
