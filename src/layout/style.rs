use egui::Color32;

use crate::model::ViewMode;

/// Approximate font metrics used for pure-function text sizing
/// decisions (no rendering surface required).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub font_size: f32,
    /// Average horizontal advance of one character.
    pub char_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            char_width: 7.0,
        }
    }
}

/// View, styling and behavior configuration for the chart.
///
/// Defaults mirror a conventional day-scale chart: 60px columns, 50px
/// rows, bars filling 60% of the row, 5-minute drag snapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub view_mode: ViewMode,
    pub column_width: f32,
    pub row_height: f32,
    /// How much of the row height the bar takes, 0–100.
    pub bar_fill: f32,
    pub bar_corner_radius: f32,
    pub handle_width: f32,
    /// Lookback padding in whole view units before the earliest task.
    pub pre_steps_count: u32,
    /// Drag snapping step in milliseconds.
    pub time_step_ms: i64,
    /// Locale tag carried through for the host's date formatting.
    pub locale: String,
    pub rtl: bool,
    pub multiselect: bool,
    /// When true the host handles expander clicks, and descendants of
    /// collapsed projects are removed before row assignment. When false
    /// they are kept and tagged hidden so row indices stay aligned with
    /// the host's own list rendering.
    pub expanders_enabled: bool,
    pub font: FontMetrics,

    pub arrow_color: Color32,
    pub arrow_indent: f32,
    pub today_color: Color32,

    pub bar_progress_color: Color32,
    pub bar_progress_selected_color: Color32,
    pub bar_background_color: Color32,
    pub bar_background_selected_color: Color32,
    pub project_progress_color: Color32,
    pub project_progress_selected_color: Color32,
    pub project_background_color: Color32,
    pub project_background_selected_color: Color32,
    pub milestone_background_color: Color32,
    pub milestone_background_selected_color: Color32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Day,
            column_width: 60.0,
            row_height: 50.0,
            bar_fill: 60.0,
            bar_corner_radius: 3.0,
            handle_width: 8.0,
            pre_steps_count: 1,
            time_step_ms: 300_000,
            locale: "en-GB".to_string(),
            rtl: false,
            multiselect: false,
            expanders_enabled: true,
            font: FontMetrics::default(),

            arrow_color: Color32::from_rgb(128, 128, 128),
            arrow_indent: 20.0,
            today_color: Color32::from_rgba_unmultiplied(252, 248, 227, 128),

            bar_progress_color: Color32::from_rgb(0xa3, 0xa3, 0xff),
            bar_progress_selected_color: Color32::from_rgb(0x82, 0x82, 0xf5),
            bar_background_color: Color32::from_rgb(0xb8, 0xc2, 0xcc),
            bar_background_selected_color: Color32::from_rgb(0xae, 0xb8, 0xc2),
            project_progress_color: Color32::from_rgb(0x7d, 0xb5, 0x9a),
            project_progress_selected_color: Color32::from_rgb(0x59, 0xa9, 0x85),
            project_background_color: Color32::from_rgb(0xfa, 0xc4, 0x65),
            project_background_selected_color: Color32::from_rgb(0xf7, 0xbb, 0x53),
            milestone_background_color: Color32::from_rgb(0xf1, 0xc4, 0x53),
            milestone_background_selected_color: Color32::from_rgb(0xf2, 0x9e, 0x4c),
        }
    }
}

impl ChartOptions {
    /// Bar height derived from row height and fill percent.
    pub fn bar_height(&self) -> f32 {
        self.row_height * self.bar_fill / 100.0
    }
}
