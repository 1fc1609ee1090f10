use chrono::NaiveDateTime;
use egui::{Color32, Pos2, Rect, Vec2};

use crate::layout::order::{arrange, ArrangedTask};
use crate::layout::style::{ChartOptions, FontMetrics};
use crate::model::{Task, TaskKind, Timeline};

/// Visual variant of a bar, derived from the task kind and geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarVariant {
    Task,
    Milestone,
    Project,
    /// Bar too narrow for its label and handles; the progress handle is
    /// relocated outside the bar.
    SmallTask,
    /// Row kept for index stability but not rendered.
    Hidden,
}

impl BarVariant {
    /// Whether the bar participates in rendering and gestures.
    pub fn is_visible(&self) -> bool {
        !matches!(self, BarVariant::Hidden)
    }
}

/// Resolved color set for a bar. Selection substitutes the `*_selected`
/// values while the row is part of the selection set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarColors {
    pub background: Color32,
    pub background_selected: Color32,
    pub progress: Color32,
    pub progress_selected: Color32,
}

/// One outgoing dependency edge: an arrow from this bar to the bar at
/// `to_index` in the same display list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependencyEdge {
    pub to_index: usize,
    pub color: Option<Color32>,
}

/// Pixel-space geometry for one task row.
///
/// Owned by the render pass that produced it; the gesture machine is
/// the only writer, and only via a new provisional copy for the one
/// task being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub task_id: String,
    /// Position in the display list; also the row used for vertical
    /// placement, arrows and range selection.
    pub index: usize,
    pub variant: BarVariant,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Committed progress, clamped to 0–100.
    pub progress: f32,
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub height: f32,
    pub progress_x: f32,
    pub progress_width: f32,
    pub corner_radius: f32,
    pub handle_width: f32,
    pub is_disabled: bool,
    pub is_locked: bool,
    pub base_color: Option<Color32>,
    pub colors: BarColors,
    pub children: Vec<DependencyEdge>,
}

impl BarGeometry {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x1, self.y),
            Vec2::new(self.width(), self.height),
        )
    }

    /// Anchor point of the progress handle. For small bars it sits at
    /// the fill edge regardless of text direction.
    pub fn progress_point(&self, rtl: bool) -> Pos2 {
        let x = match self.variant {
            BarVariant::SmallTask => self.x1 + self.progress_width,
            _ if rtl => self.progress_x,
            _ => self.progress_x + self.progress_width,
        };
        Pos2::new(x, self.y + self.height)
    }
}

/// Progress fill extent for a bar span. The width is clamped to the
/// bar and the fill grows from the right edge under RTL.
pub fn progress_by_params(x1: f32, x2: f32, progress: f32, rtl: bool) -> (f32, f32) {
    let width = (x2 - x1) * (progress.clamp(0.0, 100.0) / 100.0);
    let progress_x = if rtl { x2 - width } else { x1 };
    (width, progress_x)
}

/// Variant selection for plain tasks: a pure function of the bar's
/// pixel width, its label length and the font metrics, so it can be
/// unit-tested without a rendering surface.
pub fn task_variant(
    bar_width: f32,
    label_len: usize,
    font: &FontMetrics,
    handle_width: f32,
) -> BarVariant {
    let legible = (label_len as f32 * font.char_width).max(handle_width * 2.0);
    if bar_width < legible {
        BarVariant::SmallTask
    } else {
        BarVariant::Task
    }
}

/// Convert the task list into display-ordered bar geometries.
///
/// Filtering, ordering, coordinate mapping and dependency-edge
/// resolution happen here; the result is a pure function of the inputs
/// and is recomputed wholesale on any change.
pub fn convert_to_bars(
    tasks: &[Task],
    timeline: &Timeline,
    options: &ChartOptions,
) -> Vec<BarGeometry> {
    let arranged = arrange(tasks, options.expanders_enabled);

    let mut bars: Vec<BarGeometry> = arranged
        .iter()
        .enumerate()
        .map(|(index, at)| convert_one(at, index, timeline, options))
        .collect();

    // Resolve dependency references into edges on the predecessor bar.
    for (index, at) in arranged.iter().enumerate() {
        for dep in &at.task.dependencies {
            match bars.iter().position(|b| b.task_id == dep.id) {
                Some(from_index) => bars[from_index].children.push(DependencyEdge {
                    to_index: index,
                    color: dep.color,
                }),
                None => log::warn!(
                    "task {:?} references unknown dependency {:?}; edge dropped",
                    at.task.id,
                    dep.id
                ),
            }
        }
    }

    bars
}

fn convert_one(
    at: &ArrangedTask<'_>,
    index: usize,
    timeline: &Timeline,
    options: &ChartOptions,
) -> BarGeometry {
    let task = at.task;
    let bar_height = options.bar_height();
    let y = index as f32 * options.row_height + (options.row_height - bar_height) / 2.0;
    let progress = task.progress_clamped();

    let (x1, x2) = match task.kind {
        TaskKind::Milestone => {
            let x = timeline.x_for_date(task.start, options.column_width);
            (x - bar_height * 0.5, x + bar_height * 0.5)
        }
        _ if options.rtl => (
            timeline.x_for_date(task.end, options.column_width),
            timeline.x_for_date(task.start, options.column_width),
        ),
        _ => (
            timeline.x_for_date(task.start, options.column_width),
            timeline.x_for_date(task.end, options.column_width),
        ),
    };

    let variant = if at.hidden {
        BarVariant::Hidden
    } else {
        match task.kind {
            TaskKind::Milestone => BarVariant::Milestone,
            TaskKind::Project => BarVariant::Project,
            TaskKind::Task => task_variant(
                x2 - x1,
                task.name.chars().count(),
                &options.font,
                options.handle_width,
            ),
        }
    };

    let (progress_width, progress_x) = match task.kind {
        TaskKind::Milestone => (0.0, x1),
        _ => progress_by_params(x1, x2, progress, options.rtl),
    };

    BarGeometry {
        task_id: task.id.clone(),
        index,
        variant,
        start: task.start,
        end: task.end,
        progress,
        x1,
        x2,
        y,
        height: bar_height,
        progress_x,
        progress_width,
        corner_radius: options.bar_corner_radius,
        handle_width: options.handle_width,
        is_disabled: task.is_disabled,
        is_locked: task.is_locked,
        base_color: task.base_color,
        colors: resolve_colors(task, options),
        children: Vec::new(),
    }
}

/// Per-task style override beats the per-kind default.
fn resolve_colors(task: &Task, options: &ChartOptions) -> BarColors {
    let defaults = match task.kind {
        TaskKind::Project => BarColors {
            background: options.project_background_color,
            background_selected: options.project_background_selected_color,
            progress: options.project_progress_color,
            progress_selected: options.project_progress_selected_color,
        },
        TaskKind::Milestone => BarColors {
            background: options.milestone_background_color,
            background_selected: options.milestone_background_selected_color,
            progress: options.milestone_background_color,
            progress_selected: options.milestone_background_selected_color,
        },
        TaskKind::Task => BarColors {
            background: options.bar_background_color,
            background_selected: options.bar_background_selected_color,
            progress: options.bar_progress_color,
            progress_selected: options.bar_progress_selected_color,
        },
    };
    BarColors {
        background: task.styles.background_color.unwrap_or(defaults.background),
        background_selected: task
            .styles
            .background_selected_color
            .unwrap_or(defaults.background_selected),
        progress: task.styles.progress_color.unwrap_or(defaults.progress),
        progress_selected: task
            .styles
            .progress_selected_color
            .unwrap_or(defaults.progress_selected),
    }
}
