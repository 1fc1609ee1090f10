use chrono::NaiveDateTime;
use egui::{Pos2, Rect, Vec2};

use crate::model::Timeline;

/// Renderable scaffold around the bars: tick lines, row separators and
/// the highlighted "today" column. Pure data for the host renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub width: f32,
    pub height: f32,
    /// X positions of the vertical tick lines, one per axis tick.
    pub tick_xs: Vec<f32>,
    /// Y positions of the horizontal row separators (bottom of each row).
    pub row_ys: Vec<f32>,
    /// The tick interval containing `now`, when inside the axis range.
    pub today: Option<Rect>,
}

/// Build the grid for the current axis and row count.
pub fn build_grid(
    timeline: &Timeline,
    column_width: f32,
    row_count: usize,
    row_height: f32,
    now: NaiveDateTime,
) -> GridGeometry {
    let width = timeline.chart_width(column_width);
    let height = row_count as f32 * row_height;

    let tick_xs = (0..timeline.ticks.len())
        .map(|i| i as f32 * column_width)
        .collect();
    let row_ys = (0..row_count)
        .map(|i| (i + 1) as f32 * row_height)
        .collect();

    let today = timeline.interval_index(now).map(|i| {
        Rect::from_min_size(
            Pos2::new(i as f32 * column_width, 0.0),
            Vec2::new(column_width, height),
        )
    });

    GridGeometry {
        width,
        height,
        tick_xs,
        row_ys,
        today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, ViewMode};
    use chrono::NaiveDate;

    fn dt(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn grid_covers_axis_and_rows() {
        let tasks = vec![Task::new("a", dt(2), dt(6))];
        let timeline = Timeline::generate(&tasks, ViewMode::Day, 1, false);
        let grid = build_grid(&timeline, 60.0, 3, 50.0, dt(3));
        assert_eq!(grid.tick_xs.len(), timeline.ticks.len());
        assert_eq!(grid.row_ys.len(), 3);
        assert!((grid.height - 150.0).abs() < f32::EPSILON);

        // Jan 3 sits in the third interval (ticks start Jan 1).
        let today = grid.today.expect("now is inside the axis");
        assert!((today.min.x - 120.0).abs() < f32::EPSILON);
        assert!((today.width() - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn today_band_is_absent_outside_the_axis() {
        let tasks = vec![Task::new("a", dt(2), dt(6))];
        let timeline = Timeline::generate(&tasks, ViewMode::Day, 1, false);
        let grid = build_grid(&timeline, 60.0, 1, 50.0, dt(25));
        assert!(grid.today.is_none());
    }
}
