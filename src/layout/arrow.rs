use egui::Pos2;

use crate::layout::bar::BarGeometry;

/// Arrowhead half-extent in pixels.
const HEAD_SIZE: f32 = 5.0;

/// An orthogonal dependency connector: an absolute polyline from the
/// source bar's exit edge to the target bar's entry edge, plus the
/// arrowhead triangle at the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowPath {
    pub points: Vec<Pos2>,
    pub head: [Pos2; 3],
}

impl ArrowPath {
    /// Render the polyline as an SVG path string (`M` plus axis-aligned
    /// `H`/`V` segments).
    pub fn svg_path(&self) -> String {
        let mut path = String::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.push_str(&format!("M {} {}", first.x, first.y));
            let mut prev = *first;
            for p in iter {
                if (p.y - prev.y).abs() < f32::EPSILON {
                    path.push_str(&format!(" H {}", p.x));
                } else {
                    path.push_str(&format!(" V {}", p.y));
                }
                prev = *p;
            }
        }
        path
    }

    /// The triangle as an SVG points attribute.
    pub fn head_points(&self) -> String {
        self.head
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Route a connector from `from` to `to` in left-to-right layout.
///
/// The path exits the right edge of `from`, jogs half a row toward the
/// target row, runs horizontally, then drops to the target's vertical
/// center and approaches its left edge. When the direct run would pass
/// behind bars between the two rows, the horizontal run is pushed left
/// of the minimum `x1` among those rows first.
pub fn route_arrow(
    bars: &[BarGeometry],
    from: &BarGeometry,
    to: &BarGeometry,
    row_height: f32,
    arrow_indent: f32,
) -> ArrowPath {
    let from_y = from.mid_y();
    let to_y = to.mid_y();
    let index_sign = if from.index > to.index { -1.0 } else { 1.0 };
    let from_end = from.x2 + arrow_indent * 2.0;
    let blocked = from_end >= to.x1;

    let mut points = vec![
        Pos2::new(from.x2, from_y),
        Pos2::new(from.x2 + arrow_indent, from_y),
        Pos2::new(from.x2 + arrow_indent, from_y + index_sign * row_height / 2.0),
    ];
    if blocked {
        let min_x = min_x1_between(bars, from.index, to.index).unwrap_or(to.x1);
        points.push(Pos2::new(min_x - arrow_indent, points[2].y));
    }
    let run_x = points.last().expect("path has segments").x;
    points.push(Pos2::new(run_x, to_y));
    points.push(Pos2::new(to.x1, to_y));

    let head = [
        Pos2::new(to.x1, to_y),
        Pos2::new(to.x1 - HEAD_SIZE, to_y - HEAD_SIZE),
        Pos2::new(to.x1 - HEAD_SIZE, to_y + HEAD_SIZE),
    ];
    ArrowPath { points, head }
}

/// Right-to-left variant: all horizontal signs mirror and the exit and
/// entry edges swap (`x1` exits, `x2` receives).
pub fn route_arrow_rtl(
    from: &BarGeometry,
    to: &BarGeometry,
    row_height: f32,
    arrow_indent: f32,
) -> ArrowPath {
    let from_y = from.mid_y();
    let to_y = to.mid_y();
    let index_sign = if from.index > to.index { -1.0 } else { 1.0 };
    let from_end = from.x1 - arrow_indent * 2.0;
    let blocked = from_end <= to.x2;

    let mut points = vec![
        Pos2::new(from.x1, from_y),
        Pos2::new(from.x1 - arrow_indent, from_y),
        Pos2::new(from.x1 - arrow_indent, from_y + index_sign * row_height / 2.0),
    ];
    if blocked {
        points.push(Pos2::new(to.x2 + arrow_indent, points[2].y));
    }
    let run_x = points.last().expect("path has segments").x;
    points.push(Pos2::new(run_x, to_y));
    points.push(Pos2::new(to.x2, to_y));

    let head = [
        Pos2::new(to.x2, to_y),
        Pos2::new(to.x2 + HEAD_SIZE, to_y + HEAD_SIZE),
        Pos2::new(to.x2 + HEAD_SIZE, to_y - HEAD_SIZE),
    ];
    ArrowPath { points, head }
}

/// Minimum left edge among the rows strictly between the endpoints plus
/// the target row, in either direction. `None` when the rows are the
/// same.
fn min_x1_between(bars: &[BarGeometry], from_index: usize, to_index: usize) -> Option<f32> {
    let (lo, hi) = if from_index < to_index {
        (from_index + 1, to_index)
    } else if to_index < from_index {
        (to_index, from_index - 1)
    } else {
        return None;
    };
    bars.iter()
        .filter(|b| b.index >= lo && b.index <= hi)
        .map(|b| b.x1)
        .reduce(f32::min)
}
