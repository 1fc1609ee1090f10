//! Pure drag math: pointer x positions in chart-local space go in,
//! snapped candidate geometries come out. No surface state is touched
//! here; the engine owns the interaction lifecycle.

use chrono::{Duration, NaiveDateTime};

use crate::interaction::event::DragKind;
use crate::layout::bar::{progress_by_params, BarGeometry, BarVariant};

/// Progress percentage for a pointer position over a bar, clamped to
/// the bar's extent.
pub fn progress_by_x(x: f32, bar: &BarGeometry) -> f32 {
    if x >= bar.x2 {
        return 100.0;
    }
    if x <= bar.x1 {
        return 0.0;
    }
    (((x - bar.x1) * 100.0) / bar.width()).round()
}

/// RTL variant: the fill grows from the right edge.
pub fn progress_by_x_rtl(x: f32, bar: &BarGeometry) -> f32 {
    if x >= bar.x2 {
        return 0.0;
    }
    if x <= bar.x1 {
        return 100.0;
    }
    (((bar.x2 - x) * 100.0) / bar.width()).round()
}

/// Snap a pointer-derived offset from `anchor` to whole steps.
fn snap_to_step(x: f32, anchor: f32, x_step: f32) -> f32 {
    let steps = ((x - anchor) / x_step).round();
    anchor + steps * x_step
}

/// Convert a snapped pixel displacement into a date displacement. The
/// sign inverts under RTL, where larger x means earlier dates.
fn date_by_x(
    x: f32,
    anchor_x: f32,
    anchor_date: NaiveDateTime,
    x_step: f32,
    time_step_ms: i64,
    rtl: bool,
) -> NaiveDateTime {
    let mut ms = ((x - anchor_x) / x_step * time_step_ms as f32).round() as i64;
    if rtl {
        ms = -ms;
    }
    anchor_date + Duration::milliseconds(ms)
}

/// Compute the candidate geometry for a pointer position during a drag.
///
/// The result is derived from the current provisional geometry; because
/// every step is snapped to whole `x_step` multiples, repeated calls
/// converge rather than drift. Returns the unchanged input for
/// sub-step movement.
pub fn apply_drag(
    kind: DragKind,
    bar: &BarGeometry,
    pointer_x: f32,
    x_step: f32,
    time_step_ms: i64,
    rtl: bool,
) -> BarGeometry {
    let mut candidate = bar.clone();
    match kind {
        DragKind::Progress => {
            let progress = if rtl {
                progress_by_x_rtl(pointer_x, bar)
            } else {
                progress_by_x(pointer_x, bar)
            };
            candidate.progress = progress;
            let (width, x) = progress_by_params(bar.x1, bar.x2, progress, rtl);
            candidate.progress_width = width;
            candidate.progress_x = x;
        }
        DragKind::Move { grab_offset } => {
            let new_x1 = snap_to_step(pointer_x - grab_offset, bar.x1, x_step);
            if new_x1 != bar.x1 {
                let dx = new_x1 - bar.x1;
                candidate.x1 = new_x1;
                candidate.x2 = bar.x2 + dx;
                let (start_anchor, end_anchor) = if rtl {
                    (bar.x2, bar.x1)
                } else {
                    (bar.x1, bar.x2)
                };
                let (start_new, end_new) = if rtl {
                    (candidate.x2, candidate.x1)
                } else {
                    (candidate.x1, candidate.x2)
                };
                candidate.start =
                    date_by_x(start_new, start_anchor, bar.start, x_step, time_step_ms, rtl);
                candidate.end = date_by_x(end_new, end_anchor, bar.end, x_step, time_step_ms, rtl);
                refresh_progress_fill(&mut candidate, rtl);
            }
        }
        DragKind::ResizeStart => {
            if rtl {
                // The start edge is on the right under RTL.
                let mut new_x2 = snap_to_step(pointer_x, bar.x2, x_step);
                if new_x2 < bar.x1 + x_step {
                    new_x2 = bar.x1 + x_step;
                }
                if new_x2 != bar.x2 {
                    candidate.x2 = new_x2;
                    candidate.start =
                        date_by_x(new_x2, bar.x2, bar.start, x_step, time_step_ms, true);
                    refresh_progress_fill(&mut candidate, rtl);
                }
            } else {
                let mut new_x1 = snap_to_step(pointer_x, bar.x1, x_step);
                if new_x1 > bar.x2 - x_step {
                    new_x1 = bar.x2 - x_step;
                }
                if new_x1 != bar.x1 {
                    candidate.x1 = new_x1;
                    candidate.start =
                        date_by_x(new_x1, bar.x1, bar.start, x_step, time_step_ms, false);
                    refresh_progress_fill(&mut candidate, rtl);
                }
            }
        }
        DragKind::ResizeEnd => {
            if rtl {
                let mut new_x1 = snap_to_step(pointer_x, bar.x1, x_step);
                if new_x1 > bar.x2 - x_step {
                    new_x1 = bar.x2 - x_step;
                }
                if new_x1 != bar.x1 {
                    candidate.x1 = new_x1;
                    candidate.end = date_by_x(new_x1, bar.x1, bar.end, x_step, time_step_ms, true);
                    refresh_progress_fill(&mut candidate, rtl);
                }
            } else {
                let mut new_x2 = snap_to_step(pointer_x, bar.x2, x_step);
                if new_x2 < bar.x1 + x_step {
                    new_x2 = bar.x1 + x_step;
                }
                if new_x2 != bar.x2 {
                    candidate.x2 = new_x2;
                    candidate.end = date_by_x(new_x2, bar.x2, bar.end, x_step, time_step_ms, false);
                    refresh_progress_fill(&mut candidate, rtl);
                }
            }
        }
    }

    // Milestones keep zero duration: both instants follow the start.
    if candidate.variant == BarVariant::Milestone {
        candidate.end = candidate.start;
    }
    candidate
}

fn refresh_progress_fill(bar: &mut BarGeometry, rtl: bool) {
    let (width, x) = progress_by_params(bar.x1, bar.x2, bar.progress, rtl);
    bar.progress_width = width;
    bar.progress_x = x;
}
