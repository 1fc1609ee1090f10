use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Controls what scale the time axis displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    Hour,
    QuarterDay,
    HalfDay,
    #[default]
    Day,
    /// ISO-8601 week, ticks on Mondays.
    Week,
    Month,
    QuarterYear,
    Year,
}

impl ViewMode {
    /// Snap an instant down to the start of this mode's unit.
    fn snap(self, dt: NaiveDateTime) -> NaiveDateTime {
        let date = dt.date();
        match self {
            ViewMode::Hour => dt
                .with_minute(0)
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0))
                .unwrap_or(dt),
            ViewMode::QuarterDay | ViewMode::HalfDay | ViewMode::Day => midnight(date),
            ViewMode::Week => {
                let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                midnight(monday)
            }
            ViewMode::Month => midnight(first_of_month(date)),
            ViewMode::QuarterYear => {
                let quarter_month = 1 + ((date.month() - 1) / 3) * 3;
                midnight(ymd(date.year(), quarter_month, 1))
            }
            ViewMode::Year => midnight(ymd(date.year(), 1, 1)),
        }
    }

    /// Advance an instant by one unit. Month-based units step along
    /// calendar boundaries, so consecutive ticks are not uniformly
    /// spaced in milliseconds.
    pub fn advance(self, dt: NaiveDateTime) -> NaiveDateTime {
        match self {
            ViewMode::Hour => dt + Duration::hours(1),
            ViewMode::QuarterDay => dt + Duration::hours(6),
            ViewMode::HalfDay => dt + Duration::hours(12),
            ViewMode::Day => dt + Duration::days(1),
            ViewMode::Week => dt + Duration::days(7),
            ViewMode::Month => add_months(dt, 1),
            ViewMode::QuarterYear => add_months(dt, 3),
            ViewMode::Year => add_months(dt, 12),
        }
    }

    /// Step an instant back by `n` units.
    fn retreat(self, dt: NaiveDateTime, n: u32) -> NaiveDateTime {
        match self {
            ViewMode::Hour => dt - Duration::hours(n as i64),
            ViewMode::QuarterDay => dt - Duration::hours(6 * n as i64),
            ViewMode::HalfDay => dt - Duration::hours(12 * n as i64),
            ViewMode::Day => dt - Duration::days(n as i64),
            ViewMode::Week => dt - Duration::days(7 * n as i64),
            ViewMode::Month => sub_months(dt, n),
            ViewMode::QuarterYear => sub_months(dt, 3 * n),
            ViewMode::Year => sub_months(dt, 12 * n),
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("midnight is always valid")
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("calendar boundary is always valid")
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    ymd(date.year(), date.month(), 1)
}

fn add_months(dt: NaiveDateTime, n: u32) -> NaiveDateTime {
    dt.checked_add_months(Months::new(n))
        .unwrap_or(dt + Duration::days(30 * n as i64))
}

fn sub_months(dt: NaiveDateTime, n: u32) -> NaiveDateTime {
    dt.checked_sub_months(Months::new(n))
        .unwrap_or(dt - Duration::days(30 * n as i64))
}

/// Compute the snapped axis bounds for a task set.
///
/// The start bound is the earliest task start snapped to the view unit
/// and padded back by `pre_steps_count` units; the end bound is the
/// latest task end snapped and advanced by one unit. An empty task list
/// falls back to a synthetic range around "now" using the same padding.
pub fn chart_date_range(
    tasks: &[Task],
    view_mode: ViewMode,
    pre_steps_count: u32,
) -> (NaiveDateTime, NaiveDateTime) {
    let (min_start, max_end) = match tasks.iter().map(|t| (t.start, t.end)).reduce(
        |(min_s, max_e), (s, e)| (min_s.min(s), max_e.max(e)),
    ) {
        Some(bounds) => bounds,
        None => {
            let now = chrono::Local::now().naive_local();
            (now, now)
        }
    };

    let start = view_mode.retreat(view_mode.snap(min_start), pre_steps_count);
    let end = view_mode.advance(view_mode.snap(max_end));
    (start, end)
}

/// Generate the ordered tick list from `start` to past `end`, one unit
/// at a time.
pub fn seed_dates(
    start: NaiveDateTime,
    end: NaiveDateTime,
    view_mode: ViewMode,
) -> Vec<NaiveDateTime> {
    let mut current = start;
    let mut dates = vec![current];
    while current < end {
        current = view_mode.advance(current);
        dates.push(current);
    }
    dates
}

/// The generated time axis: an ordered tick list plus the view mode
/// that produced it.
///
/// Ticks are strictly increasing, or strictly decreasing after the
/// RTL reversal. Length is always at least two, so a step can be
/// derived from consecutive deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub view_mode: ViewMode,
    pub ticks: Vec<NaiveDateTime>,
}

impl Timeline {
    /// Build the axis for a task set. `rtl` reverses the tick order
    /// after generation; the date semantics are unchanged.
    pub fn generate(tasks: &[Task], view_mode: ViewMode, pre_steps_count: u32, rtl: bool) -> Self {
        let (start, end) = chart_date_range(tasks, view_mode, pre_steps_count);
        let mut ticks = seed_dates(start, end, view_mode);
        if rtl {
            ticks.reverse();
        }
        Self { view_mode, ticks }
    }

    /// Build an axis from caller-supplied ticks. At least two are
    /// required so a step can be derived.
    pub fn from_ticks(
        view_mode: ViewMode,
        ticks: Vec<NaiveDateTime>,
    ) -> Result<Self, crate::error::GanttError> {
        if ticks.len() < 2 {
            return Err(crate::error::GanttError::AxisTooShort(ticks.len()));
        }
        Ok(Self { view_mode, ticks })
    }

    /// Whether the tick order was reversed for RTL layout.
    pub fn is_reversed(&self) -> bool {
        self.ticks.len() >= 2 && self.ticks[0] > self.ticks[1]
    }

    /// Convert a date to an x-pixel offset by linear interpolation
    /// between the two bracketing ticks. Never assumes uniform tick
    /// width, so month/quarter granularity maps correctly.
    pub fn x_for_date(&self, date: NaiveDateTime, column_width: f32) -> f32 {
        let ticks = &self.ticks;
        if ticks.len() < 2 {
            return 0.0;
        }
        let last = ticks.len() - 2;
        let index = if self.is_reversed() {
            ticks
                .iter()
                .position(|t| *t <= date)
                .map(|i| i.saturating_sub(1))
                .unwrap_or(last)
                .min(last)
        } else {
            ticks
                .iter()
                .position(|t| *t >= date)
                .map(|i| i.saturating_sub(1))
                .unwrap_or(last)
                .min(last)
        };
        let span = (ticks[index + 1] - ticks[index]).num_milliseconds() as f32;
        let remainder = (date - ticks[index]).num_milliseconds() as f32;
        let fraction = if span == 0.0 { 0.0 } else { remainder / span };
        (index as f32 + fraction) * column_width
    }

    /// Pixel width of one `time_step` duration, derived from the first
    /// tick interval. This is the drag snapping step; it only equals
    /// `column_width` when `time_step` matches the tick spacing.
    pub fn x_step(&self, time_step_ms: i64, column_width: f32) -> f32 {
        let delta = (self.ticks[1] - self.ticks[0]).num_milliseconds().abs();
        if delta == 0 {
            return column_width;
        }
        time_step_ms as f32 * column_width / delta as f32
    }

    /// Index of the tick interval containing `date`, if the date falls
    /// inside the axis range. The last tick starts no interval.
    pub fn interval_index(&self, date: NaiveDateTime) -> Option<usize> {
        let ticks = &self.ticks;
        if self.is_reversed() {
            (0..ticks.len().saturating_sub(1))
                .find(|&i| date <= ticks[i] && date > ticks[i + 1])
        } else {
            (0..ticks.len().saturating_sub(1))
                .find(|&i| date >= ticks[i] && date < ticks[i + 1])
        }
    }

    /// Total chart width for a given column width.
    pub fn chart_width(&self, column_width: f32) -> f32 {
        self.ticks.len() as f32 * column_width
    }
}
