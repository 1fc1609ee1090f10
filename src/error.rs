use thiserror::Error;

/// Errors surfaced by the low-level construction APIs.
///
/// The render path itself never fails: rejected validations, dangling
/// dependencies and empty task lists all degrade to "no visible change".
#[derive(Error, Debug)]
pub enum GanttError {
    #[error("axis needs at least two ticks, got {0}")]
    AxisTooShort(usize),

    #[error("invalid date range for task {id}: start {start} is after end {end}")]
    InvalidDateRange {
        id: String,
        start: String,
        end: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
