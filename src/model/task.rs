use chrono::NaiveDateTime;
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of bar a task renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    Task,
    /// Zero-duration marker (`start == end`), rendered as a diamond.
    Milestone,
    /// Summary bar that may own child tasks via their `project` field.
    Project,
}

/// A dependency reference from one task to another.
///
/// The arrow is drawn from the referenced (predecessor) task to the task
/// carrying the entry. References to unknown ids are dropped at layout
/// time rather than treated as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Id of the predecessor task.
    pub id: String,
    /// Optional override color for this edge.
    #[serde(default, with = "opt_color_serde")]
    pub color: Option<Color32>,
}

impl Dependency {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            color: None,
        }
    }
}

/// Per-task color overrides. Unset fields fall back to the per-kind
/// defaults in `ChartOptions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStyles {
    #[serde(default, with = "opt_color_serde")]
    pub background_color: Option<Color32>,
    #[serde(default, with = "opt_color_serde")]
    pub background_selected_color: Option<Color32>,
    #[serde(default, with = "opt_color_serde")]
    pub progress_color: Option<Color32>,
    #[serde(default, with = "opt_color_serde")]
    pub progress_selected_color: Option<Color32>,
}

/// A single task, milestone or project row in the Gantt chart.
///
/// Supplied by the host and treated as immutable within a render pass;
/// the engine reports date/progress changes upward instead of editing
/// the host's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub kind: TaskKind,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Completion from 0 to 100. Out-of-range values are clamped at
    /// layout time.
    #[serde(default)]
    pub progress: Option<f32>,
    /// Base color for locked-handle accents (stored as RGBA).
    #[serde(default, with = "opt_color_serde")]
    pub base_color: Option<Color32>,
    #[serde(default)]
    pub styles: TaskStyles,
    /// Id of the owning project task, if any.
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Tri-state expander: `None` = no children, `Some(false)` =
    /// expanded, `Some(true)` = collapsed.
    #[serde(default)]
    pub hide_children: Option<bool>,
    /// Explicit sort key for row ordering. Unset sorts last, keeping
    /// the original relative order.
    #[serde(default)]
    pub display_order: Option<i64>,
    /// Disabled tasks render normally but accept no gestures.
    #[serde(default)]
    pub is_disabled: bool,
    /// Locked tasks show a lock affordance on the bar ends.
    #[serde(default)]
    pub is_locked: bool,
}

impl Task {
    /// Create a new task with sensible defaults and a generated id.
    pub fn new(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: TaskKind::Task,
            name: name.into(),
            start,
            end,
            progress: Some(0.0),
            base_color: None,
            styles: TaskStyles::default(),
            project: None,
            dependencies: Vec::new(),
            hide_children: None,
            display_order: None,
            is_disabled: false,
            is_locked: false,
        }
    }

    /// Create a new milestone (zero-duration).
    pub fn new_milestone(name: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            kind: TaskKind::Milestone,
            ..Self::new(name, date, date)
        }
    }

    /// Create a new project summary bar.
    pub fn new_project(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            kind: TaskKind::Project,
            hide_children: Some(false),
            ..Self::new(name, start, end)
        }
    }

    /// Progress clamped to the valid 0–100 range.
    pub fn progress_clamped(&self) -> f32 {
        self.progress.unwrap_or(0.0).clamp(0.0, 100.0)
    }

    /// Check the `start <= end` invariant.
    pub fn validate(&self) -> Result<(), crate::error::GanttError> {
        if self.start > self.end {
            return Err(crate::error::GanttError::InvalidDateRange {
                id: self.id.clone(),
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }
}

/// Serde helper for optional `Color32` fields, stored as RGBA arrays.
mod opt_color_serde {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Option<Color32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        color
            .map(|c| [c.r(), c.g(), c.b(), c.a()])
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rgba: Option<[u8; 4]> = Deserialize::deserialize(deserializer)?;
        Ok(rgba.map(|[r, g, b, a]| Color32::from_rgba_premultiplied(r, g, b, a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn milestone_has_equal_start_and_end() {
        let m = Task::new_milestone("Launch", dt(2024, 3, 1));
        assert_eq!(m.start, m.end);
        assert_eq!(m.kind, TaskKind::Milestone);
    }

    #[test]
    fn progress_is_clamped() {
        let mut t = Task::new("t", dt(2024, 1, 1), dt(2024, 1, 5));
        t.progress = Some(130.0);
        assert_eq!(t.progress_clamped(), 100.0);
        t.progress = Some(-4.0);
        assert_eq!(t.progress_clamped(), 0.0);
        t.progress = None;
        assert_eq!(t.progress_clamped(), 0.0);
    }

    #[test]
    fn inverted_date_range_fails_validation() {
        let ok = Task::new("t", dt(2024, 1, 1), dt(2024, 1, 5));
        assert!(ok.validate().is_ok());
        let inverted = Task::new("t", dt(2024, 1, 5), dt(2024, 1, 1));
        assert!(inverted.validate().is_err());
        // Milestones are valid by construction.
        assert!(Task::new_milestone("m", dt(2024, 1, 3)).validate().is_ok());
    }

    #[test]
    fn task_roundtrips_through_json() {
        let mut t = Task::new("Backend", dt(2024, 2, 1), dt(2024, 2, 10));
        t.base_color = Some(Color32::from_rgb(70, 130, 180));
        t.dependencies.push(Dependency::new("other"));
        t.display_order = Some(3);
        let json = serde_json::to_string(&t).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
