use crate::layout::bar::BarGeometry;
use crate::model::Task;

/// The kind of drag gesture in progress, carrying exactly the payload
/// that kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragKind {
    /// Both edges shift together. `grab_offset` is the pixel distance
    /// between the pointer and the bar's left edge at gesture start, so
    /// the bar keeps the spot the user grabbed rather than snapping its
    /// edge to the pointer.
    Move { grab_offset: f32 },
    /// Only the left edge moves (right edge under RTL).
    ResizeStart,
    /// Only the right edge moves (left edge under RTL).
    ResizeEnd,
    /// Only the progress fill changes; not date-snapped.
    Progress,
}

impl DragKind {
    /// Whether this gesture changes the task's scheduled dates.
    pub fn changes_dates(&self) -> bool {
        !matches!(self, DragKind::Progress)
    }
}

/// The current interaction owned by the gesture machine.
///
/// Created on pointer-down (or hover-enter), mutated on pointer-move,
/// consumed and cleared on pointer-up or cancel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Pointer over a bar with no gesture active; carries the bar
    /// geometry for tooltip placement.
    Hover { bar: BarGeometry },
    Drag {
        kind: DragKind,
        /// Pre-drag geometry, the rollback target.
        original: BarGeometry,
        /// Current not-yet-committed geometry.
        provisional: BarGeometry,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Interaction::Drag { .. })
    }
}

/// Which validator a finished gesture must consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    DateChange,
    ProgressChange,
}

/// A finished gesture awaiting validation: the candidate task state,
/// its dependent tasks, and the geometries needed to commit or roll
/// back by task id.
#[derive(Debug, Clone)]
pub struct PendingChange {
    pub kind: ChangeKind,
    /// The task with the candidate dates/progress applied.
    pub task: Task,
    /// Tasks that depend on the changed one, passed to the validator.
    pub children: Vec<Task>,
    pub original: BarGeometry,
    pub changed: BarGeometry,
}

/// How a gesture ended. The two rollback causes behave identically but
/// stay distinguishable for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Zero net change; the validator was never consulted.
    Unchanged,
    Committed,
    /// The validator answered `false`.
    RejectedRollback,
    /// The validator failed; the error was logged and swallowed.
    ErrorRollback,
}

impl ChangeOutcome {
    pub fn is_rollback(&self) -> bool {
        matches!(
            self,
            ChangeOutcome::RejectedRollback | ChangeOutcome::ErrorRollback
        )
    }
}
