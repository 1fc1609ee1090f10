//! Headless Gantt chart engine: task records in, pixel-space geometry
//! and interaction state out.
//!
//! The crate renders nothing itself. A host feeds it tasks and
//! [`ChartOptions`], drives it with pointer/keyboard input, and draws
//! the resulting [`BarGeometry`] list, dependency arrows and grid with
//! whatever surface it likes. Date and progress edits made by dragging
//! are applied optimistically and reconciled with the host's async
//! validators — commit on acceptance, rollback (plus a failed-task
//! signal) on rejection or error.

pub mod engine;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod model;

pub use engine::{ArrowGeometry, ChartTransform, GanttEngine, HitZone};
pub use error::GanttError;
pub use interaction::{
    ChangeKind, ChangeOutcome, ChartHooks, DragKind, HookError, Interaction, NoHooks,
    PendingChange, Selection, SelectionRef, ValidationResult,
};
pub use layout::{
    ArrowPath, BarColors, BarGeometry, BarVariant, ChartOptions, DependencyEdge, FontMetrics,
    GridGeometry,
};
pub use model::{Dependency, Project, Task, TaskKind, TaskStyles, Timeline, ViewMode};
