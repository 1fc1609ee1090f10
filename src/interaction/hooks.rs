use async_trait::async_trait;

use crate::model::Task;

/// Error type for host validators. The engine logs and swallows these
/// after rolling back; hosts needing diagnostics log inside their own
/// validator.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A validator's answer: `Ok(None)` and `Ok(Some(true))` commit,
/// `Ok(Some(false))` and `Err(_)` roll back.
pub type ValidationResult = Result<Option<bool>, HookError>;

/// Host-supplied callbacks. Validators may suspend; notification hooks
/// are synchronous, as the host reacts to them outside the engine.
#[async_trait]
pub trait ChartHooks: Send + Sync {
    /// Invoked when a finished gesture changed a task's start or end.
    async fn on_date_change(&self, _task: &Task, _children: &[Task]) -> ValidationResult {
        Ok(None)
    }

    /// Invoked when a finished gesture changed a task's progress.
    async fn on_progress_change(&self, _task: &Task, _children: &[Task]) -> ValidationResult {
        Ok(None)
    }

    /// Invoked on keyboard delete. Only an explicit `Ok(Some(true))`
    /// removes the task from the working set.
    async fn on_delete(&self, _task: &Task) -> ValidationResult {
        Ok(None)
    }

    fn on_click(&self, _task: &Task) {}

    fn on_double_click(&self, _task: &Task) {}

    /// A task entered or left the selection's active slot.
    fn on_select(&self, _task: &Task, _is_selected: bool) {}

    /// The selection set changed.
    fn on_selection_change(&self, _selected: &[Task], _active: Option<&Task>) {}

    /// The host owns `hide_children`; the engine hands back the task
    /// with the flag already toggled.
    fn on_expander_click(&self, _task: &Task) {}
}

/// Hooks that accept everything and notify nothing.
pub struct NoHooks;

#[async_trait]
impl ChartHooks for NoHooks {}
