pub mod event;
pub mod gesture;
pub mod hooks;
pub mod selection;

pub use event::{ChangeKind, ChangeOutcome, DragKind, Interaction, PendingChange};
pub use hooks::{ChartHooks, HookError, NoHooks, ValidationResult};
pub use selection::{Selection, SelectionRef};
