pub mod project;
pub mod task;
pub mod timeline;

pub use project::Project;
pub use task::{Dependency, Task, TaskKind, TaskStyles};
pub use timeline::{chart_date_range, seed_dates, Timeline, ViewMode};
