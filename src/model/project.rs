use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::Task;

/// A named collection of tasks with bookkeeping timestamps.
///
/// Convenience container for hosts that manage a whole chart as one
/// document; the engine itself only consumes the task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub tasks: Vec<Task>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            tasks: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Serialize to a pretty JSON string for the host to store.
    pub fn to_json(&self) -> Result<String, crate::error::GanttError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string supplied by the host.
    pub fn from_json(json: &str) -> Result<Self, crate::error::GanttError> {
        Ok(serde_json::from_str(json)?)
    }
}
