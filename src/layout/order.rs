use std::collections::HashSet;

use crate::model::{Task, TaskKind};

/// One task in display position, with its collapsed-ancestor state.
#[derive(Debug, Clone, Copy)]
pub struct ArrangedTask<'a> {
    pub task: &'a Task,
    pub hidden: bool,
}

/// Filter and order tasks for display.
///
/// Descendants of a collapsed project are removed when the host handles
/// expanders, otherwise kept and flagged hidden so row indices stay
/// stable. The result is sorted by `display_order` (stable; unset keys
/// sort last in original order), which defines the row index.
pub fn arrange(tasks: &[Task], expanders_enabled: bool) -> Vec<ArrangedTask<'_>> {
    let hidden_ids = collect_hidden(tasks);

    let mut arranged: Vec<ArrangedTask<'_>> = tasks
        .iter()
        .filter_map(|task| {
            let hidden = hidden_ids.contains(task.id.as_str());
            if hidden && expanders_enabled {
                None
            } else {
                Some(ArrangedTask { task, hidden })
            }
        })
        .collect();

    arranged.sort_by_key(|a| a.task.display_order.unwrap_or(i64::MAX));
    arranged
}

/// Ids of every task below a collapsed project, recursively.
fn collect_hidden(tasks: &[Task]) -> HashSet<&str> {
    let mut hidden: HashSet<&str> = HashSet::new();
    let collapsed: Vec<&str> = tasks
        .iter()
        .filter(|t| t.kind == TaskKind::Project && t.hide_children == Some(true))
        .map(|t| t.id.as_str())
        .collect();

    for root in collapsed {
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            for child in tasks.iter().filter(|t| t.project.as_deref() == Some(parent)) {
                if hidden.insert(child.id.as_str()) {
                    frontier.push(child.id.as_str());
                }
            }
        }
    }
    hidden
}
