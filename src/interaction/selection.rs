use crate::layout::bar::BarGeometry;
use crate::model::Task;

/// External selection seed: ids or whole task objects.
#[derive(Debug, Clone)]
pub enum SelectionRef {
    Id(String),
    Task(Task),
}

/// The ordered selection set plus the designated active (most recently
/// touched) task.
///
/// Persists across renders until click interactions change it or the
/// host reseeds it; ids are resolved against the current bar list at
/// query time, so stale entries simply stop matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected: Vec<String>,
    active: Option<String>,
}

impl Selection {
    pub fn ids(&self) -> &[String] {
        &self.selected
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.active = None;
    }

    /// Reseed from an external list, resolving against the current
    /// tasks. Ids not found are silently dropped. The last surviving
    /// entry becomes active.
    pub fn seed(&mut self, refs: &[SelectionRef], tasks: &[Task]) {
        self.selected = refs
            .iter()
            .filter_map(|r| {
                let id = match r {
                    SelectionRef::Id(id) => id.as_str(),
                    SelectionRef::Task(t) => t.id.as_str(),
                };
                tasks.iter().find(|t| t.id == id).map(|t| t.id.clone())
            })
            .collect();
        self.active = self.selected.last().cloned();
    }

    /// Apply a click to the selection.
    ///
    /// `clicked` of `None` (empty canvas) clears the set. Without
    /// multiselect, or without modifiers, the set is replaced by the
    /// clicked task. Ctrl toggles membership; removing a task never
    /// auto-promotes a new active. Shift extends by the contiguous row
    /// range between the active and clicked tasks; with no active task
    /// it falls back to ctrl behavior.
    pub fn handle_click(
        &mut self,
        clicked: Option<&BarGeometry>,
        bars: &[BarGeometry],
        ctrl: bool,
        shift: bool,
        multiselect: bool,
    ) {
        let Some(clicked) = clicked else {
            self.clear();
            return;
        };
        let id = clicked.task_id.clone();

        if !multiselect || (!ctrl && !shift) {
            self.selected = vec![id.clone()];
            self.active = Some(id);
            return;
        }

        let active_index = self
            .active
            .as_deref()
            .and_then(|active| bars.iter().position(|b| b.task_id == active));

        if (ctrl && !shift) || (shift && active_index.is_none()) {
            if let Some(pos) = self.selected.iter().position(|s| *s == id) {
                self.selected.remove(pos);
            } else {
                self.selected.push(id.clone());
                self.active = Some(id);
            }
            return;
        }

        // Shift range: rows between the active and clicked tasks,
        // inclusive and order-independent, unioned with the selection.
        let from = active_index.expect("checked above");
        let to = clicked.index;
        let (lo, hi) = (from.min(to), from.max(to));
        for bar in bars.iter().filter(|b| b.index >= lo && b.index <= hi) {
            if !self.is_selected(&bar.task_id) {
                self.selected.push(bar.task_id.clone());
            }
        }
        self.active = Some(id);
    }
}
