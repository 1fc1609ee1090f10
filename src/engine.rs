use chrono::NaiveDateTime;
use egui::{Pos2, Rect, Vec2};

use crate::interaction::event::{ChangeKind, ChangeOutcome, DragKind, Interaction, PendingChange};
use crate::interaction::gesture;
use crate::interaction::hooks::ChartHooks;
use crate::interaction::selection::{Selection, SelectionRef};
use crate::layout::arrow::{route_arrow, route_arrow_rtl, ArrowPath};
use crate::layout::bar::{convert_to_bars, BarGeometry, BarVariant};
use crate::layout::grid::{build_grid, GridGeometry};
use crate::layout::style::ChartOptions;
use crate::model::{Project, Task, Timeline, ViewMode};

/// Maps screen coordinates into the chart surface's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTransform {
    pub origin: Pos2,
    pub scale: f32,
}

impl Default for ChartTransform {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            scale: 1.0,
        }
    }
}

impl ChartTransform {
    pub fn to_local(&self, pos: Pos2) -> Pos2 {
        Pos2::new(
            (pos.x - self.origin.x) / self.scale,
            (pos.y - self.origin.y) / self.scale,
        )
    }
}

/// What part of a bar the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Body,
    StartHandle,
    EndHandle,
    ProgressHandle,
}

/// One routed dependency arrow, ready to render. `selected` marks edges
/// touching a selected task for the highlighted drawing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowGeometry {
    pub from_index: usize,
    pub to_index: usize,
    pub color: Option<egui::Color32>,
    pub selected: bool,
    pub path: ArrowPath,
}

/// The chart engine: owns tasks, options, axis, bar list, selection and
/// the current gesture, and recomputes geometry on every change.
///
/// All pointer input arrives in screen coordinates and is converted to
/// chart-local space through the configured transform. Host callbacks
/// are passed per call, so the engine holds no host state.
pub struct GanttEngine {
    tasks: Vec<Task>,
    options: ChartOptions,
    transform: ChartTransform,
    timeline: Timeline,
    bars: Vec<BarGeometry>,
    selection: Selection,
    interaction: Interaction,
    current_view_date: Option<NaiveDateTime>,
    failed_task: Option<String>,
}

fn warn_invalid_tasks(tasks: &[Task]) {
    for task in tasks {
        if let Err(e) = task.validate() {
            log::warn!("{e}");
        }
    }
}

impl GanttEngine {
    pub fn new(tasks: Vec<Task>, options: ChartOptions) -> Self {
        warn_invalid_tasks(&tasks);
        let mut engine = Self {
            tasks,
            options,
            transform: ChartTransform::default(),
            timeline: Timeline {
                view_mode: ViewMode::Day,
                ticks: Vec::new(),
            },
            bars: Vec::new(),
            selection: Selection::default(),
            interaction: Interaction::Idle,
            current_view_date: None,
            failed_task: None,
        };
        engine.recompute();
        engine
    }

    pub fn from_project(project: &Project, options: ChartOptions) -> Self {
        Self::new(project.tasks.clone(), options)
    }

    /// Rebuild axis and bar list from the current tasks and options.
    /// Pure and idempotent; any in-flight optimistic geometry is
    /// replaced by committed state.
    fn recompute(&mut self) {
        self.timeline = Timeline::generate(
            &self.tasks,
            self.options.view_mode,
            self.options.pre_steps_count,
            self.options.rtl,
        );
        self.refresh_bars();
    }

    /// Rebuild the bar list against the existing axis. Gesture commits
    /// and rollbacks use this: axis rebuilds are driven only by host
    /// data/view-mode changes, never by a gesture outcome.
    fn refresh_bars(&mut self) {
        self.bars = convert_to_bars(&self.tasks, &self.timeline, &self.options);
    }

    // --- Inputs ---

    /// Replace the task list. Applied beneath any active gesture; the
    /// gesture's eventual commit or rollback targets its task id and is
    /// a no-op if the id no longer exists.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        warn_invalid_tasks(&tasks);
        self.tasks = tasks;
        self.recompute();
    }

    pub fn set_options(&mut self, options: ChartOptions) {
        self.options = options;
        self.recompute();
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.options.view_mode = view_mode;
        self.recompute();
    }

    pub fn set_transform(&mut self, transform: ChartTransform) {
        self.transform = transform;
    }

    /// Seed the selection from an external list; unknown ids are
    /// silently dropped.
    pub fn set_selected_tasks(&mut self, refs: &[SelectionRef]) {
        self.selection.seed(refs, &self.tasks);
    }

    /// Synchronize to an externally supplied view date. Reports the
    /// scroll offset only when the date falls inside the existing tick
    /// range; otherwise the request is ignored until the next natural
    /// rebuild. Never rebuilds the axis.
    pub fn set_view_date(&mut self, date: NaiveDateTime) -> Option<f32> {
        let index = self.timeline.interval_index(date)?;
        if self.current_view_date == Some(date) {
            return None;
        }
        self.current_view_date = Some(date);
        Some(index as f32 * self.options.column_width)
    }

    // --- Outputs ---

    pub fn bars(&self) -> &[BarGeometry] {
        &self.bars
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn selected_tasks(&self) -> Vec<&Task> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.task(id))
            .collect()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.selection.active_id().and_then(|id| self.task(id))
    }

    pub fn chart_width(&self) -> f32 {
        self.timeline.chart_width(self.options.column_width)
    }

    pub fn chart_height(&self) -> f32 {
        self.bars.len() as f32 * self.options.row_height
    }

    pub fn grid(&self, now: NaiveDateTime) -> GridGeometry {
        build_grid(
            &self.timeline,
            self.options.column_width,
            self.bars.len(),
            self.options.row_height,
            now,
        )
    }

    /// Route every dependency edge. Edges touching hidden bars are
    /// skipped; edges touching a selected task are flagged for the
    /// highlighted drawing pass.
    pub fn arrows(&self) -> Vec<ArrowGeometry> {
        let mut arrows = Vec::new();
        for from in &self.bars {
            if !from.variant.is_visible() {
                continue;
            }
            for edge in &from.children {
                let to = &self.bars[edge.to_index];
                if !to.variant.is_visible() {
                    continue;
                }
                let path = if self.options.rtl {
                    route_arrow_rtl(from, to, self.options.row_height, self.options.arrow_indent)
                } else {
                    route_arrow(
                        &self.bars,
                        from,
                        to,
                        self.options.row_height,
                        self.options.arrow_indent,
                    )
                };
                arrows.push(ArrowGeometry {
                    from_index: from.index,
                    to_index: to.index,
                    color: edge.color,
                    selected: self.selection.is_selected(&from.task_id)
                        || self.selection.is_selected(&to.task_id),
                    path,
                });
            }
        }
        arrows
    }

    /// The failed-task flash signal, consumed by reading it.
    pub fn take_failed_task(&mut self) -> Option<String> {
        self.failed_task.take()
    }

    // --- Pointer input ---

    /// Find the bar and zone under a chart-local position. Handles win
    /// over the bar body; hidden bars are transparent to hits.
    pub fn hit_test(&self, local: Pos2) -> Option<(usize, HitZone)> {
        for (i, bar) in self.bars.iter().enumerate() {
            if !bar.variant.is_visible() {
                continue;
            }
            let rect = bar.rect();
            let has_handles =
                matches!(bar.variant, BarVariant::Task | BarVariant::SmallTask);
            if has_handles {
                let progress_rect = Rect::from_center_size(
                    bar.progress_point(self.options.rtl),
                    Vec2::splat(bar.handle_width * 1.5),
                );
                if progress_rect.contains(local) {
                    return Some((i, HitZone::ProgressHandle));
                }
                let half = bar.handle_width * 0.5;
                let left = Rect::from_min_max(
                    Pos2::new(bar.x1 - half, bar.y),
                    Pos2::new(bar.x1 + half, bar.y + bar.height),
                )
                .expand(2.0);
                let right = Rect::from_min_max(
                    Pos2::new(bar.x2 - half, bar.y),
                    Pos2::new(bar.x2 + half, bar.y + bar.height),
                )
                .expand(2.0);
                if left.contains(local) {
                    return Some((i, HitZone::StartHandle));
                }
                if right.contains(local) {
                    return Some((i, HitZone::EndHandle));
                }
            }
            let body = if bar.variant == BarVariant::Milestone {
                rect.expand(2.0)
            } else {
                rect
            };
            if body.contains(local) {
                return Some((i, HitZone::Body));
            }
        }
        None
    }

    /// Begin a gesture from a pointer press. Returns whether a drag
    /// started; disabled tasks and hidden rows never start one.
    pub fn pointer_down(&mut self, pos: Pos2) -> bool {
        let local = self.transform.to_local(pos);
        let Some((index, zone)) = self.hit_test(local) else {
            return false;
        };
        let bar = &self.bars[index];
        if bar.is_disabled {
            return false;
        }
        let kind = match (zone, bar.variant) {
            (HitZone::Body, _) => DragKind::Move {
                grab_offset: local.x - bar.x1,
            },
            // Handles only exist on plain task bars.
            (HitZone::StartHandle, BarVariant::Task | BarVariant::SmallTask) => {
                DragKind::ResizeStart
            }
            (HitZone::EndHandle, BarVariant::Task | BarVariant::SmallTask) => DragKind::ResizeEnd,
            (HitZone::ProgressHandle, BarVariant::Task | BarVariant::SmallTask) => {
                DragKind::Progress
            }
            _ => return false,
        };
        let task_id = self.bars[index].task_id.clone();
        self.begin_gesture(&task_id, kind)
    }

    /// Begin a gesture on a task directly (host-side hit testing).
    pub fn begin_gesture(&mut self, task_id: &str, kind: DragKind) -> bool {
        let Some(bar) = self.bar_of(task_id).cloned() else {
            return false;
        };
        if bar.is_disabled || !bar.variant.is_visible() {
            return false;
        }
        // Milestones only move; projects have no resize or progress.
        let allowed = match bar.variant {
            BarVariant::Milestone | BarVariant::Project => {
                matches!(kind, DragKind::Move { .. })
            }
            _ => true,
        };
        if !allowed {
            return false;
        }
        self.interaction = Interaction::Drag {
            kind,
            original: bar.clone(),
            provisional: bar,
        };
        true
    }

    /// Advance the active gesture (or hover state) for a pointer
    /// position. Returns whether the provisional geometry changed;
    /// sub-step movement reports false and emits nothing.
    pub fn pointer_move(&mut self, pos: Pos2) -> bool {
        let local = self.transform.to_local(pos);
        if let Interaction::Drag {
            kind,
            original,
            provisional,
        } = &self.interaction
        {
            let kind = *kind;
            let original = original.clone();
            let candidate = gesture::apply_drag(
                kind,
                provisional,
                local.x,
                self.x_step(),
                self.options.time_step_ms,
                self.options.rtl,
            );
            if candidate == *provisional {
                return false;
            }
            // Optimistic application for immediate feedback.
            if let Some(slot) = self
                .bars
                .iter_mut()
                .find(|b| b.task_id == candidate.task_id)
            {
                *slot = candidate.clone();
            }
            self.interaction = Interaction::Drag {
                kind,
                original,
                provisional: candidate,
            };
            return true;
        }

        // No gesture active: plain hover bookkeeping.
        match self.hit_test(local) {
            Some((index, _)) => {
                let bar = self.bars[index].clone();
                let entered = !matches!(
                    &self.interaction,
                    Interaction::Hover { bar: b } if b.task_id == bar.task_id
                );
                if entered {
                    self.interaction = Interaction::Hover { bar };
                }
            }
            None => {
                if matches!(self.interaction, Interaction::Hover { .. }) {
                    self.interaction = Interaction::Idle;
                }
            }
        }
        false
    }

    /// Finish the active gesture. The machine returns to `Idle`
    /// immediately; if the gesture produced a net change, the returned
    /// `PendingChange` must be passed to [`resolve_change`] for
    /// validation. A zero net change returns `None` and the validator
    /// is never consulted.
    ///
    /// [`resolve_change`]: GanttEngine::resolve_change
    pub fn pointer_up(&mut self, pos: Pos2) -> Option<PendingChange> {
        let local = self.transform.to_local(pos);
        let Interaction::Drag {
            kind,
            original,
            provisional,
        } = std::mem::take(&mut self.interaction)
        else {
            return None;
        };

        let changed = gesture::apply_drag(
            kind,
            &provisional,
            local.x,
            self.x_step(),
            self.options.time_step_ms,
            self.options.rtl,
        );

        let change_kind = if kind.changes_dates() {
            ChangeKind::DateChange
        } else {
            ChangeKind::ProgressChange
        };
        let is_changed = match change_kind {
            ChangeKind::DateChange => {
                changed.start != original.start || changed.end != original.end
            }
            ChangeKind::ProgressChange => changed.progress != original.progress,
        };
        if !is_changed {
            // Undo any sub-gesture optimistic state.
            if let Some(slot) = self.bars.iter_mut().find(|b| b.task_id == original.task_id) {
                *slot = original;
            }
            return None;
        }

        let Some(task) = self.task(&original.task_id).cloned() else {
            // The task vanished beneath the gesture.
            return None;
        };
        let mut task = task;
        task.start = changed.start;
        task.end = changed.end;
        task.progress = Some(changed.progress);

        let children = self
            .bar_of(&original.task_id)
            .map(|bar| {
                bar.children
                    .iter()
                    .filter_map(|edge| {
                        self.task(&self.bars[edge.to_index].task_id).cloned()
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(slot) = self.bars.iter_mut().find(|b| b.task_id == original.task_id) {
            *slot = changed.clone();
        }

        Some(PendingChange {
            kind: change_kind,
            task,
            children,
            original,
            changed,
        })
    }

    /// Abandon the active gesture and restore committed geometry.
    pub fn cancel_gesture(&mut self) {
        if self.interaction.is_dragging() {
            self.interaction = Interaction::Idle;
            self.refresh_bars();
        }
    }

    /// Reconcile a finished gesture with the host validator.
    ///
    /// The machine is already idle, so a second gesture may start while
    /// this is pending; the write here targets the task id, and for two
    /// overlapping gestures on the same task the last resolved write
    /// wins. A task id that no longer exists makes this a no-op.
    pub async fn resolve_change(
        &mut self,
        pending: PendingChange,
        hooks: &dyn ChartHooks,
    ) -> ChangeOutcome {
        let result = match pending.kind {
            ChangeKind::DateChange => {
                hooks.on_date_change(&pending.task, &pending.children).await
            }
            ChangeKind::ProgressChange => {
                hooks
                    .on_progress_change(&pending.task, &pending.children)
                    .await
            }
        };

        let outcome = match result {
            Ok(Some(true)) | Ok(None) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == pending.task.id) {
                    task.start = pending.task.start;
                    task.end = pending.task.end;
                    task.progress = pending.task.progress;
                }
                ChangeOutcome::Committed
            }
            Ok(Some(false)) => {
                self.failed_task = Some(pending.task.id.clone());
                ChangeOutcome::RejectedRollback
            }
            Err(e) => {
                log::warn!("validator failed for task {:?}: {e}", pending.task.id);
                self.failed_task = Some(pending.task.id.clone());
                ChangeOutcome::ErrorRollback
            }
        };

        // Committed state reproduces the accepted geometry; a rollback
        // simply reconverts from the unchanged tasks.
        self.refresh_bars();
        outcome
    }

    /// Finish and reconcile in one call.
    pub async fn pointer_up_with(
        &mut self,
        pos: Pos2,
        hooks: &dyn ChartHooks,
    ) -> ChangeOutcome {
        match self.pointer_up(pos) {
            Some(pending) => self.resolve_change(pending, hooks).await,
            None => ChangeOutcome::Unchanged,
        }
    }

    // --- Click / keyboard input ---

    /// A plain click: selection bookkeeping plus notifications. Passing
    /// `None` (empty canvas) clears the selection. Geometry is never
    /// mutated here.
    pub fn click(
        &mut self,
        task_id: Option<&str>,
        ctrl: bool,
        shift: bool,
        hooks: &dyn ChartHooks,
    ) {
        let before_ids = self.selection.ids().to_vec();
        let before_active = self.selection.active_id().map(str::to_string);

        let clicked = task_id.and_then(|id| self.bar_of(id)).cloned();
        self.selection.handle_click(
            clicked.as_ref(),
            &self.bars,
            ctrl,
            shift,
            self.options.multiselect,
        );

        if let Some(bar) = &clicked {
            if let Some(task) = self.task(&bar.task_id) {
                hooks.on_click(task);
            }
        }
        self.emit_selection_events(&before_ids, before_active.as_deref(), hooks);
    }

    pub fn double_click(&self, task_id: &str, hooks: &dyn ChartHooks) {
        if let Some(task) = self.task(task_id) {
            hooks.on_double_click(task);
        }
    }

    /// Expander toggled on a row. The engine does not own the
    /// hierarchy; the host receives the task with `hide_children`
    /// already flipped and decides what to do.
    pub fn expander_click(&self, task_id: &str, hooks: &dyn ChartHooks) {
        if let Some(task) = self.task(task_id) {
            if let Some(hidden) = task.hide_children {
                let mut toggled = task.clone();
                toggled.hide_children = Some(!hidden);
                hooks.on_expander_click(&toggled);
            }
        }
    }

    /// Keyboard delete on a focused bar. Only an explicit true from the
    /// host removes the task; every other outcome (including an error,
    /// which is logged) leaves state unchanged.
    pub async fn key_delete(&mut self, task_id: &str, hooks: &dyn ChartHooks) -> bool {
        let Some(task) = self.task(task_id).cloned() else {
            return false;
        };
        if task.is_disabled {
            return false;
        }
        match hooks.on_delete(&task).await {
            Ok(Some(true)) => {
                self.tasks.retain(|t| t.id != task.id);
                self.refresh_bars();
                true
            }
            Ok(_) => false,
            Err(e) => {
                log::error!("delete rejected with error for task {:?}: {e}", task.id);
                false
            }
        }
    }

    // --- Internals ---

    fn x_step(&self) -> f32 {
        self.timeline
            .x_step(self.options.time_step_ms, self.options.column_width)
    }

    fn bar_of(&self, task_id: &str) -> Option<&BarGeometry> {
        self.bars.iter().find(|b| b.task_id == task_id)
    }

    fn emit_selection_events(
        &self,
        before_ids: &[String],
        before_active: Option<&str>,
        hooks: &dyn ChartHooks,
    ) {
        if before_ids != self.selection.ids() {
            hooks.on_selection_change(
                &self
                    .selected_tasks()
                    .into_iter()
                    .cloned()
                    .collect::<Vec<_>>(),
                self.active_task(),
            );
        }
        let after_active = self.selection.active_id();
        if before_active != after_active {
            if let Some(task) = before_active.and_then(|id| self.task(id)) {
                hooks.on_select(task, false);
            }
            if let Some(task) = after_active.and_then(|id| self.task(id)) {
                hooks.on_select(task, true);
            }
        }
    }
}
