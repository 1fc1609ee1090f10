//! Engine integration tests — drag gestures, commit/rollback
//! reconciliation, selection, delete and view-date sync.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use egui::Pos2;
use pretty_assertions::assert_eq;

use gantt_engine::{
    ChangeOutcome, ChartHooks, ChartOptions, DragKind, GanttEngine, HitZone, Interaction,
    SelectionRef, Task, ValidationResult,
};

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn named(id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Task {
    let mut t = Task::new(id, start, end);
    t.id = id.to_string();
    t
}

/// Day-snapping options: 60px columns, one-day time step, multiselect.
fn options() -> ChartOptions {
    let mut o = ChartOptions::default();
    o.time_step_ms = 86_400_000;
    o.multiselect = true;
    o
}

#[derive(Clone, Copy)]
enum Mode {
    Accept,
    AcceptExplicit,
    Reject,
    Fail,
}

struct TestHooks {
    mode: Mode,
    date_calls: AtomicUsize,
    progress_calls: AtomicUsize,
    last_children: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
    selection_events: Mutex<Vec<(Vec<String>, Option<String>)>>,
    select_events: Mutex<Vec<(String, bool)>>,
}

impl TestHooks {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            date_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
            last_children: Mutex::new(Vec::new()),
            clicks: Mutex::new(Vec::new()),
            selection_events: Mutex::new(Vec::new()),
            select_events: Mutex::new(Vec::new()),
        }
    }

    fn answer(&self) -> ValidationResult {
        match self.mode {
            Mode::Accept => Ok(None),
            Mode::AcceptExplicit => Ok(Some(true)),
            Mode::Reject => Ok(Some(false)),
            Mode::Fail => Err("validator exploded".into()),
        }
    }
}

#[async_trait]
impl ChartHooks for TestHooks {
    async fn on_date_change(&self, _task: &Task, children: &[Task]) -> ValidationResult {
        self.date_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_children.lock().unwrap() = children.iter().map(|t| t.id.clone()).collect();
        self.answer()
    }

    async fn on_progress_change(&self, _task: &Task, _children: &[Task]) -> ValidationResult {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        self.answer()
    }

    async fn on_delete(&self, _task: &Task) -> ValidationResult {
        self.answer()
    }

    fn on_click(&self, task: &Task) {
        self.clicks.lock().unwrap().push(task.id.clone());
    }

    fn on_selection_change(&self, selected: &[Task], active: Option<&Task>) {
        self.selection_events.lock().unwrap().push((
            selected.iter().map(|t| t.id.clone()).collect(),
            active.map(|t| t.id.clone()),
        ));
    }

    fn on_select(&self, task: &Task, is_selected: bool) {
        self.select_events
            .lock()
            .unwrap()
            .push((task.id.clone(), is_selected));
    }
}

fn single_task_engine() -> GanttEngine {
    GanttEngine::new(
        vec![named("t0", dt(2024, 1, 1), dt(2024, 1, 5))],
        options(),
    )
}

fn bar_x1(engine: &GanttEngine, id: &str) -> f32 {
    engine
        .bars()
        .iter()
        .find(|b| b.task_id == id)
        .unwrap()
        .x1
}

// ═══════════════════════════════════════════════════════════════════
// Drag reconciliation
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn rejected_move_rolls_back_to_original_dates() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::Reject);
    let x1 = bar_x1(&engine, "t0");

    assert!(engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 }));
    engine.pointer_move(Pos2::new(x1 + 120.0, 25.0));
    let outcome = engine
        .pointer_up_with(Pos2::new(x1 + 120.0, 25.0), &hooks)
        .await;

    assert_eq!(outcome, ChangeOutcome::RejectedRollback);
    let task = engine.task("t0").unwrap();
    assert_eq!(task.start, dt(2024, 1, 1));
    assert_eq!(task.end, dt(2024, 1, 5));
    assert!((bar_x1(&engine, "t0") - x1).abs() < f32::EPSILON);
    assert_eq!(engine.take_failed_task(), Some("t0".to_string()));
    assert_eq!(engine.take_failed_task(), None);
}

#[tokio::test]
async fn failing_validator_rolls_back_distinctly() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::Fail);
    let x1 = bar_x1(&engine, "t0");

    engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 });
    engine.pointer_move(Pos2::new(x1 + 60.0, 25.0));
    let outcome = engine
        .pointer_up_with(Pos2::new(x1 + 60.0, 25.0), &hooks)
        .await;

    assert_eq!(outcome, ChangeOutcome::ErrorRollback);
    assert!(outcome.is_rollback());
    assert_eq!(engine.task("t0").unwrap().start, dt(2024, 1, 1));
    assert_eq!(engine.take_failed_task(), Some("t0".to_string()));
}

#[tokio::test]
async fn accepted_move_commits_new_dates() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::AcceptExplicit);
    let x1 = bar_x1(&engine, "t0");

    engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 });
    engine.pointer_move(Pos2::new(x1 + 120.0, 25.0));
    let outcome = engine
        .pointer_up_with(Pos2::new(x1 + 120.0, 25.0), &hooks)
        .await;

    assert_eq!(outcome, ChangeOutcome::Committed);
    let task = engine.task("t0").unwrap();
    assert_eq!(task.start, dt(2024, 1, 3));
    assert_eq!(task.end, dt(2024, 1, 7));
    // Committed geometry reflects the new dates.
    assert!((bar_x1(&engine, "t0") - (x1 + 120.0)).abs() < 1e-3);
}

#[tokio::test]
async fn silent_validator_commits_too() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::Accept);
    let x1 = bar_x1(&engine, "t0");

    engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 });
    engine.pointer_move(Pos2::new(x1 + 60.0, 25.0));
    let outcome = engine
        .pointer_up_with(Pos2::new(x1 + 60.0, 25.0), &hooks)
        .await;
    assert_eq!(outcome, ChangeOutcome::Committed);
    assert_eq!(engine.task("t0").unwrap().start, dt(2024, 1, 2));
}

#[tokio::test]
async fn zero_displacement_move_never_consults_the_validator() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::Reject);
    let x1 = bar_x1(&engine, "t0");

    engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 });
    // Sub-step jitter: emits no geometry update.
    assert!(!engine.pointer_move(Pos2::new(x1 + 10.0, 25.0)));
    let outcome = engine.pointer_up_with(Pos2::new(x1, 25.0), &hooks).await;

    assert_eq!(outcome, ChangeOutcome::Unchanged);
    assert_eq!(hooks.date_calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.task("t0").unwrap().start, dt(2024, 1, 1));
}

#[tokio::test]
async fn accepted_progress_change_commits() {
    let mut tasks = vec![named("t0", dt(2024, 1, 1), dt(2024, 1, 5))];
    tasks[0].progress = Some(20.0);
    let mut engine = GanttEngine::new(tasks, options());
    let hooks = TestHooks::new(Mode::AcceptExplicit);

    let bar = engine.bars()[0].clone();
    engine.begin_gesture("t0", DragKind::Progress);
    let target = Pos2::new(bar.x1 + bar.width() * 0.75, 25.0);
    engine.pointer_move(target);
    let outcome = engine.pointer_up_with(target, &hooks).await;

    assert_eq!(outcome, ChangeOutcome::Committed);
    assert_eq!(hooks.progress_calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.task("t0").unwrap().progress, Some(75.0));
}

#[tokio::test]
async fn rejected_progress_change_restores_original() {
    let mut tasks = vec![named("t0", dt(2024, 1, 1), dt(2024, 1, 5))];
    tasks[0].progress = Some(20.0);
    let mut engine = GanttEngine::new(tasks, options());
    let hooks = TestHooks::new(Mode::Reject);

    let bar = engine.bars()[0].clone();
    engine.begin_gesture("t0", DragKind::Progress);
    let target = Pos2::new(bar.x1 + bar.width() * 0.75, 25.0);
    engine.pointer_move(target);
    let outcome = engine.pointer_up_with(target, &hooks).await;

    assert_eq!(outcome, ChangeOutcome::RejectedRollback);
    assert_eq!(engine.task("t0").unwrap().progress, Some(20.0));
    assert_eq!(engine.bars()[0].progress, 20.0);
}

#[tokio::test]
async fn dependents_are_passed_to_the_validator() {
    let pred = named("pred", dt(2024, 1, 1), dt(2024, 1, 5));
    let mut dep = named("dep", dt(2024, 1, 6), dt(2024, 1, 9));
    dep.dependencies
        .push(gantt_engine::Dependency::new("pred"));
    let mut engine = GanttEngine::new(vec![pred, dep], options());
    let hooks = TestHooks::new(Mode::AcceptExplicit);

    let x1 = bar_x1(&engine, "pred");
    engine.begin_gesture("pred", DragKind::Move { grab_offset: 0.0 });
    engine.pointer_move(Pos2::new(x1 + 60.0, 25.0));
    engine
        .pointer_up_with(Pos2::new(x1 + 60.0, 25.0), &hooks)
        .await;

    assert_eq!(*hooks.last_children.lock().unwrap(), vec!["dep".to_string()]);
}

#[tokio::test]
async fn second_gesture_may_start_while_validation_is_pending() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::AcceptExplicit);
    let x1 = bar_x1(&engine, "t0");

    engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 });
    engine.pointer_move(Pos2::new(x1 + 60.0, 25.0));
    let pending = engine.pointer_up(Pos2::new(x1 + 60.0, 25.0)).unwrap();

    // The machine is already idle; a new gesture can begin before the
    // first resolves. Last-resolved write wins.
    assert!(engine.interaction().is_idle());
    assert!(engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 }));
    engine.cancel_gesture();

    let outcome = engine.resolve_change(pending, &hooks).await;
    assert_eq!(outcome, ChangeOutcome::Committed);
    assert_eq!(engine.task("t0").unwrap().start, dt(2024, 1, 2));
}

#[tokio::test]
async fn task_replaced_beneath_gesture_resolves_as_noop() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::AcceptExplicit);
    let x1 = bar_x1(&engine, "t0");

    engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 });
    engine.pointer_move(Pos2::new(x1 + 60.0, 25.0));
    let pending = engine.pointer_up(Pos2::new(x1 + 60.0, 25.0)).unwrap();

    // The host swaps the task list while validation is in flight.
    engine.set_tasks(vec![named("other", dt(2024, 2, 1), dt(2024, 2, 5))]);
    let outcome = engine.resolve_change(pending, &hooks).await;

    assert_eq!(outcome, ChangeOutcome::Committed);
    assert!(engine.task("t0").is_none());
    assert_eq!(engine.bars().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Hit testing and hover
// ═══════════════════════════════════════════════════════════════════

#[test]
fn hit_zones_resolve_handles_before_body() {
    let engine = single_task_engine();
    let bar = engine.bars()[0].clone();
    let mid_y = bar.y + bar.height / 2.0;

    assert_eq!(
        engine.hit_test(Pos2::new(bar.x1 + bar.width() / 2.0, mid_y)),
        Some((0, HitZone::Body))
    );
    assert_eq!(
        engine.hit_test(Pos2::new(bar.x1, mid_y)),
        Some((0, HitZone::StartHandle))
    );
    assert_eq!(
        engine.hit_test(Pos2::new(bar.x2, mid_y)),
        Some((0, HitZone::EndHandle))
    );
    assert_eq!(engine.hit_test(Pos2::new(bar.x2 + 200.0, mid_y)), None);
}

#[test]
fn pointer_down_on_body_starts_a_move_and_respects_grab_offset() {
    let mut engine = single_task_engine();
    let bar = engine.bars()[0].clone();
    let grab = Pos2::new(bar.x1 + 90.0, bar.y + bar.height / 2.0);

    assert!(engine.pointer_down(grab));
    match engine.interaction() {
        Interaction::Drag {
            kind: DragKind::Move { grab_offset },
            ..
        } => assert!((grab_offset - 90.0).abs() < f32::EPSILON),
        other => panic!("expected move drag, got {other:?}"),
    }
}

#[test]
fn disabled_tasks_take_no_gestures() {
    let mut task = named("t0", dt(2024, 1, 1), dt(2024, 1, 5));
    task.is_disabled = true;
    let mut engine = GanttEngine::new(vec![task], options());
    let bar = engine.bars()[0].clone();
    assert!(!engine.pointer_down(Pos2::new(
        bar.x1 + bar.width() / 2.0,
        bar.y + bar.height / 2.0
    )));
    assert!(!engine.begin_gesture("t0", DragKind::Move { grab_offset: 0.0 }));
}

#[test]
fn milestones_only_move() {
    let m = {
        let mut t = Task::new_milestone("m", dt(2024, 1, 3));
        t.id = "m".into();
        t
    };
    let mut engine = GanttEngine::new(vec![m], options());
    assert!(!engine.begin_gesture("m", DragKind::ResizeEnd));
    assert!(!engine.begin_gesture("m", DragKind::Progress));
    assert!(engine.begin_gesture("m", DragKind::Move { grab_offset: 0.0 }));
}

#[test]
fn hover_tracks_pointer_when_idle() {
    let mut engine = single_task_engine();
    let bar = engine.bars()[0].clone();
    let over = Pos2::new(bar.x1 + bar.width() / 2.0, bar.y + bar.height / 2.0);

    engine.pointer_move(over);
    assert!(matches!(
        engine.interaction(),
        Interaction::Hover { bar } if bar.task_id == "t0"
    ));

    engine.pointer_move(Pos2::new(bar.x2 + 500.0, 400.0));
    assert!(engine.interaction().is_idle());
}

// ═══════════════════════════════════════════════════════════════════
// Selection
// ═══════════════════════════════════════════════════════════════════

#[test]
fn shift_click_selects_row_range() {
    let tasks: Vec<Task> = (0..5)
        .map(|i| named(&format!("t{i}"), dt(2024, 1, 1), dt(2024, 1, 5)))
        .collect();
    let mut engine = GanttEngine::new(tasks, options());
    let hooks = TestHooks::new(Mode::Accept);

    engine.click(Some("t2"), false, false, &hooks);
    engine.click(Some("t4"), false, true, &hooks);

    assert_eq!(engine.selection().ids(), ["t2", "t3", "t4"]);
    assert_eq!(engine.selection().active_id(), Some("t4"));
    assert_eq!(*hooks.clicks.lock().unwrap(), vec!["t2", "t4"]);

    let events = hooks.selection_events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        (
            vec!["t2".into(), "t3".into(), "t4".into()],
            Some("t4".into())
        )
    );
}

#[test]
fn empty_canvas_click_clears_selection() {
    let mut engine = single_task_engine();
    let hooks = TestHooks::new(Mode::Accept);
    engine.click(Some("t0"), false, false, &hooks);
    assert!(!engine.selection().is_empty());
    engine.click(None, false, false, &hooks);
    assert!(engine.selection().is_empty());

    let select_events = hooks.select_events.lock().unwrap();
    assert_eq!(
        *select_events,
        vec![("t0".to_string(), true), ("t0".to_string(), false)]
    );
}

#[test]
fn external_selection_seeds_and_drops_unknown_ids() {
    let mut engine = GanttEngine::new(
        vec![
            named("a", dt(2024, 1, 1), dt(2024, 1, 3)),
            named("b", dt(2024, 1, 2), dt(2024, 1, 6)),
        ],
        options(),
    );
    engine.set_selected_tasks(&[
        SelectionRef::Id("ghost".into()),
        SelectionRef::Id("b".into()),
    ]);
    assert_eq!(engine.selection().ids(), ["b"]);
    assert_eq!(engine.selection().active_id(), Some("b"));
}

// ═══════════════════════════════════════════════════════════════════
// Delete
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn delete_requires_explicit_approval() {
    let mut engine = single_task_engine();

    assert!(!engine.key_delete("t0", &TestHooks::new(Mode::Accept)).await);
    assert_eq!(engine.bars().len(), 1);

    assert!(!engine.key_delete("t0", &TestHooks::new(Mode::Fail)).await);
    assert_eq!(engine.bars().len(), 1);

    assert!(
        engine
            .key_delete("t0", &TestHooks::new(Mode::AcceptExplicit))
            .await
    );
    assert!(engine.bars().is_empty());
    assert!(engine.task("t0").is_none());
}

// ═══════════════════════════════════════════════════════════════════
// Arrows and view-date sync
// ═══════════════════════════════════════════════════════════════════

#[test]
fn arrows_are_partitioned_by_selection() {
    let pred = named("pred", dt(2024, 1, 1), dt(2024, 1, 3));
    let mut dep = named("dep", dt(2024, 1, 8), dt(2024, 1, 11));
    dep.dependencies
        .push(gantt_engine::Dependency::new("pred"));
    let mut engine = GanttEngine::new(vec![pred, dep], options());
    let hooks = TestHooks::new(Mode::Accept);

    let arrows = engine.arrows();
    assert_eq!(arrows.len(), 1);
    assert!(!arrows[0].selected);
    assert_eq!(arrows[0].from_index, 0);
    assert_eq!(arrows[0].to_index, 1);

    engine.click(Some("dep"), false, false, &hooks);
    assert!(engine.arrows()[0].selected);
}

#[test]
fn view_date_sync_only_fires_inside_the_tick_range() {
    let mut engine = single_task_engine();

    // Inside: ticks run from Dec 31 (one pre-step) past Jan 5.
    let scroll = engine.set_view_date(dt(2024, 1, 3));
    assert_eq!(scroll, Some(3.0 * 60.0));
    // Same date again: no new sync.
    assert_eq!(engine.set_view_date(dt(2024, 1, 3)), None);
    // Outside the range: ignored, axis untouched.
    let ticks_before = engine.timeline().ticks.clone();
    assert_eq!(engine.set_view_date(dt(2030, 6, 1)), None);
    assert_eq!(engine.timeline().ticks, ticks_before);
}
