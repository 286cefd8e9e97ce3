//! End-to-end session scenarios against the engine.

use ritmo_core::{
    Engine, Event, History, Mode, Priority, Settings, Store, Task, TaskQueue,
};

fn count_wraps(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::SessionsWrapped { .. }))
        .count()
}

/// Free-running: four work completions per session, long break after the
/// fourth, session advancing and the cycle counter re-baselining.
#[test]
fn free_running_session_of_four_cycles() {
    let mut settings = Settings::default();
    settings.cycles_per_session = 4;
    settings.session_count = 2;
    settings.auto_transitions = true;
    let mut engine = Engine::new(settings, TaskQueue::default(), History::default());
    engine.start();

    let mut modes = vec![engine.mode()];
    for _ in 0..7 {
        engine.skip();
        modes.push(engine.mode());
    }

    use Mode::*;
    assert_eq!(
        modes,
        [Work, ShortBreak, Work, ShortBreak, Work, ShortBreak, Work, LongBreak]
    );
    assert_eq!(engine.state().current_session, 2);
    assert_eq!(engine.state().completed_cycles, 1);
    // Auto-transitions kept the clock running throughout.
    assert!(engine.is_running());
}

/// Task-driven, quota 2, auto-check on, auto-switch off: the second work
/// completion marks the task done, logs history, enters the long break and
/// reverts to free-running.
#[test]
fn task_quota_completion_reverts_to_free_running() {
    let mut settings = Settings::default();
    settings.auto_check_tasks = true;
    let mut queue = TaskQueue::default();
    let id = queue.add(Task::new("spec draft", None, 2, Priority::High).unwrap());
    let mut engine = Engine::new(settings, queue, History::default());

    engine.start_task_cycles(id).unwrap();
    engine.skip();
    assert_eq!(engine.mode(), Mode::ShortBreak);
    assert!(!engine.queue().task(id).unwrap().completed);
    assert!(engine.history().is_empty());

    engine.skip(); // Back to work.
    engine.skip(); // Second work completion: quota met.
    assert_eq!(engine.mode(), Mode::LongBreak);
    assert!(engine.queue().task(id).unwrap().completed);
    assert_eq!(engine.history().len(), 1);
    assert!(!engine.is_task_driven());
    assert_eq!(engine.state().completed_task_cycles, 0);
    assert_eq!(engine.state().last_task_cycles, 2);
    assert_eq!(engine.cycle_display(), "Cycle: 2 / 2");
}

/// Task-driven with auto-switch: the next incomplete task (in priority
/// order) binds automatically and the regime stays task-driven.
#[test]
fn auto_switch_binds_next_incomplete_task() {
    let mut settings = Settings::default();
    settings.auto_check_tasks = true;
    settings.auto_switch_tasks = true;
    let mut queue = TaskQueue::default();
    let first = queue.add(Task::new("first", None, 1, Priority::High).unwrap());
    let second = queue.add(Task::new("second", None, 2, Priority::Medium).unwrap());
    queue.add(Task::new("third", None, 1, Priority::Low).unwrap());
    let mut engine = Engine::new(settings, queue, History::default());

    engine.start_task_cycles(first).unwrap();
    let events = engine.skip();
    assert_eq!(engine.mode(), Mode::LongBreak);
    assert!(engine.is_task_driven());
    assert_eq!(engine.state().active_task, Some(second));
    assert_eq!(engine.state().completed_task_cycles, 0);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::TaskSwitched { id, .. } if *id == second)));
}

/// Auto-switch with nothing left to bind clears the binding.
#[test]
fn auto_switch_with_no_incomplete_tasks_reverts() {
    let mut settings = Settings::default();
    settings.auto_check_tasks = true;
    settings.auto_switch_tasks = true;
    let mut queue = TaskQueue::default();
    let only = queue.add(Task::new("only", None, 1, Priority::Medium).unwrap());
    let mut engine = Engine::new(settings, queue, History::default());

    engine.start_task_cycles(only).unwrap();
    engine.skip();
    assert!(!engine.is_task_driven());
    assert_eq!(engine.state().completed_cycles, 1);
}

/// Crossing into the long break while on the last valid session wraps the
/// session counter to 1 with exactly one notice.
#[test]
fn session_wraparound_fires_once() {
    let mut settings = Settings::default();
    settings.cycles_per_session = 1;
    settings.session_count = 1;
    let mut engine = Engine::new(settings, TaskQueue::default(), History::default());

    // current_session == session_count: still valid, wraps only on excess.
    let events = engine.skip();
    assert_eq!(engine.mode(), Mode::LongBreak);
    assert_eq!(count_wraps(&events), 1);
    assert_eq!(engine.state().current_session, 1);
}

#[test]
fn session_equal_to_count_is_still_valid() {
    let mut settings = Settings::default();
    settings.cycles_per_session = 1;
    settings.session_count = 2;
    let mut engine = Engine::new(settings, TaskQueue::default(), History::default());

    let events = engine.skip(); // Session 1 done, now in session 2.
    assert_eq!(count_wraps(&events), 0);
    assert_eq!(engine.state().current_session, 2);

    engine.skip(); // Long break -> work.
    let events = engine.skip(); // Session 2 done: wrap.
    assert_eq!(count_wraps(&events), 1);
    assert_eq!(engine.state().current_session, 1);
}

/// Deleting the active task clears the binding and resets the counters,
/// whatever the prior state.
#[test]
fn deleting_active_task_clears_binding() {
    let mut queue = TaskQueue::default();
    let active = queue.add(Task::new("active", None, 4, Priority::Medium).unwrap());
    queue.add(Task::new("other", None, 1, Priority::Low).unwrap());
    let mut engine = Engine::new(Settings::default(), queue, History::default());

    engine.start_task_cycles(active).unwrap();
    engine.skip();
    engine.skip();
    engine.skip(); // Two task cycles in.
    assert_eq!(engine.state().completed_task_cycles, 2);

    engine.delete_task(active).unwrap();
    assert!(!engine.is_task_driven());
    assert_eq!(engine.state().completed_task_cycles, 0);
    assert_eq!(engine.state().completed_cycles, 1);
    assert_eq!(engine.queue().len(), 1);
}

#[test]
fn deleting_inactive_task_keeps_binding() {
    let mut queue = TaskQueue::default();
    let active = queue.add(Task::new("active", None, 4, Priority::Medium).unwrap());
    let other = queue.add(Task::new("other", None, 1, Priority::High).unwrap());
    let mut engine = Engine::new(Settings::default(), queue, History::default());

    engine.start_task_cycles(active).unwrap();
    engine.delete_task(other).unwrap();
    assert_eq!(engine.state().active_task, Some(active));
}

/// Manual reorder keeps the binding attached to the same task.
#[test]
fn reorder_preserves_active_task_identity() {
    let mut queue = TaskQueue::default();
    let a = queue.add(Task::new("a", None, 2, Priority::Medium).unwrap());
    queue.add(Task::new("b", None, 2, Priority::Medium).unwrap());
    queue.add(Task::new("c", None, 2, Priority::Medium).unwrap());
    let mut engine = Engine::new(Settings::default(), queue, History::default());

    engine.start_task_cycles(a).unwrap();
    engine.move_task(0, 2).unwrap();
    assert_eq!(engine.queue().position(a), Some(2));
    assert_eq!(engine.active_task().unwrap().id, a);
}

/// Persisting and reloading settings, tasks and history with no
/// intervening mutation reproduces an equivalent record set.
#[test]
fn blob_roundtrip_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ritmo.db");
    let store = Store::open_at(&path).unwrap();

    let mut settings = Settings::default();
    settings.work_minutes = 50;
    settings.auto_transitions = true;
    settings.normalize();
    store.save_settings(&settings).unwrap();

    let mut queue = TaskQueue::default();
    queue.add(Task::new("persist me", Some("round trip"), 3, Priority::High).unwrap());
    store.save_tasks(&queue).unwrap();

    let mut history = History::default();
    history.append(ritmo_core::CompletedTask::snapshot(
        &Task::new("done", None, 2, Priority::Low).unwrap(),
    ));
    store.save_history(&history).unwrap();
    drop(store);

    let store = Store::open_at(&path).unwrap();
    assert_eq!(store.load_settings().unwrap(), settings);
    let tasks = store.load_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks.tasks()[0].name, "persist me");
    assert_eq!(tasks.tasks()[0].description, "round trip");
    let history = store.load_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.records()[0].cycles, 2);
}
