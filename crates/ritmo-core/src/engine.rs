//! Session orchestrator.
//!
//! The engine owns the settings, task queue, history ledger and countdown
//! clock, plus the transient session state (counters, mode, active-task
//! binding). All transitions happen on cycle completion -- the countdown
//! reaching zero, or a user skip, which is a forced completion -- or on an
//! explicit stop/reset.
//!
//! Two counting regimes exist: free-running (cycles counted against
//! `cycles_per_session`) and task-driven (cycles counted against the
//! active task's quota). The regime is task-driven exactly while a task
//! is bound.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, Tick};
use crate::error::ValidationError;
use crate::events::Event;
use crate::history::{CompletedTask, History};
use crate::mode::Mode;
use crate::settings::Settings;
use crate::task::{Task, TaskFields, TaskQueue};

/// Transient session state. Reinitialized on startup and on explicit
/// stop/reset; carried between CLI invocations as an engine snapshot but
/// never treated as durable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Mode,
    pub clock: Clock,
    /// Free-running cycle counter, 1-based: the work interval currently
    /// in progress (or just finished, during a break).
    pub completed_cycles: u32,
    /// Task-driven cycle counter: work intervals completed against the
    /// active task's quota. Resets to 0 whenever the binding changes.
    pub completed_task_cycles: u32,
    pub current_session: u32,
    /// Active task binding. When set, the regime is task-driven.
    pub active_task: Option<Uuid>,
    /// Quota of the most recently completed task, shown during the long
    /// break that follows it.
    pub last_task_cycles: u32,
}

impl SessionState {
    pub fn initial(settings: &Settings) -> Self {
        Self {
            mode: Mode::Work,
            clock: Clock::new(Mode::Work.duration_secs(settings)),
            completed_cycles: 1,
            completed_task_cycles: 0,
            current_session: 1,
            active_task: None,
            last_task_cycles: 0,
        }
    }
}

/// The session/cycle state machine.
pub struct Engine {
    settings: Settings,
    queue: TaskQueue,
    history: History,
    state: SessionState,
}

impl Engine {
    pub fn new(settings: Settings, queue: TaskQueue, history: History) -> Self {
        let state = SessionState::initial(&settings);
        Self {
            settings,
            queue,
            history,
            state,
        }
    }

    /// Rebuild an engine around a previously captured session snapshot.
    ///
    /// A bound task that no longer exists, or is already completed, cannot
    /// stay active; such a stale binding is cleared with the usual counter
    /// resets.
    pub fn with_state(
        settings: Settings,
        queue: TaskQueue,
        history: History,
        mut state: SessionState,
    ) -> Self {
        if let Some(id) = state.active_task {
            let stale = queue.task(id).map_or(true, |t| t.completed);
            if stale {
                state.active_task = None;
                state.completed_task_cycles = 0;
                state.completed_cycles = 1;
                state.last_task_cycles = 0;
            }
        }
        Self {
            settings,
            queue,
            history,
            state,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.clock.is_running()
    }

    pub fn is_task_driven(&self) -> bool {
        self.state.active_task.is_some()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.state.active_task.and_then(|id| self.queue.task(id))
    }

    /// The task that would be interrupted by starting task `id` now, if
    /// any. The caller must get user confirmation before proceeding.
    pub fn would_interrupt(&self, id: Uuid) -> Option<&Task> {
        match self.state.active_task {
            Some(active) if active != id && self.state.clock.is_running() => {
                self.queue.task(active)
            }
            _ => None,
        }
    }

    /// `Cycle: x / y` counter line, matching the current regime: the
    /// active task's quota, the last task's quota during its long break,
    /// or the free-running per-session count.
    pub fn cycle_display(&self) -> String {
        if let Some(task) = self.active_task() {
            let current = if self.state.mode == Mode::Work {
                (self.state.completed_task_cycles + 1).min(task.cycles)
            } else {
                self.state.completed_task_cycles
            };
            format!("Cycle: {} / {}", current, task.cycles)
        } else if self.state.mode == Mode::LongBreak && self.state.last_task_cycles > 0 {
            format!(
                "Cycle: {} / {}",
                self.state.last_task_cycles, self.state.last_task_cycles
            )
        } else {
            let current = if self.state.mode == Mode::Work {
                self.state.completed_cycles
            } else {
                self.state.completed_cycles.saturating_sub(1).max(1)
            };
            format!("Cycle: {} / {}", current, self.settings.cycles_per_session)
        }
    }

    pub fn session_display(&self) -> String {
        format!(
            "Session: {} / {}",
            self.state.current_session, self.settings.session_count
        )
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            running: self.state.clock.is_running(),
            remaining_secs: self.state.clock.remaining_secs(),
            total_secs: self.state.clock.total_secs(),
            progress: self.state.clock.progress(),
            cycle_display: self.cycle_display(),
            session_display: self.session_display(),
            task_driven: self.is_task_driven(),
            active_task: self.state.active_task,
            at: Utc::now(),
        }
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        if self.state.clock.start() {
            vec![Event::TimerStarted {
                mode: self.state.mode,
                remaining_secs: self.state.clock.remaining_secs(),
                at: Utc::now(),
            }]
        } else {
            Vec::new()
        }
    }

    pub fn pause(&mut self) -> Vec<Event> {
        if self.state.clock.pause() {
            vec![Event::TimerPaused {
                remaining_secs: self.state.clock.remaining_secs(),
                at: Utc::now(),
            }]
        } else {
            Vec::new()
        }
    }

    /// Advance one logical second. Expiry flows straight into
    /// [`Engine::complete_cycle`].
    pub fn tick(&mut self) -> Vec<Event> {
        match self.state.clock.tick() {
            Tick::Expired => self.complete_cycle(),
            _ => Vec::new(),
        }
    }

    /// User skip: forced completion of the current cycle.
    pub fn skip(&mut self) -> Vec<Event> {
        // Cancel the countdown before mutating state that assumes it
        // stopped.
        self.state.clock.pause();
        self.complete_cycle()
    }

    /// Full transient reset. Destructive: the caller confirms first.
    pub fn stop(&mut self) -> Vec<Event> {
        self.state.clock.pause();
        self.state.active_task = None;
        self.state.completed_task_cycles = 0;
        self.state.completed_cycles = 1;
        self.state.current_session = 1;
        self.state.last_task_cycles = 0;
        self.state.mode = Mode::Work;
        self.state
            .clock
            .reset(Mode::Work.duration_secs(&self.settings));
        vec![
            Event::TimerStopped { at: Utc::now() },
            Event::notice("Timer reset."),
        ]
    }

    /// Re-baseline all counters and force Work mode. Invoked after a
    /// settings save; the task queue, history and active binding are left
    /// untouched.
    pub fn reset_cycles(&mut self) -> Vec<Event> {
        self.state.completed_cycles = 1;
        self.state.completed_task_cycles = 0;
        self.state.current_session = 1;
        self.state.last_task_cycles = 0;
        let mut events = Vec::new();
        self.change_mode(Mode::Work, &mut events);
        events
    }

    /// Replace the settings (clamping numeric floors) and re-baseline.
    pub fn update_settings(&mut self, mut settings: Settings) -> Vec<Event> {
        settings.normalize();
        self.settings = settings;
        self.reset_cycles()
    }

    // ── Cycle completion ─────────────────────────────────────────────

    /// The central transition function, dispatched on the current mode.
    pub fn complete_cycle(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let now = Utc::now();
        events.push(Event::CycleCompleted {
            mode: self.state.mode,
            at: now,
        });
        events.push(Event::SoundCue {
            mode: self.state.mode,
            at: now,
        });

        match self.state.mode {
            Mode::Work => {
                let active = self
                    .state
                    .active_task
                    .and_then(|id| self.queue.task(id).cloned());
                match active {
                    Some(task) => self.complete_task_work(task, &mut events),
                    None => {
                        self.state.active_task = None;
                        self.complete_free_work(&mut events);
                    }
                }
            }
            Mode::ShortBreak => {
                // The break itself changes no counters.
                self.advance_to(Mode::Work, &mut events);
                if !self.settings.auto_transitions {
                    events.push(Event::notice(
                        "Short break over! Start the next work interval to advance the cycle count.",
                    ));
                }
            }
            Mode::LongBreak => {
                self.state.last_task_cycles = 0;
                self.state.completed_task_cycles = 0;
                self.state.completed_cycles = 1;
                self.advance_to(Mode::Work, &mut events);
                if !self.settings.auto_transitions {
                    events.push(Event::notice(
                        "Long break over! Start the next session to advance the cycle count.",
                    ));
                }
            }
        }
        events
    }

    fn complete_task_work(&mut self, task: Task, events: &mut Vec<Event>) {
        self.state.completed_task_cycles += 1;
        if self.state.completed_task_cycles < task.cycles {
            self.advance_to(Mode::ShortBreak, events);
            return;
        }

        // Quota met.
        if self.settings.auto_check_tasks {
            self.queue.set_completed(task.id, true);
            self.record_completion(&task, events);
        }
        self.state.last_task_cycles = task.cycles;
        self.state.current_session += 1;
        self.state.completed_task_cycles = 0;
        self.wrap_sessions(events);

        if self.settings.auto_switch_tasks {
            let start = self.queue.position(task.id).map_or(0, |i| i + 1);
            match self.queue.find_next_uncompleted(start) {
                Some(index) => {
                    let (next_id, next_name) = {
                        let next = &self.queue.tasks()[index];
                        (next.id, next.name.clone())
                    };
                    self.state.active_task = Some(next_id);
                    self.state.completed_task_cycles = 0;
                    events.push(Event::TaskSwitched {
                        id: next_id,
                        name: next_name.clone(),
                        at: Utc::now(),
                    });
                    events.push(Event::notice(format!(
                        "Task \"{}\" complete! Starting the next task: \"{next_name}\".",
                        task.name
                    )));
                }
                None => {
                    self.state.active_task = None;
                    self.state.completed_cycles = 1;
                    events.push(Event::notice(format!(
                        "Task \"{}\" complete! All tasks are done. Returning to free-running work.",
                        task.name
                    )));
                }
            }
        } else {
            self.state.active_task = None;
            self.state.completed_cycles = 1;
            events.push(Event::notice(format!(
                "Task \"{}\" complete! Returning to free-running work.",
                task.name
            )));
        }

        self.advance_to(Mode::LongBreak, events);
    }

    fn complete_free_work(&mut self, events: &mut Vec<Event>) {
        // Compare before incrementing so a session holds exactly
        // `cycles_per_session` work intervals.
        if self.state.completed_cycles < self.settings.cycles_per_session {
            self.state.completed_cycles += 1;
            self.advance_to(Mode::ShortBreak, events);
        } else {
            self.state.current_session += 1;
            self.state.completed_cycles = 1;
            self.wrap_sessions(events);
            self.advance_to(Mode::LongBreak, events);
        }
    }

    /// `current_session == session_count` is the last valid session; only
    /// exceeding it wraps, with a user-visible notice fired exactly once.
    fn wrap_sessions(&mut self, events: &mut Vec<Event>) {
        if self.state.current_session > self.settings.session_count {
            self.state.current_session = 1;
            events.push(Event::SessionsWrapped {
                session_count: self.settings.session_count,
                at: Utc::now(),
            });
        }
    }

    fn change_mode(&mut self, next: Mode, events: &mut Vec<Event>) {
        self.state.mode = next;
        let duration = next.duration_secs(&self.settings);
        self.state.clock.reset(duration);
        events.push(Event::ModeChanged {
            mode: next,
            duration_secs: duration,
            at: Utc::now(),
        });
        if let Some(msg) = next.entry_notice() {
            events.push(Event::notice(msg));
        }
    }

    fn advance_to(&mut self, next: Mode, events: &mut Vec<Event>) {
        self.change_mode(next, events);
        if self.settings.auto_transitions {
            events.extend(self.start());
        }
    }

    fn record_completion(&mut self, task: &Task, events: &mut Vec<Event>) {
        self.history.append(CompletedTask::snapshot(task));
        events.push(Event::TaskCompleted {
            id: task.id,
            name: task.name.clone(),
            at: Utc::now(),
        });
        if self.settings.notify_on_task_complete {
            events.push(Event::notice(format!("Task \"{}\" complete!", task.name)));
        }
    }

    // ── Task commands ────────────────────────────────────────────────

    /// Bind a task and start its work cycles. If another task is running,
    /// the caller must have confirmed the interruption (see
    /// [`Engine::would_interrupt`]); the running countdown is paused first.
    pub fn start_task_cycles(&mut self, id: Uuid) -> Result<Vec<Event>, ValidationError> {
        let task = self
            .queue
            .task(id)
            .cloned()
            .ok_or(ValidationError::UnknownTask(id))?;
        let mut events = Vec::new();
        if self.state.clock.is_running() {
            events.extend(self.pause());
        }
        self.state.active_task = Some(id);
        self.state.completed_task_cycles = 0;
        self.state.completed_cycles = 1;
        self.state.current_session = 1;
        self.state.last_task_cycles = 0;
        self.change_mode(Mode::Work, &mut events);
        events.extend(self.start());
        events.push(Event::TaskStarted {
            id,
            name: task.name.clone(),
            at: Utc::now(),
        });
        events.push(Event::notice(format!("Starting task: {}", task.name)));
        Ok(events)
    }

    pub fn add_task(&mut self, task: Task) -> Uuid {
        self.queue.add(task)
    }

    pub fn edit_task(&mut self, id: Uuid, fields: TaskFields) -> Result<(), ValidationError> {
        self.queue.edit(id, fields)
    }

    /// Manual reorder; the active binding survives by identity.
    pub fn move_task(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        self.queue.reorder(from, to)
    }

    /// Delete a task. Deleting the active task clears the binding and
    /// resets the cycle counters.
    pub fn delete_task(&mut self, id: Uuid) -> Result<(), ValidationError> {
        self.queue.delete(id)?;
        if self.state.active_task == Some(id) {
            self.clear_active_binding();
        }
        Ok(())
    }

    /// Toggle completion. Completing appends a history record (history is
    /// independent and append-only: unchecking removes nothing) and, if
    /// the task was active, clears the binding.
    pub fn toggle_task(&mut self, id: Uuid) -> Result<Vec<Event>, ValidationError> {
        let snapshot = self
            .queue
            .task(id)
            .cloned()
            .ok_or(ValidationError::UnknownTask(id))?;
        let completed = self.queue.toggle_completion(id)?;
        let mut events = Vec::new();
        if completed {
            self.record_completion(&snapshot, &mut events);
            if self.state.active_task == Some(id) {
                self.clear_active_binding();
            }
        }
        Ok(events)
    }

    /// Wipe the history ledger. Destructive: the caller confirms first.
    pub fn clear_history(&mut self) -> Vec<Event> {
        self.history.clear();
        vec![Event::notice("History cleared.")]
    }

    fn clear_active_binding(&mut self) {
        self.state.active_task = None;
        self.state.completed_task_cycles = 0;
        self.state.completed_cycles = 1;
        self.state.last_task_cycles = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn engine() -> Engine {
        Engine::new(Settings::default(), TaskQueue::default(), History::default())
    }

    fn engine_with(settings: Settings) -> Engine {
        Engine::new(settings, TaskQueue::default(), History::default())
    }

    #[test]
    fn initial_state() {
        let e = engine();
        assert_eq!(e.mode(), Mode::Work);
        assert!(!e.is_running());
        assert!(!e.is_task_driven());
        assert_eq!(e.state().completed_cycles, 1);
        assert_eq!(e.state().completed_task_cycles, 0);
        assert_eq!(e.state().current_session, 1);
        assert_eq!(e.state().clock.remaining_secs(), 25 * 60);
    }

    #[test]
    fn start_is_idempotent() {
        let mut e = engine();
        assert_eq!(e.start().len(), 1);
        assert!(e.start().is_empty());
        assert!(e.is_running());
    }

    #[test]
    fn work_expiry_enters_short_break() {
        let mut e = engine();
        e.start();
        let events = e.skip();
        assert_eq!(e.mode(), Mode::ShortBreak);
        assert_eq!(e.state().completed_cycles, 2);
        // Manual mode: clock left paused.
        assert!(!e.is_running());
        assert!(events
            .iter()
            .any(|ev| matches!(ev, Event::SoundCue { mode: Mode::Work, .. })));
        assert!(events
            .iter()
            .any(|ev| ev.message().is_some_and(|m| m.contains("short break"))));
    }

    #[test]
    fn auto_transitions_restart_the_clock() {
        let mut settings = Settings::default();
        settings.auto_transitions = true;
        let mut e = engine_with(settings);
        e.start();
        e.skip();
        assert_eq!(e.mode(), Mode::ShortBreak);
        assert!(e.is_running());
    }

    #[test]
    fn short_break_returns_to_work_without_counter_changes() {
        let mut e = engine();
        e.skip(); // Work -> ShortBreak, cycles now 2.
        let before = e.state().completed_cycles;
        e.skip(); // ShortBreak -> Work.
        assert_eq!(e.mode(), Mode::Work);
        assert_eq!(e.state().completed_cycles, before);
    }

    #[test]
    fn long_break_exit_resets_counters() {
        let mut settings = Settings::default();
        settings.cycles_per_session = 1;
        let mut e = engine_with(settings);
        e.skip();
        assert_eq!(e.mode(), Mode::LongBreak);
        e.skip();
        assert_eq!(e.mode(), Mode::Work);
        assert_eq!(e.state().completed_cycles, 1);
        assert_eq!(e.state().completed_task_cycles, 0);
        assert_eq!(e.state().last_task_cycles, 0);
    }

    #[test]
    fn task_quota_not_met_keeps_regime() {
        let mut e = engine();
        let id = e.add_task(Task::new("big", None, 3, Priority::Medium).unwrap());
        e.start_task_cycles(id).unwrap();
        e.skip();
        assert_eq!(e.mode(), Mode::ShortBreak);
        assert!(e.is_task_driven());
        assert_eq!(e.state().completed_task_cycles, 1);
        assert!(!e.queue().task(id).unwrap().completed);
        assert!(e.history().is_empty());
    }

    #[test]
    fn quota_met_without_auto_check_leaves_task_incomplete() {
        let mut e = engine();
        let id = e.add_task(Task::new("t", None, 1, Priority::Medium).unwrap());
        e.start_task_cycles(id).unwrap();
        e.skip();
        assert_eq!(e.mode(), Mode::LongBreak);
        assert!(!e.queue().task(id).unwrap().completed);
        assert!(e.history().is_empty());
        // Regime reverted regardless.
        assert!(!e.is_task_driven());
    }

    #[test]
    fn start_task_resets_session_and_binds() {
        let mut e = engine();
        let id = e.add_task(Task::new("t", None, 2, Priority::High).unwrap());
        let events = e.start_task_cycles(id).unwrap();
        assert!(e.is_running());
        assert_eq!(e.mode(), Mode::Work);
        assert!(e.is_task_driven());
        assert_eq!(e.state().current_session, 1);
        assert!(events
            .iter()
            .any(|ev| matches!(ev, Event::TaskStarted { .. })));
    }

    #[test]
    fn would_interrupt_only_fires_for_other_running_task() {
        let mut e = engine();
        let a = e.add_task(Task::new("a", None, 2, Priority::Medium).unwrap());
        let b = e.add_task(Task::new("b", None, 2, Priority::Medium).unwrap());
        assert!(e.would_interrupt(a).is_none());
        e.start_task_cycles(a).unwrap();
        assert!(e.would_interrupt(a).is_none());
        assert_eq!(e.would_interrupt(b).unwrap().id, a);
        e.pause();
        assert!(e.would_interrupt(b).is_none());
    }

    #[test]
    fn stop_resets_everything_transient() {
        let mut e = engine();
        let id = e.add_task(Task::new("t", None, 5, Priority::Medium).unwrap());
        e.start_task_cycles(id).unwrap();
        e.skip();
        let events = e.stop();
        assert_eq!(e.mode(), Mode::Work);
        assert!(!e.is_running());
        assert!(!e.is_task_driven());
        assert_eq!(e.state().completed_cycles, 1);
        assert_eq!(e.state().completed_task_cycles, 0);
        assert_eq!(e.state().current_session, 1);
        assert!(events
            .iter()
            .any(|ev| matches!(ev, Event::TimerStopped { .. })));
        // The queue itself is untouched.
        assert_eq!(e.queue().len(), 1);
    }

    #[test]
    fn reset_cycles_keeps_active_binding() {
        let mut e = engine();
        let id = e.add_task(Task::new("t", None, 4, Priority::Medium).unwrap());
        e.start_task_cycles(id).unwrap();
        e.reset_cycles();
        assert!(e.is_task_driven());
        assert_eq!(e.mode(), Mode::Work);
        assert_eq!(e.state().completed_task_cycles, 0);
        assert!(!e.is_running());
    }

    #[test]
    fn update_settings_clamps_and_rebaselines() {
        let mut e = engine();
        let mut s = Settings::default();
        s.work_minutes = 0;
        s.session_count = 0;
        e.update_settings(s);
        assert_eq!(e.settings().work_minutes, 1);
        assert_eq!(e.settings().session_count, 1);
        assert_eq!(e.state().clock.total_secs(), 60);
        assert_eq!(e.state().current_session, 1);
    }

    #[test]
    fn toggling_active_task_complete_clears_binding() {
        let mut e = engine();
        let id = e.add_task(Task::new("t", None, 3, Priority::Medium).unwrap());
        e.start_task_cycles(id).unwrap();
        let events = e.toggle_task(id).unwrap();
        assert!(!e.is_task_driven());
        assert_eq!(e.state().completed_task_cycles, 0);
        assert_eq!(e.state().completed_cycles, 1);
        assert_eq!(e.history().len(), 1);
        assert!(events
            .iter()
            .any(|ev| matches!(ev, Event::TaskCompleted { .. })));
        // Unchecking removes nothing from history.
        e.toggle_task(id).unwrap();
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn stale_snapshot_binding_is_cleared() {
        let mut queue = TaskQueue::default();
        let id = queue.add(Task::new("gone", None, 1, Priority::Medium).unwrap());
        let settings = Settings::default();
        let mut state = SessionState::initial(&settings);
        state.active_task = Some(id);
        state.completed_task_cycles = 2;
        // Task completed behind the snapshot's back.
        queue.toggle_completion(id).unwrap();
        let e = Engine::with_state(settings, queue, History::default(), state);
        assert!(!e.is_task_driven());
        assert_eq!(e.state().completed_task_cycles, 0);
    }

    #[test]
    fn cycle_display_tracks_regime() {
        let mut e = engine();
        assert_eq!(e.cycle_display(), "Cycle: 1 / 4");
        let id = e.add_task(Task::new("t", None, 3, Priority::Medium).unwrap());
        e.start_task_cycles(id).unwrap();
        assert_eq!(e.cycle_display(), "Cycle: 1 / 3");
        e.skip();
        // In the short break, the completed count shows.
        assert_eq!(e.cycle_display(), "Cycle: 1 / 3");
        e.skip();
        assert_eq!(e.cycle_display(), "Cycle: 2 / 3");
    }
}
