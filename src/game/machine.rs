//! Exercise machine - owns a session and executes reducer effects
//!
//! [`ExerciseMachine`] is the single mutation surface of an exercise. Every
//! public operation becomes a [`Command`], goes through [`reduce`], and the
//! returned effects are carried out here:
//!
//! - `Schedule` → the cooperative [`Scheduler`], stamped with the session
//!   generation
//! - `Persist` / `DeleteSnapshot` → the [`SnapshotStore`] (failures are logged)
//! - `Emit` → the outbox, drained with [`ExerciseMachine::drain_events`]
//!
//! After every transition the session's invariants are checked; a violation
//! is logged and answered with a full reset.
//!
//! # Usage Example
//!
//! ```rust,ignore
//! let mut machine = ExerciseMachine::new(definition, ShakmatyRules, MemoryStore::new(), settings);
//! machine.load();
//! machine.attempt_move(sq("e2"), sq("e4"));
//! machine.advance_time(800); // computer reply
//! for event in machine.drain_events() { /* render */ }
//! ```

use crate::core::settings::LessonSettings;
use crate::game::events::BoardEvent;
use crate::game::reducer::{reduce, Command, Effect, ReduceContext, Task};
use crate::game::scheduler::Scheduler;
use crate::game::scripted::ScriptedMatcher;
use crate::game::session::ExerciseSession;
use crate::game::types::{ExerciseDefinition, SessionPhase, Snapshot};
use crate::storage::{snapshot_key, SnapshotStore, StoreError};
use chess_rules::{MoveAttempt, RulesProvider, Square};
use tracing::{debug, error, info, warn};

pub struct ExerciseMachine<R: RulesProvider, S: SnapshotStore> {
    definition: ExerciseDefinition,
    rules: R,
    store: S,
    settings: LessonSettings,
    key: String,
    session: ExerciseSession,
    scheduler: Scheduler<Task>,
    outbox: Vec<BoardEvent>,
}

impl<R: RulesProvider, S: SnapshotStore> ExerciseMachine<R, S> {
    /// Build a machine in the loading phase; call [`Self::load`] next
    pub fn new(definition: ExerciseDefinition, rules: R, store: S, settings: LessonSettings) -> Self {
        let session = ExerciseSession::new(&definition, &rules);
        let key = snapshot_key(&definition.id);
        Self {
            definition,
            rules,
            store,
            settings,
            key,
            session,
            scheduler: Scheduler::new(),
            outbox: Vec::new(),
        }
    }

    /// Resolve stored progress once; until then every mutation is rejected
    ///
    /// Unreadable progress starts the exercise fresh. Returns `false` if the
    /// machine was already loaded.
    pub fn load(&mut self) -> bool {
        if self.session.phase() != SessionPhase::Loading {
            return false;
        }

        let snapshot = match self.store.load(&self.key) {
            Ok(snapshot) => snapshot,
            Err(StoreError::Serialization(e)) => {
                warn!("[STORE] Stored progress '{}' is unreadable: {}", self.key, e);
                self.delete_snapshot();
                None
            }
            Err(e) => {
                warn!("[STORE] Could not read progress '{}': {}", self.key, e);
                None
            }
        };

        self.dispatch(Command::Restore(snapshot))
    }

    /// Try to play `from` → `to`
    ///
    /// Returns `true` only when the move was committed. A wrong scripted move
    /// returns `false` but still shows the incorrect status.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> bool {
        self.dispatch(Command::Attempt { from, to })
    }

    pub fn undo(&mut self) -> bool {
        self.dispatch(Command::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.dispatch(Command::Redo)
    }

    /// Drop the redo tail and resume play from the viewed position
    pub fn continue_from_here(&mut self) -> bool {
        self.dispatch(Command::ContinueFromHere)
    }

    pub fn reset(&mut self) -> bool {
        self.dispatch(Command::Reset)
    }

    pub fn toggle_hint(&mut self) -> bool {
        self.dispatch(Command::ToggleHint)
    }

    pub fn reveal_move(&mut self) -> bool {
        self.dispatch(Command::RevealMove)
    }

    pub fn set_premove(&mut self, attempt: MoveAttempt) -> bool {
        self.dispatch(Command::SetPremove(attempt))
    }

    pub fn clear_premove(&mut self) -> bool {
        self.dispatch(Command::ClearPremove)
    }

    /// Move the logical clock forward, firing every task that falls due
    ///
    /// Tasks scheduled by fired tasks run too if they land inside the window.
    /// Returns the number of tasks fired (stale ones included).
    pub fn advance_time(&mut self, ms: u64) -> usize {
        let deadline = self.scheduler.now().saturating_add(ms);
        let mut fired = 0;

        while let Some(entry) = self.scheduler.pop_due(deadline) {
            fired += 1;
            debug!(
                "[SCHEDULER] Firing #{} {:?} at {}ms",
                entry.seq, entry.task, entry.fire_at
            );
            self.dispatch(Command::Fire {
                generation: entry.generation,
                task: entry.task,
            });
        }

        self.scheduler.advance_to(deadline);
        fired
    }

    /// Fire queued tasks until none remain
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(next) = self.scheduler.next_fire_at() {
            let delay = next.saturating_sub(self.scheduler.now());
            fired += self.advance_time(delay);
        }
        fired
    }

    /// Take every queued output event
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn session(&self) -> &ExerciseSession {
        &self.session
    }

    pub fn definition(&self) -> &ExerciseDefinition {
        &self.definition
    }

    pub fn settings(&self) -> &LessonSettings {
        &self.settings
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot_key(&self) -> &str {
        &self.key
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    /// Logical time in milliseconds
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Description for the current step, or the goal's description
    pub fn description(&self) -> Option<&str> {
        if let Some(goal) = self.definition.goal.as_ref() {
            return Some(goal.description.as_str()).filter(|text| !text.is_empty());
        }
        ScriptedMatcher::new(&self.definition.moves)
            .description_for(self.session.cursor(), self.session.is_completed())
            .or(self.definition.description.as_deref())
    }

    fn dispatch(&mut self, command: Command) -> bool {
        let accepted = self.apply(&command);

        if let Err(e) = self.session.check_integrity(&self.definition) {
            error!("[EXERCISE] {} after {:?}, resetting '{}'", e, command, self.definition.id);
            self.apply(&Command::Reset);
            return false;
        }

        accepted
    }

    fn apply(&mut self, command: &Command) -> bool {
        let ctx = ReduceContext {
            rules: &self.rules,
            definition: &self.definition,
            settings: &self.settings,
        };
        let transition = reduce(&self.session, command, &ctx);
        self.session = transition.session;

        for effect in transition.effects {
            match effect {
                Effect::Schedule { delay_ms, task } => {
                    self.scheduler
                        .schedule(delay_ms, self.session.generation(), task);
                }
                Effect::Persist(snapshot) => self.save_snapshot(&snapshot),
                Effect::DeleteSnapshot => self.delete_snapshot(),
                Effect::Emit(event) => self.outbox.push(event),
            }
        }

        transition.accepted
    }

    fn save_snapshot(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.store.save(&self.key, snapshot) {
            warn!("[STORE] Failed to save progress '{}': {}", self.key, e);
        }
    }

    fn delete_snapshot(&mut self) {
        match self.store.delete(&self.key) {
            Ok(()) => info!("[STORE] Cleared progress '{}'", self.key),
            Err(e) => warn!("[STORE] Failed to clear progress '{}': {}", self.key, e),
        }
    }
}
