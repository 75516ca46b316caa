//! The exercise reducer
//!
//! `reduce(&session, &command, &ctx)` is the only place session state changes.
//! It is pure: the rules provider is consulted, nothing else is touched, and
//! every side effect comes back as an [`Effect`] for the machine to execute.
//!
//! # Event Ordering
//!
//! Within one transition the effects are ordered as:
//! 1. State-change events (position, status, quality, goal result, hint,
//!    arrow, premove), derived by comparing the old and new session
//! 2. Cues (`Sound`, `Completed`, `Celebrate`) in the order they happened
//! 3. Persistence (`Persist` / `DeleteSnapshot`)
//! 4. Scheduled tasks, in scheduling order
//!
//! so a computer reply is always scheduled after the user move's effects, and
//! a premove after the reply's.

use crate::core::settings::LessonSettings;
use crate::game::error::{ExerciseError, ExerciseResult};
use crate::game::events::{BoardEvent, SoundCue};
use crate::game::goal::{GoalEvaluator, STALEMATE_MESSAGE};
use crate::game::scripted::{ScriptedMatcher, StepLayout, StepVerdict};
use crate::game::session::{checked_start, ExerciseSession, LiveEdge};
use crate::game::types::{
    ExerciseDefinition, ExerciseMode, GoalResult, MoveStatus, SessionPhase, Snapshot,
};
use crate::storage::snapshot_key;
use chess_rules::{MoveAttempt, MoveResult, PieceKind, RulesProvider, Square};
use tracing::{debug, error, info, trace, warn};

/// Delayed work, fired by the scheduler as [`Command::Fire`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Clear the move badge unless a newer one replaced it
    ClearStatus { token: u64 },
    /// Snap a wrong move back to the committed position
    RevertIncorrect,
    /// Play the scripted computer answer
    ComputerReply { san: String },
    /// Play a move queued while the reply was pending
    ExecutePremove { attempt: MoveAttempt },
    /// Clear the quality comment unless a newer one replaced it
    ClearQuality { token: u64 },
    /// Play the confetti cue once the completion has settled
    Celebrate,
}

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve stored progress (`None` when there is none)
    Restore(Option<Snapshot>),
    /// Play the piece on `from` to `to`
    Attempt { from: Square, to: Square },
    /// Step back one scripted step, trainee move or ply
    Undo,
    /// Step forward again through the redo tail
    Redo,
    /// Drop the redo tail and play on from the viewed position
    ContinueFromHere,
    /// Start over from the exercise's start and forget stored progress
    Reset,
    /// Show or hide the exercise hint
    ToggleHint,
    /// Show or hide the expected move as an arrow
    RevealMove,
    /// Queue a move to play once the pending reply lands
    SetPremove(MoveAttempt),
    /// Drop the queued move
    ClearPremove,
    /// Run a scheduled task stamped with the generation it was queued in
    Fire { generation: u64, task: Task },
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Schedule { delay_ms: u64, task: Task },
    Persist(Snapshot),
    DeleteSnapshot,
    Emit(BoardEvent),
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub session: ExerciseSession,
    /// Whether the command did what it asked (a move committed, a task ran)
    pub accepted: bool,
    pub effects: Vec<Effect>,
}

/// Read-only inputs of a transition
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a, R> {
    pub rules: &'a R,
    pub definition: &'a ExerciseDefinition,
    pub settings: &'a LessonSettings,
}

pub fn reduce<R: RulesProvider>(
    session: &ExerciseSession,
    command: &Command,
    ctx: &ReduceContext<'_, R>,
) -> Transition {
    let mut reduction = Reduction {
        ctx,
        session: session.clone(),
        cues: Vec::new(),
        persistence: Vec::new(),
        schedules: Vec::new(),
        announce_position: false,
    };

    let accepted = match command {
        Command::Restore(snapshot) => reduction.restore(snapshot.as_ref()),
        Command::Attempt { from, to } => reduction.attempt(*from, *to),
        Command::Undo => reduction.undo(),
        Command::Redo => reduction.redo(),
        Command::ContinueFromHere => reduction.continue_from_here(),
        Command::Reset => reduction.reset(),
        Command::ToggleHint => reduction.toggle_hint(),
        Command::RevealMove => reduction.reveal_move(),
        Command::SetPremove(attempt) => reduction.set_premove(*attempt),
        Command::ClearPremove => reduction.clear_premove(),
        Command::Fire { generation, task } => reduction.fire(*generation, task),
    };

    reduction.finish(session, accepted)
}

struct Reduction<'c, 'a, R> {
    ctx: &'c ReduceContext<'a, R>,
    session: ExerciseSession,
    cues: Vec<BoardEvent>,
    persistence: Vec<Effect>,
    schedules: Vec<Effect>,
    /// Emit the position even if it did not change (initial load)
    announce_position: bool,
}

impl<'a, R: RulesProvider> Reduction<'_, 'a, R> {
    fn finish(self, before: &ExerciseSession, accepted: bool) -> Transition {
        let after = &self.session;
        let mut effects = Vec::new();
        let mut emit = |event: BoardEvent| effects.push(Effect::Emit(event));

        if self.announce_position || before.displayed_position() != after.displayed_position() {
            emit(BoardEvent::PositionChanged(after.displayed_position().clone()));
        }
        if before.status != after.status {
            emit(BoardEvent::StatusChanged(after.status));
        }
        if before.move_quality != after.move_quality {
            emit(BoardEvent::MoveQualityChanged(after.move_quality));
        }
        if before.goal_result != after.goal_result {
            emit(BoardEvent::GoalResultChanged(after.goal_result.clone()));
        }
        if before.hint_visible != after.hint_visible {
            let hint = after
                .hint_visible
                .then(|| self.ctx.definition.hint.clone())
                .flatten();
            emit(BoardEvent::HintChanged(hint));
        }
        if before.revealed != after.revealed {
            emit(BoardEvent::MoveRevealed(after.revealed));
        }
        if before.premove != after.premove {
            emit(BoardEvent::PremoveChanged(after.premove));
        }

        effects.extend(self.cues.into_iter().map(Effect::Emit));
        effects.extend(self.persistence);
        effects.extend(self.schedules);

        Transition {
            session: self.session,
            accepted,
            effects,
        }
    }

    fn matcher(&self) -> ScriptedMatcher<'a> {
        let definition: &'a ExerciseDefinition = self.ctx.definition;
        ScriptedMatcher::new(&definition.moves)
    }

    fn schedule(&mut self, delay_ms: u64, task: Task) {
        self.schedules.push(Effect::Schedule { delay_ms, task });
    }

    fn persist(&mut self) {
        self.persistence.push(Effect::Persist(self.session.snapshot()));
    }

    fn is_loading(&self) -> bool {
        self.session.phase == SessionPhase::Loading
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    fn restore(&mut self, snapshot: Option<&Snapshot>) -> bool {
        if !self.is_loading() {
            debug!("[EXERCISE] Ignoring restore outside of loading");
            return false;
        }

        self.session.generation += 1;
        self.session.phase = SessionPhase::Active;
        self.announce_position = true;

        let Some(snapshot) = snapshot else {
            info!(
                "[EXERCISE] Starting '{}' fresh ({:?})",
                self.ctx.definition.id, self.session.mode
            );
            return true;
        };

        let layout = match self.validate_snapshot(snapshot) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("[EXERCISE] Discarding stored progress: {}", e);
                self.persistence.push(Effect::DeleteSnapshot);
                return true;
            }
        };

        self.session.history.restore(&snapshot.history);
        self.session.position = self.session.history.current().clone();
        self.session.completed = snapshot.completed;
        self.session.ever_completed = snapshot.completed;
        self.session.cursor = match self.session.mode {
            ExerciseMode::FreePlay => self.session.history.committed_len() - 1,
            _ => snapshot.cursor,
        };

        if snapshot.completed {
            self.session.phase = SessionPhase::Completed;
            if let Some(config) = self.ctx.definition.goal.as_ref() {
                self.session.goal_result = GoalEvaluator::new(config).evaluate_final(
                    self.ctx.rules,
                    &self.session.position,
                    count(self.session.cursor),
                );
            }
        }

        if let Some(layout) = layout {
            self.session.step_starts = layout.starts;
            if let Some(san) = layout.pending_reply {
                debug!("[EXERCISE] Stored progress still owes the reply {}", san);
                self.session.awaiting_reply = true;
                self.schedule(
                    self.ctx.settings.timings.computer_reply_ms,
                    Task::ComputerReply { san },
                );
            }
        }

        info!(
            "[EXERCISE] Restored '{}' at cursor {} ({} positions, completed: {})",
            self.ctx.definition.id,
            self.session.cursor,
            snapshot.history.len(),
            snapshot.completed
        );
        true
    }

    /// Check stored progress against the exercise
    ///
    /// Scripted progress also yields where its steps sit in the history.
    fn validate_snapshot(&self, snapshot: &Snapshot) -> ExerciseResult<Option<StepLayout>> {
        let corrupt = |reason: String| ExerciseError::SnapshotCorrupt {
            key: snapshot_key(&self.ctx.definition.id),
            reason,
        };

        let (Some(first), Some(last)) = (snapshot.history.first(), snapshot.history.last()) else {
            return Err(corrupt("empty history".to_string()));
        };
        if first != &checked_start(self.ctx.definition, self.ctx.rules) {
            return Err(corrupt(format!(
                "history begins at {first}, not the exercise start"
            )));
        }
        if let Err(e) = self.ctx.rules.validate(last) {
            return Err(corrupt(format!("final position is invalid: {e}")));
        }

        let plies = snapshot.history.len() - 1;
        match self.session.mode {
            ExerciseMode::Scripted => {
                let steps = self.ctx.definition.moves.len();
                if snapshot.cursor > steps || snapshot.cursor > plies {
                    return Err(corrupt(format!(
                        "cursor {} out of range ({} steps, {} plies)",
                        snapshot.cursor, steps, plies
                    )));
                }
                if snapshot.completed != (snapshot.cursor == steps) {
                    return Err(corrupt(format!(
                        "completed is {} at cursor {}/{}",
                        snapshot.completed, snapshot.cursor, steps
                    )));
                }
                let layout = self
                    .matcher()
                    .layout(self.ctx.rules, &snapshot.history, snapshot.cursor)
                    .ok_or_else(|| {
                        corrupt(format!(
                            "{} plies do not match the first {} steps",
                            plies, snapshot.cursor
                        ))
                    })?;
                return Ok(Some(layout));
            }
            ExerciseMode::Goal => {
                if snapshot.cursor > plies {
                    return Err(corrupt(format!(
                        "cursor {} out of range ({} plies)",
                        snapshot.cursor, plies
                    )));
                }
                if snapshot.completed {
                    let config = self.ctx.definition.goal.as_ref();
                    let result = config.and_then(|config| {
                        GoalEvaluator::new(config).evaluate_final(
                            self.ctx.rules,
                            last,
                            count(snapshot.cursor),
                        )
                    });
                    if result.is_none() {
                        return Err(corrupt("completed but the final position ends nothing".to_string()));
                    }
                }
            }
            ExerciseMode::FreePlay => {
                if snapshot.completed {
                    return Err(corrupt("free play never completes".to_string()));
                }
            }
        }

        Ok(None)
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    fn attempt(&mut self, from: Square, to: Square) -> bool {
        let session = &self.session;
        if session.phase != SessionPhase::Active {
            debug!("[EXERCISE] Move {}-{} rejected in {:?}", from, to, session.phase);
            return false;
        }
        if session.is_view_mode() {
            debug!("[EXERCISE] Move {}-{} rejected while viewing history", from, to);
            return false;
        }
        if session.is_reverting() {
            debug!("[EXERCISE] Move {}-{} rejected while reverting", from, to);
            return false;
        }
        if session.awaiting_reply {
            if self.ctx.settings.board.allow_premove {
                debug!("[EXERCISE] Queued premove {}-{}", from, to);
                self.session.premove = Some(MoveAttempt::new(from, to));
            }
            return false;
        }

        let attempt = self.infer_promotion(from, to);
        let Some(result) = self.ctx.rules.apply_move(&self.session.position, &attempt) else {
            debug!("[EXERCISE] Illegal move {}-{}", from, to);
            return false;
        };

        match self.session.mode {
            ExerciseMode::Scripted => self.scripted_move(result),
            ExerciseMode::Goal => self.goal_move(result),
            ExerciseMode::FreePlay => {
                debug!("[EXERCISE] Free move {}", result.san);
                self.commit(&result);
                self.session.cursor = self.session.history.committed_len() - 1;
                self.persist();
                true
            }
        }
    }

    /// A pawn of the side to move reaching its last rank becomes a queen
    fn infer_promotion(&self, from: Square, to: Square) -> MoveAttempt {
        let attempt = MoveAttempt::new(from, to);
        let position = &self.session.position;

        match (
            self.ctx.rules.piece_at(position, from),
            self.ctx.rules.turn(position),
        ) {
            (Some((side, PieceKind::Pawn)), Some(turn))
                if side == turn && to.rank() == side.promotion_rank() =>
            {
                attempt.with_promotion(PieceKind::Queen)
            }
            _ => attempt,
        }
    }

    fn commit(&mut self, result: &MoveResult) {
        self.session.history.commit(result.position.clone());
        self.session.position = result.position.clone();
        self.session.last_move = Some((result.from, result.to));
        self.session.revealed = None;
        if self.ctx.settings.board.play_sounds {
            self.cues.push(BoardEvent::Sound(SoundCue::for_move(result)));
        }
    }

    fn set_status(&mut self, status: MoveStatus) {
        self.session.status = status;
        self.session.status_token += 1;
        let token = self.session.status_token;
        self.schedule(
            self.ctx.settings.timings.status_clear_ms,
            Task::ClearStatus { token },
        );
    }

    fn complete(&mut self) {
        self.session.completed = true;
        self.session.ever_completed = true;
        self.session.phase = SessionPhase::Completed;
        self.cues.push(BoardEvent::Completed);
        if self.ctx.settings.board.show_confetti {
            self.schedule(self.ctx.settings.timings.celebrate_delay_ms, Task::Celebrate);
        }
        info!(
            "[EXERCISE] Completed '{}' after {} positions",
            self.ctx.definition.id,
            self.session.history.committed_len()
        );
    }

    fn scripted_move(&mut self, result: MoveResult) -> bool {
        let cursor = self.session.cursor;
        match self.matcher().evaluate(cursor, &result) {
            StepVerdict::Incorrect => {
                debug!(
                    "[EXERCISE] {} is not step {} ({:?})",
                    result.san,
                    cursor + 1,
                    self.matcher().expected_move(cursor)
                );
                self.session.display = Some(result.position);
                self.session.wrong_attempts += 1;
                self.set_status(MoveStatus::Incorrect);
                self.schedule(
                    self.ctx.settings.timings.incorrect_revert_ms,
                    Task::RevertIncorrect,
                );
                false
            }
            StepVerdict::Correct { reply, completes } => {
                debug!("[EXERCISE] Step {} solved with {}", cursor + 1, result.san);
                self.session.step_starts.truncate(cursor);
                self.session
                    .step_starts
                    .push(self.session.history.committed_len() - 1);
                self.commit(&result);
                self.session.cursor = cursor + 1;
                self.set_status(MoveStatus::Correct);
                if let Some(san) = reply {
                    self.session.awaiting_reply = true;
                    self.schedule(
                        self.ctx.settings.timings.computer_reply_ms,
                        Task::ComputerReply { san },
                    );
                }
                if completes {
                    self.complete();
                }
                self.persist();
                true
            }
        }
    }

    fn goal_move(&mut self, result: MoveResult) -> bool {
        let ctx = self.ctx;
        let Some(config) = ctx.definition.goal.as_ref() else {
            return false;
        };
        let evaluator = GoalEvaluator::new(config);
        let rules = ctx.rules;

        let mover = rules.turn(&self.session.position);
        let edge_before = evaluator.material_edge(rules, &self.session.position);
        self.commit(&result);

        let outcome = if mover == Some(evaluator.trainee()) {
            self.session.cursor += 1;
            let moves = count(self.session.cursor);

            let edge_after = evaluator.material_edge(rules, &result.position);
            let quality = evaluator.quality(edge_before, edge_after, result.is_checkmate);
            debug!(
                "[EXERCISE] Trainee move {} ({}): {:?}",
                moves, result.san, quality
            );
            self.session.move_quality = Some(quality);
            self.session.quality_token += 1;
            let token = self.session.quality_token;
            self.schedule(ctx.settings.timings.quality_clear_ms, Task::ClearQuality { token });

            evaluator.after_trainee_move(rules, &result, moves, self.session.help_used)
        } else {
            debug!("[EXERCISE] Opponent move {}", result.san);
            evaluator.after_opponent_move(&result).or_else(|| {
                rules
                    .is_stalemate(&result.position)
                    .then(|| GoalResult::new(0, STALEMATE_MESSAGE))
            })
        };

        if let Some(goal_result) = outcome {
            info!(
                "[EXERCISE] Goal finished: {} star(s), {}",
                goal_result.stars, goal_result.message
            );
            self.session.goal_result = Some(goal_result);
            self.complete();
        }

        self.persist();
        true
    }

    // ------------------------------------------------------------------
    // History navigation
    // ------------------------------------------------------------------

    /// Drop transient feedback and cancel outstanding tasks
    fn leave_present(&mut self) {
        self.session.status = MoveStatus::None;
        self.session.move_quality = None;
        self.session.display = None;
        self.session.awaiting_reply = false;
        self.session.premove = None;
        self.session.revealed = None;
        self.session.last_move = None;
        self.session.generation += 1;
    }

    fn undo(&mut self) -> bool {
        if self.is_loading() || self.session.history.committed_len() <= 1 {
            return false;
        }
        if self.session.mode == ExerciseMode::Scripted && self.session.cursor == 0 {
            return false;
        }

        if !self.session.is_view_mode() {
            let pending_reply = if self.session.awaiting_reply {
                self.session
                    .cursor
                    .checked_sub(1)
                    .and_then(|i| self.matcher().reply_for(i))
                    .map(str::to_string)
            } else {
                None
            };
            self.session.live_edge = Some(LiveEdge {
                completed: self.session.completed,
                goal_result: self.session.goal_result.clone(),
                pending_reply,
            });
        }

        match self.session.mode {
            ExerciseMode::Scripted => {
                let cursor = self.session.cursor - 1;
                let start = self.session.step_starts.get(cursor).copied().unwrap_or(0);
                let span = (self.session.history.committed_len() - 1).saturating_sub(start);
                self.session.history.undo(span);
                self.session.cursor = cursor;
            }
            ExerciseMode::Goal => {
                self.session.history.undo(1);
                let trainee = self.ctx.definition.goal.as_ref().map(|g| g.side_to_move);
                let mover = self.ctx.rules.turn(self.session.history.current());
                if mover.is_some() && mover == trainee {
                    self.session.cursor = self.session.cursor.saturating_sub(1);
                }
            }
            ExerciseMode::FreePlay => {
                self.session.history.undo(1);
                self.session.cursor = self.session.history.committed_len() - 1;
            }
        }

        self.session.position = self.session.history.current().clone();
        self.session.completed = false;
        self.session.phase = SessionPhase::Active;
        self.session.goal_result = None;
        self.leave_present();
        self.persist();
        true
    }

    fn redo(&mut self) -> bool {
        if self.is_loading() || !self.session.is_view_mode() {
            return false;
        }

        match self.session.mode {
            ExerciseMode::Scripted => {
                let history = &self.session.history;
                let end = self
                    .session
                    .step_starts
                    .get(self.session.cursor + 1)
                    .copied()
                    .unwrap_or(history.full_len() - 1);
                let span = end.saturating_sub(history.committed_len() - 1);
                self.session.history.redo(span);
                self.session.cursor = (self.session.cursor + 1).min(self.matcher().len());
            }
            ExerciseMode::Goal => {
                let trainee = self.ctx.definition.goal.as_ref().map(|g| g.side_to_move);
                let mover = self.ctx.rules.turn(self.session.history.current());
                self.session.history.redo(1);
                if mover.is_some() && mover == trainee {
                    self.session.cursor += 1;
                }
            }
            ExerciseMode::FreePlay => {
                self.session.history.redo(1);
                self.session.cursor = self.session.history.committed_len() - 1;
            }
        }

        self.session.position = self.session.history.current().clone();
        self.leave_present();

        if !self.session.is_view_mode() {
            if let Some(edge) = self.session.live_edge.take() {
                self.session.completed = edge.completed;
                self.session.phase = if edge.completed {
                    SessionPhase::Completed
                } else {
                    SessionPhase::Active
                };
                self.session.goal_result = edge.goal_result;
                if let Some(san) = edge.pending_reply {
                    self.session.awaiting_reply = true;
                    self.schedule(
                        self.ctx.settings.timings.computer_reply_ms,
                        Task::ComputerReply { san },
                    );
                }
            }
        }

        self.persist();
        true
    }

    fn continue_from_here(&mut self) -> bool {
        if self.is_loading() || !self.session.is_view_mode() {
            return false;
        }

        debug!(
            "[EXERCISE] Continuing from position {} of {}",
            self.session.history.committed_len(),
            self.session.history.full_len()
        );
        self.session.history.truncate_future();
        self.session.step_starts.truncate(self.session.cursor);
        self.session.live_edge = None;
        self.leave_present();
        self.persist();
        true
    }

    fn reset(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }

        info!("[EXERCISE] Reset '{}'", self.ctx.definition.id);
        let start = checked_start(self.ctx.definition, self.ctx.rules);
        let mut fresh = ExerciseSession::fresh(self.session.mode, start, self.session.generation + 1);
        fresh.phase = SessionPhase::Active;
        self.session = fresh;
        self.persistence.push(Effect::DeleteSnapshot);
        true
    }

    // ------------------------------------------------------------------
    // Help and premoves
    // ------------------------------------------------------------------

    fn toggle_hint(&mut self) -> bool {
        if self.is_loading() || self.ctx.definition.hint.is_none() {
            return false;
        }

        self.session.hint_visible = !self.session.hint_visible;
        if self.session.hint_visible && self.session.mode == ExerciseMode::Goal {
            self.session.help_used = true;
        }
        true
    }

    fn reveal_move(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }

        match self.session.mode {
            ExerciseMode::Scripted => {
                if self.session.revealed.take().is_some() {
                    return true;
                }
                let arrow = self.matcher().reveal(
                    self.ctx.rules,
                    &self.session.position,
                    self.session.cursor,
                );
                self.session.revealed = arrow;
                arrow.is_some()
            }
            ExerciseMode::Goal => {
                self.session.help_used = true;
                true
            }
            ExerciseMode::FreePlay => false,
        }
    }

    fn set_premove(&mut self, attempt: MoveAttempt) -> bool {
        if !self.ctx.settings.board.allow_premove
            || self.session.phase != SessionPhase::Active
            || self.session.is_view_mode()
        {
            return false;
        }
        self.session.premove = Some(attempt);
        true
    }

    fn clear_premove(&mut self) -> bool {
        self.session.premove.take().is_some()
    }

    // ------------------------------------------------------------------
    // Scheduled tasks
    // ------------------------------------------------------------------

    fn fire(&mut self, generation: u64, task: &Task) -> bool {
        if generation != self.session.generation {
            trace!(
                "[SCHEDULER] Dropping stale {:?} (gen {} != {})",
                task,
                generation,
                self.session.generation
            );
            return false;
        }

        match task {
            Task::ClearStatus { token } => {
                if *token != self.session.status_token || self.session.status == MoveStatus::None {
                    return false;
                }
                self.session.status = MoveStatus::None;
                true
            }
            Task::RevertIncorrect => self.session.display.take().is_some(),
            Task::ComputerReply { san } => self.computer_reply(san),
            Task::ExecutePremove { attempt } => {
                if self.session.premove != Some(*attempt) {
                    return false;
                }
                self.session.premove = None;
                self.attempt(attempt.from, attempt.to)
            }
            Task::ClearQuality { token } => {
                if *token != self.session.quality_token || self.session.move_quality.is_none() {
                    return false;
                }
                self.session.move_quality = None;
                true
            }
            Task::Celebrate => {
                self.cues.push(BoardEvent::Celebrate);
                true
            }
        }
    }

    fn computer_reply(&mut self, san: &str) -> bool {
        if !self.session.awaiting_reply {
            return false;
        }
        self.session.awaiting_reply = false;

        let Some(result) = self.ctx.rules.apply_san(&self.session.position, san) else {
            error!(
                "[EXERCISE] Scripted reply '{}' is illegal in {} ('{}'), skipping",
                san,
                self.session.position,
                self.ctx.definition.id
            );
            self.session.premove = None;
            return false;
        };

        debug!("[EXERCISE] Computer replies {}", result.san);
        self.commit(&result);
        self.persist();

        if let Some(attempt) = self.session.premove {
            self.schedule(
                self.ctx.settings.timings.premove_delay_ms,
                Task::ExecutePremove { attempt },
            );
        }
        true
    }
}

/// Move counts are small; saturate rather than wrap
fn count(cursor: usize) -> u32 {
    u32::try_from(cursor).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Position, ShakmatyRules};

    fn sq(text: &str) -> Square {
        text.parse().unwrap()
    }

    fn definition() -> ExerciseDefinition {
        ExerciseDefinition::from_json(
            r#"{
                "id": "open-e4",
                "startPosition": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "moves": [
                    { "id": 1, "correctMove": "e4", "computerMove": "e5" },
                    { "id": 2, "correctMove": "Nf3" }
                ]
            }"#,
        )
        .unwrap()
    }

    /// Run `command` against `session`, returning the transition
    fn step(session: &ExerciseSession, command: Command) -> Transition {
        let definition = definition();
        let settings = LessonSettings::default();
        let ctx = ReduceContext {
            rules: &ShakmatyRules,
            definition: &definition,
            settings: &settings,
        };
        reduce(session, &command, &ctx)
    }

    fn active() -> ExerciseSession {
        let loading = ExerciseSession::new(&definition(), &ShakmatyRules);
        step(&loading, Command::Restore(None)).session
    }

    #[test]
    fn test_restore_announces_position() {
        let loading = ExerciseSession::new(&definition(), &ShakmatyRules);
        let transition = step(&loading, Command::Restore(None));

        assert!(transition.accepted);
        assert_eq!(transition.session.phase(), SessionPhase::Active);
        assert_eq!(
            transition.effects,
            vec![Effect::Emit(BoardEvent::PositionChanged(Position::standard()))]
        );
    }

    #[test]
    fn test_illegal_attempt_changes_nothing() {
        let session = active();
        let transition = step(
            &session,
            Command::Attempt {
                from: sq("e2"),
                to: sq("e5"),
            },
        );

        assert!(!transition.accepted);
        assert_eq!(transition.session, session);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_correct_move_effect_order() {
        let transition = step(
            &active(),
            Command::Attempt {
                from: sq("e2"),
                to: sq("e4"),
            },
        );
        assert!(transition.accepted);

        let kinds: Vec<&str> = transition
            .effects
            .iter()
            .map(|effect| match effect {
                Effect::Emit(BoardEvent::PositionChanged(_)) => "position",
                Effect::Emit(BoardEvent::StatusChanged(MoveStatus::Correct)) => "correct",
                Effect::Emit(BoardEvent::Sound(SoundCue::Move)) => "sound",
                Effect::Persist(_) => "persist",
                Effect::Schedule {
                    task: Task::ClearStatus { .. },
                    ..
                } => "clear-status",
                Effect::Schedule {
                    task: Task::ComputerReply { .. },
                    delay_ms: 800,
                } => "reply",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            ["position", "correct", "sound", "persist", "clear-status", "reply"]
        );
    }

    #[test]
    fn test_stale_task_is_dropped() {
        let session = active();
        let transition = step(
            &session,
            Command::Fire {
                generation: session.generation() + 7,
                task: Task::Celebrate,
            },
        );

        assert!(!transition.accepted);
        assert_eq!(transition.session, session);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_is_deleted() {
        let loading = ExerciseSession::new(&definition(), &ShakmatyRules);
        let snapshot = Snapshot {
            history: vec![Position::standard()],
            cursor: 2,
            completed: true,
        };
        let transition = step(&loading, Command::Restore(Some(snapshot)));

        assert!(transition.accepted);
        assert_eq!(transition.session.cursor(), 0);
        assert!(!transition.session.is_completed());
        assert!(transition.effects.contains(&Effect::DeleteSnapshot));
    }
}
