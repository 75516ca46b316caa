//! Exercise session state
//!
//! [`ExerciseSession`] is a plain value: the reducer takes one by reference and
//! returns the next, the machine keeps the latest. Fields are crate-visible so
//! the reducer can build the next value; everything else reads through the
//! accessors.

use crate::game::error::{ExerciseError, ExerciseResult};
use crate::game::history::HistoryBuffer;
use crate::game::types::{
    ExerciseDefinition, ExerciseMode, GoalResult, MoveQuality, MoveStatus, SessionPhase, Snapshot,
};
use chess_rules::{MoveAttempt, Position, RulesProvider, Square};
use tracing::warn;

/// State of the live edge, saved by the first undo away from it
///
/// Redo restores it when the live edge is reached again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiveEdge {
    pub(crate) completed: bool,
    pub(crate) goal_result: Option<GoalResult>,
    /// Scripted reply that was still pending when play stepped back
    pub(crate) pending_reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseSession {
    pub(crate) mode: ExerciseMode,
    pub(crate) phase: SessionPhase,
    pub(crate) history: HistoryBuffer,
    pub(crate) position: Position,
    /// Scripted: next step index. Goal: trainee moves made. Free play: plies.
    pub(crate) cursor: usize,
    pub(crate) completed: bool,
    pub(crate) ever_completed: bool,
    pub(crate) status: MoveStatus,
    pub(crate) status_token: u64,
    pub(crate) help_used: bool,
    pub(crate) goal_result: Option<GoalResult>,
    pub(crate) move_quality: Option<MoveQuality>,
    pub(crate) quality_token: u64,
    /// Position of a wrong move, shown until the revert task fires
    pub(crate) display: Option<Position>,
    pub(crate) awaiting_reply: bool,
    pub(crate) premove: Option<MoveAttempt>,
    pub(crate) last_move: Option<(Square, Square)>,
    pub(crate) hint_visible: bool,
    pub(crate) revealed: Option<(Square, Square)>,
    pub(crate) wrong_attempts: u32,
    pub(crate) generation: u64,
    pub(crate) live_edge: Option<LiveEdge>,
    /// Scripted: history index each played step's move was played from
    ///
    /// Kept across undo so redo knows how far each step reaches, including
    /// steps whose reply was skipped.
    pub(crate) step_starts: Vec<usize>,
}

impl ExerciseSession {
    /// A session in [`SessionPhase::Loading`] at the exercise's start
    ///
    /// A starting position the rules cannot build is replaced by the standard
    /// one.
    pub fn new<R: RulesProvider>(definition: &ExerciseDefinition, rules: &R) -> Self {
        let start = checked_start(definition, rules);
        Self::fresh(definition.mode(), start, 0)
    }

    pub(crate) fn fresh(mode: ExerciseMode, start: Position, generation: u64) -> Self {
        Self {
            mode,
            phase: SessionPhase::Loading,
            history: HistoryBuffer::new(start.clone()),
            position: start,
            cursor: 0,
            completed: false,
            ever_completed: false,
            status: MoveStatus::None,
            status_token: 0,
            help_used: false,
            goal_result: None,
            move_quality: None,
            quality_token: 0,
            display: None,
            awaiting_reply: false,
            premove: None,
            last_move: None,
            hint_visible: false,
            revealed: None,
            wrong_attempts: 0,
            generation,
            live_edge: None,
            step_starts: Vec::new(),
        }
    }

    pub fn mode(&self) -> ExerciseMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Last committed position
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// What the board should draw: a wrong move until it snaps back, otherwise
    /// the committed position
    pub fn displayed_position(&self) -> &Position {
        self.display.as_ref().unwrap_or(&self.position)
    }

    pub fn start_position(&self) -> &Position {
        self.history.start()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn was_ever_completed(&self) -> bool {
        self.ever_completed
    }

    pub fn is_view_mode(&self) -> bool {
        self.history.is_view_mode()
    }

    pub fn status(&self) -> MoveStatus {
        self.status
    }

    pub fn help_used(&self) -> bool {
        self.help_used
    }

    pub fn goal_result(&self) -> Option<&GoalResult> {
        self.goal_result.as_ref()
    }

    pub fn move_quality(&self) -> Option<MoveQuality> {
        self.move_quality
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn is_reverting(&self) -> bool {
        self.display.is_some()
    }

    pub fn premove(&self) -> Option<MoveAttempt> {
        self.premove
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    pub fn is_hint_visible(&self) -> bool {
        self.hint_visible
    }

    pub fn revealed_move(&self) -> Option<(Square, Square)> {
        self.revealed
    }

    /// Legal but wrong scripted moves since the last reset
    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `attempt_move` could currently commit anything
    pub fn accepts_moves(&self) -> bool {
        self.phase == SessionPhase::Active
            && !self.is_view_mode()
            && !self.awaiting_reply
            && self.display.is_none()
    }

    /// Persisted form of the committed progress
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            history: self.history.committed(),
            cursor: self.cursor,
            completed: self.completed,
        }
    }

    /// Check the structural invariants the reducer maintains
    pub fn check_integrity(&self, definition: &ExerciseDefinition) -> ExerciseResult<()> {
        let fail = |message: String| Err(ExerciseError::Inconsistent { message });

        if !self.history.is_consistent() {
            return fail("committed history is not a prefix of full history".to_string());
        }
        if self.history.current() != &self.position {
            return fail(format!(
                "current position {} differs from last committed {}",
                self.position,
                self.history.current()
            ));
        }

        let plies = self.history.committed_len() - 1;
        match self.mode {
            ExerciseMode::Scripted => {
                let steps = definition.moves.len();
                if self.cursor > steps {
                    return fail(format!("cursor {} beyond {} steps", self.cursor, steps));
                }
                if self.completed != (self.cursor == steps) {
                    return fail(format!(
                        "completion {} disagrees with cursor {}/{}",
                        self.completed, self.cursor, steps
                    ));
                }
                if self.step_starts.len() < self.cursor {
                    return fail(format!(
                        "{} step boundaries for cursor {}",
                        self.step_starts.len(),
                        self.cursor
                    ));
                }
            }
            ExerciseMode::Goal => {
                if self.cursor > plies {
                    return fail(format!("{} trainee moves in {} plies", self.cursor, plies));
                }
            }
            ExerciseMode::FreePlay => {
                if self.cursor != plies || self.completed {
                    return fail(format!("free play cursor {} at {} plies", self.cursor, plies));
                }
            }
        }

        if self.completed != (self.phase == SessionPhase::Completed) {
            return fail(format!(
                "completion {} in phase {:?}",
                self.completed, self.phase
            ));
        }

        Ok(())
    }
}

/// The definition's start position, or the standard one if the rules reject it
pub(crate) fn checked_start<R: RulesProvider>(definition: &ExerciseDefinition, rules: &R) -> Position {
    match rules.validate(&definition.start_position) {
        Ok(()) => definition.start_position.clone(),
        Err(e) => {
            let error = ExerciseError::MalformedStartingPosition {
                position: definition.start_position.to_string(),
                reason: e.to_string(),
            };
            warn!(
                "[EXERCISE] {} in '{}', using the standard position",
                error, definition.id
            );
            Position::standard()
        }
    }
}
