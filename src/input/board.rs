//! Lesson board - turns raw board input into exercise operations
//!
//! Owns the [`ExerciseMachine`] plus the purely visual interaction state
//! (selected square, piece being dragged). Each [`InputEvent`] maps to at most
//! one attempt or selection change. Highlights are recomputed after every
//! input and clock tick and announced only when they change.
//!
//! # Click Flow
//!
//! 1. Click an own piece → select it
//! 2. Click the same square → deselect
//! 3. Click elsewhere → attempt the move; if that fails and the square holds
//!    another selectable piece, select that instead
//!
//! While a computer reply is pending the trainee's pieces stay selectable so a
//! premove can be entered.

use crate::game::events::{BoardEvent, Highlight};
use crate::game::machine::ExerciseMachine;
use crate::input::highlights::{compute_highlights, HighlightInputs};
use crate::input::InputEvent;
use crate::storage::SnapshotStore;
use chess_rules::{RulesProvider, Square};
use tracing::debug;

pub struct LessonBoard<R: RulesProvider, S: SnapshotStore> {
    machine: ExerciseMachine<R, S>,
    selected: Option<Square>,
    dragging: Option<Square>,
    highlights: Vec<Highlight>,
    events: Vec<BoardEvent>,
}

impl<R: RulesProvider, S: SnapshotStore> LessonBoard<R, S> {
    pub fn new(machine: ExerciseMachine<R, S>) -> Self {
        Self {
            machine,
            selected: None,
            dragging: None,
            highlights: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn machine(&self) -> &ExerciseMachine<R, S> {
        &self.machine
    }

    /// Direct access for the non-board controls (undo, hint, reset, ...)
    ///
    /// Call [`Self::refresh`] afterwards so highlights follow.
    pub fn machine_mut(&mut self) -> &mut ExerciseMachine<R, S> {
        &mut self.machine
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn dragging(&self) -> Option<Square> {
        self.dragging
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Handle one input event; returns whether a move was committed
    pub fn handle(&mut self, event: InputEvent) -> bool {
        debug!("[INPUT] {:?}", event);
        let committed = match event {
            InputEvent::PieceDragStarted(square) => {
                if self.can_select(square) {
                    self.dragging = Some(square);
                    self.selected = Some(square);
                } else {
                    self.dragging = None;
                }
                false
            }
            InputEvent::PieceDropped { source, target } => {
                self.dragging = None;
                if source == target {
                    false
                } else {
                    let committed = self.machine.attempt_move(source, target);
                    self.selected = None;
                    committed
                }
            }
            InputEvent::SquareClicked(square) => self.click(square),
            InputEvent::SquareAltClicked(_) => {
                self.selected = None;
                self.dragging = None;
                self.machine.clear_premove();
                false
            }
        };

        self.refresh();
        committed
    }

    /// Advance the exercise clock and pick up whatever the tasks changed
    pub fn advance_time(&mut self, ms: u64) -> usize {
        let fired = self.machine.advance_time(ms);
        self.refresh();
        fired
    }

    pub fn run_until_idle(&mut self) -> usize {
        let fired = self.machine.run_until_idle();
        self.refresh();
        fired
    }

    /// Collect machine events and announce changed highlights
    pub fn refresh(&mut self) {
        let events = self.machine.drain_events();
        let position_changed = events
            .iter()
            .any(|event| matches!(event, BoardEvent::PositionChanged(_)));
        self.events.extend(events);

        if position_changed {
            if let Some(selected) = self.selected {
                if !self.can_select(selected) {
                    self.selected = None;
                }
            }
        }

        let session = self.machine.session();
        let highlights = compute_highlights(
            self.machine.rules(),
            &HighlightInputs {
                position: session.displayed_position(),
                selected: self.selected,
                last_move: session.last_move(),
                show_legal_moves: self.machine.settings().board.show_legal_moves,
            },
        );

        if highlights != self.highlights {
            self.highlights = highlights.clone();
            self.events.push(BoardEvent::HighlightsChanged(highlights));
        }
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    fn click(&mut self, square: Square) -> bool {
        let Some(selected) = self.selected else {
            if self.can_select(square) {
                self.selected = Some(square);
            }
            return false;
        };

        if selected == square {
            self.selected = None;
            return false;
        }

        if self.machine.attempt_move(selected, square) {
            self.selected = None;
            return true;
        }

        self.selected = self.can_select(square).then_some(square);
        false
    }

    /// A piece of the side to move, or of the trainee's side while a premove
    /// can be entered
    fn can_select(&self, square: Square) -> bool {
        let machine = &self.machine;
        let session = machine.session();
        let position = session.position();

        let Some((side, _)) = machine.rules().piece_at(position, square) else {
            return false;
        };
        let Some(turn) = machine.rules().turn(position) else {
            return false;
        };

        if session.accepts_moves() {
            side == turn
        } else {
            session.is_awaiting_reply()
                && machine.settings().board.allow_premove
                && side == turn.opponent()
        }
    }
}
