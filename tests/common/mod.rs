//! Shared helpers for the integration tests

#![allow(dead_code)]

use chess_rules::{
    MoveAttempt, MoveResult, PieceKind, Position, RulesProvider, RulesResult, ShakmatyRules, Side,
    Square,
};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;
use xfchess_lessons::core::LessonSettings;
use xfchess_lessons::game::{BoardEvent, ExerciseDefinition, ExerciseMachine};
use xfchess_lessons::storage::MemoryStore;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
/// 1.e4 e5, White to move
pub const OPEN_GAME_FEN: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";

pub fn sq(text: &str) -> Square {
    text.parse().unwrap()
}

/// `"e2e4"` → (e2, e4)
pub fn mv(text: &str) -> (Square, Square) {
    (sq(&text[..2]), sq(&text[2..]))
}

/// Rules provider that counts every call it answers
#[derive(Debug, Clone, Default)]
pub struct CountingRules {
    inner: ShakmatyRules,
    calls: Rc<Cell<usize>>,
}

impl CountingRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle sharing this provider's counter
    pub fn counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl RulesProvider for CountingRules {
    fn validate(&self, position: &Position) -> RulesResult<()> {
        self.tick();
        self.inner.validate(position)
    }

    fn legal_destinations(&self, position: &Position, from: Square) -> BTreeSet<Square> {
        self.tick();
        self.inner.legal_destinations(position, from)
    }

    fn apply_move(&self, position: &Position, attempt: &MoveAttempt) -> Option<MoveResult> {
        self.tick();
        self.inner.apply_move(position, attempt)
    }

    fn apply_san(&self, position: &Position, san: &str) -> Option<MoveResult> {
        self.tick();
        self.inner.apply_san(position, san)
    }

    fn is_check(&self, position: &Position) -> bool {
        self.tick();
        self.inner.is_check(position)
    }

    fn is_checkmate(&self, position: &Position) -> bool {
        self.tick();
        self.inner.is_checkmate(position)
    }

    fn is_stalemate(&self, position: &Position) -> bool {
        self.tick();
        self.inner.is_stalemate(position)
    }

    fn material_balance(&self, position: &Position, side: Side) -> i32 {
        self.tick();
        self.inner.material_balance(position, side)
    }

    fn turn(&self, position: &Position) -> Option<Side> {
        self.tick();
        self.inner.turn(position)
    }

    fn piece_at(&self, position: &Position, square: Square) -> Option<(Side, PieceKind)> {
        self.tick();
        self.inner.piece_at(position, square)
    }

    fn king_square(&self, position: &Position, side: Side) -> Option<Square> {
        self.tick();
        self.inner.king_square(position, side)
    }
}

/// Two-step opening: 1.e4 (reply e5) 2.Nf3
pub fn opening_exercise() -> ExerciseDefinition {
    ExerciseDefinition::from_json(&format!(
        r#"{{
            "id": "open-e4",
            "startPosition": "{START_FEN}",
            "hint": "Start with a centre pawn",
            "moves": [
                {{ "id": 1, "correctMove": "e4", "computerMove": "e5", "description": "Take the centre" }},
                {{ "id": 2, "correctMove": "Nf3", "acceptedMoves": ["Nc3"], "description": "Develop with tempo" }}
            ]
        }}"#
    ))
    .unwrap()
}

/// Trainee (White) must mate from the open game; 3 / 5 / 10 move thresholds
pub fn mate_goal_exercise() -> ExerciseDefinition {
    ExerciseDefinition::from_json(&format!(
        r#"{{
            "id": "scholar-goal",
            "startPosition": "{OPEN_GAME_FEN}",
            "hint": "f7 is only defended by the king",
            "goal": {{
                "goalType": "mate",
                "sideToMove": "w",
                "description": "Checkmate Black",
                "rating": {{ "idealMoves": 3, "goodMoves": 5, "maxMoves": 10 }}
            }}
        }}"#
    ))
    .unwrap()
}

pub fn machine_with<R: RulesProvider>(
    definition: ExerciseDefinition,
    rules: R,
    store: MemoryStore,
) -> ExerciseMachine<R, MemoryStore> {
    let mut machine = ExerciseMachine::new(definition, rules, store, LessonSettings::default());
    assert!(machine.load(), "fresh machine should load");
    machine
}

pub fn loaded(definition: ExerciseDefinition) -> ExerciseMachine<ShakmatyRules, MemoryStore> {
    machine_with(definition, ShakmatyRules, MemoryStore::new())
}

/// Play coordinate moves, asserting each one commits
pub fn play<R: RulesProvider>(machine: &mut ExerciseMachine<R, MemoryStore>, moves: &[&str]) {
    for text in moves {
        let (from, to) = mv(text);
        assert!(machine.attempt_move(from, to), "{text} should be accepted");
    }
}

pub fn positions(events: &[BoardEvent]) -> Vec<Position> {
    events
        .iter()
        .filter_map(|event| match event {
            BoardEvent::PositionChanged(position) => Some(position.clone()),
            _ => None,
        })
        .collect()
}
