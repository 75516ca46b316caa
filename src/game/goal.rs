//! Goal evaluator
//!
//! Scores open-ended play toward a goal (currently: deliver mate). The trainee
//! and the opponent are both moved by the user; only trainee moves count
//! toward the star rating.
//!
//! # Rating
//!
//! | Outcome                                   | Stars |
//! |-------------------------------------------|-------|
//! | mate within `ideal_moves`                 | 3     |
//! | mate within `good_moves`                  | 2     |
//! | later mate                                | 1     |
//! | help used (hint or reveal)                | max 2 |
//! | `max_moves` exceeded, mate or not         | 0     |
//! | stalemate, or mated by the opponent       | 0     |

use crate::game::types::{GoalConfig, GoalResult, MoveQuality};
use chess_rules::{MoveResult, Position, RulesProvider, Side};

pub const MATED_MESSAGE: &str = "Checkmate against you";
pub const NOT_ACHIEVED_MESSAGE: &str = "Goal not achieved";
pub const STALEMATE_MESSAGE: &str = "Stalemate, goal not achieved";

#[derive(Debug, Clone, Copy)]
pub struct GoalEvaluator<'a> {
    config: &'a GoalConfig,
}

impl<'a> GoalEvaluator<'a> {
    pub fn new(config: &'a GoalConfig) -> Self {
        Self { config }
    }

    pub fn trainee(&self) -> Side {
        self.config.side_to_move
    }

    /// Trainee material minus opponent material
    pub fn material_edge<R: RulesProvider>(&self, rules: &R, position: &Position) -> i32 {
        let trainee = self.trainee();
        rules.material_balance(position, trainee) - rules.material_balance(position, trainee.opponent())
    }

    /// Comment on a trainee move from the material edge before and after it
    pub fn quality(&self, edge_before: i32, edge_after: i32, is_checkmate: bool) -> MoveQuality {
        MoveQuality::from_material_delta(edge_after - edge_before, is_checkmate)
    }

    fn exceeded(&self, move_count: u32) -> bool {
        self.config
            .rating
            .max_moves
            .is_some_and(|max| move_count > max)
    }

    /// Stars for a mate on trainee move `move_count`
    pub fn stars(&self, move_count: u32, help_used: bool) -> u8 {
        if self.exceeded(move_count) {
            return 0;
        }

        let rating = &self.config.rating;
        let stars = if move_count <= rating.ideal_moves {
            3
        } else if move_count <= rating.good_moves {
            2
        } else {
            1
        };

        if help_used {
            stars.min(2)
        } else {
            stars
        }
    }

    /// Termination after the opponent's move
    pub fn after_opponent_move(&self, result: &MoveResult) -> Option<GoalResult> {
        if result.is_checkmate {
            Some(GoalResult::new(0, MATED_MESSAGE))
        } else {
            None
        }
    }

    /// Termination after trainee move number `move_count`
    pub fn after_trainee_move<R: RulesProvider>(
        &self,
        rules: &R,
        result: &MoveResult,
        move_count: u32,
        help_used: bool,
    ) -> Option<GoalResult> {
        if result.is_checkmate {
            return Some(self.mate_result(move_count, help_used));
        }
        if self.exceeded(move_count) {
            return Some(GoalResult::new(0, NOT_ACHIEVED_MESSAGE));
        }
        if rules.is_stalemate(&result.position) {
            return Some(GoalResult::new(0, STALEMATE_MESSAGE));
        }
        None
    }

    /// Rebuild the result of a finished exercise from its final position
    ///
    /// Used when stored progress is restored; help is not persisted and is
    /// treated as unused.
    pub fn evaluate_final<R: RulesProvider>(
        &self,
        rules: &R,
        position: &Position,
        move_count: u32,
    ) -> Option<GoalResult> {
        if rules.is_checkmate(position) {
            // The side to move is the mated side
            return if rules.turn(position) == Some(self.trainee()) {
                Some(GoalResult::new(0, MATED_MESSAGE))
            } else {
                Some(self.mate_result(move_count, false))
            };
        }
        if self.exceeded(move_count) {
            return Some(GoalResult::new(0, NOT_ACHIEVED_MESSAGE));
        }
        if rules.is_stalemate(position) {
            return Some(GoalResult::new(0, STALEMATE_MESSAGE));
        }
        None
    }

    fn mate_result(&self, move_count: u32, help_used: bool) -> GoalResult {
        let stars = self.stars(move_count, help_used);
        if stars == 0 {
            GoalResult::new(0, NOT_ACHIEVED_MESSAGE)
        } else {
            let noun = if move_count == 1 { "move" } else { "moves" };
            GoalResult::new(stars, format!("Checkmate in {move_count} {noun}"))
        }
    }
}
