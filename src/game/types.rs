//! Exercise content and progress types
//!
//! [`ExerciseDefinition`] matches the lesson database JSON (camelCase field
//! names, optional `moves`/`goal`). The remaining types describe the transient
//! feedback an exercise gives ([`MoveStatus`], [`MoveQuality`], [`GoalResult`])
//! and the persisted progress record ([`Snapshot`]).

use crate::game::error::ExerciseResult;
use chess_rules::{normalize_san, Position, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One expected move of a scripted exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStep {
    #[serde(default)]
    pub id: serde_json::Value,
    pub correct_move: String,
    #[serde(default)]
    pub accepted_moves: Vec<String>,
    #[serde(default)]
    pub computer_move: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl ExerciseStep {
    /// Whether `san` satisfies this step
    ///
    /// Check, mate and annotation suffixes are ignored on both sides, so
    /// `Qxf7#` written by an author matches `Qxf7` or `Qxf7#` from the board.
    pub fn accepts(&self, san: &str) -> bool {
        let played = normalize_san(san);
        normalize_san(&self.correct_move) == played
            || self
                .accepted_moves
                .iter()
                .any(|accepted| normalize_san(accepted) == played)
    }
}

/// What a goal exercise asks the trainee to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Mate,
}

/// Move-count thresholds for the star rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub ideal_moves: u32,
    pub good_moves: u32,
    #[serde(default)]
    pub max_moves: Option<u32>,
}

/// Open-ended exercise: reach the goal in as few trainee moves as possible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalConfig {
    pub goal_type: GoalKind,
    /// The trainee's side
    pub side_to_move: Side,
    #[serde(default)]
    pub description: String,
    pub rating: Rating,
}

/// An exercise as stored in lesson content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDefinition {
    pub id: String,
    pub start_position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default)]
    pub moves: Vec<ExerciseStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalConfig>,
}

impl ExerciseDefinition {
    pub fn from_json(json: &str) -> ExerciseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// How moves are judged, fixed for the lifetime of a session
    pub fn mode(&self) -> ExerciseMode {
        if self.goal.is_some() {
            ExerciseMode::Goal
        } else if !self.moves.is_empty() {
            ExerciseMode::Scripted
        } else {
            ExerciseMode::FreePlay
        }
    }
}

/// Exercise flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseMode {
    /// Fixed list of expected moves, optionally answered by the computer
    Scripted,
    /// Trainee plays toward a goal and is scored on move count
    Goal,
    /// No script and no goal: every legal move is accepted
    FreePlay,
}

/// Lifecycle of an exercise session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    /// Stored progress not yet resolved; every mutation is rejected
    #[default]
    Loading,
    Active,
    /// Terminal until undo or reset
    Completed,
}

/// Badge shown briefly after a scripted move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveStatus {
    Correct,
    Incorrect,
    #[default]
    None,
}

/// Comment on a trainee move in a goal exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveQuality {
    Great,
    Good,
    Okay,
    Mistake,
    Blunder,
    Brilliant,
}

impl MoveQuality {
    /// Bucket a change in material edge (trainee minus opponent, in pawns)
    pub fn from_material_delta(delta: i32, is_checkmate: bool) -> Self {
        if is_checkmate {
            return MoveQuality::Brilliant;
        }

        if delta >= 2 {
            MoveQuality::Great
        } else if delta >= 0 {
            MoveQuality::Good
        } else if delta > -1 {
            MoveQuality::Okay
        } else if delta > -3 {
            MoveQuality::Mistake
        } else {
            MoveQuality::Blunder
        }
    }

    pub fn comment(self) -> &'static str {
        match self {
            MoveQuality::Great => "Great move!",
            MoveQuality::Good => "Good move",
            MoveQuality::Okay => "Okay",
            MoveQuality::Mistake => "Mistake",
            MoveQuality::Blunder => "Blunder!",
            MoveQuality::Brilliant => "Brilliant! Mate delivered",
        }
    }
}

impl fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.comment())
    }
}

/// Outcome of a goal exercise
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalResult {
    /// 0..=3
    pub stars: u8,
    pub message: String,
}

impl GoalResult {
    pub fn new(stars: u8, message: impl Into<String>) -> Self {
        Self {
            stars: stars.min(3),
            message: message.into(),
        }
    }
}

/// Persisted exercise progress
///
/// Exactly `{history, cursor, completed}`. `history` is the committed
/// position list starting with the exercise's starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub history: Vec<Position>,
    pub cursor: usize,
    pub completed: bool,
}
