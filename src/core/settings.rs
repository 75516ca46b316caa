//! Lesson settings shared by the engine and the board interaction layer
//!
//! [`BoardSettings`] mirrors the player-facing preferences panel (piece speed,
//! legal-move dots, confetti, sounds, premoves). [`Timings`] holds every delay
//! the exercise engine schedules on its logical clock, in milliseconds.

use crate::core::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Longest delay any timing may be configured to
const MAX_DELAY_MS: u64 = 60_000;

/// Slowest allowed piece animation
const MAX_PIECE_SPEED_MS: u32 = 5_000;

/// Top-level settings document (`lesson_settings.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LessonSettings {
    pub board: BoardSettings,
    pub timings: Timings,
}

impl LessonSettings {
    /// Reject values the engine cannot run with
    ///
    /// A zero delay is fine: it fires on the next `advance_time` call.
    pub fn validate(&self) -> CoreResult<()> {
        if self.board.piece_speed_ms > MAX_PIECE_SPEED_MS {
            return Err(CoreError::InvalidSettings {
                message: format!(
                    "piece_speed_ms {} exceeds {MAX_PIECE_SPEED_MS}",
                    self.board.piece_speed_ms
                ),
            });
        }

        for (name, value) in self.timings.named() {
            if value > MAX_DELAY_MS {
                return Err(CoreError::InvalidSettings {
                    message: format!("{name} {value} exceeds {MAX_DELAY_MS}"),
                });
            }
        }

        Ok(())
    }
}

/// Player preferences for the lesson board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// Piece animation duration (presentation only)
    pub piece_speed_ms: u32,

    /// Show legal-destination dots for a selected piece
    pub show_legal_moves: bool,

    /// Emit a celebration cue when an exercise completes
    pub show_confetti: bool,

    /// Emit sound cues for moves, captures, checks and mates
    pub play_sounds: bool,

    /// Queue a move made while the computer reply is pending
    pub allow_premove: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            piece_speed_ms: 500,
            show_legal_moves: true,
            show_confetti: true,
            play_sounds: true,
            allow_premove: true,
        }
    }
}

/// Delays scheduled by the exercise engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Correct/incorrect badge lifetime
    pub status_clear_ms: u64,
    /// Delay before a scripted computer reply is played
    pub computer_reply_ms: u64,
    /// Delay between the computer reply and a queued premove
    pub premove_delay_ms: u64,
    /// How long a wrong move stays on the board before snapping back
    pub incorrect_revert_ms: u64,
    /// Move-quality comment lifetime in goal exercises
    pub quality_clear_ms: u64,
    /// Delay between completion and the celebration cue
    pub celebrate_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            status_clear_ms: 800,
            computer_reply_ms: 800,
            premove_delay_ms: 1500,
            incorrect_revert_ms: 800,
            quality_clear_ms: 2000,
            celebrate_delay_ms: 300,
        }
    }
}

impl Timings {
    fn named(&self) -> [(&'static str, u64); 6] {
        [
            ("status_clear_ms", self.status_clear_ms),
            ("computer_reply_ms", self.computer_reply_ms),
            ("premove_delay_ms", self.premove_delay_ms),
            ("incorrect_revert_ms", self.incorrect_revert_ms),
            ("quality_clear_ms", self.quality_clear_ms),
            ("celebrate_delay_ms", self.celebrate_delay_ms),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        //! Shipped defaults must always pass validation
        let settings = LessonSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.board.show_legal_moves);
        assert_eq!(settings.timings.computer_reply_ms, 800);
        assert_eq!(settings.timings.premove_delay_ms, 1500);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        //! Missing sections and fields fall back to defaults
        let settings: LessonSettings =
            serde_json::from_str(r#"{ "board": { "play_sounds": false } }"#).unwrap();

        assert!(!settings.board.play_sounds);
        assert!(settings.board.show_confetti);
        assert_eq!(settings.timings, Timings::default());
    }

    #[test]
    fn test_rejects_absurd_values() {
        let mut settings = LessonSettings::default();
        settings.board.piece_speed_ms = 10_000;
        assert!(settings.validate().is_err());

        let mut settings = LessonSettings::default();
        settings.timings.computer_reply_ms = 120_000;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("computer_reply_ms"));
    }

    #[test]
    fn test_zero_delay_is_allowed() {
        let mut settings = LessonSettings::default();
        settings.timings.status_clear_ms = 0;
        assert!(settings.validate().is_ok());
    }
}
