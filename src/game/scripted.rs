//! Scripted-step matcher
//!
//! A scripted exercise is an ordered list of [`ExerciseStep`]s. The session
//! cursor names the pending step; a step is satisfied by its correct move or
//! one of its accepted alternatives and may be answered by a forced computer
//! reply. Everything here is a read-only view over the steps.

use crate::game::types::ExerciseStep;
use chess_rules::{MoveResult, Position, RulesProvider, Square};

/// Verdict on a legal move played at the pending step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVerdict {
    /// Matches the step; `reply` is the computer's scripted answer
    Correct {
        reply: Option<String>,
        completes: bool,
    },
    Incorrect,
}

/// Where the played steps sit in a stored history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLayout {
    /// History index each step's move was played from
    pub starts: Vec<usize>,
    /// Reply still owed after the last played step
    pub pending_reply: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScriptedMatcher<'a> {
    steps: &'a [ExerciseStep],
}

impl<'a> ScriptedMatcher<'a> {
    pub fn new(steps: &'a [ExerciseStep]) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&'a ExerciseStep> {
        self.steps.get(index)
    }

    /// The SAN the trainee must play at step `index`
    pub fn expected_move(&self, index: usize) -> Option<&'a str> {
        self.step(index).map(|step| step.correct_move.as_str())
    }

    /// Forced computer reply after step `index`
    pub fn reply_for(&self, index: usize) -> Option<&'a str> {
        self.step(index).and_then(|step| step.computer_move.as_deref())
    }

    pub fn is_complete(&self, cursor: usize) -> bool {
        cursor >= self.steps.len()
    }

    pub fn evaluate(&self, cursor: usize, played: &MoveResult) -> StepVerdict {
        match self.step(cursor) {
            Some(step) if step.accepts(&played.san) => StepVerdict::Correct {
                reply: step.computer_move.clone(),
                completes: self.is_complete(cursor + 1),
            },
            _ => StepVerdict::Incorrect,
        }
    }

    /// Split a stored `history` into its first `cursor` steps
    ///
    /// A reply belongs to a step only if it reproduces the next stored
    /// position, so skipped replies take no room. Returns `None` when the
    /// history does not fit the script.
    pub fn layout<R: RulesProvider>(
        &self,
        rules: &R,
        history: &[Position],
        cursor: usize,
    ) -> Option<StepLayout> {
        let last = history.len().checked_sub(1)?;
        let mut starts = Vec::with_capacity(cursor);
        let mut pending_reply = None;
        let mut index = 0;

        for step in 0..cursor {
            if index >= last {
                return None;
            }
            starts.push(index);
            index += 1;

            let Some(san) = self.reply_for(step) else {
                continue;
            };
            let replied = rules.apply_san(&history[index], san);
            if index < last {
                if replied.is_some_and(|result| result.position == history[index + 1]) {
                    index += 1;
                }
            } else if step + 1 == cursor && replied.is_some() {
                pending_reply = Some(san.to_string());
            }
        }

        (index == last).then_some(StepLayout {
            starts,
            pending_reply,
        })
    }

    /// Resolve the expected move at `cursor` to a from/to arrow
    pub fn reveal<R: RulesProvider>(
        &self,
        rules: &R,
        position: &Position,
        cursor: usize,
    ) -> Option<(Square, Square)> {
        let san = self.expected_move(cursor)?;
        rules.apply_san(position, san).map(|result| (result.from, result.to))
    }

    /// Text to show under the board
    ///
    /// The pending step's description, or the last step's once the exercise is
    /// complete.
    pub fn description_for(&self, cursor: usize, completed: bool) -> Option<&'a str> {
        let step = if completed {
            self.steps.last()
        } else {
            self.step(cursor)
        };
        step.map(|step| step.description.as_str())
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::ShakmatyRules;

    fn steps() -> Vec<ExerciseStep> {
        let parse = |json: &str| serde_json::from_str::<ExerciseStep>(json).unwrap();
        vec![
            parse(r#"{ "id": 1, "correctMove": "e4", "computerMove": "e5", "description": "Centre" }"#),
            parse(r#"{ "id": 2, "correctMove": "Nf3", "acceptedMoves": ["Bc4"], "description": "Develop" }"#),
        ]
    }

    fn played(san: &str) -> MoveResult {
        MoveResult {
            san: san.to_string(),
            from: "e2".parse().unwrap(),
            to: "e4".parse().unwrap(),
            captured: None,
            position: Position::standard(),
            is_check: false,
            is_checkmate: false,
        }
    }

    #[test]
    fn test_evaluate_correct_and_incorrect() {
        let steps = steps();
        let matcher = ScriptedMatcher::new(&steps);

        assert_eq!(
            matcher.evaluate(0, &played("e4")),
            StepVerdict::Correct {
                reply: Some("e5".to_string()),
                completes: false
            }
        );
        assert_eq!(matcher.evaluate(0, &played("d4")), StepVerdict::Incorrect);
        assert_eq!(
            matcher.evaluate(1, &played("Bc4")),
            StepVerdict::Correct {
                reply: None,
                completes: true
            }
        );
        assert_eq!(matcher.evaluate(2, &played("e4")), StepVerdict::Incorrect);
    }

    /// Positions reached by playing `sans` from the standard start
    fn line(sans: &[&str]) -> Vec<Position> {
        let mut history = vec![Position::standard()];
        for san in sans {
            let next = ShakmatyRules.apply_san(history.last().unwrap(), san).unwrap();
            history.push(next.position);
        }
        history
    }

    #[test]
    fn test_layout_follows_replies() {
        let steps = steps();
        let matcher = ScriptedMatcher::new(&steps);

        let layout = matcher.layout(&ShakmatyRules, &line(&["e4", "e5", "Nf3"]), 2).unwrap();
        assert_eq!(layout.starts, vec![0, 2]);
        assert_eq!(layout.pending_reply, None);

        let layout = matcher.layout(&ShakmatyRules, &line(&["e4", "e5"]), 1).unwrap();
        assert_eq!(layout.starts, vec![0]);
        assert_eq!(layout.pending_reply, None);
    }

    #[test]
    fn test_layout_reports_pending_reply() {
        let steps = steps();
        let matcher = ScriptedMatcher::new(&steps);

        let layout = matcher.layout(&ShakmatyRules, &line(&["e4"]), 1).unwrap();
        assert_eq!(layout.starts, vec![0]);
        assert_eq!(layout.pending_reply.as_deref(), Some("e5"));
    }

    #[test]
    fn test_layout_rejects_histories_that_do_not_fit() {
        let steps = steps();
        let matcher = ScriptedMatcher::new(&steps);

        assert_eq!(matcher.layout(&ShakmatyRules, &line(&["e4"]), 2), None);
        assert_eq!(matcher.layout(&ShakmatyRules, &line(&["e4", "e5"]), 0), None);
        assert_eq!(matcher.layout(&ShakmatyRules, &[], 0), None);
    }

    #[test]
    fn test_reveal_resolves_expected_move() {
        let steps = steps();
        let matcher = ScriptedMatcher::new(&steps);
        let arrow = matcher.reveal(&ShakmatyRules, &Position::standard(), 0);

        assert_eq!(arrow, Some(("e2".parse().unwrap(), "e4".parse().unwrap())));
        assert_eq!(matcher.reveal(&ShakmatyRules, &Position::standard(), 5), None);
    }

    #[test]
    fn test_description_for_completed_uses_last_step() {
        let steps = steps();
        let matcher = ScriptedMatcher::new(&steps);

        assert_eq!(matcher.description_for(0, false), Some("Centre"));
        assert_eq!(matcher.description_for(2, true), Some("Develop"));
        assert_eq!(matcher.description_for(2, false), None);
    }
}
