//! Scripted Exercise Integration Tests
//!
//! Full flows through [`ExerciseMachine`] for scripted exercises:
//! - Correct and incorrect moves with their transient feedback
//! - Computer replies and premoves on the logical clock
//! - Undo / redo / continue over the step history
//! - Cancellation of pending work

mod common;

use chess_rules::{MoveAttempt, Position};
use common::*;
use xfchess_lessons::game::{BoardEvent, ExerciseDefinition, MoveStatus, SessionPhase};

// ============================================================================
// Move Validation Tests
// ============================================================================

#[test]
fn test_correct_first_move() {
    let mut machine = loaded(opening_exercise());
    let (from, to) = mv("e2e4");

    assert!(machine.attempt_move(from, to));

    let session = machine.session();
    assert_eq!(session.history().committed_len(), 2);
    assert_eq!(session.position(), &Position::new(AFTER_E4_FEN));
    assert_eq!(session.status(), MoveStatus::Correct);
    assert_eq!(session.cursor(), 1);
    assert!(session.is_awaiting_reply());
}

#[test]
fn test_wrong_move_shows_then_reverts() {
    let mut machine = loaded(opening_exercise());
    let (from, to) = mv("g1f3");

    // Legal but not the scripted move
    assert!(!machine.attempt_move(from, to));
    let session = machine.session();
    assert_eq!(session.status(), MoveStatus::Incorrect);
    assert_ne!(session.displayed_position(), session.position());
    assert_eq!(session.history().committed_len(), 1);
    assert_eq!(session.wrong_attempts(), 1);

    // Nothing is accepted while the wrong move is on the board
    let (from, to) = mv("e2e4");
    assert!(!machine.attempt_move(from, to));

    machine.advance_time(800);
    let session = machine.session();
    assert_eq!(session.displayed_position(), &Position::new(START_FEN));
    assert_eq!(session.status(), MoveStatus::None);
    assert_eq!(session.history().committed_len(), 1);
    assert_eq!(session.cursor(), 0);
}

#[test]
fn test_illegal_move_is_silent() {
    let mut machine = loaded(opening_exercise());
    machine.drain_events();
    let before = machine.session().clone();

    let (from, to) = mv("e2e5");
    assert!(!machine.attempt_move(from, to));

    assert_eq!(machine.session(), &before);
    assert!(machine.drain_events().is_empty());
    assert_eq!(machine.pending_tasks(), 0);
}

#[test]
fn test_accepted_alternative_completes() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();

    // Nc3 is listed as an accepted alternative to Nf3
    play(&mut machine, &["b1c3"]);
    assert!(machine.session().is_completed());
    assert_eq!(machine.session().phase(), SessionPhase::Completed);
}

// ============================================================================
// Reply And Premove Timing Tests
// ============================================================================

#[test]
fn test_premove_runs_after_reply() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);

    // Queued while the reply is pending
    let (from, to) = mv("g1f3");
    assert!(!machine.attempt_move(from, to));
    assert_eq!(machine.session().premove(), Some(MoveAttempt::new(from, to)));

    machine.advance_time(800);
    assert_eq!(machine.session().history().committed_len(), 3);
    assert!(machine.session().premove().is_some());

    machine.advance_time(1499);
    assert_eq!(machine.session().history().committed_len(), 3);

    machine.advance_time(1);
    let session = machine.session();
    assert_eq!(session.history().committed_len(), 4);
    assert!(session.premove().is_none());
    assert!(session.is_completed());
}

#[test]
fn test_completion_celebrates_after_delay() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();
    machine.drain_events();

    play(&mut machine, &["g1f3"]);
    let events = machine.drain_events();
    assert!(events.contains(&BoardEvent::Completed));
    assert!(!events.contains(&BoardEvent::Celebrate));

    machine.advance_time(300);
    assert!(machine.drain_events().contains(&BoardEvent::Celebrate));
}

// ============================================================================
// Terminal State Tests
// ============================================================================

#[test]
fn test_completed_exercise_rejects_moves_until_undo() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();
    play(&mut machine, &["g1f3"]);
    machine.run_until_idle();
    assert!(machine.session().is_completed());

    let before = machine.session().clone();
    let (from, to) = mv("b8c6");
    assert!(!machine.attempt_move(from, to));
    assert_eq!(machine.session(), &before);

    assert!(machine.undo());
    assert_eq!(machine.session().phase(), SessionPhase::Active);
    assert!(!machine.session().is_completed());
    assert_eq!(machine.session().cursor(), 1);

    // Viewing history: resume before playing on
    let (from, to) = mv("g1f3");
    assert!(!machine.attempt_move(from, to));
    assert!(machine.continue_from_here());
    assert!(machine.attempt_move(from, to));
    assert!(machine.session().is_completed());
}

// ============================================================================
// History Navigation Tests
// ============================================================================

#[test]
fn test_undo_removes_move_and_reply() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();
    assert_eq!(machine.session().history().committed_len(), 3);

    assert!(machine.undo());
    let session = machine.session();
    assert_eq!(session.history().committed_len(), 1);
    assert_eq!(session.history().full_len(), 3);
    assert_eq!(session.cursor(), 0);
    assert!(session.is_view_mode());

    // Nothing before the first step
    assert!(!machine.undo());

    assert!(machine.redo());
    let session = machine.session();
    assert_eq!(session.history().committed_len(), 3);
    assert_eq!(session.cursor(), 1);
    assert!(!session.is_view_mode());
    assert!(!machine.redo());
}

#[test]
fn test_undo_before_reply_cancels_it() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);

    assert!(machine.undo());
    assert!(!machine.session().is_awaiting_reply());
    assert_eq!(machine.session().history().committed_len(), 1);

    machine.advance_time(1000);
    assert_eq!(machine.session().history().committed_len(), 1);
    assert_eq!(machine.session().history().full_len(), 2);

    // Back at the live edge the reply is owed again
    assert!(machine.redo());
    assert!(machine.session().is_awaiting_reply());
    machine.advance_time(800);
    assert_eq!(machine.session().history().committed_len(), 3);
    assert!(!machine.session().is_awaiting_reply());
}

#[test]
fn test_redo_to_edge_restores_completion() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();
    play(&mut machine, &["g1f3"]);

    assert!(machine.undo());
    assert!(machine.undo());
    assert!(!machine.session().is_completed());

    assert!(machine.redo());
    assert!(machine.session().is_view_mode());
    assert!(!machine.session().is_completed());

    assert!(machine.redo());
    assert!(machine.session().is_completed());
    assert_eq!(machine.session().phase(), SessionPhase::Completed);
    assert_eq!(machine.session().cursor(), 2);
}

#[test]
fn test_skipped_reply_keeps_navigation_aligned() {
    // Black cannot castle here, so the second reply is skipped and the
    // trainee answers for Black in step three
    let definition = ExerciseDefinition::from_json(&format!(
        r#"{{
            "id": "broken-reply",
            "startPosition": "{START_FEN}",
            "moves": [
                {{ "id": 1, "correctMove": "e4", "computerMove": "e5" }},
                {{ "id": 2, "correctMove": "Nf3", "computerMove": "O-O" }},
                {{ "id": 3, "correctMove": "Nc6" }}
            ]
        }}"#
    ))
    .unwrap();
    let mut machine = loaded(definition);
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();
    play(&mut machine, &["g1f3"]);
    machine.run_until_idle();
    assert_eq!(machine.session().history().committed_len(), 4);
    assert!(!machine.session().is_awaiting_reply());

    play(&mut machine, &["b8c6"]);
    assert!(machine.session().is_completed());
    assert_eq!(machine.session().history().committed_len(), 5);

    assert!(machine.undo());
    assert_eq!(machine.session().cursor(), 2);
    assert_eq!(machine.session().history().committed_len(), 4);

    // Step two added one ply, not two
    assert!(machine.undo());
    assert_eq!(machine.session().cursor(), 1);
    assert_eq!(machine.session().position(), &Position::new(OPEN_GAME_FEN));

    assert!(machine.redo());
    assert_eq!(machine.session().cursor(), 2);
    assert_eq!(machine.session().history().committed_len(), 4);

    assert!(machine.redo());
    assert_eq!(machine.session().cursor(), 3);
    assert_eq!(machine.session().history().committed_len(), 5);
    assert!(machine.session().is_completed());
}

#[test]
fn test_continue_drops_future() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();

    assert!(!machine.continue_from_here());
    machine.undo();
    assert!(machine.continue_from_here());

    let session = machine.session();
    assert_eq!(session.history().full_len(), 1);
    assert!(!session.is_view_mode());
    assert!(!machine.redo());
}

#[test]
fn test_history_navigation_consults_no_rules() {
    let rules = CountingRules::new();
    let calls = rules.counter();
    let mut machine = machine_with(opening_exercise(), rules, Default::default());
    play(&mut machine, &["e2e4"]);
    machine.run_until_idle();
    play(&mut machine, &["g1f3"]);
    let edge = machine.session().position().clone();

    calls.set(0);
    assert!(machine.undo());
    assert!(machine.undo());
    assert!(machine.redo());
    assert!(machine.redo());

    assert_eq!(calls.get(), 0);
    assert_eq!(machine.session().position(), &edge);
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[test]
fn test_reset_before_reply_discards_it() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);

    assert!(machine.reset());
    let events = machine.drain_events();
    assert_eq!(positions(&events), vec![Position::new(START_FEN)]);

    machine.advance_time(1000);
    assert!(positions(&machine.drain_events()).is_empty());

    let session = machine.session();
    assert_eq!(session.position(), &Position::new(START_FEN));
    assert_eq!(session.history().committed_len(), 1);
    assert_eq!(session.cursor(), 0);
    assert!(!session.is_awaiting_reply());
}

#[test]
fn test_undo_cancels_pending_tasks() {
    let mut machine = loaded(opening_exercise());
    play(&mut machine, &["e2e4"]);
    assert_eq!(machine.pending_tasks(), 2);
    machine.undo();
    machine.drain_events();

    machine.advance_time(5000);
    assert!(machine.drain_events().is_empty());
}

// ============================================================================
// Help Tests
// ============================================================================

#[test]
fn test_reveal_toggles_arrow() {
    let mut machine = loaded(opening_exercise());
    machine.drain_events();

    assert!(machine.reveal_move());
    assert_eq!(machine.session().revealed_move(), Some(mv("e2e4")));
    assert_eq!(
        machine.drain_events(),
        vec![BoardEvent::MoveRevealed(Some(mv("e2e4")))]
    );

    assert!(machine.reveal_move());
    assert_eq!(machine.session().revealed_move(), None);
}

#[test]
fn test_hint_toggles() {
    let mut machine = loaded(opening_exercise());
    machine.drain_events();

    assert!(machine.toggle_hint());
    assert_eq!(
        machine.drain_events(),
        vec![BoardEvent::HintChanged(Some(
            "Start with a centre pawn".to_string()
        ))]
    );
    assert!(machine.toggle_hint());
    assert_eq!(machine.drain_events(), vec![BoardEvent::HintChanged(None)]);
    // Scripted exercises do not track help
    assert!(!machine.session().help_used());
}
