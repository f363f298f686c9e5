mod common;

use clue_core::{GuessOutcome, LeaveOutcome, SessionError, is_valid_lobby_id};
use clue_types::{ErrorCode, GameStatus, SettingsPatch};
use common::*;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[test]
fn test_create_lobby_has_only_host_and_waits() {
    let mut registry = create_test_registry();
    let host = Uuid::new_v4();

    let outcome = registry.create_lobby(host, "Hana").unwrap();
    let lobby = outcome.lobby;

    assert!(is_valid_lobby_id(&lobby.id));
    assert_eq!(lobby.host_id, host);
    assert_eq!(lobby.players.len(), 1);
    assert_eq!(lobby.players[0].name, "Hana");
    assert_eq!(lobby.game_state.status, GameStatus::Waiting);
    assert_eq!(lobby.game_state.round, 0);
    assert!(!outcome.rejoined);
    assert_eq!(registry.lobby_of(host), Some(&lobby.id));
}

#[test]
fn test_join_is_idempotent_for_existing_member() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &[]);
    let guest = Uuid::new_v4();

    let first = registry.join_lobby(&lobby.id, guest, "Pat").unwrap();
    let second = registry.join_lobby(&lobby.id, guest, "Pat").unwrap();

    assert!(!first.rejoined);
    assert!(second.rejoined);
    assert_eq!(first.lobby.players.len(), 2);
    assert_eq!(second.lobby.players.len(), 2);
    // Host rejoining is also a no-op
    let host_again = registry.join_lobby(&lobby.id, lobby.host, "Hana").unwrap();
    assert!(host_again.rejoined);
    assert_eq!(host_again.lobby.players.len(), 2);
}

#[test]
fn test_join_unknown_lobby() {
    let mut registry = create_test_registry();
    let err = registry
        .join_lobby("QQQQQQ", Uuid::new_v4(), "Pat")
        .unwrap_err();
    assert_eq!(err, SessionError::LobbyNotFound("QQQQQQ".into()));
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[test]
fn test_join_full_lobby() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    let patch = SettingsPatch {
        max_players: Some(2),
        ..SettingsPatch::default()
    };
    registry
        .update_settings(&lobby.id, lobby.host, &patch)
        .unwrap();

    let err = registry
        .join_lobby(&lobby.id, Uuid::new_v4(), "Lee")
        .unwrap_err();
    assert!(matches!(err, SessionError::LobbyFull(_)));
    assert_eq!(err.code(), ErrorCode::CapacityExceeded);
    assert_eq!(registry.get(&lobby.id).unwrap().players().len(), 2);
}

#[test]
fn test_start_requires_two_players() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &[]);

    let err = registry
        .start_game(&lobby.id, lobby.host, Instant::now())
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidState);
    assert_eq!(
        registry.get(&lobby.id).unwrap().status(),
        GameStatus::Waiting
    );
}

#[test]
fn test_start_twice_is_rejected() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    let now = Instant::now();
    registry.start_game(&lobby.id, lobby.host, now).unwrap();

    let err = registry.start_game(&lobby.id, lobby.host, now).unwrap_err();
    assert!(matches!(err, SessionError::InvalidState(_)));
    assert_eq!(registry.get(&lobby.id).unwrap().round_number(), 1);
}

#[test]
fn test_no_new_members_mid_round_but_members_may_rejoin() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    registry
        .start_game(&lobby.id, lobby.host, Instant::now())
        .unwrap();

    assert_eq!(
        registry
            .join_lobby(&lobby.id, Uuid::new_v4(), "Lee")
            .unwrap_err(),
        SessionError::GameInProgress
    );

    let rejoin = registry
        .join_lobby(&lobby.id, lobby.guests[0], "Pat")
        .unwrap();
    assert!(rejoin.rejoined);
    assert_eq!(rejoin.lobby.game_state.status, GameStatus::Playing);
}

#[test]
fn test_guess_at_ten_seconds_scores_five_and_round_ends() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    let pat = lobby.guests[0];
    let patch = SettingsPatch {
        time_limit: Some(60),
        hint_interval: Some(15),
        max_players: None,
    };
    registry
        .update_settings(&lobby.id, lobby.host, &patch)
        .unwrap();

    let start = Instant::now();
    let state = registry.start_game(&lobby.id, lobby.host, start).unwrap();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.round, 1);
    assert!(state.hints.is_empty());

    let first_hint = registry.reveal_next_hint(&lobby.id, 1).unwrap();
    assert_eq!(first_hint.hint, "LANTERN hint 1");
    assert_eq!(
        registry.get(&lobby.id).unwrap().revealed_hints().len(),
        1
    );

    let outcome = registry
        .submit_guess(&lobby.id, pat, "Lantern", start + Duration::from_secs(10))
        .unwrap();
    match &outcome {
        GuessOutcome::Correct { winner, .. } => {
            assert_eq!(winner.round_score, 5);
            assert_eq!(winner.score, 5);
            assert_eq!(winner.name, "Pat");
        }
        other => panic!("Expected correct guess, got {:?}", other),
    }

    let state = registry.end_round(&lobby.id).unwrap();
    assert_eq!(state.status, GameStatus::RoundEnded);
    assert_eq!(state.round_winner.unwrap().id, pat);
    assert_eq!(state.word.as_deref(), Some("LANTERN"));
    assert!(registry.reveal_next_hint(&lobby.id, 1).is_none());
}

#[test]
fn test_timed_out_round_then_next_round_keeps_scores() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    let start = Instant::now();
    registry.start_game(&lobby.id, lobby.host, start).unwrap();

    // Round one: Pat scores, round two: nobody guesses
    registry
        .submit_guess(&lobby.id, lobby.guests[0], "lantern", start)
        .unwrap();
    registry.end_round(&lobby.id).unwrap();
    registry
        .start_next_round(&lobby.id, lobby.host, start)
        .unwrap();

    let state = registry.end_round(&lobby.id).unwrap();
    assert_eq!(state.status, GameStatus::RoundEnded);
    assert!(state.round_winner.is_none());

    let state = registry
        .start_next_round(&lobby.id, lobby.host, start + Duration::from_secs(90))
        .unwrap();
    assert_eq!(state.round, 3);
    assert_eq!(state.status, GameStatus::Playing);
    let lobby_state = registry.get(&lobby.id).unwrap();
    assert_eq!(lobby_state.current_word(), Some("PIANO"));
    assert_eq!(lobby_state.player(lobby.guests[0]).unwrap().score, 6);
    assert_eq!(lobby_state.player(lobby.host).unwrap().score, 0);
}

#[test]
fn test_next_round_is_host_only() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    let now = Instant::now();
    registry.start_game(&lobby.id, lobby.host, now).unwrap();
    registry.end_round(&lobby.id).unwrap();

    let err = registry
        .start_next_round(&lobby.id, lobby.guests[0], now)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(
        registry.get(&lobby.id).unwrap().status(),
        GameStatus::RoundEnded
    );
}

#[test]
fn test_end_game_winner_is_deterministic_on_tie() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat", "Lee"]);
    let (pat, lee) = (lobby.guests[0], lobby.guests[1]);
    let start = Instant::now();

    registry.start_game(&lobby.id, lobby.host, start).unwrap();
    registry
        .submit_guess(&lobby.id, lee, "lantern", start + Duration::from_secs(30))
        .unwrap();
    registry.end_round(&lobby.id).unwrap();
    registry
        .start_next_round(&lobby.id, lobby.host, start)
        .unwrap();
    registry
        .submit_guess(&lobby.id, pat, "glacier", start + Duration::from_secs(30))
        .unwrap();
    registry.end_round(&lobby.id).unwrap();

    // Both Pat and Lee have 3 points; Pat joined first
    for _ in 0..5 {
        let state = registry.end_game(&lobby.id, lobby.host).unwrap();
        let winner = state.winner.unwrap();
        assert_eq!(winner.id, pat);
        assert_eq!(winner.score, 3);
        assert_eq!(state.status, GameStatus::Ended);
    }
}

#[test]
fn test_end_game_straight_from_playing() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);
    registry
        .start_game(&lobby.id, lobby.host, Instant::now())
        .unwrap();

    let state = registry.end_game(&lobby.id, lobby.host).unwrap();
    assert_eq!(state.status, GameStatus::Ended);
    assert_eq!(state.winner.unwrap().id, lobby.host);
    assert!(matches!(
        registry.submit_guess(&lobby.id, lobby.guests[0], "lantern", Instant::now()),
        Err(SessionError::InvalidState(_))
    ));
}

#[test]
fn test_host_leaving_transfers_host() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat"]);

    let outcome = registry.leave_lobby(&lobby.id, lobby.host).unwrap();
    match outcome {
        LeaveOutcome::Remaining(snapshot) => {
            assert_eq!(snapshot.host_id, lobby.guests[0]);
            assert_eq!(snapshot.players.len(), 1);
        }
        other => panic!("Expected lobby to remain, got {:?}", other),
    }
    assert!(registry.get(&lobby.id).is_some());
    assert!(registry.lobby_of(lobby.host).is_none());
}

#[test]
fn test_last_member_leaving_deletes_lobby() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &[]);

    let outcome = registry.leave_lobby(&lobby.id, lobby.host).unwrap();
    assert_eq!(outcome, LeaveOutcome::Disbanded(lobby.id.clone()));
    assert!(registry.get(&lobby.id).is_none());
    assert!(registry.is_empty());
    assert!(matches!(
        registry.join_lobby(&lobby.id, Uuid::new_v4(), "Pat"),
        Err(SessionError::LobbyNotFound(_))
    ));
}

#[test]
fn test_disconnect_matches_leave() {
    let mut registry = create_test_registry();
    let lobby = create_lobby_with_guests(&mut registry, &["Pat", "Lee"]);

    let outcome = registry.handle_disconnect(lobby.host).unwrap();
    assert_eq!(outcome.lobby_id(), lobby.id);
    match outcome {
        LeaveOutcome::Remaining(snapshot) => {
            assert_eq!(snapshot.host_id, lobby.guests[0]);
            assert_eq!(snapshot.member_ids(), lobby.guests);
        }
        other => panic!("Expected lobby to remain, got {:?}", other),
    }
    assert!(registry.handle_disconnect(lobby.host).is_none());
}
