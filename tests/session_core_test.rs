//! Tests for the sans-I/O session state machine.

mod common;

use common::{empty_wire, game_frame};
use gravity_four::{
    CONNECTION_TERMINATED_MESSAGE, CloseKind, ConnectionState, Placement, SessionCore,
    SessionEvent, SessionIdentity,
};
use serde_json::{Value, json};

fn open_core() -> SessionCore {
    let mut core = SessionCore::new();
    assert_eq!(core.on_open(), vec![SessionEvent::Opened]);
    core
}

fn as_json(frame: &str) -> Value {
    serde_json::from_str(frame).unwrap()
}

#[test]
fn test_two_player_scenario() {
    let mut core = open_core();

    // Player 0 on an empty 6x7 board, turn 0.
    let events = core.on_frame(&game_frame(
        "Your turn.",
        0,
        &empty_wire(6, 7),
        0,
        false,
        &["alice", "bob"],
    ));
    assert_eq!(events.len(), 1);
    assert!(*core.view().unwrap().is_local_players_turn());

    let outgoing = core.request_move(3, 5).expect("bottom-row move is legal");
    assert_eq!(*outgoing.placement(), Placement::new(3, 5, 38));
    assert_eq!(as_json(outgoing.frame()), json!({ "placement": 38 }));

    // Server accepts: piece at (3,5), turn passes to player 1.
    let mut grid = empty_wire(6, 7);
    grid[5][3] = 0;
    core.on_frame(&game_frame("bob's turn.", 0, &grid, 1, false, &["alice", "bob"]));

    let view = core.view().unwrap();
    assert!(!*view.is_local_players_turn());
    assert_eq!(*view.active_player_index(), Some(1));
    assert_eq!(*view.highlighted_player_index(), Some(1));

    // Not our turn: even a legal cell is not sent.
    assert_eq!(core.request_move(3, 4), None);
}

/// Frame shape of a server that keeps its roster private.
fn rosterless_frame(message: &str, player_index: i64, player_turn: bool) -> String {
    json!({
        "game": { "grid": empty_wire(6, 7), "turn": 0, "gameId": "abc" },
        "message": message,
        "playerTurn": player_turn,
        "playerIndex": player_index,
    })
    .to_string()
}

#[test]
fn test_rosterless_server_turn_flag_allows_move() {
    let mut core = open_core();
    let frame = format!(
        r#"{{"game":{{"grid":{},"turn":0,"gameId":"abc"}},"message":"Your Turn.","playerTurn":true,"playerIndex":0}}"#,
        serde_json::to_string(&empty_wire(6, 7)).unwrap()
    );

    let events = core.on_frame(&frame);
    assert_eq!(events.len(), 1);
    let view = core.view().unwrap();
    assert!(view.roster().is_empty());
    assert!(*view.is_local_players_turn());
    assert_eq!(*view.active_player_index(), None);

    let outgoing = core.request_move(3, 5).expect("server says it is our turn");
    assert_eq!(as_json(outgoing.frame()), json!({ "placement": 38 }));
}

#[test]
fn test_rosterless_server_waiting_blocks_move() {
    let mut core = open_core();
    core.on_frame(&rosterless_frame("Waiting for opponent.", 1, false));
    assert!(!*core.view().unwrap().is_local_players_turn());
    assert_eq!(core.request_move(3, 5), None);

    // A rosterless spectator never moves, whatever the flag says.
    let mut viewer = open_core();
    viewer.on_frame(&rosterless_frame("Watching.", -1, true));
    assert!(!*viewer.view().unwrap().is_local_players_turn());
    assert_eq!(viewer.request_move(3, 5), None);
}

#[test]
fn test_stacking_after_first_piece() {
    let mut core = open_core();
    let mut grid = empty_wire(6, 7);
    grid[5][3] = 0;
    core.on_frame(&game_frame("Your turn.", 1, &grid, 1, false, &["alice", "bob"]));

    assert!(core.request_move(3, 3).is_none());
    let outgoing = core.request_move(3, 4).expect("stacked move is legal");
    assert_eq!(as_json(outgoing.frame()), json!({ "placement": 31 }));
}

#[test]
fn test_no_move_before_first_snapshot() {
    let core = open_core();
    assert_eq!(core.request_move(0, 5), None);
}

#[test]
fn test_no_send_unless_open() {
    let mut core = SessionCore::new();
    assert_eq!(core.request_play_again(), None);
    core.on_open();
    assert!(core.request_play_again().is_some());
    core.on_shutdown();
    assert_eq!(core.request_play_again(), None);
}

#[test]
fn test_frames_before_open_are_dropped() {
    let mut core = SessionCore::new();
    let events = core.on_frame(&game_frame(
        "hi",
        0,
        &empty_wire(6, 7),
        0,
        false,
        &["alice"],
    ));
    assert!(events.is_empty());
    assert!(core.snapshot().is_none());
}

#[test]
fn test_malformed_frame_keeps_previous_snapshot() {
    let mut core = open_core();
    core.on_frame(&game_frame("Your turn.", 0, &empty_wire(6, 7), 0, false, &["alice", "bob"]));
    let before = core.snapshot().cloned();

    let ragged = vec![vec![-1, -1], vec![-1]];
    let events = core.on_frame(&game_frame("bad", 0, &ragged, 1, false, &["alice", "bob"]));

    assert!(events.is_empty());
    assert_eq!(core.snapshot().cloned(), before);
}

#[test]
fn test_identity_fixed_by_first_snapshot() {
    let mut core = open_core();
    core.on_frame(&game_frame("Your turn.", 0, &empty_wire(6, 7), 0, false, &["alice", "bob"]));
    core.on_frame(&game_frame("Hm.", 1, &empty_wire(6, 7), 1, false, &["alice", "bob"]));

    assert_eq!(core.identity(), Some(&SessionIdentity::player(0)));
    assert!(!*core.view().unwrap().is_local_players_turn());
}

#[test]
fn test_spectator_never_gets_turn_or_rematch() {
    let mut core = open_core();
    core.on_frame(&game_frame("Watching.", -1, &empty_wire(6, 7), 0, false, &["alice", "bob"]));
    assert!(!*core.view().unwrap().is_local_players_turn());
    assert!(core.request_move(0, 5).is_none());

    let events = core.on_frame(&game_frame("Over.", -1, &empty_wire(6, 7), 9, true, &["alice", "bob"]));
    assert!(!events.contains(&SessionEvent::OfferRematch));
}

#[test]
fn test_rematch_offered_once_per_round() {
    let mut core = open_core();
    core.on_frame(&game_frame("Go.", 0, &empty_wire(6, 7), 6, false, &["alice", "bob"]));

    let events = core.on_frame(&game_frame("Won.", 0, &empty_wire(6, 7), 7, true, &["alice", "bob"]));
    assert_eq!(events.last(), Some(&SessionEvent::OfferRematch));

    let events = core.on_frame(&game_frame("Won.", 0, &empty_wire(6, 7), 7, true, &["alice", "bob"]));
    assert!(!events.contains(&SessionEvent::OfferRematch));

    core.on_frame(&game_frame("New round.", 0, &empty_wire(6, 7), 0, false, &["alice", "bob"]));
    let events = core.on_frame(&game_frame("Lost.", 0, &empty_wire(6, 7), 8, true, &["alice", "bob"]));
    assert_eq!(events.last(), Some(&SessionEvent::OfferRematch));
}

#[test]
fn test_close_while_playing_is_error() {
    let mut core = open_core();
    core.on_frame(&game_frame("Go.", 0, &empty_wire(6, 7), 0, false, &["alice", "bob"]));

    let events = core.on_closed();
    assert_eq!(
        events,
        vec![
            SessionEvent::ConnectionError {
                message: CONNECTION_TERMINATED_MESSAGE.to_string()
            },
            SessionEvent::Closed(CloseKind::Error),
        ]
    );
    assert_eq!(core.state(), ConnectionState::Closed(CloseKind::Error));
}

#[test]
fn test_close_before_any_snapshot_is_error() {
    let mut core = open_core();
    assert!(matches!(
        core.on_closed().first(),
        Some(SessionEvent::ConnectionError { .. })
    ));
}

#[test]
fn test_close_after_game_over_is_normal() {
    let mut core = open_core();
    core.on_frame(&game_frame("Won.", 0, &empty_wire(6, 7), 7, true, &["alice", "bob"]));

    assert_eq!(core.on_closed(), vec![SessionEvent::Closed(CloseKind::Normal)]);
    assert_eq!(core.state(), ConnectionState::Closed(CloseKind::Normal));
}

#[test]
fn test_error_always_surfaces() {
    let mut core = open_core();
    core.on_frame(&game_frame("Won.", 0, &empty_wire(6, 7), 7, true, &["alice", "bob"]));

    let events = core.on_error("reset by peer");
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], SessionEvent::ConnectionError { .. }));
}

#[test]
fn test_terminal_state_is_sticky() {
    let mut core = open_core();
    core.on_shutdown();

    assert!(core.on_closed().is_empty());
    assert!(core.on_error("late").is_empty());
    assert!(core.on_shutdown().is_empty());
    assert!(core.on_open().is_empty());
    assert_eq!(core.state(), ConnectionState::Closed(CloseKind::Normal));
}
