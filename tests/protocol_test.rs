//! Tests for decoding server frames.

use gravity_four::{Cell, Inbound, ProtocolError, SessionIdentity, decode_server_frame};

fn update(text: &str) -> gravity_four::ServerUpdate {
    match decode_server_frame(text) {
        Ok(Inbound::Update(update)) => *update,
        other => panic!("expected an update, got {other:?}"),
    }
}

#[test]
fn test_full_frame_decodes() {
    let update = update(
        r#"{
            "message": "Your Turn.",
            "playerIndex": 1,
            "playerTurn": true,
            "game": {
                "grid": [[-1, -1, -1], [-1, -1, -1], [0, -1, -1]],
                "isOver": false,
                "turn": 1,
                "players": [{"name": "alice"}, {"name": "bob"}]
            }
        }"#,
    );

    assert_eq!(*update.identity(), SessionIdentity::player(1));
    assert!(*update.server_turn_hint());

    let snapshot = update.snapshot();
    assert_eq!(snapshot.status_message(), "Your Turn.");
    assert_eq!(snapshot.grid().row_count(), 3);
    assert_eq!(snapshot.grid().column_count(), 3);
    assert_eq!(snapshot.grid().cell_at(0, 2).unwrap(), Cell::Occupied(0));
    assert_eq!(snapshot.active_index(), Some(1));

    let bob = &snapshot.players()[1];
    assert_eq!((*bob.index(), bob.display_name().as_str(), *bob.color_index()), (1, "bob", 1));
}

#[test]
fn test_optional_fields_default() {
    let update = update(r#"{"message": "Waiting.", "playerIndex": 0, "game": {"grid": [[-1]], "turn": 0}}"#);
    assert!(!update.snapshot().is_game_over());
    assert!(update.snapshot().players().is_empty());
    assert_eq!(update.snapshot().active_index(), None);
    assert!(!*update.server_turn_hint());
}

#[test]
fn test_spectator_markers() {
    let by_index = update(r#"{"message": "m", "playerIndex": -1, "game": {"grid": [[-1]], "turn": 0}}"#);
    assert_eq!(*by_index.identity(), SessionIdentity::spectator());

    let by_flag = update(
        r#"{"message": "m", "playerIndex": 0, "isSpectator": true, "game": {"grid": [[-1]], "turn": 0}}"#,
    );
    assert_eq!(*by_flag.identity(), SessionIdentity::spectator());
}

#[test]
fn test_frames_without_message_are_ignored() {
    for text in [r#"{"game": {"grid": [[-1]], "turn": 0}}"#, "[]", "42", r#""Game Full.""#] {
        assert_eq!(decode_server_frame(text), Ok(Inbound::Ignored), "{text}");
    }
}

#[test]
fn test_malformed_game_payloads() {
    for text in [
        r#"{"message": "m", "playerIndex": 0}"#,
        r#"{"message": "m", "playerIndex": 0, "game": {"grid": [], "turn": 0}}"#,
        r#"{"message": "m", "playerIndex": 0, "game": {"grid": [[-1, -1], [-1]], "turn": 0}}"#,
        r#"{"message": "m", "playerIndex": 0, "game": {"grid": [[-2]], "turn": 0}}"#,
        r#"{"message": "m", "playerIndex": -5, "game": {"grid": [[-1]], "turn": 0}}"#,
        r#"{"message": "m", "playerIndex": 0, "game": {"grid": [[-1]], "turn": -1}}"#,
    ] {
        assert!(
            matches!(decode_server_frame(text), Err(ProtocolError::MalformedMessage(_))),
            "{text}"
        );
    }
}
