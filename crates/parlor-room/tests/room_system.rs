//! Integration tests for room actors and the registry: seating,
//! broadcasts, restarts, timers, and result recording.

use std::sync::Arc;
use std::time::Duration;

use parlor_games::{
    GameAction, GameKind, GameState, Mark, PongAction, RoundOutcome,
    TicTacToeAction,
};
use parlor_protocol::{Identity, PlayerId, ServerMessage};
use parlor_room::{RoomError, RoomRegistry};
use parlor_score::{NullRecorder, ScoreBoard};
use tokio::sync::mpsc;
use tokio::time::timeout;

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn registry() -> RoomRegistry {
    RoomRegistry::new(Arc::new(NullRecorder))
}

fn player(id: u64) -> Identity {
    Identity::recognized(PlayerId(id))
}

fn ttt_move(row: usize, col: usize) -> GameAction {
    GameAction::TicTacToe(TicTacToeAction::Move { row, col })
}

async fn next_msg(inbox: &mut Inbox) -> ServerMessage {
    timeout(Duration::from_secs(5), inbox.recv())
        .await
        .expect("timed out waiting for a room broadcast")
        .expect("room channel closed")
}

/// Receives until the next state update, skipping join/start chatter.
async fn next_update(inbox: &mut Inbox) -> GameState {
    loop {
        if let ServerMessage::Update { state, .. } = next_msg(inbox).await {
            return state;
        }
    }
}

// =========================================================================
// Seating
// =========================================================================

#[tokio::test]
async fn test_joins_assign_seats_in_order() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::TicTacToe, "den");
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();

    let seat1 = room.join(player(1), tx1).await.expect("join should succeed");
    let seat2 = room.join(player(2), tx2).await.expect("join should succeed");
    assert_eq!(seat1, Some(0));
    assert_eq!(seat2, Some(1));

    // The first player sees both joins, then the start announcement.
    assert!(matches!(
        next_msg(&mut rx1).await,
        ServerMessage::Joined { player_id: PlayerId(1), seat: Some(0), .. }
    ));
    assert!(matches!(
        next_msg(&mut rx1).await,
        ServerMessage::Joined { player_id: PlayerId(2), seat: Some(1), .. }
    ));
    assert!(matches!(next_msg(&mut rx1).await, ServerMessage::Started { .. }));

    // The second player joined last and sees only their own join.
    assert!(matches!(
        next_msg(&mut rx2).await,
        ServerMessage::Joined { player_id: PlayerId(2), .. }
    ));
    assert!(matches!(next_msg(&mut rx2).await, ServerMessage::Started { .. }));
}

#[tokio::test]
async fn test_join_full_room_without_spectators_is_refused() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::TicTacToe, "den");
    let (tx, _rx) = mpsc::unbounded_channel();

    room.join(player(1), tx.clone()).await.unwrap();
    room.join(player(2), tx.clone()).await.unwrap();

    let result = room.join(player(3), tx).await;
    assert!(matches!(result, Err(RoomError::RoomFull(GameKind::TicTacToe, _))));
}

#[tokio::test]
async fn test_join_full_pong_room_admits_spectator() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::Pong, "court");
    let (tx, _rx) = mpsc::unbounded_channel();

    room.join(player(1), tx.clone()).await.unwrap();
    room.join(player(2), tx.clone()).await.unwrap();

    let seat = room.join(player(3), tx).await.expect("spectator join");
    assert_eq!(seat, None, "overflow joiner watches without a seat");
}

#[tokio::test]
async fn test_duplicate_join_is_refused() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::Snake, "pit");
    let (tx, _rx) = mpsc::unbounded_channel();

    room.join(player(1), tx.clone()).await.unwrap();
    let result = room.join(player(1), tx).await;

    assert!(matches!(
        result,
        Err(RoomError::AlreadyInRoom(PlayerId(1), GameKind::Snake, _))
    ));
}

#[tokio::test]
async fn test_leave_frees_the_seat_and_shifts_later_seats() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::TicTacToe, "den");
    let (tx, _rx) = mpsc::unbounded_channel();

    room.join(player(1), tx.clone()).await.unwrap();
    room.join(player(2), tx.clone()).await.unwrap();
    room.leave(PlayerId(1)).await.expect("leave should succeed");

    // Player 2 slid into seat 0; a new joiner takes seat 1.
    let seat = room.join(player(3), tx).await.unwrap();
    assert_eq!(seat, Some(1));

    let info = room.info().await.unwrap();
    assert_eq!(info.seated, 2);
    assert_eq!(info.members, 2);
}

#[tokio::test]
async fn test_leave_without_join_is_an_error() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::Tetris, "well");

    let result = room.leave(PlayerId(9)).await;
    assert!(matches!(
        result,
        Err(RoomError::NotInRoom(PlayerId(9), GameKind::Tetris, _))
    ));
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_registry_reuses_rooms_by_game_and_key() {
    let registry = registry();

    let a = registry.get_or_create(GameKind::Snake, "lobby");
    let b = registry.get_or_create(GameKind::Snake, "lobby");
    assert_eq!(registry.room_count(), 1);
    assert_eq!(a.key(), b.key());

    // The same key under another game names a different room.
    registry.get_or_create(GameKind::TicTacToe, "lobby");
    assert_eq!(registry.room_count(), 2);

    assert!(registry.get(GameKind::Snake, "lobby").is_some());
    assert!(registry.get(GameKind::Pong, "lobby").is_none());
}

// =========================================================================
// Play
// =========================================================================

#[tokio::test]
async fn test_full_tictactoe_game_reaches_a_recorded_win() {
    let board = Arc::new(ScoreBoard::new());
    let registry = RoomRegistry::new(board.clone());
    let room = registry.get_or_create(GameKind::TicTacToe, "den");

    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    room.join(player(1), tx1).await.unwrap();
    room.join(player(2), tx2).await.unwrap();

    // X takes the top row while O plays the middle row.
    let script = [
        (PlayerId(1), ttt_move(0, 0)),
        (PlayerId(2), ttt_move(1, 0)),
        (PlayerId(1), ttt_move(0, 1)),
        (PlayerId(2), ttt_move(1, 1)),
        (PlayerId(1), ttt_move(0, 2)),
    ];
    for (who, action) in script {
        room.action(who, action).await.unwrap();
    }

    // Five actions, five updates; the last one is terminal.
    let mut last = None;
    for _ in 0..5 {
        last = Some(next_update(&mut rx1).await);
    }
    match last {
        Some(GameState::TicTacToe(s)) => {
            assert_eq!(s.outcome, Some(RoundOutcome::Won(Mark::X)));
        }
        other => panic!("expected a tic-tac-toe update, got {other:?}"),
    }

    // Win and loss both recorded, winner on top.
    let top = board.leaderboard(GameKind::TicTacToe, 10);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].player_id, PlayerId(1));
    assert_eq!(top[0].score, 1.0);
    assert_eq!(top[1].score, 0.0);
}

#[tokio::test]
async fn test_guest_results_are_not_recorded() {
    let board = Arc::new(ScoreBoard::new());
    let registry = RoomRegistry::new(board.clone());
    let room = registry.get_or_create(GameKind::TicTacToe, "den");

    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    room.join(player(1), tx1).await.unwrap();
    room.join(Identity::guest(PlayerId(2)), tx2).await.unwrap();

    let script = [
        (PlayerId(1), ttt_move(0, 0)),
        (PlayerId(2), ttt_move(1, 0)),
        (PlayerId(1), ttt_move(0, 1)),
        (PlayerId(2), ttt_move(1, 1)),
        (PlayerId(1), ttt_move(0, 2)),
    ];
    for (who, action) in script {
        room.action(who, action).await.unwrap();
    }
    for _ in 0..5 {
        next_update(&mut rx1).await;
    }

    // Only the recognized winner shows up.
    let top = board.leaderboard(GameKind::TicTacToe, 10);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].player_id, PlayerId(1));
}

#[tokio::test]
async fn test_rejected_action_still_echoes_the_state() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::TicTacToe, "den");
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    room.join(player(1), tx1).await.unwrap();
    room.join(player(2), tx2).await.unwrap();

    // Out of turn: seat 1 moves first. The move is ignored but the
    // authoritative state is still broadcast.
    room.action(PlayerId(2), ttt_move(1, 1)).await.unwrap();

    match next_update(&mut rx1).await {
        GameState::TicTacToe(s) => {
            assert_eq!(s.turn, 0, "turn unchanged");
            assert!(s.board.iter().flatten().all(Option::is_none));
        }
        other => panic!("expected a tic-tac-toe update, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_action_from_non_member_is_silently_dropped() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::TicTacToe, "den");
    let (tx, mut rx) = mpsc::unbounded_channel();
    room.join(player(1), tx).await.unwrap();
    next_msg(&mut rx).await; // own join

    room.action(PlayerId(99), ttt_move(0, 0)).await.unwrap();

    let got = tokio::select! {
        msg = next_msg(&mut rx) => Some(msg),
        _ = tokio::time::sleep(Duration::from_secs(1)) => None,
    };
    assert!(got.is_none(), "non-member actions produce no broadcast");
}

#[tokio::test]
async fn test_restart_replaces_state_and_keeps_seats() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::TicTacToe, "den");
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    room.join(player(1), tx1).await.unwrap();
    room.join(player(2), tx2).await.unwrap();

    let script = [
        (PlayerId(1), ttt_move(0, 0)),
        (PlayerId(2), ttt_move(1, 0)),
        (PlayerId(1), ttt_move(0, 1)),
        (PlayerId(2), ttt_move(1, 1)),
        (PlayerId(1), ttt_move(0, 2)),
    ];
    for (who, action) in script {
        room.action(who, action).await.unwrap();
    }
    for _ in 0..5 {
        next_update(&mut rx1).await;
    }

    room.restart(PlayerId(2)).await.unwrap();
    match next_update(&mut rx1).await {
        GameState::TicTacToe(s) => {
            assert!(s.board.iter().flatten().all(Option::is_none));
            assert!(s.outcome.is_none());
        }
        other => panic!("expected a fresh board, got {other:?}"),
    }

    // Player 1 is still seat 0 (X) and moves first in the new round.
    room.action(PlayerId(1), ttt_move(2, 2)).await.unwrap();
    match next_update(&mut rx1).await {
        GameState::TicTacToe(s) => {
            assert_eq!(s.board[2][2], Some(Mark::X));
        }
        other => panic!("expected a tic-tac-toe update, got {other:?}"),
    }
}

// =========================================================================
// Timers
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_snake_room_ticks_move_the_snake() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::Snake, "pit");
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Quota is one seat: the first join starts the timers.
    room.join(player(1), tx).await.unwrap();
    assert!(matches!(next_msg(&mut rx).await, ServerMessage::Joined { .. }));
    assert!(matches!(next_msg(&mut rx).await, ServerMessage::Started { .. }));

    let first = match next_update(&mut rx).await {
        GameState::Snake(s) => s.body[0],
        other => panic!("expected a snake update, got {other:?}"),
    };
    let second = match next_update(&mut rx).await {
        GameState::Snake(s) => s.body[0],
        other => panic!("expected a snake update, got {other:?}"),
    };
    assert_ne!(first, second, "each tick advances the head");
}

#[tokio::test(start_paused = true)]
async fn test_snake_death_records_a_shared_score() {
    let board = Arc::new(ScoreBoard::new());
    let registry = RoomRegistry::new(board.clone());
    let room = registry.get_or_create(GameKind::Snake, "pit");
    let (tx, mut rx) = mpsc::unbounded_channel();
    room.join(player(1), tx).await.unwrap();

    // Heading right from the center, the snake reaches the wall within
    // a few dozen ticks (unless it happens to eat on the way).
    let mut over = false;
    for _ in 0..200 {
        if let GameState::Snake(s) = next_update(&mut rx).await {
            if s.game_over {
                over = true;
                break;
            }
        }
    }
    assert!(over, "snake should eventually die at the wall");
    assert_eq!(board.result_count(GameKind::Snake), 1);

    // Terminal state pauses the timers: no further updates arrive.
    let got = tokio::select! {
        msg = next_msg(&mut rx) => Some(msg),
        _ = tokio::time::sleep(Duration::from_secs(2)) => None,
    };
    assert!(got.is_none(), "no tick broadcasts after game over");
}

#[tokio::test(start_paused = true)]
async fn test_tetris_room_gravity_advances_and_locks_the_piece() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::Tetris, "well");
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Quota is one seat: the first join starts the timers.
    room.join(player(1), tx).await.unwrap();
    assert!(matches!(next_msg(&mut rx).await, ServerMessage::Joined { .. }));
    assert!(matches!(next_msg(&mut rx).await, ServerMessage::Started { .. }));

    let first = match next_update(&mut rx).await {
        GameState::Tetris(s) => s.row,
        other => panic!("expected a tetris update, got {other:?}"),
    };
    let second = match next_update(&mut rx).await {
        GameState::Tetris(s) => s.row,
        other => panic!("expected a tetris update, got {other:?}"),
    };
    assert_eq!(second, first + 1, "gravity moves the piece one row per tick");

    // Left alone, the piece reaches the floor and freezes into the well.
    let mut locked = false;
    for _ in 0..60 {
        if let GameState::Tetris(s) = next_update(&mut rx).await {
            if s.board.iter().flatten().any(|&cell| cell) {
                locked = true;
                break;
            }
        }
    }
    assert!(locked, "the piece should lock within a board's worth of ticks");
}

#[tokio::test(start_paused = true)]
async fn test_pong_ready_exchange_starts_the_match() {
    let registry = registry();
    let room = registry.get_or_create(GameKind::Pong, "court");
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    room.join(player(1), tx1).await.unwrap();
    room.join(player(2), tx2).await.unwrap();

    room.action(PlayerId(1), GameAction::Pong(PongAction::Ready))
        .await
        .unwrap();
    room.action(PlayerId(2), GameAction::Pong(PongAction::Ready))
        .await
        .unwrap();

    // Ticks broadcast static state until the second ready flips the
    // match in progress; then Started goes out and the ball moves.
    let mut started = false;
    for _ in 0..50 {
        if matches!(next_msg(&mut rx1).await, ServerMessage::Started { .. }) {
            started = true;
            break;
        }
    }
    assert!(started, "second ready should announce the start");

    let (x0, y0) = match next_update(&mut rx1).await {
        GameState::Pong(s) => (s.ball.x, s.ball.y),
        other => panic!("expected a pong update, got {other:?}"),
    };
    let moved = loop {
        match next_update(&mut rx1).await {
            GameState::Pong(s) => {
                if (s.ball.x, s.ball.y) != (x0, y0) {
                    break true;
                }
            }
            other => panic!("expected a pong update, got {other:?}"),
        }
    };
    assert!(moved);
}
