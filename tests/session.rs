//! Integration tests for the session protocol over real TCP.
//!
//! Spins up the pairing server on an OS-assigned port and drives it with
//! `PeerClient`s: pair → handshake → moves → termination.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use chess_duel::api::router::create_router;
use chess_duel::api::state::AppState;
use chess_duel::config::AppConfig;
use chess_duel::engine::board::{Board, Layout};
use chess_duel::engine::types::{Color, Coord, Move, PieceType};
use chess_duel::net::{serve, PeerClient, ProtocolError, SessionRegistry, Update};

/// Helper: start the game server, return its address and registry.
async fn start_server(layout: Layout) -> (SocketAddr, Arc<SessionRegistry>) {
    let registry = SessionRegistry::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, layout, registry.clone()));
    (addr, registry)
}

/// Helper: connect white, then black, and wait for both handshakes.
async fn pair(addr: SocketAddr) -> (PeerClient, PeerClient) {
    let white = tokio::spawn(PeerClient::connect(addr));
    // Give the server a moment so white is accepted first.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let black = PeerClient::connect(addr);
    let (white, black) = tokio::join!(white, black);
    (white.unwrap().unwrap(), black.unwrap())
}

/// Helper: next update with a timeout.
async fn next(client: &mut PeerClient) -> Update {
    tokio::time::timeout(Duration::from_secs(5), client.next_update())
        .await
        .expect("timed out waiting for update")
        .expect("stream error")
}

/// Helper: poll the registry until it reports `n` live sessions.
async fn wait_for_sessions(registry: &SessionRegistry, n: usize) {
    for _ in 0..100 {
        if registry.active_count().await == n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("registry never reached {n} sessions");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handshake_assigns_sides_in_connection_order() {
    let (addr, _) = start_server(Layout::Standard).await;
    let (white, black) = pair(addr).await;

    assert_eq!(white.side(), Color::White);
    assert_eq!(black.side(), Color::Black);
    assert_eq!(white.board(), &Board::standard());
    assert_eq!(black.board(), &Board::standard());
}

#[tokio::test]
async fn legal_move_reaches_both_peers() {
    let (addr, _) = start_server(Layout::Standard).await;
    let (mut white, mut black) = pair(addr).await;

    white.send_move(Move::from_parts(4, 1, 4, 3)).await.unwrap();
    let expected = Update::Turn {
        side: Color::Black,
        board: {
            let mut b = Board::standard();
            b.clear(Coord::new(4, 1));
            b.put(Coord::new(4, 3), PieceType::Pawn, Color::White);
            b
        },
    };
    assert_eq!(next(&mut white).await, expected);
    assert_eq!(next(&mut black).await, expected);
    assert_eq!(white.board(), black.board());
}

#[tokio::test]
async fn illegal_and_out_of_turn_moves_are_ignored() {
    let (addr, _) = start_server(Layout::Standard).await;
    let (mut white, mut black) = pair(addr).await;

    // Rook blocked by its own pawn, then black trying to move first.
    white.send_move(Move::from_parts(0, 0, 0, 4)).await.unwrap();
    black.send_move(Move::from_parts(0, 6, 0, 5)).await.unwrap();
    // Let both land before white's turn is used up.
    tokio::time::sleep(Duration::from_millis(100)).await;
    // The first frame anyone sees is the reply to this legal move.
    white.send_move(Move::from_parts(1, 0, 2, 2)).await.unwrap();

    match next(&mut black).await {
        Update::Turn { side, board } => {
            assert_eq!(side, Color::Black);
            assert!(board.is_empty_at(Coord::new(1, 0)));
            assert!(board.is_empty_at(Coord::new(0, 5)));
            assert!(!board.is_empty_at(Coord::new(0, 6)));
        }
        other => panic!("expected turn update, got {other:?}"),
    }
}

#[tokio::test]
async fn sentinel_notifies_the_other_peer() {
    let (addr, registry) = start_server(Layout::Standard).await;
    let (white, mut black) = pair(addr).await;
    wait_for_sessions(&registry, 1).await;

    white.disconnect().await.unwrap();
    assert_eq!(next(&mut black).await, Update::PeerGone);
    wait_for_sessions(&registry, 0).await;
    assert_eq!(registry.completed_count(), 1);
}

#[tokio::test]
async fn dropped_connection_notifies_survivor() {
    let (addr, _) = start_server(Layout::Standard).await;
    let (mut white, black) = pair(addr).await;

    drop(black);
    assert_eq!(next(&mut white).await, Update::PeerGone);
    // The session then releases white's connection too.
    let closed = tokio::time::timeout(Duration::from_secs(5), white.next_update())
        .await
        .expect("timed out waiting for close");
    assert!(matches!(closed, Err(ProtocolError::Closed)));
}

#[tokio::test]
async fn checkmate_is_broadcast_and_ends_session() {
    let (addr, registry) = start_server(Layout::Standard).await;
    let (mut white, mut black) = pair(addr).await;

    let plies = [[2, 1, 2, 2], [3, 6, 3, 4], [1, 1, 1, 3], [4, 7, 0, 3]];
    for (i, raw) in plies.into_iter().enumerate() {
        let mover = if i % 2 == 0 { &mut white } else { &mut black };
        mover.send_move(Move::from_wire(raw)).await.unwrap();
        let a = next(&mut white).await;
        let b = next(&mut black).await;
        assert_eq!(a, b);
        if i == plies.len() - 1 {
            assert!(matches!(a, Update::Checkmate { .. }));
        } else {
            assert!(!a.is_final());
        }
    }
    wait_for_sessions(&registry, 0).await;
}

#[tokio::test]
async fn endgame_layout_ends_right_after_handshake() {
    let (addr, _) = start_server(Layout::Endgame).await;
    let (mut white, mut black) = pair(addr).await;

    assert_eq!(white.board(), &Board::endgame());
    assert_eq!(
        next(&mut white).await,
        Update::Checkmate {
            board: Board::endgame()
        }
    );
    assert_eq!(
        next(&mut black).await,
        Update::Checkmate {
            board: Board::endgame()
        }
    );
}

#[tokio::test]
async fn concurrent_sessions_are_independent() {
    let (addr, registry) = start_server(Layout::Standard).await;
    let (mut white_a, mut black_a) = pair(addr).await;
    let (mut white_b, mut black_b) = pair(addr).await;
    wait_for_sessions(&registry, 2).await;

    white_a.send_move(Move::from_parts(0, 1, 0, 2)).await.unwrap();
    white_b.send_move(Move::from_parts(7, 1, 7, 3)).await.unwrap();

    let a = next(&mut black_a).await;
    let b = next(&mut black_b).await;
    next(&mut white_a).await;
    next(&mut white_b).await;

    let board_a = a.board().unwrap();
    let board_b = b.board().unwrap();
    assert!(board_a.is_empty_at(Coord::new(0, 1)));
    assert!(!board_a.is_empty_at(Coord::new(7, 1)));
    assert!(board_b.is_empty_at(Coord::new(7, 1)));
    assert!(!board_b.is_empty_at(Coord::new(0, 1)));

    // Ending one session leaves the other playable.
    white_a.disconnect().await.unwrap();
    assert_eq!(next(&mut black_a).await, Update::PeerGone);

    black_b.send_move(Move::from_parts(0, 6, 0, 5)).await.unwrap();
    assert_eq!(next(&mut white_b).await.code(), b'w');
    wait_for_sessions(&registry, 1).await;
}

#[tokio::test]
async fn status_api_lists_live_sessions() {
    let (addr, registry) = start_server(Layout::Standard).await;

    let app = create_router(AppState::new(AppConfig::default(), registry.clone()));
    let http = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", http.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(http, app).await.unwrap();
    });

    let (mut white, mut black) = pair(addr).await;
    white.send_move(Move::from_parts(3, 1, 3, 2)).await.unwrap();
    next(&mut white).await;
    next(&mut black).await;

    let client = reqwest::Client::new();
    let list: serde_json::Value = client
        .get(format!("{base}/api/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["total"], 1);
    let session = &list["sessions"][0];
    assert_eq!(session["state"], "active");
    assert_eq!(session["sideToMove"], "black");
    assert_eq!(session["movesPlayed"], 1);

    let id = session["id"].as_str().unwrap();
    let resp = client
        .get(format!("{base}/api/sessions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let health: serde_json::Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["activeSessions"], 1);
}
