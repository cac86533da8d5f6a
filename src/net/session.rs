//! One two-player game session.
//!
//! A session is a single task that owns its `Game` and the write halves of
//! both peer connections. Each peer additionally gets a small reader task
//! that decodes move frames and forwards them into one shared channel, so
//! the session has exactly one place where it waits for input from either
//! side. Only the session writes to the sockets, which keeps every peer's
//! view of the board in production order.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::board::Layout;
use crate::engine::game::{Game, MoveReport};
use crate::engine::types::{ChessError, Color, Move, Outcome};

use super::frames::{self, Update};
use super::registry::{SessionId, SessionRegistry, SessionState};

// ---------------------------------------------------------------------------
// Events & results
// ---------------------------------------------------------------------------

/// Input from one of the two peer readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerEvent {
    Move { side: Color, mv: Move },
    /// The peer's stream closed or broke.
    Gone { side: Color },
}

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Checkmate { winner: Color },
    Stalemate,
    /// The peer sent the disconnect sentinel.
    PeerLeft(Color),
    /// The peer's connection closed or failed.
    PeerLost(Color),
    /// The board reached a state the engine refuses to judge.
    Fault(String),
}

impl SessionEnd {
    pub fn describe(&self) -> String {
        match self {
            SessionEnd::Checkmate { winner } => format!("checkmate, {winner} wins"),
            SessionEnd::Stalemate => "stalemate".to_string(),
            SessionEnd::PeerLeft(side) => format!("{side} left"),
            SessionEnd::PeerLost(side) => format!("{side} disconnected"),
            SessionEnd::Fault(msg) => format!("fault: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Start a session for two connected peers.
///
/// Returns the session ID and the handle of the session task, which resolves
/// to how the game ended.
pub async fn spawn_session<S>(
    white: S,
    black: S,
    layout: Layout,
    registry: Arc<SessionRegistry>,
) -> Result<(SessionId, JoinHandle<SessionEnd>), ChessError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let game = Game::new(layout)?;
    let id = registry.register().await;

    let (white_rx, white_tx) = tokio::io::split(white);
    let (black_rx, black_tx) = tokio::io::split(black);

    let (events_tx, events) = mpsc::unbounded_channel();
    let readers = vec![
        tokio::spawn(read_peer(id, Color::White, white_rx, events_tx.clone())),
        tokio::spawn(read_peer(id, Color::Black, black_rx, events_tx)),
    ];

    let session = GameSession {
        id,
        game,
        writers: [white_tx, black_tx],
        events,
        readers,
        registry,
        state: SessionState::AwaitingPeers,
    };
    Ok((id, tokio::spawn(session.run())))
}

/// Reader task: forward every decoded move, then report the stream's end.
async fn read_peer<R>(
    id: SessionId,
    side: Color,
    mut reader: R,
    events: mpsc::UnboundedSender<PeerEvent>,
) where
    R: AsyncRead + Unpin,
{
    loop {
        match frames::read_move(&mut reader).await {
            Ok(mv) => {
                if events.send(PeerEvent::Move { side, mv }).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(session = %id, %side, error = %e, "peer stream ended");
                let _ = events.send(PeerEvent::Gone { side });
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// A running session. Writers are indexed by `Color::index()`.
pub struct GameSession<W> {
    id: SessionId,
    game: Game,
    writers: [W; 2],
    events: mpsc::UnboundedReceiver<PeerEvent>,
    readers: Vec<JoinHandle<()>>,
    registry: Arc<SessionRegistry>,
    state: SessionState,
}

impl<W> GameSession<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to completion and release both connections.
    pub async fn run(mut self) -> SessionEnd {
        let end = self.play_out().await;
        self.shutdown(&end).await;
        end
    }

    async fn play_out(&mut self) -> SessionEnd {
        // AwaitingPeers → Active: assign sides and send the initial board.
        let board = self.game.board().clone();
        for side in [Color::White, Color::Black] {
            let writer = &mut self.writers[side.index()];
            if let Err(e) = frames::write_handshake(writer, side, &board).await {
                warn!(session = %self.id, %side, error = %e, "handshake failed");
                // Only white can already be waiting for updates.
                if side == Color::Black {
                    self.notify(Color::White, &Update::PeerGone).await;
                }
                return SessionEnd::PeerLost(side);
            }
        }
        self.state = SessionState::Active;
        self.sync_registry().await;
        info!(session = %self.id, "session active");

        // A drill layout may already be decided.
        if self.game.is_game_over() {
            let side = self.game.side_to_move();
            let update = Update::after_move(self.game.outcome(), side, board);
            if let Err(lost) = self.broadcast(&update).await {
                return lost;
            }
            return self.ending(self.game.outcome(), !side);
        }

        while let Some(event) = self.events.recv().await {
            match event {
                PeerEvent::Gone { side } => {
                    info!(session = %self.id, %side, "peer disconnected");
                    self.notify(!side, &Update::PeerGone).await;
                    return SessionEnd::PeerLost(side);
                }
                PeerEvent::Move { side, mv } if mv.is_disconnect() => {
                    info!(session = %self.id, %side, "peer left");
                    self.notify(!side, &Update::PeerGone).await;
                    return SessionEnd::PeerLeft(side);
                }
                PeerEvent::Move { side, mv } if side != self.game.side_to_move() => {
                    debug!(session = %self.id, %side, %mv, "ignoring move out of turn");
                }
                PeerEvent::Move { side, mv } => match self.game.play(mv) {
                    Ok(report) => {
                        if let Some(end) = self.publish(report).await {
                            return end;
                        }
                    }
                    Err(ChessError::InvalidMove { reason, .. }) => {
                        debug!(session = %self.id, %side, %mv, reason = %reason, "move rejected");
                    }
                    Err(e) => {
                        error!(session = %self.id, error = %e, "cannot judge position");
                        self.notify(Color::White, &Update::PeerGone).await;
                        self.notify(Color::Black, &Update::PeerGone).await;
                        return SessionEnd::Fault(e.to_string());
                    }
                },
            }
        }

        // Both readers dropped their senders without reporting: cannot happen
        // while the session holds the reader handles, but fail safe.
        SessionEnd::Fault("peer channels closed".to_string())
    }

    /// Push an accepted move to both peers. Returns `Some` when the session
    /// is over.
    async fn publish(&mut self, report: MoveReport) -> Option<SessionEnd> {
        debug!(
            session = %self.id,
            mover = %report.mover,
            mv = %report.mv,
            captured = ?report.effect.captured,
            promoted = report.effect.promoted,
            "move accepted"
        );

        let update = Update::after_move(
            report.outcome,
            self.game.side_to_move(),
            self.game.board().clone(),
        );
        self.sync_registry().await;
        if let Err(lost) = self.broadcast(&update).await {
            return Some(lost);
        }

        if report.outcome.is_terminal() {
            Some(self.ending(report.outcome, report.mover))
        } else {
            None
        }
    }

    fn ending(&self, outcome: Outcome, last_mover: Color) -> SessionEnd {
        match outcome {
            Outcome::Checkmate => SessionEnd::Checkmate { winner: last_mover },
            Outcome::Stalemate => SessionEnd::Stalemate,
            Outcome::Ongoing => SessionEnd::Fault("ended while ongoing".to_string()),
        }
    }

    /// Send to white, then black. A failed write counts as that peer leaving;
    /// the other peer is told and the session ends.
    async fn broadcast(&mut self, update: &Update) -> Result<(), SessionEnd> {
        for side in [Color::White, Color::Black] {
            if let Err(e) = frames::write_update(&mut self.writers[side.index()], update).await {
                warn!(session = %self.id, %side, error = %e, "write failed");
                self.notify(!side, &Update::PeerGone).await;
                return Err(SessionEnd::PeerLost(side));
            }
        }
        Ok(())
    }

    /// Best-effort send to one peer.
    async fn notify(&mut self, side: Color, update: &Update) {
        if let Err(e) = frames::write_update(&mut self.writers[side.index()], update).await {
            debug!(session = %self.id, %side, error = %e, "notify failed");
        }
    }

    async fn sync_registry(&mut self) {
        let state = self.state;
        let side = self.game.side_to_move();
        let moves = self.game.moves_played();
        self.registry
            .update(self.id, |s| {
                s.state = state;
                s.side_to_move = Some(side);
                s.moves_played = moves;
            })
            .await;
    }

    /// Active → Terminated: stop readers, close writers, leave the registry.
    async fn shutdown(&mut self, end: &SessionEnd) {
        self.state = SessionState::Terminated;
        for reader in &self.readers {
            reader.abort();
        }
        for writer in &mut self.writers {
            let _ = writer.shutdown().await;
        }
        self.registry.finish(self.id).await;
        info!(
            session = %self.id,
            moves = self.game.moves_played(),
            result = %end.describe(),
            "session terminated"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
