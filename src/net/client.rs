//! Peer side of the session protocol.
//!
//! `PeerClient` is what a presentation layer talks to: it performs the
//! handshake, keeps the latest board, sends moves and yields updates.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::engine::board::Board;
use crate::engine::types::{Color, Move};

use super::frames::{self, ProtocolError, Update};

/// A connected player.
#[derive(Debug)]
pub struct PeerClient<S = TcpStream> {
    stream: S,
    side: Color,
    board: Board,
}

impl PeerClient<TcpStream> {
    /// Connect to a server and wait until paired with an opponent.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Self::handshake(stream).await
    }
}

impl<S> PeerClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read the side assignment and initial board from an open stream.
    pub async fn handshake(mut stream: S) -> Result<Self, ProtocolError> {
        let (side, board) = frames::read_handshake(&mut stream).await?;
        Ok(Self {
            stream,
            side,
            board,
        })
    }

    /// The side this peer plays.
    pub fn side(&self) -> Color {
        self.side
    }

    /// The most recent board received from the server.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub async fn send_move(&mut self, mv: Move) -> Result<(), ProtocolError> {
        frames::write_move(&mut self.stream, mv).await
    }

    /// Wait for the next server update and remember its board.
    pub async fn next_update(&mut self) -> Result<Update, ProtocolError> {
        let update = frames::read_update(&mut self.stream).await?;
        if let Some(board) = update.board() {
            self.board = board.clone();
        }
        Ok(update)
    }

    /// Announce departure with the sentinel move and close the stream.
    pub async fn disconnect(mut self) -> Result<(), ProtocolError> {
        frames::write_move(&mut self.stream, Move::DISCONNECT).await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Coord;

    #[tokio::test]
    async fn handshake_then_update_tracks_board() {
        let (mut server, peer) = tokio::io::duplex(4096);
        frames::write_handshake(&mut server, Color::White, &Board::standard())
            .await
            .unwrap();

        let mut client = PeerClient::handshake(peer).await.unwrap();
        assert_eq!(client.side(), Color::White);
        assert_eq!(client.board(), &Board::standard());

        let mut moved = Board::standard();
        moved.clear(Coord::new(0, 1));
        moved.put(Coord::new(0, 2), crate::engine::PieceType::Pawn, Color::White);
        frames::write_update(
            &mut server,
            &Update::Turn {
                side: Color::Black,
                board: moved.clone(),
            },
        )
        .await
        .unwrap();

        let update = client.next_update().await.unwrap();
        assert!(!update.is_final());
        assert_eq!(client.board(), &moved);
    }

    #[tokio::test]
    async fn peer_gone_keeps_last_board() {
        let (mut server, peer) = tokio::io::duplex(4096);
        frames::write_handshake(&mut server, Color::Black, &Board::endgame())
            .await
            .unwrap();
        frames::write_update(&mut server, &Update::PeerGone)
            .await
            .unwrap();

        let mut client = PeerClient::handshake(peer).await.unwrap();
        assert_eq!(client.next_update().await.unwrap(), Update::PeerGone);
        assert_eq!(client.board(), &Board::endgame());
    }

    #[tokio::test]
    async fn disconnect_sends_sentinel() {
        let (mut server, peer) = tokio::io::duplex(4096);
        frames::write_handshake(&mut server, Color::White, &Board::standard())
            .await
            .unwrap();
        let client = PeerClient::handshake(peer).await.unwrap();
        client.disconnect().await.unwrap();

        let mv = frames::read_move(&mut server).await.unwrap();
        assert!(mv.is_disconnect());
        assert!(matches!(
            frames::read_move(&mut server).await,
            Err(ProtocolError::Closed)
        ));
    }
}
