//! Fixed-size wire frames exchanged between the server and a peer.
//!
//! There is no length prefix: every message has a shape known to the reader.
//! Integers are 32-bit signed little-endian.
//!
//! | frame      | bytes                                         |
//! |------------|-----------------------------------------------|
//! | handshake  | side byte (`w`/`b`) + board snapshot (512)    |
//! | move       | 4 × i32 (16); all `-1` means "disconnecting"  |
//! | update     | status byte + board snapshot, or `e` alone    |
//!
//! Status bytes: `w`/`b` side to move, `c` checkmate, `s` stalemate,
//! `e` the other peer is gone.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::engine::board::{Board, Snapshot, SNAPSHOT_LEN};
use crate::engine::types::{Color, Move, Outcome};

/// Bytes per wire integer.
pub const INT_BYTES: usize = 4;
/// Bytes in a move frame.
pub const MOVE_BYTES: usize = 4 * INT_BYTES;
/// Bytes in a board snapshot.
pub const SNAPSHOT_BYTES: usize = SNAPSHOT_LEN * INT_BYTES;

pub const CHECKMATE_CODE: u8 = b'c';
pub const STALEMATE_CODE: u8 = b's';
pub const PEER_GONE_CODE: u8 = b'e';

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The stream ended, possibly in the middle of a frame.
    #[error("connection closed")]
    Closed,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown side code {0:#04x}")]
    UnknownSide(u8),

    #[error("unknown status code {0:#04x}")]
    UnknownStatus(u8),
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// A server → peer notification after the handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update {
    /// A move was accepted; `side` moves next.
    Turn { side: Color, board: Board },
    Checkmate { board: Board },
    Stalemate { board: Board },
    /// The other peer disconnected; the session is over.
    PeerGone,
}

impl Update {
    /// Update for a position that has just been classified.
    pub fn after_move(outcome: Outcome, side_to_move: Color, board: Board) -> Self {
        match outcome {
            Outcome::Ongoing => Update::Turn {
                side: side_to_move,
                board,
            },
            Outcome::Checkmate => Update::Checkmate { board },
            Outcome::Stalemate => Update::Stalemate { board },
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Update::Turn { side, .. } => side.code(),
            Update::Checkmate { .. } => CHECKMATE_CODE,
            Update::Stalemate { .. } => STALEMATE_CODE,
            Update::PeerGone => PEER_GONE_CODE,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        match self {
            Update::Turn { board, .. }
            | Update::Checkmate { board }
            | Update::Stalemate { board } => Some(board),
            Update::PeerGone => None,
        }
    }

    /// No further updates follow this one.
    pub fn is_final(&self) -> bool {
        !matches!(self, Update::Turn { .. })
    }
}

// ---------------------------------------------------------------------------
// Byte encoding
// ---------------------------------------------------------------------------

pub fn encode_snapshot(snapshot: &Snapshot) -> [u8; SNAPSHOT_BYTES] {
    let mut buf = [0u8; SNAPSHOT_BYTES];
    for (chunk, value) in buf.chunks_exact_mut(INT_BYTES).zip(snapshot.0) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    buf
}

pub fn decode_snapshot(buf: &[u8; SNAPSHOT_BYTES]) -> Snapshot {
    let mut data = [0i32; SNAPSHOT_LEN];
    for (value, chunk) in data.iter_mut().zip(buf.chunks_exact(INT_BYTES)) {
        *value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Snapshot(data)
}

pub fn encode_move(mv: Move) -> [u8; MOVE_BYTES] {
    let mut buf = [0u8; MOVE_BYTES];
    for (chunk, value) in buf.chunks_exact_mut(INT_BYTES).zip(mv.to_wire()) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    buf
}

pub fn decode_move(buf: &[u8; MOVE_BYTES]) -> Move {
    let mut raw = [0i32; 4];
    for (value, chunk) in raw.iter_mut().zip(buf.chunks_exact(INT_BYTES)) {
        *value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Move::from_wire(raw)
}

// ---------------------------------------------------------------------------
// Async readers / writers
// ---------------------------------------------------------------------------

/// Fill `buf` completely; EOF at any point (including mid-frame) is `Closed`.
async fn read_full<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ProtocolError> {
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(ProtocolError::Closed),
        Err(e) => Err(e.into()),
    }
}

async fn read_board<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Board, ProtocolError> {
    let mut buf = [0u8; SNAPSHOT_BYTES];
    read_full(reader, &mut buf).await?;
    Ok(Board::decode(&decode_snapshot(&buf)))
}

pub async fn read_move<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Move, ProtocolError> {
    let mut buf = [0u8; MOVE_BYTES];
    read_full(reader, &mut buf).await?;
    Ok(decode_move(&buf))
}

pub async fn write_move<W: AsyncWrite + Unpin>(
    writer: &mut W,
    mv: Move,
) -> Result<(), ProtocolError> {
    writer.write_all(&encode_move(mv)).await?;
    writer.flush().await?;
    Ok(())
}

/// Side assignment followed by the initial board.
pub async fn write_handshake<W: AsyncWrite + Unpin>(
    writer: &mut W,
    side: Color,
    board: &Board,
) -> Result<(), ProtocolError> {
    let mut frame = Vec::with_capacity(1 + SNAPSHOT_BYTES);
    frame.push(side.code());
    frame.extend_from_slice(&encode_snapshot(&board.encode()));
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_handshake<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<(Color, Board), ProtocolError> {
    let mut code = [0u8; 1];
    read_full(reader, &mut code).await?;
    let side = Color::from_code(code[0]).ok_or(ProtocolError::UnknownSide(code[0]))?;
    let board = read_board(reader).await?;
    Ok((side, board))
}

pub async fn write_update<W: AsyncWrite + Unpin>(
    writer: &mut W,
    update: &Update,
) -> Result<(), ProtocolError> {
    let mut frame = Vec::with_capacity(1 + SNAPSHOT_BYTES);
    frame.push(update.code());
    if let Some(board) = update.board() {
        frame.extend_from_slice(&encode_snapshot(&board.encode()));
    }
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_update<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Update, ProtocolError> {
    let mut code = [0u8; 1];
    read_full(reader, &mut code).await?;
    let update = match code[0] {
        PEER_GONE_CODE => Update::PeerGone,
        CHECKMATE_CODE => Update::Checkmate {
            board: read_board(reader).await?,
        },
        STALEMATE_CODE => Update::Stalemate {
            board: read_board(reader).await?,
        },
        other => {
            let side = Color::from_code(other).ok_or(ProtocolError::UnknownStatus(other))?;
            Update::Turn {
                side,
                board: read_board(reader).await?,
            }
        }
    };
    Ok(update)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
