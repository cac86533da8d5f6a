//! Square-array board representation and its fixed-size wire snapshot.
//!
//! `Board` stores 64 squares in row-major order (`index = row * 8 + col`).
//! Each square is `Option<Piece>`, so an empty square never carries a side.
//! `Snapshot` is the canonical 128-integer form exchanged with peers: two
//! integers per square (piece code, side code), codes listed in
//! [`crate::engine::types`].

use std::fmt;

use crate::engine::types::{
    ChessError, Color, Coord, Piece, PieceType, EMPTY_CODE, NO_SIDE_CODE,
};

/// Back rank from column 0 to 7. King on column 3, queen on column 4.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::King,
    PieceType::Queen,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Initial piece arrangement a session starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// Full armies, pawns on rows 1 and 6.
    #[default]
    Standard,
    /// One king and one queen per side; white starts checkmated.
    Endgame,
}

impl Layout {
    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(Layout::Standard),
            "endgame" => Some(Layout::Endgame),
            _ => None,
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::from_str_loose(s).ok_or_else(|| ChessError::InvalidLayout(s.to_string()))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Standard => write!(f, "standard"),
            Layout::Endgame => write!(f, "endgame"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Number of integers in a board snapshot.
pub const SNAPSHOT_LEN: usize = 128;

/// Wire form of a board: `(piece code, side code)` per square, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot(pub [i32; SNAPSHOT_LEN]);

impl Snapshot {
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// An 8×8 chess board.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
        }
    }

    /// Standard starting position.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for col in 0..8 {
            board.put(Coord::new(col, 1), PieceType::Pawn, Color::White);
            board.put(Coord::new(col, 6), PieceType::Pawn, Color::Black);
        }
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            board.put(Coord::new(col as i32, 0), kind, Color::White);
            board.put(Coord::new(col as i32, 7), kind, Color::Black);
        }
        board
    }

    /// Drill position: lone kings and queens with white mated.
    ///
    /// The black queen on (1,1), guarded by the black king on (2,2), checks
    /// the white king in the corner; the white queen on (7,4) can neither
    /// capture nor interpose.
    pub fn endgame() -> Self {
        let mut board = Board::empty();
        board.put(Coord::new(0, 0), PieceType::King, Color::White);
        board.put(Coord::new(7, 4), PieceType::Queen, Color::White);
        board.put(Coord::new(2, 2), PieceType::King, Color::Black);
        board.put(Coord::new(1, 1), PieceType::Queen, Color::Black);
        board
    }

    pub fn from_layout(layout: Layout) -> Self {
        match layout {
            Layout::Standard => Board::standard(),
            Layout::Endgame => Board::endgame(),
        }
    }

    // -----------------------------------------------------------------------
    // Square access
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a square. Off-board coordinates read as empty.
    #[inline]
    pub fn piece_at(&self, at: Coord) -> Option<Piece> {
        at.index().and_then(|i| self.squares[i])
    }

    /// Is the square on the board and unoccupied?
    #[inline]
    pub fn is_empty_at(&self, at: Coord) -> bool {
        at.in_bounds() && self.piece_at(at).is_none()
    }

    /// Overwrite a square, returning what stood there before.
    /// Writes to off-board coordinates are ignored.
    #[inline]
    pub fn set(&mut self, at: Coord, content: Option<Piece>) -> Option<Piece> {
        debug_assert!(at.in_bounds(), "write outside the board: {at}");
        match at.index() {
            Some(i) => std::mem::replace(&mut self.squares[i], content),
            None => None,
        }
    }

    /// Place a piece on a square.
    #[inline]
    pub fn put(&mut self, at: Coord, kind: PieceType, color: Color) {
        self.set(at, Some(Piece::new(kind, color)));
    }

    /// Empty a square, returning what stood there.
    #[inline]
    pub fn clear(&mut self, at: Coord) -> Option<Piece> {
        self.set(at, None)
    }

    /// All occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, sq)| sq.map(|p| (Coord::from_index(i), p)))
    }

    /// Occupied squares of one colour, row-major.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// Number of pieces of a given colour and kind.
    pub fn count(&self, color: Color, kind: PieceType) -> usize {
        self.pieces_of(color).filter(|(_, p)| p.kind == kind).count()
    }

    // -----------------------------------------------------------------------
    // Wire snapshot
    // -----------------------------------------------------------------------

    /// Serialize to the 128-integer snapshot.
    pub fn encode(&self) -> Snapshot {
        let mut data = [0i32; SNAPSHOT_LEN];
        for (i, sq) in self.squares.iter().enumerate() {
            let (kind, side) = match sq {
                Some(p) => (p.kind.code(), p.color.code()),
                None => (EMPTY_CODE, NO_SIDE_CODE),
            };
            data[2 * i] = kind as i32;
            data[2 * i + 1] = side as i32;
        }
        Snapshot(data)
    }

    /// Deserialize a snapshot, accepting unknown codes.
    ///
    /// A pair that does not name both a known piece and a known side decodes
    /// to an empty square.
    pub fn decode(snapshot: &Snapshot) -> Self {
        let mut board = Board::empty();
        for (i, pair) in snapshot.0.chunks_exact(2).enumerate() {
            board.squares[i] = decode_square(pair[0], pair[1]);
        }
        board
    }

    /// Deserialize a snapshot, rejecting any code outside the table.
    pub fn try_decode(snapshot: &Snapshot) -> Result<Self, ChessError> {
        let mut board = Board::empty();
        for (i, pair) in snapshot.0.chunks_exact(2).enumerate() {
            let (kind, side) = (pair[0], pair[1]);
            let empty = kind == EMPTY_CODE as i32 && side == NO_SIDE_CODE as i32;
            if empty {
                continue;
            }
            board.squares[i] = Some(decode_square(kind, side).ok_or_else(|| {
                ChessError::InvalidSnapshot(format!(
                    "square {} has codes ({kind}, {side})",
                    Coord::from_index(i)
                ))
            })?);
        }
        Ok(board)
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (row 7 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(160);
        for row in (0..8).rev() {
            s.push((b'0' + row as u8) as char);
            s.push(' ');
            for col in 0..8 {
                let ch = match self.piece_at(Coord::new(col, row)) {
                    Some(p) => p.kind.to_char(p.color),
                    None => '.',
                };
                s.push(ch);
                if col < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  0 1 2 3 4 5 6 7");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board")?;
        write!(f, "{}", self.board_string())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

fn decode_square(kind: i32, side: i32) -> Option<Piece> {
    let kind = u8::try_from(kind).ok().and_then(PieceType::from_code)?;
    let color = u8::try_from(side).ok().and_then(Color::from_code)?;
    Some(Piece::new(kind, color))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
