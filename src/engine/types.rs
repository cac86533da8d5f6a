use std::fmt;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

/// Wire code for a square that belongs to neither side.
pub const NO_SIDE_CODE: u8 = b'n';

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row delta a pawn of this colour advances by.
    #[inline]
    pub const fn forward(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row this colour's pawns start on (and may double-step from).
    #[inline]
    pub const fn pawn_row(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Row on which this colour's pawns promote.
    #[inline]
    pub const fn promotion_row(self) -> i32 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Single-byte wire code (`w` / `b`).
    pub const fn code(self) -> u8 {
        match self {
            Color::White => b'w',
            Color::Black => b'b',
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'w' => Some(Color::White),
            b'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Wire code for an empty square.
pub const EMPTY_CODE: u8 = b'e';

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Number of piece types.
    pub const COUNT: usize = 6;

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire code. Knight and king share the letter k, so the king is the
    /// uppercase `K`.
    pub const fn code(self) -> u8 {
        match self {
            PieceType::Pawn => b'p',
            PieceType::Knight => b'k',
            PieceType::Bishop => b'b',
            PieceType::Rook => b'r',
            PieceType::Queen => b'q',
            PieceType::King => b'K',
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'p' => Some(PieceType::Pawn),
            b'k' => Some(PieceType::Knight),
            b'b' => Some(PieceType::Bishop),
            b'r' => Some(PieceType::Rook),
            b'q' => Some(PieceType::Queen),
            b'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Single uppercase letter for white, lowercase for black (board dumps).
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece standing on a square. Empty squares are `None` at the board level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece { kind, color }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A board coordinate. Kept signed so that raw wire values (including the
/// `-1` disconnect sentinel) can be represented before bounds checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Coord { col, row }
    }

    #[inline]
    pub const fn in_bounds(self) -> bool {
        self.col >= 0 && self.col < 8 && self.row >= 0 && self.row < 8
    }

    /// Row-major index into a 64-square board, if on the board.
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.in_bounds() {
            Some((self.row * 8 + self.col) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Coord::index`].
    #[inline]
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < 64, "square index out of range: {index}");
        Coord::new((index % 8) as i32, (index / 8) as i32)
    }

    /// Iterate all 64 coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..64).map(Coord::from_index)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A move request: start square and target square. Transient, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    /// The all-`-1` move a peer sends to announce it is leaving.
    pub const DISCONNECT: Move = Move {
        from: Coord::new(-1, -1),
        to: Coord::new(-1, -1),
    };

    #[inline]
    pub const fn new(from: Coord, to: Coord) -> Self {
        Move { from, to }
    }

    /// Build from `(startCol, startRow, targetCol, targetRow)`.
    #[inline]
    pub const fn from_parts(
        start_col: i32,
        start_row: i32,
        target_col: i32,
        target_row: i32,
    ) -> Self {
        Move {
            from: Coord::new(start_col, start_row),
            to: Coord::new(target_col, target_row),
        }
    }

    #[inline]
    pub const fn from_wire(raw: [i32; 4]) -> Self {
        Self::from_parts(raw[0], raw[1], raw[2], raw[3])
    }

    #[inline]
    pub const fn to_wire(self) -> [i32; 4] {
        [self.from.col, self.from.row, self.to.col, self.to.row]
    }

    #[inline]
    pub fn is_disconnect(self) -> bool {
        self == Move::DISCONNECT
    }

    /// Both endpoints lie on the board.
    #[inline]
    pub const fn in_bounds(self) -> bool {
        self.from.in_bounds() && self.to.in_bounds()
    }

    /// Column delta.
    #[inline]
    pub const fn dc(self) -> i32 {
        self.to.col - self.from.col
    }

    /// Row delta.
    #[inline]
    pub const fn dr(self) -> i32 {
        self.to.row - self.from.row
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

// ---------------------------------------------------------------------------
// Outcome & GameStatus
// ---------------------------------------------------------------------------

/// Terminal classification for the side about to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Neither checkmate nor stalemate.
    Ongoing,
    Checkmate,
    Stalemate,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// Current status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid move: {from} -> {to}: {reason}")]
    InvalidMove {
        from: String,
        to: String,
        reason: String,
    },

    #[error("no {0} king on the board")]
    KingNotFound(Color),

    #[error("{color} has {count} kings (expected 1)")]
    MultipleKings { color: Color, count: usize },

    #[error("invalid board snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("unknown board layout: {0}")]
    InvalidLayout(String),

    #[error("game is already over: {0}")]
    GameOver(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
