use std::fmt::{self, Display};
use std::hint;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
    #[error("rank/file pair ({0}, {1}) is out of range")]
    OutOfRange(usize, usize),
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => File::A,
            1 => File::B,
            2 => File::C,
            3 => File::D,
            4 => File::E,
            5 => File::F,
            6 => File::G,
            7 => File::H,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub const fn try_from_index(val: usize) -> Option<Self> {
        if val < 8 {
            Some(unsafe { Self::from_index_unchecked(val) })
        } else {
            None
        }
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(unsafe {
                Self::from_index_unchecked((u32::from(c) - u32::from('a')) as usize)
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Board rank
///
/// Ranks are indexed from White's side, so [`Rank::R1`] has index 0 and [`Rank::R8`] has index 7.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Rank::R1,
            1 => Rank::R2,
            2 => Rank::R3,
            3 => Rank::R4,
            4 => Rank::R5,
            5 => Rank::R6,
            6 => Rank::R7,
            7 => Rank::R8,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub const fn try_from_index(val: usize) -> Option<Self> {
        if val < 8 {
            Some(unsafe { Self::from_index_unchecked(val) })
        } else {
            None
        }
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(unsafe {
                Self::from_index_unchecked((u32::from(c) - u32::from('1')) as usize)
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'1' + *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// Index layout is `rank * 8 + file`, so `a1` is 0 and `h8` is 63.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord(u8);

impl Coord {
    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Coord {
        Coord(val as u8)
    }

    pub const fn from_parts(file: File, rank: Rank) -> Coord {
        Coord(((rank as u8) << 3) | file as u8)
    }

    /// Builds a square from a zero-based `(rank, file)` pair
    pub fn from_rank_file(rank: usize, file: usize) -> Result<Coord, CoordParseError> {
        match (Rank::try_from_index(rank), File::try_from_index(file)) {
            (Some(rank), Some(file)) => Ok(Coord::from_parts(file, rank)),
            _ => Err(CoordParseError::OutOfRange(rank, file)),
        }
    }

    /// Returns the zero-based `(rank, file)` pair for this square
    pub const fn rank_file(&self) -> (usize, usize) {
        (self.rank().index(), self.file().index())
    }

    pub const fn file(&self) -> File {
        unsafe { File::from_index_unchecked((self.0 & 7) as usize) }
    }

    pub const fn rank(&self) -> Rank {
        unsafe { Rank::from_index_unchecked((self.0 >> 3) as usize) }
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn try_shift(self, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        let new_file = self.file().index().wrapping_add(delta_file as usize);
        let new_rank = self.rank().index().wrapping_add(delta_rank as usize);
        if new_file >= 8 || new_rank >= 8 {
            return None;
        }
        unsafe {
            Some(Coord::from_parts(
                File::from_index_unchecked(new_file),
                Rank::from_index_unchecked(new_rank),
            ))
        }
    }

    /// Signed `(file, rank)` offset from `self` to `other`
    pub const fn delta(self, other: Coord) -> (isize, isize) {
        (
            other.file().index() as isize - self.file().index() as isize,
            other.rank().index() as isize - self.rank().index() as isize,
        )
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Coord)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Coord({})", self);
        }
        write!(f, "Coord(?{:?})", self.0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file().as_char(), self.rank().as_char())
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file_ch), Some(rank_ch), None) => (file_ch, rank_ch),
            _ => return Err(CoordParseError::BadLength),
        };
        Ok(Coord::from_parts(
            File::from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(CoordParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::King,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ];

    /// Uppercase letter used in notation (`P` for pawns, which notation omits)
    pub fn as_char(&self) -> char {
        match *self {
            Piece::Pawn => 'P',
            Piece::King => 'K',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        match c.to_ascii_uppercase() {
            'P' => Some(Piece::Pawn),
            'K' => Some(Piece::King),
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Piece::Pawn => "pawn",
            Piece::King => "king",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
        }
    }
}

/// Contents of a single square: either empty or a piece of some color
///
/// The single-letter form (`P`, `n`, `.`, ...) is only used at I/O edges.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const COUNT: usize = 13;

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Cell {
        Cell(val as u8)
    }

    pub const fn from_index(val: usize) -> Cell {
        assert!(val < Self::COUNT, "index too large");
        Cell(val as u8)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn from_parts(c: Color, p: Piece) -> Cell {
        Cell(match c {
            Color::White => 1 + p as u8,
            Color::Black => 7 + p as u8,
        })
    }

    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub const fn piece(&self) -> Option<Piece> {
        match self.0 {
            0 => None,
            1 | 7 => Some(Piece::Pawn),
            2 | 8 => Some(Piece::King),
            3 | 9 => Some(Piece::Knight),
            4 | 10 => Some(Piece::Bishop),
            5 | 11 => Some(Piece::Rook),
            6 | 12 => Some(Piece::Queen),
            _ => unsafe { hint::unreachable_unchecked() },
        }
    }

    pub fn parts(&self) -> Option<(Color, Piece)> {
        Some((self.color()?, self.piece()?))
    }

    pub const fn is(&self, c: Color, p: Piece) -> bool {
        self.0 == Cell::from_parts(c, p).0
    }

    pub fn as_char(&self) -> char {
        b".PKNBRQpknbrq"[self.0 as usize] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'k' => Piece::King,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            _ => return None,
        };
        Some(Cell::from_parts(color, piece))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if (self.0 as usize) < Self::COUNT {
            return write!(f, "Cell({})", self.as_char());
        }
        write!(f, "Cell(?{:?})", self.0)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Cell::from_char(ch).ok_or(CellParseError::UnexpectedChar(ch)),
            _ => Err(CellParseError::BadLength),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

impl CastlingSide {
    pub fn name(&self) -> &'static str {
        match *self {
            CastlingSide::Queen => "queenside",
            CastlingSide::King => "kingside",
        }
    }
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    const fn to_index(c: Color, s: CastlingSide) -> u8 {
        ((c as u8) << 1) | s as u8
    }

    pub const EMPTY: CastlingRights = CastlingRights(0);
    pub const FULL: CastlingRights = CastlingRights(15);

    pub const fn has(&self, c: Color, s: CastlingSide) -> bool {
        ((self.0 >> Self::to_index(c, s)) & 1) != 0
    }

    pub const fn with(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 | (1_u8 << Self::to_index(c, s)))
    }

    pub fn set(&mut self, c: Color, s: CastlingSide) {
        *self = self.with(c, s)
    }

    pub fn unset(&mut self, c: Color, s: CastlingSide) {
        self.0 &= !(1_u8 << Self::to_index(c, s))
    }

    pub fn unset_color(&mut self, c: Color) {
        self.unset(c, CastlingSide::King);
        self.unset(c, CastlingSide::Queen);
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "CastlingRights({})", self)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if *self == Self::EMPTY {
            return write!(f, "-");
        }
        if self.has(Color::White, CastlingSide::King) {
            write!(f, "K")?;
        }
        if self.has(Color::White, CastlingSide::Queen) {
            write!(f, "Q")?;
        }
        if self.has(Color::Black, CastlingSide::King) {
            write!(f, "k")?;
        }
        if self.has(Color::Black, CastlingSide::Queen) {
            write!(f, "q")?;
        }
        Ok(())
    }
}
