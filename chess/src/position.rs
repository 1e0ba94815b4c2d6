//! Position and related things

use crate::bitboard::Bitboard;
use crate::types::{Cell, CellParseError, Color, Coord, CoordParseError, File, Piece, Rank};

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// Error parsing the piece placement part of FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlacementError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error building a position from a square-to-letter snapshot
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SnapshotError {
    /// Square name cannot be parsed
    #[error("bad square {0:?}: {1}")]
    Square(String, CoordParseError),
    /// Piece letter cannot be parsed
    #[error("bad piece on {0}: {1}")]
    Piece(Coord, CellParseError),
}

/// Contents of the 64 squares
///
/// A position is a plain mapping from squares to cells. It doesn't know whose turn it is
/// and doesn't enforce any chess invariants; sessions built on top of it do that.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    cells: [Cell; 64],
}

impl Position {
    /// Returns an empty position
    #[inline]
    pub const fn empty() -> Position {
        Position {
            cells: [Cell::EMPTY; 64],
        }
    }

    /// Returns the initial position
    pub fn initial() -> Position {
        let mut res = Position::empty();
        for file in File::iter() {
            res.put2(file, Rank::R2, Cell::from_parts(Color::White, Piece::Pawn));
            res.put2(file, Rank::R7, Cell::from_parts(Color::Black, Piece::Pawn));
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            res.put2(File::A, rank, Cell::from_parts(color, Piece::Rook));
            res.put2(File::B, rank, Cell::from_parts(color, Piece::Knight));
            res.put2(File::C, rank, Cell::from_parts(color, Piece::Bishop));
            res.put2(File::D, rank, Cell::from_parts(color, Piece::Queen));
            res.put2(File::E, rank, Cell::from_parts(color, Piece::King));
            res.put2(File::F, rank, Cell::from_parts(color, Piece::Bishop));
            res.put2(File::G, rank, Cell::from_parts(color, Piece::Knight));
            res.put2(File::H, rank, Cell::from_parts(color, Piece::Rook));
        }
        res
    }

    /// Parses the piece placement field of a FEN string, like `rnbqkbnr/pppppppp/8/...`
    ///
    /// Does the same as [`Position::from_str`].
    pub fn from_placement(s: &str) -> Result<Position, PlacementError> {
        type Error = PlacementError;

        let mut file = 0_usize;
        let mut rank = 7_usize;
        let mut res = Position::empty();
        for ch in s.chars() {
            match ch {
                '1'..='8' => {
                    let add = (ch as u8 - b'0') as usize;
                    if file + add > 8 {
                        return Err(Error::RankOverflow(Rank::from_index(rank)));
                    }
                    file += add;
                }
                '/' => {
                    if file < 8 {
                        return Err(Error::RankUnderflow(Rank::from_index(rank)));
                    }
                    if rank == 0 {
                        return Err(Error::Overflow);
                    }
                    rank -= 1;
                    file = 0;
                }
                _ => {
                    if file >= 8 {
                        return Err(Error::RankOverflow(Rank::from_index(rank)));
                    }
                    let cell = Cell::from_char(ch)
                        .filter(|c| c.is_occupied())
                        .ok_or(Error::UnexpectedChar(ch))?;
                    res.put2(File::from_index(file), Rank::from_index(rank), cell);
                    file += 1;
                }
            }
        }

        if file < 8 {
            return Err(Error::RankUnderflow(Rank::from_index(rank)));
        }
        if rank > 0 {
            return Err(Error::Underflow);
        }
        Ok(res)
    }

    /// Builds a position from a snapshot of `(square, letter)` pairs, such as the one read from a
    /// rendered board
    ///
    /// Squares that are not mentioned are empty.
    pub fn from_letters<'a, I>(snapshot: I) -> Result<Position, SnapshotError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut res = Position::empty();
        for (square, letter) in snapshot {
            let coord = Coord::from_str(square)
                .map_err(|e| SnapshotError::Square(square.to_string(), e))?;
            let cell = Cell::from_str(letter).map_err(|e| SnapshotError::Piece(coord, e))?;
            res.put(coord, cell);
        }
        Ok(res)
    }

    /// Returns all the occupied squares with their single-letter piece names
    pub fn letters(&self) -> impl Iterator<Item = (Coord, char)> + '_ {
        Coord::iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, cell)| cell.is_occupied())
            .map(|(c, cell)| (c, cell.as_char()))
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` to the square with coordinate `c`
    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Empties the square `c` and returns what stood there
    #[inline]
    pub fn take(&mut self, c: Coord) -> Cell {
        std::mem::take(&mut self.cells[c.index()])
    }

    /// Moves whatever stands on `src` to `dst`, returning the previous contents of `dst`
    pub fn relocate(&mut self, src: Coord, dst: Coord) -> Cell {
        let cell = self.take(src);
        let captured = self.take(dst);
        self.put(dst, cell);
        captured
    }

    /// Returns the bitboard over all occupied squares
    pub fn occupied(&self) -> Bitboard {
        Coord::iter().filter(|c| self.get(*c).is_occupied()).collect()
    }

    /// Returns the bitboard over all the pieces of color `c`
    pub fn color(&self, c: Color) -> Bitboard {
        Coord::iter()
            .filter(|sq| self.get(*sq).color() == Some(c))
            .collect()
    }

    /// Returns the squares of all the pieces of color `c` and kind `p`, in ascending square order
    pub fn pieces(&self, c: Color, p: Piece) -> Bitboard {
        Coord::iter().filter(|sq| self.get(*sq).is(c, p)).collect()
    }

    /// Returns the position of the king of color `c`, if it is on the board
    pub fn king(&self, c: Color) -> Option<Coord> {
        self.pieces(c, Piece::King).into_iter().next()
    }

    /// Converts the position into the FEN piece placement field
    pub fn as_placement(&self) -> String {
        self.to_string()
    }

    /// Wraps the position to allow pretty-printing as an ASCII diagram
    #[inline]
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty(self)
    }
}

impl Default for Position {
    #[inline]
    fn default() -> Position {
        Position::empty()
    }
}

impl FromStr for Position {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        Position::from_placement(s)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            if rank != Rank::R8 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let cell = self.get2(file, rank);
                if cell.is_empty() {
                    empty += 1;
                    continue;
                }
                if empty != 0 {
                    write!(f, "{}", (b'0' + empty) as char)?;
                    empty = 0;
                }
                write!(f, "{}", cell)?;
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Position({})", self)
    }
}

/// Wrapper to pretty-print the position
///
/// See [`Position::pretty()`].
pub struct Pretty<'a>(&'a Position);

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}|", rank)?;
            for file in File::iter() {
                write!(f, "{}", self.0.get2(file, rank))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "-+--------")?;
        write!(f, " |")?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn test_initial() {
        assert_eq!(Position::initial().to_string(), INI_PLACEMENT);
        assert_eq!(Position::from_placement(INI_PLACEMENT), Ok(Position::initial()));
        let pos = Position::initial();
        assert_eq!(pos.occupied().len(), 32);
        assert_eq!(pos.color(Color::White).len(), 16);
        assert_eq!(
            pos.king(Color::Black),
            Some(Coord::from_parts(File::E, Rank::R8))
        );
        assert_eq!(pos.pieces(Color::White, Piece::Rook).len(), 2);
    }

    #[test]
    fn test_midgame() {
        const PLACEMENT: &str = "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K";

        let pos = Position::from_placement(PLACEMENT).unwrap();
        assert_eq!(pos.as_placement(), PLACEMENT);
        assert_eq!(
            pos.get2(File::B, Rank::R4),
            Cell::from_parts(Color::Black, Piece::Bishop)
        );
        assert_eq!(
            pos.get2(File::F, Rank::R2),
            Cell::from_parts(Color::White, Piece::Queen)
        );
        assert_eq!(
            pos.king(Color::White),
            Some(Coord::from_parts(File::H, Rank::R1))
        );
    }

    #[test]
    fn test_bad_placement() {
        assert_eq!(
            Position::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP"),
            Err(PlacementError::Underflow)
        );
        assert_eq!(
            Position::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/8"),
            Err(PlacementError::Overflow)
        );
        assert_eq!(
            Position::from_placement("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(PlacementError::RankUnderflow(Rank::R7))
        );
        assert_eq!(
            Position::from_placement("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(PlacementError::UnexpectedChar('9'))
        );
        assert_eq!(
            Position::from_placement("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(PlacementError::RankOverflow(Rank::R8))
        );
    }

    #[test]
    fn test_letters() {
        let pos = Position::from_letters([("e1", "K"), ("e8", "k"), ("d5", "p")]).unwrap();
        assert_eq!(pos.as_placement(), "4k3/8/8/3p4/8/8/8/4K3");
        assert_eq!(
            pos.letters().collect::<Vec<_>>(),
            vec![
                (Coord::from_parts(File::E, Rank::R1), 'K'),
                (Coord::from_parts(File::D, Rank::R5), 'p'),
                (Coord::from_parts(File::E, Rank::R8), 'k'),
            ]
        );
        assert!(matches!(
            Position::from_letters([("z9", "K")]),
            Err(SnapshotError::Square(_, _))
        ));
        assert!(matches!(
            Position::from_letters([("e1", "X")]),
            Err(SnapshotError::Piece(_, CellParseError::UnexpectedChar('X')))
        ));
    }

    #[test]
    fn test_relocate() {
        let mut pos = Position::initial();
        let e2 = Coord::from_parts(File::E, Rank::R2);
        let e4 = Coord::from_parts(File::E, Rank::R4);
        assert_eq!(pos.relocate(e2, e4), Cell::EMPTY);
        assert!(pos.get(e2).is_empty());
        assert!(pos.get(e4).is(Color::White, Piece::Pawn));
        assert_eq!(
            pos.as_placement(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_pretty() {
        let res = r#"
8|rnbqkbnr
7|pppppppp
6|........
5|........
4|........
3|........
2|PPPPPPPP
1|RNBQKBNR
-+--------
 |abcdefgh
"#;
        assert_eq!(
            Position::initial().pretty().to_string().trim_end(),
            res.trim_start_matches('\n').trim_end()
        );
    }
}
