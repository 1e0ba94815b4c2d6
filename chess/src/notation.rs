//! Algebraic notation for single moves

use crate::types::{CastlingSide, Coord, CoordParseError, File, Piece, Rank};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error reading a notation token
///
/// Tokens are read leniently: the only hard failures are the ones that leave no square to
/// move to.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum TokenError {
    /// Token is empty after stripping check marks
    #[error("token is empty")]
    EmptyToken,
    /// Destination square cannot be read
    #[error("invalid destination square: {0}")]
    InvalidDst(#[from] CoordParseError),
    /// Pawn capture doesn't start with a file letter
    #[error("invalid pawn capture source {0:?}")]
    InvalidPawnSource(char),
}

/// Output flavor for authored moves
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NotationMode {
    /// Never emit disambiguators, reproducing notation stored by older sessions
    Compatible,
    /// Emit the shortest file, rank or square disambiguator when it's required
    #[default]
    Disambiguated,
}

/// Check indication
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CheckMark {
    /// Check (a.k.a. "+")
    Single,
    /// Double check (a.k.a. "++")
    Double,
    /// Checkmate (a.k.a. "#")
    Checkmate,
}

/// Parsed notation token, without check indicator
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Notation {
    /// Castling
    Castling(CastlingSide),
    /// Pawn advance, like `e4`
    PawnMove {
        /// Destination square
        dst: Coord,
    },
    /// Pawn capture, like `exd5`
    PawnCapture {
        /// Source file
        src: File,
        /// Destination square
        dst: Coord,
    },
    /// Non-pawn move, like `Nf3`, `Rxa8` or `Nbd7`
    Piece {
        /// Piece to move
        piece: Piece,
        /// Source file, if specified
        file: Option<File>,
        /// Source rank, if specified
        rank: Option<Rank>,
        /// Is the move capture?
        is_capture: bool,
        /// Destination square
        dst: Coord,
    },
}

/// Collects the other pieces able to reach the same square and picks the shortest disambiguator
struct AmbigDetector {
    src: Coord,
    sim_any: bool,
    sim_file: bool,
    sim_rank: bool,
}

impl AmbigDetector {
    fn new(src: Coord) -> Self {
        Self {
            src,
            sim_any: false,
            sim_file: false,
            sim_rank: false,
        }
    }

    fn push(&mut self, other: Coord) {
        if other == self.src {
            return;
        }
        self.sim_any = true;
        if self.src.file() == other.file() {
            self.sim_file = true;
        }
        if self.src.rank() == other.rank() {
            self.sim_rank = true;
        }
    }

    fn file(&self) -> Option<File> {
        if self.sim_any && (self.sim_rank || !self.sim_file) {
            return Some(self.src.file());
        }
        None
    }

    fn rank(&self) -> Option<Rank> {
        if self.sim_any && self.sim_file {
            return Some(self.src.rank());
        }
        None
    }
}

impl Notation {
    /// Builds the notation for an authored move
    ///
    /// `rivals` are the squares of the other pieces of the same kind and color that could
    /// legally move to `dst` as well. They are ignored for pawns and in
    /// [`NotationMode::Compatible`].
    pub fn for_move<I>(
        piece: Piece,
        src: Coord,
        dst: Coord,
        is_capture: bool,
        rivals: I,
        mode: NotationMode,
    ) -> Notation
    where
        I: IntoIterator<Item = Coord>,
    {
        if piece == Piece::Pawn {
            return if is_capture {
                Notation::PawnCapture {
                    src: src.file(),
                    dst,
                }
            } else {
                Notation::PawnMove { dst }
            };
        }
        let mut detector = AmbigDetector::new(src);
        if mode == NotationMode::Disambiguated {
            for rival in rivals {
                detector.push(rival);
            }
        }
        Notation::Piece {
            piece,
            file: detector.file(),
            rank: detector.rank(),
            is_capture,
            dst,
        }
    }

    /// Returns the destination square, or `None` for castling
    pub fn dst(&self) -> Option<Coord> {
        match *self {
            Self::Castling(_) => None,
            Self::PawnMove { dst } | Self::PawnCapture { dst, .. } | Self::Piece { dst, .. } => {
                Some(dst)
            }
        }
    }

    /// Returns the kind of the moving piece
    pub fn piece(&self) -> Piece {
        match *self {
            Self::Castling(_) => Piece::King,
            Self::PawnMove { .. } | Self::PawnCapture { .. } => Piece::Pawn,
            Self::Piece { piece, .. } => piece,
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Self::Castling(CastlingSide::King) => write!(f, "O-O"),
            Self::Castling(CastlingSide::Queen) => write!(f, "O-O-O"),
            Self::PawnMove { dst } => write!(f, "{}", dst),
            Self::PawnCapture { src, dst } => write!(f, "{}x{}", src, dst),
            Self::Piece {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                write!(f, "{}", piece.as_char())?;
                if let Some(file) = file {
                    write!(f, "{}", file)?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank)?;
                }
                if is_capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", dst)
            }
        }
    }
}

/// Splits the trailing check mark off a token
pub fn split_check_mark(s: &str) -> (&str, Option<CheckMark>) {
    if let Some(rest) = s.strip_suffix('#') {
        return (rest, Some(CheckMark::Checkmate));
    }
    if let Some(rest) = s.strip_suffix("++") {
        return (rest, Some(CheckMark::Double));
    }
    if let Some(rest) = s.strip_suffix('+') {
        return (rest, Some(CheckMark::Single));
    }
    (s, None)
}

/// Reads the last two characters of `s` as a square
fn last_square(s: &str) -> Result<(&str, Coord), TokenError> {
    let split = s
        .char_indices()
        .rev()
        .nth(1)
        .map(|(idx, _)| idx)
        .ok_or(TokenError::InvalidDst(CoordParseError::BadLength))?;
    let (rest, dst) = s.split_at(split);
    Ok((rest, Coord::from_str(dst)?))
}

impl FromStr for Notation {
    type Err = TokenError;

    /// Reads a token leniently
    ///
    /// Check marks are stripped, a trailing promotion suffix (`=Q`) is dropped, and stray
    /// characters between the piece letter and the destination square are skipped.
    fn from_str(s: &str) -> Result<Notation, Self::Err> {
        let (s, _) = split_check_mark(s.trim());
        if s.is_empty() {
            return Err(TokenError::EmptyToken);
        }
        if s == "O-O" || s == "0-0" {
            return Ok(Self::Castling(CastlingSide::King));
        }
        if s == "O-O-O" || s == "0-0-0" {
            return Ok(Self::Castling(CastlingSide::Queen));
        }

        let s = match s.char_indices().rev().nth(1) {
            Some((idx, '=')) => &s[..idx],
            _ => s,
        };

        let mut chars = s.chars();
        let first = chars.next().ok_or(TokenError::EmptyToken)?;
        if let Some(piece @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen | Piece::King)) =
            first.is_ascii_uppercase().then(|| Piece::from_char(first)).flatten()
        {
            let (middle, dst) = last_square(chars.as_str())?;
            let mut file = None;
            let mut rank = None;
            let mut is_capture = false;
            for ch in middle.chars() {
                match ch {
                    'a'..='h' => file = File::from_char(ch),
                    '1'..='8' => rank = Rank::from_char(ch),
                    'x' | ':' => is_capture = true,
                    _ => {}
                }
            }
            return Ok(Self::Piece {
                piece,
                file,
                rank,
                is_capture,
                dst,
            });
        }

        let (head, dst) = last_square(s)?;
        if head.contains(|c| c == 'x' || c == ':') {
            let src = File::from_char(first).ok_or(TokenError::InvalidPawnSource(first))?;
            return Ok(Self::PawnCapture { src, dst });
        }
        Ok(Self::PawnMove { dst })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Notation::from_str("Nf3"),
            Ok(Notation::Piece {
                piece: Piece::Knight,
                file: None,
                rank: None,
                is_capture: false,
                dst: sq("f3"),
            })
        );
        assert_eq!(
            Notation::from_str("exd5"),
            Ok(Notation::PawnCapture {
                src: File::E,
                dst: sq("d5"),
            })
        );
        assert_eq!(Notation::from_str("e4"), Ok(Notation::PawnMove { dst: sq("e4") }));
        assert_eq!(
            Notation::from_str("Qh4#"),
            Ok(Notation::Piece {
                piece: Piece::Queen,
                file: None,
                rank: None,
                is_capture: false,
                dst: sq("h4"),
            })
        );
        assert_eq!(
            Notation::from_str("R1xa3+"),
            Ok(Notation::Piece {
                piece: Piece::Rook,
                file: None,
                rank: Some(Rank::R1),
                is_capture: true,
                dst: sq("a3"),
            })
        );
        assert_eq!(
            Notation::from_str("Nbd7"),
            Ok(Notation::Piece {
                piece: Piece::Knight,
                file: Some(File::B),
                rank: None,
                is_capture: false,
                dst: sq("d7"),
            })
        );
    }

    #[test]
    fn test_castling() {
        for (s, side) in [
            ("O-O", CastlingSide::King),
            ("0-0", CastlingSide::King),
            ("O-O+", CastlingSide::King),
            ("O-O-O", CastlingSide::Queen),
            ("0-0-0#", CastlingSide::Queen),
        ] {
            assert_eq!(Notation::from_str(s), Ok(Notation::Castling(side)));
        }
    }

    #[test]
    fn test_lenient() {
        assert_eq!(Notation::from_str("e8=Q"), Ok(Notation::PawnMove { dst: sq("e8") }));
        assert_eq!(
            Notation::from_str("b3?!"),
            Err(TokenError::InvalidDst(CoordParseError::UnexpectedFileChar('?')))
        );
        assert_eq!(Notation::from_str("+"), Err(TokenError::EmptyToken));
        assert_eq!(Notation::from_str(""), Err(TokenError::EmptyToken));
        assert_eq!(
            Notation::from_str("N"),
            Err(TokenError::InvalidDst(CoordParseError::BadLength))
        );
        assert_eq!(
            Notation::from_str("Zxd5"),
            Err(TokenError::InvalidPawnSource('Z'))
        );
    }

    #[test]
    fn test_check_mark() {
        assert_eq!(split_check_mark("Qh4#"), ("Qh4", Some(CheckMark::Checkmate)));
        assert_eq!(split_check_mark("Bb5+"), ("Bb5", Some(CheckMark::Single)));
        assert_eq!(split_check_mark("Bb5++"), ("Bb5", Some(CheckMark::Double)));
        assert_eq!(split_check_mark("Bb5"), ("Bb5", None));
    }

    #[test]
    fn test_format() {
        for s in ["Nf3", "exd5", "e4", "O-O", "O-O-O", "Rxa8", "Nbd7", "R1a3", "Qh4e1"] {
            assert_eq!(Notation::from_str(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_for_move() {
        let pawn = Notation::for_move(
            Piece::Pawn,
            sq("e5"),
            sq("d6"),
            true,
            Vec::<Coord>::new(),
            NotationMode::Disambiguated,
        );
        assert_eq!(pawn.to_string(), "exd6");

        let knight = Notation::for_move(
            Piece::Knight,
            sq("b1"),
            sq("d2"),
            false,
            [sq("f3")],
            NotationMode::Disambiguated,
        );
        assert_eq!(knight.to_string(), "Nbd2");

        let rook = Notation::for_move(
            Piece::Rook,
            sq("a1"),
            sq("a3"),
            true,
            [sq("a5")],
            NotationMode::Disambiguated,
        );
        assert_eq!(rook.to_string(), "R1xa3");

        let queen = Notation::for_move(
            Piece::Queen,
            sq("h4"),
            sq("e1"),
            false,
            [sq("h1"), sq("e4")],
            NotationMode::Disambiguated,
        );
        assert_eq!(queen.to_string(), "Qh4e1");

        let compat = Notation::for_move(
            Piece::Knight,
            sq("b1"),
            sq("d2"),
            false,
            [sq("f3")],
            NotationMode::Compatible,
        );
        assert_eq!(compat.to_string(), "Nd2");
    }
}
