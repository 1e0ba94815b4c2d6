//! Applied moves

use crate::position::Position;
use crate::types::{CastlingSide, Cell, Color, Coord, Piece};

use std::fmt;

/// A move that was applied to a game, either recorded by hand or replayed from notation
///
/// Records are created once and never change afterwards, except for their commentary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    /// Full move number, starting from 1
    pub move_number: u32,
    /// Color of the moving side
    pub color: Color,
    /// Source square. For castling, this is the king's source square
    pub src: Coord,
    /// Destination square. For castling, this is the king's destination square
    pub dst: Coord,
    /// Kind of the moving piece
    pub piece: Piece,
    /// Kind of the captured piece, if any
    pub captured: Option<Piece>,
    /// Square of the pawn captured en passant
    ///
    /// Note that it differs from the destination square.
    pub en_passant: Option<Coord>,
    /// Castling side, if the move is castling
    pub castling: Option<CastlingSide>,
    /// Rook relocation for castling, as `(src, dst)`
    pub rook: Option<(Coord, Coord)>,
    /// Move in algebraic notation
    pub notation: String,
    /// Free-form annotation
    pub commentary: Option<String>,
}

impl MoveRecord {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.en_passant.is_some()
    }

    #[inline]
    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }

    /// Returns the destination square if this move is a pawn double step
    pub fn double_step(&self) -> Option<Coord> {
        if self.piece != Piece::Pawn {
            return None;
        }
        match self.src.delta(self.dst) {
            (0, 2) | (0, -2) => Some(self.dst),
            _ => None,
        }
    }

    /// Applies the move to `pos`
    ///
    /// The position is not validated. If the source square is empty or equals the destination,
    /// the moving piece is put onto the destination square anyway.
    pub fn apply(&self, pos: &mut Position) {
        if let Some(victim) = self.en_passant {
            pos.take(victim);
        }
        let mut cell = if self.src == self.dst {
            Cell::EMPTY
        } else {
            pos.take(self.src)
        };
        if cell.is_empty() {
            cell = Cell::from_parts(self.color, self.piece);
        }
        pos.put(self.dst, cell);
        if let Some((src, dst)) = self.rook {
            if pos.get(src).is_occupied() {
                pos.relocate(src, dst);
            }
        }
    }

    /// Returns the human-readable description of the move
    ///
    /// ```
    /// # use blindchess::{MoveRecord, Color, Piece, Coord};
    /// # use std::str::FromStr;
    /// let m = MoveRecord {
    ///     move_number: 1,
    ///     color: Color::White,
    ///     src: Coord::from_str("g1").unwrap(),
    ///     dst: Coord::from_str("f3").unwrap(),
    ///     piece: Piece::Knight,
    ///     captured: None,
    ///     en_passant: None,
    ///     castling: None,
    ///     rook: None,
    ///     notation: "Nf3".to_string(),
    ///     commentary: None,
    /// };
    /// assert_eq!(m.description(), "White knight moves from g1 to f3");
    /// ```
    pub fn description(&self) -> String {
        self.describe().to_string()
    }

    fn describe(&self) -> Description<'_> {
        Description(self)
    }
}

struct Description<'a>(&'a MoveRecord);

impl<'a> fmt::Display for Description<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let m = self.0;
        if let Some(side) = m.castling {
            return write!(f, "{} castles {}", m.color.name(), side.name());
        }
        write!(f, "{} {} ", m.color.name(), m.piece.name())?;
        match (m.captured, m.en_passant) {
            (Some(captured), Some(victim)) => write!(
                f,
                "captures {} en passant on {} from {} to {}",
                captured.name(),
                victim,
                m.src,
                m.dst
            ),
            (Some(captured), None) => write!(
                f,
                "captures {} on {} from {}",
                captured.name(),
                m.dst,
                m.src
            ),
            (None, _) => write!(f, "moves from {} to {}", m.src, m.dst),
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.notation)
    }
}
