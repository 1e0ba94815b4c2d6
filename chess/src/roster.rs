//! Per-side lists of piece squares

use crate::position::Position;
use crate::types::{Color, Coord, Piece};

use std::slice;

use arrayvec::ArrayVec;
use log::warn;

/// Squares of the pieces of one kind that may have several instances
///
/// Ten is enough for the two original pieces plus eight promoted ones, or for eight pawns.
type Squares = ArrayVec<Coord, 10>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SideRoster {
    king: Option<Coord>,
    queen: Option<Coord>,
    rooks: Squares,
    bishops: Squares,
    knights: Squares,
    pawns: Squares,
}

impl SideRoster {
    fn many(&self, p: Piece) -> Option<&Squares> {
        match p {
            Piece::Rook => Some(&self.rooks),
            Piece::Bishop => Some(&self.bishops),
            Piece::Knight => Some(&self.knights),
            Piece::Pawn => Some(&self.pawns),
            Piece::King | Piece::Queen => None,
        }
    }

    fn many_mut(&mut self, p: Piece) -> Option<&mut Squares> {
        match p {
            Piece::Rook => Some(&mut self.rooks),
            Piece::Bishop => Some(&mut self.bishops),
            Piece::Knight => Some(&mut self.knights),
            Piece::Pawn => Some(&mut self.pawns),
            Piece::King | Piece::Queen => None,
        }
    }

    fn single_mut(&mut self, p: Piece) -> Option<&mut Option<Coord>> {
        match p {
            Piece::King => Some(&mut self.king),
            Piece::Queen => Some(&mut self.queen),
            _ => None,
        }
    }

    fn squares(&self, p: Piece) -> &[Coord] {
        match p {
            Piece::King => single(&self.king),
            Piece::Queen => single(&self.queen),
            _ => match self.many(p) {
                Some(list) => list.as_slice(),
                None => &[],
            },
        }
    }

    fn add(&mut self, p: Piece, at: Coord) {
        if let Some(slot) = self.single_mut(p) {
            match *slot {
                Some(first) => warn!(
                    "extra {} on {} is not tracked, keeping {}",
                    p.name(),
                    at,
                    first
                ),
                None => *slot = Some(at),
            }
            return;
        }
        if let Some(list) = self.many_mut(p) {
            push_square(list, p, at);
        }
    }
}

fn push_square(list: &mut Squares, p: Piece, at: Coord) {
    if list.try_push(at).is_err() {
        warn!("too many {}s, {} is not tracked", p.name(), at);
    }
}

fn single(slot: &Option<Coord>) -> &[Coord] {
    match slot {
        Some(val) => slice::from_ref(val),
        None => &[],
    }
}

/// Tracks where the pieces of each kind are, for both sides
///
/// The roster is what the move parser uses to find which piece a notation token refers to.
/// It must be kept in sync with the position after each applied move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceRoster {
    sides: [SideRoster; 2],
}

impl PieceRoster {
    /// Builds the roster from the pieces on `pos`, in ascending square order
    pub fn from_position(pos: &Position) -> PieceRoster {
        let mut res = PieceRoster::default();
        for (coord, cell) in Coord::iter().map(|c| (c, pos.get(c))) {
            if let Some((color, piece)) = cell.parts() {
                res.sides[color.index()].add(piece, coord);
            }
        }
        res
    }

    /// Returns the squares of pieces of color `c` and kind `p`
    ///
    /// For kinds with multiple instances, the squares follow the order in which the pieces
    /// were first found, which is kept across relocations.
    pub fn squares(&self, c: Color, p: Piece) -> &[Coord] {
        self.sides[c.index()].squares(p)
    }

    /// Moves the piece of color `c` and kind `p` from `src` to `dst`
    ///
    /// For kings and queens the slot is overwritten unconditionally. For other kinds, the
    /// entry equal to `src` is replaced in place; if there is no such entry, `dst` is appended.
    pub fn relocate(&mut self, c: Color, p: Piece, src: Coord, dst: Coord) {
        let side = &mut self.sides[c.index()];
        if let Some(slot) = side.single_mut(p) {
            *slot = Some(dst);
            return;
        }
        if let Some(list) = side.many_mut(p) {
            match list.iter_mut().find(|sq| **sq == src) {
                Some(entry) => *entry = dst,
                None => push_square(list, p, dst),
            }
        }
    }

    /// Removes the piece of color `c` and kind `p` standing on `at`
    ///
    /// Returns `true` if such entry was found.
    pub fn remove(&mut self, c: Color, p: Piece, at: Coord) -> bool {
        let side = &mut self.sides[c.index()];
        if let Some(slot) = side.single_mut(p) {
            if *slot == Some(at) {
                *slot = None;
                return true;
            }
            return false;
        }
        match side.many_mut(p) {
            Some(list) => match list.iter().position(|sq| *sq == at) {
                Some(idx) => {
                    list.remove(idx);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Removes whatever piece of color `c` stands on `at`, returning its kind
    pub fn remove_at(&mut self, c: Color, at: Coord) -> Option<Piece> {
        Piece::ALL
            .into_iter()
            .find(|p| self.remove(c, *p, at))
    }

    /// Returns the kind of piece of color `c` which the roster places on `at`
    pub fn piece_at(&self, c: Color, at: Coord) -> Option<Piece> {
        Piece::ALL
            .into_iter()
            .find(|p| self.squares(c, *p).contains(&at))
    }

    /// Checks that the roster lists exactly the pieces present on `pos`
    pub fn is_consistent_with(&self, pos: &Position) -> bool {
        for c in [Color::White, Color::Black] {
            for p in Piece::ALL {
                let mut ours: Vec<Coord> = self.squares(c, p).to_vec();
                ours.sort();
                let theirs: Vec<Coord> = pos.pieces(c, p).into_iter().collect();
                if ours != theirs {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_initial() {
        let pos = Position::initial();
        let roster = PieceRoster::from_position(&pos);
        assert_eq!(roster.squares(Color::White, Piece::King), &[sq("e1")]);
        assert_eq!(roster.squares(Color::Black, Piece::Queen), &[sq("d8")]);
        assert_eq!(
            roster.squares(Color::White, Piece::Knight),
            &[sq("b1"), sq("g1")]
        );
        assert_eq!(roster.squares(Color::Black, Piece::Pawn).len(), 8);
        assert!(roster.is_consistent_with(&pos));
    }

    #[test]
    fn test_relocate_keeps_order() {
        let mut roster = PieceRoster::from_position(&Position::initial());
        roster.relocate(Color::White, Piece::Knight, sq("b1"), sq("c3"));
        assert_eq!(
            roster.squares(Color::White, Piece::Knight),
            &[sq("c3"), sq("g1")]
        );
        roster.relocate(Color::White, Piece::Queen, sq("a5"), sq("h5"));
        assert_eq!(roster.squares(Color::White, Piece::Queen), &[sq("h5")]);
    }

    #[test]
    fn test_remove() {
        let mut roster = PieceRoster::from_position(&Position::initial());
        assert!(roster.remove(Color::Black, Piece::Pawn, sq("f7")));
        assert!(!roster.remove(Color::Black, Piece::Pawn, sq("f7")));
        assert!(!roster.remove(Color::Black, Piece::Queen, sq("e8")));
        assert_eq!(roster.squares(Color::Black, Piece::Pawn).len(), 7);
        assert_eq!(roster.remove_at(Color::Black, sq("d8")), Some(Piece::Queen));
        assert!(roster.squares(Color::Black, Piece::Queen).is_empty());
        assert_eq!(roster.remove_at(Color::White, sq("d8")), None);
    }

    #[test]
    fn test_overflow() {
        let pos = Position::from_placement("4k3/8/8/8/8/PPPPPPPP/PPPPPPPP/4K3").unwrap();
        let mut roster = PieceRoster::from_position(&pos);
        let pawns = roster.squares(Color::White, Piece::Pawn).to_vec();
        assert_eq!(pawns.len(), 10);
        assert_eq!(pawns[0], sq("a2"));
        assert_eq!(pawns[9], sq("b3"));
        assert!(!roster.is_consistent_with(&pos));

        roster.relocate(Color::White, Piece::Pawn, sq("h3"), sq("h4"));
        assert_eq!(roster.squares(Color::White, Piece::Pawn), &pawns[..]);
    }

    #[test]
    fn test_consistency() {
        let mut pos = Position::initial();
        let mut roster = PieceRoster::from_position(&pos);
        pos.relocate(sq("g1"), sq("f3"));
        assert!(!roster.is_consistent_with(&pos));
        roster.relocate(Color::White, Piece::Knight, sq("g1"), sq("f3"));
        assert!(roster.is_consistent_with(&pos));
        assert_eq!(roster.piece_at(Color::White, sq("f3")), Some(Piece::Knight));
        assert_eq!(roster.piece_at(Color::Black, sq("f3")), None);
    }
}
