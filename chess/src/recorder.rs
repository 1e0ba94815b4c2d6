//! Recording games move by move
//!
//! The [`Recorder`] is an authoring session: it holds the live position, decides whether the
//! proposed moves are valid, writes their notation and keeps the move history. Invalid moves
//! are silently rejected, leaving the session untouched apart from the selection.

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::history::{Cursor, History};
use crate::moves::MoveRecord;
use crate::notation::{Notation, NotationMode};
use crate::position::Position;
use crate::rules;
use crate::types::{CastlingRights, CastlingSide, Color, Coord, Piece};

use log::debug;

/// Recorder settings
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecorderConfig {
    /// How to write the notation of recorded moves
    pub notation: NotationMode,
}

/// Square selection state
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Nothing is selected
    #[default]
    Empty,
    /// A piece of the side to move is selected and waits for its destination
    Source(Coord),
}

/// Result of [`Recorder::click()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ClickOutcome {
    /// A piece was selected as the move source
    Selected(Coord),
    /// The selected piece was clicked again and deselected
    Deselected,
    /// A move was made; contains its index in the history
    Moved(usize),
    /// The move to the clicked square was rejected and the selection was cleared
    Rejected,
    /// Nothing was selected and the click didn't select anything
    Ignored,
}

/// Authoring session for a single game
#[derive(Debug, Clone)]
pub struct Recorder {
    config: RecorderConfig,
    position: Position,
    side: Color,
    castling: CastlingRights,
    start_castling: CastlingRights,
    history: History,
    selection: Selection,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl Recorder {
    /// Starts a session from the initial position
    pub fn new(config: RecorderConfig) -> Self {
        Self::with_position(config, Position::initial(), Color::White, CastlingRights::FULL)
    }

    /// Starts a session from an arbitrary position
    pub fn with_position(
        config: RecorderConfig,
        position: Position,
        side: Color,
        castling: CastlingRights,
    ) -> Self {
        Recorder {
            config,
            position,
            side,
            castling,
            start_castling: castling,
            history: History::new(position, side),
            selection: Selection::Empty,
        }
    }

    #[inline]
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Returns the navigation cursor over the recorded moves
    pub fn cursor(&self) -> Cursor<'_> {
        self.history.cursor()
    }

    /// Returns the notation of all the recorded moves
    pub fn moves_notation(&self) -> Vec<String> {
        self.history.notation()
    }

    fn double_step(&self) -> Option<Coord> {
        self.history.last().and_then(MoveRecord::double_step)
    }

    /// Returns `true` if the side to move may move the piece from `src` to `dst`
    pub fn is_valid_move(&self, src: Coord, dst: Coord) -> bool {
        self.position.get(src).color() == Some(self.side)
            && rules::is_valid_move(&self.position, self.double_step(), src, dst)
    }

    /// Returns all the squares the piece on `src` may move to
    ///
    /// The result is empty if the square doesn't hold a piece of the side to move.
    pub fn legal_destinations(&self, src: Coord) -> Bitboard {
        if self.position.get(src).color() != Some(self.side) {
            return Bitboard::EMPTY;
        }
        rules::valid_destinations(&self.position, self.double_step(), src)
    }

    /// Returns `true` if the side to move may castle to side `s`
    pub fn can_castle(&self, s: CastlingSide) -> bool {
        rules::can_castle(&self.position, self.castling, self.side, s)
    }

    /// Selects the piece on `sq` as the move source
    ///
    /// Only pieces of the side to move can be selected. Otherwise, the selection is cleared
    /// and `false` is returned.
    pub fn select(&mut self, sq: Coord) -> bool {
        if self.position.get(sq).color() == Some(self.side) {
            self.selection = Selection::Source(sq);
            true
        } else {
            self.selection = Selection::Empty;
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Empty;
    }

    /// Handles a click on square `sq`
    ///
    /// The first click selects a piece; the second one either moves it to the clicked square,
    /// picks another piece of the same side, or deselects it if the same square is clicked.
    pub fn click(&mut self, sq: Coord) -> ClickOutcome {
        match self.selection {
            Selection::Empty => {
                if self.select(sq) {
                    ClickOutcome::Selected(sq)
                } else {
                    ClickOutcome::Ignored
                }
            }
            Selection::Source(src) if src == sq => {
                self.selection = Selection::Empty;
                ClickOutcome::Deselected
            }
            Selection::Source(_) if self.position.get(sq).color() == Some(self.side) => {
                self.selection = Selection::Source(sq);
                ClickOutcome::Selected(sq)
            }
            Selection::Source(src) => {
                if self.try_move(src, sq).is_some() {
                    ClickOutcome::Moved(self.history.len() - 1)
                } else {
                    ClickOutcome::Rejected
                }
            }
        }
    }

    /// Tries to move the piece from `src` to `dst`
    ///
    /// If the move is valid, it is applied and recorded, and the new record is returned.
    /// Otherwise, `None` is returned and nothing changes except that the selection is cleared.
    pub fn try_move(&mut self, src: Coord, dst: Coord) -> Option<&MoveRecord> {
        self.selection = Selection::Empty;
        let (color, piece) = match self.position.get(src).parts() {
            Some(parts) => parts,
            None => {
                debug!("rejected {} -> {}: no piece on {}", src, dst, src);
                return None;
            }
        };
        if color != self.side {
            debug!(
                "rejected {} -> {}: it's {}'s turn",
                src,
                dst,
                self.side.name()
            );
            return None;
        }
        let double_step = self.double_step();
        if !rules::is_valid_move(&self.position, double_step, src, dst) {
            debug!(
                "rejected {} -> {}: invalid {} move",
                src,
                dst,
                piece.name()
            );
            return None;
        }

        let mut captured = self.position.get(dst).piece();
        let mut en_passant = None;
        if piece == Piece::Pawn && captured.is_none() && src.file() != dst.file() {
            en_passant = rules::en_passant_victim(&self.position, double_step, color, src, dst);
            if en_passant.is_some() {
                captured = Some(Piece::Pawn);
            }
        }

        let rivals = self
            .position
            .pieces(color, piece)
            .into_iter()
            .filter(|sq| *sq != src && rules::is_valid_move(&self.position, double_step, *sq, dst));
        let notation = Notation::for_move(
            piece,
            src,
            dst,
            captured.is_some(),
            rivals,
            self.config.notation,
        );

        let record = MoveRecord {
            move_number: self.history.next_move_number(),
            color,
            src,
            dst,
            piece,
            captured,
            en_passant,
            castling: None,
            rook: None,
            notation: notation.to_string(),
            commentary: None,
        };
        Some(self.commit(record))
    }

    /// Castles to side `s` for the side to move
    ///
    /// Returns `None` if castling is not possible.
    pub fn castle(&mut self, s: CastlingSide) -> Option<&MoveRecord> {
        self.selection = Selection::Empty;
        if !self.can_castle(s) {
            debug!("rejected castling {} for {}", s.name(), self.side.name());
            return None;
        }
        let c = self.side;
        let record = MoveRecord {
            move_number: self.history.next_move_number(),
            color: c,
            src: geometry::king_home(c),
            dst: geometry::castling_king_dst(c, s),
            piece: Piece::King,
            captured: None,
            en_passant: None,
            castling: Some(s),
            rook: Some((
                geometry::castling_rook_src(c, s),
                geometry::castling_rook_dst(c, s),
            )),
            notation: Notation::Castling(s).to_string(),
            commentary: None,
        };
        Some(self.commit(record))
    }

    fn commit(&mut self, record: MoveRecord) -> &MoveRecord {
        record.apply(&mut self.position);
        rules::update_castling(&mut self.castling, record.src, record.dst);
        self.side = self.side.inv();
        debug!(
            "recorded {}. {} ({})",
            record.move_number,
            record.notation,
            record.description()
        );
        self.history.push(record)
    }

    /// Attaches commentary to the move with index `idx`
    ///
    /// Returns `false` if there is no such move.
    pub fn set_commentary(&mut self, idx: usize, text: &str) -> bool {
        self.history.set_commentary(idx, text)
    }

    /// Takes back the last move
    ///
    /// The position and the castling rights are rebuilt from the start of the game.
    pub fn undo_last(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;
        self.selection = Selection::Empty;
        self.position = self.history.final_position();
        self.castling = self.start_castling;
        for r in self.history.iter() {
            rules::update_castling(&mut self.castling, r.src, r.dst);
        }
        self.side = self.history.side_to_move();
        debug!("took back {}", record.notation);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn play(rec: &mut Recorder, moves: &[(&str, &str)]) {
        for (src, dst) in moves {
            assert!(
                rec.try_move(sq(src), sq(dst)).is_some(),
                "{} -> {} rejected",
                src,
                dst
            );
        }
    }

    #[test]
    fn test_basic() {
        let mut rec = Recorder::default();
        let m = rec.try_move(sq("e2"), sq("e4")).unwrap();
        assert_eq!(m.notation, "e4");
        assert_eq!(m.move_number, 1);
        assert_eq!(m.color, Color::White);
        assert_eq!(rec.side(), Color::Black);

        let m = rec.try_move(sq("g8"), sq("f6")).unwrap();
        assert_eq!(m.notation, "Nf6");
        assert_eq!(m.move_number, 1);
        let m = rec.try_move(sq("b1"), sq("c3")).unwrap();
        assert_eq!(m.move_number, 2);
        assert_eq!(rec.moves_notation(), vec!["e4", "Nf6", "Nc3"]);
    }

    #[test]
    fn test_rejected() {
        let mut rec = Recorder::default();
        // Wrong side
        assert!(rec.try_move(sq("e7"), sq("e5")).is_none());
        // Empty source
        assert!(rec.try_move(sq("e4"), sq("e5")).is_none());
        // Self-capture
        assert!(rec.try_move(sq("d1"), sq("d2")).is_none());
        // Blocked path
        assert!(rec.try_move(sq("a1"), sq("a3")).is_none());
        assert!(rec.history().is_empty());
        assert_eq!(rec.position(), &Position::initial());
        assert_eq!(rec.side(), Color::White);
    }

    #[test]
    fn test_click() {
        let mut rec = Recorder::default();
        assert_eq!(rec.click(sq("e5")), ClickOutcome::Ignored);
        assert_eq!(rec.click(sq("e7")), ClickOutcome::Ignored);
        assert_eq!(rec.click(sq("e2")), ClickOutcome::Selected(sq("e2")));
        assert_eq!(rec.selection(), Selection::Source(sq("e2")));
        assert_eq!(rec.click(sq("e2")), ClickOutcome::Deselected);
        assert_eq!(rec.selection(), Selection::Empty);

        assert_eq!(rec.click(sq("e2")), ClickOutcome::Selected(sq("e2")));
        assert_eq!(rec.click(sq("g1")), ClickOutcome::Selected(sq("g1")));
        assert_eq!(rec.click(sq("g3")), ClickOutcome::Rejected);
        assert_eq!(rec.selection(), Selection::Empty);
        assert!(rec.history().is_empty());

        assert_eq!(rec.click(sq("g1")), ClickOutcome::Selected(sq("g1")));
        assert_eq!(rec.click(sq("f3")), ClickOutcome::Moved(0));
        assert_eq!(rec.selection(), Selection::Empty);
        assert_eq!(rec.history().get(0).unwrap().notation, "Nf3");
    }

    #[test]
    fn test_en_passant() {
        let mut rec = Recorder::default();
        play(&mut rec, &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")]);
        assert!(rec.legal_destinations(sq("e5")).has(sq("d6")));
        let m = rec.try_move(sq("e5"), sq("d6")).unwrap();
        assert!(m.is_en_passant());
        assert_eq!(m.en_passant, Some(sq("d5")));
        assert_eq!(m.captured, Some(Piece::Pawn));
        assert_eq!(m.notation, "exd6");
        assert!(rec.position().get(sq("d5")).is_empty());
    }

    #[test]
    fn test_en_passant_expires() {
        let mut rec = Recorder::default();
        play(
            &mut rec,
            &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5"), ("h2", "h3"), ("h7", "h6")],
        );
        assert!(rec.try_move(sq("e5"), sq("d6")).is_none());
    }

    #[test]
    fn test_scholars_mate() {
        let mut rec = Recorder::default();
        play(
            &mut rec,
            &[("e2", "e4"), ("e7", "e5"), ("f1", "c4"), ("b8", "c6"), ("d1", "h5"), ("g8", "f6")],
        );
        let m = rec.try_move(sq("h5"), sq("f7")).unwrap();
        assert_eq!(m.notation, "Qxf7");
        assert_eq!(m.move_number, 4);
        assert!(m.is_capture());
        assert!(!m.is_en_passant());
        assert_eq!(m.captured, Some(Piece::Pawn));
    }

    #[test]
    fn test_disambiguation() {
        let pos = Position::from_placement("4k3/8/8/R7/8/8/8/RN2KN2").unwrap();
        let config = RecorderConfig {
            notation: NotationMode::Disambiguated,
        };
        let mut rec = Recorder::with_position(config, pos, Color::White, CastlingRights::EMPTY);
        assert_eq!(rec.try_move(sq("b1"), sq("d2")).unwrap().notation, "Nbd2");
        rec.try_move(sq("e8"), sq("e7")).unwrap();
        assert_eq!(rec.try_move(sq("a5"), sq("a3")).unwrap().notation, "R5a3");

        let config = RecorderConfig {
            notation: NotationMode::Compatible,
        };
        let mut rec = Recorder::with_position(config, pos, Color::White, CastlingRights::EMPTY);
        assert_eq!(rec.try_move(sq("b1"), sq("d2")).unwrap().notation, "Nd2");
    }

    #[test]
    fn test_castling() {
        let mut rec = Recorder::default();
        assert!(!rec.can_castle(CastlingSide::King));
        assert!(rec.castle(CastlingSide::King).is_none());
        play(
            &mut rec,
            &[("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6"), ("f1", "c4"), ("f8", "c5")],
        );
        assert!(rec.can_castle(CastlingSide::King));
        assert!(!rec.can_castle(CastlingSide::Queen));
        let m = rec.castle(CastlingSide::King).unwrap();
        assert_eq!(m.notation, "O-O");
        assert_eq!((m.src, m.dst), (sq("e1"), sq("g1")));
        assert_eq!(
            rec.position().get(sq("f1")),
            Cell::from_parts(Color::White, Piece::Rook)
        );
        assert_eq!(rec.castling().to_string(), "kq");
        assert_eq!(rec.side(), Color::Black);
    }

    #[test]
    fn test_castling_rights_lost() {
        let mut rec = Recorder::default();
        play(
            &mut rec,
            &[("g1", "f3"), ("g8", "f6"), ("g2", "g3"), ("g7", "g6"), ("f1", "g2"), ("f8", "g7")],
        );
        play(&mut rec, &[("h1", "g1"), ("a7", "a6"), ("g1", "h1"), ("a6", "a5")]);
        assert!(!rec.can_castle(CastlingSide::King));
        assert!(rec.castle(CastlingSide::King).is_none());
        assert_eq!(rec.castling().to_string(), "Qkq");
    }

    #[test]
    fn test_undo() {
        let mut rec = Recorder::default();
        play(
            &mut rec,
            &[("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6"), ("f1", "c4"), ("f8", "c5")],
        );
        let before = *rec.position();
        rec.castle(CastlingSide::King).unwrap();
        let undone = rec.undo_last().unwrap();
        assert_eq!(undone.notation, "O-O");
        assert_eq!(rec.position(), &before);
        assert_eq!(rec.side(), Color::White);
        assert_eq!(rec.castling(), CastlingRights::FULL);
        assert_eq!(rec.history().len(), 6);

        while rec.undo_last().is_some() {}
        assert_eq!(rec.position(), &Position::initial());
        assert_eq!(rec.side(), Color::White);
    }

    #[test]
    fn test_black_moves_first() {
        let pos = Position::from_placement("4k3/4p3/8/8/8/8/4P3/4K3").unwrap();
        let mut rec = Recorder::with_position(
            RecorderConfig::default(),
            pos,
            Color::Black,
            CastlingRights::EMPTY,
        );
        assert!(rec.try_move(sq("e2"), sq("e4")).is_none());
        play(&mut rec, &[("e7", "e5"), ("e2", "e4"), ("e8", "d8")]);
        let numbers: Vec<u32> = rec.history().iter().map(|r| r.move_number).collect();
        assert_eq!(numbers, vec![1, 2, 2]);
        assert_eq!(rec.history().notation_list().to_string(), "1... e5 2. e4 Kd8");
        assert_eq!(rec.side(), Color::White);

        rec.undo_last().unwrap();
        assert_eq!(rec.side(), Color::Black);
        assert_eq!(rec.history().next_move_number(), 2);
        rec.undo_last().unwrap();
        assert_eq!(rec.side(), Color::White);
        assert_eq!(rec.history().next_move_number(), 2);
    }

    #[test]
    fn test_navigation_matches_live_position() {
        let mut rec = Recorder::default();
        play(
            &mut rec,
            &[("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("d8", "d5"), ("b1", "c3")],
        );
        let mut cursor = rec.cursor();
        assert_eq!(cursor.last(), rec.position());
        cursor.first();
        for idx in 0..rec.history().len() {
            let record = cursor.next().unwrap();
            assert_eq!(record, rec.history().get(idx).unwrap());
        }
        assert_eq!(cursor.position(), rec.position());
    }

    #[test]
    fn test_commentary() {
        let mut rec = Recorder::default();
        play(&mut rec, &[("e2", "e4")]);
        assert!(rec.set_commentary(0, "Best by test"));
        assert!(!rec.set_commentary(1, "No such move"));
        assert_eq!(
            rec.history().get(0).unwrap().commentary.as_deref(),
            Some("Best by test")
        );
    }
}
