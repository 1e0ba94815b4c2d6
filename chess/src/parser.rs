//! Replaying moves from notation
//!
//! The parser turns notation tokens into fully resolved moves. It doesn't check legality: the
//! moves it replays were validated when they were recorded. Instead, it finds the moving piece
//! with a [`PieceRoster`] and reports how confident that guess is with [`Disambiguation`].

use crate::between::{self, is_diagonal, is_knight_jump, is_straight};
use crate::geometry;
use crate::history::History;
use crate::moves::MoveRecord;
use crate::notation::{Notation, TokenError};
use crate::position::Position;
use crate::roster::PieceRoster;
use crate::types::{CastlingSide, Cell, Color, Coord, File, Piece, Rank};

use std::str::FromStr;

use log::{debug, warn};
use thiserror::Error;

/// How the source square of a parsed move was found
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Disambiguation {
    /// Exactly one piece matched the token
    Resolved,
    /// No piece matched the token, so a plausible square was guessed
    Fallback,
    /// Several pieces matched the token and one of them was picked by a tie-break
    Ambiguous,
}

/// What to do with the rook when replaying castling
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastlingRookPolicy {
    /// Move the rook along with the king
    #[default]
    Relocate,
    /// Move only the king, leaving the rook on its corner square
    ///
    /// This reproduces the boards shown by older replays.
    KingOnly,
}

/// Move parser settings
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ParserConfig {
    pub castling_rook: CastlingRookPolicy,
}

/// Move resolved from a notation token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedMove {
    pub color: Color,
    pub piece: Piece,
    pub src: Coord,
    pub dst: Coord,
    /// Kind of the captured piece, if any
    pub captured: Option<Piece>,
    /// Square of the pawn captured en passant
    pub en_passant: Option<Coord>,
    pub castling: Option<CastlingSide>,
    /// Rook relocation for castling, as `(src, dst)`
    ///
    /// Always `None` with [`CastlingRookPolicy::KingOnly`].
    pub rook: Option<(Coord, Coord)>,
    pub disambiguation: Disambiguation,
    /// Original token, including check marks
    pub notation: String,
}

impl ParsedMove {
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

    /// Converts the parsed move into a move record without commentary
    pub fn into_record(self, move_number: u32) -> MoveRecord {
        MoveRecord {
            move_number,
            color: self.color,
            src: self.src,
            dst: self.dst,
            piece: self.piece,
            captured: self.captured,
            en_passant: self.en_passant,
            castling: self.castling,
            rook: self.rook,
            notation: self.notation,
            commentary: None,
        }
    }
}

/// Error replaying a list of tokens
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse move #{} {:?}: {}", .pos + 1, .token, .source)]
pub struct ReplayError {
    /// Index of the failed token
    pub pos: usize,
    pub token: String,
    pub source: TokenError,
}

fn reaches(piece: Piece, src: Coord, dst: Coord) -> bool {
    match piece {
        Piece::Knight => is_knight_jump(src, dst),
        Piece::Bishop => is_diagonal(src, dst),
        Piece::Rook => is_straight(src, dst),
        Piece::Queen => is_diagonal(src, dst) || is_straight(src, dst),
        Piece::King => {
            let (df, dr) = src.delta(dst);
            df.abs() <= 1 && dr.abs() <= 1
        }
        Piece::Pawn => false,
    }
}

fn matches_hints(sq: Coord, file: Option<File>, rank: Option<Rank>) -> bool {
    file.map_or(true, |f| sq.file() == f) && rank.map_or(true, |r| sq.rank() == r)
}

/// Replays games from notation
///
/// The parser owns the position, the roster and the move history of the game being replayed.
#[derive(Debug, Clone)]
pub struct MoveParser {
    config: ParserConfig,
    position: Position,
    roster: PieceRoster,
    side: Color,
    history: History,
}

impl MoveParser {
    /// Creates a parser for a game starting from the initial position
    pub fn new(config: ParserConfig) -> Self {
        Self::from_position(config, Position::initial(), Color::White)
    }

    /// Creates a parser for a game starting from `position` with `side` to move
    pub fn from_position(config: ParserConfig, position: Position, side: Color) -> Self {
        MoveParser {
            config,
            position,
            roster: PieceRoster::from_position(&position),
            side,
            history: History::new(position, side),
        }
    }

    /// Replays `tokens` from the initial position
    pub fn replay<I, S>(config: ParserConfig, tokens: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut res = Self::new(config);
        res.push_all(tokens)?;
        Ok(res)
    }

    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn roster(&self) -> &PieceRoster {
        &self.roster
    }

    /// Returns the side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    /// Resolves `token` as a move of `side`, without applying it
    ///
    /// Check marks are ignored. The only tokens rejected are the ones without a readable
    /// destination square; everything else yields some move, possibly a guessed one.
    pub fn parse(&self, token: &str, side: Color) -> Result<ParsedMove, TokenError> {
        let res = match Notation::from_str(token)? {
            Notation::Castling(s) => self.resolve_castling(side, s),
            Notation::PawnMove { dst } => self.resolve_pawn_move(side, dst),
            Notation::PawnCapture { src, dst } => self.resolve_pawn_capture(side, src, dst),
            Notation::Piece {
                piece,
                file,
                rank,
                dst,
                ..
            } => self.resolve_piece(side, piece, file, rank, dst),
        };
        let res = ParsedMove {
            notation: token.trim().to_string(),
            ..res
        };
        match res.disambiguation {
            Disambiguation::Resolved => {}
            Disambiguation::Fallback => warn!(
                "no {} {} matches {:?}, guessing {}",
                side.name(),
                res.piece.name(),
                token,
                res.src
            ),
            Disambiguation::Ambiguous => warn!(
                "several {} {}s match {:?}, picking {}",
                side.name(),
                res.piece.name(),
                token,
                res.src
            ),
        }
        Ok(res)
    }

    fn parsed(&self, color: Color, piece: Piece, src: Coord, dst: Coord) -> ParsedMove {
        let captured = match self.position.get(dst).parts() {
            Some((c, p)) if c != color => Some(p),
            _ => None,
        };
        let disambiguation = if self.position.get(src).is(color, piece) {
            Disambiguation::Resolved
        } else {
            Disambiguation::Fallback
        };
        ParsedMove {
            color,
            piece,
            src,
            dst,
            captured,
            en_passant: None,
            castling: None,
            rook: None,
            disambiguation,
            notation: String::new(),
        }
    }

    fn resolve_castling(&self, side: Color, s: CastlingSide) -> ParsedMove {
        let src = geometry::king_home(side);
        let dst = geometry::castling_king_dst(side, s);
        let rook = match self.config.castling_rook {
            CastlingRookPolicy::Relocate => Some((
                geometry::castling_rook_src(side, s),
                geometry::castling_rook_dst(side, s),
            )),
            CastlingRookPolicy::KingOnly => None,
        };
        ParsedMove {
            castling: Some(s),
            rook,
            captured: None,
            ..self.parsed(side, Piece::King, src, dst)
        }
    }

    fn resolve_pawn_move(&self, side: Color, dst: Coord) -> ParsedMove {
        let dir = geometry::pawn_forward_delta(side);
        let one_back = dst.try_shift(0, -dir).unwrap_or(dst);
        let mut src = one_back;
        if dst.rank() == geometry::double_move_dst_rank(side)
            && !self.position.get(one_back).is(side, Piece::Pawn)
        {
            if let Some(two_back) = dst.try_shift(0, -2 * dir) {
                src = two_back;
            }
        }
        self.parsed(side, Piece::Pawn, src, dst)
    }

    fn resolve_pawn_capture(&self, side: Color, file: File, dst: Coord) -> ParsedMove {
        let dir = geometry::pawn_forward_delta(side);
        let df = file.index() as isize - dst.file().index() as isize;
        let src = dst.try_shift(df, -dir).unwrap_or(dst);
        let mut res = self.parsed(side, Piece::Pawn, src, dst);
        if src.rank() == geometry::enpassant_src_rank(side)
            && dst.rank() == geometry::enpassant_dst_rank(side)
            && self.position.get(dst).is_empty()
        {
            res.en_passant = Some(Coord::from_parts(dst.file(), src.rank()));
            res.captured = Some(Piece::Pawn);
        }
        res
    }

    fn resolve_piece(
        &self,
        side: Color,
        piece: Piece,
        file: Option<File>,
        rank: Option<Rank>,
        dst: Coord,
    ) -> ParsedMove {
        let roster = self.roster.squares(side, piece);
        if matches!(piece, Piece::King | Piece::Queen) {
            let src = roster.first().copied().unwrap_or(dst);
            return self.parsed(side, piece, src, dst);
        }

        let hinted: Vec<Coord> = roster
            .iter()
            .copied()
            .filter(|sq| matches_hints(*sq, file, rank))
            .collect();
        let mut candidates: Vec<Coord> = hinted
            .iter()
            .copied()
            .filter(|sq| *sq != dst && reaches(piece, *sq, dst))
            .collect();
        if candidates.len() > 1 {
            let clear: Vec<Coord> = candidates
                .iter()
                .copied()
                .filter(|sq| between::is_path_clear(&self.position, *sq, dst))
                .collect();
            if !clear.is_empty() {
                candidates = clear;
            }
        }

        match candidates[..] {
            [src] => self.parsed(side, piece, src, dst),
            [] => {
                let src = hinted
                    .first()
                    .or_else(|| roster.first())
                    .copied()
                    .unwrap_or(dst);
                ParsedMove {
                    disambiguation: Disambiguation::Fallback,
                    ..self.parsed(side, piece, src, dst)
                }
            }
            [first, ..] => {
                let src = if piece == Piece::Rook {
                    candidates
                        .iter()
                        .copied()
                        .find(|sq| sq.delta(dst).0.abs() <= 4)
                        .unwrap_or(first)
                } else {
                    first
                };
                ParsedMove {
                    disambiguation: Disambiguation::Ambiguous,
                    ..self.parsed(side, piece, src, dst)
                }
            }
        }
    }

    fn evict(&mut self, at: Coord) -> Cell {
        let cell = self.position.take(at);
        if let Some((c, p)) = cell.parts() {
            self.roster.remove(c, p, at);
        }
        cell
    }

    fn shift(&mut self, src: Coord, dst: Coord, fallback: Cell) {
        // A guessed source equal to the destination holds the captured piece, not the mover
        let mut cell = if src == dst {
            Cell::EMPTY
        } else {
            self.position.take(src)
        };
        if cell.is_empty() {
            cell = fallback;
        }
        self.evict(dst);
        self.position.put(dst, cell);
        if let Some((c, p)) = cell.parts() {
            if src == dst || !self.roster.squares(c, p).contains(&src) {
                // The piece wasn't where we expected, so track it on its new square
                self.roster.remove(c, p, dst);
            }
            self.roster.relocate(c, p, src, dst);
        }
    }

    /// Applies `mv` to the position and the roster
    ///
    /// The move is not validated and is not added to the history.
    pub fn apply(&mut self, mv: &ParsedMove) {
        if let Some(victim) = mv.en_passant {
            self.evict(victim);
        }
        self.shift(mv.src, mv.dst, Cell::from_parts(mv.color, mv.piece));
        if let Some((src, dst)) = mv.rook {
            if self.position.get(src).is_occupied() {
                self.shift(src, dst, Cell::EMPTY);
            }
        }
    }

    /// Parses `token` for the side to move, applies it and adds it to the history
    pub fn push(&mut self, token: &str) -> Result<&MoveRecord, TokenError> {
        let mv = self.parse(token, self.side)?;
        self.apply(&mv);
        debug!(
            "replayed {} {} {} -> {}",
            mv.notation,
            mv.piece.name(),
            mv.src,
            mv.dst
        );
        self.side = self.side.inv();
        let move_number = self.history.next_move_number();
        Ok(self.history.push(mv.into_record(move_number)))
    }

    /// Pushes all the `tokens` in order, stopping at the first one that fails
    pub fn push_all<I, S>(&mut self, tokens: I) -> Result<(), ReplayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (pos, token) in tokens.into_iter().enumerate() {
            let token = token.as_ref();
            self.push(token).map_err(|source| ReplayError {
                pos,
                token: token.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
