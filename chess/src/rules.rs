//! Piece movement rules
//!
//! Only movement geometry, path clearance and turn-independent capture rules are checked here.
//! Whether the king is left in check is not verified.

use crate::between::{self, is_diagonal, is_knight_jump, is_straight};
use crate::bitboard::Bitboard;
use crate::geometry;
use crate::position::Position;
use crate::types::{CastlingRights, CastlingSide, Color, Coord, Piece};

/// Returns the square of the pawn captured en passant if the pawn of color `c` standing on `src`
/// can capture en passant by moving to `dst`
///
/// `double_step` is the destination of the immediately preceding move if that move was a pawn
/// double step, or `None` otherwise.
pub fn en_passant_victim(
    pos: &Position,
    double_step: Option<Coord>,
    c: Color,
    src: Coord,
    dst: Coord,
) -> Option<Coord> {
    let victim = double_step?;
    if !pos.get(victim).is(c.inv(), Piece::Pawn) || src.rank() != victim.rank() {
        return None;
    }
    let (df, _) = src.delta(victim);
    if df.abs() != 1 {
        return None;
    }
    let passed = victim.try_shift(0, geometry::pawn_forward_delta(c))?;
    if passed != dst || pos.get(dst).is_occupied() {
        return None;
    }
    Some(victim)
}

fn is_pawn_move_valid(
    pos: &Position,
    double_step: Option<Coord>,
    c: Color,
    src: Coord,
    dst: Coord,
) -> bool {
    let dir = geometry::pawn_forward_delta(c);
    let (df, dr) = src.delta(dst);
    let target = pos.get(dst);
    match (df.abs(), dr) {
        (0, r) if r == dir => target.is_empty(),
        (0, r) if r == 2 * dir => {
            src.rank() == geometry::pawn_start_rank(c)
                && target.is_empty()
                && between::is_path_clear(pos, src, dst)
        }
        (1, r) if r == dir => {
            if target.is_occupied() {
                target.color() == Some(c.inv())
            } else {
                en_passant_victim(pos, double_step, c, src, dst).is_some()
            }
        }
        _ => false,
    }
}

/// Returns `true` if the piece standing on `src` may move to `dst`
///
/// The moving piece and its color are taken from `pos`. Moving from an empty square, moving to
/// the same square and capturing a piece of the same color are never valid.
pub fn is_valid_move(pos: &Position, double_step: Option<Coord>, src: Coord, dst: Coord) -> bool {
    let (c, piece) = match pos.get(src).parts() {
        Some(parts) => parts,
        None => return false,
    };
    if src == dst || pos.get(dst).color() == Some(c) {
        return false;
    }
    let (df, dr) = src.delta(dst);
    match piece {
        Piece::Pawn => is_pawn_move_valid(pos, double_step, c, src, dst),
        Piece::Knight => is_knight_jump(src, dst),
        Piece::Bishop => is_diagonal(src, dst) && between::is_path_clear(pos, src, dst),
        Piece::Rook => is_straight(src, dst) && between::is_path_clear(pos, src, dst),
        Piece::Queen => {
            (is_diagonal(src, dst) || is_straight(src, dst))
                && between::is_path_clear(pos, src, dst)
        }
        Piece::King => df.abs() <= 1 && dr.abs() <= 1,
    }
}

/// Returns all the squares the piece standing on `src` may move to
pub fn valid_destinations(pos: &Position, double_step: Option<Coord>, src: Coord) -> Bitboard {
    Coord::iter()
        .filter(|dst| is_valid_move(pos, double_step, src, *dst))
        .collect()
}

/// Returns `true` if color `c` may castle to side `s`
///
/// The king and the rook must stand on their home squares with the right still held, and all
/// the squares between them must be empty. Attacked squares are not considered.
pub fn can_castle(pos: &Position, rights: CastlingRights, c: Color, s: CastlingSide) -> bool {
    let king = geometry::king_home(c);
    let rook = geometry::castling_rook_src(c, s);
    rights.has(c, s)
        && pos.get(king).is(c, Piece::King)
        && pos.get(rook).is(c, Piece::Rook)
        && between::is_path_clear(pos, king, rook)
}

/// Drops the castling rights affected by a move from `src` to `dst`
///
/// Any move touching a king's home square or a rook's corner square loses the rights tied to it,
/// which covers both moving the piece away and capturing it.
pub fn update_castling(rights: &mut CastlingRights, src: Coord, dst: Coord) {
    for c in [Color::White, Color::Black] {
        let king = geometry::king_home(c);
        if src == king || dst == king {
            rights.unset_color(c);
        }
        for s in [CastlingSide::King, CastlingSide::Queen] {
            let rook = geometry::castling_rook_src(c, s);
            if src == rook || dst == rook {
                rights.unset(c, s);
            }
        }
    }
}
