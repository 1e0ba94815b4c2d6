use crate::bitboard::Bitboard;
use crate::position::Position;
use crate::types::Coord;

/// Returns `true` if `src` and `dst` are distinct and share a diagonal
#[inline]
pub fn is_diagonal(src: Coord, dst: Coord) -> bool {
    let (df, dr) = src.delta(dst);
    df != 0 && df.abs() == dr.abs()
}

/// Returns `true` if `src` and `dst` are distinct and share a rank or a file
#[inline]
pub fn is_straight(src: Coord, dst: Coord) -> bool {
    let (df, dr) = src.delta(dst);
    (df == 0) != (dr == 0)
}

/// Returns `true` if `src` and `dst` are a knight's jump apart
#[inline]
pub fn is_knight_jump(src: Coord, dst: Coord) -> bool {
    let (df, dr) = src.delta(dst);
    matches!((df.abs(), dr.abs()), (1, 2) | (2, 1))
}

/// Returns the squares strictly between `src` and `dst`
///
/// The result is empty if the squares don't share a rank, a file or a diagonal.
pub fn between(src: Coord, dst: Coord) -> Bitboard {
    if !is_diagonal(src, dst) && !is_straight(src, dst) {
        return Bitboard::EMPTY;
    }
    let (df, dr) = src.delta(dst);
    let (step_f, step_r) = (df.signum(), dr.signum());
    let mut res = Bitboard::EMPTY;
    let mut cur = src;
    while let Some(next) = cur.try_shift(step_f, step_r) {
        if next == dst {
            break;
        }
        res.set(next);
        cur = next;
    }
    res
}

/// Returns `true` if no piece stands strictly between `src` and `dst`
#[inline]
pub fn is_path_clear(pos: &Position, src: Coord, dst: Coord) -> bool {
    (between(src, dst) & pos.occupied()).is_empty()
}
