use crate::types::{CastlingSide, Color, Coord, File, Rank};

pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

pub const fn pawn_start_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn double_move_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    }
}

pub const fn enpassant_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R5,
        Color::Black => Rank::R4,
    }
}

pub const fn enpassant_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    }
}

/// Rank delta of a single pawn step
pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

pub const fn king_home(c: Color) -> Coord {
    Coord::from_parts(File::E, castling_rank(c))
}

pub const fn castling_king_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    };
    Coord::from_parts(file, castling_rank(c))
}

pub const fn castling_rook_src(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::H,
        CastlingSide::Queen => File::A,
    };
    Coord::from_parts(file, castling_rank(c))
}

pub const fn castling_rook_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    };
    Coord::from_parts(file, castling_rank(c))
}
