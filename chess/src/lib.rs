//! # Move recording and replay for blindfold chess
//!
//! This crate covers two sides of working with hand-made games:
//!
//! - [`Recorder`] is an authoring session. It checks that proposed moves follow the piece
//!   movement rules, writes their notation and keeps the move history.
//! - [`MoveParser`] replays stored notation, finding which piece each token refers to with
//!   a [`PieceRoster`].
//!
//! Both produce [`MoveRecord`]s, which can be navigated with a [`Cursor`] and stored as a
//! [`GameRecord`].
//!
//! Check and checkmate are not detected, and promotion is not supported.
//!
//! # Example
//!
//! ```
//! use blindchess::{Coord, MoveParser, ParserConfig, Recorder};
//! use std::str::FromStr;
//!
//! let mut recorder = Recorder::default();
//! let e2 = Coord::from_str("e2").unwrap();
//! let e4 = Coord::from_str("e4").unwrap();
//! assert_eq!(recorder.try_move(e2, e4).unwrap().notation, "e4");
//!
//! let parser = MoveParser::replay(ParserConfig::default(), recorder.moves_notation()).unwrap();
//! assert_eq!(parser.position(), recorder.position());
//! ```

pub mod between;
pub mod history;
pub mod moves;
pub mod notation;
pub mod parser;
pub mod position;
pub mod record;
pub mod recorder;
pub mod roster;
pub mod rules;

pub use blindchess_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use history::{Cursor, History};
pub use moves::MoveRecord;
pub use notation::{CheckMark, Notation, NotationMode, TokenError};
pub use parser::{
    CastlingRookPolicy, Disambiguation, MoveParser, ParsedMove, ParserConfig, ReplayError,
};
pub use position::Position;
pub use record::{GameLibrary, GameRecord, RecordError};
pub use recorder::{ClickOutcome, Recorder, RecorderConfig, Selection};
pub use roster::PieceRoster;
pub use types::{CastlingRights, CastlingSide, Cell, Color, Coord, File, Piece, Rank};
