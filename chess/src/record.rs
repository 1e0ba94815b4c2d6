//! Stored game records

use crate::history::History;
use crate::moves::MoveRecord;
use crate::parser::{MoveParser, ParserConfig, ReplayError};
use crate::recorder::Recorder;
use crate::types::{Cell, Color};

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reading or replaying a stored game
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("bad game json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot replay game: {0}")]
    Replay(#[from] ReplayError),
}

/// White's and Black's moves under the same number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovePair {
    pub move_number: u32,
    pub white: Option<String>,
    pub black: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
}

/// A single move with all its flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedMove {
    pub move_number: u32,
    pub color: String,
    pub from: String,
    pub to: String,
    /// Piece letter, uppercase for White and lowercase for Black
    pub piece: String,
    pub notation: String,
    pub is_capture: bool,
    pub is_en_passant: bool,
    pub is_castling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
}

impl From<&MoveRecord> for DetailedMove {
    fn from(m: &MoveRecord) -> Self {
        let letter = |c: Color, p| Cell::from_parts(c, p).as_char().to_string();
        DetailedMove {
            move_number: m.move_number,
            color: m.color.name().to_lowercase(),
            from: m.src.to_string(),
            to: m.dst.to_string(),
            piece: letter(m.color, m.piece),
            notation: m.notation.clone(),
            is_capture: m.is_capture(),
            is_en_passant: m.is_en_passant(),
            is_castling: m.is_castling(),
            captured: m.captured.map(|p| letter(m.color.inv(), p)),
            commentary: m.commentary.clone(),
        }
    }
}

fn pair_moves(history: &History) -> Vec<MovePair> {
    let mut res: Vec<MovePair> = Vec::new();
    for m in history.iter() {
        let continues = matches!(
            res.last(),
            Some(last) if last.move_number == m.move_number
                && m.color == Color::Black
                && last.black.is_none()
        );
        if !continues {
            res.push(MovePair {
                move_number: m.move_number,
                ..MovePair::default()
            });
        }
        let pair = match res.last_mut() {
            Some(pair) => pair,
            None => continue,
        };
        match m.color {
            Color::White => pair.white = Some(m.notation.clone()),
            Color::Black => pair.black = Some(m.notation.clone()),
        }
        if !pair.description.is_empty() {
            pair.description.push_str("; ");
        }
        pair.description.push_str(&m.description());
        if let Some(text) = &m.commentary {
            match &mut pair.commentary {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(text);
                }
                None => pair.commentary = Some(text.clone()),
            }
        }
    }
    res
}

/// Stored game, in the format of `games.json` entries
///
/// All the fields are optional when reading, so entries holding only `moves_notation` are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRecord {
    pub id: String,
    pub name: String,
    pub white_player: String,
    pub black_player: String,
    pub moves: Vec<MovePair>,
    pub moves_notation: Vec<String>,
    pub moves_detailed: Vec<DetailedMove>,
}

impl GameRecord {
    /// Builds the record of a game from its history
    pub fn from_history(
        id: &str,
        name: &str,
        white_player: &str,
        black_player: &str,
        history: &History,
    ) -> Self {
        GameRecord {
            id: id.to_string(),
            name: name.to_string(),
            white_player: white_player.to_string(),
            black_player: black_player.to_string(),
            moves: pair_moves(history),
            moves_notation: history.notation(),
            moves_detailed: history.iter().map(DetailedMove::from).collect(),
        }
    }

    /// Builds the record of a game authored with `recorder`
    pub fn from_recorder(
        id: &str,
        name: &str,
        white_player: &str,
        black_player: &str,
        recorder: &Recorder,
    ) -> Self {
        Self::from_history(id, name, white_player, black_player, recorder.history())
    }

    pub fn from_json(s: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replays the game from `moves_notation`
    ///
    /// Commentary stored in `moves_detailed` is attached to the replayed moves.
    pub fn replay(&self, config: ParserConfig) -> Result<MoveParser, RecordError> {
        let mut parser = MoveParser::replay(config, &self.moves_notation)?;
        for (idx, detailed) in self.moves_detailed.iter().enumerate() {
            if let Some(text) = &detailed.commentary {
                parser.history_mut().set_commentary(idx, text);
            }
        }
        Ok(parser)
    }
}

/// Collection of stored games, as found in `games.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameLibrary {
    games: Vec<GameRecord>,
}

impl GameLibrary {
    pub fn new(games: Vec<GameRecord>) -> Self {
        GameLibrary { games }
    }

    pub fn from_json(s: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, RecordError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn find(&self, id: &str) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn push(&mut self, game: GameRecord) {
        self.games.push(game);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::recorder::RecorderConfig;
    use crate::types::{CastlingRights, Coord};
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn scholars_mate() -> Recorder {
        let mut rec = Recorder::default();
        for (src, dst) in [
            ("e2", "e4"),
            ("e7", "e5"),
            ("f1", "c4"),
            ("b8", "c6"),
            ("d1", "h5"),
            ("g8", "f6"),
            ("h5", "f7"),
        ] {
            rec.try_move(sq(src), sq(dst)).unwrap();
        }
        rec.set_commentary(5, "A blunder");
        rec
    }

    #[test]
    fn test_from_recorder() {
        let rec = scholars_mate();
        let game = GameRecord::from_recorder("g1", "Scholar's Mate", "Alice", "Bob", &rec);
        assert_eq!(
            game.moves_notation,
            vec!["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7"]
        );
        assert_eq!(game.moves.len(), 4);
        assert_eq!(game.moves[3].white.as_deref(), Some("Qxf7"));
        assert_eq!(game.moves[3].black, None);
        assert_eq!(
            game.moves[0].description,
            "White pawn moves from e2 to e4; Black pawn moves from e7 to e5"
        );
        assert_eq!(game.moves[2].commentary.as_deref(), Some("A blunder"));

        let last = &game.moves_detailed[6];
        assert_eq!(last.piece, "Q");
        assert_eq!(last.captured.as_deref(), Some("p"));
        assert!(last.is_capture);
        assert!(!last.is_en_passant);
        assert_eq!(last.color, "white");
    }

    #[test]
    fn test_pairs_when_black_starts() {
        let pos = Position::from_placement("4k3/4p3/8/8/8/8/4P3/4K3").unwrap();
        let mut rec = Recorder::with_position(
            RecorderConfig::default(),
            pos,
            Color::Black,
            CastlingRights::EMPTY,
        );
        for (src, dst) in [("e7", "e5"), ("e2", "e4"), ("e8", "d8")] {
            rec.try_move(sq(src), sq(dst)).unwrap();
        }
        let game = GameRecord::from_recorder("b", "Black starts", "Alice", "Bob", &rec);
        let pairs: Vec<(u32, Option<&str>, Option<&str>)> = game
            .moves
            .iter()
            .map(|p| (p.move_number, p.white.as_deref(), p.black.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, None, Some("e5")), (2, Some("e4"), Some("Kd8"))]
        );
        assert_eq!(game.moves[0].description, "Black pawn moves from e7 to e5");
    }

    #[test]
    fn test_json() {
        let rec = scholars_mate();
        let game = GameRecord::from_recorder("g1", "Scholar's Mate", "Alice", "Bob", &rec);
        let json = game.to_json().unwrap();
        assert_eq!(GameRecord::from_json(&json).unwrap(), game);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["white_player"], "Alice");
        assert_eq!(value["moves"][0]["move_number"], 1);
        assert_eq!(value["moves_detailed"][0]["from"], "e2");
    }

    #[test]
    fn test_replay() {
        let rec = scholars_mate();
        let game = GameRecord::from_recorder("g1", "Scholar's Mate", "Alice", "Bob", &rec);
        let parser = game.replay(ParserConfig::default()).unwrap();
        assert_eq!(parser.position(), rec.position());
        assert_eq!(
            parser.history().get(5).unwrap().commentary.as_deref(),
            Some("A blunder")
        );
    }

    #[test]
    fn test_library() {
        let json = r#"[
            {"id": "fools", "name": "Fool's Mate", "moves_notation": ["f3", "e5", "g4", "Qh4#"]},
            {"id": "broken", "moves_notation": ["e4", "??"]}
        ]"#;
        let library = GameLibrary::from_json(json).unwrap();
        assert_eq!(library.len(), 2);
        assert!(library.find("nope").is_none());

        let fools = library.find("fools").unwrap();
        assert_eq!(fools.white_player, "");
        let parser = fools.replay(ParserConfig::default()).unwrap();
        assert_eq!(parser.history().len(), 4);

        let broken = library.find("broken").unwrap();
        match broken.replay(ParserConfig::default()) {
            Err(RecordError::Replay(e)) => assert_eq!(e.pos, 1),
            other => panic!("unexpected result: {:?}", other.map(|p| p.history().len())),
        }

        assert!(matches!(
            GameLibrary::from_json("{\"id\": 1}"),
            Err(RecordError::Json(_))
        ));
    }
}
