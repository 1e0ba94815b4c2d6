//! Ordered move history and navigation over it

use crate::moves::MoveRecord;
use crate::position::Position;
use crate::types::Color;

use std::fmt;

/// Append-only list of applied moves, together with the position they start from
///
/// Entries are never changed once pushed, except for their commentary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    start: Position,
    start_side: Color,
    records: Vec<MoveRecord>,
}

impl History {
    /// Creates an empty history starting from `start` with `side` to move
    pub fn new(start: Position, side: Color) -> Self {
        History {
            start,
            start_side: side,
            records: Vec::new(),
        }
    }

    pub fn new_initial() -> Self {
        Self::new(Position::initial(), Color::White)
    }

    /// Returns the position before the first move
    pub fn start(&self) -> &Position {
        &self.start
    }

    /// Returns the side making the first move
    pub fn start_side(&self) -> Color {
        self.start_side
    }

    /// Returns the side to move after all the moves
    pub fn side_to_move(&self) -> Color {
        if self.records.len() % 2 == 0 {
            self.start_side
        } else {
            self.start_side.inv()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&MoveRecord> {
        self.records.get(idx)
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Returns the full move number for the next move to be pushed
    ///
    /// The number grows before each White move, except for the very first one. So, if Black
    /// starts, its first move and White's reply are numbered 1 and 2.
    pub fn next_move_number(&self) -> u32 {
        let offset = match self.start_side {
            Color::White => 0,
            Color::Black => 1,
        };
        ((self.records.len() + offset) / 2 + 1) as u32
    }

    pub(crate) fn push(&mut self, record: MoveRecord) -> &MoveRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub(crate) fn pop(&mut self) -> Option<MoveRecord> {
        self.records.pop()
    }

    /// Attaches commentary to the move with index `idx`, replacing the previous one
    ///
    /// Blank text clears the commentary. Returns `false` if there is no such move.
    pub fn set_commentary(&mut self, idx: usize, text: &str) -> bool {
        match self.records.get_mut(idx) {
            Some(record) => {
                let text = text.trim();
                record.commentary = (!text.is_empty()).then(|| text.to_string());
                true
            }
            None => false,
        }
    }

    /// Replays the first `ply` moves from the starting position
    ///
    /// If `ply` exceeds the number of moves, the final position is returned.
    pub fn position_at(&self, ply: usize) -> Position {
        let mut pos = self.start;
        for record in self.records.iter().take(ply) {
            record.apply(&mut pos);
        }
        pos
    }

    /// Returns the position after all the moves
    pub fn final_position(&self) -> Position {
        self.position_at(self.records.len())
    }

    /// Returns the notation of all the moves, in order
    pub fn notation(&self) -> Vec<String> {
        self.records.iter().map(|r| r.notation.clone()).collect()
    }

    /// Wraps the history to display it as a numbered move list, like `1. e4 e5 2. Nf3`
    ///
    /// If Black moves first, the list starts like `1... e5 2. Nf3`.
    pub fn notation_list(&self) -> NotationList<'_> {
        NotationList(self)
    }

    /// Returns a cursor placed before the first move
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            history: self,
            ply: 0,
            position: self.start,
        }
    }
}

/// Navigation over a [`History`]
///
/// The cursor points between moves: ply `0` is the starting position, ply `len()` is the
/// final one. Every move of the cursor rebuilds its position by replaying from the start, so
/// the same ply always gives the same position.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    history: &'a History,
    ply: usize,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Returns the number of moves applied to the current position
    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the last move applied to the current position
    pub fn current(&self) -> Option<&'a MoveRecord> {
        self.ply.checked_sub(1).and_then(|idx| self.history.get(idx))
    }

    /// Moves the cursor to ply `ply`, clamped to the history length
    pub fn seek(&mut self, ply: usize) -> &Position {
        self.ply = ply.min(self.history.len());
        self.position = self.history.position_at(self.ply);
        &self.position
    }

    pub fn first(&mut self) -> &Position {
        self.seek(0)
    }

    pub fn last(&mut self) -> &Position {
        self.seek(self.history.len())
    }

    /// Steps one move forward, returning the move applied
    pub fn next(&mut self) -> Option<&'a MoveRecord> {
        if self.ply == self.history.len() {
            return None;
        }
        self.seek(self.ply + 1);
        self.current()
    }

    /// Steps one move back, returning the move taken back
    pub fn prev(&mut self) -> Option<&'a MoveRecord> {
        if self.ply == 0 {
            return None;
        }
        let undone = self.current();
        self.seek(self.ply - 1);
        undone
    }
}

pub struct NotationList<'a>(&'a History);

impl<'a> fmt::Display for NotationList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (idx, record) in self.0.iter().enumerate() {
            if idx != 0 {
                write!(f, " ")?;
            }
            match record.color {
                Color::White => write!(f, "{}. ", record.move_number)?,
                Color::Black if idx == 0 => write!(f, "{}... ", record.move_number)?,
                Color::Black => {}
            }
            write!(f, "{}", record.notation)?;
        }
        Ok(())
    }
}
