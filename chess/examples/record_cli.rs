// Command-line application to record a game move by move
//
// Enter moves as two squares ("e2 e4" or "e2e4"), or "O-O" / "O-O-O" to castle. Other commands:
// "undo", "comment <text>" for the last move, "moves", "done".

use blindchess::{CastlingSide, Coord, GameRecord, Recorder, RecorderConfig};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

fn parse_squares(s: &str) -> Option<(Coord, Coord)> {
    let squares: String = s.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    if squares.len() != 4 || !squares.is_ascii() {
        return None;
    }
    let src = Coord::from_str(&squares[..2]).ok()?;
    let dst = Coord::from_str(&squares[2..]).ok()?;
    Some((src, dst))
}

fn main() -> io::Result<()> {
    env_logger::init();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut recorder = Recorder::new(RecorderConfig::default());

    loop {
        println!("{}", recorder.position().pretty());
        print!(
            "{} move ({}): ",
            recorder.side().name(),
            recorder.history().next_move_number()
        );
        io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let line = line.trim();

        match line {
            "done" => break,
            "undo" => match recorder.undo_last() {
                Some(m) => println!("Took back {}", m.notation),
                None => println!("Nothing to take back"),
            },
            "moves" => println!("{}", recorder.history().notation_list()),
            "O-O" | "0-0" | "O-O-O" | "0-0-0" => {
                let side = if line.len() == 3 {
                    CastlingSide::King
                } else {
                    CastlingSide::Queen
                };
                match recorder.castle(side) {
                    Some(m) => println!("{}", m.description()),
                    None => println!("Cannot castle {}", side.name()),
                }
            }
            _ if line.starts_with("comment ") => {
                let text = &line["comment ".len()..];
                let last = recorder.history().len().checked_sub(1);
                match last {
                    Some(idx) if recorder.set_commentary(idx, text) => println!("Noted"),
                    _ => println!("No move to comment"),
                }
            }
            _ => match parse_squares(line) {
                Some((src, dst)) => match recorder.try_move(src, dst) {
                    Some(m) => println!("{}: {}", m.notation, m.description()),
                    None => println!("Illegal move"),
                },
                None => println!("Cannot understand {:?}", line),
            },
        }
        println!();
    }

    let game = GameRecord::from_recorder("custom", "Custom game", "White", "Black", &recorder);
    match game.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Cannot save the game: {}", e),
    }
    Ok(())
}
