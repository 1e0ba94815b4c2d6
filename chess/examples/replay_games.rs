// Replays all the games stored in a `games.json` file
//
// Usage: replay_games <games.json> [<game id>]

use blindchess::{GameLibrary, ParserConfig};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: replay_games <games.json> [<game id>]");
            process::exit(2);
        }
    };
    let only = args.next();

    let library = match File::open(&path)
        .map_err(|e| e.to_string())
        .and_then(|f| GameLibrary::from_reader(BufReader::new(f)).map_err(|e| e.to_string()))
    {
        Ok(library) => library,
        Err(e) => {
            eprintln!("cannot load {}: {}", path, e);
            process::exit(1);
        }
    };

    for game in library.games() {
        if only.as_deref().map_or(false, |id| id != game.id) {
            continue;
        }
        println!("== {} ({}) ==", game.name, game.id);
        let parser = match game.replay(ParserConfig::default()) {
            Ok(parser) => parser,
            Err(e) => {
                log::error!("skipping game {}: {}", game.id, e);
                continue;
            }
        };
        println!("{}", parser.history().notation_list());
        for record in parser.history().iter() {
            match &record.commentary {
                Some(text) => println!("  {}: {} ({})", record.notation, record.description(), text),
                None => println!("  {}: {}", record.notation, record.description()),
            }
        }
        println!("{}", parser.position().pretty());
    }
}
