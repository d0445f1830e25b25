// Query games and positions from the command line.
// Usage: chessdb board "1. e4 e5 2. Nf3" 3

use std::{fs, path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context as _;
use chessdb::{
    Fen, Game,
    config::Config,
    fen,
    index::PositionIndex,
    ops,
    resolve::{ShakmatyResolver, Supervised},
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Arguments {
    /// Give up on a single resolution after this many milliseconds. 0 waits
    /// forever.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the game cut after n half-moves.
    FirstMoves { game: String, n: usize },
    /// Print the FEN after n half-moves.
    Board { game: String, n: usize },
    /// Print the FEN of every position of the game.
    Positions { game: String },
    /// Check FEN records, reporting the first invalid field of each.
    Validate { fens: Vec<String> },
    /// Whether the game passes through the board of the FEN.
    Occurs { game: String, fen: String },
    /// Whether the game starts with the opening.
    HasOpening { game: String, opening: String },
    /// Index games from a file, one per line, and print the line numbers of
    /// those passing through the board of the FEN.
    Search { games: PathBuf, fen: String },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Arguments::parse();

    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));
    let resolver = Supervised::with_config(
        || ShakmatyResolver,
        Config::default().with_timeout(timeout),
    );

    match args.command {
        Command::FirstMoves { game, n } => {
            let game: Game = game.parse()?;
            println!("{}", ops::first_moves(&game, n)?);
        }
        Command::Board { game, n } => {
            let game: Game = game.parse()?;
            println!("{}", ops::board_state(&game, n, &resolver)?);
        }
        Command::Positions { game } => {
            let game: Game = game.parse()?;
            for fen in ops::all_positions(&game, &resolver)? {
                println!("{fen}");
            }
        }
        Command::Validate { fens } => {
            let mut all_valid = true;
            for record in fens {
                match fen::validate(&record) {
                    Ok(()) => println!("valid: {record}"),
                    Err(field) => {
                        all_valid = false;
                        println!("invalid {field}: {record}");
                    }
                }
            }
            if !all_valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Occurs { game, fen } => {
            let game: Game = game.parse()?;
            let fen: Fen = fen.parse()?;
            println!("{}", ops::position_occurs(&game, &fen, &resolver)?);
        }
        Command::HasOpening { game, opening } => {
            let game: Game = game.parse()?;
            let opening: Game = opening.parse()?;
            println!("{}", ops::has_opening(&game, &opening)?);
        }
        Command::Search { games, fen } => {
            let probe: Fen = fen.parse()?;
            let text = fs::read_to_string(&games)
                .with_context(|| format!("could not read {}", games.display()))?;

            let mut index = PositionIndex::new();
            for (number, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let game: Game = line
                    .parse()
                    .with_context(|| format!("line {}", number + 1))?;
                index
                    .insert(number + 1, game, &resolver)
                    .with_context(|| format!("line {}", number + 1))?;
            }

            for number in index.search(&probe, &resolver)? {
                println!("{number}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
