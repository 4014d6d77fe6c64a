use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::Result;
use chess_engine::{
    constants::{DEFAULT_OPENING_DELAY_MS, DEFAULT_OPENINGS_DIR, DEFAULT_SEARCH_DEPTH},
    engine::{Engine, SearchSettings},
    opening_book::OpeningBook,
    types::{GameOutcome, Side},
};
use clap::Parser;
use rand::Rng;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Play chess against the engine in the terminal.
#[derive(Parser)]
#[command(name = "chess-engine-cli")]
struct Args {
    /// Alpha-beta search depth in plies.
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    depth: u8,

    /// Directory holding the opening book files.
    #[arg(long, default_value = DEFAULT_OPENINGS_DIR)]
    openings: PathBuf,

    /// Never play from the opening book.
    #[arg(long)]
    no_book: bool,

    /// Pause in milliseconds before a book reply.
    #[arg(long, default_value_t = DEFAULT_OPENING_DELAY_MS)]
    book_delay: u64,

    /// Random seed for reproducible games.
    #[arg(long)]
    seed: Option<u64>,
}

struct Cli {
    engine: Engine,
    display_enabled: bool,
}

impl Cli {
    fn new(args: &Args) -> Self {
        let book = if args.no_book {
            OpeningBook::default()
        } else {
            OpeningBook::load_dir(&args.openings).unwrap_or_else(|e| {
                warn!("Playing without an opening book: {}", e);
                OpeningBook::default()
            })
        };

        let settings = SearchSettings {
            depth: args.depth,
            use_opening_book: !args.no_book,
            opening_delay: Duration::from_millis(args.book_delay),
            ..Default::default()
        };

        Self {
            engine: Engine::new(settings, book, args.seed),
            display_enabled: true,
        }
    }

    fn show_help(&self) {
        println!("\n======================= INFORMATION ======================");
        println!("h or help - Displays help on the commands");
        println!("d or dd   - Displays board and toggles display setting");
        println!("moves     - Displays of list of possible moves");
        println!("fen       - Displays a FEN string for the current position");
        println!("q or quit - Quits the program");
        println!("================= CONTROLLING THE ENGINE =================");
        println!("go        - Starts the engine from the current position");
        println!("new       - Starts a new game");
        println!("p or play - The computer plays a move");
        println!("r         - Plays a random move");
        println!("off       - Turns the computer player off");
        println!("undo      - Takes back the last move");
        println!("===================== CONFIGURATION ======================");
        println!("fen <FEN>      - Loads a FEN string");
        println!("sd <depth>     - Sets the search depth");
        println!("book <on|off>  - Enables or disables the opening book");
    }

    fn display_board(&self) {
        if self.display_enabled {
            println!("{}", self.engine.position.board);
        }
    }

    /// Announces the end of the game and starts a new one. Returns whether the game was over.
    fn check_game_over(&mut self) -> bool {
        // Generating moves refreshes checkmate and stalemate
        self.engine.position.legal_moves();

        let Some(outcome) = self.engine.position.outcome() else {
            return false;
        };

        self.display_board();
        println!("\nGAME OVER");

        match outcome {
            GameOutcome::WhiteWin => println!("{{White mates}}"),
            GameOutcome::BlackWin => println!("{{Black mates}}"),
            GameOutcome::Draw => println!("{{Stalemate}}"),
        }

        self.engine.computer_side = None;
        self.engine.new_game();
        true
    }

    fn run_main_loop(&mut self) {
        self.display_board();

        loop {
            println!("\n-------------------------------");
            println!(
                "*   Ply: {} | To move: {:?}   *",
                self.engine.position.move_history.len(),
                self.engine.position.side
            );
            println!("-------------------------------");

            // Computer's turn
            if self.engine.computer_side == Some(self.engine.position.side) {
                println!("\nComputer is thinking...");

                match self.engine.play_best_move() {
                    Ok(move_) => println!("\nComputer plays: \x1b[32m{}\x1b[0m", move_),
                    Err(e) => {
                        println!("({})", e);
                        self.engine.computer_side = None;
                    }
                }

                if !self.check_game_over() {
                    self.display_board();
                }
                continue;
            }

            print!("\nMove OR command > ");
            if io::stdout().flush().is_err() {
                return;
            }

            let mut input = String::new();
            match io::stdin().read_line(&mut input) {
                Ok(0) => return, // EOF
                Ok(_) => {}
                Err(_) => return,
            }

            let command = input.trim().to_lowercase();

            // COMMANDS WITHOUT PARAMETERS
            match command.as_str() {
                "d" => {
                    println!("{}", self.engine.position.board);
                    continue;
                }
                "dd" => {
                    self.display_enabled = !self.display_enabled;

                    if self.display_enabled {
                        println!("\nBoard display enabled");
                        self.display_board();
                    } else {
                        println!("\nBoard display disabled");
                    }
                    continue;
                }
                "go" => {
                    self.handle_go_command();
                    continue;
                }
                "h" | "help" => {
                    self.show_help();
                    continue;
                }
                "fen" => {
                    println!("\n{}", self.engine.position.to_fen());
                    continue;
                }
                "moves" => {
                    println!("\nLegal moves:");
                    self.engine.display_legal_moves();
                    continue;
                }
                "new" => {
                    self.engine.new_game();
                    self.display_board();
                    continue;
                }
                "p" | "play" => {
                    self.engine.computer_side = Some(self.engine.position.side);
                    continue;
                }
                "r" => {
                    match self.engine.find_random_move() {
                        Some(move_) => {
                            self.engine.position.make_move(move_);
                            println!("\nRandom move: {}", move_);
                            if !self.check_game_over() {
                                self.display_board();
                            }
                        }
                        None => println!("\nNo legal moves"),
                    }
                    continue;
                }
                "off" => {
                    self.engine.computer_side = None;
                    continue;
                }
                "q" | "quit" => {
                    println!("\nProgram exiting");
                    break;
                }
                "undo" => {
                    if self.engine.take_back_move().is_none() {
                        println!("\nNo moves to undo");
                        continue;
                    }
                    self.engine.computer_side = None;
                    self.display_board();
                    continue;
                }
                _ => {}
            }

            // COMMANDS WITH PARAMETERS
            if let Some(fen) = input.trim().strip_prefix("fen ") {
                match self.engine.load_position(fen) {
                    Ok(()) => {
                        self.display_board();
                        println!("FEN loaded successfully");
                    }
                    Err(e) => println!("Error loading FEN: {}", e),
                }
                continue;
            }

            if let Some(depth) = command.strip_prefix("sd ") {
                match depth.parse::<u8>() {
                    Ok(depth) if depth > 0 => {
                        self.engine.search_settings.depth = depth;
                        println!("\nSearch depth set to {}", depth);
                    }
                    _ => println!("\nINVALID DEPTH!"),
                }
                continue;
            }

            if let Some(setting) = command.strip_prefix("book ") {
                self.engine.search_settings.use_opening_book = setting.trim() == "on";
                println!(
                    "\nOpening book {}",
                    if self.engine.search_settings.use_opening_book {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                continue;
            }

            let notation = command.replace(' ', "");

            match self.engine.play_notation(&notation) {
                Ok(_) => {
                    if !self.check_game_over() {
                        self.display_board();
                    }
                }
                Err(e) => println!("\nILLEGAL MOVE! ({})", e),
            }
        }
    }

    fn handle_go_command(&mut self) {
        println!("\nChoose your side:");
        println!("1. White");
        println!("2. Black");
        println!("3. Random");
        print!("\nEnter choice (1-3) > ");
        if io::stdout().flush().is_err() {
            return;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return;
        }

        println!();

        let player_side = match input.trim() {
            "1" => Side::White,
            "2" => Side::Black,
            "3" => {
                let side = if self.engine.rng().gen_bool(0.5) {
                    Side::White
                } else {
                    Side::Black
                };
                println!("You are playing as {:?}", side);
                side
            }
            _ => {
                println!("Invalid choice. Defaulting to White.");
                Side::White
            }
        };

        self.engine.computer_side = Some(player_side.opponent());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("\n==============================");
    println!("|        Chess Engine        |");
    println!("==============================\n");
    println!("\n\"h or help\" displays a list of commands\n");

    let mut cli = Cli::new(&args);
    cli.run_main_loop();

    Ok(())
}
