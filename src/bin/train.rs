//! Trains the persisted Monte Carlo tree by random self-play.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chess_engine::{
    constants::{DEFAULT_SAVE_INTERVAL, DEFAULT_TRAINING_ITERATIONS, DEFAULT_TREE_FILE},
    mcts::{Trainer, TrainingObserver, TrainingSettings},
    position::Position,
    tree::MctsTree,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Monte Carlo tree training.
#[derive(Parser)]
#[command(name = "chess-engine-train")]
struct Args {
    /// Tree file to load and rewrite.
    #[arg(short, long, default_value = DEFAULT_TREE_FILE)]
    tree: PathBuf,

    /// Total number of training iterations.
    #[arg(short, long, default_value_t = DEFAULT_TRAINING_ITERATIONS)]
    iterations: usize,

    /// Iterations between two saves of the tree.
    #[arg(short, long, default_value_t = DEFAULT_SAVE_INTERVAL)]
    save_interval: usize,

    /// Write a fresh tree before training. Refuses to overwrite an existing file.
    #[arg(long)]
    init: bool,

    /// Random seed for reproducible training.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the board after every move of every playout.
    #[arg(long)]
    show_board: bool,
}

struct ProgressObserver {
    show_board: bool,
}

impl TrainingObserver for ProgressObserver {
    fn on_position_changed(&mut self, position: &Position) {
        if self.show_board {
            println!("{}", position.board);
        }
    }

    fn on_iteration_complete(&mut self, completed: usize, total: usize) {
        info!("Iteration {}/{}", completed, total);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.init {
        if args.tree.exists() {
            bail!("{} already exists", args.tree.display());
        }

        MctsTree::new()
            .save(&args.tree)
            .with_context(|| format!("Failed to create {}", args.tree.display()))?;
        info!("Created empty tree at {}", args.tree.display());
    }

    let settings = TrainingSettings {
        tree_path: args.tree.clone(),
        iterations: args.iterations,
        save_interval: args.save_interval,
        seed: args.seed,
    };

    let mut trainer = Trainer::new(settings);
    let mut position = Position::new();
    let mut observer = ProgressObserver {
        show_board: args.show_board,
    };

    let report = trainer
        .run_with_observer(&mut position, &mut observer)
        .with_context(|| format!("Training on {} failed", args.tree.display()))?;

    println!("\n{:<8} {:>8} {:>10}", "MOVE", "VISITS", "WIN RATE");
    for child in &report.children {
        println!(
            "{:<8} {:>8} {:>10}",
            child.notation,
            child.visits,
            child
                .win_rate
                .map_or_else(|| "-".to_string(), |rate| format!("{:.3}", rate))
        );
    }

    if let Some(child) = &report.most_visited {
        println!("\nMost visited: {} ({} visits)", child.notation, child.visits);
    }
    if let Some(child) = &report.best_win_rate {
        println!(
            "Best win rate: {} ({:.3})",
            child.notation,
            child.win_rate.unwrap_or_default()
        );
    }
    println!("Tree size: {} nodes", report.tree_size);

    Ok(())
}
