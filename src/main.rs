mod board;
mod card;
mod command;
mod deck;
mod game;
mod history;
mod pile;
mod renderer;
mod selection;

use clap::Parser;

use board::{Board, DealRules};
use deck::Difficulty;
use game::Game;
use history::History;
use renderer::CliRenderer;

/// Spider Solitaire in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Number of suits in play: 1, 2 or 4.
    #[arg(short, long, value_enum, default_value = "1")]
    suits: Difficulty,
    /// Seed for a reproducible deal.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of deals from the deck.
    #[arg(long)]
    deal_limit: Option<u32>,
    /// Allow dealing while some piles are empty.
    #[arg(long)]
    allow_gaps: bool,
    /// Do not read or write the game record file.
    #[arg(long)]
    no_records: bool,
}

impl Cli {
    fn deal_rules(&self) -> DealRules {
        DealRules {
            require_filled_tableau: !self.allow_gaps,
            deal_limit: self.deal_limit,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    println!(
        r#"
┌─────────────────────────────────────────┐
│      Spider Solitaire (CLI Edition)     │
│   Type 'help' or '?' for commands.      │
└─────────────────────────────────────────┘
"#
    );

    let rules = cli.deal_rules();
    let board = match cli.seed {
        Some(seed) => Board::deal_seeded(cli.suits, seed, rules),
        None => Board::deal_random(cli.suits, rules),
    };
    let history = (!cli.no_records).then(History::load);

    let mut game = Game::new(board, CliRenderer::new(), history);
    game.run()
}
