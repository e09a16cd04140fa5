use crossterm::style::{StyledContent, Stylize};

use crate::board::{Board, NUM_PILES};
use crate::card::Card;
use crate::deck::Difficulty;
use crate::history::History;

/// Reference page for the full rules of Spider.
pub const RULES_URL: &str = "https://solitaired.com/guides/how-to-play-spider-solitaire";

/// Trait that abstracts the rendering layer.
///
/// The game loop only talks to the board through commands and hands the
/// board to the renderer afterwards, so any front end can sit behind this.
pub trait Renderer {
    /// Render the full game board.
    fn render(&mut self, board: &Board);
    /// Display an informational message.
    fn info(&mut self, msg: &str);
    /// Display an error message.
    fn error(&mut self, msg: &str);
    /// Display the help text.
    fn help(&mut self);
    /// Display the rules summary.
    fn rules(&mut self);
    /// Display statistics per difficulty.
    fn stats(&mut self, history: &History);
    /// Display the win screen.
    fn win(&mut self, board: &Board);
}

// ---------------------------------------------------------------------------
// CLI Renderer
// ---------------------------------------------------------------------------

/// A colored terminal renderer.
pub struct CliRenderer;

impl CliRenderer {
    pub fn new() -> Self {
        CliRenderer
    }

    fn card_str(&self, card: &Card) -> StyledContent<String> {
        if !card.is_face_up() {
            return format!("{:>3}", "##").dark_blue();
        }

        let label = format!("{:>3}", card.label());
        let styled = if card.suit().is_red() {
            label.red()
        } else {
            label.white()
        };
        if card.is_selected() {
            styled.reverse()
        } else {
            styled
        }
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn render(&mut self, board: &Board) {
        println!();

        // ---- Status line ----
        let deck = if board.deck_is_empty() {
            "empty".to_string()
        } else {
            board.deck_len().to_string()
        };
        println!(
            "  {}  suits: {}   moves: {}   deals left: {}   deck: {}   runs: {}/8",
            board.difficulty().name().bold(),
            board.difficulty().suit_count(),
            board.moves(),
            board.deals_remaining(),
            deck,
            board.completed_runs(),
        );

        // ---- Pile indices header ----
        println!();
        print!("  PILE: ");
        for i in 0..NUM_PILES {
            print!(" {:^4}", i);
        }
        println!();

        // ---- Tableau ----
        let max_len = board.piles().iter().map(|p| p.len()).max().unwrap_or(0);

        for row in 0..max_len {
            print!("  {:>3}: ", row);
            for pile in board.piles() {
                match pile.get(row) {
                    Some(card) => print!(" {} ", self.card_str(card)),
                    None if row == 0 => print!("  .. "),
                    None => print!("     "),
                }
            }
            println!();
        }

        if max_len == 0 {
            println!("  (all piles empty)");
        }

        let held = board.held_chain();
        if !held.is_empty() {
            let labels: Vec<String> = held.iter().map(Card::label).collect();
            println!();
            println!("  Holding: {}", labels.join(" ").yellow());
        }

        println!();
    }

    fn info(&mut self, msg: &str) {
        println!("{} {}", "[INFO]".cyan(), msg);
    }

    fn error(&mut self, msg: &str) {
        println!("{} {}", "[ERR ]".red(), msg);
    }

    fn help(&mut self) {
        println!(
            r#"
╔══════════════════════════════════════════════════════════════╗
║          Spider Solitaire – CLI Help                         ║
╠══════════════════════════════════════════════════════════════╣
║  Rows count down the screen (row 0 = deepest card).          ║
║  Face-down cards are shown as ##.                            ║
║                                                              ║
║  COMMANDS (case-insensitive):                                ║
║                                                              ║
║  c  <pile>             Click the exposed card of a pile,     ║
║                        or the pile itself when it is empty   ║
║  c  <pile>:<row>       Click the card at <row>               ║
║  mv <pile>[:<row>] <dst>                                     ║
║                        Pick up a run and drop it on <dst>    ║
║  deal | d              Deal one card onto every pile         ║
║  new [1|2|4]           New game (optionally change suits)    ║
║  stats | s             Show statistics                       ║
║  rules | r             Show the rules                        ║
║  quit | q              Exit                                  ║
║  help | h | ?          Show this help                        ║
╠══════════════════════════════════════════════════════════════╣
║  Clicking works like a mouse: click a run to pick it up,     ║
║  then click where it should go.  Click the same card again,  ║
║  or any illegal target, to put it back.                      ║
║                                                              ║
║  Example: mv 4:3 7  →  move pile 4 from row 3 onto pile 7    ║
╚══════════════════════════════════════════════════════════════╝
"#
        );
    }

    fn rules(&mut self) {
        println!(
            r#"
  GOAL: Build eight King-to-Ace runs and clear the table.

  · 104 cards are played with 1, 2 or 4 suits.
  · A run of cards may be picked up when it descends by one rank
    and every card is the same suit.
  · A run may be placed on the exposed card of another pile when
    that card is the same suit and exactly one rank higher, or on
    an empty pile.
  · A complete King-to-Ace run is removed from the table.
  · Dealing puts one card on every pile.  Every pile must have at
    least one card before you can deal.
  · You win when the deck and every pile are empty.

  Full rules: {RULES_URL}
"#
        );
    }

    fn stats(&mut self, history: &History) {
        println!();
        println!("  {:<14} {:>7} {:>5} {:>7} {:>11}", "DIFFICULTY", "PLAYED", "WON", "WIN %", "BEST MOVES");
        for difficulty in Difficulty::ALL {
            let s = history.summary(difficulty);
            let pct = if s.played == 0 {
                0.0
            } else {
                100.0 * s.won as f64 / s.played as f64
            };
            let best = s
                .best_moves
                .map_or_else(|| "-".to_string(), |m| m.to_string());
            println!(
                "  {:<14} {:>7} {:>5} {:>6.1}% {:>11}",
                difficulty.name(),
                s.played,
                s.won,
                pct,
                best
            );
        }
        println!();
    }

    fn win(&mut self, board: &Board) {
        println!(
            "\n{}\n\n  Congratulations! You cleared the table in {} moves.  Type 'new' for another game.\n",
            r#"
  ██╗    ██╗ ██████╗ ███╗   ██╗██╗
  ██║    ██║██╔═══██╗████╗  ██║██║
  ██║ █╗ ██║██║   ██║██╔██╗ ██║██║
  ██║███╗██║██║   ██║██║╚██╗██║╚═╝
  ╚███╔███╔╝╚██████╔╝██║ ╚████║██╗
   ╚══╝╚══╝  ╚═════╝ ╚═╝  ╚═══╝╚═╝"#
                .yellow(),
            board.moves()
        );
    }
}
