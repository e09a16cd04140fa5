use crate::board::NUM_PILES;
use crate::deck::Difficulty;

/// All commands a player can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Click a card, or the empty space of a pile.
    /// `row`: 0 = deepest card, counted down the screen;
    /// `None` means the exposed card.
    Click { pile: usize, row: Option<usize> },
    /// Pick up the chain at `src`/`row` and drop it on `dst` in one go.
    Move {
        src: usize,
        row: Option<usize>,
        dst: usize,
    },
    /// Deal a new row from the deck.
    Deal,
    /// Start over, optionally at a different difficulty.
    NewGame { difficulty: Option<Difficulty> },
    /// Show per-difficulty statistics.
    Stats,
    /// Print the rules.
    Rules,
    /// Quit the game.
    Quit,
    /// Print help.
    Help,
}

/// Parse a single line of text input into a `Command`.
///
/// Syntax reference (case-insensitive):
/// ```text
/// c <pile>                  -- Click the exposed card (or the empty pile)
/// c <pile>:<row>            -- Click the card at <row> (0 = deepest)
/// mv <pile>[:<row>] <dst>   -- Pick up a run and drop it on <dst>
/// deal | d                  -- Deal a new row
/// new [1|2|4]               -- New game, optionally with a suit count
/// stats | s                 -- Show statistics
/// rules | r                 -- Show the rules
/// quit | q                  -- Quit
/// help | h | ?              -- Help
/// ```
pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty input".to_string());
    }

    let tokens: Vec<&str> = input.split_whitespace().collect();
    let cmd = tokens[0].to_lowercase();

    match cmd.as_str() {
        "c" | "click" => {
            if tokens.len() < 2 {
                return Err("Usage: c <pile>[:<row>]".to_string());
            }
            let (pile, row) = parse_position(tokens[1])?;
            Ok(Command::Click { pile, row })
        }
        "mv" | "m" => {
            if tokens.len() < 3 {
                return Err("Usage: mv <pile>[:<row>] <dst>".to_string());
            }
            let (src, row) = parse_position(tokens[1])?;
            let dst = parse_pile_idx(tokens[2])?;
            if src == dst {
                return Err("Source and destination piles are the same".to_string());
            }
            Ok(Command::Move { src, row, dst })
        }
        "deal" | "d" => Ok(Command::Deal),
        "new" | "n" => {
            let difficulty = match tokens.get(1) {
                Some(s) => Some(parse_difficulty(s)?),
                None => None,
            };
            Ok(Command::NewGame { difficulty })
        }
        "stats" | "s" => Ok(Command::Stats),
        "rules" | "r" => Ok(Command::Rules),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "help" | "h" | "?" => Ok(Command::Help),
        _ => Err(format!("Unknown command '{}'. Type 'help' for help.", tokens[0])),
    }
}

/// `"3"` or `"3:2"` → pile 3, optional row 2.
fn parse_position(s: &str) -> Result<(usize, Option<usize>), String> {
    match s.split_once(':') {
        Some((pile_part, row_part)) => {
            let pile = parse_pile_idx(pile_part)?;
            let row = row_part
                .parse()
                .map_err(|_| format!("'{}' is not a valid row", row_part))?;
            Ok((pile, Some(row)))
        }
        None => Ok((parse_pile_idx(s)?, None)),
    }
}

fn parse_pile_idx(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid pile index", s))?;
    if n >= NUM_PILES {
        return Err(format!(
            "Pile index {} out of range (0–{})",
            n,
            NUM_PILES - 1
        ));
    }
    Ok(n)
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse::<usize>()
        .ok()
        .and_then(Difficulty::from_suit_count)
        .ok_or_else(|| format!("'{}' is not a valid suit count. Use 1, 2 or 4.", s))
}
