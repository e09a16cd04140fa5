use std::io::{self, BufRead, Write};

use anyhow::Context;
use log::{info, warn};

use crate::board::{Board, BoardError, ClickOutcome, DealRules};
use crate::command::{Command, parse_command};
use crate::deck::Difficulty;
use crate::history::History;
use crate::renderer::Renderer;

/// The main game loop.  `renderer` is injected so the engine stays
/// renderer-agnostic.
pub struct Game<R: Renderer> {
    board: Board,
    renderer: R,
    rules: DealRules,
    /// `None` when records are switched off.
    history: Option<History>,
}

impl<R: Renderer> Game<R> {
    pub fn new(board: Board, renderer: R, history: Option<History>) -> Self {
        let mut game = Game {
            rules: board.rules(),
            board,
            renderer,
            history,
        };
        game.start_record();
        game
    }

    /// Run the interactive game loop until the player quits or input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        self.renderer.render(&self.board);

        loop {
            print!("> ");
            stdout.flush().context("flushing prompt")?;

            let mut line = String::new();
            if stdin
                .lock()
                .read_line(&mut line)
                .context("reading command")?
                == 0
            {
                // EOF
                break;
            }

            match parse_command(&line) {
                Err(e) => self.renderer.error(&e),
                Ok(cmd) => {
                    if self.handle(cmd) {
                        break;
                    }
                    self.renderer.render(&self.board);
                }
            }
        }

        self.finish_record();
        Ok(())
    }

    /// Dispatch a command.  Returns `true` if the game should exit.
    pub fn handle(&mut self, cmd: Command) -> bool {
        let was_won = self.board.is_won();

        match cmd {
            Command::Quit => {
                self.renderer.info("Thanks for playing. Goodbye!");
                return true;
            }
            Command::Help => self.renderer.help(),
            Command::Rules => self.renderer.rules(),
            Command::Stats => match &self.history {
                Some(history) => self.renderer.stats(history),
                None => self.renderer.error("Records are switched off."),
            },
            Command::NewGame { difficulty } => {
                let difficulty = difficulty.unwrap_or(self.board.difficulty());
                self.new_game(difficulty);
            }
            Command::Deal => match self.board.deal() {
                Ok(report) => {
                    self.renderer
                        .info(&format!("Dealt {} card(s).", report.dealt));
                    for suit in report.completed {
                        self.renderer
                            .info(&format!("Completed a run of {}!", suit.name()));
                    }
                }
                Err(e) => self.renderer.error(&e.to_string()),
            },
            Command::Click { pile, row } => {
                let result = self.click(pile, row);
                self.report(result);
            }
            Command::Move { src, row, dst } => {
                let result = self.move_run(src, row, dst);
                self.report(result);
            }
        }

        if self.board.is_won() && !was_won {
            self.finish_record();
            self.renderer.win(&self.board);
        }
        false
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A click on `pile`: the card at `row`, the exposed card when `row` is
    /// `None`, or the pile itself when it is empty.
    fn click(&mut self, pile: usize, row: Option<usize>) -> Result<ClickOutcome, BoardError> {
        let len = self.board.pile(pile)?.len();
        if len == 0 {
            return self.board.click_empty_pile(pile);
        }
        self.board.click_card(pile, row.unwrap_or(len - 1))
    }

    /// Two clicks in one command: pick up at `src`, drop on `dst`.
    fn move_run(
        &mut self,
        src: usize,
        row: Option<usize>,
        dst: usize,
    ) -> Result<ClickOutcome, BoardError> {
        self.board.cancel_selection();
        match self.click(src, row)? {
            ClickOutcome::Selected { .. } => self.click(dst, None),
            _ => Ok(ClickOutcome::Ignored),
        }
    }

    fn report(&mut self, result: Result<ClickOutcome, BoardError>) {
        match result {
            Err(e) => self.renderer.error(&e.to_string()),
            Ok(ClickOutcome::Ignored) => self.renderer.error("Nothing to pick up there."),
            Ok(ClickOutcome::Selected { len, .. }) => self
                .renderer
                .info(&format!("Holding {} card(s). Click a target pile.", len)),
            Ok(ClickOutcome::Deselected) => self.renderer.info("Put the cards back."),
            Ok(ClickOutcome::Cancelled) => self
                .renderer
                .error("Illegal move; selection cancelled."),
            Ok(ClickOutcome::Moved(m)) => {
                self.renderer.info(&format!(
                    "Moved {} card(s) from pile {} to pile {}.",
                    m.count, m.from, m.to
                ));
                if let Some(suit) = m.completed {
                    self.renderer
                        .info(&format!("Completed a run of {}!", suit.name()));
                }
            }
        }
    }

    fn new_game(&mut self, difficulty: Difficulty) {
        self.finish_record();
        self.board = Board::deal_random(difficulty, self.rules);
        self.start_record();
        self.renderer.info(&format!(
            "A new {} game has been dealt.",
            difficulty.name()
        ));
    }

    fn start_record(&mut self) {
        if let Some(history) = self.history.as_mut() {
            history.start(&self.board);
        }
    }

    fn finish_record(&mut self) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        history.finish(&self.board);
        match history.save() {
            Ok(()) => info!("saved game record"),
            Err(e) => warn!("could not save game record: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renderer that remembers what it was asked to show.
    #[derive(Default)]
    struct Recorder {
        infos: Vec<String>,
        errors: Vec<String>,
        wins: usize,
    }

    impl Renderer for Recorder {
        fn render(&mut self, _board: &Board) {}
        fn info(&mut self, msg: &str) {
            self.infos.push(msg.to_string());
        }
        fn error(&mut self, msg: &str) {
            self.errors.push(msg.to_string());
        }
        fn help(&mut self) {}
        fn rules(&mut self) {}
        fn stats(&mut self, _history: &History) {}
        fn win(&mut self, _board: &Board) {
            self.wins += 1;
        }
    }

    fn game(seed: u64) -> Game<Recorder> {
        let board = Board::deal_seeded(Difficulty::OneSuit, seed, DealRules::default());
        Game::new(board, Recorder::default(), None)
    }

    #[test]
    fn click_exposed_card_picks_it_up() {
        let mut g = game(3);
        assert!(!g.handle(Command::Click { pile: 0, row: None }));
        assert_eq!(g.board().held_chain().len(), 1);
        assert!(g.renderer.infos.last().unwrap().starts_with("Holding 1"));
    }

    #[test]
    fn bad_row_reports_an_error() {
        let mut g = game(3);
        g.handle(Command::Click { pile: 0, row: Some(40) });
        assert_eq!(g.renderer.errors, ["pile 0 has no card at row 40"]);
    }

    #[test]
    fn face_down_click_reports_nothing_to_pick_up() {
        let mut g = game(3);
        g.handle(Command::Click { pile: 0, row: Some(0) });
        assert_eq!(g.renderer.errors, ["Nothing to pick up there."]);
    }

    #[test]
    fn deal_adds_a_row() {
        let mut g = game(5);
        g.handle(Command::Deal);
        assert_eq!(g.board().deck_len(), 40);
        assert_eq!(g.board().moves(), 1);
        assert_eq!(g.renderer.infos.last().unwrap(), "Dealt 10 card(s).");
    }

    #[test]
    fn new_game_replaces_the_board() {
        let mut g = game(5);
        g.handle(Command::Deal);
        g.handle(Command::NewGame { difficulty: Some(Difficulty::FourSuits) });
        assert_eq!(g.board().difficulty(), Difficulty::FourSuits);
        assert_eq!(g.board().moves(), 0);
        assert_eq!(g.board().deck_len(), 50);
    }

    #[test]
    fn move_of_an_illegal_run_is_ignored() {
        let mut g = game(8);
        // Row 0 of a fresh pile is face down.
        g.handle(Command::Move { src: 0, row: Some(0), dst: 1 });
        assert_eq!(g.board().moves(), 0);
        assert!(!g.board().selection().is_holding());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut g = game(1);
        assert!(g.handle(Command::Quit));
    }

    #[test]
    fn stats_without_records_is_an_error() {
        let mut g = game(1);
        g.handle(Command::Stats);
        assert_eq!(g.renderer.errors, ["Records are switched off."]);
    }

    #[test]
    fn finishing_the_last_run_wins() {
        use crate::card::{Card, Suit};
        use crate::deck::Deck;
        use crate::pile::Pile;

        let mut run: Vec<Card> = (1..=13u8)
            .rev()
            .enumerate()
            .map(|(i, r)| {
                let mut c = Card::new(i as u8, r, Suit::Hearts);
                c.flip();
                c
            })
            .collect();
        let ace = run.pop().unwrap();
        let piles = std::array::from_fn(|i| match i {
            0 => Pile::from_cards(0, run.clone()),
            1 => Pile::from_cards(1, vec![ace]),
            _ => Pile::new(i),
        });
        let board = Board::from_parts(Deck::from_cards(Vec::new()), piles, DealRules::default());
        let mut g = Game::new(board, Recorder::default(), None);

        g.handle(Command::Move { src: 1, row: None, dst: 0 });
        assert!(g.board().is_won());
        assert_eq!(g.board().completed_runs(), 1);
        assert_eq!(g.renderer.wins, 1);

        // Further commands do not announce the win again.
        g.handle(Command::Help);
        assert_eq!(g.renderer.wins, 1);
    }
}
