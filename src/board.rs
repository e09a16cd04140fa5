use log::{debug, info};
use thiserror::Error;

use crate::card::{Card, Suit};
use crate::deck::{Deck, Difficulty};
use crate::pile::Pile;
use crate::selection::Selection;

/// Number of tableau piles.
pub const NUM_PILES: usize = 10;
/// Cards dealt into each pile at the start: 6 for the first four, 5 for the rest.
pub const INITIAL_DEAL: [usize; NUM_PILES] = [6, 6, 6, 6, 5, 5, 5, 5, 5, 5];

/// House rules for dealing a new row from the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealRules {
    /// Refuse to deal while any pile is empty.
    pub require_filled_tableau: bool,
    /// Maximum number of deals; `None` means "as many rows as the deck holds".
    pub deal_limit: Option<u32>,
}

impl Default for DealRules {
    fn default() -> Self {
        DealRules {
            require_filled_tableau: true,
            deal_limit: None,
        }
    }
}

/// A command referred to a pile or card that does not exist.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("pile {0} out of range (0–{max})", max = NUM_PILES - 1)]
    PileOutOfRange(usize),
    #[error("pile {pile} has no card at row {pos}")]
    CardOutOfRange { pile: usize, pos: usize },
}

/// Why a deal was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DealError {
    #[error("Please fill all empty piles before dealing.")]
    EmptyPile,
    #[error("No deals remaining.")]
    NoDealsRemaining,
    #[error("The deck is empty.")]
    DeckEmpty,
}

/// A chain that actually changed piles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub from: usize,
    pub to: usize,
    pub count: usize,
    /// Suit of the King→Ace run retired by this move, if any.
    pub completed: Option<Suit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealReport {
    pub dealt: usize,
    pub completed: Vec<Suit>,
}

/// Result of a click.  Illegal intent never errors: it is either ignored or
/// cancels the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing happened (face-down card, illegal pickup, nothing held).
    Ignored,
    /// A chain was picked up.
    Selected { pile: usize, pos: usize, len: usize },
    /// The held chain was put back down on purpose.
    Deselected,
    /// The held chain was dropped on an illegal target.
    Cancelled,
    Moved(MoveReport),
}

/// The whole game state and the rules that drive it.
#[derive(Debug, Clone)]
pub struct Board {
    deck: Deck,
    piles: [Pile; NUM_PILES],
    selection: Selection,
    moves: u32,
    deals_remaining: u32,
    completed: Vec<Suit>,
    difficulty: Difficulty,
    rules: DealRules,
    seed: u64,
}

impl Board {
    // -------------------------------------------------------------------------
    // Construction / Dealing
    // -------------------------------------------------------------------------

    /// Deal a fresh game from an OS-random seed.
    pub fn deal_random(difficulty: Difficulty, rules: DealRules) -> Self {
        Self::deal_seeded(difficulty, rand::random(), rules)
    }

    /// Deal a game from a specific seed (useful for reproducible games).
    pub fn deal_seeded(difficulty: Difficulty, seed: u64, rules: DealRules) -> Self {
        let mut deck = Deck::shuffled(difficulty, seed);
        let piles = std::array::from_fn(|i| Pile::deal(i, &mut deck, INITIAL_DEAL[i]));

        info!(
            "new game: {} ({} suit(s)), seed {}",
            difficulty.name(),
            difficulty.suit_count(),
            seed
        );

        let mut board = Self::from_parts(deck, piles, rules);
        board.difficulty = difficulty;
        board.seed = seed;
        board
    }

    /// Assemble a board from an already-dealt tableau.
    pub fn from_parts(deck: Deck, piles: [Pile; NUM_PILES], rules: DealRules) -> Self {
        let rows_left = deck.len().div_ceil(NUM_PILES) as u32;
        Board {
            deals_remaining: rules.deal_limit.unwrap_or(rows_left),
            deck,
            piles,
            selection: Selection::Idle,
            moves: 0,
            completed: Vec::new(),
            difficulty: Difficulty::default(),
            rules,
            seed: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn piles(&self) -> &[Pile; NUM_PILES] {
        &self.piles
    }

    pub fn pile(&self, pile: usize) -> Result<&Pile, BoardError> {
        self.piles.get(pile).ok_or(BoardError::PileOutOfRange(pile))
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn deck_is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn deals_remaining(&self) -> u32 {
        self.deals_remaining
    }

    pub fn completed_runs(&self) -> usize {
        self.completed.len()
    }

    /// Suits of the retired runs, in the order they were completed.
    pub fn completed_suits(&self) -> &[Suit] {
        &self.completed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rules(&self) -> DealRules {
        self.rules
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The chain the player is holding (empty when idle).
    pub fn held_chain(&self) -> &[Card] {
        match self.selection {
            Selection::Holding { pile, pos } => self.piles[pile].chain(pos),
            Selection::Idle => &[],
        }
    }

    /// Find which pile, and where in it, a card currently sits.  Kept for
    /// front ends that track cards by id rather than by position.
    #[allow(dead_code)]
    pub fn locate(&self, card_id: u8) -> Option<(usize, usize)> {
        self.piles
            .iter()
            .find_map(|p| p.position_of(card_id).map(|pos| (p.index(), pos)))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// A click on the card at row `pos` of `pile`.
    pub fn click_card(&mut self, pile: usize, pos: usize) -> Result<ClickOutcome, BoardError> {
        let card = *self
            .pile(pile)?
            .get(pos)
            .ok_or(BoardError::CardOutOfRange { pile, pos })?;

        if !card.is_face_up() {
            return Ok(ClickOutcome::Ignored);
        }

        let outcome = match self.selection {
            Selection::Idle if card.is_selected() => {
                // Stray flags with nothing held: just clear them.
                self.piles[pile].deselect_chain(pos);
                ClickOutcome::Deselected
            }
            Selection::Idle => {
                if self.piles[pile].is_legal_stack(pos) {
                    self.piles[pile].select_chain(pos);
                    self.selection = Selection::Holding { pile, pos };
                    let len = self.piles[pile].len() - pos;
                    debug!("picked up {} card(s) from pile {} row {}", len, pile, pos);
                    ClickOutcome::Selected { pile, pos, len }
                } else {
                    ClickOutcome::Ignored
                }
            }
            Selection::Holding { pile: from, pos: head_pos } => {
                if (from, head_pos) == (pile, pos) {
                    self.cancel_selection();
                    ClickOutcome::Deselected
                } else if self.can_place_on(from, head_pos, pile, pos) {
                    ClickOutcome::Moved(self.move_chain(from, head_pos, pile))
                } else {
                    debug!("illegal target pile {} row {}; selection cancelled", pile, pos);
                    self.cancel_selection();
                    ClickOutcome::Cancelled
                }
            }
        };

        self.log_if_won();
        Ok(outcome)
    }

    /// A click on the empty space of `pile`.  Only does something when the
    /// pile is empty and a chain is held.
    pub fn click_empty_pile(&mut self, pile: usize) -> Result<ClickOutcome, BoardError> {
        if !self.pile(pile)?.is_empty() {
            return Ok(ClickOutcome::Ignored);
        }

        let outcome = match self.selection {
            Selection::Holding { pile: from, pos } => {
                ClickOutcome::Moved(self.move_chain(from, pos, pile))
            }
            Selection::Idle => ClickOutcome::Ignored,
        };

        self.log_if_won();
        Ok(outcome)
    }

    /// Deal one face-up card from the deck onto every pile.
    pub fn deal(&mut self) -> Result<DealReport, DealError> {
        if self.rules.require_filled_tableau && self.piles.iter().any(Pile::is_empty) {
            return Err(DealError::EmptyPile);
        }
        if self.deals_remaining == 0 {
            return Err(DealError::NoDealsRemaining);
        }
        if self.deck.is_empty() {
            return Err(DealError::DeckEmpty);
        }

        self.cancel_selection();

        let mut report = DealReport::default();
        for i in 0..NUM_PILES {
            let Some(mut card) = self.deck.draw() else {
                debug!("deck ran out after {} card(s)", report.dealt);
                break;
            };
            card.flip();
            if let Some(run) = self.piles[i].add_cards(vec![card]) {
                report.completed.push(self.retire(run));
            }
            report.dealt += 1;
        }

        self.moves += 1;
        self.deals_remaining -= 1;
        debug!(
            "dealt {} card(s), {} deal(s) remaining",
            report.dealt, self.deals_remaining
        );

        self.log_if_won();
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Win Condition
    // -------------------------------------------------------------------------

    /// Won once the deck is empty and every pile has been cleared.
    pub fn is_won(&self) -> bool {
        self.deck.is_empty() && self.piles.iter().all(Pile::is_empty)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Can the chain headed at `from[head_pos]` go onto the card at
    /// `to[pos]`?  The target must be another pile's exposed card, of the
    /// same suit and one rank higher than the chain's head.
    fn can_place_on(&self, from: usize, head_pos: usize, to: usize, pos: usize) -> bool {
        if from == to || !self.piles[to].is_exposed(pos) {
            return false;
        }
        match (self.piles[from].get(head_pos), self.piles[to].get(pos)) {
            (Some(head), Some(target)) => target.is_followed_by(head),
            _ => false,
        }
    }

    fn move_chain(&mut self, from: usize, pos: usize, to: usize) -> MoveReport {
        self.piles[from].deselect_chain(pos);
        self.selection = Selection::Idle;

        let chain = self.piles[from].take_stack(pos);
        let count = chain.len();
        let completed = self.piles[to].add_cards(chain).map(|run| self.retire(run));

        self.moves += 1;
        debug!("moved {} card(s) from pile {} to pile {}", count, from, to);

        MoveReport {
            from,
            to,
            count,
            completed,
        }
    }

    fn retire(&mut self, run: Vec<Card>) -> Suit {
        let suit = run.first().map_or(Suit::Spades, Card::suit);
        self.completed.push(suit);
        info!(
            "completed a run of {} ({} of 8)",
            suit.name(),
            self.completed.len()
        );
        suit
    }

    /// Put down whatever is held.
    pub fn cancel_selection(&mut self) {
        if let Selection::Holding { pile, pos } = self.selection {
            self.piles[pile].deselect_chain(pos);
        }
        self.selection = Selection::Idle;
    }

    fn log_if_won(&self) {
        if self.is_won() {
            info!("game won in {} move(s)", self.moves);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ACE, KING};
    use crate::deck::DECK_SIZE;
    use proptest::prelude::*;

    fn up(id: u8, rank: u8, suit: Suit) -> Card {
        let mut c = Card::new(id, rank, suit);
        c.flip();
        c
    }

    fn down(id: u8, rank: u8, suit: Suit) -> Card {
        Card::new(id, rank, suit)
    }

    fn board(piles: Vec<Vec<Card>>, deck: Vec<Card>) -> Board {
        board_with(piles, deck, DealRules::default())
    }

    fn board_with(piles: Vec<Vec<Card>>, deck: Vec<Card>, rules: DealRules) -> Board {
        let mut piles = piles.into_iter();
        let piles = std::array::from_fn(|i| Pile::from_cards(i, piles.next().unwrap_or_default()));
        Board::from_parts(Deck::from_cards(deck), piles, rules)
    }

    /// One face-up filler card per pile so dealing is allowed.
    fn fillers(first_id: u8) -> Vec<Vec<Card>> {
        (0..NUM_PILES as u8)
            .map(|i| vec![up(first_id + i, 7, Suit::Clubs)])
            .collect()
    }

    fn selected_ids(b: &Board) -> Vec<u8> {
        b.piles()
            .iter()
            .flat_map(|p| p.cards())
            .filter(|c| c.is_selected())
            .map(Card::id)
            .collect()
    }

    #[test]
    fn new_game_deals_54_cards() {
        let b = Board::deal_seeded(Difficulty::OneSuit, 7, DealRules::default());

        let sizes: Vec<usize> = b.piles().iter().map(Pile::len).collect();
        assert_eq!(sizes, INITIAL_DEAL);
        assert_eq!(sizes.iter().sum::<usize>(), 54);
        assert_eq!(b.deck_len(), 50);
        assert_eq!(b.deals_remaining(), 5);
        assert_eq!(b.moves(), 0);

        for pile in b.piles() {
            let (last, rest) = pile.cards().split_last().unwrap();
            assert!(last.is_face_up());
            assert!(rest.iter().all(|c| !c.is_face_up()));
        }
    }

    #[test]
    fn one_suit_game_uses_only_spades() {
        let b = Board::deal_seeded(Difficulty::OneSuit, 99, DealRules::default());
        assert!(
            b.piles()
                .iter()
                .flat_map(|p| p.cards())
                .all(|c| c.suit() == Suit::Spades)
        );
    }

    #[test]
    fn drop_run_on_empty_pile() {
        let mut b = board(
            vec![
                vec![down(0, 12, Suit::Hearts), up(1, 5, Suit::Hearts), up(2, 4, Suit::Hearts)],
                vec![],
            ],
            vec![],
        );

        let picked = b.click_card(0, 1).unwrap();
        assert_eq!(picked, ClickOutcome::Selected { pile: 0, pos: 1, len: 2 });
        assert_eq!(selected_ids(&b), [1, 2]);

        let moved = b.click_empty_pile(1).unwrap();
        assert!(matches!(moved, ClickOutcome::Moved(MoveReport { from: 0, to: 1, count: 2, .. })));

        let ids: Vec<u8> = b.piles()[1].cards().iter().map(Card::id).collect();
        assert_eq!(ids, [1, 2]);
        assert!(b.piles()[0].exposed().is_some_and(|c| c.id() == 0 && c.is_face_up()));
        assert_eq!(b.moves(), 1);
        assert_eq!(b.selection(), Selection::Idle);
        assert!(selected_ids(&b).is_empty());
    }

    #[test]
    fn different_suit_target_cancels() {
        let mut b = board(
            vec![
                vec![up(0, 5, Suit::Hearts), up(1, 4, Suit::Hearts)],
                vec![up(2, 6, Suit::Spades)],
            ],
            vec![],
        );

        b.click_card(0, 0).unwrap();
        assert_eq!(b.click_card(1, 0).unwrap(), ClickOutcome::Cancelled);

        assert_eq!(b.piles()[0].len(), 2);
        assert_eq!(b.piles()[1].len(), 1);
        assert_eq!(b.moves(), 0);
        assert_eq!(b.selection(), Selection::Idle);
        assert!(selected_ids(&b).is_empty());
    }

    #[test]
    fn place_run_on_next_higher_card() {
        let mut b = board(
            vec![
                vec![down(0, 9, Suit::Clubs), up(1, 5, Suit::Hearts), up(2, 4, Suit::Hearts)],
                vec![up(3, 6, Suit::Hearts)],
            ],
            vec![],
        );

        b.click_card(0, 1).unwrap();
        let outcome = b.click_card(1, 0).unwrap();
        assert_eq!(
            outcome,
            ClickOutcome::Moved(MoveReport {
                from: 0,
                to: 1,
                count: 2,
                completed: None
            })
        );

        let ranks: Vec<u8> = b.piles()[1].cards().iter().map(Card::rank).collect();
        assert_eq!(ranks, [6, 5, 4]);
        assert!(b.piles()[1].is_legal_stack(0));
        assert!(b.piles()[0].exposed().is_some_and(Card::is_face_up));
        assert_eq!(b.moves(), 1);
    }

    #[test]
    fn lower_target_is_rejected() {
        // A 5 may not go on a 4.
        let mut b = board(
            vec![vec![up(0, 5, Suit::Hearts)], vec![up(1, 4, Suit::Hearts)]],
            vec![],
        );
        b.click_card(0, 0).unwrap();
        assert_eq!(b.click_card(1, 0).unwrap(), ClickOutcome::Cancelled);
        assert_eq!(b.moves(), 0);
    }

    #[test]
    fn covered_target_is_rejected() {
        let mut b = board(
            vec![
                vec![up(0, 5, Suit::Hearts)],
                vec![up(1, 6, Suit::Hearts), up(2, 2, Suit::Clubs)],
            ],
            vec![],
        );
        b.click_card(0, 0).unwrap();
        assert_eq!(b.click_card(1, 0).unwrap(), ClickOutcome::Cancelled);
        assert_eq!(b.piles()[1].len(), 2);
        assert_eq!(b.moves(), 0);
    }

    #[test]
    fn clicking_the_held_card_again_deselects() {
        let mut b = board(vec![vec![up(0, 5, Suit::Hearts), up(1, 4, Suit::Hearts)]], vec![]);
        b.click_card(0, 0).unwrap();
        assert_eq!(b.held_chain().len(), 2);
        assert_eq!(b.click_card(0, 0).unwrap(), ClickOutcome::Deselected);
        assert!(b.held_chain().is_empty());
        assert!(selected_ids(&b).is_empty());
    }

    #[test]
    fn illegal_pickup_is_ignored() {
        let mut b = board(vec![vec![up(0, 5, Suit::Hearts), up(1, 3, Suit::Hearts)]], vec![]);
        assert_eq!(b.click_card(0, 0).unwrap(), ClickOutcome::Ignored);
        assert_eq!(b.selection(), Selection::Idle);
        // The exposed card alone is always legal.
        assert!(matches!(b.click_card(0, 1).unwrap(), ClickOutcome::Selected { len: 1, .. }));
    }

    #[test]
    fn stray_selection_is_cleared_without_picking_up() {
        let mut five = up(0, 5, Suit::Hearts);
        let mut four = up(1, 4, Suit::Hearts);
        five.select();
        four.select();
        let mut b = board(vec![vec![five, four]], vec![]);
        assert_eq!(b.selection(), Selection::Idle);

        assert_eq!(b.click_card(0, 0).unwrap(), ClickOutcome::Deselected);
        assert_eq!(b.selection(), Selection::Idle);
        assert!(b.held_chain().is_empty());
        assert!(selected_ids(&b).is_empty());
        assert_eq!(b.piles()[0].len(), 2);
        assert_eq!(b.moves(), 0);
    }

    #[test]
    fn face_down_clicks_are_ignored_even_while_holding() {
        let mut b = board(
            vec![vec![down(0, 6, Suit::Hearts), up(1, 2, Suit::Clubs)], vec![up(2, 5, Suit::Hearts)]],
            vec![],
        );
        assert_eq!(b.click_card(0, 0).unwrap(), ClickOutcome::Ignored);
        b.click_card(1, 0).unwrap();
        assert_eq!(b.click_card(0, 0).unwrap(), ClickOutcome::Ignored);
        assert!(b.selection().is_holding());
    }

    #[test]
    fn empty_pile_click_without_selection_is_ignored() {
        let mut b = board(vec![vec![up(0, 5, Suit::Hearts)]], vec![]);
        assert_eq!(b.click_empty_pile(3).unwrap(), ClickOutcome::Ignored);
        assert_eq!(b.click_empty_pile(0).unwrap(), ClickOutcome::Ignored);
        assert_eq!(b.moves(), 0);
    }

    #[test]
    fn out_of_range_commands_are_errors() {
        let mut b = board(vec![vec![up(0, 5, Suit::Hearts)]], vec![]);
        assert_eq!(b.click_card(10, 0), Err(BoardError::PileOutOfRange(10)));
        assert_eq!(
            b.click_card(0, 1),
            Err(BoardError::CardOutOfRange { pile: 0, pos: 1 })
        );
        assert_eq!(b.click_empty_pile(42), Err(BoardError::PileOutOfRange(42)));
    }

    #[test]
    fn completing_a_run_retires_it() {
        let mut run: Vec<Card> = (ACE..=KING)
            .rev()
            .enumerate()
            .map(|(i, r)| up(20 + i as u8, r, Suit::Spades))
            .collect();
        let ace = run.pop().unwrap();

        let mut first = vec![down(0, 3, Suit::Hearts)];
        first.extend(run);
        let mut b = board(vec![first, vec![down(1, 9, Suit::Hearts), ace]], vec![]);

        b.click_card(1, 1).unwrap();
        let outcome = b.click_card(0, 12).unwrap();
        assert!(matches!(
            outcome,
            ClickOutcome::Moved(MoveReport { completed: Some(Suit::Spades), .. })
        ));

        assert_eq!(b.completed_runs(), 1);
        assert_eq!(b.completed_suits(), [Suit::Spades]);
        for id in 20..33 {
            assert_eq!(b.locate(id), None);
        }
        assert!(b.piles()[0].exposed().is_some_and(|c| c.id() == 0 && c.is_face_up()));
        assert!(b.piles()[1].exposed().is_some_and(|c| c.id() == 1 && c.is_face_up()));
    }

    #[test]
    fn deal_refused_with_an_empty_pile() {
        let mut piles = fillers(0);
        piles[4].clear();
        let deck: Vec<Card> = (0..10).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        let mut b = board(piles, deck);

        assert_eq!(b.deal(), Err(DealError::EmptyPile));
        assert_eq!(b.deck_len(), 10);
        assert_eq!(b.moves(), 0);
    }

    #[test]
    fn deal_with_gaps_allowed_when_rule_is_off() {
        let mut piles = fillers(0);
        piles[4].clear();
        let deck: Vec<Card> = (0..10).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        let rules = DealRules {
            require_filled_tableau: false,
            deal_limit: None,
        };
        let mut b = board_with(piles, deck, rules);

        let report = b.deal().unwrap();
        assert_eq!(report.dealt, 10);
        assert_eq!(b.piles()[4].len(), 1);
    }

    #[test]
    fn deal_places_one_face_up_card_per_pile() {
        let deck: Vec<Card> = (0..20).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        let mut b = board(fillers(0), deck);
        assert_eq!(b.deals_remaining(), 2);

        let report = b.deal().unwrap();
        assert_eq!(report.dealt, 10);
        assert!(report.completed.is_empty());
        assert_eq!(b.deck_len(), 10);
        assert_eq!(b.moves(), 1);
        assert_eq!(b.deals_remaining(), 1);
        for pile in b.piles() {
            assert_eq!(pile.len(), 2);
            assert!(pile.exposed().is_some_and(Card::is_face_up));
        }
    }

    #[test]
    fn partial_deal_when_deck_runs_out() {
        let deck: Vec<Card> = (0..4).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        let rules = DealRules {
            require_filled_tableau: true,
            deal_limit: Some(3),
        };
        let mut b = board_with(fillers(0), deck, rules);

        let report = b.deal().unwrap();
        assert_eq!(report.dealt, 4);
        assert!(b.deck_is_empty());
        assert_eq!(b.piles()[3].len(), 2);
        assert_eq!(b.piles()[4].len(), 1);
        assert_eq!(b.deal(), Err(DealError::DeckEmpty));
    }

    #[test]
    fn deal_limit_is_enforced() {
        let deck: Vec<Card> = (0..30).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        let rules = DealRules {
            require_filled_tableau: true,
            deal_limit: Some(1),
        };
        let mut b = board_with(fillers(0), deck, rules);
        b.deal().unwrap();
        assert_eq!(b.deal(), Err(DealError::NoDealsRemaining));
        assert_eq!(b.deck_len(), 20);
    }

    #[test]
    fn deal_cancels_the_selection() {
        let deck: Vec<Card> = (0..10).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        let mut b = board(fillers(0), deck);
        b.click_card(2, 0).unwrap();
        b.deal().unwrap();
        assert_eq!(b.selection(), Selection::Idle);
        assert!(selected_ids(&b).is_empty());
    }

    #[test]
    fn deal_can_complete_a_run() {
        let mut piles = fillers(0);
        piles[0] = (2..=KING)
            .rev()
            .enumerate()
            .map(|(i, r)| up(20 + i as u8, r, Suit::Hearts))
            .collect();
        // Drawn from the end: the Ace lands on pile 0.
        let mut deck: Vec<Card> = (0..9).map(|i| down(100 + i, 3, Suit::Spades)).collect();
        deck.push(down(99, ACE, Suit::Hearts));
        let mut b = board(piles, deck);

        let report = b.deal().unwrap();
        assert_eq!(report.completed, [Suit::Hearts]);
        assert!(b.piles()[0].is_empty());
        assert_eq!(b.completed_runs(), 1);
    }

    #[test]
    fn winner_only_when_deck_and_piles_are_empty() {
        let b = board(vec![], vec![]);
        assert!(b.is_won());

        let b = board(vec![], vec![down(0, 1, Suit::Spades)]);
        assert!(!b.is_won());

        let b = board(vec![vec![], vec![up(0, 1, Suit::Spades)]], vec![]);
        assert!(!b.is_won());
    }

    #[test]
    fn locate_finds_cards_by_id() {
        let b = board(vec![vec![], vec![up(5, 1, Suit::Spades), up(6, 2, Suit::Spades)]], vec![]);
        assert_eq!(b.locate(6), Some((1, 1)));
        assert_eq!(b.locate(7), None);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Click(usize, prop::sample::Index),
        Empty(usize),
        Deal,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            6 => (0..NUM_PILES, any::<prop::sample::Index>()).prop_map(|(p, i)| Action::Click(p, i)),
            2 => (0..NUM_PILES).prop_map(Action::Empty),
            1 => Just(Action::Deal),
        ]
    }

    proptest! {
        #[test]
        fn random_play_keeps_invariants(
            seed in any::<u64>(),
            d in 0usize..3,
            actions in prop::collection::vec(action(), 0..120),
        ) {
            let mut b = Board::deal_seeded(Difficulty::ALL[d], seed, DealRules::default());

            for a in actions {
                match a {
                    Action::Click(p, i) => {
                        let len = b.piles()[p].len();
                        if len > 0 {
                            b.click_card(p, i.index(len)).unwrap();
                        }
                    }
                    Action::Empty(p) => {
                        b.click_empty_pile(p).unwrap();
                    }
                    Action::Deal => {
                        let _ = b.deal();
                    }
                }

                // Card count is conserved.
                let on_table: usize = b.piles().iter().map(Pile::len).sum();
                prop_assert_eq!(on_table + b.deck_len() + 13 * b.completed_runs(), DECK_SIZE);

                // Selected flags are exactly the held chain.
                let held: Vec<u8> = b.held_chain().iter().map(Card::id).collect();
                prop_assert_eq!(selected_ids(&b), held.clone());
                if !held.is_empty() {
                    let (p, pos) = b.selection().held().unwrap();
                    prop_assert!(b.piles()[p].is_legal_stack(pos));
                }

                // Exposed cards are never face down.
                for pile in b.piles() {
                    if let Some(c) = pile.exposed() {
                        prop_assert!(c.is_face_up());
                    }
                }
            }
        }
    }
}
