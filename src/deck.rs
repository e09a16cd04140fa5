use clap::ValueEnum;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::card::{Card, KING, Suit};

/// Spider always plays with two full packs.
pub const DECK_SIZE: usize = 104;

/// How many distinct suits are dealt.  Fewer suits means the same 104 cards
/// are spread over fewer suits, which makes same-suit runs easier to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum Difficulty {
    #[default]
    #[value(name = "1", alias = "beginner")]
    OneSuit,
    #[value(name = "2", alias = "intermediate")]
    TwoSuits,
    #[value(name = "4", alias = "advanced")]
    FourSuits,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::OneSuit,
        Difficulty::TwoSuits,
        Difficulty::FourSuits,
    ];

    pub fn suit_count(self) -> usize {
        match self {
            Difficulty::OneSuit => 1,
            Difficulty::TwoSuits => 2,
            Difficulty::FourSuits => 4,
        }
    }

    /// Only 1, 2 and 4 suits divide the deck evenly.
    pub fn from_suit_count(n: usize) -> Option<Self> {
        match n {
            1 => Some(Difficulty::OneSuit),
            2 => Some(Difficulty::TwoSuits),
            4 => Some(Difficulty::FourSuits),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::OneSuit => "Beginner",
            Difficulty::TwoSuits => "Intermediate",
            Difficulty::FourSuits => "Advanced",
        }
    }

    pub fn suits(self) -> &'static [Suit] {
        &Suit::ALL[..self.suit_count()]
    }
}

/// The 104 cards of a game before shuffling.  Each suit in play gets
/// `104 / suits` cards with ranks cycling Ace..King.
pub fn spider_cards(difficulty: Difficulty) -> Vec<Card> {
    let per_suit = DECK_SIZE / difficulty.suit_count();
    let mut cards = Vec::with_capacity(DECK_SIZE);

    for &suit in difficulty.suits() {
        for i in 0..per_suit {
            let rank = (i % KING as usize) as u8 + 1;
            cards.push(Card::new(cards.len() as u8, rank, suit));
        }
    }

    debug_assert_eq!(cards.len(), DECK_SIZE, "Deck must have exactly 104 cards");
    cards
}

/// The undealt stock.  The last element of `cards` is the top of the deck.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build and shuffle a deck from a seed (reproducible games).
    pub fn shuffled(difficulty: Difficulty, seed: u64) -> Self {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
        let mut cards = spider_cards(difficulty);
        cards.shuffle(&mut rng);
        Deck { cards }
    }

    /// A deck in exactly the given order; the last card is drawn first.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
