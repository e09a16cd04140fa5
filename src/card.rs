use serde::{Deserialize, Serialize};

/// Highest rank in a suit (King).
pub const KING: u8 = 13;
/// Lowest rank in a suit (Ace).
pub const ACE: u8 = 1;

/// The four French suits.  Spider difficulty decides how many of them are
/// actually dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Diamonds,
    Clubs,
    Hearts,
}

impl Suit {
    /// All four suits, in the order difficulty levels draw from them.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Diamonds, Suit::Clubs, Suit::Hearts];

    /// Single-character symbol used in CLI rendering.
    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "S",
            Suit::Diamonds => "D",
            Suit::Clubs => "C",
            Suit::Hearts => "H",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "Spades",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
            Suit::Hearts => "Hearts",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamonds | Suit::Hearts)
    }
}

/// A single playing card.
///
/// `id`, `rank` and `suit` never change once the deck is built; only the
/// orientation and selection flags do.  Which pile a card sits in, and which
/// card lies on top of it, are answered by the pile's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    id: u8,
    rank: u8,
    suit: Suit,
    face_up: bool,
    selected: bool,
}

impl Card {
    /// A face-down, unselected card.
    pub fn new(id: u8, rank: u8, suit: Suit) -> Self {
        debug_assert!((ACE..=KING).contains(&rank), "rank out of range: {rank}");
        Card {
            id,
            rank,
            suit,
            face_up: false,
            selected: false,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn is_face_up(&self) -> bool {
        self.face_up
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_king(&self) -> bool {
        self.rank == KING
    }

    pub fn flip(&mut self) {
        self.face_up = !self.face_up;
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    /// Can `next` lie directly on this card inside a movable run?
    /// Same suit, exactly one rank lower.
    pub fn is_followed_by(&self, next: &Card) -> bool {
        self.suit == next.suit && self.rank == next.rank + 1
    }

    /// Short rank label: A, 2..10, J, Q, K.
    pub fn rank_label(&self) -> String {
        match self.rank {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.rank_label(), self.suit.symbol())
    }
}

/// Whether `cards` form a strictly descending single-suit run.
/// Empty and single-card slices are trivially legal.
pub fn is_legal_run(cards: &[Card]) -> bool {
    cards.windows(2).all(|w| w[0].is_followed_by(&w[1]))
}

/// A legal run that goes all the way from King to Ace.
pub fn is_complete_run(cards: &[Card]) -> bool {
    cards.first().is_some_and(|c| c.rank == KING)
        && cards.last().is_some_and(|c| c.rank == ACE)
        && is_legal_run(cards)
}
