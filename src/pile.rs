use log::debug;

use crate::card::{Card, is_complete_run, is_legal_run};
use crate::deck::Deck;

/// Vertical distance between consecutive cards in a pile, in pixels.
pub const CARD_OFFSET: u32 = 35;
/// Height of a card image, in pixels.
pub const CARD_HEIGHT: u32 = 145;

/// One tableau column.
///
/// `cards[0]` is the deepest card and `cards.last()` the exposed one.  The
/// card "after" another in this vector is the one stacked on it, so the chain
/// rooted at a card is simply the tail slice starting at its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pile {
    index: usize,
    cards: Vec<Card>,
}

impl Pile {
    pub fn new(index: usize) -> Self {
        Pile {
            index,
            cards: Vec::new(),
        }
    }

    /// Draw `count` cards from the deck into a new pile.  Only the last card
    /// placed is turned face up.  Stops early if the deck runs dry.
    pub fn deal(index: usize, deck: &mut Deck, count: usize) -> Self {
        let mut pile = Pile::new(index);
        for _ in 0..count {
            let Some(card) = deck.draw() else { break };
            pile.cards.push(card);
        }
        if let Some(top) = pile.cards.last_mut() {
            top.flip();
        }
        pile
    }

    /// Build a pile from explicit cards (orientation taken as given).
    #[cfg(test)]
    pub fn from_cards(index: usize, cards: Vec<Card>) -> Self {
        Pile { index, cards }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Card> {
        self.cards.get(pos)
    }

    /// The exposed card: the only one cards can be placed on.
    pub fn exposed(&self) -> Option<&Card> {
        self.cards.last()
    }

    /// Is the card at `pos` the exposed one (nothing stacked on it)?
    pub fn is_exposed(&self, pos: usize) -> bool {
        pos + 1 == self.cards.len()
    }

    /// The chain rooted at `pos`: that card and everything stacked on it.
    pub fn chain(&self, pos: usize) -> &[Card] {
        self.cards.get(pos..).unwrap_or(&[])
    }

    pub fn position_of(&self, card_id: u8) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == card_id)
    }

    /// Whether the chain rooted at `pos` may be picked up.
    pub fn is_legal_stack(&self, pos: usize) -> bool {
        pos < self.cards.len() && is_legal_run(self.chain(pos))
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Append a chain to this pile, then retire a completed run if that
    /// produced one.  Returns the retired run.
    pub fn add_cards(&mut self, chain: Vec<Card>) -> Option<Vec<Card>> {
        debug!("pile {}: adding {} card(s)", self.index, chain.len());
        self.cards.extend(chain);
        self.check_and_resolve_stack()
    }

    /// Look for the first face-up King from the bottom of the pile.  If its
    /// chain runs unbroken down to an Ace, remove it and return it.
    ///
    /// At most one run is retired per call, and only the one rooted at that
    /// first King is considered.
    pub fn check_and_resolve_stack(&mut self) -> Option<Vec<Card>> {
        let king = self
            .cards
            .iter()
            .position(|c| c.is_king() && c.is_face_up())?;

        if !is_complete_run(self.chain(king)) {
            return None;
        }

        debug!("pile {}: completed run at position {}", self.index, king);
        Some(self.take_stack(king))
    }

    /// Remove the chain rooted at `pos` and return it in order.  The card
    /// left exposed underneath is turned face up if it was face down.
    pub fn take_stack(&mut self, pos: usize) -> Vec<Card> {
        if pos >= self.cards.len() {
            return Vec::new();
        }

        let taken: Vec<Card> = self.cards.drain(pos..).collect();
        if let Some(top) = self.cards.last_mut() {
            if !top.is_face_up() {
                top.flip();
            }
        }
        taken
    }

    pub(crate) fn select_chain(&mut self, pos: usize) {
        for card in self.cards.iter_mut().skip(pos) {
            card.select();
        }
    }

    pub(crate) fn deselect_chain(&mut self, pos: usize) {
        for card in self.cards.iter_mut().skip(pos) {
            card.deselect();
        }
    }

    // -------------------------------------------------------------------------
    // Geometry (for front ends that draw cards as overlapping images)
    // -------------------------------------------------------------------------

    /// Vertical offset of the card at `pos` from the top of the pile.
    /// Unused by the text renderer; graphical front ends lay cards out with it.
    #[allow(dead_code)]
    pub fn card_offset(pos: usize) -> u32 {
        CARD_OFFSET * pos as u32
    }

    /// Preferred height of the whole pile, for graphical front ends.
    #[allow(dead_code)]
    pub fn extent(&self) -> u32 {
        CARD_OFFSET * (self.cards.len() as u32 + 1) + (CARD_HEIGHT - CARD_OFFSET)
    }
}
