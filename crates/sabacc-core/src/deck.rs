//! Deck construction and the draw/return stack.
//!
//! A [`DeckSpec`] describes the exact multiset of one physical deck; building
//! it produces a uniformly shuffled [`Deck`]. Draws come off the top of the
//! stack, and cards returned to play (discards, rejected staged draws) go to
//! the bottom so they cannot be re-drawn immediately.

use crate::card::{Card, Suit};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Exact multiset of one physical deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSpec {
    /// Plain pip cards as (value, copies) pairs. In suited decks every entry
    /// is minted once per suit.
    pub pips: Vec<(i32, u32)>,
    /// Suits to stamp on pip cards; `None` for unsuited decks.
    pub suits: Option<Vec<Suit>>,
    /// Number of Impostor wildcards.
    pub impostors: u32,
    /// Number of Sylop wildcards. Wild-suited when the deck is suited.
    pub sylops: u32,
}

impl DeckSpec {
    /// Total number of cards the spec describes.
    pub fn card_count(&self) -> usize {
        let suit_runs = self.suits.as_ref().map_or(1, Vec::len);
        let pips: u32 = self.pips.iter().map(|(_, copies)| copies).sum();
        pips as usize * suit_runs + self.impostors as usize + self.sylops as usize
    }

    /// Mint the multiset and shuffle it into a draw stack.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Deck {
        let mut cards = Vec::with_capacity(self.card_count());

        match &self.suits {
            Some(suits) => {
                for &suit in suits {
                    for &(value, copies) in &self.pips {
                        for _ in 0..copies {
                            cards.push(Card::suited(value, suit));
                        }
                    }
                }
                cards.extend(std::iter::repeat(Card::wild_sylop()).take(self.sylops as usize));
            }
            None => {
                for &(value, copies) in &self.pips {
                    for _ in 0..copies {
                        cards.push(Card::pip(value));
                    }
                }
                cards.extend(std::iter::repeat(Card::sylop()).take(self.sylops as usize));
            }
        }
        cards.extend(std::iter::repeat(Card::impostor()).take(self.impostors as usize));

        cards.shuffle(rng);
        Deck { cards }
    }
}

/// An ordered stack of cards. The top of the stack is the end of the vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Deck over an explicit card order (top of the stack last).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    /// Draw the top card, or `None` when the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Return a card to the bottom of the deck, eligible for later draws.
    pub fn return_to_bottom(&mut self, card: Card) {
        self.cards.insert(0, card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, bottom first.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// How a variant lays out its deck(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckLayout {
    /// One shared deck.
    Single(Deck),
    /// Parallel positive-only and negative-only decks.
    Split { positive: Deck, negative: Deck },
}

impl DeckLayout {
    /// Total cards remaining across all decks.
    pub fn remaining(&self) -> usize {
        match self {
            DeckLayout::Single(deck) => deck.len(),
            DeckLayout::Split { positive, negative } => positive.len() + negative.len(),
        }
    }
}
