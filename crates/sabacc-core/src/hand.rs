//! Player hands.
//!
//! Kessel holds exactly one positive and one negative card in a [`SlotHand`],
//! with a separate staging slot for a just-drawn card awaiting the mandatory
//! keep-or-discard choice. The open variants grow and shrink an [`OpenHand`]
//! freely; Coruscant Shift additionally locks the cards kept in earlier
//! rounds so a later selection cannot drop them.

use crate::card::{Card, Slot};
use serde::{Deserialize, Serialize};

/// A drawn card held apart from the committed hand until the player decides
/// whether to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedDraw {
    pub card: Card,
    /// Deck the card came from; the rejected card returns there.
    pub slot: Slot,
}

/// Fixed two-slot hand: one positive card, one negative card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotHand {
    pub positive: Option<Card>,
    pub negative: Option<Card>,
    staged: Option<StagedDraw>,
}

impl SlotHand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed card in a slot.
    pub fn slot(&self, slot: Slot) -> Option<Card> {
        match slot {
            Slot::Positive => self.positive,
            Slot::Negative => self.negative,
        }
    }

    pub fn set_slot(&mut self, slot: Slot, card: Card) {
        match slot {
            Slot::Positive => self.positive = Some(card),
            Slot::Negative => self.negative = Some(card),
        }
    }

    /// Hold a just-drawn card until the keep choice resolves.
    pub fn stage(&mut self, card: Card, slot: Slot) {
        self.staged = Some(StagedDraw { card, slot });
    }

    pub fn staged(&self) -> Option<&StagedDraw> {
        self.staged.as_ref()
    }

    /// Commit or reject the staged card. Returns the card that must go back
    /// to the bottom of its source deck.
    pub fn resolve_staged(&mut self, keep_drawn: bool) -> Option<Card> {
        let StagedDraw { card, slot } = self.staged.take()?;
        if keep_drawn {
            let replaced = self.slot(slot);
            self.set_slot(slot, card);
            replaced
        } else {
            Some(card)
        }
    }

    /// Committed cards in display order: positive slot first.
    pub fn cards(&self) -> Vec<(Slot, Card)> {
        let mut out = Vec::with_capacity(2);
        if let Some(card) = self.positive {
            out.push((Slot::Positive, card));
        }
        if let Some(card) = self.negative {
            out.push((Slot::Negative, card));
        }
        out
    }

    /// Physical cards held, staged draw included.
    pub fn card_count(&self) -> usize {
        self.cards().len() + usize::from(self.staged.is_some())
    }
}

/// Growable hand used by the open variants. Cards keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHand {
    cards: Vec<Card>,
    /// Cards below this index were locked in at a previous round boundary
    /// and cannot be dropped by a selection.
    locked: usize,
}

impl OpenHand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Remove by position. The caller validates the index and the
    /// cannot-discard-last rule.
    pub fn remove(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
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

    /// Whether the card at `index` is locked in from a previous round.
    pub fn is_locked(&self, index: usize) -> bool {
        index < self.locked
    }

    /// Lock everything currently held. Cards drawn afterwards are loose.
    pub fn lock_all(&mut self) {
        self.locked = self.cards.len();
    }

    /// Keep only the cards at the given positions, returning the dropped
    /// cards. The caller has already validated that `keep` is non-empty,
    /// in-bounds, and covers every locked index.
    pub fn retain_selection(&mut self, keep: &[usize]) -> Vec<Card> {
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(keep.len());
        for (index, card) in self.cards.drain(..).enumerate() {
            if keep.contains(&index) {
                kept.push(card);
            } else {
                dropped.push(card);
            }
        }
        self.cards = kept;
        self.locked = self.locked.min(self.cards.len());
        dropped
    }
}

/// Hand shape, fixed by the variant at table creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Slots(SlotHand),
    Open(OpenHand),
}

impl Hand {
    pub fn as_slots(&self) -> Option<&SlotHand> {
        match self {
            Hand::Slots(hand) => Some(hand),
            Hand::Open(_) => None,
        }
    }

    pub fn as_slots_mut(&mut self) -> Option<&mut SlotHand> {
        match self {
            Hand::Slots(hand) => Some(hand),
            Hand::Open(_) => None,
        }
    }

    pub fn as_open(&self) -> Option<&OpenHand> {
        match self {
            Hand::Open(hand) => Some(hand),
            Hand::Slots(_) => None,
        }
    }

    pub fn as_open_mut(&mut self) -> Option<&mut OpenHand> {
        match self {
            Hand::Open(hand) => Some(hand),
            Hand::Slots(_) => None,
        }
    }

    /// Physical cards held, staging included. Used by the conservation
    /// accounting in tests.
    pub fn card_count(&self) -> usize {
        match self {
            Hand::Slots(hand) => hand.card_count(),
            Hand::Open(hand) => hand.len(),
        }
    }
}
