//! Seats, identities, and per-player game state.

use crate::card::{Face, Slot};
use crate::hand::Hand;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seat index at a table.
pub type PlayerId = u8;

/// How a seat is occupied.
///
/// The practice opponent injected into single-player games is a first-class
/// variant, so display and evaluation logic branch on the tag rather than on
/// identity introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerIdentity {
    /// A real participant; the name is an adapter-opaque display handle.
    Human { name: String },
    /// The dealt-at-game-end practice opponent for solo tables.
    Synthetic,
}

impl PlayerIdentity {
    pub fn display_name(&self) -> &str {
        match self {
            PlayerIdentity::Human { name } => name,
            PlayerIdentity::Synthetic => "Lando Calrissian AI",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, PlayerIdentity::Synthetic)
    }
}

/// A single seat's state: identity, hand, and resolved wildcard values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub identity: PlayerIdentity,
    pub hand: Hand,
    /// Chosen Impostor values, keyed by slot. Filled during phase A of the
    /// end-of-game resolution.
    pub impostor_values: HashMap<Slot, i32>,
    /// Computed Sylop values, keyed by slot. Filled during phase B.
    pub sylop_values: HashMap<Slot, i32>,
}

impl PlayerState {
    pub fn new(id: PlayerId, identity: PlayerIdentity, hand: Hand) -> Self {
        PlayerState {
            id,
            identity,
            hand,
            impostor_values: HashMap::new(),
            sylop_values: HashMap::new(),
        }
    }

    /// Resolved value of a slot card. `None` while a wildcard in the slot is
    /// still unresolved (or the slot is empty).
    pub fn slot_value(&self, slot: Slot) -> Option<i32> {
        let hand = self.hand.as_slots()?;
        match hand.slot(slot)?.face {
            Face::Pip(v) => Some(v),
            Face::Impostor => self.impostor_values.get(&slot).copied(),
            Face::Sylop => self.sylop_values.get(&slot).copied(),
        }
    }

    /// Resolved values of an open hand, insertion order. Sylops are fixed 0
    /// and Impostors do not occur in open decks.
    pub fn open_values(&self) -> Vec<i32> {
        match self.hand.as_open() {
            Some(hand) => hand
                .cards()
                .iter()
                .map(|card| card.pip_value().unwrap_or(0))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Sum of resolved card values; `None` while any wildcard is unresolved.
    pub fn total(&self) -> Option<i32> {
        match &self.hand {
            Hand::Slots(_) => {
                Some(self.slot_value(Slot::Positive)? + self.slot_value(Slot::Negative)?)
            }
            Hand::Open(_) => Some(self.open_values().iter().sum()),
        }
    }

    /// Whether any held card is an unresolved Impostor.
    pub fn holds_unresolved_impostor(&self) -> bool {
        match &self.hand {
            Hand::Slots(hand) => Slot::BOTH.iter().any(|&slot| {
                matches!(hand.slot(slot), Some(card) if card.is_impostor())
                    && !self.impostor_values.contains_key(&slot)
            }),
            Hand::Open(_) => false,
        }
    }

    /// Stable text rendering of the committed hand, e.g. `| +3 | -Ψ |`.
    /// With `include_special_values`, resolved wildcards show their value
    /// after a slash (`-Ψ/-4`).
    pub fn hand_display(&self, include_special_values: bool) -> String {
        let parts: Vec<String> = match &self.hand {
            Hand::Slots(hand) => hand
                .cards()
                .iter()
                .map(|&(slot, card)| match card.face {
                    Face::Pip(_) => card.to_string(),
                    Face::Impostor => special_display(
                        slot,
                        "Ψ",
                        self.impostor_values.get(&slot),
                        include_special_values,
                    ),
                    Face::Sylop => special_display(
                        slot,
                        "Ø",
                        self.sylop_values.get(&slot),
                        include_special_values,
                    ),
                })
                .collect(),
            Hand::Open(hand) => hand.cards().iter().map(|card| card.to_string()).collect(),
        };
        format!("| {} |", parts.join(" | "))
    }
}

fn special_display(slot: Slot, glyph: &str, value: Option<&i32>, include_value: bool) -> String {
    match value {
        Some(&v) if include_value => {
            let sign = if v >= 0 { "+" } else { "" };
            format!("{}{}/{}{}", slot.symbol(), glyph, sign, v)
        }
        _ => format!("{}{}", slot.symbol(), glyph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::hand::{OpenHand, SlotHand};

    fn slot_player(positive: Card, negative: Card) -> PlayerState {
        let mut hand = SlotHand::new();
        hand.set_slot(Slot::Positive, positive);
        hand.set_slot(Slot::Negative, negative);
        PlayerState::new(
            0,
            PlayerIdentity::Human { name: "Han".into() },
            Hand::Slots(hand),
        )
    }

    #[test]
    fn test_total_of_plain_slots() {
        let player = slot_player(Card::pip(4), Card::pip(-2));
        assert_eq!(player.total(), Some(2));
    }

    #[test]
    fn test_unresolved_impostor_has_no_total() {
        let player = slot_player(Card::impostor(), Card::pip(-2));
        assert_eq!(player.total(), None);
        assert!(player.holds_unresolved_impostor());
    }

    #[test]
    fn test_resolved_impostor_total() {
        let mut player = slot_player(Card::impostor(), Card::pip(-2));
        player.impostor_values.insert(Slot::Positive, 5);
        assert_eq!(player.total(), Some(3));
        assert!(!player.holds_unresolved_impostor());
    }

    #[test]
    fn test_open_hand_total_counts_sylops_as_zero() {
        let mut hand = OpenHand::new();
        hand.add(Card::pip(7));
        hand.add(Card::sylop());
        hand.add(Card::pip(-3));
        let player = PlayerState::new(
            1,
            PlayerIdentity::Human {
                name: "Chewie".into(),
            },
            Hand::Open(hand),
        );
        assert_eq!(player.total(), Some(4));
    }

    #[test]
    fn test_hand_display() {
        let mut player = slot_player(Card::pip(3), Card::impostor());
        assert_eq!(player.hand_display(false), "| +3 | -Ψ |");

        player.impostor_values.insert(Slot::Negative, -4);
        assert_eq!(player.hand_display(true), "| +3 | -Ψ/-4 |");
    }

    #[test]
    fn test_synthetic_identity_display() {
        assert_eq!(
            PlayerIdentity::Synthetic.display_name(),
            "Lando Calrissian AI"
        );
        assert!(PlayerIdentity::Synthetic.is_synthetic());
    }
}
