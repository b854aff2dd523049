//! Card primitives shared by every Sabacc variant.
//!
//! A card is a tagged value: a plain pip card with a signed face value, or
//! one of the two wildcards (Impostor, Sylop). Suited variants additionally
//! stamp a suit on each pip card; Sylops there carry the `Wild` suit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suit stamped on cards in the suited variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Circles,
    Triangles,
    Squares,
    /// Sentinel suit carried by Sylops; matches every target suit.
    Wild,
}

impl Suit {
    /// The three real suits, in deck order.
    pub const ALL: [Suit; 3] = [Suit::Circles, Suit::Triangles, Suit::Squares];

    /// Printable symbol for the suit.
    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Circles => "●",
            Suit::Triangles => "▲",
            Suit::Squares => "■",
            Suit::Wild => "Ø",
        }
    }
}

/// Face of a card: a pip value or one of the two wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Plain signed value.
    Pip(i32),
    /// Value chosen by the holder from a two-dice roll at game end.
    Impostor,
    /// Value mirrors the partner card (two-slot variants) or is fixed 0.
    Sylop,
}

/// A single physical card. Decks hold many duplicate instances by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub face: Face,
    pub suit: Option<Suit>,
}

impl Card {
    /// Unsuited pip card.
    pub fn pip(value: i32) -> Self {
        Card {
            face: Face::Pip(value),
            suit: None,
        }
    }

    /// Suited pip card.
    pub fn suited(value: i32, suit: Suit) -> Self {
        Card {
            face: Face::Pip(value),
            suit: Some(suit),
        }
    }

    /// Unsuited Impostor.
    pub fn impostor() -> Self {
        Card {
            face: Face::Impostor,
            suit: None,
        }
    }

    /// Unsuited Sylop.
    pub fn sylop() -> Self {
        Card {
            face: Face::Sylop,
            suit: None,
        }
    }

    /// Wild-suited Sylop for the suited variant.
    pub fn wild_sylop() -> Self {
        Card {
            face: Face::Sylop,
            suit: Some(Suit::Wild),
        }
    }

    pub fn is_sylop(&self) -> bool {
        matches!(self.face, Face::Sylop)
    }

    pub fn is_impostor(&self) -> bool {
        matches!(self.face, Face::Impostor)
    }

    /// Face value of a pip card; wildcards have none until resolved.
    pub fn pip_value(&self) -> Option<i32> {
        match self.face {
            Face::Pip(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the card counts toward the given target suit.
    /// The wild suit matches everything.
    pub fn matches_suit(&self, target: Suit) -> bool {
        matches!(self.suit, Some(s) if s == target || s == Suit::Wild)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let face = match self.face {
            Face::Pip(v) if v > 0 => format!("+{v}"),
            Face::Pip(v) => v.to_string(),
            Face::Impostor => "Ψ".to_string(),
            Face::Sylop => "Ø".to_string(),
        };
        match self.suit {
            Some(suit) if suit != Suit::Wild => write!(f, "{} {}", suit.symbol(), face),
            _ => write!(f, "{face}"),
        }
    }
}

/// Which half of a two-slot hand a card occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Positive,
    Negative,
}

impl Slot {
    /// Both slots, positive first (the order wildcards resolve in).
    pub const BOTH: [Slot; 2] = [Slot::Positive, Slot::Negative];

    /// Sign multiplier for values in this slot.
    pub fn sign(&self) -> i32 {
        match self {
            Slot::Positive => 1,
            Slot::Negative => -1,
        }
    }

    /// The opposite slot.
    pub fn other(&self) -> Slot {
        match self {
            Slot::Positive => Slot::Negative,
            Slot::Negative => Slot::Positive,
        }
    }

    /// Sign glyph used when printing slot contents.
    pub fn symbol(&self) -> &'static str {
        match self {
            Slot::Positive => "+",
            Slot::Negative => "-",
        }
    }
}
